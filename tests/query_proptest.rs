//! Property-based tests for the OData query builder.

use bgs_sensor_mcp::frost::query::{location_filter, quote_literal, text_search};
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = f64> {
    (-180_000i32..180_000).prop_map(|n| f64::from(n) / 1000.0)
}

proptest! {
    #[test]
    fn polygon_ring_is_closed_in_lng_lat_order(
        lat1 in coordinate(),
        lng1 in coordinate(),
        lat2 in coordinate(),
        lng2 in coordinate(),
    ) {
        let input = format!("{lat1},{lng1},{lat2},{lng2}");
        let filter = location_filter(&input).unwrap().unwrap();

        let ring = filter
            .split("POLYGON((")
            .nth(1)
            .and_then(|s| s.split("))").next())
            .unwrap();
        let points: Vec<&str> = ring.split(", ").collect();

        prop_assert_eq!(points.len(), 5);
        prop_assert_eq!(points[0], points[4]);
        prop_assert_eq!(points[0].to_string(), format!("{lng1} {lat1}"));
        prop_assert_eq!(points[2].to_string(), format!("{lng2} {lat2}"));
    }

    #[test]
    fn radius_is_converted_to_metres(
        lat in coordinate(),
        lng in coordinate(),
        radius_km in 0u32..10_000,
    ) {
        let input = format!("{lat},{lng},{radius_km}");
        let filter = location_filter(&input).unwrap().unwrap();

        let metres: f64 = filter.rsplit(" le ").next().unwrap().parse().unwrap();
        prop_assert_eq!(metres, f64::from(radius_km) * 1000.0);
        let point = format!("POINT({lng} {lat})");
        prop_assert!(filter.contains(&point));
    }

    #[test]
    fn other_arities_produce_no_filter(parts in prop::collection::vec(coordinate(), 5..8)) {
        let input = parts
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        prop_assert!(location_filter(&input).unwrap().is_none());
    }

    #[test]
    fn quoted_literals_have_balanced_quotes(text in ".{0,40}") {
        let quoted = quote_literal(&text);
        prop_assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
        let inner = &quoted[1..quoted.len() - 1];
        prop_assert_eq!(inner.replace("''", ""), text.replace('\'', ""));
    }

    #[test]
    fn text_search_is_case_insensitive(text in "[A-Za-z ]{1,20}") {
        prop_assert_eq!(text_search(&text), text_search(&text.to_uppercase()));
    }
}
