//! Territory algebra through the public API

use geo::{polygon, Area, MultiPolygon};
use pax_atlas::geometry::approx_eq;
use pax_atlas::{AtlasError, GeometryCache, MemoryProvider, Territory, TerritoryResolver};
use serde_json::json;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
    ]])
}

fn provider() -> MemoryProvider {
    let mut p = MemoryProvider::new();
    p.insert("IND", rect(68.0, 8.0, 90.0, 30.0)).unwrap();
    p.insert("PAK", rect(61.0, 24.0, 75.0, 37.0)).unwrap();
    p.insert("KAS", rect(73.0, 32.0, 80.0, 37.0)).unwrap();
    p
}

#[test]
fn test_resolve_twice_is_identical() {
    let p = provider();
    let mut r = TerritoryResolver::new(&p);
    let t = (Territory::key("IND") | Territory::key("PAK")) - Territory::key("KAS");

    let first = t.resolve(&mut r).unwrap().cloned().unwrap();
    let second = t.resolve(&mut r).unwrap().cloned().unwrap();
    assert_eq!(first, second);

    // A structurally identical fresh tree gives the same geometry too
    let fresh = (Territory::key("IND") | Territory::key("PAK")) - Territory::key("KAS");
    let third = fresh.resolve(&mut r).unwrap().unwrap();
    assert!(approx_eq(&first, third, 1e-9));
}

#[test]
fn test_union_commutes() {
    let p = provider();
    let mut r = TerritoryResolver::new(&p);
    let ab = Territory::key("IND") | Territory::key("PAK");
    let ba = Territory::key("PAK") | Territory::key("IND");
    let ab = ab.resolve(&mut r).unwrap().cloned().unwrap();
    let ba = ba.resolve(&mut r).unwrap().cloned().unwrap();
    assert!(approx_eq(&ab, &ba, 1e-9));
}

#[test]
fn test_self_difference_is_absent() {
    let p = provider();
    let mut r = TerritoryResolver::new(&p);
    for key in ["IND", "PAK", "KAS"] {
        let t = Territory::key(key) - Territory::key(key);
        assert!(t.resolve(&mut r).unwrap().is_none(), "{key} - {key}");
    }
}

#[test]
fn test_union_with_absent_is_identity() {
    let p = provider();
    let mut r = TerritoryResolver::new(&p);
    let absent = Territory::key("KAS") - Territory::key("KAS");
    let t = Territory::key("IND") | absent;
    let g = t.resolve(&mut r).unwrap().unwrap();
    assert!(approx_eq(g, &rect(68.0, 8.0, 90.0, 30.0), 1e-9));
}

#[test]
fn test_geojson_leaf_mixes_with_keys() {
    let p = provider();
    let mut r = TerritoryResolver::new(&p);
    let island = Territory::geojson(json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[79.0, 5.0], [82.0, 5.0], [82.0, 10.0], [79.0, 5.0]]]
        }
    }));
    let t = Territory::key("IND") | island;
    let area = t.resolve(&mut r).unwrap().unwrap().unsigned_area();
    assert!(area > rect(68.0, 8.0, 90.0, 30.0).unsigned_area());
    assert_eq!(r.leaf_fetches(), 2);
}

#[test]
fn test_errors_reach_caller() {
    let p = provider();
    let mut r = TerritoryResolver::new(&p);

    let missing = Territory::key("IND") - Territory::key("ATL");
    assert!(matches!(missing.resolve(&mut r), Err(AtlasError::NotFound(_))));

    let malformed = Territory::geojson(json!({
        "type": "Polygon",
        "coordinates": [[[0, 0], [1, 1], [0, 0]]]
    }));
    assert!(matches!(
        malformed.resolve(&mut r),
        Err(AtlasError::InvalidGeometry(_))
    ));
}

#[test]
fn test_reordered_expression_hits_disk_cache_across_caches() {
    let dir = tempfile::TempDir::new().unwrap();
    let p = provider();

    {
        let mut cache = GeometryCache::new(dir.path());
        let mut r = TerritoryResolver::with_cache(&p, &mut cache);
        (Territory::key("IND") | Territory::key("PAK"))
            .resolve(&mut r)
            .unwrap();
    }

    // A second cache over the same directory stands in for another process
    let mut cache = GeometryCache::new(dir.path());
    {
        let mut r = TerritoryResolver::with_cache(&p, &mut cache);
        let t = Territory::key("PAK") | Territory::key("IND");
        assert!(t.resolve(&mut r).unwrap().is_some());
        assert_eq!(r.combines(), 0);
        assert_eq!(r.leaf_fetches(), 0);
    }
    assert_eq!(cache.stats().disk_hits, 1);
}
