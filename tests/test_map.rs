mod common;

use common::{contractor, incident, records, review};
use rand::{SeedableRng, rngs::StdRng};

use recovery_hub::{
    live::{
        MapLayerAdapter,
        map::{FIRE_PERIMETER, LayerId, MapOverlays, MarkerIcon},
    },
    models::{
        geo::{Bounds, GeoPoint, LatLng},
        record::ReviewKind,
    },
};

#[test]
fn test_geo_point_keeps_lng_lat_order() {
    let point = GeoPoint::from_lat_lng(LatLng {
        lat: 34.05,
        lng: -118.54,
    });

    assert_eq!(point.coordinates, [-118.54, 34.05]);
    assert_eq!(point.lat(), 34.05);
    assert_eq!(point.lng(), -118.54);
    assert_eq!(
        serde_json::to_value(point).unwrap(),
        serde_json::json!({"type": "Point", "coordinates": [-118.54, 34.05]})
    );
}

#[test]
fn test_markers_use_latitude_and_longitude() {
    let snapshot = records(vec![incident("Downed line", 34.05, -118.54)]);
    let mut layer = MapLayerAdapter::community_reports();

    let markers = layer.apply(&snapshot);

    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].lat, 34.05);
    assert_eq!(markers[0].lng, -118.54);
    assert_eq!(markers[0].icon_url, MarkerIcon::Blue.url());
    assert!(markers[0].popup.contains("<b>Community Report</b><br>Downed line"));
    assert!(markers[0].popup.contains("<small>By: user0</small>"));
}

#[test]
fn test_layer_is_redrawn_per_snapshot() {
    let mut layer = MapLayerAdapter::registered_contractors();
    layer.apply(&records(vec![
        contractor("A", "L-1", 34.0, -118.5),
        contractor("B", "L-2", 34.1, -118.6),
    ]));

    let markers = layer.apply(&records(vec![contractor("C", "L-3", 34.2, -118.7)]));

    assert_eq!(markers.len(), 1);
    assert!(markers[0].popup.contains("C"));
    assert_eq!(layer.layer(), LayerId::RegisteredContractors);
}

#[test]
fn test_records_without_location_are_skipped() {
    let mut layer = MapLayerAdapter::community_reports();

    let markers = layer.apply(&records(vec![review(
        ReviewKind::Contractor,
        "Acme",
        4,
        "ok",
    )]));

    assert!(markers.is_empty());
}

#[test]
fn test_popup_text_is_sanitized() {
    let mut layer = MapLayerAdapter::community_reports();

    let markers = layer.apply(&records(vec![incident("<img src=x>", 34.0, -118.5)]));

    assert!(markers[0].popup.contains("&lt;img src=x&gt;"));
}

#[test]
fn test_sample_layers_match_static_counts() {
    let overlays = MapOverlays::generate(&mut StdRng::seed_from_u64(7));

    let counts: Vec<_> = overlays
        .samples
        .iter()
        .map(|s| (s.layer, s.markers.len(), s.live))
        .collect();
    assert_eq!(
        counts,
        vec![
            (LayerId::DestroyedStructures, 200, false),
            (LayerId::PermitsIssued, 19, false),
            (LayerId::WorkInProgress, 165, false),
        ]
    );
    assert_eq!(overlays.samples[0].title, "Destroyed Structures (200 of 6,837)");
    assert_eq!(
        overlays.samples[1].title,
        "Permits Submitted (389 total, 19 approved)"
    );
    assert!(overlays.perimeter.popup.contains("6,837 structures destroyed"));
}

#[test]
fn test_sample_markers_stay_inside_perimeter_box() {
    let bounds = Bounds::of_polygon(&FIRE_PERIMETER).unwrap();
    let overlays = MapOverlays::generate(&mut StdRng::seed_from_u64(42));

    for sample in &overlays.samples {
        for marker in &sample.markers {
            assert!(bounds.contains(LatLng {
                lat: marker.lat,
                lng: marker.lng
            }));
        }
    }
}
