// Host-side tests for hotspot overlay generation.

use pano_core::hotspot::build_hotspots;
use pano_core::vector::parse_vector_doc;
use pano_core::{parse_building_statuses, parse_scene_set, OverlayKind, OverlayShape};

const SCENES: &str = r#"[
  {
    "id": "lobby",
    "image": "lobby.jpg",
    "images": [
      {
        "key": "day",
        "image": "lobby_day.jpg",
        "svg": "lobby_day.svg",
        "controls": {"latitude": 10.0, "longitude": 20.0, "radius": 450.0, "scale": 1.5}
      },
      {
        "key": "night",
        "image": "lobby_night.jpg",
        "svg": "lobby_night.svg",
        "mirrored": true,
        "controls": {"latitude": 10.0, "longitude": 20.0, "radius": 450.0, "scale": 1.5}
      }
    ],
    "buildings": [
      {"id": "b1", "svg": "tower-a", "nextPanorama": "tower-a-scene"},
      {"id": "b2", "svg": "tower-b", "nextPanorama": "tower-b-scene"}
    ],
    "amenities": [
      {"id": "beach-club", "name": "Beach Club", "location": "12.5, -30.0", "category": "Beach"},
      {"id": "bistro", "name": "Bistro", "location": "0, 45", "category": "Restaurants"},
      {"id": "broken", "name": "Broken", "location": "abc", "category": "Beach"}
    ]
  }
]"#;

const STATUSES: &str = r#"[
  {
    "slug": "tower-a",
    "status": 1,
    "building_type": {"slug": "type_a"},
    "panoramas": [{"id": "day", "latitude": 5.0, "longitude": 10.0, "image": "unit1.jpg"}]
  },
  {
    "slug": "tower-b",
    "status": 3,
    "building_type": {"slug": "type_b"},
    "panoramas": [{"id": "night", "latitude": 5.0, "longitude": 10.0, "image": "unit2.jpg"}]
  }
]"#;

const SVG: &str = r#"
  <path id="tower-a" d="M0 0 L40 0 L40 40 L0 40 Z"/>
  <path id="tower-b" d="M50 50 L90 50 L90 90 L50 90 Z"/>
"#;

#[test]
fn builds_meshes_and_markers_for_the_view_mode() {
    let scenes = parse_scene_set(SCENES).unwrap();
    let statuses = parse_building_statuses(STATUSES);
    let doc = parse_vector_doc("lobby_day.svg", SVG).unwrap();

    let overlays = build_hotspots(&scenes[0], "day", &statuses, &doc).unwrap();

    // tower-b only lists the night view-mode, so day gets one building
    // mesh plus the two well-formed amenities.
    let buildings: Vec<_> = overlays
        .iter()
        .filter(|o| matches!(o.kind, OverlayKind::Building { .. }))
        .collect();
    let amenities: Vec<_> = overlays
        .iter()
        .filter(|o| matches!(o.kind, OverlayKind::Amenity { .. }))
        .collect();
    assert_eq!(buildings.len(), 1);
    assert_eq!(amenities.len(), 2);
}

#[test]
fn building_color_follows_status_and_type() {
    let scenes = parse_scene_set(SCENES).unwrap();
    let statuses = parse_building_statuses(STATUSES);
    let doc = parse_vector_doc("lobby_day.svg", SVG).unwrap();

    let day = build_hotspots(&scenes[0], "day", &statuses, &doc).unwrap();
    let tower_a = day
        .iter()
        .find(|o| matches!(&o.kind, OverlayKind::Building { slug } if slug == "tower-a"))
        .unwrap();
    assert_eq!(tower_a.color, "#2196F3");

    let night = build_hotspots(&scenes[0], "night", &statuses, &doc).unwrap();
    let tower_b = night
        .iter()
        .find(|o| matches!(&o.kind, OverlayKind::Building { slug } if slug == "tower-b"))
        .unwrap();
    // status 3 is sold regardless of type
    assert_eq!(tower_b.color, "#F44336");
}

#[test]
fn building_overlays_carry_navigation_targets() {
    let scenes = parse_scene_set(SCENES).unwrap();
    let statuses = parse_building_statuses(STATUSES);
    let doc = parse_vector_doc("lobby_day.svg", SVG).unwrap();

    let overlays = build_hotspots(&scenes[0], "day", &statuses, &doc).unwrap();
    let tower_a = overlays
        .iter()
        .find(|o| matches!(&o.kind, OverlayKind::Building { slug } if slug == "tower-a"))
        .unwrap();
    assert_eq!(tower_a.target.as_deref(), Some("tower-a-scene"));
    assert!(matches!(tower_a.shape, OverlayShape::Mesh(_)));
}

#[test]
fn amenity_markers_are_colored_by_category() {
    let scenes = parse_scene_set(SCENES).unwrap();
    let doc = parse_vector_doc("lobby_day.svg", SVG).unwrap();

    let overlays = build_hotspots(&scenes[0], "day", &[], &doc).unwrap();
    let colors: Vec<_> = overlays
        .iter()
        .filter_map(|o| match &o.kind {
            OverlayKind::Amenity { name, .. } => Some((name.as_str(), o.color)),
            _ => None,
        })
        .collect();
    assert!(colors.contains(&("Beach Club", "#00BCD4")));
    assert!(colors.contains(&("Bistro", "#FF9800")));
    // the malformed "abc" location is skipped entirely
    assert!(!colors.iter().any(|(name, _)| *name == "Broken"));
}

#[test]
fn mirrored_variant_negates_x() {
    let scenes = parse_scene_set(SCENES).unwrap();
    let statuses = parse_building_statuses(STATUSES);
    let doc = parse_vector_doc("lobby_day.svg", SVG).unwrap();

    let night = build_hotspots(&scenes[0], "night", &statuses, &doc).unwrap();
    let day = build_hotspots(&scenes[0], "day", &statuses, &doc).unwrap();
    let mirrored = night
        .iter()
        .find(|o| matches!(o.kind, OverlayKind::Building { .. }))
        .unwrap();
    let plain = day
        .iter()
        .find(|o| matches!(o.kind, OverlayKind::Building { .. }))
        .unwrap();
    assert!((mirrored.position.x + plain.position.x).abs() < 1e-3);
    assert!((mirrored.scale.x + plain.scale.x).abs() < 1e-6);
    assert!((mirrored.scale.y - plain.scale.y).abs() < 1e-6);
}

#[test]
fn missing_view_mode_controls_is_an_error() {
    let scenes = parse_scene_set(
        r#"[{"id": "s", "image": "s.jpg", "images": [{"key": "day", "image": "d.jpg"}]}]"#,
    )
    .unwrap();
    let doc = parse_vector_doc("x.svg", SVG).unwrap();
    assert!(build_hotspots(&scenes[0], "day", &[], &doc).is_err());
    assert!(build_hotspots(&scenes[0], "other", &[], &doc).is_err());
}

#[test]
fn malformed_status_dataset_degrades_to_empty() {
    assert!(parse_building_statuses("not json").is_empty());
    assert!(parse_building_statuses(r#"{"wrong": "shape"}"#).is_empty());
}

#[test]
fn amenity_location_rejects_extra_components() {
    let scenes = parse_scene_set(
        r#"[{
            "id": "s", "image": "s.jpg",
            "images": [{"key": "day", "image": "d.jpg",
                        "controls": {"latitude": 0.0, "longitude": 0.0, "radius": 450.0, "scale": 1.0}}],
            "amenities": [{"id": "a", "name": "A", "location": "1, 2, 3", "category": "Beach"}]
        }]"#,
    )
    .unwrap();
    let doc = parse_vector_doc("x.svg", SVG).unwrap();
    let overlays = build_hotspots(&scenes[0], "day", &[], &doc).unwrap();
    assert!(overlays.is_empty());
}
