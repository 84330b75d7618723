// Host-side tests for picking, hover feedback and click dispatch.

use glam::{Quat, Vec3};
use pano_core::constants::{OVERLAY_HOVER_OPACITY, OVERLAY_REST_OPACITY};
use pano_core::interact::{dispatch_click, pick, ray_sphere, Hover, NavAction, PointerTrack, Ray};
use pano_core::placement::face_center;
use pano_core::vector::{tessellate, TriangleMesh};
use pano_core::{Overlay, OverlayKind, OverlaySet, OverlayShape};

fn marker_at(position: Vec3, radius: f32) -> Overlay {
    Overlay {
        kind: OverlayKind::Amenity {
            name: "m".to_string(),
            category: String::new(),
        },
        target: Some("target".to_string()),
        external_url: None,
        position,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        color: "#FFFFFF",
        opacity: OVERLAY_REST_OPACITY,
        base_opacity: OVERLAY_REST_OPACITY,
        shape: OverlayShape::Marker { radius },
        render_order: 0,
    }
}

fn quad_at(position: Vec3, width: f32, height: f32) -> Overlay {
    Overlay {
        kind: OverlayKind::UnitHotspot,
        target: Some("unit1.jpg".to_string()),
        external_url: None,
        position,
        rotation: face_center(position),
        scale: Vec3::ONE,
        color: "#FFFFFF",
        opacity: OVERLAY_REST_OPACITY,
        base_opacity: OVERLAY_REST_OPACITY,
        shape: OverlayShape::Quad { width, height },
        render_order: 0,
    }
}

fn mesh_overlay(position: Vec3, mesh: TriangleMesh) -> Overlay {
    Overlay {
        kind: OverlayKind::Building {
            slug: "tower-a".to_string(),
        },
        target: Some("tower-a-scene".to_string()),
        external_url: None,
        position,
        rotation: face_center(position),
        scale: Vec3::ONE,
        color: "#FFFFFF",
        opacity: OVERLAY_REST_OPACITY,
        base_opacity: OVERLAY_REST_OPACITY,
        shape: OverlayShape::Mesh(mesh),
        render_order: 0,
    }
}

#[test]
fn ray_sphere_hit_and_miss() {
    let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
    assert!(ray_sphere(ray, Vec3::new(0.0, 0.0, -100.0), 8.0).is_some());
    assert!(ray_sphere(ray, Vec3::new(50.0, 0.0, -100.0), 8.0).is_none());
    // Behind the origin never hits.
    assert!(ray_sphere(ray, Vec3::new(0.0, 0.0, 100.0), 8.0).is_none());
}

#[test]
fn pick_markers_by_distance() {
    let mut set = OverlaySet::default();
    set.replace(vec![
        marker_at(Vec3::new(0.0, 0.0, -300.0), 8.0),
        marker_at(Vec3::new(0.0, 0.0, -100.0), 8.0),
    ]);
    let hit = pick(&set, Ray::new(Vec3::ZERO, Vec3::NEG_Z));
    // nearest overlay wins
    assert_eq!(hit, Some(1));
}

#[test]
fn pick_quad_respects_extent() {
    let mut set = OverlaySet::default();
    set.replace(vec![quad_at(Vec3::new(0.0, 0.0, -65.0), 14.0, 14.0)]);

    assert_eq!(pick(&set, Ray::new(Vec3::ZERO, Vec3::NEG_Z)), Some(0));
    // A ray that passes well outside the quad's half-extent misses.
    let off = Vec3::new(30.0, 0.0, -65.0).normalize();
    assert_eq!(pick(&set, Ray::new(Vec3::ZERO, off)), None);
}

#[test]
fn pick_mesh_uses_outline_containment() {
    let square = vec![vec![[-20.0, -20.0], [20.0, -20.0], [20.0, 20.0], [-20.0, 20.0]]];
    let mesh = tessellate(&square);
    let mut set = OverlaySet::default();
    set.replace(vec![mesh_overlay(Vec3::new(0.0, 0.0, -200.0), mesh)]);

    assert_eq!(pick(&set, Ray::new(Vec3::ZERO, Vec3::NEG_Z)), Some(0));
    let outside = Vec3::new(100.0, 0.0, -200.0).normalize();
    assert_eq!(pick(&set, Ray::new(Vec3::ZERO, outside)), None);
}

#[test]
fn hover_dims_and_restores() {
    let mut set = OverlaySet::default();
    set.replace(vec![
        marker_at(Vec3::new(0.0, 0.0, -100.0), 8.0),
        marker_at(Vec3::new(50.0, 0.0, -100.0), 8.0),
    ]);
    let mut hover = Hover::default();

    assert!(hover.update(&mut set, Some(0)));
    assert_eq!(set.get(0).unwrap().opacity, OVERLAY_HOVER_OPACITY);

    // Repeating the same target reports no change.
    assert!(!hover.update(&mut set, Some(0)));

    // Moving to the second overlay restores the first to its base.
    assert!(hover.update(&mut set, Some(1)));
    assert_eq!(set.get(0).unwrap().opacity, OVERLAY_REST_OPACITY);
    assert_eq!(set.get(1).unwrap().opacity, OVERLAY_HOVER_OPACITY);

    assert!(hover.update(&mut set, None));
    assert_eq!(set.get(1).unwrap().opacity, OVERLAY_REST_OPACITY);
}

#[test]
fn generation_bumps_on_replace() {
    let mut set = OverlaySet::default();
    let g0 = set.generation();
    set.replace(vec![marker_at(Vec3::ZERO, 8.0)]);
    assert!(set.generation() > g0);
    let g1 = set.generation();
    set.clear();
    assert!(set.generation() > g1);
    assert!(set.is_empty());
}

#[test]
fn click_dispatch_by_kind() {
    let square = vec![vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]];
    let building = mesh_overlay(Vec3::new(0.0, 0.0, -200.0), tessellate(&square));
    assert_eq!(
        dispatch_click(&building, true),
        NavAction::Navigate {
            target: "tower-a-scene".to_string(),
            push_history: true,
            is_back: false,
            is_unit_scene: false,
            from_building: Some("tower-a".to_string()),
        }
    );

    let unit = quad_at(Vec3::new(0.0, 0.0, -65.0), 14.0, 14.0);
    assert!(matches!(
        dispatch_click(&unit, true),
        NavAction::Navigate { is_unit_scene: true, .. }
    ));

    let mut back = quad_at(Vec3::new(0.0, 0.0, -65.0), 14.0, 14.0);
    back.kind = OverlayKind::BackHotspot;
    assert_eq!(dispatch_click(&back, true), NavAction::Back);
}

#[test]
fn informational_buildings_open_external_urls() {
    let square = vec![vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]];
    let mut building = mesh_overlay(Vec3::new(0.0, 0.0, -200.0), tessellate(&square));
    building.external_url = Some("https://example.com/tower-a".to_string());

    assert_eq!(
        dispatch_click(&building, false),
        NavAction::OpenExternal {
            url: "https://example.com/tower-a".to_string()
        }
    );
    // With navigation enabled the external URL is ignored.
    assert!(matches!(
        dispatch_click(&building, true),
        NavAction::Navigate { .. }
    ));

    building.external_url = None;
    assert_eq!(dispatch_click(&building, false), NavAction::None);
}

#[test]
fn slow_drag_accumulates_past_the_threshold() {
    let mut track = PointerTrack::default();
    track.press(0.0, 0.0);
    // ten one-pixel steps: no single delta crosses the threshold, the
    // total displacement does
    for i in 1..=10 {
        track.motion(i as f32, 0.0);
    }
    assert!(track.dragged());
    assert!(track.release());
}

#[test]
fn jitter_within_the_threshold_is_a_click() {
    let mut track = PointerTrack::default();
    track.press(100.0, 100.0);
    track.motion(102.0, 101.0);
    track.motion(99.0, 100.0);
    track.motion(101.0, 102.0);
    assert!(!track.dragged());
    assert!(!track.release());
}

#[test]
fn a_drag_stays_a_drag_after_returning_to_the_press_point() {
    let mut track = PointerTrack::default();
    track.press(0.0, 0.0);
    track.motion(10.0, 0.0);
    track.motion(0.0, 0.0);
    assert!(track.release());
}

#[test]
fn motion_reports_per_move_deltas() {
    let mut track = PointerTrack::default();
    track.press(0.0, 0.0);
    assert_eq!(track.motion(3.0, 4.0), (3.0, 4.0));
    assert_eq!(track.motion(5.0, 4.0), (2.0, 0.0));
}

#[test]
fn hover_motion_without_a_press_never_drags() {
    let mut track = PointerTrack::default();
    track.motion(50.0, 50.0);
    track.motion(500.0, 500.0);
    assert!(!track.is_down());
    assert!(!track.dragged());
    assert!(!track.release());
}
