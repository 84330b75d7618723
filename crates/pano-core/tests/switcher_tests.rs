// Host-side tests for the transition state machine and history stack.

use pano_core::{
    parse_building_statuses, parse_scene_set, EngineError, History, OverlayKind, Phase,
    SwitchOptions, Switcher,
};

fn scenes() -> Vec<pano_core::Scene> {
    parse_scene_set(
        r#"[
          {"id": "lobby", "image": "lobby.jpg",
           "images": [{"key": "day", "image": "lobby_day.jpg"}]},
          {"id": "tower-a-scene", "image": "tower-a.jpg",
           "images": [{"key": "day", "image": "tower-a_day.jpg"}]},
          {"id": "unit-1", "image": "unit1.jpg"}
        ]"#,
    )
    .unwrap()
}

fn statuses() -> Vec<pano_core::BuildingStatus> {
    parse_building_statuses(
        r#"[{
            "slug": "tower-a",
            "status": 1,
            "building_type": {"slug": "type_a"},
            "panoramas": [
              {"id": "day", "latitude": 5.0, "longitude": 10.0, "image": "unit1.jpg"},
              {"id": "day-b", "latitude": -5.0, "longitude": 40.0, "image": "unit2.jpg"}
            ]
        }]"#,
    )
}

#[test]
fn begin_resolves_view_mode_image() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    let t = switcher
        .begin(&scenes[1], "day", SwitchOptions::default())
        .unwrap();
    assert_eq!(t.scene_id, "tower-a-scene");
    assert_eq!(t.image_url, "tower-a_day.jpg");
    assert_eq!(switcher.phase(), Phase::AwaitingTexture);
    assert!(!switcher.input_enabled());
}

#[test]
fn begin_falls_back_to_default_image() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    let t = switcher
        .begin(&scenes[2], "day", SwitchOptions::default())
        .unwrap();
    assert_eq!(t.image_url, "unit1.jpg");
}

#[test]
fn concurrent_switch_requests_are_dropped() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    switcher
        .begin(&scenes[1], "day", SwitchOptions::default())
        .unwrap();
    let second = switcher.begin(&scenes[2], "day", SwitchOptions::default());
    assert!(matches!(second, Err(EngineError::Busy)));
    // Still waiting on the first request's texture.
    assert_eq!(switcher.pending_image_url().as_deref(), Some("tower-a_day.jpg"));
}

#[test]
fn texture_failure_restores_idle_and_input() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    switcher
        .begin(&scenes[1], "day", SwitchOptions::default())
        .unwrap();
    let err = switcher.texture_failed();
    assert!(matches!(err, EngineError::TransitionFailed(id) if id == "tower-a-scene"));
    assert_eq!(switcher.phase(), Phase::Idle);
    assert!(switcher.input_enabled());
    // A new switch is accepted immediately.
    assert!(switcher.begin(&scenes[2], "day", SwitchOptions::default()).is_ok());
}

#[test]
fn accepted_switch_requests_one_camera_reset() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    assert!(!switcher.take_camera_reset());

    switcher
        .begin(&scenes[1], "day", SwitchOptions::default())
        .unwrap();
    // The reset fires when the switch is accepted, before the incoming
    // texture is even loaded, and only once per switch.
    assert!(switcher.take_camera_reset());
    assert!(!switcher.take_camera_reset());
    switcher.texture_ready(&[], false);
    assert!(!switcher.take_camera_reset());
}

#[test]
fn fade_levels_sum_to_one_until_done() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    switcher
        .begin(&scenes[1], "day", SwitchOptions::default())
        .unwrap();
    switcher.texture_ready(&[], false);
    assert_eq!(switcher.phase(), Phase::Fading);

    let mut steps = 0;
    loop {
        let fade = switcher.advance().unwrap();
        assert!((fade.incoming + fade.outgoing - 1.0).abs() < 1e-5);
        steps += 1;
        if fade.done {
            break;
        }
        assert!(steps < 100, "fade never completed");
    }
    // 0.02 per frame lands in ~50 frames
    assert!((48..=52).contains(&steps), "took {steps} steps");

    let (scene, _) = switcher.complete().unwrap();
    assert_eq!(scene.id, "tower-a-scene");
    assert_eq!(switcher.phase(), Phase::Idle);
    assert!(switcher.input_enabled());
}

#[test]
fn complete_refuses_before_the_fade_lands() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    switcher
        .begin(&scenes[1], "day", SwitchOptions::default())
        .unwrap();
    switcher.texture_ready(&[], false);
    switcher.advance();
    assert!(switcher.complete().is_none());
}

#[test]
fn arriving_from_a_building_stages_unit_markers() {
    let scenes = scenes();
    let mut switcher = Switcher::new();
    switcher
        .begin(
            &scenes[1],
            "day",
            SwitchOptions {
                from_building: Some("tower-a".to_string()),
                ..SwitchOptions::default()
            },
        )
        .unwrap();
    let staged = switcher.texture_ready(&statuses(), false);
    let units: Vec<_> = staged
        .iter()
        .filter(|o| o.kind == OverlayKind::UnitHotspot)
        .collect();
    // every sub-panorama gets a marker, not just the current view-mode's
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].target.as_deref(), Some("unit1.jpg"));
    assert!(!staged.iter().any(|o| o.kind == OverlayKind::BackHotspot));
}

#[test]
fn unit_scenes_get_a_back_marker_unless_navigating_back() {
    let scenes = scenes();

    let mut switcher = Switcher::new();
    switcher
        .begin(
            &scenes[2],
            "day",
            SwitchOptions {
                is_unit_scene: true,
                ..SwitchOptions::default()
            },
        )
        .unwrap();
    let staged = switcher.texture_ready(&[], true);
    assert!(staged.iter().any(|o| o.kind == OverlayKind::BackHotspot));

    let mut switcher = Switcher::new();
    switcher
        .begin(
            &scenes[2],
            "day",
            SwitchOptions {
                is_unit_scene: true,
                is_back: true,
                ..SwitchOptions::default()
            },
        )
        .unwrap();
    let staged = switcher.texture_ready(&[], true);
    assert!(!staged.iter().any(|o| o.kind == OverlayKind::BackHotspot));
}

#[test]
fn history_is_lifo() {
    let scenes = scenes();
    let mut history = History::new();
    assert!(history.is_empty());
    history.push(&scenes[0]);
    history.push(&scenes[1]);
    assert_eq!(history.len(), 2);
    assert_eq!(history.peek().map(|s| s.id.as_str()), Some("tower-a-scene"));
    assert_eq!(history.pop().map(|s| s.id), Some("tower-a-scene".to_string()));
    assert_eq!(history.pop().map(|s| s.id), Some("lobby".to_string()));
    assert!(history.pop().is_none());
}

#[test]
fn history_entries_are_snapshots() {
    let scenes = scenes();
    let mut history = History::new();
    let mut live = scenes[0].clone();
    history.push(&live);
    live.id = "mutated".to_string();
    assert_eq!(history.pop().map(|s| s.id), Some("lobby".to_string()));
}
