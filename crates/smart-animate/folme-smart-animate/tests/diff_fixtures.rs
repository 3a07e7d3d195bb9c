use folme_core::MotionSpec;
use folme_smart_animate::{analyze_diff, parse_scene_json, DiffValue, SceneEntity};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScenePair {
    from: Vec<SceneEntity>,
    to: Vec<SceneEntity>,
}

fn pair(name: &str) -> ScenePair {
    folme_test_fixtures::scenes::load(name).expect("load scene fixture")
}

#[test]
fn every_scene_fixture_parses() {
    let keys = folme_test_fixtures::scenes::keys();
    assert!(!keys.is_empty());
    for key in keys {
        let scene = pair(&key);
        assert!(!scene.from.is_empty(), "{key}");
    }
}

#[test]
fn identical_scene_has_no_diff() {
    let scene = pair("identical");
    assert!(analyze_diff(&scene.from, &scene.to).is_empty());
    assert!(analyze_diff(&scene.from, &scene.from).is_empty());
}

#[test]
fn card_move_lists_geometry_changes_in_order() {
    let scene = pair("card-move");
    let diff = analyze_diff(&scene.from, &scene.to);
    assert_eq!(diff.matched.len(), 1);
    let props: Vec<&str> = diff.matched[0]
        .diffs
        .iter()
        .map(|d| d.property.as_str())
        .collect();
    assert_eq!(props, vec!["x", "y", "width"]);
    assert_eq!(diff.matched[0].diffs[2].to, DiffValue::Number(120.0));
}

#[test]
fn recolor_separates_color_channels() {
    let scene = pair("card-recolor");
    let diff = analyze_diff(&scene.from, &scene.to);
    let matched = &diff.matched[0];
    let numeric: Vec<&str> = matched.numeric().map(|d| d.property.as_str()).collect();
    let colors: Vec<&str> = matched.colors().map(|d| d.property.as_str()).collect();
    assert_eq!(numeric, vec!["corner_radius"]);
    // "#000" and "rgb(0, 0, 0)" denote the same stroke.
    assert_eq!(colors, vec!["fill"]);
    assert_eq!(matched.diffs[1].from, DiffValue::Color("#ff0000".into()));
}

#[test]
fn list_reorder_adds_and_removes() {
    let scene = pair("list-add-remove");
    let diff = analyze_diff(&scene.from, &scene.to);
    assert_eq!(diff.matched.len(), 1);
    assert_eq!(diff.matched[0].id, "c");
    assert_eq!(diff.matched[0].from_index, 2);
    assert_eq!(diff.matched[0].to_index, 1);
    assert_eq!(diff.added, vec![2]);
    assert_eq!(diff.removed, vec![1]);
}

#[test]
fn name_fallback_claims_first_candidate() {
    let scene = pair("name-fallback");
    let diff = analyze_diff(&scene.from, &scene.to);
    assert_eq!(diff.matched.len(), 1);
    assert_eq!(diff.matched[0].from_index, 0);
    assert_eq!(diff.matched[0].id, "new-1");
    assert!(diff.added.is_empty());
    assert_eq!(diff.removed, vec![1]);
}

#[test]
fn motion_fixtures_are_valid_specs() {
    for key in folme_test_fixtures::motions::keys() {
        let spec: MotionSpec = folme_test_fixtures::motions::load(&key).expect("load motion");
        spec.validate("x")
            .unwrap_or_else(|err| panic!("{key}: {err}"));
    }
}

#[test]
fn raw_scene_json_matches_typed_load() {
    for key in folme_test_fixtures::scenes::keys() {
        let path = folme_test_fixtures::scenes::path(&key).expect("scene path");
        assert!(path.is_file(), "{key}: {}", path.display());

        let raw = folme_test_fixtures::scenes::json(&key).expect("scene json");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("scene value");
        let from = parse_scene_json(&value["from"].to_string()).expect("from entities");
        let to = parse_scene_json(&value["to"].to_string()).expect("to entities");

        let typed = pair(&key);
        assert_eq!(from, typed.from, "{key}");
        assert_eq!(to, typed.to, "{key}");
    }
}

#[test]
fn raw_motion_json_matches_typed_load() {
    for key in folme_test_fixtures::motions::keys() {
        let raw = folme_test_fixtures::motions::json(&key).expect("motion json");
        let parsed: MotionSpec = serde_json::from_str(&raw).expect("motion spec");
        let typed: MotionSpec = folme_test_fixtures::motions::load(&key).expect("load motion");
        assert_eq!(parsed, typed, "{key}");
    }
}
