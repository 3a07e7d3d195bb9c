use approx::assert_relative_eq;
use folme_core::{
    Ani, Force, ForceConfig, FrictionConfig, ManualClock, Manager, MinVisibleChange, Motion,
    MotionSpec, PropertyMap, SpringConfig, Timeline, TimelineConfig, ToOptions,
};

fn timeline() -> Timeline {
    Timeline::new(TimelineConfig::default(), ManualClock::new()).unwrap()
}

fn target(name: &str, value: f64) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert(name.to_string(), value);
    props
}

/// Tick until idle, returning every intermediate value of `name`.
fn trace(tl: &Timeline, m: &Manager, name: &str, dt: f64, max_frames: usize) -> Vec<f64> {
    let mut values = Vec::new();
    for _ in 0..max_frames {
        if tl.tick(dt).is_none() {
            return values;
        }
        values.push(m.value(name).unwrap());
    }
    panic!("'{name}' still animating after {max_frames} frames");
}

#[test]
fn critically_damped_spring_never_overshoots() {
    let tl = timeline();
    let m = Manager::new(&tl);
    m.to(&target("x", 100.0), None, ToOptions::default()).unwrap();

    let values = trace(&tl, &m, "x", 16.0, 500);
    assert!(values.windows(2).all(|w| w[1] >= w[0]));
    assert!(values.iter().all(|v| *v <= 100.0));
    assert_eq!(*values.last().unwrap(), 100.0);
}

#[test]
fn underdamped_spring_overshoots_then_settles() {
    let tl = timeline();
    let m = Manager::new(&tl);
    m.to(
        &target("x", 100.0),
        Some(&MotionSpec::spring(SpringConfig::new(0.5, 0.3))),
        ToOptions::default(),
    )
    .unwrap();

    let values = trace(&tl, &m, "x", 16.0, 500);
    let peak = values.iter().cloned().fold(f64::MIN, f64::max);
    assert!(peak > 105.0, "peak {peak}");
    assert!(values.len() < 200, "took {} frames", values.len());
    assert_eq!(m.value("x"), Some(100.0));
    assert_eq!(m.speed("x"), Some(0.0));
}

#[test]
fn stiff_spring_stays_stable_on_long_frames() {
    let tl = timeline();
    let m = Manager::new(&tl);
    m.to(
        &target("x", 1_000.0),
        Some(&MotionSpec::spring(SpringConfig::new(1.0, 0.1))),
        ToOptions::default(),
    )
    .unwrap();

    let values = trace(&tl, &m, "x", 64.0, 500);
    assert!(values.iter().all(|v| v.is_finite() && v.abs() < 2_000.0));
    assert_eq!(m.value("x"), Some(1_000.0));
}

#[test]
fn friction_fling_coasts_to_rest() {
    let tl = timeline();
    let m = Manager::new(&tl);
    m.set_speed("x", 1_500.0);
    m.to(
        &target("x", 0.0),
        Some(&MotionSpec::Forces(vec![ForceConfig::Friction(
            FrictionConfig { friction_ratio: 0.5 },
        )])),
        ToOptions::default(),
    )
    .unwrap();

    trace(&tl, &m, "x", 16.0, 2_000);
    // Continuous decay would travel v0 / 2.1 ≈ 714 before stopping completely.
    let rest = m.value("x").unwrap();
    assert!(rest > 650.0 && rest < 720.0, "rest {rest}");
    assert_eq!(m.speed("x"), Some(0.0));
}

#[test]
fn opacity_uses_alpha_threshold() {
    let tl = timeline();
    let m = Manager::new(&tl);
    m.set_to(&target("opacity", 0.0)).unwrap();
    m.to(&target("opacity", 1.0), None, ToOptions::default()).unwrap();

    // With a pixel threshold the spring would stop near 0.0 already.
    tl.tick(16.0);
    assert!(m.is_animating());
    trace(&tl, &m, "opacity", 16.0, 500);
    assert_eq!(m.value("opacity"), Some(1.0));
}

#[test]
fn linear_easing_is_exact_per_frame() {
    let tl = timeline();
    let m = Manager::new(&tl);
    m.to(
        &target("x", 100.0),
        Some(&MotionSpec::easing(folme_core::Curve::Linear, 200.0)),
        ToOptions::default(),
    )
    .unwrap();
    for _ in 0..5 {
        tl.tick(16.0);
    }
    assert_relative_eq!(m.value("x").unwrap(), 40.0, epsilon = 1e-9);
    assert_eq!(tl.run_until_idle(16.0, 100), 8);
    assert_eq!(m.value("x"), Some(100.0));
}

fn frames_to_rest(mut ani: Ani) -> usize {
    let spring = Force::from_config(&ForceConfig::Spring(SpringConfig::critical()), 100.0).unwrap();
    ani.to(Motion::Forces(vec![spring]));
    for frame in 1..=1_000 {
        ani.next(16.0).unwrap();
        if ani.next_finish() {
            assert_eq!(ani.value(), 100.0);
            return frame;
        }
    }
    panic!("'{}' never came to rest", ani.name());
}

#[test]
fn finer_threshold_settles_later() {
    let coarse = frames_to_rest(Ani::new("x", 0.0));
    let fine = frames_to_rest(Ani::new("x", 0.0).with_min_visible_change(MinVisibleChange::PROGRESS));
    assert!(fine > coarse, "fine {fine} vs coarse {coarse}");
}
