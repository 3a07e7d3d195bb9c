//! Per-entity coordinator multiplexing many named [`Ani`]s behind one render
//! callback.
//!
//! A `Manager` is registered with its [`Timeline`] exactly while at least one
//! of its properties is playing. Each tick it integrates every playing
//! property, then runs every termination test, then publishes one flat
//! [`PropertyMap`] to the render callback. When the last property stops it
//! unregisters and fires the pending completion callback once.
//!
//! No internal borrow is held while a user callback runs, so callbacks may
//! call back into the same `Manager`.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ani::{Ani, Motion};
use crate::config::{ForceConfig, MotionSpec};
use crate::easing::Easing;
use crate::error::MotionError;
use crate::force::Force;
use crate::ids::TimelineHandle;
use crate::property::PropertyMap;
use crate::timeline::Timeline;

pub type UpdateCallback = Box<dyn FnMut(&PropertyMap)>;
pub type CompleteCallback = Box<dyn FnOnce()>;

/// Options for [`Manager::to`].
#[derive(Default)]
pub struct ToOptions {
    pub on_complete: Option<CompleteCallback>,
}

impl ToOptions {
    pub fn on_complete(f: impl FnOnce() + 'static) -> Self {
        Self {
            on_complete: Some(Box::new(f)),
        }
    }
}

#[derive(Default)]
struct ManagerState {
    properties: IndexMap<String, Ani>,
    ticking: bool,
    registration: Option<TimelineHandle>,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
    destroyed: bool,
}

impl ManagerState {
    fn any_playing(&self) -> bool {
        self.properties.values().any(Ani::is_playing)
    }

    fn values(&self) -> PropertyMap {
        self.properties
            .iter()
            .map(|(name, ani)| (name.clone(), ani.value()))
            .collect()
    }

    fn ani_mut(&mut self, name: &str) -> &mut Ani {
        if !self.properties.contains_key(name) {
            self.properties
                .insert(name.to_string(), Ani::new(name, 0.0));
        }
        &mut self.properties[name]
    }
}

pub struct Manager {
    state: Rc<RefCell<ManagerState>>,
    timeline: Timeline,
}

impl Manager {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManagerState::default())),
            timeline: timeline.clone(),
        }
    }

    /// Install the render sink invoked with all current values once per tick
    /// and once per [`Manager::set_to`].
    pub fn set_on_update(&self, f: impl FnMut(&PropertyMap) + 'static) {
        let mut st = self.state.borrow_mut();
        st.on_update = Some(Box::new(f));
        st.destroyed = false;
    }

    /// Animate every property in `props` toward its value. `spec = None`
    /// uses a critically damped spring. Everything is validated before any
    /// property is touched.
    pub fn to(
        &self,
        props: &PropertyMap,
        spec: Option<&MotionSpec>,
        options: ToOptions,
    ) -> Result<(), MotionError> {
        let default_spec;
        let spec = match spec {
            Some(spec) => spec,
            None => {
                default_spec = MotionSpec::default();
                &default_spec
            }
        };
        if let Some(first) = props.keys().next() {
            spec.validate(first)?;
        }
        let mut motions = Vec::with_capacity(props.len());
        for (name, &target) in props {
            if !target.is_finite() {
                return Err(MotionError::InvalidTarget {
                    property: name.clone(),
                    value: target,
                });
            }
            motions.push((name.as_str(), build_motion(spec, target)?));
        }

        let idle = {
            let mut st = self.state.borrow_mut();
            st.destroyed = false;
            for (name, motion) in motions {
                st.ani_mut(name).to(motion);
            }
            st.on_complete = options.on_complete;
            !st.any_playing()
        };

        if idle {
            // Nothing to animate: complete right away.
            let complete = self.state.borrow_mut().on_complete.take();
            if let Some(complete) = complete {
                complete();
            }
            return Ok(());
        }
        self.ensure_registered();
        Ok(())
    }

    /// Snap properties without animating and render once. Snapping the last
    /// playing property cancels the run without firing its completion.
    pub fn set_to(&self, props: &PropertyMap) -> Result<(), MotionError> {
        if let Some((name, &value)) = props.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MotionError::InvalidTarget {
                property: name.clone(),
                value,
            });
        }
        let (values, on_update, release) = {
            let mut st = self.state.borrow_mut();
            for (name, &value) in props {
                st.ani_mut(name).set_immediate(value);
            }
            let release = if st.any_playing() {
                None
            } else {
                st.on_complete = None;
                st.registration.take()
            };
            (st.values(), st.on_update.take(), release)
        };
        if let Some(handle) = release {
            self.timeline.unregister(handle);
        }
        self.render(&values, on_update);
        Ok(())
    }

    /// Seed a property's speed (units/second), creating it if needed.
    pub fn set_speed(&self, name: &str, speed: f64) {
        self.state.borrow_mut().ani_mut(name).set_speed(speed);
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.state.borrow().properties.get(name).map(Ani::value)
    }

    pub fn speed(&self, name: &str) -> Option<f64> {
        self.state.borrow().properties.get(name).map(Ani::speed)
    }

    pub fn values(&self) -> PropertyMap {
        self.state.borrow().values()
    }

    pub fn is_animating(&self) -> bool {
        self.state.borrow().any_playing()
    }

    /// True while the manager's own tick is integrating.
    pub fn is_ticking(&self) -> bool {
        self.state.try_borrow().map_or(true, |st| st.ticking)
    }

    pub fn is_registered(&self) -> bool {
        self.state.borrow().registration.is_some()
    }

    /// Stop every property where it is. The pending completion is dropped.
    pub fn stop(&self) {
        let release = {
            let mut st = self.state.borrow_mut();
            st.properties.values_mut().for_each(Ani::stop);
            st.on_complete = None;
            st.registration.take()
        };
        if let Some(handle) = release {
            self.timeline.unregister(handle);
        }
    }

    /// Release the timeline registration and drop all state and callbacks.
    /// Calling it again is a no-op.
    pub fn destroy(&self) {
        let (release, update, complete) = {
            let mut st = self.state.borrow_mut();
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            st.properties.clear();
            (
                st.registration.take(),
                st.on_update.take(),
                st.on_complete.take(),
            )
        };
        // User closures are dropped outside the borrow.
        drop((update, complete));
        if let Some(handle) = release {
            self.timeline.unregister(handle);
        }
    }

    fn ensure_registered(&self) {
        if self.state.borrow().registration.is_some() {
            return;
        }
        let weak_state = Rc::downgrade(&self.state);
        let weak_timeline = self.timeline.downgrade();
        let handle = self.timeline.register(move |dt| {
            let (Some(state), Some(timeline)) = (weak_state.upgrade(), weak_timeline.upgrade())
            else {
                return Ok(());
            };
            tick(&state, &timeline, dt).map_err(anyhow::Error::from)
        });
        self.state.borrow_mut().registration = Some(handle);
    }

    fn render(&self, values: &PropertyMap, on_update: Option<UpdateCallback>) {
        render(&self.state, values, on_update);
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn build_motion(spec: &MotionSpec, target: f64) -> Result<Motion, MotionError> {
    Ok(match spec {
        MotionSpec::Forces(chain) => Motion::Forces(
            chain
                .iter()
                .map(|cfg: &ForceConfig| Force::from_config(cfg, target))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        MotionSpec::Easing(cfg) => Motion::Easing(Easing::from_config(cfg, target)?),
    })
}

/// Invoke the render sink outside the borrow, then put it back unless it was
/// replaced or the manager was destroyed meanwhile.
fn render(
    state: &Rc<RefCell<ManagerState>>,
    values: &PropertyMap,
    mut on_update: Option<UpdateCallback>,
) {
    if let Some(cb) = on_update.as_mut() {
        cb(values);
    }
    let mut st = state.borrow_mut();
    if st.on_update.is_none() && !st.destroyed {
        st.on_update = on_update;
    }
}

fn tick(
    state: &Rc<RefCell<ManagerState>>,
    timeline: &Timeline,
    dt: f64,
) -> Result<(), MotionError> {
    let (values, on_update, error) = {
        let mut st = state.borrow_mut();
        st.ticking = true;
        let mut error = None;
        for ani in st.properties.values_mut() {
            if let Err(err) = ani.next(dt) {
                error.get_or_insert(err);
            }
        }
        for ani in st.properties.values_mut() {
            ani.next_finish();
        }
        st.ticking = false;
        (st.values(), st.on_update.take(), error)
    };

    render(state, &values, on_update);

    // The render sink may have started new motion; re-check afterwards.
    let finished = {
        let mut st = state.borrow_mut();
        if st.destroyed || st.any_playing() {
            None
        } else {
            Some((st.registration.take(), st.on_complete.take()))
        }
    };
    if let Some((release, complete)) = finished {
        if let Some(handle) = release {
            timeline.unregister(handle);
        }
        log::trace!("manager finished after {:.1}ms", timeline.elapsed_ms());
        if let Some(complete) = complete {
            complete();
        }
    }

    match error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{SpringConfig, TimelineConfig};
    use crate::easing::Curve;
    use std::cell::Cell;

    fn timeline() -> Timeline {
        Timeline::new(TimelineConfig::default(), ManualClock::new()).unwrap()
    }

    fn props(pairs: &[(&str, f64)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn registration_tracks_playing_properties() {
        let tl = timeline();
        let m = Manager::new(&tl);
        assert!(!m.is_registered());
        m.to(&props(&[("x", 10.0)]), None, ToOptions::default())
            .unwrap();
        assert!(m.is_registered());
        assert!(tl.is_running());
        tl.run_until_idle(16.0, 500);
        assert!(!m.is_registered());
        assert!(!tl.is_running());
        assert_eq!(m.value("x"), Some(10.0));
    }

    #[test]
    fn set_to_renders_once_without_registration() {
        let tl = timeline();
        let m = Manager::new(&tl);
        let renders = Rc::new(Cell::new(0));
        let r = renders.clone();
        m.set_on_update(move |values| {
            assert_eq!(values["opacity"], 0.5);
            r.set(r.get() + 1);
        });
        m.set_to(&props(&[("opacity", 0.5)])).unwrap();
        assert_eq!(renders.get(), 1);
        assert!(!tl.is_running());
    }

    #[test]
    fn completion_fires_exactly_once() {
        let tl = timeline();
        let m = Manager::new(&tl);
        let done = Rc::new(Cell::new(0));
        let d = done.clone();
        m.to(
            &props(&[("x", 100.0), ("opacity", 0.0)]),
            Some(&MotionSpec::spring(SpringConfig::new(0.8, 0.35))),
            ToOptions::on_complete(move || d.set(d.get() + 1)),
        )
        .unwrap();
        tl.run_until_idle(16.0, 1_000);
        tl.tick(16.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn invalid_target_is_rejected_before_mutation() {
        let tl = timeline();
        let m = Manager::new(&tl);
        let err = m
            .to(&props(&[("x", 1.0), ("y", f64::NAN)]), None, ToOptions::default())
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidTarget { .. }));
        assert_eq!(m.value("x"), None);
        assert!(!tl.is_running());

        let bad = MotionSpec::easing(Curve::Linear, -1.0);
        assert!(m.to(&props(&[("x", 1.0)]), Some(&bad), ToOptions::default()).is_err());
    }

    #[test]
    fn stop_drops_completion() {
        let tl = timeline();
        let m = Manager::new(&tl);
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        m.to(
            &props(&[("x", 100.0)]),
            None,
            ToOptions::on_complete(move || d.set(true)),
        )
        .unwrap();
        tl.tick(16.0);
        m.stop();
        assert!(!tl.is_running());
        tl.run_until_idle(16.0, 100);
        assert!(!done.get());
        assert!(m.value("x").unwrap() > 0.0);
    }

    #[test]
    fn destroy_is_idempotent() {
        let tl = timeline();
        let m = Manager::new(&tl);
        m.to(&props(&[("x", 5.0)]), None, ToOptions::default()).unwrap();
        m.destroy();
        m.destroy();
        assert!(!tl.is_running());
        assert_eq!(m.values().len(), 0);
    }

    #[test]
    fn empty_props_complete_synchronously() {
        let tl = timeline();
        let m = Manager::new(&tl);
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        m.to(&PropertyMap::new(), None, ToOptions::on_complete(move || d.set(true)))
            .unwrap();
        assert!(done.get());
        assert!(!tl.is_running());
    }
}
