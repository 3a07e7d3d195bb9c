//! Drives a scene from one snapshot to another.
//!
//! A run keeps a working copy of the scene (`from` plus any added entities)
//! and one or two [`Manager`]s per changed entity: one for numeric
//! properties and one `progress` channel that re-derives colors. Managers
//! write into the working copy; a flush callback registered after them
//! publishes it once per tick. When every sub-animation has completed the
//! working copy is replaced by `to`, published one last time, and the run's
//! completion fires.

use std::cell::RefCell;
use std::rc::Rc;

use folme_core::{
    Manager, MotionError, MotionSpec, PropertyMap, Timeline, TimelineHandle, ToOptions,
    WeakTimeline,
};

use crate::color::interpolate_color;
use crate::config::AnimateConfig;
use crate::diff::{analyze_diff, MatchedEntity, SceneDiff};
use crate::scene::SceneEntity;

const PROGRESS: &str = "progress";

type FrameSink = Box<dyn FnMut(&[SceneEntity])>;
type DoneSink = Box<dyn FnOnce()>;

struct Slot {
    entity: SceneEntity,
    removed: bool,
}

struct RunState {
    slots: Vec<Slot>,
    target: Vec<SceneEntity>,
    pending: usize,
    dirty: bool,
    finished: bool,
    flush: Option<TimelineHandle>,
    on_update: Option<FrameSink>,
    on_complete: Option<DoneSink>,
}

impl RunState {
    fn frame(&self) -> Vec<SceneEntity> {
        self.slots
            .iter()
            .filter(|slot| !slot.removed)
            .map(|slot| slot.entity.clone())
            .collect()
    }
}

type SharedRun = Rc<RefCell<RunState>>;

struct ActiveRun {
    state: SharedRun,
    // Dropping the managers releases their timeline registrations.
    _managers: Vec<Manager>,
}

/// Single-flight scene animator. Starting a run cancels the previous one.
pub struct SmartAnimator {
    timeline: Timeline,
    run: Option<ActiveRun>,
}

impl SmartAnimator {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
            run: None,
        }
    }

    /// Animate from `from` to `to`.
    ///
    /// `on_update` receives the working copy once per tick while the run is in
    /// flight, then `to` once at the end, right before `on_complete`. With no
    /// differences both are called synchronously. An invalid `config` is
    /// rejected before any in-flight run is touched.
    pub fn animate(
        &mut self,
        from: &[SceneEntity],
        to: &[SceneEntity],
        config: &AnimateConfig,
        mut on_update: impl FnMut(&[SceneEntity]) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), MotionError> {
        let diff = analyze_diff(from, to);
        let spec = config.resolve();
        spec.validate(first_property(&diff))?;

        self.stop();

        if diff.is_empty() {
            log::debug!("smart animate: no differences, completing synchronously");
            on_update(to);
            on_complete();
            return Ok(());
        }

        let mut slots: Vec<Slot> = from
            .iter()
            .map(|entity| Slot {
                entity: entity.clone(),
                removed: false,
            })
            .collect();
        let added_base = slots.len();
        slots.extend(diff.added.iter().map(|&j| Slot {
            entity: to[j].clone().with_number("opacity", 0.0),
            removed: false,
        }));

        let state: SharedRun = Rc::new(RefCell::new(RunState {
            slots,
            target: to.to_vec(),
            pending: 0,
            dirty: false,
            finished: false,
            flush: None,
            on_update: Some(Box::new(on_update)),
            on_complete: Some(Box::new(on_complete)),
        }));
        let mut builder = RunBuilder {
            timeline: &self.timeline,
            state: &state,
            spec: &spec,
            managers: Vec::new(),
        };

        for matched in &diff.matched {
            builder.numeric(matched)?;
            builder.colors(matched)?;
        }
        for (k, &j) in diff.added.iter().enumerate() {
            builder.fade(added_base + k, 0.0, to[j].opacity(), false)?;
        }
        for &i in &diff.removed {
            builder.fade(i, from[i].opacity(), 0.0, true)?;
        }
        let managers = builder.managers;

        // Registered last so it runs after every manager of this run.
        let weak = Rc::downgrade(&state);
        let flush = self.timeline.register(move |_dt| {
            if let Some(state) = weak.upgrade() {
                flush_frame(&state);
            }
            Ok(())
        });
        state.borrow_mut().flush = Some(flush);

        log::debug!(
            "smart animate: {} matched, {} added, {} removed, {} managers",
            diff.matched.len(),
            diff.added.len(),
            diff.removed.len(),
            managers.len()
        );
        self.run = Some(ActiveRun {
            state,
            _managers: managers,
        });
        Ok(())
    }

    /// Cancel the in-flight run. Its completion never fires.
    pub fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        let (flush, callbacks) = {
            let mut st = run.state.borrow_mut();
            let was_running = !st.finished;
            st.finished = true;
            if was_running {
                log::debug!("smart animate: run cancelled with {} pending", st.pending);
            }
            (st.flush.take(), (st.on_update.take(), st.on_complete.take()))
        };
        drop(callbacks);
        if let Some(handle) = flush {
            self.timeline.unregister(handle);
        }
    }

    /// Cancel any run and publish `target` once.
    pub fn set_to(&mut self, target: &[SceneEntity], mut on_update: impl FnMut(&[SceneEntity])) {
        self.stop();
        on_update(target);
    }

    pub fn is_animating(&self) -> bool {
        self.run
            .as_ref()
            .map_or(false, |run| !run.state.borrow().finished)
    }
}

impl Drop for SmartAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn first_property(diff: &SceneDiff) -> &str {
    diff.matched
        .first()
        .and_then(|m| m.diffs.first())
        .map_or("opacity", |d| d.property.as_str())
}

struct RunBuilder<'a> {
    timeline: &'a Timeline,
    state: &'a SharedRun,
    spec: &'a MotionSpec,
    managers: Vec<Manager>,
}

impl RunBuilder<'_> {
    /// Start one manager from `start` toward `target`, writing every
    /// published value map through `write`.
    fn launch<W>(
        &mut self,
        start: PropertyMap,
        target: PropertyMap,
        remove_slot: Option<usize>,
        mut write: W,
    ) -> Result<(), MotionError>
    where
        W: FnMut(&mut RunState, &PropertyMap) + 'static,
    {
        let manager = Manager::new(self.timeline);
        manager.set_to(&start)?;

        let sink_state = Rc::downgrade(self.state);
        manager.set_on_update(move |values| {
            if let Some(state) = sink_state.upgrade() {
                let mut st = state.borrow_mut();
                if !st.finished {
                    write(&mut *st, values);
                    st.dirty = true;
                }
            }
        });

        self.state.borrow_mut().pending += 1;
        let done_state = Rc::downgrade(self.state);
        let timeline = self.timeline.downgrade();
        manager.to(
            &target,
            Some(self.spec),
            ToOptions::on_complete(move || {
                if let Some(state) = done_state.upgrade() {
                    complete_one(&state, &timeline, remove_slot);
                }
            }),
        )?;
        self.managers.push(manager);
        Ok(())
    }

    fn numeric(&mut self, matched: &MatchedEntity) -> Result<(), MotionError> {
        let mut start = PropertyMap::new();
        let mut target = PropertyMap::new();
        for diff in matched.numeric() {
            if let (Some(a), Some(b)) = (diff.from.as_number(), diff.to.as_number()) {
                start.insert(diff.property.clone(), a);
                target.insert(diff.property.clone(), b);
            }
        }
        if target.is_empty() {
            return Ok(());
        }
        let slot = matched.from_index;
        self.launch(start, target, None, move |st, values| {
            for (property, &value) in values {
                st.slots[slot].entity.set_number(property, value);
            }
        })
    }

    fn colors(&mut self, matched: &MatchedEntity) -> Result<(), MotionError> {
        let channels: Vec<(String, String, String)> = matched
            .colors()
            .filter_map(|diff| {
                Some((
                    diff.property.clone(),
                    diff.from.as_color()?.to_string(),
                    diff.to.as_color()?.to_string(),
                ))
            })
            .collect();
        if channels.is_empty() {
            return Ok(());
        }
        let slot = matched.from_index;
        self.launch(
            PropertyMap::from([(PROGRESS.to_string(), 0.0)]),
            PropertyMap::from([(PROGRESS.to_string(), 1.0)]),
            None,
            move |st, values| {
                let progress = values.get(PROGRESS).copied().unwrap_or(0.0);
                for (property, from, to) in &channels {
                    let color = interpolate_color(from, to, progress);
                    st.slots[slot].entity.set_color(property, color);
                }
            },
        )
    }

    /// Opacity-only run for an added (fade in) or removed (fade out) entity.
    fn fade(&mut self, slot: usize, from: f64, to: f64, remove: bool) -> Result<(), MotionError> {
        self.launch(
            PropertyMap::from([("opacity".to_string(), from)]),
            PropertyMap::from([("opacity".to_string(), to)]),
            remove.then_some(slot),
            move |st, values| {
                if let Some(&opacity) = values.get("opacity") {
                    st.slots[slot].entity.set_number("opacity", opacity);
                }
            },
        )
    }
}

fn flush_frame(state: &SharedRun) {
    let (frame, sink) = {
        let mut st = state.borrow_mut();
        if st.finished || !st.dirty {
            return;
        }
        st.dirty = false;
        (st.frame(), st.on_update.take())
    };
    let mut sink = sink;
    if let Some(cb) = sink.as_mut() {
        cb(&frame);
    }
    let mut st = state.borrow_mut();
    if st.on_update.is_none() && !st.finished {
        st.on_update = sink;
    }
}

fn complete_one(state: &SharedRun, timeline: &WeakTimeline, remove_slot: Option<usize>) {
    let finished = {
        let mut st = state.borrow_mut();
        if st.finished {
            return;
        }
        if let Some(slot) = remove_slot {
            st.slots[slot].removed = true;
            st.dirty = true;
        }
        st.pending = st.pending.saturating_sub(1);
        if st.pending > 0 {
            return;
        }
        st.finished = true;
        (
            std::mem::take(&mut st.target),
            st.flush.take(),
            st.on_update.take(),
            st.on_complete.take(),
        )
    };
    let (target, flush, on_update, on_complete) = finished;
    if let (Some(handle), Some(timeline)) = (flush, timeline.upgrade()) {
        timeline.unregister(handle);
    }
    log::trace!("smart animate: run complete");
    if let Some(mut on_update) = on_update {
        on_update(&target);
    }
    if let Some(on_complete) = on_complete {
        on_complete();
    }
}
