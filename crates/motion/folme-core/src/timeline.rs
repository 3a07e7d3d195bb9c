//! Frame scheduler shared by every [`Manager`](crate::Manager).
//!
//! The host constructs one `Timeline` at startup and hands clones of it to
//! everything that animates. The host's display loop calls [`Timeline::frame`]
//! while [`Timeline::is_running`] is true; tests call [`Timeline::tick`] with a
//! fixed delta instead.
//!
//! Dispatch rules:
//! - all callbacks of one pass receive the same clamped, time-scaled delta;
//! - callbacks run in registration order;
//! - a callback registered during a pass first runs on the next pass;
//! - a callback unregistered during a pass is not invoked later in that pass;
//! - a callback returning `Err` is logged and does not stop the pass.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::clock::{Clock, SystemClock};
use crate::config::TimelineConfig;
use crate::error::MotionError;
use crate::ids::{HandleAllocator, TimelineHandle};

/// Callback invoked once per tick with the frame delta in milliseconds.
pub type TickCallback = Box<dyn FnMut(f64) -> anyhow::Result<()>>;

struct TimelineState {
    cfg: TimelineConfig,
    clock: Box<dyn Clock>,
    ids: HandleAllocator,
    callbacks: IndexMap<TimelineHandle, Rc<RefCell<TickCallback>>>,
    running: bool,
    last_timestamp: f64,
    elapsed_ms: f64,
    frames: u64,
}

impl TimelineState {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_timestamp = self.clock.now_ms();
            log::debug!("timeline started");
        }
    }

    fn stop_if_idle(&mut self) {
        if self.running && self.callbacks.is_empty() {
            self.running = false;
            log::debug!("timeline stopped after {} frames", self.frames);
        }
    }
}

/// Shared handle to a frame scheduler. Clones refer to the same scheduler.
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<RefCell<TimelineState>>,
}

/// Non-owning reference to a [`Timeline`], held by registered callbacks.
#[derive(Clone)]
pub struct WeakTimeline {
    inner: Weak<RefCell<TimelineState>>,
}

impl WeakTimeline {
    pub fn upgrade(&self) -> Option<Timeline> {
        self.inner.upgrade().map(|inner| Timeline { inner })
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.borrow();
        f.debug_struct("Timeline")
            .field("callbacks", &st.callbacks.len())
            .field("running", &st.running)
            .field("elapsed_ms", &st.elapsed_ms)
            .field("frames", &st.frames)
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::with_valid_config(TimelineConfig::default(), Box::new(SystemClock::new()))
    }
}

impl Timeline {
    /// Fails when `cfg` is out of range (see [`TimelineConfig::validate`]).
    pub fn new(cfg: TimelineConfig, clock: impl Clock + 'static) -> Result<Self, MotionError> {
        cfg.validate()?;
        Ok(Self::with_valid_config(cfg, Box::new(clock)))
    }

    fn with_valid_config(cfg: TimelineConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimelineState {
                cfg,
                clock,
                ids: HandleAllocator::new(),
                callbacks: IndexMap::new(),
                running: false,
                last_timestamp: 0.0,
                elapsed_ms: 0.0,
                frames: 0,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakTimeline {
        WeakTimeline {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Add a callback. The frame loop starts if this is the first one.
    pub fn register<F>(&self, callback: F) -> TimelineHandle
    where
        F: FnMut(f64) -> anyhow::Result<()> + 'static,
    {
        let mut st = self.inner.borrow_mut();
        let handle = st.ids.alloc();
        let callback: TickCallback = Box::new(callback);
        st.callbacks.insert(handle, Rc::new(RefCell::new(callback)));
        st.start();
        log::trace!("timeline registered {handle:?}");
        handle
    }

    /// Remove a callback. Returns `false` for unknown or already removed handles.
    /// The frame loop stops as soon as the last callback is gone.
    pub fn unregister(&self, handle: TimelineHandle) -> bool {
        let mut st = self.inner.borrow_mut();
        let removed = st.callbacks.shift_remove(&handle).is_some();
        if removed {
            log::trace!("timeline unregistered {handle:?}");
            st.stop_if_idle();
        }
        removed
    }

    pub fn is_registered(&self, handle: TimelineHandle) -> bool {
        self.inner.borrow().callbacks.contains_key(&handle)
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    pub fn callback_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Monotonic animation time (sum of dispatched deltas).
    pub fn elapsed_ms(&self) -> f64 {
        self.inner.borrow().elapsed_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frames
    }

    pub fn time_scale(&self) -> f64 {
        self.inner.borrow().cfg.time_scale
    }

    /// Slow down (> 1) or speed up (< 1) every animation.
    pub fn set_time_scale(&self, factor: f64) -> Result<(), MotionError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(MotionError::InvalidTimeScale { factor });
        }
        self.inner.borrow_mut().cfg.time_scale = factor;
        Ok(())
    }

    /// Dispatch one frame using the clock to measure the raw delta.
    pub fn frame(&self) -> Option<f64> {
        let raw = {
            let mut st = self.inner.borrow_mut();
            if !st.running {
                return None;
            }
            let now = st.clock.now_ms();
            let raw = now - st.last_timestamp;
            st.last_timestamp = now;
            raw
        };
        self.tick(raw)
    }

    /// Dispatch one frame with an explicit raw delta. Returns the delta handed
    /// to the callbacks, or `None` when the loop is idle.
    pub fn tick(&self, raw_dt_ms: f64) -> Option<f64> {
        let (dt, pass) = {
            let mut st = self.inner.borrow_mut();
            if !st.running {
                return None;
            }
            let clamped = if raw_dt_ms.is_finite() {
                raw_dt_ms.clamp(0.0, st.cfg.max_delta_ms)
            } else {
                st.cfg.max_delta_ms
            };
            let dt = clamped / st.cfg.time_scale;
            st.elapsed_ms += dt;
            st.frames += 1;
            let pass: Vec<TimelineHandle> = st.callbacks.keys().copied().collect();
            (dt, pass)
        };

        for handle in pass {
            // Removed earlier in this pass.
            let Some(callback) = self.inner.borrow().callbacks.get(&handle).cloned() else {
                continue;
            };
            let result = match callback.try_borrow_mut() {
                Ok(mut guard) => {
                    let f: &mut TickCallback = &mut guard;
                    f(dt)
                }
                Err(_) => {
                    log::warn!("timeline callback {handle:?} re-entered during dispatch; skipped");
                    continue;
                }
            };
            if let Err(err) = result {
                log::error!("timeline callback {handle:?} failed: {err:#}");
            }
        }

        self.inner.borrow_mut().stop_if_idle();
        Some(dt)
    }

    /// Tick with a fixed delta until no callbacks remain or `max_frames`
    /// passes have run. Returns the number of frames dispatched.
    pub fn run_until_idle(&self, dt_ms: f64, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.tick(dt_ms).is_some() {
            frames += 1;
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;

    fn manual() -> (Timeline, ManualClock) {
        let clock = ManualClock::new();
        (Timeline::new(TimelineConfig::default(), clock.clone()).unwrap(), clock)
    }

    #[test]
    fn idle_timeline_does_not_run() {
        let (tl, _) = manual();
        assert!(!tl.is_running());
        assert_eq!(tl.tick(16.0), None);
        assert_eq!(tl.frame(), None);
        assert_eq!(tl.frame_count(), 0);
    }

    #[test]
    fn unregistering_sole_callback_stops_loop() {
        let (tl, _) = manual();
        let h = tl.register(|_| Ok(()));
        assert!(tl.is_running());
        assert!(tl.unregister(h));
        assert!(!tl.is_running());
        assert!(!tl.unregister(h));
    }

    #[test]
    fn frame_measures_clock_and_clamps() {
        let (tl, clock) = manual();
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        tl.register(move |dt| {
            s.set(dt);
            Ok(())
        });
        clock.advance(16.0);
        assert_eq!(tl.frame(), Some(16.0));
        assert_eq!(seen.get(), 16.0);

        // Suspended host: a 5s gap is clamped.
        clock.advance(5_000.0);
        assert_eq!(tl.frame(), Some(64.0));
        assert_eq!(tl.elapsed_ms(), 80.0);
    }

    #[test]
    fn time_scale_divides_delta() {
        let (tl, _) = manual();
        tl.register(|_| Ok(()));
        tl.set_time_scale(2.0).unwrap();
        assert_eq!(tl.tick(16.0), Some(8.0));
        assert!(tl.set_time_scale(0.0).is_err());
        assert!(tl.set_time_scale(f64::NAN).is_err());
    }

    #[test]
    fn constructor_rejects_out_of_range_config() {
        for (max_delta_ms, time_scale) in [
            (-1.0, 1.0),
            (f64::NAN, 1.0),
            (f64::INFINITY, 1.0),
            (64.0, 0.0),
            (64.0, -2.0),
            (64.0, f64::NAN),
        ] {
            let cfg = TimelineConfig {
                max_delta_ms,
                time_scale,
            };
            let err = Timeline::new(cfg, ManualClock::new()).unwrap_err();
            assert!(
                matches!(err, MotionError::InvalidTimelineConfig { .. }),
                "({max_delta_ms}, {time_scale}) gave {err:?}"
            );
        }

        let zero_clamp = TimelineConfig {
            max_delta_ms: 0.0,
            time_scale: 1.0,
        };
        let tl = Timeline::new(zero_clamp, ManualClock::new()).unwrap();
        tl.register(|_| Ok(()));
        assert_eq!(tl.tick(16.0), Some(0.0));
    }

    #[test]
    fn failing_callback_does_not_stop_dispatch() {
        let (tl, _) = manual();
        let hits = Rc::new(Cell::new(0));
        tl.register(|_| Err(anyhow::anyhow!("boom")));
        let h = hits.clone();
        tl.register(move |_| {
            h.set(h.get() + 1);
            Ok(())
        });
        tl.tick(16.0);
        tl.tick(16.0);
        assert_eq!(hits.get(), 2);
        assert!(tl.is_running());
    }
}
