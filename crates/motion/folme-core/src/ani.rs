//! One animated scalar property.
//!
//! Integration (`next`) and termination (`next_finish`) are separate steps so
//! a [`Manager`](crate::Manager) can advance every property of a frame before
//! any of them is snapped to its target.

use crate::easing::Easing;
use crate::error::MotionError;
use crate::force::{Force, ForceInfo};
use crate::property::MinVisibleChange;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AniStatus {
    Playing,
    #[default]
    Stopped,
}

/// What drives an `Ani` toward its target.
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// Forces applied in order, threading `(value, speed)` through each.
    Forces(Vec<Force>),
    Easing(Easing),
}

#[derive(Clone, Debug)]
pub struct Ani {
    name: String,
    value: f64,
    speed: f64,
    status: AniStatus,
    motion: Option<Motion>,
    force_info: ForceInfo,
    previous_force_info: ForceInfo,
    min_visible_change: MinVisibleChange,
}

impl Ani {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        let min_visible_change = MinVisibleChange::for_property(&name);
        Self {
            name,
            value,
            speed: 0.0,
            status: AniStatus::Stopped,
            motion: None,
            force_info: ForceInfo::default(),
            previous_force_info: ForceInfo::default(),
            min_visible_change,
        }
    }

    pub fn with_min_visible_change(mut self, change: MinVisibleChange) -> Self {
        self.min_visible_change = change;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn status(&self) -> AniStatus {
        self.status
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == AniStatus::Playing
    }

    #[inline]
    pub fn force_info(&self) -> &ForceInfo {
        &self.force_info
    }

    #[inline]
    pub fn previous_force_info(&self) -> &ForceInfo {
        &self.previous_force_info
    }

    #[inline]
    pub fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    /// Seed the speed (units/second), e.g. for a friction fling.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Assign a new motion and start playing. A force chain keeps the current
    /// speed so retargeting mid-flight stays continuous; an easing restarts
    /// from the current value.
    pub fn to(&mut self, mut motion: Motion) {
        if self.is_playing() {
            log::trace!("ani '{}' retargeted while playing", self.name);
        }
        self.previous_force_info = self.force_info;
        self.force_info = match &mut motion {
            Motion::Forces(chain) => ForceInfo::from_chain(chain),
            Motion::Easing(easing) => {
                easing.start(self.value);
                ForceInfo::for_easing(easing.to())
            }
        };
        self.motion = Some(motion);
        self.status = AniStatus::Playing;
    }

    /// Snap to `value` without animating.
    pub fn set_immediate(&mut self, value: f64) {
        self.previous_force_info = self.force_info;
        self.force_info = ForceInfo {
            target: Some(value),
            immediate: Some(value),
            target_count: 1,
        };
        self.value = value;
        self.speed = 0.0;
        self.motion = None;
        self.status = AniStatus::Stopped;
    }

    pub fn stop(&mut self) {
        self.speed = 0.0;
        self.motion = None;
        self.status = AniStatus::Stopped;
    }

    /// Integrate one step of `dt_ms`. Non-finite results stop the property.
    pub fn next(&mut self, dt_ms: f64) -> Result<(), MotionError> {
        if self.status == AniStatus::Stopped {
            return Ok(());
        }
        match &mut self.motion {
            None => {}
            Some(Motion::Easing(easing)) => {
                let prev = self.value;
                self.value = easing.get_value(dt_ms);
                if dt_ms > 0.0 {
                    self.speed = (self.value - prev) / (dt_ms / 1000.0);
                }
            }
            Some(Motion::Forces(chain)) => {
                if let Some(target) = self.force_info.immediate {
                    self.value = target;
                    self.speed = 0.0;
                } else {
                    let (mut value, mut speed) = (self.value, self.speed);
                    for force in chain.iter() {
                        (value, speed) = force.value_and_speed(value, speed, dt_ms);
                    }
                    self.value = value;
                    self.speed = speed;
                }
            }
        }
        if !(self.value.is_finite() && self.speed.is_finite()) {
            let err = MotionError::NonFinite {
                property: self.name.clone(),
                value: self.value,
                speed: self.speed,
            };
            log::warn!("{err}");
            self.speed = 0.0;
            if let Some(target) = self.force_info.target {
                self.value = target;
            }
            self.motion = None;
            self.status = AniStatus::Stopped;
            return Err(err);
        }
        Ok(())
    }

    /// Termination test. Returns `true` if the property stopped on this call.
    pub fn next_finish(&mut self) -> bool {
        if self.status == AniStatus::Stopped {
            return false;
        }
        let finished = match &self.motion {
            None => true,
            Some(Motion::Easing(easing)) => {
                if easing.is_finished() {
                    self.value = easing.to();
                    true
                } else {
                    false
                }
            }
            Some(Motion::Forces(_)) => {
                if let Some(target) = self.force_info.immediate {
                    self.value = target;
                    true
                } else {
                    let slow = self.speed.abs() < self.min_visible_change.min_visible_speed();
                    let near = self.force_info.target.map_or(true, |target| {
                        (self.value - target).abs() < self.min_visible_change.value()
                    });
                    if slow && near {
                        if let Some(target) = self.force_info.target {
                            self.value = target;
                        }
                        true
                    } else {
                        false
                    }
                }
            }
        };
        if finished {
            self.speed = 0.0;
            self.motion = None;
            self.status = AniStatus::Stopped;
        }
        finished
    }
}
