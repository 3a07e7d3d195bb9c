//! Folme core: frame-scheduled property animation.
//!
//! One [`Timeline`] drives any number of [`Manager`]s. A manager owns one
//! [`Ani`] per named property and moves each toward its target with either a
//! chain of physical forces ([`Force`]: spring, friction, immediate) or a
//! time-based [`Easing`]. Everything runs on the host's frame thread; the
//! types are deliberately `!Send`.
//!
//! ```
//! use folme_core::{ManualClock, Manager, PropertyMap, Timeline, TimelineConfig, ToOptions};
//!
//! let timeline = Timeline::new(TimelineConfig::default(), ManualClock::new()).unwrap();
//! let card = Manager::new(&timeline);
//! let mut target = PropertyMap::new();
//! target.insert("x".into(), 120.0);
//! card.to(&target, None, ToOptions::default()).unwrap();
//! timeline.run_until_idle(16.0, 1_000);
//! assert_eq!(card.value("x"), Some(120.0));
//! ```

pub mod ani;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod force;
pub mod ids;
pub mod manager;
pub mod property;
pub mod timeline;

pub use ani::{Ani, AniStatus, Motion};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EasingConfig, ForceConfig, FrictionConfig, MotionSpec, SpringConfig, TimelineConfig};
pub use easing::{CubicBezier, Curve, Easing};
pub use error::MotionError;
pub use force::{Force, ForceInfo, Friction, Spring};
pub use ids::TimelineHandle;
pub use manager::{Manager, ToOptions};
pub use property::{MinVisibleChange, PropertyMap};
pub use timeline::{TickCallback, Timeline, WeakTimeline};
