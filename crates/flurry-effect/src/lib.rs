//! Particle snowfall effect engine.
//!
//! A [`SnowfallEffect`] owns a collection of [`Particle`]s and renders them
//! onto any [`Surface`] once per frame. Frames are requested through a
//! [`FrameScheduler`] and timed with a [`Clock`], so the same engine runs
//! under a terminal event loop or a hand-driven test harness.

mod effect;
mod particle;
mod sampling;
mod schedule;
mod surface;

pub use effect::SnowfallEffect;
pub use particle::{Geometry, MotionProfile, Particle, SMOOTHING};
pub use sampling::{lerp, sample};
pub use schedule::{
    Clock, FRAME_TIME_MS, FrameHandle, FrameScheduler, ManualClock, PolledScheduler, SystemClock,
    delta_factor,
};
pub use surface::{DrawOp, RecordingSurface, Surface};
