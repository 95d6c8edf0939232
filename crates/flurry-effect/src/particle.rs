//! A single snowflake and its motion rule.

use std::f64::consts::TAU;

use flurry_core::{Direction, EffectConfig, Range};
use rand::Rng;

use crate::sampling::{lerp, sample};
use crate::surface::Surface;

/// Fraction of the remaining velocity gap closed every tick.
pub const SMOOTHING: f64 = 0.01;

/// Motion parameters a particle captures when it is created.
///
/// Retargets sample from these ranges, so later reconfiguration never
/// alters particles that already exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    pub speed: Range,
    pub wind: Range,
    pub rotation_speed: Range,
    pub change_frequency: u32,
    pub direction: Direction,
}

impl From<&EffectConfig> for MotionProfile {
    fn from(config: &EffectConfig) -> Self {
        Self {
            speed: config.speed,
            wind: config.wind,
            rotation_speed: config.rotation_speed,
            change_frequency: config.change_frequency,
            direction: config.direction,
        }
    }
}

/// What the renderer needs to add one filled circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// State of one snowflake.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Horizontal position in surface pixels.
    pub x: f64,
    /// Vertical position in surface pixels.
    pub y: f64,
    /// Fixed for the particle's lifetime.
    pub radius: f64,
    /// Fixed for the particle's lifetime.
    pub opacity: f64,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
    /// Vertical distance per tick, before the direction sign.
    pub speed: f64,
    /// Horizontal distance per tick. Negative drifts left.
    pub wind: f64,
    /// Degrees per tick.
    pub rotation_speed: f64,
    /// Target `speed` drifts toward.
    pub next_speed: f64,
    /// Target `wind` drifts toward.
    pub next_wind: f64,
    /// Target `rotation_speed` drifts toward.
    pub next_rotation_speed: f64,
    frames_since_retarget: u32,
    profile: MotionProfile,
}

impl Particle {
    /// Create a particle with randomized state for a `width` x `height` surface.
    ///
    /// The particle is seeded off-surface on the side it travels in from, so
    /// it drifts into view instead of appearing mid-surface.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        width: f64,
        height: f64,
        config: &EffectConfig,
    ) -> Self {
        let profile = MotionProfile::from(config);
        let y_range = match profile.direction {
            Direction::Down => Range::new(-height, 0.0),
            Direction::Up => Range::new(height, 2.0 * height),
        };

        Self {
            x: rng.gen_range(0.0..1.0) * width,
            y: sample(rng, y_range),
            rotation: sample(rng, Range::new(0.0, 360.0)),
            radius: sample(rng, config.radius),
            speed: sample(rng, profile.speed),
            wind: sample(rng, profile.wind),
            rotation_speed: sample(rng, profile.rotation_speed),
            next_speed: sample(rng, profile.speed),
            next_wind: sample(rng, profile.wind),
            next_rotation_speed: sample(rng, profile.rotation_speed),
            opacity: sample(rng, config.opacity),
            frames_since_retarget: 0,
            profile,
        }
    }

    /// Ranges and direction captured at creation.
    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    /// Ticks since the last retarget.
    pub fn frames_since_retarget(&self) -> u32 {
        self.frames_since_retarget
    }

    /// Advance the particle by one tick scaled by `delta`.
    ///
    /// Only the periodic retarget draws from `rng`.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f64, height: f64, delta: f64) {
        self.wrap_horizontal(width, delta);
        self.move_vertical(height, delta);

        self.rotation = (self.rotation + self.rotation_speed).rem_euclid(360.0);

        self.speed = lerp(self.speed, self.next_speed, SMOOTHING);
        self.wind = lerp(self.wind, self.next_wind, SMOOTHING);
        self.rotation_speed = lerp(self.rotation_speed, self.next_rotation_speed, SMOOTHING);

        self.frames_since_retarget += 1;
        if self.frames_since_retarget > self.profile.change_frequency {
            self.retarget(rng);
            self.frames_since_retarget = 0;
        }
    }

    /// Resample the velocity targets the effective velocity drifts toward.
    pub fn retarget<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.next_speed = sample(rng, self.profile.speed);
        self.next_wind = sample(rng, self.profile.wind);
        self.next_rotation_speed = sample(rng, self.profile.rotation_speed);
    }

    /// Position and size of the circle to draw.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            radius: self.radius,
        }
    }

    /// Append this particle's circle to the surface's current path.
    pub fn trace<S: Surface + ?Sized>(&self, surface: &mut S) {
        let Geometry { x, y, radius } = self.geometry();
        surface.move_to(x + radius, y);
        surface.arc(x, y, radius, 0.0, TAU);
    }

    // Modulo wrap keeps x inside [-radius, width + radius] whatever the wind sign.
    fn wrap_horizontal(&mut self, width: f64, delta: f64) {
        let period = width + 2.0 * self.radius;
        let mut x = self.x + self.wind * delta;
        if period > 0.0 {
            x %= period;
        }
        if x > width + self.radius {
            x = -self.radius;
        }
        if x < -self.radius {
            x = width + self.radius;
        }
        self.x = x;
    }

    // Single edge reset, not a wrap: a particle re-enters exactly at the far side.
    fn move_vertical(&mut self, height: f64, delta: f64) {
        self.y += self.speed * delta * self.profile.direction.sign();
        match self.profile.direction {
            Direction::Down if self.y > height + self.radius => self.y = -self.radius,
            Direction::Up if self.y < -self.radius => self.y = height + self.radius,
            _ => {}
        }
    }
}
