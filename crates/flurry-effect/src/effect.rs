//! The snowfall effect controller: particle collection, frame loop and fill pass.

use flurry_core::{ConfigError, ConfigOverrides, EffectConfig, FillMode};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, trace};

use crate::particle::Particle;
use crate::schedule::{Clock, FrameHandle, FrameScheduler, delta_factor};
use crate::surface::Surface;

/// A running snowfall effect attached to one surface.
#[derive(Debug)]
pub struct SnowfallEffect<S, F, C> {
    surface: S,
    scheduler: F,
    clock: C,
    config: EffectConfig,
    /// Draw order, later entries paint over earlier ones.
    particles: Vec<Particle>,
    last_tick_ms: f64,
    /// Armed frame, `None` while paused.
    frame: Option<FrameHandle>,
    rng: StdRng,
}

impl<S, F, C> SnowfallEffect<S, F, C>
where
    S: Surface,
    F: FrameScheduler,
    C: Clock,
{
    /// Merge `overrides` onto the defaults, spawn the particles and start playing.
    pub fn new(
        surface: S,
        scheduler: F,
        clock: C,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(surface, scheduler, clock, overrides, StdRng::from_entropy())
    }

    /// Like [`SnowfallEffect::new`] with a reproducible particle stream.
    pub fn with_seed(
        surface: S,
        scheduler: F,
        clock: C,
        overrides: &ConfigOverrides,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(surface, scheduler, clock, overrides, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        surface: S,
        scheduler: F,
        clock: C,
        overrides: &ConfigOverrides,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        let config = EffectConfig::default().merge(overrides);
        config.validate()?;

        let last_tick_ms = clock.now_ms();
        let mut effect = Self {
            surface,
            scheduler,
            clock,
            config,
            particles: Vec::new(),
            last_tick_ms,
            frame: None,
            rng,
        };
        effect.spawn(effect.config.snowflake_count);
        debug!(
            count = effect.particles.len(),
            direction = effect.config.direction.name(),
            "snowfall effect created"
        );

        effect.play();
        Ok(effect)
    }

    /// Handle a due frame: advance by the elapsed time, render, and rearm.
    ///
    /// Does nothing while paused, so a stale callback cannot restart the loop.
    pub fn tick(&mut self) {
        if self.frame.take().is_none() {
            return;
        }
        self.run_frame();
    }

    fn run_frame(&mut self) {
        let now = self.clock.now_ms();
        let elapsed = now - self.last_tick_ms;
        self.last_tick_ms = now;

        let delta = delta_factor(elapsed);
        trace!(elapsed, delta, "tick");
        self.render_frame(delta);
        self.frame = Some(self.scheduler.request_frame());
    }

    /// Advance every particle by `delta` and redraw them all.
    ///
    /// Opacity above 1 is painted fully opaque.
    pub fn render_frame(&mut self, delta: f64) {
        let width = self.surface.width();
        let height = self.surface.height();

        for particle in &mut self.particles {
            particle.advance(&mut self.rng, width, height, delta);
        }

        let surface = &mut self.surface;
        surface.reset_transform();
        surface.clear_rect(0.0, 0.0, width, height);

        match self.config.fill_mode {
            FillMode::Batched => {
                // Alpha is global paint state, so only the last particle's opacity survives to the fill.
                surface.begin_path();
                for particle in &self.particles {
                    surface.set_global_alpha(particle.opacity.clamp(0.0, 1.0));
                    particle.trace(surface);
                }
                surface.set_fill_color(self.config.color);
                surface.fill();
            }
            FillMode::PerParticle => {
                surface.set_fill_color(self.config.color);
                for particle in &self.particles {
                    surface.begin_path();
                    surface.set_global_alpha(particle.opacity.clamp(0.0, 1.0));
                    particle.trace(surface);
                    surface.fill();
                }
            }
        }
        surface.set_global_alpha(1.0);
    }

    /// Start the loop if it is not already running.
    ///
    /// Renders one frame right away; the clock is reset first so a long pause
    /// does not turn into one large jump.
    pub fn play(&mut self) {
        if self.frame.is_some() {
            return;
        }
        debug!("snowfall resumed");
        self.last_tick_ms = self.clock.now_ms();
        self.run_frame();
    }

    /// Alias of [`SnowfallEffect::play`].
    pub fn resume(&mut self) {
        self.play();
    }

    /// Cancel the pending frame. Idempotent.
    pub fn pause(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.scheduler.cancel_frame(handle);
            debug!("snowfall paused");
        }
    }

    /// Whether a frame is armed, i.e. the effect is not paused.
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    /// Merge `overrides` into the current config and resize the population.
    ///
    /// Existing particles are never resampled. Growth appends new particles,
    /// shrinking drops the most recently added ones. On error nothing changes.
    pub fn reconfigure(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        let config = self.config.merge(overrides);
        config.validate()?;
        self.config = config;

        let target = self.config.snowflake_count;
        let current = self.particles.len();
        if target > current {
            self.spawn(target - current);
        } else {
            self.particles.truncate(target);
        }
        debug!(from = current, to = target, "snowfall reconfigured");
        Ok(())
    }

    /// Stop the loop and detach from the host, handing the surface back.
    pub fn teardown(mut self) -> S {
        self.pause();
        self.surface.detach();
        debug!("snowfall torn down");
        self.surface
    }

    fn spawn(&mut self, count: usize) {
        let width = self.surface.width();
        let height = self.surface.height();
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = Particle::new(&mut self.rng, width, height, &self.config);
            self.particles.push(particle);
        }
    }

    /// Number of live particles.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Live particles in draw order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The merged config new particles are created from.
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// The surface being drawn on.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for hosts that resize their surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The scheduler holding the armed frame, if any.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{FRAME_TIME_MS, ManualClock, PolledScheduler};
    use crate::surface::{DrawOp, RecordingSurface};

    type TestEffect = SnowfallEffect<RecordingSurface, PolledScheduler, ManualClock>;

    fn effect(overrides: ConfigOverrides) -> (TestEffect, ManualClock) {
        let clock = ManualClock::new(1_000.0);
        let effect = SnowfallEffect::with_seed(
            RecordingSurface::new(320.0, 240.0),
            PolledScheduler::new(),
            clock.clone(),
            &overrides,
            9,
        )
        .unwrap();
        (effect, clock)
    }

    #[test]
    fn test_new_spawns_and_starts() {
        let (effect, _) = effect(ConfigOverrides::count(25));
        assert_eq!(effect.particle_count(), 25);
        assert!(effect.is_running());
        assert!(effect.scheduler().is_pending());
        // play() draws the first frame immediately
        assert_eq!(effect.surface().arcs_in_last_frame(), 25);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let clock = ManualClock::new(0.0);
        let result = SnowfallEffect::new(
            RecordingSurface::new(10.0, 10.0),
            PolledScheduler::new(),
            clock,
            &ConfigOverrides {
                radius: Some(flurry_core::Range::new(3.0, 1.0)),
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfig { field: "radius", .. })
        ));
    }

    #[test]
    fn test_batched_frame_issues_single_fill() {
        let (mut effect, _) = effect(ConfigOverrides::count(3));
        effect.surface_mut().clear_ops();
        effect.render_frame(1.0);

        let ops = effect.surface().ops();
        let fills = ops.iter().filter(|op| **op == DrawOp::Fill).count();
        assert_eq!(fills, 1);
        assert_eq!(ops[0], DrawOp::ResetTransform);
        assert_eq!(
            ops[1],
            DrawOp::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 320.0,
                height: 240.0
            }
        );
        assert_eq!(ops[2], DrawOp::BeginPath);
        assert_eq!(ops.last(), Some(&DrawOp::SetGlobalAlpha(1.0)));
    }

    #[test]
    fn test_batched_fill_uses_last_particle_opacity() {
        let (mut effect, _) = effect(ConfigOverrides {
            snowflake_count: Some(5),
            opacity: Some(flurry_core::Range::new(0.1, 0.9)),
            ..Default::default()
        });
        effect.surface_mut().clear_ops();
        effect.render_frame(1.0);

        let ops = effect.surface().ops();
        let fill_at = ops.iter().position(|op| *op == DrawOp::Fill).unwrap();
        let alpha_at_fill = ops[..fill_at].iter().rev().find_map(|op| match op {
            DrawOp::SetGlobalAlpha(alpha) => Some(*alpha),
            _ => None,
        });
        let last_opacity = effect.particles().last().map(|p| p.opacity);
        assert_eq!(alpha_at_fill, last_opacity);
    }

    #[test]
    fn test_opacity_above_one_is_clamped_at_render() {
        for fill_mode in [FillMode::Batched, FillMode::PerParticle] {
            let (mut effect, _) = effect(ConfigOverrides {
                snowflake_count: Some(6),
                opacity: Some(flurry_core::Range::new(1.2, 1.8)),
                fill_mode: Some(fill_mode),
                ..Default::default()
            });
            effect.surface_mut().clear_ops();
            effect.render_frame(1.0);

            assert!(effect.particles().iter().all(|p| p.opacity > 1.0));
            let alphas: Vec<f64> = effect
                .surface()
                .ops()
                .iter()
                .filter_map(|op| match op {
                    DrawOp::SetGlobalAlpha(alpha) => Some(*alpha),
                    _ => None,
                })
                .collect();
            assert!(!alphas.is_empty());
            assert!(alphas.iter().all(|&alpha| alpha == 1.0), "{alphas:?}");
        }
    }

    #[test]
    fn test_per_particle_fill_mode() {
        let (mut effect, _) = effect(ConfigOverrides {
            snowflake_count: Some(4),
            fill_mode: Some(FillMode::PerParticle),
            ..Default::default()
        });
        effect.surface_mut().clear_ops();
        effect.render_frame(1.0);

        let fills = effect
            .surface()
            .ops()
            .iter()
            .filter(|op| **op == DrawOp::Fill)
            .count();
        assert_eq!(fills, 4);
    }

    #[test]
    fn test_move_to_starts_at_circle_edge() {
        let (mut effect, _) = effect(ConfigOverrides::count(1));
        effect.surface_mut().clear_ops();
        effect.render_frame(1.0);

        let p = effect.particles()[0].geometry();
        let ops = effect.surface().ops();
        assert!(ops.contains(&DrawOp::MoveTo {
            x: p.x + p.radius,
            y: p.y
        }));
        assert!(ops.contains(&DrawOp::Arc {
            x: p.x,
            y: p.y,
            radius: p.radius
        }));
    }

    #[test]
    fn test_tick_uses_elapsed_time() {
        let (mut effect, clock) = effect(ConfigOverrides {
            snowflake_count: Some(1),
            change_frequency: Some(10_000),
            ..Default::default()
        });
        let before = effect.particles()[0].clone();

        clock.advance(FRAME_TIME_MS * 4.0);
        effect.tick();

        let mut expected = before;
        expected.advance(&mut StdRng::seed_from_u64(0), 320.0, 240.0, 4.0);
        let after = &effect.particles()[0];
        assert!((after.y - expected.y).abs() < 1e-9);
        assert!((after.x - expected.x).abs() < 1e-9);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let (mut effect, clock) = effect(ConfigOverrides::count(2));
        effect.pause();
        effect.pause();
        assert!(!effect.is_running());
        assert!(!effect.scheduler().is_pending());
        assert_eq!(effect.scheduler().cancelled(), 1);

        // A stale tick while paused does nothing.
        let frozen = effect.particles().to_vec();
        effect.tick();
        assert_eq!(effect.particles(), frozen.as_slice());

        clock.advance(60_000.0);
        let requested = effect.scheduler().requested();
        effect.resume();
        effect.play();
        assert!(effect.is_running());
        assert_eq!(effect.scheduler().requested(), requested + 1);
    }

    #[test]
    fn test_resume_does_not_catch_up_paused_time() {
        let (mut effect, clock) = effect(ConfigOverrides {
            snowflake_count: Some(1),
            change_frequency: Some(10_000),
            ..Default::default()
        });
        effect.pause();
        let before = effect.particles()[0].clone();

        clock.advance(60_000.0);
        effect.resume();

        let mut expected = before;
        expected.advance(&mut StdRng::seed_from_u64(0), 320.0, 240.0, 1.0);
        assert!((effect.particles()[0].y - expected.y).abs() < 1e-9);
    }

    #[test]
    fn test_reconfigure_rejects_invalid_and_keeps_state() {
        let (mut effect, _) = effect(ConfigOverrides::count(3));
        let config = effect.config().clone();
        let result = effect.reconfigure(&ConfigOverrides {
            snowflake_count: Some(30),
            change_frequency: Some(0),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(effect.config(), &config);
        assert_eq!(effect.particle_count(), 3);
    }

    #[test]
    fn test_teardown_pauses_and_detaches() {
        let (effect, _) = effect(ConfigOverrides::count(2));
        let surface = effect.teardown();
        assert!(surface.is_detached());
        assert_eq!(surface.ops().last(), Some(&DrawOp::Detach));
    }
}
