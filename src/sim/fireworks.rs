/// Fireworks engine: rockets climb, burst into sparks, sparks fall and fade.
///
/// ## Coordinates
///
/// Simulation runs in logical pixels so the motion constants (rocket speed
/// 5–8 px/frame, gravity 0.05 px/frame²) keep their feel at any terminal
/// size. The logical viewport is the surface size times `px_per_cell`;
/// drawing divides back down to surface pixels.
///
/// ## Frame order
///
///   1. Fade the whole surface (constant alpha → trails)
///   2. Maybe launch one rocket
///   3. Advance rockets; a rocket at/above its target bursts and is removed
///   4. Advance sparks; a spark whose life hits zero is removed
///
/// Both collections are compacted in place each frame, so neither ever
/// holds a burst rocket or a dead spark between frames.
///
/// ## Lifecycle
///
/// `activate` arms the frame schedule and subscribes to viewport resizes.
/// `deactivate` (also run on drop) cancels both and discards every entity.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use log::debug;

use crate::config::FireworksConfig;
use crate::domain::color::Rgb;
use super::event::CardEvent;
use super::surface::Surface;
use super::timer::FrameSchedule;

/// Drawn radius of rockets and sparks, logical pixels.
const PARTICLE_RADIUS: f32 = 2.0;
/// Rockets detonate somewhere in the top 40% of the viewport.
const TARGET_BAND: f32 = 0.4;
const ROCKET_SPEED_MIN: f32 = 5.0;
const ROCKET_SPEED_SPAN: f32 = 3.0;
const SPARK_SPEED_MIN: f32 = 2.0;
const SPARK_SPEED_SPAN: f32 = 6.0;

#[derive(Clone, Debug)]
pub struct Rocket {
    pub x: f32,
    pub y: f32,
    pub target_y: f32,
    pub speed: f32,
    pub color: Rgb,
}

#[derive(Clone, Debug)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: u32,
    pub color: Rgb,
}

pub struct FireworksEngine {
    cfg: FireworksConfig,
    rng: fastrand::Rng,
    surface: Surface,
    rockets: Vec<Rocket>,
    sparks: Vec<Spark>,
    frames: FrameSchedule,
    resize_subscribed: bool,
    frame_count: u64,
}

impl FireworksEngine {
    /// Start animating on a surface sized to a `cols × rows` viewport.
    pub fn activate(
        cols: u16,
        rows: u16,
        cfg: FireworksConfig,
        frame_period: Duration,
        rng: fastrand::Rng,
        now: Instant,
    ) -> Self {
        debug!("fireworks: activate on {cols}x{rows}");
        FireworksEngine {
            cfg,
            rng,
            surface: Surface::for_viewport(cols, rows),
            rockets: Vec::new(),
            sparks: Vec::new(),
            frames: FrameSchedule::start(frame_period, now),
            resize_subscribed: true,
            frame_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frames.is_armed()
    }

    /// Viewport changed. Ignored once deactivated.
    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        if self.resize_subscribed {
            self.surface.resize(cols as usize, rows as usize * 2);
        }
    }

    /// Run one frame if the schedule says it's due.
    pub fn poll(&mut self, now: Instant) -> Vec<CardEvent> {
        if self.frames.poll(now) {
            self.tick()
        } else {
            Vec::new()
        }
    }

    /// Stop frames, drop the resize subscription, discard all entities.
    /// Safe to call any number of times.
    pub fn deactivate(&mut self) {
        if self.frames.is_armed() || self.resize_subscribed {
            debug!("fireworks: deactivate after {} frames", self.frame_count);
        }
        self.frames.cancel();
        self.resize_subscribed = false;
        self.rockets.clear();
        self.sparks.clear();
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Logical viewport size.
    fn viewport(&self) -> (f32, f32) {
        (
            self.surface.width() as f32 * self.cfg.px_per_cell,
            self.surface.height() as f32 * self.cfg.px_per_cell,
        )
    }

    // ── Frame ──

    fn tick(&mut self) -> Vec<CardEvent> {
        let mut events = Vec::new();
        self.frame_count += 1;

        self.surface.fade(self.cfg.trail_alpha);

        if self.rng.f32() < self.cfg.launch_chance {
            let rocket = self.new_rocket();
            self.rockets.push(rocket);
            events.push(CardEvent::RocketLaunched);
        }

        let scale = self.cfg.px_per_cell;
        let surface = &mut self.surface;
        let mut bursts = Vec::new();

        self.rockets.retain_mut(|r| {
            r.y -= r.speed;
            if r.y <= r.target_y {
                bursts.push((r.x, r.y, r.color));
                false
            } else {
                surface.fill_circle(r.x / scale, r.y / scale, PARTICLE_RADIUS / scale, r.color);
                true
            }
        });

        for (x, y, color) in bursts {
            self.explode(x, y, color);
            events.push(CardEvent::Burst { x, y, color });
        }

        let gravity = self.cfg.gravity;
        let surface = &mut self.surface;
        self.sparks.retain_mut(|s| {
            s.vy += gravity;
            s.x += s.vx;
            s.y += s.vy;
            s.life = s.life.saturating_sub(1);
            surface.fill_circle(s.x / scale, s.y / scale, PARTICLE_RADIUS / scale, s.color);
            s.life > 0
        });

        events
    }

    fn new_rocket(&mut self) -> Rocket {
        let (w, h) = self.viewport();
        Rocket {
            x: self.rng.f32() * w,
            y: h,
            target_y: self.rng.f32() * h * TARGET_BAND,
            speed: ROCKET_SPEED_MIN + self.rng.f32() * ROCKET_SPEED_SPAN,
            color: Rgb::firework(self.rng.f32() * 360.0),
        }
    }

    fn explode(&mut self, x: f32, y: f32, color: Rgb) {
        self.sparks.reserve(self.cfg.sparks_per_burst);
        for _ in 0..self.cfg.sparks_per_burst {
            let angle = self.rng.f32() * TAU;
            let speed = SPARK_SPEED_MIN + self.rng.f32() * SPARK_SPEED_SPAN;
            self.sparks.push(Spark {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life: self.cfg.spark_life,
                color,
            });
        }
    }
}

impl Drop for FireworksEngine {
    fn drop(&mut self) {
        self.deactivate();
    }
}
