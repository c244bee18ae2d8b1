use super::Effect;
use crate::canvas::{self, Canvas, Frame, Rgb};
use std::f32::consts::TAU;

const COLORS: [Rgb; 7] = [
    (255, 0, 68),    // #ff0044
    (0, 255, 204),   // #00ffcc
    (255, 255, 0),   // #ffff00
    (255, 0, 255),   // #ff00ff
    (0, 153, 255),   // #0099ff
    (255, 255, 255), // #ffffff
    (255, 165, 0),   // #ffa500
];

// Per tick, in logical units
const GRAVITY: f32 = 0.05;
const FRICTION: f32 = 0.98;
const ALPHA_DECAY: f32 = 0.01;
const PARTICLE_RADIUS: f32 = 2.0;
const MIN_SPEED: f32 = 2.0;
const SPEED_SPREAD: f32 = 6.0;

const SPAWN_CHANCE: f32 = 0.04;
// Autonomous bursts stay in the upper part of the sky
const SKY_BAND: f32 = 0.6;
// Opacity of the background wash painted every tick; lower = longer trails
const TRAIL_FADE: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intensity {
    /// Autonomous bursts
    Normal,
    /// Click-triggered bursts: more particles, faster
    Intense,
}

impl Intensity {
    pub fn particle_count(self) -> usize {
        match self {
            Intensity::Normal => 50,
            Intensity::Intense => 80,
        }
    }

    pub fn speed_factor(self) -> f32 {
        match self {
            Intensity::Normal => 1.0,
            Intensity::Intense => 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub alpha: f32,
    pub color: Rgb,
}

impl Particle {
    fn new(x: f32, y: f32, color: Rgb, speed_factor: f32, rng: &mut fastrand::Rng) -> Self {
        let angle = rng.f32() * TAU;
        let speed = (rng.f32() * SPEED_SPREAD + MIN_SPEED) * speed_factor;
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            alpha: 1.0,
            color,
        }
    }

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }

    fn step(&mut self) {
        // order matters: friction, gravity, move, fade
        self.vx *= FRICTION;
        self.vy *= FRICTION;
        self.vy += GRAVITY;
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= ALPHA_DECAY;
    }
}

/// The celebration sky. Dropping the engine stops it; nothing else holds
/// its canvas or particles.
pub struct FireworkEngine {
    particles: Vec<Particle>,
    canvas: Canvas,
    // logical units per canvas pixel
    scale: f32,
    rng: fastrand::Rng,
    autonomous: bool,
}

impl FireworkEngine {
    /// Starts an engine on a `width` x `height` pixel surface. A surface with
    /// no area is not drawable, so no engine is started.
    pub fn mount(width: usize, height: usize, scale: f32) -> Option<Self> {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "no drawing surface, fireworks not started");
            return None;
        }
        tracing::debug!(width, height, scale, "firework engine mounted");
        Some(Self {
            particles: Vec::with_capacity(512),
            canvas: Canvas::new(width, height, canvas::background()),
            scale,
            rng: fastrand::Rng::new(),
            autonomous: true,
        })
    }

    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    // manual launches work either way
    pub fn with_autonomous(mut self, enabled: bool) -> Self {
        self.autonomous = enabled;
        self
    }

    pub fn spawn(&mut self, x: f32, y: f32, intensity: Intensity) {
        // one color per burst, (x, y) in logical units
        let color = COLORS[self.rng.usize(0..COLORS.len())];
        let factor = intensity.speed_factor();
        let count = intensity.particle_count();
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle::new(x, y, color, factor, &mut self.rng));
        }
        tracing::trace!(x, y, ?intensity, live = self.particles.len(), "burst");
    }

    // clicks on the sky
    pub fn launch(&mut self, x: f32, y: f32) {
        self.spawn(x, y, Intensity::Intense);
    }

    pub fn tick(&mut self) {
        // translucent wash, never a full clear: this is what leaves trails
        self.canvas.fade(canvas::background(), TRAIL_FADE);

        // dead particles go before the step
        self.particles.retain(Particle::is_alive);

        // integrate in logical units, draw in canvas pixels
        let radius = PARTICLE_RADIUS / self.scale;
        for particle in self.particles.iter_mut() {
            particle.step();
            self.canvas.fill_disc(
                particle.x / self.scale,
                particle.y / self.scale,
                radius,
                particle.color,
                particle.alpha,
            );
        }

        // ambient bursts, upper sky only
        if self.autonomous && self.rng.f32() < SPAWN_CHANCE {
            let (w, h) = self.viewport();
            let x = self.rng.f32() * w;
            let y = self.rng.f32() * h * SKY_BAND;
            self.spawn(x, y, Intensity::Normal);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    // logical size of the sky
    pub fn viewport(&self) -> (f32, f32) {
        (
            self.canvas.width() as f32 * self.scale,
            self.canvas.height() as f32 * self.scale,
        )
    }
}

impl Effect for FireworkEngine {
    fn resize(&mut self, width: usize, height: usize) {
        // particles keep their positions, even ones now outside the sky
        self.canvas.resize(width, height, canvas::background());
        tracing::debug!(width, height, "firework surface resized");
    }

    fn update(&mut self, _dt: f32) {
        // fixed step: one update is one tick
        self.tick();
    }

    fn render(&self, frame: &mut Frame) {
        frame.canvas_mut().copy_from(&self.canvas);
    }
}

impl Drop for FireworkEngine {
    fn drop(&mut self) {
        tracing::debug!(live = self.particles.len(), "firework engine torn down");
    }
}
