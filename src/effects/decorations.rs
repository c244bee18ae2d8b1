use super::Effect;
use crate::canvas::{Frame, Rgb};
use noise::{NoiseFn, Perlin};
use std::f32::consts::TAU;

const BULB_COUNT: usize = 12;
const BULB_COLORS: [Rgb; 2] = [
    (251, 191, 36),  // amber
    (248, 113, 113), // red
];
const PULSE_PERIOD: f32 = 2.0;
const BULB_STAGGER: f32 = 0.2;
// Seconds for the whole string to fade in or out
const BULB_FADE: f32 = 1.0;

const BALLOON_COUNT: usize = 15;
const BALLOON_COLORS: [Rgb; 5] = [
    (244, 63, 94),
    (139, 92, 246),
    (6, 182, 212),
    (234, 179, 8),
    (236, 72, 153),
];
const BALLOON_RX: f32 = 1.5;
const BALLOON_RY: f32 = 2.0;
const BALLOON_STRING: i32 = 3;
const BALLOON_OPACITY: f32 = 0.7;

/// A string of pulsing lights along the top edge. Fades in when switched
/// on and out when switched off.
pub struct PartyBulbs {
    width: usize,
    height: usize,
    time: f32,
    active: bool,
    opacity: f32,
}

impl PartyBulbs {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            time: 0.0,
            active: false,
            opacity: 0.0,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    fn brightness(&self, i: usize) -> f32 {
        let phase = (self.time - i as f32 * BULB_STAGGER) / PULSE_PERIOD;
        0.75 + 0.25 * (phase * TAU).cos()
    }
}

impl Effect for PartyBulbs {
    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    fn update(&mut self, dt: f32) {
        self.time += dt;
        if self.time > 10000.0 {
            self.time -= 10000.0;
        }

        let step = dt / BULB_FADE;
        self.opacity = if self.active {
            (self.opacity + step).min(1.0)
        } else {
            (self.opacity - step).max(0.0)
        };
    }

    fn render(&self, frame: &mut Frame) {
        if self.opacity <= 0.0 || self.height < 2 {
            return;
        }
        let spacing = self.width as f32 / BULB_COUNT as f32;
        let canvas = frame.canvas_mut();
        for i in 0..BULB_COUNT {
            let x = (i as f32 + 0.5) * spacing;
            let y = 1.0;
            let color = BULB_COLORS[i % 2];
            let alpha = self.opacity * self.brightness(i);
            canvas.fill_disc(x, y, 1.2, color, alpha * 0.3);
            canvas.fill_disc(x, y, 0.6, color, alpha);
        }
    }
}

struct Balloon {
    left: f32,
    // seconds before it first appears
    wait: f32,
    // seconds into the current rise, always under `duration`
    age: f32,
    duration: f32,
    color: Rgb,
}

/// Balloons drifting up from below the bottom edge, on a loop.
pub struct FloatingBalloons {
    width: usize,
    height: usize,
    time: f32,
    balloons: Vec<Balloon>,
    sway: Perlin,
}

impl FloatingBalloons {
    pub fn new(width: usize, height: usize, rng: &mut fastrand::Rng) -> Self {
        let balloons = (0..BALLOON_COUNT)
            .map(|i| Balloon {
                left: rng.f32(),
                wait: rng.f32() * 5.0,
                age: 0.0,
                duration: 10.0 + rng.f32() * 10.0,
                color: BALLOON_COLORS[i % BALLOON_COLORS.len()],
            })
            .collect();

        Self {
            width,
            height,
            time: 0.0,
            balloons,
            sway: Perlin::new(rng.u32(0..1000)),
        }
    }

    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    // center of each balloon, None while it still waits
    fn positions(&self) -> Vec<Option<(f32, f32)>> {
        let travel = self.height as f32 + 2.0 * (BALLOON_RY + BALLOON_STRING as f32);
        let start = self.height as f32 + BALLOON_RY + BALLOON_STRING as f32;

        self.balloons
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if b.wait > 0.0 {
                    return None;
                }
                let progress = b.age / b.duration;
                let drift = self.sway.get([i as f64 * 10.0, self.time as f64 * 0.3]) as f32;
                let x = b.left * self.width as f32 + drift * 2.0;
                let y = start - progress * travel;
                Some((x, y))
            })
            .collect()
    }
}

impl Effect for FloatingBalloons {
    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    fn update(&mut self, dt: f32) {
        // only drives the sway
        self.time += dt;
        if self.time > 10000.0 {
            self.time -= 10000.0;
        }

        for b in self.balloons.iter_mut() {
            if b.wait > 0.0 {
                b.wait -= dt;
                if b.wait <= 0.0 {
                    b.age = (-b.wait) % b.duration;
                    b.wait = 0.0;
                }
            } else {
                b.age = (b.age + dt) % b.duration;
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let canvas = frame.canvas_mut();
        for (balloon, pos) in self.balloons.iter().zip(self.positions()) {
            let Some((cx, cy)) = pos else { continue };

            let x0 = (cx - BALLOON_RX).floor() as i32;
            let x1 = (cx + BALLOON_RX).ceil() as i32;
            let y0 = (cy - BALLOON_RY).floor() as i32;
            let y1 = (cy + BALLOON_RY).ceil() as i32;
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = (x as f32 + 0.5 - cx) / BALLOON_RX;
                    let dy = (y as f32 + 0.5 - cy) / BALLOON_RY;
                    if dx * dx + dy * dy <= 1.0 {
                        canvas.blend(x, y, balloon.color, BALLOON_OPACITY);
                    }
                }
            }

            let sx = cx.floor() as i32;
            let knot = (cy + BALLOON_RY).ceil() as i32;
            for dy in 0..BALLOON_STRING {
                canvas.blend(sx, knot + dy, (255, 255, 255), 0.2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Frame;

    #[test]
    fn bulbs_fade_in_over_a_second() {
        let mut bulbs = PartyBulbs::new(48, 20);
        bulbs.set_active(true);
        for _ in 0..30 {
            bulbs.update(1.0 / 60.0);
        }
        assert!(bulbs.opacity() > 0.4 && bulbs.opacity() < 0.6);
        for _ in 0..40 {
            bulbs.update(1.0 / 60.0);
        }
        assert_eq!(bulbs.opacity(), 1.0);

        bulbs.set_active(false);
        for _ in 0..70 {
            bulbs.update(1.0 / 60.0);
        }
        assert_eq!(bulbs.opacity(), 0.0);
    }

    #[test]
    fn inactive_bulbs_draw_nothing() {
        let bulbs = PartyBulbs::new(24, 10);
        let mut frame = Frame::new(24, 5, (0, 0, 0));
        bulbs.render(&mut frame);
        for y in 0..10 {
            for x in 0..24 {
                assert_eq!(frame.canvas().get(x, y), Some((0, 0, 0)));
            }
        }
    }

    #[test]
    fn lit_bulbs_alternate_colors_along_the_top() {
        let mut bulbs = PartyBulbs::new(24, 10);
        bulbs.set_active(true);
        bulbs.update(2.0);
        let mut frame = Frame::new(24, 5, (0, 0, 0));
        bulbs.render(&mut frame);

        // bulb cores sit at (1, 1) and (3, 1)
        assert_eq!(frame.canvas().get(1, 1), Some(BULB_COLORS[0]));
        let red = frame.canvas().get(3, 1).unwrap();
        assert!(red.0 > 200 && red.1 < 120);
        assert_eq!(frame.canvas().get(0, 9), Some((0, 0, 0)));
    }

    #[test]
    fn balloons_wait_then_rise() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut balloons = FloatingBalloons::new(80, 40, &mut rng);
        assert_eq!(balloons.len(), 15);

        balloons.update(5.0);
        let first: Vec<f32> = balloons
            .positions()
            .into_iter()
            .map(|p| p.expect("every delay is under five seconds").1)
            .collect();

        balloons.update(1.0);
        for (before, after) in first.iter().zip(balloons.positions()) {
            let (_, y) = after.unwrap();
            assert!(y < *before);
        }
    }

    #[test]
    fn balloon_clocks_stay_small_on_long_runs() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut balloons = FloatingBalloons::new(80, 40, &mut rng);
        for _ in 0..2000 {
            balloons.update(10.0);
        }
        assert!(balloons.time <= 10000.0);
        for b in &balloons.balloons {
            assert_eq!(b.wait, 0.0);
            assert!(b.age >= 0.0 && b.age < b.duration);
        }

        let before: Vec<f32> = balloons.balloons.iter().map(|b| b.age).collect();
        balloons.update(0.5);
        for (b, age) in balloons.balloons.iter().zip(before) {
            let expected = (age + 0.5) % b.duration;
            assert!((b.age - expected).abs() < 1e-3);
        }
        assert!(balloons.positions().iter().all(Option::is_some));
    }

    #[test]
    fn balloons_start_below_the_screen() {
        let mut rng = fastrand::Rng::with_seed(11);
        let balloons = FloatingBalloons::new(80, 40, &mut rng);
        let mut frame = Frame::new(80, 20, (0, 0, 0));
        balloons.render(&mut frame);
        // at t = 0 a balloon is either waiting or still below the edge
        for y in 0..40 {
            for x in 0..80 {
                assert_eq!(frame.canvas().get(x, y), Some((0, 0, 0)));
            }
        }
    }
}
