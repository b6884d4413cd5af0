//! Mock frame sources for tests and hardware-free runs.

use crate::capabilities::FrameSource;
use crate::error::{Result, TrackError};
use crate::frame::Frame;
use std::collections::VecDeque;

/// Simple deterministic RNG for pixel noise (xorshift-style LCG).
///
/// Deterministic so a seeded mock produces the same frames on every run.
#[derive(Debug, Clone)]
struct MockRng {
    state: u64,
}

impl MockRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u8(&mut self) -> u8 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.state >> 56) as u8
    }
}

/// Simulated camera producing a dark particle on a bright field.
///
/// The particle drifts by a fixed velocity per frame, which gives the
/// closed loop something to chase. Noise amplitude is small relative to
/// the particle contrast so the locator is never fooled.
pub struct MockCamera {
    width: u32,
    height: u32,
    background: u8,
    particle: (f64, f64),
    velocity: (f64, f64),
    particle_radius: u32,
    noise_amplitude: u8,
    rng: MockRng,
}

impl MockCamera {
    /// Create a camera with the particle at the frame center and no drift.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: 200,
            particle: (f64::from(width) / 2.0, f64::from(height) / 2.0),
            velocity: (0.0, 0.0),
            particle_radius: 4,
            noise_amplitude: 8,
            rng: MockRng::new(0x5eed),
        }
    }

    /// Place the particle at a specific position.
    pub fn with_particle_at(mut self, x: f64, y: f64) -> Self {
        self.particle = (x, y);
        self
    }

    /// Give the particle a per-frame drift velocity in pixels.
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.velocity = (vx, vy);
        self
    }

    /// Disable pixel noise for exact-position tests.
    pub fn without_noise(mut self) -> Self {
        self.noise_amplitude = 0;
        self
    }

    /// Current particle position.
    pub fn particle(&self) -> (f64, f64) {
        self.particle
    }

    fn render(&mut self) -> Frame {
        let mut frame = Frame::uniform(self.width, self.height, self.background);

        if self.noise_amplitude > 0 {
            for pixel in &mut frame.data {
                let noise = self.rng.next_u8() % self.noise_amplitude;
                *pixel = pixel.saturating_sub(noise);
            }
        }

        // Dark disc with a soft falloff toward the background.
        let (px, py) = self.particle;
        let r = self.particle_radius as i64;
        let cx = px.round() as i64;
        let cy = py.round() as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
                    continue;
                }
                let dist_sq = dx * dx + dy * dy;
                if dist_sq <= r * r {
                    let value = (dist_sq * 120 / (r * r).max(1)) as u8;
                    frame.put(x as u32, y as u32, value);
                }
            }
        }
        frame
    }
}

impl FrameSource for MockCamera {
    fn acquire(&mut self) -> Result<Frame> {
        let frame = self.render();
        self.particle.0 += self.velocity.0;
        self.particle.1 += self.velocity.1;
        Ok(frame)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A source that serves a fixed list of frames, then fails.
///
/// Test scaffolding: the failure mode after exhaustion is configurable so
/// teardown paths can be exercised.
pub struct ScriptedSource {
    width: u32,
    height: u32,
    frames: VecDeque<Frame>,
    served: u64,
    exhaust_as_error: bool,
}

impl ScriptedSource {
    /// Create a source from pre-rendered frames.
    ///
    /// All frames must share the dimensions of the first.
    pub fn new(frames: Vec<Frame>) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0));
        Self {
            width,
            height,
            frames: frames.into(),
            served: 0,
            exhaust_as_error: true,
        }
    }

    /// After the last frame, fail with a capture error instead of a clean
    /// end-of-clip.
    pub fn failing_after_exhaustion(mut self) -> Self {
        self.exhaust_as_error = false;
        self
    }
}

impl FrameSource for ScriptedSource {
    fn acquire(&mut self) -> Result<Frame> {
        match self.frames.pop_front() {
            Some(frame) => {
                self.served += 1;
                Ok(frame)
            }
            None if self.exhaust_as_error => Err(TrackError::SourceExhausted {
                frames: self.served,
            }),
            None => Err(TrackError::CaptureFailed {
                message: "scripted source fault".into(),
            }),
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
