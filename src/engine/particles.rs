use std::time::Duration;

use super::timer::{Scheduler, TimerGuard, TimerId};

pub const FRAME_PERIOD: Duration = Duration::from_millis(16);
const PATH_PHASE_STEP: f32 = 0.618_034;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Particle {
    pub owner_path: usize,
    pub spawn_time: Duration,
    pub duration: Duration,
}

impl Particle {
    pub fn progress(&self, now: Duration) -> Option<f32> {
        let elapsed = now.checked_sub(self.spawn_time)?;
        let duration = self.duration.as_secs_f64();
        if duration <= 0.0 {
            return Some(0.0);
        }

        Some((elapsed.as_secs_f64() / duration).fract() as f32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub path: usize,
    pub progress: f32,
}

#[derive(Debug, Default)]
pub struct ParticleAnimator {
    particles: Vec<Particle>,
    frame: Option<TimerGuard>,
}

impl ParticleAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        scheduler: &mut Scheduler,
        path_count: usize,
        per_path: usize,
        duration: Duration,
    ) {
        self.teardown();
        if path_count == 0 || per_path == 0 || duration.is_zero() {
            return;
        }

        let started_at = scheduler.now();
        self.particles = (0..path_count)
            .flat_map(|path| {
                let phase = ((path as f32) * PATH_PHASE_STEP).fract();
                (0..per_path).map(move |slot| {
                    let offset = (slot as f32 + phase) / per_path as f32;
                    Particle {
                        owner_path: path,
                        spawn_time: started_at + duration.mul_f32(offset),
                        duration,
                    }
                })
            })
            .collect();
        self.frame = Some(scheduler.every(FRAME_PERIOD));
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn owns_timer(&self, timer: TimerId) -> bool {
        self.frame.as_ref().is_some_and(|frame| frame.matches(timer))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn markers(&self, now: Duration) -> Vec<Marker> {
        if !self.is_running() {
            return Vec::new();
        }

        self.particles
            .iter()
            .filter_map(|particle| {
                particle.progress(now).map(|progress| Marker {
                    path: particle.owner_path,
                    progress,
                })
            })
            .collect()
    }

    pub fn teardown(&mut self) {
        self.frame = None;
        self.particles.clear();
    }
}
