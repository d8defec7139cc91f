use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::snake::Direction;

// Loop iterations without a sleep before the loop yields
pub const NUM_DELAYS_FOR_YIELD: u32 = 16;
// Un-rendered catch-up ticks allowed per loop iteration
pub const MAX_FRAMES_SKIPPED: u32 = 5;

/// Run/pause/stop flags and the player's intended direction, written by the
/// input thread and read by the simulation loop.
pub struct SessionControl {
    running: AtomicBool,
    paused: AtomicBool,
    over: AtomicBool,
    direction: AtomicU8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    Stopped,
}

impl SessionControl {
    pub fn new(direction: Direction) -> Self {
        SessionControl {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            over: AtomicBool::new(false),
            direction: AtomicU8::new(direction.to_bits()),
        }
    }

    pub fn set_intended_direction(&self, direction: Direction) {
        self.direction.store(direction.to_bits(), Ordering::Release);
    }

    pub fn intended_direction(&self) -> Direction {
        Direction::from_bits(self.direction.load(Ordering::Acquire))
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn mark_over(&self) {
        self.over.store(true, Ordering::Release);
    }

    pub fn is_over(&self) -> bool {
        self.over.load(Ordering::Acquire)
    }

    pub fn state(&self) -> LoopState {
        if !self.is_running() {
            LoopState::Stopped
        } else if self.is_paused() {
            LoopState::Paused
        } else {
            LoopState::Running
        }
    }
}

pub trait Clock {
    fn now(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
    fn yield_now(&mut self);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn yield_now(&mut self) {
        thread::yield_now();
    }
}

pub trait Simulation {
    fn tick(&mut self);
    fn render(&mut self) -> anyhow::Result<()>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PacingStats {
    pub iterations: u64,
    pub ticks: u64,
    pub frames: u64,
    pub catch_up_ticks: u64,
    pub max_catch_up_per_iteration: u32,
    pub sleeps: u64,
    pub yields: u64,
}

/// Fixed-period loop: tick, render, then sleep off the rest of the period,
/// minus whatever the previous sleep overshot. Time lost to slow frames is
/// banked and paid back with a bounded number of extra, un-rendered ticks.
pub struct SimulationClock<C: Clock> {
    clock: C,
    period: Duration,
    stats: PacingStats,
}

impl<C: Clock> SimulationClock<C> {
    pub fn new(clock: C, period: Duration) -> Self {
        SimulationClock { clock, period, stats: PacingStats::default() }
    }

    pub fn run<S: Simulation>(&mut self, sim: &mut S, control: &SessionControl) -> anyhow::Result<PacingStats> {
        let period = nanos(self.period);
        let mut over_sleep: i64 = 0;
        let mut behind: i64 = 0;
        let mut delays: u32 = 0;
        let mut before = self.clock.now();

        loop {
            let state = control.state();
            if state == LoopState::Stopped {
                break;
            }
            self.stats.iterations += 1;

            if state == LoopState::Running {
                sim.tick();
                self.stats.ticks += 1;
            }
            // Still drawn while paused so the overlay shows up.
            sim.render()?;
            self.stats.frames += 1;

            let after = self.clock.now();
            let remaining = period - nanos(after.saturating_sub(before)) - over_sleep;

            if remaining > 0 {
                self.clock.sleep(Duration::from_nanos(remaining as u64));
                self.stats.sleeps += 1;
                over_sleep = nanos(self.clock.now().saturating_sub(after)) - remaining;
            } else {
                behind -= remaining;
                over_sleep = 0;

                delays += 1;
                if delays >= NUM_DELAYS_FOR_YIELD {
                    self.clock.yield_now();
                    self.stats.yields += 1;
                    delays = 0;
                }
            }

            before = self.clock.now();

            let mut skips = 0;
            while behind > period && skips < MAX_FRAMES_SKIPPED {
                behind -= period;
                if state == LoopState::Running {
                    sim.tick();
                    self.stats.ticks += 1;
                    self.stats.catch_up_ticks += 1;
                }
                skips += 1;
            } // Catch-up
            self.stats.max_catch_up_per_iteration = self.stats.max_catch_up_per_iteration.max(skips);
        } // Pacing loop

        Ok(self.stats)
    }
}

fn nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}
