//! Countdown timer over a [`Clock`] (C2).
//!
//! The timer is purely observational: it never raises an error, and it
//! never spawns a thread. A host drives it by calling [`Timer::tick`] on
//! its own cadence (an animation frame, a 1 Hz interval, or — in tests —
//! not at all, since [`Timer::get_remaining`] is always accurate without
//! polling).

use std::sync::Arc;

use crate::clock::Clock;

/// An event observed while polling a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Emitted immediately on `start`, then at most once per `tick()` call
    /// that crosses a ~1-second boundary.
    Tick(i64),
    /// Emitted exactly once, when remaining time reaches zero.
    Expire,
}

/// A countdown timer. See module docs for the driving model.
#[derive(Debug)]
pub struct Timer {
    clock: Arc<dyn Clock>,
    duration_ms: i64,
    /// Authoritative remaining value while paused or stopped; while running,
    /// the live value is derived from `running_since_ms`.
    remaining_ms: i64,
    running_since_ms: Option<i64>,
    /// True from `start`/`start_paused` until `stop` or expiry.
    active: bool,
    paused: bool,
    expired_fired: bool,
    last_emitted_remaining: i64,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Timer {
            clock,
            duration_ms: 0,
            remaining_ms: 0,
            running_since_ms: None,
            active: false,
            paused: false,
            expired_fired: false,
            last_emitted_remaining: 0,
        }
    }

    /// Start (or restart) a countdown of `duration_ms`. Fully replaces any
    /// previous timer state — a stale expiry from a prior `start` can never
    /// surface after this call.
    pub fn start(&mut self, duration_ms: i64) -> TimerEvent {
        let now = self.clock.now_ms();
        self.duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.running_since_ms = Some(now);
        self.active = true;
        self.paused = false;
        self.expired_fired = false;
        self.last_emitted_remaining = duration_ms;
        TimerEvent::Tick(duration_ms)
    }

    /// Start already paused, with `remaining_ms` frozen. Used to restore a
    /// session whose timer was mid-pause when the host last shut down.
    pub fn start_paused(&mut self, duration_ms: i64, remaining_ms: i64) {
        self.duration_ms = duration_ms;
        self.remaining_ms = remaining_ms.max(0);
        self.running_since_ms = None;
        self.active = true;
        self.paused = true;
        self.expired_fired = false;
        self.last_emitted_remaining = self.remaining_ms;
    }

    /// Stop the timer. Remaining drops to zero and expiry never fires for
    /// this timer again.
    pub fn stop(&mut self) {
        self.remaining_ms = 0;
        self.running_since_ms = None;
        self.active = false;
        self.paused = false;
    }

    /// No-op if not running or already paused.
    pub fn pause(&mut self) {
        if !self.active || self.paused {
            return;
        }
        if let Some(t0) = self.running_since_ms.take() {
            let elapsed = self.clock.now_ms() - t0;
            self.remaining_ms = (self.remaining_ms - elapsed).max(0);
        }
        self.paused = true;
    }

    /// No-op if not paused. Resumes counting from the frozen remaining, as
    /// if no wall-clock time had passed during the pause.
    pub fn resume(&mut self) {
        if !self.active || !self.paused {
            return;
        }
        self.running_since_ms = Some(self.clock.now_ms());
        self.paused = false;
    }

    /// Remaining time, never observably negative.
    pub fn get_remaining(&self) -> i64 {
        if self.active && !self.paused {
            if let Some(t0) = self.running_since_ms {
                let elapsed = self.clock.now_ms() - t0;
                return (self.remaining_ms - elapsed).max(0);
            }
        }
        self.remaining_ms.max(0)
    }

    pub fn is_running(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Poll for tick/expire events since the last call. Safe to call as
    /// often or as rarely as the host likes; a sparse polling cadence only
    /// coalesces ticks, it never causes a missed expiry.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if !self.active || self.paused {
            return events;
        }
        let remaining = self.get_remaining();
        if remaining <= 0 {
            if !self.expired_fired {
                self.expired_fired = true;
                self.active = false;
                self.running_since_ms = None;
                self.remaining_ms = 0;
                events.push(TimerEvent::Expire);
            }
            return events;
        }
        let last_second = self.last_emitted_remaining.div_euclid(1000);
        let current_second = remaining.div_euclid(1000);
        if current_second < last_second {
            self.last_emitted_remaining = remaining;
            events.push(TimerEvent::Tick(remaining));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn start_emits_immediate_tick_with_full_duration() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock);
        assert_eq!(timer.start(5_000), TimerEvent::Tick(5_000));
        assert_eq!(timer.get_remaining(), 5_000);
        assert!(timer.is_running());
        assert!(!timer.is_paused());
    }

    #[test]
    fn expires_exactly_once_at_zero() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_000);
        clock.advance(1_000);
        assert_eq!(timer.tick(), vec![TimerEvent::Expire]);
        assert!(!timer.is_running());
        // A second tick() after expiry must not fire again.
        assert!(timer.tick().is_empty());
    }

    #[test]
    fn restart_replaces_prior_timer_fully() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_000);
        clock.advance(1_000);
        assert_eq!(timer.tick(), vec![TimerEvent::Expire]);
        timer.start(2_000);
        assert!(timer.is_running());
        assert_eq!(timer.get_remaining(), 2_000);
        // No stale expiry from the first timer.
        assert!(timer.tick().is_empty());
    }

    #[test]
    fn pause_freezes_remaining_across_wall_clock_time() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_500_000);
        clock.advance(100_000);
        timer.pause();
        assert_eq!(timer.get_remaining(), 1_400_000);
        clock.advance(500_000);
        assert_eq!(timer.get_remaining(), 1_400_000, "paused timer must not drift");
        timer.resume();
        clock.advance(100_000);
        assert_eq!(timer.get_remaining(), 1_300_000);
    }

    #[test]
    fn pause_is_idempotent() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_000);
        clock.advance(200);
        timer.pause();
        let remaining_after_first_pause = timer.get_remaining();
        timer.pause();
        assert_eq!(timer.get_remaining(), remaining_after_first_pause);
    }

    #[test]
    fn resume_without_pause_is_a_no_op() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_000);
        clock.advance(200);
        timer.resume();
        assert_eq!(timer.get_remaining(), 800);
    }

    #[test]
    fn stop_zeroes_remaining_and_suppresses_expiry() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_000);
        timer.stop();
        assert_eq!(timer.get_remaining(), 0);
        assert!(!timer.is_running());
        clock.advance(10_000);
        assert!(timer.tick().is_empty());
    }

    #[test]
    fn remaining_never_goes_negative() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start(1_000);
        clock.advance(5_000);
        assert_eq!(timer.get_remaining(), 0);
    }

    #[test]
    fn start_paused_restores_a_frozen_timer() {
        let clock = ManualClock::new(0);
        let mut timer = Timer::new(clock.clone());
        timer.start_paused(1_000, 400);
        assert!(timer.is_running());
        assert!(timer.is_paused());
        assert_eq!(timer.get_remaining(), 400);
        clock.advance(10_000);
        assert_eq!(timer.get_remaining(), 400);
        timer.resume();
        clock.advance(100);
        assert_eq!(timer.get_remaining(), 300);
    }
}
