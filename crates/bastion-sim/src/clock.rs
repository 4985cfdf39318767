//! Day/night clock.
//!
//! The clock counts time inside the current phase and flips between day and
//! night when the phase runs out. Subscribers registered for a transition
//! run synchronously inside `advance`, in registration order. `advance` also
//! returns the transition so the engine can react to it with world access
//! (the night wave) before any actor updates in the same tick.
//!
//! At most one transition happens per `advance` call. A delta long enough to
//! cover several phases still flips only once; the remainder is discarded
//! because elapsed time restarts from zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use bastion_core::constants::{DAY_CYCLE_SHARE, NIGHT_FRACTION, SUNSET_DARKNESS};
use bastion_core::enums::DayPhase;
use bastion_core::state::ClockView;
use bastion_core::types::sanitize_delta_ms;

/// A phase change produced by [`Clock::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTransition {
    /// Night fell on day `day_count`.
    NightStarted { day_count: u32 },
    /// A new day `day_count` began.
    DayStarted { day_count: u32 },
}

/// Callback invoked on a phase transition.
pub type PhaseCallback = Box<dyn FnMut(&PhaseTransition) + Send>;

pub struct Clock {
    day_duration_ms: f64,
    night_duration_ms: f64,
    elapsed_ms: f64,
    is_day: bool,
    day_count: u32,
    day_start: Vec<PhaseCallback>,
    night_start: Vec<PhaseCallback>,
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("day_duration_ms", &self.day_duration_ms)
            .field("night_duration_ms", &self.night_duration_ms)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("is_day", &self.is_day)
            .field("day_count", &self.day_count)
            .field("day_start_subscribers", &self.day_start.len())
            .field("night_start_subscribers", &self.night_start.len())
            .finish()
    }
}

impl Clock {
    /// A clock at the start of day 1. Night lasts half a day.
    pub fn new(day_duration_ms: f64) -> Self {
        Self {
            day_duration_ms,
            night_duration_ms: day_duration_ms * NIGHT_FRACTION,
            elapsed_ms: 0.0,
            is_day: true,
            day_count: 1,
            day_start: Vec::new(),
            night_start: Vec::new(),
        }
    }

    /// Accumulate `delta_ms` and perform at most one phase transition.
    pub fn advance(&mut self, delta_ms: f64) -> Option<PhaseTransition> {
        self.elapsed_ms += sanitize_delta_ms(delta_ms);

        if self.is_day && self.elapsed_ms >= self.day_duration_ms {
            self.elapsed_ms = 0.0;
            self.is_day = false;
            let transition = PhaseTransition::NightStarted {
                day_count: self.day_count,
            };
            for callback in &mut self.night_start {
                callback(&transition);
            }
            Some(transition)
        } else if !self.is_day && self.elapsed_ms >= self.night_duration_ms {
            self.elapsed_ms = 0.0;
            self.is_day = true;
            self.day_count += 1;
            let transition = PhaseTransition::DayStarted {
                day_count: self.day_count,
            };
            for callback in &mut self.day_start {
                callback(&transition);
            }
            Some(transition)
        } else {
            None
        }
    }

    pub fn subscribe_day_start(&mut self, callback: impl FnMut(&PhaseTransition) + Send + 'static) {
        self.day_start.push(Box::new(callback));
    }

    pub fn subscribe_night_start(
        &mut self,
        callback: impl FnMut(&PhaseTransition) + Send + 'static,
    ) {
        self.night_start.push(Box::new(callback));
    }

    pub fn is_day(&self) -> bool {
        self.is_day
    }

    pub fn is_night(&self) -> bool {
        !self.is_day
    }

    pub fn phase(&self) -> DayPhase {
        if self.is_day {
            DayPhase::Day
        } else {
            DayPhase::Night
        }
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn elapsed_in_phase_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn day_duration_ms(&self) -> f64 {
        self.day_duration_ms
    }

    pub fn night_duration_ms(&self) -> f64 {
        self.night_duration_ms
    }

    /// Progress through the day, 0 at night.
    pub fn day_progress(&self) -> f64 {
        if self.is_day {
            self.elapsed_ms / self.day_duration_ms
        } else {
            0.0
        }
    }

    /// Progress through the night, 0 by day.
    pub fn night_progress(&self) -> f64 {
        if self.is_day {
            0.0
        } else {
            self.elapsed_ms / self.night_duration_ms
        }
    }

    /// Position in the full cycle: day covers [0, 0.66), night [0.66, 1.0).
    pub fn cycle_progress(&self) -> f64 {
        if self.is_day {
            self.day_progress() * DAY_CYCLE_SHARE
        } else {
            DAY_CYCLE_SHARE + self.night_progress() * (1.0 - DAY_CYCLE_SHARE)
        }
    }

    /// Night overlay alpha. Dusk ramps 0 → 0.5 over the day; the night
    /// darkens to 1.0 at midnight and eases back to 0.5 by dawn.
    pub fn sky_darkness(&self) -> f64 {
        if self.is_day {
            self.day_progress() * SUNSET_DARKNESS
        } else {
            let progress = self.night_progress();
            if progress < 0.5 {
                SUNSET_DARKNESS + progress
            } else {
                1.5 - progress
            }
        }
    }

    pub fn view(&self) -> ClockView {
        ClockView {
            phase: self.phase(),
            day_count: self.day_count,
            elapsed_in_phase_ms: self.elapsed_ms,
            cycle_progress: self.cycle_progress(),
            sky_darkness: self.sky_darkness(),
        }
    }
}
