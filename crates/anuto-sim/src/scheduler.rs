//! Work queue drained on the simulation thread.
//!
//! Immediate work runs at the next drain point in submission order. Delayed
//! work is keyed by simulation tick, not wall clock, so it stretches with
//! the time scale and freezes while the game is paused.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use anuto_core::error::CommandError;
use anuto_core::types::secs_to_ticks;

use crate::engine::SimulationEngine;

/// A unit of work executed with exclusive access to the engine.
pub type Work = Box<dyn FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static>;

#[derive(Default)]
pub struct Scheduler {
    /// Tick of the most recent (or ongoing) drain.
    now: u64,
    next_seq: u64,
    immediate: VecDeque<Work>,
    /// Keyed by (due tick, submission sequence).
    delayed: BTreeMap<(u64, u64), Work>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue work for the next drain. Never runs inline, even when called
    /// from inside a running work item.
    pub fn post(
        &mut self,
        work: impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static,
    ) {
        self.immediate.push_back(Box::new(work));
    }

    /// Queue work to run once `delay_secs` of simulated time have passed.
    pub fn post_delayed(
        &mut self,
        delay_secs: f32,
        work: impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static,
    ) {
        self.post_delayed_boxed(delay_secs, Box::new(work));
    }

    pub fn post_boxed(&mut self, work: Work) {
        self.immediate.push_back(work);
    }

    pub fn post_delayed_boxed(&mut self, delay_secs: f32, work: Work) {
        let due = self.now + secs_to_ticks(delay_secs);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.delayed.insert((due, seq), work);
    }

    pub fn set_now(&mut self, tick: u64) {
        self.now = tick;
    }

    /// Remove everything runnable at `now`: immediate work first, then due
    /// delayed work ordered by due tick and submission.
    pub fn take_due(&mut self) -> Vec<Work> {
        let mut due: Vec<Work> = self.immediate.drain(..).collect();
        let later = self.delayed.split_off(&(self.now + 1, 0));
        let ready = std::mem::replace(&mut self.delayed, later);
        due.extend(ready.into_values());
        due
    }

    /// Drop all queued work.
    pub fn clear(&mut self) {
        self.immediate.clear();
        self.delayed.clear();
    }

    pub fn pending(&self) -> usize {
        self.immediate.len() + self.delayed.len()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("immediate", &self.immediate.len())
            .field("delayed", &self.delayed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static {
        |_engine| Ok(())
    }

    #[test]
    fn test_delayed_work_waits_for_due_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.post_delayed(1.0, noop()); // 30 ticks
        scheduler.set_now(29);
        assert!(scheduler.take_due().is_empty());
        scheduler.set_now(30);
        assert_eq!(scheduler.take_due().len(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_immediate_work_always_due() {
        let mut scheduler = Scheduler::new();
        scheduler.post(noop());
        scheduler.post(noop());
        scheduler.post_delayed(10.0, noop());
        assert_eq!(scheduler.take_due().len(), 2);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_delay_counts_from_current_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.set_now(100);
        scheduler.post_delayed(0.1, noop()); // 3 ticks
        scheduler.set_now(102);
        assert!(scheduler.take_due().is_empty());
        scheduler.set_now(103);
        assert_eq!(scheduler.take_due().len(), 1);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut scheduler = Scheduler::new();
        scheduler.post(noop());
        scheduler.post_delayed(5.0, noop());
        scheduler.clear();
        assert_eq!(scheduler.pending(), 0);
    }
}
