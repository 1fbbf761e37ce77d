//! Phase state - observable position within one cadence cycle
//!
//! A small value-with-notification cell: the scheduler writes phase
//! transitions, the UI reads the current value or subscribes to the
//! broadcast stream for visual highlighting. Nothing else mutates it.

use std::sync::RwLock;

use tokio::sync::broadcast;

/// Broadcast buffer for phase transitions. Transitions arrive a few per
/// second at most; 32 is ample headroom for slow subscribers.
const PHASE_CHANNEL_CAPACITY: usize = 32;

/// The most recently fired cue within a cadence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No cycle in flight (initial state, and after stop or phase reset)
    Idle,
    /// Backswing-start cue fired
    Start,
    /// Top-of-swing cue fired
    Top,
    /// Impact cue fired
    Impact,
}

/// Current phase value plus a broadcast notification channel.
///
/// Writes are crate-private: only the cadence scheduler transitions the
/// phase, on cue firing and on stop/reset.
pub struct PhaseState {
    current: RwLock<Phase>,
    tx: broadcast::Sender<Phase>,
}

impl PhaseState {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(PHASE_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(Phase::Idle),
            tx,
        }
    }

    /// Read the current phase.
    pub fn get(&self) -> Phase {
        // Phase is Copy, so a writer that panicked mid-store cannot have
        // left a torn value behind; recover from poisoning instead of
        // propagating it into UI reads.
        match self.current.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Transition to `next`, notifying subscribers.
    ///
    /// Repeated writes of the same value do not re-notify, so an idempotent
    /// stop never produces duplicate Idle events.
    pub(crate) fn set(&self, next: Phase) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard == next {
            return;
        }
        *guard = next;
        // No subscribers is fine; the value is still readable via get().
        let _ = self.tx.send(next);
    }

    /// Subscribe to phase transitions.
    ///
    /// Each subscriber gets an independent receiver. The receiver yields
    /// transitions from subscription time onward; read the initial value
    /// with [PhaseState::get].
    pub fn subscribe(&self) -> broadcast::Receiver<Phase> {
        self.tx.subscribe()
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phase_is_idle() {
        let state = PhaseState::new();
        assert_eq!(state.get(), Phase::Idle);
    }

    #[test]
    fn test_set_updates_value_and_notifies() {
        let state = PhaseState::new();
        let mut rx = state.subscribe();

        state.set(Phase::Start);
        assert_eq!(state.get(), Phase::Start);
        assert_eq!(rx.try_recv().unwrap(), Phase::Start);
    }

    #[test]
    fn test_duplicate_set_does_not_renotify() {
        let state = PhaseState::new();
        let mut rx = state.subscribe();

        state.set(Phase::Idle); // already Idle
        assert!(rx.try_recv().is_err());

        state.set(Phase::Top);
        state.set(Phase::Top);
        assert_eq!(rx.try_recv().unwrap(), Phase::Top);
        assert!(rx.try_recv().is_err(), "Duplicate transition should not notify");
    }

    #[test]
    fn test_multiple_subscribers_receive_transitions() {
        let state = PhaseState::new();
        let mut rx1 = state.subscribe();
        let mut rx2 = state.subscribe();

        state.set(Phase::Impact);
        assert_eq!(rx1.try_recv().unwrap(), Phase::Impact);
        assert_eq!(rx2.try_recv().unwrap(), Phase::Impact);
    }
}
