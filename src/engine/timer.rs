use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

const MIN_PERIOD: Duration = Duration::from_millis(1);
const MAX_CATCH_UP: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct TimerSlot {
    id: TimerId,
    period: Duration,
    next_due: Duration,
}

type SlotTable = Rc<RefCell<Vec<TimerSlot>>>;

pub struct Scheduler {
    slots: SlotTable,
    now: Duration,
    next_id: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
            now: Duration::ZERO,
            next_id: 0,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn every(&mut self, period: Duration) -> TimerGuard {
        let period = period.max(MIN_PERIOD);
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.slots.borrow_mut().push(TimerSlot {
            id,
            period,
            next_due: self.now + period,
        });

        TimerGuard {
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }

    pub fn active_timers(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Moves the clock forward and returns every firing in due-time order.
    ///
    /// A timer that fell far behind (window hidden, debugger pause) fires at most
    /// `MAX_CATCH_UP` times and is then rescheduled relative to the new time.
    pub fn advance(&mut self, delta: Duration) -> Vec<TimerId> {
        self.now += delta;
        let now = self.now;

        let mut fired = Vec::new();
        for slot in self.slots.borrow_mut().iter_mut() {
            let mut count = 0;
            while slot.next_due <= now && count < MAX_CATCH_UP {
                fired.push((slot.next_due, slot.id));
                slot.next_due += slot.period;
                count += 1;
            }
            if slot.next_due <= now {
                slot.next_due = now + slot.period;
            }
        }

        fired.sort_by_key(|&(due, id)| (due, id.0));
        fired.into_iter().map(|(_, id)| id).collect()
    }

    pub fn next_due_in(&self) -> Option<Duration> {
        self.slots
            .borrow()
            .iter()
            .map(|slot| slot.next_due.saturating_sub(self.now))
            .min()
    }
}

pub struct TimerGuard {
    id: TimerId,
    slots: Weak<RefCell<Vec<TimerSlot>>>,
}

impl TimerGuard {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn matches(&self, fired: TimerId) -> bool {
        self.id == fired
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.borrow_mut().retain(|slot| slot.id != self.id);
        }
    }
}

impl std::fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerGuard").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fires_once_per_elapsed_period() {
        let mut scheduler = Scheduler::new();
        let guard = scheduler.every(ms(50));

        assert!(scheduler.advance(ms(49)).is_empty());
        assert_eq!(scheduler.advance(ms(1)), vec![guard.id()]);
        assert_eq!(scheduler.advance(ms(100)), vec![guard.id(), guard.id()]);
    }

    #[test]
    fn dropping_guard_cancels_timer() {
        let mut scheduler = Scheduler::new();
        let guard = scheduler.every(ms(10));
        assert_eq!(scheduler.active_timers(), 1);

        drop(guard);
        assert_eq!(scheduler.active_timers(), 0);
        assert!(scheduler.advance(ms(1_000)).is_empty());
    }

    #[test]
    fn catch_up_is_bounded() {
        let mut scheduler = Scheduler::new();
        let guard = scheduler.every(ms(10));

        let fired = scheduler.advance(ms(10_000));
        assert_eq!(fired.len(), MAX_CATCH_UP as usize);
        assert!(fired.iter().all(|&id| guard.matches(id)));
        assert_eq!(scheduler.next_due_in(), Some(ms(10)));
    }

    #[test]
    fn firings_are_ordered_by_due_time() {
        let mut scheduler = Scheduler::new();
        let slow = scheduler.every(ms(30));
        let fast = scheduler.every(ms(20));

        let fired = scheduler.advance(ms(60));
        assert_eq!(
            fired,
            vec![fast.id(), slow.id(), fast.id(), slow.id(), fast.id()]
        );
    }

    #[test]
    fn zero_period_is_raised_to_minimum() {
        let mut scheduler = Scheduler::new();
        let guard = scheduler.every(Duration::ZERO);
        assert_eq!(scheduler.advance(ms(1)), vec![guard.id()]);
    }

    #[test]
    fn guard_outliving_scheduler_drops_cleanly() {
        let guard = {
            let mut scheduler = Scheduler::new();
            scheduler.every(ms(5))
        };
        drop(guard);
    }
}
