use std::time::Duration;

use super::timer::{Scheduler, TimerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Running,
    TornDown,
}

pub trait View {
    fn name(&self) -> &str;
    fn start(&mut self, scheduler: &mut Scheduler);
    fn on_timer(&mut self, timer: TimerId, now: Duration) -> bool;
}

enum Phase<V> {
    Uninitialized,
    Initialized(V),
    Running(V),
    TornDown,
}

pub struct ViewSession<V> {
    phase: Phase<V>,
}

impl<V> Default for ViewSession<V> {
    fn default() -> Self {
        Self {
            phase: Phase::Uninitialized,
        }
    }
}

impl<V: View> ViewSession<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.phase {
            Phase::Uninitialized => Lifecycle::Uninitialized,
            Phase::Initialized(_) => Lifecycle::Initialized,
            Phase::Running(_) => Lifecycle::Running,
            Phase::TornDown => Lifecycle::TornDown,
        }
    }

    pub fn view(&self) -> Option<&V> {
        match &self.phase {
            Phase::Initialized(view) | Phase::Running(view) => Some(view),
            Phase::Uninitialized | Phase::TornDown => None,
        }
    }

    pub fn view_mut(&mut self) -> Option<&mut V> {
        match &mut self.phase {
            Phase::Initialized(view) | Phase::Running(view) => Some(view),
            Phase::Uninitialized | Phase::TornDown => None,
        }
    }

    pub fn initialize(&mut self, view: V) {
        self.teardown();
        self.phase = Phase::Initialized(view);
    }

    pub fn start(&mut self, scheduler: &mut Scheduler) {
        match std::mem::replace(&mut self.phase, Phase::TornDown) {
            Phase::Initialized(mut view) => {
                view.start(scheduler);
                tracing::debug!(view = view.name(), "view running");
                self.phase = Phase::Running(view);
            }
            other => self.phase = other,
        }
    }

    pub fn mount(&mut self, view: V, scheduler: &mut Scheduler) {
        self.initialize(view);
        self.start(scheduler);
    }

    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::TornDown) {
            Phase::Initialized(view) | Phase::Running(view) => {
                tracing::debug!(view = view.name(), "view torn down");
            }
            Phase::Uninitialized => self.phase = Phase::Uninitialized,
            Phase::TornDown => {}
        }
    }

    /// Routes fired timers to the running view. Firings that arrive for a view
    /// that is no longer running are dropped.
    pub fn dispatch(&mut self, fired: &[TimerId], now: Duration) -> bool {
        let Phase::Running(view) = &mut self.phase else {
            return false;
        };

        let mut changed = false;
        for &timer in fired {
            changed |= view.on_timer(timer, now);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::timer::TimerGuard;

    struct CountingView {
        ticks: Rc<Cell<u32>>,
        timer: Option<TimerGuard>,
    }

    impl View for CountingView {
        fn name(&self) -> &str {
            "counting"
        }

        fn start(&mut self, scheduler: &mut Scheduler) {
            self.timer = Some(scheduler.every(Duration::from_millis(10)));
        }

        fn on_timer(&mut self, timer: TimerId, _now: Duration) -> bool {
            if self.timer.as_ref().is_some_and(|guard| guard.matches(timer)) {
                self.ticks.set(self.ticks.get() + 1);
                true
            } else {
                false
            }
        }
    }

    fn counting(ticks: &Rc<Cell<u32>>) -> CountingView {
        CountingView {
            ticks: Rc::clone(ticks),
            timer: None,
        }
    }

    #[test]
    fn walks_through_lifecycle() {
        let mut scheduler = Scheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let mut session = ViewSession::new();
        assert_eq!(session.lifecycle(), Lifecycle::Uninitialized);

        session.initialize(counting(&ticks));
        assert_eq!(session.lifecycle(), Lifecycle::Initialized);
        assert_eq!(scheduler.active_timers(), 0);

        session.start(&mut scheduler);
        assert_eq!(session.lifecycle(), Lifecycle::Running);
        assert_eq!(scheduler.active_timers(), 1);

        let fired = scheduler.advance(Duration::from_millis(30));
        assert!(session.dispatch(&fired, scheduler.now()));
        assert_eq!(ticks.get(), 3);

        session.teardown();
        assert_eq!(session.lifecycle(), Lifecycle::TornDown);
        assert_eq!(scheduler.active_timers(), 0);
        assert!(session.view().is_none());
    }

    #[test]
    fn initialized_view_does_not_receive_ticks() {
        let mut scheduler = Scheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let mut session = ViewSession::new();
        session.initialize(counting(&ticks));

        let fired = scheduler.advance(Duration::from_millis(100));
        assert!(!session.dispatch(&fired, scheduler.now()));
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn stale_firings_after_teardown_are_ignored() {
        let mut scheduler = Scheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let mut session = ViewSession::new();
        session.mount(counting(&ticks), &mut scheduler);

        let fired = scheduler.advance(Duration::from_millis(20));
        assert_eq!(fired.len(), 2);

        session.teardown();
        assert!(!session.dispatch(&fired, scheduler.now()));
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn remount_discards_previous_view() {
        let mut scheduler = Scheduler::new();
        let old_ticks = Rc::new(Cell::new(0));
        let new_ticks = Rc::new(Cell::new(0));
        let mut session = ViewSession::new();

        session.mount(counting(&old_ticks), &mut scheduler);
        let stale = scheduler.advance(Duration::from_millis(10));

        session.mount(counting(&new_ticks), &mut scheduler);
        assert_eq!(scheduler.active_timers(), 1);

        assert!(!session.dispatch(&stale, scheduler.now()));
        let fired = scheduler.advance(Duration::from_millis(10));
        assert!(session.dispatch(&fired, scheduler.now()));

        assert_eq!(old_ticks.get(), 0);
        assert_eq!(new_ticks.get(), 1);
    }
}
