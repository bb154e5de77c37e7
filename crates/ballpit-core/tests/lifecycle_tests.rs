// Host-side tests for the frame clock, loop scheduler and teardown list.

use ballpit_core::{Clock, FrameClock, LoopScheduler, LoopTransition, Teardown, TimeSource};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct ManualTime(Rc<Cell<f64>>);

impl ManualTime {
    fn advance(&self, ms: f64) {
        self.0.set(self.0.get() + ms);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

#[test]
fn stopped_clock_reports_zero_delta() {
    let time = ManualTime::default();
    let mut clock = Clock::new(time.clone());
    time.advance(100.0);
    assert_eq!(clock.delta(), 0.0);
    clock.start();
    time.advance(20.0);
    assert!((clock.delta() - 0.02).abs() < 1e-6);
    clock.stop();
    time.advance(20.0);
    assert_eq!(clock.delta(), 0.0);
}

#[test]
fn resume_does_not_replay_the_paused_gap() {
    let time = ManualTime::default();
    let mut clock = FrameClock::new(time.clone());
    clock.resume();
    time.advance(16.0);
    let before = clock.tick();
    assert!((before.delta - 0.016).abs() < 1e-6);

    clock.pause();
    time.advance(5_000.0);
    clock.resume();
    time.advance(16.0);
    let after = clock.tick();
    assert!(after.delta <= 0.016 + 1e-6, "delta {}", after.delta);
    assert!((after.elapsed - 0.032).abs() < 1e-5);
}

#[test]
fn loop_runs_only_while_visible_and_intersecting() {
    let mut s = LoopScheduler::new();
    assert_eq!(s.set_page_hidden(false), None);
    assert_eq!(s.set_intersecting(true), Some(LoopTransition::Start));
    assert_eq!(s.set_intersecting(true), None);
    assert_eq!(s.set_page_hidden(true), Some(LoopTransition::Stop));
    assert_eq!(s.set_page_hidden(false), Some(LoopTransition::Start));
    assert_eq!(s.set_intersecting(false), Some(LoopTransition::Stop));
    assert!(!s.animating());
}

#[test]
fn showing_the_page_off_screen_does_not_start() {
    let mut s = LoopScheduler::new();
    assert_eq!(s.set_page_hidden(true), None);
    assert_eq!(s.set_page_hidden(false), None);
    assert!(!s.animating());
}

#[test]
fn disposed_scheduler_never_restarts() {
    let mut s = LoopScheduler::new();
    s.set_intersecting(true);
    assert_eq!(s.dispose(), Some(LoopTransition::Stop));
    assert_eq!(s.dispose(), None);
    assert_eq!(s.set_intersecting(true), None);
    assert_eq!(s.set_page_hidden(false), None);
    assert!(s.disposed());
}

#[test]
fn teardown_runs_each_task_once() {
    let hits = Rc::new(Cell::new(0));
    let mut t = Teardown::new();
    for _ in 0..3 {
        let h = hits.clone();
        t.push(move || h.set(h.get() + 1));
    }
    assert_eq!(t.pending(), 3);
    assert_eq!(t.run(), 3);
    assert_eq!(t.run(), 0);
    assert_eq!(hits.get(), 3);
    assert!(t.is_done());

    let h = hits.clone();
    t.push(move || h.set(h.get() + 10));
    assert_eq!(hits.get(), 13);
    assert_eq!(t.pending(), 0);
}
