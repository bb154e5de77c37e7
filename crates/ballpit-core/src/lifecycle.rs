//! Render-loop scheduling and teardown bookkeeping.

/// Command for the host loop driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopTransition {
    Start,
    Stop,
}

/// Decides when the render loop should run from visibility signals.
///
/// The loop runs only while the surface intersects the viewport and the page
/// is visible, and never again once disposed.
#[derive(Clone, Debug, Default)]
pub struct LoopScheduler {
    intersecting: bool,
    page_hidden: bool,
    animating: bool,
    disposed: bool,
}

impl LoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animating(&self) -> bool {
        self.animating
    }

    pub fn intersecting(&self) -> bool {
        self.intersecting
    }

    pub fn disposed(&self) -> bool {
        self.disposed
    }

    pub fn set_intersecting(&mut self, intersecting: bool) -> Option<LoopTransition> {
        self.intersecting = intersecting;
        self.reconcile()
    }

    pub fn set_page_hidden(&mut self, hidden: bool) -> Option<LoopTransition> {
        self.page_hidden = hidden;
        self.reconcile()
    }

    /// Stop for good. Returns `Stop` only if the loop was running.
    pub fn dispose(&mut self) -> Option<LoopTransition> {
        self.disposed = true;
        self.reconcile()
    }

    fn reconcile(&mut self) -> Option<LoopTransition> {
        let should_run = self.intersecting && !self.page_hidden && !self.disposed;
        match (self.animating, should_run) {
            (false, true) => {
                self.animating = true;
                Some(LoopTransition::Start)
            }
            (true, false) => {
                self.animating = false;
                Some(LoopTransition::Stop)
            }
            _ => None,
        }
    }
}

/// Ordered one-shot cleanup tasks.
///
/// `run` executes every registered task exactly once, in registration order.
/// Later calls are no-ops, and tasks pushed after the first run execute
/// immediately.
#[derive(Default)]
pub struct Teardown {
    tasks: Vec<Box<dyn FnOnce()>>,
    done: bool,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: impl FnOnce() + 'static) {
        if self.done {
            task();
        } else {
            self.tasks.push(Box::new(task));
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Run all pending tasks; returns how many ran.
    pub fn run(&mut self) -> usize {
        if self.done {
            return 0;
        }
        self.done = true;
        let tasks = std::mem::take(&mut self.tasks);
        let n = tasks.len();
        for task in tasks {
            task();
        }
        n
    }
}
