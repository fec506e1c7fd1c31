//! Cooperative task queue.
//!
//! Work that must run after the current synchronous step, such as state
//! snapshot publication, is queued here and run by an explicit [`flush`].
//!
//! [`flush`]: Scheduler::flush

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

pub type Task = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct Scheduler {
    queue: RefCell<VecDeque<Task>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Run queued tasks in FIFO order, including tasks queued while
    /// flushing. Returns the number of tasks run.
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            // release the borrow before running so tasks may queue more
            let next = self.queue.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
