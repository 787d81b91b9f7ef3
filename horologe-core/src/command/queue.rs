//! Bounded command queue
//!
//! Many producers, one consumer. Neither side ever waits: the lock is held
//! only while the deque is touched, a push onto a full queue is refused,
//! and a pop on an empty queue returns `None`.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use super::Command;

/// Maximum number of pending commands
pub const QUEUE_CAPACITY: usize = 3;

/// FIFO of pending commands between the control surface and the engine
pub struct CommandQueue {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Deque<Command, QUEUE_CAPACITY>>>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// Create an empty queue (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Append a command
    ///
    /// Returns `false` without touching the queue if it is full.
    pub fn push(&self, command: Command) -> bool {
        self.inner
            .lock(|queue| queue.borrow_mut().push_back(command).is_ok())
    }

    /// Take the oldest command, if any
    pub fn pop(&self) -> Option<Command> {
        self.inner.lock(|queue| queue.borrow_mut().pop_front())
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.inner.lock(|queue| queue.borrow().len())
    }

    /// Check if no command is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new();
        assert!(queue.push(Command::Start));
        assert!(queue.push(Command::StepMove(-4)));
        assert_eq!(queue.pop(), Some(Command::Start));
        assert_eq!(queue.pop(), Some(Command::StepMove(-4)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_full_queue_rejects_and_preserves_contents() {
        let queue = CommandQueue::new();
        assert!(queue.push(Command::Start));
        assert!(queue.push(Command::Stop));
        assert!(queue.push(Command::StepMove(10)));
        assert_eq!(queue.len(), QUEUE_CAPACITY);

        assert!(!queue.push(Command::StepMove(20)));
        assert_eq!(queue.len(), QUEUE_CAPACITY);

        assert_eq!(queue.pop(), Some(Command::Start));
        assert_eq!(queue.pop(), Some(Command::Stop));
        assert_eq!(queue.pop(), Some(Command::StepMove(10)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_space_frees_after_pop() {
        let queue = CommandQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            assert!(queue.push(Command::Stop));
        }
        assert!(!queue.push(Command::Start));
        queue.pop();
        assert!(queue.push(Command::Start));
    }

    #[test]
    fn test_static_queue() {
        static QUEUE: CommandQueue = CommandQueue::new();
        assert!(QUEUE.push(Command::SetPosition { hour: 0, minute: 0 }));
        assert_eq!(QUEUE.pop(), Some(Command::SetPosition { hour: 0, minute: 0 }));
    }
}
