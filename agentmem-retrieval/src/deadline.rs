//! Request deadlines ("Cancellation and timeouts"). Each stage
//! checks the deadline on entry; pure-compute stages are non-suspending so
//! they only need to check once, not before every instruction.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        Self(Instant::now() + duration)
    }

    pub fn is_exceeded(&self) -> bool {
        Instant::now() >= self.0
    }
}
