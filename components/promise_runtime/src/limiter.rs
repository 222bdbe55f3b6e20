//! Bounded admission for fan-out units.
//!
//! The limiter is a bounded channel of slot tokens: admitting a unit sends a
//! token (blocking while the channel is full) and finishing it takes one
//! back out.

use crate::context::Context;
use crossbeam::channel::{self, Receiver, Sender};
use tracing::trace;

/// Caps how many units run at once.
#[derive(Debug)]
pub struct Limiter {
    slots: Sender<()>,
    taken: Receiver<()>,
    capacity: usize,
}

impl Limiter {
    /// Creates a limiter with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (slots, taken) = channel::bounded(capacity);
        Self {
            slots,
            taken,
            capacity,
        }
    }

    /// Blocks until a slot is free or `ctx` fires.
    ///
    /// # Returns
    ///
    /// A permit that frees the slot when dropped, or `None` if `ctx` fired
    /// first.
    pub fn acquire(&self, ctx: &Context) -> Option<Permit> {
        if ctx.is_cancelled() {
            return None;
        }

        let done = ctx.done();
        crossbeam::select! {
            send(self.slots, ()) -> sent => {
                sent.ok()?;
                trace!(in_flight = self.in_flight(), capacity = self.capacity, "unit admitted");
                Some(Permit { taken: self.taken.clone() })
            }
            recv(done) -> _ => None,
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of slots currently held.
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }
}

/// A held slot; dropping it frees the slot.
#[derive(Debug)]
pub struct Permit {
    taken: Receiver<()>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        let _ = self.taken.try_recv();
    }
}
