use std::sync::atomic::{AtomicBool, Ordering};

/// Non-blocking, non-reentrant single-permit gate.
///
/// Contending callers are turned away instead of queued; the grid re-issues
/// its request on its own cadence.
#[derive(Debug, Default)]
pub struct SingleFlightGate {
    held: AtomicBool,
}

/// Outcome of `try_enter`
#[derive(Debug)]
pub enum GateEntry<'a> {
    Entered(GatePermit<'a>),
    Busy,
}

impl GateEntry<'_> {
    pub fn is_busy(&self) -> bool {
        matches!(self, GateEntry::Busy)
    }
}

/// Held while a read is in flight. Dropping it releases the gate.
#[derive(Debug)]
pub struct GatePermit<'a> {
    gate: &'a SingleFlightGate,
}

impl SingleFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_enter(&self) -> GateEntry<'_> {
        match self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => GateEntry::Entered(GatePermit { gate: self }),
            Err(_) => GateEntry::Busy,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    fn exit(&self) {
        self.held.store(false, Ordering::Release);
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.exit();
    }
}
