use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use uuid::Uuid;

const IDLE: u64 = 0;

/// Observable state of an [`OperationGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    InFlight,
}

/// Latch that admits one in-flight submission per dialog instance.
///
/// Every acquisition gets a fresh ticket. [`OperationGate::release`] clears the
/// gate whatever ticket holds it, while a [`GatePermit`] only clears its own
/// ticket, so a stale permit can never release a newer submission.
///
/// Clones share the latch. Independent gates never coordinate with each other.
#[derive(Clone)]
pub struct OperationGate {
    id: Uuid,
    inner: Arc<GateInner>,
}

struct GateInner {
    current: AtomicU64,
    issued: AtomicU64,
}

impl OperationGate {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            inner: Arc::new(GateInner {
                current: AtomicU64::new(IDLE),
                issued: AtomicU64::new(IDLE),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `Idle → InFlight`; returns `false` if a submission is already in flight.
    pub fn try_acquire(&self) -> bool {
        match self.acquire() {
            Some(permit) => {
                permit.detach();
                true
            }
            None => false,
        }
    }

    /// Like [`try_acquire`](Self::try_acquire), but ties the acquisition to a
    /// permit that returns the gate to `Idle` when dropped.
    pub fn acquire(&self) -> Option<GatePermit> {
        let ticket = self.inner.issued.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner
            .current
            .compare_exchange(IDLE, ticket, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GatePermit {
                gate: self.clone(),
                ticket: Some(ticket),
            })
    }

    /// Return to `Idle`. Idempotent.
    pub fn release(&self) {
        self.inner.current.store(IDLE, Ordering::Release);
    }

    /// Clear the gate only if `ticket` still holds it.
    pub(crate) fn release_ticket(&self, ticket: u64) -> bool {
        self.inner
            .current
            .compare_exchange(ticket, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn state(&self) -> GateState {
        match self.inner.current.load(Ordering::Acquire) {
            IDLE => GateState::Idle,
            _ => GateState::InFlight,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == GateState::Idle
    }
}

impl Default for OperationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OperationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationGate")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Proof of a successful acquisition; releases its own ticket on drop.
#[derive(Debug)]
pub struct GatePermit {
    gate: OperationGate,
    ticket: Option<u64>,
}

impl GatePermit {
    pub fn ticket(&self) -> u64 {
        self.ticket.unwrap_or(IDLE)
    }

    pub fn gate(&self) -> &OperationGate {
        &self.gate
    }

    /// Release now instead of on drop.
    pub fn release(mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.gate.release_ticket(ticket);
        }
    }

    /// Keep the gate held after the permit is gone; only
    /// [`OperationGate::release`] will clear it.
    pub(crate) fn detach(mut self) -> u64 {
        self.ticket.take().unwrap_or(IDLE)
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.gate.release_ticket(ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused() {
        let gate = OperationGate::new();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert_eq!(gate.state(), GateState::InFlight);
    }

    #[test]
    fn release_is_idempotent() {
        let gate = OperationGate::new();
        gate.release();
        assert!(gate.is_idle());

        assert!(gate.try_acquire());
        gate.release();
        gate.release();
        assert!(gate.is_idle());
        assert!(gate.try_acquire());
    }

    #[test]
    fn permit_releases_on_drop() {
        let gate = OperationGate::new();
        {
            let permit = gate.acquire().unwrap();
            assert!(permit.ticket() > 0);
            assert!(gate.acquire().is_none());
        }
        assert!(gate.is_idle());
    }

    #[test]
    fn stale_permit_does_not_release_newer_acquisition() {
        let gate = OperationGate::new();
        let first = gate.acquire().unwrap();
        let first_ticket = first.ticket();

        gate.release();
        let second = gate.acquire().unwrap();
        assert_ne!(second.ticket(), first_ticket);

        drop(first);
        assert_eq!(gate.state(), GateState::InFlight);

        second.release();
        assert!(gate.is_idle());
    }

    #[test]
    fn gates_are_independent() {
        let a = OperationGate::new();
        let b = OperationGate::new();
        assert!(a.try_acquire());
        assert!(b.try_acquire());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clones_share_the_latch() {
        let gate = OperationGate::new();
        let dialog_view = gate.clone();
        assert!(gate.try_acquire());
        assert!(!dialog_view.try_acquire());
        dialog_view.release();
        assert!(gate.is_idle());
    }
}
