//! Two-phase update of the view list.
//!
//! Phase one applies the operator's decision locally before the backend has
//! answered. Phase two either replaces the whole list with a fresh fetch
//! ([`reconcile`]) or undoes the local change ([`revert`]).

use common::models::{Signal, SignalId, SignalStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> SignalStatus {
        match self {
            Self::Approve => SignalStatus::Approved,
            Self::Reject => SignalStatus::Rejected,
        }
    }
}

/// Record of an optimistic change, enough to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub id: SignalId,
    pub previous: Option<SignalStatus>,
    pub target: SignalStatus,
}

impl PendingTransition {
    /// Status to restore on failure. A signal that was not in the list is
    /// assumed to have been pending.
    pub fn restore_status(&self) -> SignalStatus {
        self.previous.clone().unwrap_or(SignalStatus::Pending)
    }
}

pub fn apply_optimistic(signals: &mut [Signal], id: SignalId, target: SignalStatus) -> PendingTransition {
    let previous = signals
        .iter_mut()
        .find(|s| s.id == id)
        .map(|s| std::mem::replace(&mut s.status, target.clone()));

    PendingTransition {
        id,
        previous,
        target,
    }
}

/// Undoes `transition`. Only touches the signal if it still carries the
/// optimistic status. Callers must skip this when a list was applied after the
/// optimistic change. Returns whether anything changed.
pub fn revert(signals: &mut [Signal], transition: &PendingTransition) -> bool {
    match signals
        .iter_mut()
        .find(|s| s.id == transition.id && s.status == transition.target)
    {
        Some(signal) => {
            signal.status = transition.restore_status();
            true
        }
        None => false,
    }
}

/// Backend truth replaces the view list wholesale, optimistic entries included.
pub fn reconcile(signals: &mut Vec<Signal>, fresh: Vec<Signal>) {
    *signals = fresh;
}
