//! Transaction workflow: the state machine behind accept/reject/complete/cancel
//!
//! The transition table below is the single source of truth. Handlers and the
//! service never branch on status themselves; they ask the table whether a
//! transition is allowed and what it implies for the referenced listings.

use serde::{Deserialize, Serialize};

use crate::listings::Availability;

/// Transaction lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    /// Terminal statuses admit no further transitions or messages
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Rejected
                | TransactionStatus::Completed
                | TransactionStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Accepted => "accepted",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

/// Actions a party may request on a transaction
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionAction {
    Accept,
    Reject,
    Complete,
    Cancel,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Accept => "accept",
            TransactionAction::Reject => "reject",
            TransactionAction::Complete => "complete",
            TransactionAction::Cancel => "cancel",
        }
    }

    /// Which party is allowed to request this action
    pub fn required_role(&self) -> ActorRole {
        match self {
            TransactionAction::Accept
            | TransactionAction::Reject
            | TransactionAction::Complete => ActorRole::Seller,
            TransactionAction::Cancel => ActorRole::Buyer,
        }
    }
}

/// The two parties of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Buyer,
    Seller,
}

/// One permitted (from, action) -> to edge
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: TransactionStatus,
    pub action: TransactionAction,
    pub to: TransactionStatus,
}

/// Every legal transition. `complete` is deliberately only reachable from
/// `accepted`: completing requires the meeting details that acceptance
/// records.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: TransactionStatus::Pending,
        action: TransactionAction::Accept,
        to: TransactionStatus::Accepted,
    },
    Transition {
        from: TransactionStatus::Pending,
        action: TransactionAction::Reject,
        to: TransactionStatus::Rejected,
    },
    Transition {
        from: TransactionStatus::Accepted,
        action: TransactionAction::Complete,
        to: TransactionStatus::Completed,
    },
    Transition {
        from: TransactionStatus::Pending,
        action: TransactionAction::Cancel,
        to: TransactionStatus::Cancelled,
    },
    Transition {
        from: TransactionStatus::Accepted,
        action: TransactionAction::Cancel,
        to: TransactionStatus::Cancelled,
    },
];

/// Look up the target status for `(from, action)`, if the edge exists
pub fn transition(from: TransactionStatus, action: TransactionAction) -> Option<TransactionStatus> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.action == action)
        .map(|t| t.to)
}

/// Listing availability implied by a transaction status
///
/// Availability is a pure function of the NEW status, never an increment, so
/// reapplying the same transition leaves the listing unchanged.
pub fn availability_for(status: TransactionStatus) -> Availability {
    match status {
        TransactionStatus::Pending | TransactionStatus::Accepted => Availability::Reserved,
        TransactionStatus::Rejected | TransactionStatus::Cancelled => Availability::Available,
        TransactionStatus::Completed => Availability::Sold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [TransactionStatus; 5] = [
        TransactionStatus::Pending,
        TransactionStatus::Accepted,
        TransactionStatus::Rejected,
        TransactionStatus::Completed,
        TransactionStatus::Cancelled,
    ];

    const ALL_ACTIONS: [TransactionAction; 4] = [
        TransactionAction::Accept,
        TransactionAction::Reject,
        TransactionAction::Complete,
        TransactionAction::Cancel,
    ];

    #[test]
    fn test_full_transition_grid() {
        // Exhaustive state x action expectations
        for from in ALL_STATUSES {
            for action in ALL_ACTIONS {
                let expected = match (from, action) {
                    (TransactionStatus::Pending, TransactionAction::Accept) => {
                        Some(TransactionStatus::Accepted)
                    }
                    (TransactionStatus::Pending, TransactionAction::Reject) => {
                        Some(TransactionStatus::Rejected)
                    }
                    (TransactionStatus::Pending, TransactionAction::Cancel)
                    | (TransactionStatus::Accepted, TransactionAction::Cancel) => {
                        Some(TransactionStatus::Cancelled)
                    }
                    (TransactionStatus::Accepted, TransactionAction::Complete) => {
                        Some(TransactionStatus::Completed)
                    }
                    _ => None,
                };
                assert_eq!(
                    transition(from, action),
                    expected,
                    "unexpected result for {:?} x {:?}",
                    from,
                    action
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        for from in ALL_STATUSES.into_iter().filter(|s| s.is_terminal()) {
            for action in ALL_ACTIONS {
                assert!(transition(from, action).is_none());
            }
        }
    }

    #[test]
    fn test_complete_not_allowed_from_pending() {
        assert!(transition(TransactionStatus::Pending, TransactionAction::Complete).is_none());
    }

    #[test]
    fn test_role_gates() {
        assert_eq!(TransactionAction::Accept.required_role(), ActorRole::Seller);
        assert_eq!(TransactionAction::Reject.required_role(), ActorRole::Seller);
        assert_eq!(
            TransactionAction::Complete.required_role(),
            ActorRole::Seller
        );
        assert_eq!(TransactionAction::Cancel.required_role(), ActorRole::Buyer);
    }

    #[test]
    fn test_availability_follows_status() {
        use crate::listings::Availability;

        assert_eq!(
            availability_for(TransactionStatus::Pending),
            Availability::Reserved
        );
        assert_eq!(
            availability_for(TransactionStatus::Accepted),
            Availability::Reserved
        );
        assert_eq!(
            availability_for(TransactionStatus::Rejected),
            Availability::Available
        );
        assert_eq!(
            availability_for(TransactionStatus::Cancelled),
            Availability::Available
        );
        assert_eq!(
            availability_for(TransactionStatus::Completed),
            Availability::Sold
        );
    }
}
