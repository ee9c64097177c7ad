//! Invoice transaction state machine
//!
//! ```text
//! GENERATED ──object created──▶ RECEIVED ──committed──▶ PROCESSED
//!     │                            │
//!     └──cancel──▶ CANCELLED       └──failed──▶ FAILED
//! ```
//!
//! Every handler calls [`decide`] with the status it read and the event it is
//! reacting to, then applies the resulting [`Decision`] through the store's
//! conditional update. `decide` does no I/O so the machine can be tested on its own.

use crate::models::InvoiceTransactionStatus;

/// Something that wants to move a transaction forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEvent {
    /// The uploaded object landed in storage.
    ObjectCreated,
    /// The client asked to cancel.
    CancelRequested,
    /// The invoice was committed and the raw object cleaned up.
    PayloadCommitted,
    /// The uploaded object could not be fetched, parsed or committed.
    ProcessingFailed,
}

impl TransactionEvent {
    /// The `(from, to)` edge this event tries to take.
    pub fn edge(&self) -> (InvoiceTransactionStatus, InvoiceTransactionStatus) {
        use InvoiceTransactionStatus::*;
        match self {
            TransactionEvent::ObjectCreated => (Generated, Received),
            TransactionEvent::CancelRequested => (Generated, Cancelled),
            TransactionEvent::PayloadCommitted => (Received, Processed),
            TransactionEvent::ProcessingFailed => (Received, Failed),
        }
    }
}

/// What a handler must do after reading the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Conditionally update `from -> to`, then notify `to`.
    Advance {
        from: InvoiceTransactionStatus,
        to: InvoiceTransactionStatus,
    },
    /// Leave the record untouched and notify its current status.
    Reject { current: InvoiceTransactionStatus },
    /// No live record; notify `NOT_FOUND`.
    NotFound,
}

impl Decision {
    /// Status the client should be told about.
    pub fn notification(&self) -> InvoiceTransactionStatus {
        match self {
            Decision::Advance { to, .. } => *to,
            Decision::Reject { current } => *current,
            Decision::NotFound => InvoiceTransactionStatus::NotFound,
        }
    }
}

/// Decide how `event` applies to a record whose stored status is `current`
/// (`None` when the lookup missed or the record expired).
pub fn decide(current: Option<InvoiceTransactionStatus>, event: TransactionEvent) -> Decision {
    let Some(current) = current else {
        return Decision::NotFound;
    };
    let (from, to) = event.edge();
    if current == from {
        Decision::Advance { from, to }
    } else {
        Decision::Reject { current }
    }
}

/// Whether `from -> to` is an edge of the machine.
pub fn is_valid_transition(from: InvoiceTransactionStatus, to: InvoiceTransactionStatus) -> bool {
    [
        TransactionEvent::ObjectCreated,
        TransactionEvent::CancelRequested,
        TransactionEvent::PayloadCommitted,
        TransactionEvent::ProcessingFailed,
    ]
    .iter()
    .any(|event| event.edge() == (from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvoiceTransactionStatus::*;

    const ALL: [InvoiceTransactionStatus; 5] = [Generated, Received, Processed, Cancelled, Failed];

    #[test]
    fn object_created_advances_only_from_generated() {
        assert_eq!(
            decide(Some(Generated), TransactionEvent::ObjectCreated),
            Decision::Advance {
                from: Generated,
                to: Received
            }
        );
        for status in [Received, Processed, Cancelled, Failed] {
            assert_eq!(
                decide(Some(status), TransactionEvent::ObjectCreated),
                Decision::Reject { current: status }
            );
        }
    }

    #[test]
    fn cancel_advances_only_from_generated() {
        assert_eq!(
            decide(Some(Generated), TransactionEvent::CancelRequested).notification(),
            Cancelled
        );
        for status in [Received, Processed, Cancelled, Failed] {
            let decision = decide(Some(status), TransactionEvent::CancelRequested);
            assert_eq!(decision, Decision::Reject { current: status });
            assert_eq!(decision.notification(), status);
        }
    }

    #[test]
    fn missing_record_is_not_found_for_every_event() {
        for event in [
            TransactionEvent::ObjectCreated,
            TransactionEvent::CancelRequested,
            TransactionEvent::PayloadCommitted,
            TransactionEvent::ProcessingFailed,
        ] {
            let decision = decide(None, event);
            assert_eq!(decision, Decision::NotFound);
            assert_eq!(decision.notification(), NotFound);
        }
    }

    #[test]
    fn only_documented_edges_are_valid() {
        let mut valid = Vec::new();
        for from in ALL {
            for to in ALL {
                if is_valid_transition(from, to) {
                    valid.push((from, to));
                }
            }
        }
        assert_eq!(
            valid,
            vec![
                (Generated, Received),
                (Generated, Cancelled),
                (Received, Processed),
                (Received, Failed),
            ]
        );
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!is_valid_transition(from, to));
            }
        }
    }
}
