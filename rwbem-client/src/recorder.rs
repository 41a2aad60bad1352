//! Operation recording hooks
//!
//! Recorders observe every operation exchange: arguments, the raw HTTP
//! request and response bytes, and the outcome. They are side-effectful
//! observers only; a panicking or failing hook is caught, logged, and
//! dropped, and never changes the operation's result.

use crate::error::ClientError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// One recorded operation exchange
pub struct OperationRecord<'a> {
    /// Intrinsic or extrinsic operation name
    pub operation: &'a str,
    /// Raw CIM-XML request bytes as sent
    pub request: &'a [u8],
    /// Raw response bytes; empty when the transport failed before a
    /// response arrived
    pub response: &'a [u8],
    /// The operation outcome at recording time
    pub outcome: Result<(), &'a ClientError>,
}

/// A recorder hook attached to a connection.
///
/// `Send` so that a connection with recorders can move between threads
/// (the connection itself stays single-caller).
pub trait OperationRecorder: Send {
    fn record(&self, record: &OperationRecord<'_>);
}

/// Invoke every hook, swallowing panics so observers cannot change
/// operation outcomes
pub fn notify_all(recorders: &[Box<dyn OperationRecorder>], record: &OperationRecord<'_>) {
    for recorder in recorders {
        if catch_unwind(AssertUnwindSafe(|| recorder.record(record))).is_err() {
            warn!(
                operation = record.operation,
                "operation recorder panicked; ignoring"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Collecting {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl OperationRecorder for Collecting {
        fn record(&self, record: &OperationRecord<'_>) {
            self.seen
                .lock()
                .expect("recorder mutex poisoned")
                .push(record.operation.to_string());
        }
    }

    struct Panicking;

    impl OperationRecorder for Panicking {
        fn record(&self, _record: &OperationRecord<'_>) {
            panic!("hook blew up");
        }
    }

    #[test]
    fn panicking_hooks_do_not_stop_later_hooks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorders: Vec<Box<dyn OperationRecorder>> = vec![
            Box::new(Panicking),
            Box::new(Collecting { seen: seen.clone() }),
        ];
        let record = OperationRecord {
            operation: "GetClass",
            request: b"<CIM/>",
            response: b"",
            outcome: Ok(()),
        };
        notify_all(&recorders, &record);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["GetClass".to_string()]
        );
    }
}
