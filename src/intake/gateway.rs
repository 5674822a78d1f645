//! Submission gateway
//!
//! Hands a completed set of form values to the persistence service exactly
//! once per call. A second submit while one is still in flight is refused
//! before it reaches the store.

use super::fields::FormValues;
use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the persistence service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The service could not be reached or did not answer
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The service refused the document (schema or required-field failure)
    #[error("document rejected: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The requested change conflicts with the current document state
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Classify the error for the submitting client
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Unavailable(_) => ErrorKind::ConnectionError,
            StoreError::Rejected(_) => ErrorKind::ValidationError,
            _ => ErrorKind::UnknownError,
        }
    }
}

/// The persistence boundary used by the gateway
pub trait SubmissionStore: Send + Sync + 'static {
    /// Persist a submission and return its identifier
    fn create_submission(&self, values: &FormValues) -> Result<String, StoreError>;
}

impl<S: SubmissionStore> SubmissionStore for Arc<S> {
    fn create_submission(&self, values: &FormValues) -> Result<String, StoreError> {
        (**self).create_submission(values)
    }
}

/// Failure classes reported to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ConnectionError,
    ValidationError,
    UnknownError,
}

/// Result of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success { id: String },
    Failure { kind: ErrorKind },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Success { id } => Some(id),
            SubmitOutcome::Failure { .. } => None,
        }
    }
}

// Wire shape: {"success": true, "id": ...} or {"success": false, "errorKind": ...}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
}

impl Serialize for SubmitOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            SubmitOutcome::Success { id } => OutcomeWire {
                success: true,
                id: Some(id),
                error_kind: None,
            },
            SubmitOutcome::Failure { kind } => OutcomeWire {
                success: false,
                id: None,
                error_kind: Some(*kind),
            },
        };
        wire.serialize(serializer)
    }
}

/// Returned when a submission is already in flight
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("a submission is already in progress")]
pub struct GatewayBusy;

/// Clears the in-flight flag when the submission finishes or is dropped
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, GatewayBusy> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GatewayBusy)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sends submissions to a store, one at a time
pub struct SubmissionGateway<S: SubmissionStore> {
    store: Arc<S>,
    in_flight: Arc<AtomicBool>,
}

impl<S: SubmissionStore> Clone for SubmissionGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: SubmissionStore> SubmissionGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit once. Never retries.
    ///
    /// The in-flight guard lives inside the blocking task, so it is held
    /// until the store call returns even if this future is dropped first.
    pub async fn submit(&self, values: FormValues) -> Result<SubmitOutcome, GatewayBusy> {
        let guard = InFlightGuard::acquire(&self.in_flight)?;

        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            store.create_submission(&values)
        })
        .await;

        let outcome = match result {
            Ok(Ok(id)) => {
                log::info!("Submission stored: {}", id);
                SubmitOutcome::Success { id }
            }
            Ok(Err(e)) => {
                log::warn!("Submission failed: {}", e);
                SubmitOutcome::Failure { kind: e.kind() }
            }
            Err(e) => {
                log::error!("Submission task failed: {}", e);
                SubmitOutcome::Failure {
                    kind: ErrorKind::UnknownError,
                }
            }
        };
        Ok(outcome)
    }

    /// Submit with a caller-imposed timeout. An elapsed timeout is reported
    /// as a connection error; the store is not told to abandon the write and
    /// the gateway stays busy until it finishes.
    pub async fn submit_with_timeout(
        &self,
        values: FormValues,
        timeout: Duration,
    ) -> Result<SubmitOutcome, GatewayBusy> {
        match tokio::time::timeout(timeout, self.submit(values)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("Submission timed out after {:?}", timeout);
                Ok(SubmitOutcome::Failure {
                    kind: ErrorKind::ConnectionError,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::fields::FieldName;
    use std::sync::atomic::AtomicUsize;

    struct ScriptedStore {
        calls: AtomicUsize,
        delay: Duration,
        result: Result<String, StoreError>,
    }

    impl ScriptedStore {
        fn new(result: Result<String, StoreError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                result,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl SubmissionStore for ScriptedStore {
        fn create_submission(&self, _values: &FormValues) -> Result<String, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.result.clone()
        }
    }

    fn sample() -> FormValues {
        FormValues::new().with(FieldName::Name, "Acme Redo")
    }

    #[tokio::test]
    async fn test_submit_success() {
        let store = Arc::new(ScriptedStore::new(Ok("sub_abc".to_string())));
        let gateway = SubmissionGateway::new(Arc::clone(&store));

        let outcome = gateway.submit(sample()).await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Success {
                id: "sub_abc".to_string()
            }
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(!gateway.is_in_flight());
    }

    #[tokio::test]
    async fn test_error_kinds() {
        let cases = [
            (
                StoreError::Unavailable("down".into()),
                ErrorKind::ConnectionError,
            ),
            (
                StoreError::Rejected("bad".into()),
                ErrorKind::ValidationError,
            ),
            (StoreError::Internal("boom".into()), ErrorKind::UnknownError),
        ];
        for (error, kind) in cases {
            let gateway = SubmissionGateway::new(Arc::new(ScriptedStore::new(Err(error))));
            let outcome = gateway.submit(sample()).await.unwrap();
            assert_eq!(outcome, SubmitOutcome::Failure { kind });
        }
    }

    #[tokio::test]
    async fn test_second_submit_refused_while_in_flight() {
        let store = Arc::new(
            ScriptedStore::new(Ok("sub_slow".to_string())).slow(Duration::from_millis(300)),
        );
        let gateway = SubmissionGateway::new(Arc::clone(&store));

        let first_gateway = gateway.clone();
        let first = tokio::spawn(async move { first_gateway.submit(sample()).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(gateway.is_in_flight());
        assert_eq!(gateway.submit(sample()).await, Err(GatewayBusy));

        let outcome = first.await.unwrap().unwrap();
        assert!(outcome.is_success());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(!gateway.is_in_flight());
    }

    #[tokio::test]
    async fn test_timeout_reports_connection_error() {
        let store = Arc::new(
            ScriptedStore::new(Ok("sub_late".to_string())).slow(Duration::from_millis(300)),
        );
        let gateway = SubmissionGateway::new(store);

        let outcome = gateway
            .submit_with_timeout(sample(), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Failure {
                kind: ErrorKind::ConnectionError
            }
        );
        // The write is still running
        assert!(gateway.is_in_flight());
    }

    #[tokio::test]
    async fn test_resubmit_after_timeout_does_not_duplicate() {
        let store = Arc::new(
            ScriptedStore::new(Ok("sub_late".to_string())).slow(Duration::from_millis(300)),
        );
        let gateway = SubmissionGateway::new(Arc::clone(&store));

        let first = gateway
            .submit_with_timeout(sample(), Duration::from_millis(20))
            .await
            .unwrap();
        assert!(!first.is_success());

        assert_eq!(gateway.submit(sample()).await, Err(GatewayBusy));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        // Released once the abandoned write completes
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!gateway.is_in_flight());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outcome_wire_shape() {
        let ok = serde_json::to_value(SubmitOutcome::Success {
            id: "sub_1".to_string(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "id": "sub_1"}));

        let failed = serde_json::to_value(SubmitOutcome::Failure {
            kind: ErrorKind::ValidationError,
        })
        .unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"success": false, "errorKind": "ValidationError"})
        );
    }
}
