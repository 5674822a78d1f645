// Wizard session commands
// Each browser tab drives its own server-held wizard through these calls.

use crate::intake::{
    EstimateBreakdown, FieldName, FieldValue, FormValues, GatewayBusy, StepOutcome,
    SubmissionGateway, SubmitOutcome, ValidationResult, WizardState,
};
use crate::shutdown::ShutdownReport;
use crate::storage::{self, FileDocumentStore};
use crate::utils::lock_mutex_recover;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Id prefix for wizard sessions
pub const ID_PREFIX: &str = "wiz";

/// How often the cleanup task looks for idle sessions
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Wizard session not found: {0}")]
    NotFound(String),

    #[error("Wizard is not ready to submit")]
    Incomplete,

    #[error(transparent)]
    Busy(#[from] GatewayBusy),
}

/// One server-held wizard
struct WizardSession {
    state: WizardState,
    gateway: SubmissionGateway<FileDocumentStore>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl WizardSession {
    fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    fn view(&self, id: &str) -> WizardView {
        WizardView {
            id: id.to_string(),
            current_step: self.state.current_step(),
            step_id: self.state.step().id(),
            step_count: WizardState::step_count(),
            progress: self.state.progress_percentage(),
            values: self.state.values().clone(),
            can_submit: self.state.can_submit(),
            submitting: self.gateway.is_in_flight(),
            estimate: self.state.estimate(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}

/// Snapshot of a wizard session returned to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub id: String,
    pub current_step: usize,
    pub step_id: &'static str,
    pub step_count: usize,
    pub progress: u8,
    pub values: FormValues,
    pub can_submit: bool,
    pub submitting: bool,
    pub estimate: EstimateBreakdown,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// Response for field edits
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub field: FieldName,
    pub validation: ValidationResult,
    pub wizard: WizardView,
}

/// Response for step transitions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub result: StepOutcome,
    pub wizard: WizardView,
}

/// Response for a submit attempt that reached the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSubmission {
    pub outcome: SubmitOutcome,
    pub wizard: WizardView,
}

/// Registry of live wizard sessions
pub struct WizardSessionRegistry {
    sessions: Mutex<HashMap<String, WizardSession>>,
    store: Arc<FileDocumentStore>,
    ttl: Duration,
    submit_timeout: Duration,
}

impl WizardSessionRegistry {
    pub fn new(store: Arc<FileDocumentStore>, ttl: Duration, submit_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            store,
            ttl,
            submit_timeout,
        }
    }

    /// Start a wizard on step 1 with no values
    pub fn create(&self) -> WizardView {
        let id = storage::new_id(ID_PREFIX);
        let now = Utc::now();
        let session = WizardSession {
            state: WizardState::new(),
            gateway: SubmissionGateway::new(Arc::clone(&self.store)),
            created_at: now,
            last_activity_at: now,
        };
        let view = session.view(&id);

        lock_mutex_recover(&self.sessions).insert(id.clone(), session);
        log::debug!("Created wizard session {}", id);
        view
    }

    pub fn get(&self, id: &str) -> Result<WizardView, WizardError> {
        self.with_session(id, |session| session.view(id))
    }

    pub fn set_field(
        &self,
        id: &str,
        field: FieldName,
        value: FieldValue,
    ) -> Result<FieldUpdate, WizardError> {
        self.with_editable_session(id, |session| {
            let validation = session.state.set_field(field, value);
            FieldUpdate {
                field,
                validation,
                wizard: session.view(id),
            }
        })
    }

    pub fn clear_field(&self, id: &str, field: FieldName) -> Result<FieldUpdate, WizardError> {
        self.with_editable_session(id, |session| {
            let validation = session.state.clear_field(field);
            FieldUpdate {
                field,
                validation,
                wizard: session.view(id),
            }
        })
    }

    pub fn advance(&self, id: &str) -> Result<Transition, WizardError> {
        self.with_editable_session(id, |session| Transition {
            result: session.state.advance(),
            wizard: session.view(id),
        })
    }

    pub fn retreat(&self, id: &str) -> Result<WizardView, WizardError> {
        self.with_editable_session(id, |session| {
            session.state.retreat();
            session.view(id)
        })
    }

    pub fn jump(&self, id: &str, step: usize) -> Result<Transition, WizardError> {
        self.with_editable_session(id, |session| Transition {
            result: session.state.jump(step),
            wizard: session.view(id),
        })
    }

    pub fn estimate(&self, id: &str) -> Result<EstimateBreakdown, WizardError> {
        self.with_session(id, |session| session.state.estimate())
    }

    /// Send the wizard's values to the store.
    ///
    /// The registry lock is released while the store call runs. On success the
    /// wizard is reset to step 1; on failure the values are kept so the user
    /// can retry.
    pub async fn submit(&self, id: &str) -> Result<WizardSubmission, WizardError> {
        let (values, gateway) = self.with_session(id, |session| {
            if !session.state.can_submit() {
                return Err(WizardError::Incomplete);
            }
            if session.gateway.is_in_flight() {
                return Err(WizardError::Busy(GatewayBusy));
            }
            Ok((session.state.values().clone(), session.gateway.clone()))
        })??;

        let outcome = gateway
            .submit_with_timeout(values, self.submit_timeout)
            .await?;

        self.with_session(id, |session| {
            if outcome.is_success() {
                session.state.reset();
            }
            WizardSubmission {
                outcome,
                wizard: session.view(id),
            }
        })
    }

    /// Drop a session. Returns false when it did not exist.
    pub fn discard(&self, id: &str) -> bool {
        let removed = lock_mutex_recover(&self.sessions).remove(id).is_some();
        if removed {
            log::debug!("Discarded wizard session {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        lock_mutex_recover(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle for longer than the TTL, returning how many went
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_idle_since(Utc::now())
    }

    fn cleanup_idle_since(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::days(365));
        let mut sessions = lock_mutex_recover(&self.sessions);
        let before = sessions.len();
        // In-flight sessions are kept so their result has somewhere to land
        sessions.retain(|_, s| s.gateway.is_in_flight() || now - s.last_activity_at <= ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            log::info!("Cleaned up {} idle wizard session(s)", removed);
        }
        removed
    }

    /// Start the periodic cleanup task
    pub fn start_cleanup_task(registry: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVAL).await;
                registry.cleanup_expired();
            }
        });
    }

    /// Drop every session, reporting what was still open
    pub fn shutdown(&self) -> ShutdownReport {
        let mut sessions = lock_mutex_recover(&self.sessions);
        let report = ShutdownReport {
            sessions_discarded: sessions.len(),
            submissions_in_flight: sessions
                .values()
                .filter(|s| s.gateway.is_in_flight())
                .count(),
        };
        sessions.clear();
        report
    }

    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut WizardSession) -> T,
    ) -> Result<T, WizardError> {
        let mut sessions = lock_mutex_recover(&self.sessions);
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| WizardError::NotFound(id.to_string()))?;
        session.touch();
        Ok(f(session))
    }

    /// Like `with_session`, but refuses while a submission is in flight.
    /// A successful submit resets the state, which would drop the edit.
    fn with_editable_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut WizardSession) -> T,
    ) -> Result<T, WizardError> {
        self.with_session(id, |session| {
            if session.gateway.is_in_flight() {
                return Err(WizardError::Busy(GatewayBusy));
            }
            Ok(f(session))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::ErrorKind;
    use crate::storage::SubmissionQuery;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<FileDocumentStore>, WizardSessionRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileDocumentStore::open(temp_dir.path()).unwrap());
        let registry = WizardSessionRegistry::new(
            Arc::clone(&store),
            Duration::from_secs(3600),
            Duration::from_secs(5),
        );
        (temp_dir, store, registry)
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    fn fill_required(registry: &WizardSessionRegistry, id: &str) {
        registry.set_field(id, FieldName::Name, text("Acme launch")).unwrap();
        registry
            .set_field(id, FieldName::Description, text("A brand new storefront"))
            .unwrap();
        registry.set_field(id, FieldName::ProjectType, text("ecommerce")).unwrap();
        registry
            .set_field(id, FieldName::ContactEmail, text("ana@example.com"))
            .unwrap();
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, _store, registry) = setup();
        let view = registry.create();

        assert!(view.id.starts_with("wiz_"));
        assert_eq!(view.current_step, 1);
        assert_eq!(view.step_id, "project");
        assert_eq!(view.progress, 20);
        assert!(!view.can_submit);

        let fetched = registry.get(&view.id).unwrap();
        assert_eq!(fetched.id, view.id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_session() {
        let (_dir, _store, registry) = setup();
        assert_eq!(
            registry.get("wiz_missing").unwrap_err(),
            WizardError::NotFound("wiz_missing".to_string())
        );
        assert!(!registry.discard("wiz_missing"));
    }

    #[test]
    fn test_set_field_reports_validation() {
        let (_dir, _store, registry) = setup();
        let id = registry.create().id;

        let update = registry.set_field(&id, FieldName::ContactEmail, text("not-an-email")).unwrap();
        assert!(!update.validation.valid);
        assert_eq!(update.wizard.current_step, 1);

        let update = registry.clear_field(&id, FieldName::ContactEmail).unwrap();
        assert!(!update.wizard.values.is_present(FieldName::ContactEmail));
    }

    #[test]
    fn test_advance_blocked_then_moves() {
        let (_dir, _store, registry) = setup();
        let id = registry.create().id;

        let blocked = registry.advance(&id).unwrap();
        assert!(blocked.result.is_blocked());
        assert_eq!(blocked.wizard.current_step, 1);

        fill_required(&registry, &id);
        let moved = registry.advance(&id).unwrap();
        assert_eq!(moved.result, StepOutcome::Moved { step: 2 });

        let back = registry.retreat(&id).unwrap();
        assert_eq!(back.current_step, 1);
        assert_eq!(back.values, moved.wizard.values);
    }

    #[test]
    fn test_jump_out_of_range() {
        let (_dir, _store, registry) = setup();
        let id = registry.create().id;
        let transition = registry.jump(&id, 9).unwrap();
        assert_eq!(transition.result, StepOutcome::OutOfRange { requested: 9 });
    }

    #[tokio::test]
    async fn test_submit_requires_last_step() {
        let (_dir, _store, registry) = setup();
        let id = registry.create().id;
        fill_required(&registry, &id);

        assert_eq!(registry.submit(&id).await.unwrap_err(), WizardError::Incomplete);
    }

    #[tokio::test]
    async fn test_submit_persists_and_resets() {
        let (_dir, store, registry) = setup();
        let id = registry.create().id;
        fill_required(&registry, &id);
        assert_eq!(
            registry.jump(&id, 5).unwrap().result,
            StepOutcome::Moved { step: 5 }
        );

        let submission = registry.submit(&id).await.unwrap();
        let record_id = submission.outcome.id().unwrap().to_string();
        assert!(record_id.starts_with("sub_"));
        assert_eq!(submission.wizard.current_step, 1);
        assert!(submission.wizard.values.is_empty());

        let record = store.get_submission(&record_id).unwrap();
        assert_eq!(record.values.text(FieldName::Name), Some("Acme launch"));
        assert_eq!(store.count_submissions(&SubmissionQuery::default()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_values() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(
            FileDocumentStore::open(temp_dir.path())
                .unwrap()
                .with_required_fields(vec![FieldName::Company]),
        );
        let registry =
            WizardSessionRegistry::new(store, Duration::from_secs(3600), Duration::from_secs(5));
        let id = registry.create().id;
        fill_required(&registry, &id);
        registry.jump(&id, 5).unwrap();

        let submission = registry.submit(&id).await.unwrap();
        assert_eq!(
            submission.outcome,
            SubmitOutcome::Failure {
                kind: ErrorKind::ValidationError
            }
        );
        assert_eq!(submission.wizard.current_step, 5);
        assert!(submission.wizard.values.is_present(FieldName::Name));
    }

    #[tokio::test]
    async fn test_edits_refused_while_submitting() {
        use fs2::FileExt;

        let (dir, store, registry) = setup();
        let registry = Arc::new(registry);
        let id = registry.create().id;
        fill_required(&registry, &id);
        registry.jump(&id, 5).unwrap();

        // Hold the store lock so the write stays in flight
        let lock = std::fs::File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.path().join("store.lock"))
            .unwrap();
        lock.lock_exclusive().unwrap();

        let submitting = {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            tokio::spawn(async move { registry.submit(&id).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(registry.get(&id).unwrap().submitting);
        let busy = WizardError::Busy(GatewayBusy);
        assert_eq!(
            registry.set_field(&id, FieldName::Company, text("Acme")).unwrap_err(),
            busy
        );
        assert_eq!(registry.clear_field(&id, FieldName::Name).unwrap_err(), busy);
        assert_eq!(registry.advance(&id).unwrap_err(), busy);
        assert_eq!(registry.retreat(&id).unwrap_err(), busy);
        assert_eq!(registry.jump(&id, 1).unwrap_err(), busy);

        FileExt::unlock(&lock).unwrap();
        let submission = submitting.await.unwrap().unwrap();
        assert!(submission.outcome.is_success());
        assert_eq!(store.count_submissions(&SubmissionQuery::default()).unwrap(), 1);

        // Editable again once the submit finished
        assert!(registry.set_field(&id, FieldName::Company, text("Acme")).is_ok());
    }

    #[test]
    fn test_cleanup_idle_sessions() {
        let (_dir, _store, registry) = setup();
        let stale = registry.create().id;
        let fresh = registry.create().id;

        let later = Utc::now() + chrono::Duration::seconds(3601);
        registry.get(&fresh).unwrap();
        {
            let mut sessions = lock_mutex_recover(&registry.sessions);
            sessions.get_mut(&fresh).unwrap().last_activity_at = later;
        }

        assert_eq!(registry.cleanup_idle_since(later + chrono::Duration::seconds(1)), 1);
        assert!(registry.get(&stale).is_err());
        assert!(registry.get(&fresh).is_ok());
    }

    #[test]
    fn test_shutdown_report() {
        let (_dir, _store, registry) = setup();
        registry.create();
        registry.create();

        let report = registry.shutdown();
        assert_eq!(report.sessions_discarded, 2);
        assert!(report.is_clean());
        assert!(registry.is_empty());
    }
}
