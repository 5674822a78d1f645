//! Server application state shared across handlers

use super::events::EventBroadcaster;
use crate::commands::WizardSessionRegistry;
use crate::config::IntakeConfig;
use crate::i18n::Translator;
use crate::shutdown::ShutdownState;
use crate::storage::FileDocumentStore;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the server
#[derive(Clone)]
pub struct ServerAppState {
    /// Bearer token for the admin surface
    pub auth_token: String,

    /// Effective configuration
    pub config: Arc<IntakeConfig>,

    /// Document store for submissions and contact messages
    pub store: Arc<FileDocumentStore>,

    /// Live wizard sessions
    pub sessions: Arc<WizardSessionRegistry>,

    /// Message catalogs
    pub translator: Arc<Translator>,

    /// Event broadcaster for admin WebSocket clients
    pub broadcaster: Arc<EventBroadcaster>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    /// Create the server state. Does not start background tasks; see
    /// [`ServerAppState::start_background_tasks`].
    pub fn new(
        auth_token: String,
        config: IntakeConfig,
        store: FileDocumentStore,
        translator: Translator,
        shutdown_state: ShutdownState,
    ) -> Self {
        let store = Arc::new(store);
        let sessions = Arc::new(WizardSessionRegistry::new(
            Arc::clone(&store),
            Duration::from_secs(config.intake.session_ttl_secs),
            Duration::from_secs(config.intake.submit_timeout_secs),
        ));

        Self {
            auth_token,
            config: Arc::new(config),
            store,
            sessions,
            translator: Arc::new(translator),
            broadcaster: Arc::new(EventBroadcaster::new()),
            shutdown_state,
        }
    }

    /// Start the idle wizard session cleanup task
    pub fn start_background_tasks(&self) {
        WizardSessionRegistry::start_cleanup_task(Arc::clone(&self.sessions));
    }
}
