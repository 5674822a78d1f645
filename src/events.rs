// Event types and payload structures for real-time updates
// These are broadcast via WebSocket to connected admin clients

use serde::{Deserialize, Serialize};

// Event name constants
pub const EVENT_SUBMISSION_CREATED: &str = "submission:created";
pub const EVENT_SUBMISSION_STATUS_CHANGED: &str = "submission:status_changed";
pub const EVENT_SUBMISSION_ASSIGNED: &str = "submission:assigned";
pub const EVENT_SUBMISSION_DELETED: &str = "submission:deleted";

pub const EVENT_CONTACT_CREATED: &str = "contact:created";
pub const EVENT_CONTACT_STATUS_CHANGED: &str = "contact:status_changed";
pub const EVENT_CONTACT_DELETED: &str = "contact:deleted";

/// Payload for new submission events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCreatedPayload {
    pub submission_id: String,
    pub name: Option<String>,
    pub project_type: Option<String>,
    /// Estimate computed from the submitted values
    pub estimated_budget: u64,
    pub created_at: String,
}

/// Payload for submission status change events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatusChangedPayload {
    pub submission_id: String,
    pub old_status: String,
    pub new_status: String,
}

/// Payload for submission assignment events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAssignedPayload {
    pub submission_id: String,
    /// None when the submission was unassigned
    pub assigned_to: Option<String>,
}

/// Payload for deletions, shared by both collections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDeletedPayload {
    pub id: String,
}

/// Payload for new contact message events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCreatedPayload {
    pub message_id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub created_at: String,
}

/// Payload for contact status change events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStatusChangedPayload {
    pub message_id: String,
    pub old_status: String,
    pub new_status: String,
}
