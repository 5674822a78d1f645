//! Submission management command routing (admin)
//!
//! Handles: list_submissions, get_submission, count_submissions,
//! search_submissions, update_submission_status, assign_submission,
//! delete_submission

use crate::commands::submissions;
use crate::events::{
    DocumentDeletedPayload, SubmissionAssignedPayload, SubmissionStatusChangedPayload,
    EVENT_SUBMISSION_ASSIGNED, EVENT_SUBMISSION_DELETED, EVENT_SUBMISSION_STATUS_CHANGED,
};
use crate::storage::{SubmissionQuery, SubmissionStatus};
use serde_json::Value;

use super::{get_arg, get_opt_arg, route_value, with_store, ServerAppState};

/// Route submission commands
pub async fn route_submission_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "list_submissions" => {
            let query: SubmissionQuery = get_opt_arg(&args, "query")?.unwrap_or_default();
            let entries =
                with_store(state, move |store| submissions::list_submissions(store, &query))
                    .await?;
            route_value!(entries)
        }

        "get_submission" => {
            let id: String = get_arg(&args, "id")?;
            let detail =
                with_store(state, move |store| submissions::get_submission(store, &id)).await?;
            route_value!(detail)
        }

        "count_submissions" => {
            let query: SubmissionQuery = get_opt_arg(&args, "query")?.unwrap_or_default();
            let count =
                with_store(state, move |store| submissions::count_submissions(store, &query))
                    .await?;
            route_value!(count)
        }

        "search_submissions" => {
            let text: String = get_arg(&args, "text")?;
            let limit: Option<usize> = get_opt_arg(&args, "limit")?;
            let found = with_store(state, move |store| {
                submissions::search_submissions(store, &text, limit)
            })
            .await?;
            route_value!(found)
        }

        "update_submission_status" => {
            let id: String = get_arg(&args, "id")?;
            let status: SubmissionStatus = get_arg(&args, "status")?;
            let (record, old_status) = with_store(state, move |store| {
                submissions::update_submission_status_internal(store, &id, status)
            })
            .await?;

            if old_status != record.status {
                state.broadcaster.broadcast(
                    EVENT_SUBMISSION_STATUS_CHANGED,
                    SubmissionStatusChangedPayload {
                        submission_id: record.id.clone(),
                        old_status: old_status.to_string(),
                        new_status: record.status.to_string(),
                    },
                );
            }
            route_value!(record)
        }

        "assign_submission" => {
            let id: String = get_arg(&args, "id")?;
            let assignee: Option<String> = get_opt_arg(&args, "assignee")?;
            let record = with_store(state, move |store| {
                submissions::assign_submission(store, &id, assignee)
            })
            .await?;

            state.broadcaster.broadcast(
                EVENT_SUBMISSION_ASSIGNED,
                SubmissionAssignedPayload {
                    submission_id: record.id.clone(),
                    assigned_to: record.assigned_to.clone(),
                },
            );
            route_value!(record)
        }

        "delete_submission" => {
            let id: String = get_arg(&args, "id")?;
            let deleted_id = id.clone();
            with_store(state, move |store| submissions::delete_submission(store, &id)).await?;
            state.broadcaster.broadcast(
                EVENT_SUBMISSION_DELETED,
                DocumentDeletedPayload { id: deleted_id },
            );
            Ok(Value::Null)
        }

        _ => Err(format!("Unknown submission command: {}", cmd)),
    }
}

/// Check if a command is a submission command
pub fn is_submission_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "list_submissions"
            | "get_submission"
            | "count_submissions"
            | "search_submissions"
            | "update_submission_status"
            | "assign_submission"
            | "delete_submission"
    )
}
