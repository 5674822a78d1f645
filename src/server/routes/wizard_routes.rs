//! Intake wizard command routing
//!
//! Handles: get_intake_steps, validate_field, estimate_budget, create_wizard,
//! get_wizard, set_wizard_field, clear_wizard_field, advance_wizard,
//! retreat_wizard, jump_wizard, estimate_wizard, submit_wizard, discard_wizard

use crate::commands::intake;
use crate::events::{SubmissionCreatedPayload, EVENT_SUBMISSION_CREATED};
use crate::intake::{FieldName, FieldValue, SubmitOutcome};
use serde_json::Value;

use super::{get_arg, get_opt_arg, route_sync, route_value, with_store, ServerAppState};

/// Route wizard commands
pub async fn route_wizard_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    let sessions = &state.sessions;
    let to_string = |e: crate::commands::WizardError| e.to_string();

    match cmd {
        "get_intake_steps" => route_value!(intake::get_intake_steps()),

        "validate_field" => {
            let field: String = get_arg(&args, "field")?;
            let value: Option<FieldValue> = get_opt_arg(&args, "value")?;
            route_sync!(intake::validate_field(&field, value))
        }

        "estimate_budget" => {
            let project_type: Option<String> = get_opt_arg(&args, "type")?;
            let features: Option<Vec<String>> = get_opt_arg(&args, "features")?;
            let urgency: Option<String> = get_opt_arg(&args, "urgency")?;
            route_value!(intake::estimate_budget(
                project_type.as_deref(),
                &features.unwrap_or_default(),
                urgency.as_deref()
            ))
        }

        "create_wizard" => route_value!(sessions.create()),

        "get_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            route_sync!(sessions.get(&id).map_err(to_string))
        }

        "set_wizard_field" => {
            let id: String = get_arg(&args, "wizardId")?;
            let field: FieldName = get_arg(&args, "field")?;
            let value: FieldValue = get_arg(&args, "value")?;
            route_sync!(sessions.set_field(&id, field, value).map_err(to_string))
        }

        "clear_wizard_field" => {
            let id: String = get_arg(&args, "wizardId")?;
            let field: FieldName = get_arg(&args, "field")?;
            route_sync!(sessions.clear_field(&id, field).map_err(to_string))
        }

        "advance_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            route_sync!(sessions.advance(&id).map_err(to_string))
        }

        "retreat_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            route_sync!(sessions.retreat(&id).map_err(to_string))
        }

        "jump_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            let step: usize = get_arg(&args, "step")?;
            route_sync!(sessions.jump(&id, step).map_err(to_string))
        }

        "estimate_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            route_sync!(sessions.estimate(&id).map_err(to_string))
        }

        "submit_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            let submission = sessions.submit(&id).await.map_err(to_string)?;
            if let SubmitOutcome::Success { id: record_id } = &submission.outcome {
                broadcast_created(state, record_id.clone()).await;
            }
            route_value!(submission)
        }

        "discard_wizard" => {
            let id: String = get_arg(&args, "wizardId")?;
            route_value!(sessions.discard(&id))
        }

        _ => Err(format!("Unknown wizard command: {}", cmd)),
    }
}

/// Check if a command is a wizard command
pub fn is_wizard_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "get_intake_steps"
            | "validate_field"
            | "estimate_budget"
            | "create_wizard"
            | "get_wizard"
            | "set_wizard_field"
            | "clear_wizard_field"
            | "advance_wizard"
            | "retreat_wizard"
            | "jump_wizard"
            | "estimate_wizard"
            | "submit_wizard"
            | "discard_wizard"
    )
}

async fn broadcast_created(state: &ServerAppState, record_id: String) {
    let lookup_id = record_id.clone();
    match with_store(state, move |store| {
        store.get_submission(&lookup_id).map_err(|e| e.to_string())
    })
    .await
    {
        Ok(record) => state.broadcaster.broadcast(
            EVENT_SUBMISSION_CREATED,
            SubmissionCreatedPayload {
                submission_id: record.id.clone(),
                name: record.values.text(FieldName::Name).map(String::from),
                project_type: record.values.text(FieldName::ProjectType).map(String::from),
                estimated_budget: record.estimated_budget,
                created_at: record.created_at.to_rfc3339(),
            },
        ),
        Err(e) => log::warn!("Stored submission {} could not be re-read: {}", record_id, e),
    }
}
