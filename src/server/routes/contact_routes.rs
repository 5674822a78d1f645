//! Contact form command routing
//!
//! Public: submit_contact
//! Admin: list_contacts, get_contact, count_contacts, update_contact_status,
//! delete_contact

use crate::commands::contacts::{self, ContactSubmission};
use crate::contact::ContactForm;
use crate::events::{
    ContactCreatedPayload, ContactStatusChangedPayload, DocumentDeletedPayload,
    EVENT_CONTACT_CREATED, EVENT_CONTACT_DELETED, EVENT_CONTACT_STATUS_CHANGED,
};
use crate::storage::ContactStatus;
use serde_json::Value;

use super::{get_arg, get_opt_arg, route_value, with_store, ServerAppState};

/// Route the public contact command
pub async fn route_contact_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "submit_contact" => {
            let form: ContactForm = get_arg(&args, "form")?;
            let result = with_store(state, move |store| {
                let submission = contacts::submit_contact_form(store, &form)?;
                // Re-read so the event carries the stored (trimmed) values
                let record = match &submission {
                    ContactSubmission::Sent { id } => Some(contacts::get_contact(store, id)?),
                    ContactSubmission::Invalid { .. } => None,
                };
                Ok((submission, record))
            })
            .await?;

            let (submission, record) = result;
            if let Some(record) = record {
                state.broadcaster.broadcast(
                    EVENT_CONTACT_CREATED,
                    ContactCreatedPayload {
                        message_id: record.id,
                        name: record.name,
                        email: record.email,
                        subject: record.subject,
                        created_at: record.created_at.to_rfc3339(),
                    },
                );
            }
            route_value!(submission)
        }

        _ => Err(format!("Unknown contact command: {}", cmd)),
    }
}

/// Route admin contact commands
pub async fn route_contact_admin_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "list_contacts" => {
            let status: Option<ContactStatus> = get_opt_arg(&args, "status")?;
            let entries = with_store(state, move |store| contacts::list_contacts(store, status)).await?;
            route_value!(entries)
        }

        "get_contact" => {
            let id: String = get_arg(&args, "id")?;
            let record = with_store(state, move |store| contacts::get_contact(store, &id)).await?;
            route_value!(record)
        }

        "count_contacts" => {
            let status: Option<ContactStatus> = get_opt_arg(&args, "status")?;
            let count =
                with_store(state, move |store| contacts::count_contacts(store, status)).await?;
            route_value!(count)
        }

        "update_contact_status" => {
            let id: String = get_arg(&args, "id")?;
            let status: ContactStatus = get_arg(&args, "status")?;
            let (record, old_status) = with_store(state, move |store| {
                contacts::update_contact_status_internal(store, &id, status)
            })
            .await?;

            if old_status != record.status {
                state.broadcaster.broadcast(
                    EVENT_CONTACT_STATUS_CHANGED,
                    ContactStatusChangedPayload {
                        message_id: record.id.clone(),
                        old_status: old_status.to_string(),
                        new_status: record.status.to_string(),
                    },
                );
            }
            route_value!(record)
        }

        "delete_contact" => {
            let id: String = get_arg(&args, "id")?;
            let deleted_id = id.clone();
            with_store(state, move |store| contacts::delete_contact(store, &id)).await?;
            state.broadcaster.broadcast(
                EVENT_CONTACT_DELETED,
                DocumentDeletedPayload { id: deleted_id },
            );
            Ok(Value::Null)
        }

        _ => Err(format!("Unknown contact command: {}", cmd)),
    }
}

/// Check if a command is the public contact command
pub fn is_contact_command(cmd: &str) -> bool {
    cmd == "submit_contact"
}

/// Check if a command is an admin contact command
pub fn is_contact_admin_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "list_contacts"
            | "get_contact"
            | "count_contacts"
            | "update_contact_status"
            | "delete_contact"
    )
}
