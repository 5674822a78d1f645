//! Intake wizard step definitions
//!
//! The step order is fixed; each step owns the fields it collects and
//! validates before the wizard may move past it.

use super::fields::FieldName;
use serde::{Deserialize, Serialize};

/// Wizard steps (5 steps, in order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// What is being built, and how soon
    Project,
    /// Who the client is and what they want to achieve
    Business,
    /// Features, timeline, budget and design direction
    Scope,
    /// How to reach the client
    Contact,
    /// Final notes and attachments
    Review,
}

impl WizardStep {
    /// Get all steps in order
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::Project,
            WizardStep::Business,
            WizardStep::Scope,
            WizardStep::Contact,
            WizardStep::Review,
        ]
    }

    /// Number of steps
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Step for a 1-based step number
    pub fn from_number(number: usize) -> Option<WizardStep> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::all().get(idx))
            .copied()
    }

    /// 1-based step number
    pub fn number(&self) -> usize {
        self.index() + 1
    }

    /// 0-based index
    pub fn index(&self) -> usize {
        match self {
            WizardStep::Project => 0,
            WizardStep::Business => 1,
            WizardStep::Scope => 2,
            WizardStep::Contact => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Project => Some(WizardStep::Business),
            WizardStep::Business => Some(WizardStep::Scope),
            WizardStep::Scope => Some(WizardStep::Contact),
            WizardStep::Contact => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Project => None,
            WizardStep::Business => Some(WizardStep::Project),
            WizardStep::Scope => Some(WizardStep::Business),
            WizardStep::Contact => Some(WizardStep::Scope),
            WizardStep::Review => Some(WizardStep::Contact),
        }
    }

    /// Stable identifier used in message keys
    pub fn id(&self) -> &'static str {
        match self {
            WizardStep::Project => "project",
            WizardStep::Business => "business",
            WizardStep::Scope => "scope",
            WizardStep::Contact => "contact",
            WizardStep::Review => "review",
        }
    }

    /// Fields collected on this step
    pub fn fields(&self) -> &'static [FieldName] {
        match self {
            WizardStep::Project => &[
                FieldName::Name,
                FieldName::Description,
                FieldName::ProjectType,
                FieldName::Urgency,
            ],
            WizardStep::Business => &[
                FieldName::Industry,
                FieldName::TargetAudience,
                FieldName::ExistingWebsite,
                FieldName::Goals,
            ],
            WizardStep::Scope => &[
                FieldName::Features,
                FieldName::Timeline,
                FieldName::Budget,
                FieldName::HasContent,
                FieldName::DesignPreferences,
            ],
            WizardStep::Contact => &[
                FieldName::ContactName,
                FieldName::ContactEmail,
                FieldName::ContactPhone,
                FieldName::Company,
                FieldName::PreferredContact,
            ],
            WizardStep::Review => &[FieldName::AdditionalInfo, FieldName::ProjectFiles],
        }
    }

    pub fn title_key(&self) -> String {
        format!("steps.{}.title", self.id())
    }

    pub fn description_key(&self) -> String {
        format!("steps.{}.description", self.id())
    }

    /// Step that owns a field
    pub fn owning(field: FieldName) -> WizardStep {
        Self::all()
            .iter()
            .copied()
            .find(|step| step.fields().contains(&field))
            .unwrap_or(WizardStep::Review)
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::Project
    }
}

/// Serializable description of a step for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDescriptor {
    pub number: usize,
    pub id: &'static str,
    pub title_key: String,
    pub description_key: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: FieldName,
    pub label_key: String,
    pub required: bool,
}

/// Describe every step, in order
pub fn describe_steps() -> Vec<StepDescriptor> {
    WizardStep::all()
        .iter()
        .map(|step| StepDescriptor {
            number: step.number(),
            id: step.id(),
            title_key: step.title_key(),
            description_key: step.description_key(),
            fields: step
                .fields()
                .iter()
                .map(|&field| FieldDescriptor {
                    name: field,
                    label_key: field.label_key(),
                    required: super::validation::rule_for(field).is_required(),
                })
                .collect(),
        })
        .collect()
}
