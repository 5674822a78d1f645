// Stateless intake commands: step catalogue, field checks, budget estimates

use crate::intake::estimator::{self, EstimateBreakdown};
use crate::intake::steps::{self, StepDescriptor};
use crate::intake::{validation, FieldName, FieldValue, ValidationResult};
use crate::utils::format_amount;
use serde::Serialize;

/// Estimate plus its display form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEstimate {
    #[serde(flatten)]
    pub breakdown: EstimateBreakdown,
    /// Total with thousands separators, e.g. `38,800`
    pub formatted_total: String,
}

pub fn get_intake_steps() -> Vec<StepDescriptor> {
    steps::describe_steps()
}

/// Check one field value without touching any wizard
pub fn validate_field(field: &str, value: Option<FieldValue>) -> Result<ValidationResult, String> {
    let field: FieldName = field.parse()?;
    Ok(validation::validate(field, value.as_ref()))
}

pub fn estimate_budget(
    project_type: Option<&str>,
    features: &[String],
    urgency: Option<&str>,
) -> BudgetEstimate {
    let breakdown = estimator::breakdown(project_type, features, urgency);
    BudgetEstimate {
        formatted_total: format_amount(breakdown.total),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_intake_steps() {
        let steps = get_intake_steps();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].id, "project");
        assert_eq!(steps[4].id, "review");
    }

    #[test]
    fn test_validate_field() {
        let result =
            validate_field("contactEmail", Some(FieldValue::Text("a@b.com".to_string()))).unwrap();
        assert!(result.valid);

        let result =
            validate_field("contactEmail", Some(FieldValue::Text("not-an-email".to_string())))
                .unwrap();
        assert!(!result.valid);

        assert!(validate_field("favouriteColour", None).is_err());
    }

    #[test]
    fn test_estimate_budget() {
        let estimate = estimate_budget(
            Some("mobile-app"),
            &["user-authentication".to_string()],
            Some("flexible"),
        );
        assert_eq!(estimate.breakdown.total, 38_800);
        assert_eq!(estimate.formatted_total, "38,800");

        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["total"], 38_800);
        assert_eq!(json["formattedTotal"], "38,800");
    }
}
