//! Budget estimator
//!
//! Derives a rough project estimate from the project type, the requested
//! features and the urgency. Pure and deterministic.

use super::fields::{FieldName, FormValues};
use serde::Serialize;

/// Base used when the project type is missing or unknown
pub const FALLBACK_BASE: u64 = 10_000;

const BASE_AMOUNTS: &[(&str, u64)] = &[
    ("website-redesign", 15_000),
    ("new-website", 12_000),
    ("ecommerce", 25_000),
    ("web-app", 35_000),
    ("mobile-app", 45_000),
    ("branding", 8_000),
];

const FEATURE_SURCHARGES: &[(&str, u64)] = &[
    ("user-authentication", 3_500),
    ("payment-integration", 5_000),
    ("cms", 4_000),
    ("multilingual", 3_000),
    ("analytics", 1_500),
    ("seo-optimization", 2_000),
    ("api-integration", 4_500),
    ("push-notifications", 2_500),
    ("admin-dashboard", 6_000),
    ("search", 2_500),
    ("booking-system", 5_500),
    ("live-chat", 2_000),
];

// The form stores low/medium/high/urgent; flexible and standard are the
// timeline labels used on the pricing page.
const URGENCY_MULTIPLIERS: &[(&str, f64)] = &[
    ("flexible", 0.8),
    ("low", 0.9),
    ("standard", 1.0),
    ("medium", 1.0),
    ("high", 1.25),
    ("urgent", 1.5),
];

/// Base amount for a project type (fallback when unknown)
pub fn base_amount(project_type: Option<&str>) -> u64 {
    project_type
        .and_then(|t| lookup(BASE_AMOUNTS, t))
        .unwrap_or(FALLBACK_BASE)
}

/// Surcharge for a single feature (0 when unknown)
pub fn surcharge(feature: &str) -> u64 {
    lookup(FEATURE_SURCHARGES, feature).unwrap_or(0)
}

/// Multiplier for an urgency level (1.0 when absent or unknown)
pub fn urgency_multiplier(urgency: Option<&str>) -> f64 {
    urgency
        .and_then(|u| lookup(URGENCY_MULTIPLIERS, u))
        .unwrap_or(1.0)
}

/// Known feature identifiers, in display order
pub fn known_features() -> impl Iterator<Item = &'static str> {
    FEATURE_SURCHARGES.iter().map(|(name, _)| *name)
}

/// Estimate a project budget
pub fn estimate<S: AsRef<str>>(
    project_type: Option<&str>,
    features: &[S],
    urgency: Option<&str>,
) -> u64 {
    breakdown(project_type, features, urgency).total
}

/// Estimate straight from the form values
pub fn estimate_values(values: &FormValues) -> u64 {
    breakdown_values(values).total
}

/// One surcharge line of an itemized estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLine {
    pub feature: String,
    pub amount: u64,
}

/// Itemized estimate for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateBreakdown {
    pub base: u64,
    pub features: Vec<FeatureLine>,
    pub subtotal: u64,
    pub multiplier: f64,
    pub total: u64,
}

/// Itemized estimate. Unknown features are listed with a zero amount.
pub fn breakdown<S: AsRef<str>>(
    project_type: Option<&str>,
    features: &[S],
    urgency: Option<&str>,
) -> EstimateBreakdown {
    let base = base_amount(project_type);
    let lines: Vec<FeatureLine> = features
        .iter()
        .map(|f| FeatureLine {
            feature: f.as_ref().to_string(),
            amount: surcharge(f.as_ref()),
        })
        .collect();
    let subtotal = base + lines.iter().map(|l| l.amount).sum::<u64>();
    let multiplier = urgency_multiplier(urgency);
    // f64::round rounds half away from zero
    let total = (subtotal as f64 * multiplier).round().max(0.0) as u64;

    EstimateBreakdown {
        base,
        features: lines,
        subtotal,
        multiplier,
        total,
    }
}

/// Itemized estimate from the form values
pub fn breakdown_values(values: &FormValues) -> EstimateBreakdown {
    breakdown(
        values.text(FieldName::ProjectType),
        values.list(FieldName::Features),
        values.text(FieldName::Urgency),
    )
}

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    let key = key.trim();
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
}
