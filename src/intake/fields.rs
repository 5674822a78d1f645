//! Intake form field model
//!
//! Names every field the intake wizard collects, the shape of a field value,
//! and the enumerations used by the choice fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A named intake form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Name,
    Description,
    #[serde(rename = "type")]
    ProjectType,
    Urgency,
    Industry,
    TargetAudience,
    ExistingWebsite,
    Goals,
    Features,
    Timeline,
    Budget,
    HasContent,
    DesignPreferences,
    ContactName,
    ContactEmail,
    ContactPhone,
    Company,
    PreferredContact,
    AdditionalInfo,
    ProjectFiles,
}

impl FieldName {
    /// Get all fields in form order
    pub fn all() -> &'static [FieldName] {
        &[
            FieldName::Name,
            FieldName::Description,
            FieldName::ProjectType,
            FieldName::Urgency,
            FieldName::Industry,
            FieldName::TargetAudience,
            FieldName::ExistingWebsite,
            FieldName::Goals,
            FieldName::Features,
            FieldName::Timeline,
            FieldName::Budget,
            FieldName::HasContent,
            FieldName::DesignPreferences,
            FieldName::ContactName,
            FieldName::ContactEmail,
            FieldName::ContactPhone,
            FieldName::Company,
            FieldName::PreferredContact,
            FieldName::AdditionalInfo,
            FieldName::ProjectFiles,
        ]
    }

    /// Wire name of the field (matches the JSON key)
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Description => "description",
            FieldName::ProjectType => "type",
            FieldName::Urgency => "urgency",
            FieldName::Industry => "industry",
            FieldName::TargetAudience => "targetAudience",
            FieldName::ExistingWebsite => "existingWebsite",
            FieldName::Goals => "goals",
            FieldName::Features => "features",
            FieldName::Timeline => "timeline",
            FieldName::Budget => "budget",
            FieldName::HasContent => "hasContent",
            FieldName::DesignPreferences => "designPreferences",
            FieldName::ContactName => "contactName",
            FieldName::ContactEmail => "contactEmail",
            FieldName::ContactPhone => "contactPhone",
            FieldName::Company => "company",
            FieldName::PreferredContact => "preferredContact",
            FieldName::AdditionalInfo => "additionalInfo",
            FieldName::ProjectFiles => "projectFiles",
        }
    }

    /// Localization key for the field label
    pub fn label_key(&self) -> String {
        format!("fields.{}.label", self.as_str())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::all()
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// Value held by a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(Option<f64>),
}

impl FieldValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// List content, if this is a list value
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Whether the value counts as "not provided"
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(n) => n.is_none(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(Some(value))
    }
}

/// The full set of values entered into the intake form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<FieldName, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy for fixtures and tests
    pub fn with(mut self, field: FieldName, value: impl Into<FieldValue>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn set(&mut self, field: FieldName, value: FieldValue) {
        self.0.insert(field, value);
    }

    pub fn remove(&mut self, field: FieldName) -> Option<FieldValue> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: FieldName) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    /// Trimmed text of a field; `None` when absent, empty, or not text
    pub fn text(&self, field: FieldName) -> Option<&str> {
        self.get(field)
            .and_then(FieldValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// List items of a field (empty when absent or not a list)
    pub fn list(&self, field: FieldName) -> &[String] {
        self.get(field).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    /// Whether a non-empty value is present for the field
    pub fn is_present(&self, field: FieldName) -> bool {
        self.get(field).map(|v| !v.is_empty()).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Kind of project being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    WebsiteRedesign,
    NewWebsite,
    Ecommerce,
    WebApp,
    MobileApp,
    Branding,
}

impl ProjectType {
    pub fn all() -> &'static [ProjectType] {
        &[
            ProjectType::WebsiteRedesign,
            ProjectType::NewWebsite,
            ProjectType::Ecommerce,
            ProjectType::WebApp,
            ProjectType::MobileApp,
            ProjectType::Branding,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::WebsiteRedesign => "website-redesign",
            ProjectType::NewWebsite => "new-website",
            ProjectType::Ecommerce => "ecommerce",
            ProjectType::WebApp => "web-app",
            ProjectType::MobileApp => "mobile-app",
            ProjectType::Branding => "branding",
        }
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown project type: {}", s))
    }
}

/// How soon the client needs the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Urgent,
}

impl Urgency {
    pub fn all() -> &'static [Urgency] {
        &[Urgency::Low, Urgency::Medium, Urgency::High, Urgency::Urgent]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Urgent => "urgent",
        }
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urgency::all()
            .iter()
            .copied()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| format!("Unknown urgency: {}", s))
    }
}

/// Channel the client prefers to be contacted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredContact {
    Email,
    Phone,
    Any,
}

impl PreferredContact {
    pub fn all() -> &'static [PreferredContact] {
        &[
            PreferredContact::Email,
            PreferredContact::Phone,
            PreferredContact::Any,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredContact::Email => "email",
            PreferredContact::Phone => "phone",
            PreferredContact::Any => "any",
        }
    }
}
