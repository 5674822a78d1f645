//! Project intake wizard
//!
//! Field model, validation rules, budget estimation, step definitions, the
//! wizard state machine and the submission gateway.

pub mod estimator;
pub mod fields;
pub mod gateway;
pub mod state;
pub mod steps;
pub mod validation;

pub use estimator::{estimate, estimate_values, EstimateBreakdown};
pub use fields::{FieldName, FieldValue, FormValues, PreferredContact, ProjectType, Urgency};
pub use gateway::{
    ErrorKind, GatewayBusy, StoreError, SubmissionGateway, SubmissionStore, SubmitOutcome,
};
pub use state::{StepOutcome, WizardState};
pub use steps::WizardStep;
pub use validation::{validate, InvalidFields, ValidationResult};
