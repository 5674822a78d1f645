// Backend command handlers invoked through the command proxy

pub mod contacts;
pub mod i18n;
pub mod intake;
pub mod submissions;
pub mod wizard;

pub use wizard::{WizardError, WizardSessionRegistry, WizardView};
