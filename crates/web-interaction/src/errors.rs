use thiserror::Error;
use webatoms_core_types::AutomationFailure;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("unknown interaction '{0}'")]
    UnknownInteraction(String),
    #[error("interaction '{interaction}' cannot be called this way: {reason}")]
    InvalidArguments { interaction: String, reason: String },
    #[error("interaction '{interaction}' failed: {source}")]
    Automation {
        interaction: String,
        #[source]
        source: AutomationFailure,
    },
    #[error("invalid interaction registration: {0}")]
    Registration(String),
}
