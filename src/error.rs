use thiserror::Error;

/// Bad input that is recovered locally and shown back to the user.
///
/// None of these leave any durable side effect behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Tournament Code")]
    InvalidTournamentCode,
    #[error("The sport \"{0}\" already exists. Please choose a different name.")]
    DuplicateSport(String),
    #[error("A sport needs a name.")]
    EmptySportName,
    #[error("Registration can only be completed from the final step.")]
    NotAtFinalStep,
    #[error("\"{0}\" is not an image. Please attach a picture instead.")]
    NotAnImage(String),
    #[error("\"{0}\" is not a valid date. Please use the YYYY-MM-DD format.")]
    InvalidDate(String),
}

/// Everything that can go wrong while submitting a registration.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store or the object storage failed. The draft is kept so the user can try again.
    #[error(transparent)]
    Gateway(#[from] anyhow::Error),
}

impl SubmissionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmissionError::Validation(_))
    }
}

/// Failures while creating or deleting a sports category.
#[derive(Debug, Error)]
pub enum SportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] anyhow::Error),
}

/// A required setting could not be read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Expected {0} as an environment variable")]
    Missing(&'static str),
    #[error("{name} must be {expected}, got \"{value}\"")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
