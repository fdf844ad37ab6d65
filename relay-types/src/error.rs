use thiserror::Error;

/// A request was structurally valid JSON but failed field checks.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid request: {0}")]
    Fields(#[from] validator::ValidationErrors),
}

impl ValidationError {
    /// Names of the offending fields, sorted.
    pub fn fields(&self) -> Vec<String> {
        match self {
            ValidationError::Fields(errs) => {
                let mut names: Vec<String> =
                    errs.field_errors().keys().map(|k| k.to_string()).collect();
                names.sort();
                names
            }
        }
    }
}
