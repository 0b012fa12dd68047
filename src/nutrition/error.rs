use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("record has no parseable modifiedAt, createDate, createdDate or date field")]
    MissingOrInvalidDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },
    #[error("unknown gender {0:?}")]
    UnknownGender(String),
}

impl TargetError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TargetError::InvalidProfile {
            reason: reason.into(),
        }
    }
}
