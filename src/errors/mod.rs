use thiserror::Error;

/// Failure kinds of the service layer.
///
/// Business-rule violations are detected eagerly and carry no side effects;
/// `Conflict` can also surface after a point was already appended (the point
/// is kept, only the version advance is contested). `Dependency` wraps a
/// store failure and names the step that hit it, since multi-step
/// orchestration is not transactional.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("version conflict on match {match_id}")]
    Conflict { match_id: i64 },

    #[error("store operation failed at step: {step}")]
    Dependency {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn dependency(step: &'static str) -> impl FnOnce(anyhow::Error) -> ServiceError {
        move |source| ServiceError::Dependency { step, source }
    }

    pub fn invalid_state(msg: impl Into<String>) -> ServiceError {
        ServiceError::InvalidState(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> ServiceError {
        ServiceError::Validation(msg.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
