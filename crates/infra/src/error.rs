//! Service-level error model.

use thiserror::Error;

use scf_core::DomainError;

/// Failure of the backing store itself (not of a business rule).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Poisoned => "store_poisoned",
        }
    }
}

/// Error returned by every engine service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(e) => e.code(),
            ServiceError::Store(e) => e.code(),
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_pass_through_domain_taxonomy() {
        let err: ServiceError = DomainError::limit_exceeded("x").into();
        assert_eq!(err.code(), "limit_exceeded");
        assert!(err.as_domain().is_some());

        let err: ServiceError = StoreError::Poisoned.into();
        assert_eq!(err.code(), "store_poisoned");
    }
}
