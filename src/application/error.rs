use crate::application::ports::account_repository::{AccountWriteError, UniqueField};
use crate::application::services::tokens::TokenError;
use crate::application::validation::{FieldErrors, MSG_EMAIL_TAKEN, MSG_USERNAME_TAKEN};

/// Failure of an account use case, shaped for the HTTP layer to render.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    /// A refresh token handed to logout could not be revoked.
    #[error("invalid token")]
    InvalidToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("account not found")]
    AccountNotFound,
    #[error("account is inactive")]
    AccountInactive,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl ServiceError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ServiceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<AccountWriteError> for ServiceError {
    fn from(err: AccountWriteError) -> Self {
        match err {
            AccountWriteError::Conflict(UniqueField::Email) => {
                FieldErrors::single("email", MSG_EMAIL_TAKEN).into()
            }
            AccountWriteError::Conflict(UniqueField::Username) => {
                FieldErrors::single("username", MSG_USERNAME_TAKEN).into()
            }
            AccountWriteError::Other(e) => ServiceError::Internal(e),
        }
    }
}
