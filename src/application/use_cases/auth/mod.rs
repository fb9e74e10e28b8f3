use crate::application::services::tokens::TokenPair;
use crate::domain::accounts::account::AccountWithProfile;

pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;

/// An account together with a freshly minted token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: AccountWithProfile,
    pub tokens: TokenPair,
}
