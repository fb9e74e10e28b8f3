pub mod account_repository_sqlx;
pub mod token_blacklist_sqlx;
