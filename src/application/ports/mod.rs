pub mod account_repository;
pub mod database_health;
pub mod token_blacklist;
