use std::sync::Arc;

use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::services::tokens::TokenIssuer;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    account_repo: Arc<dyn AccountRepository>,
    token_blacklist: Arc<dyn TokenBlacklist>,
    tokens: TokenIssuer,
}

impl AppServices {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        token_blacklist: Arc<dyn TokenBlacklist>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            account_repo,
            token_blacklist,
            tokens,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn account_repo(&self) -> Arc<dyn AccountRepository> {
        self.services.account_repo.clone()
    }

    pub fn token_blacklist(&self) -> Arc<dyn TokenBlacklist> {
        self.services.token_blacklist.clone()
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.services.tokens
    }
}
