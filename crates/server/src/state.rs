use std::sync::Arc;
use std::time::Duration;

use service::notification::Notifier;
use service::token::TokenService;
use service::user::UserAccounts;

/// Collaborators handed to every handler. Built once at startup (or per test)
/// and cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserAccounts>,
    pub tokens: Arc<dyn TokenService>,
    pub notifier: Arc<dyn Notifier>,
    pub notify_timeout: Duration,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserAccounts>,
        tokens: Arc<dyn TokenService>,
        notifier: Arc<dyn Notifier>,
        notify_timeout: Duration,
    ) -> Self {
        Self { users, tokens, notifier, notify_timeout }
    }
}
