/// Shared application state
use crate::services::AuthService;
use encore_storage::MembershipContext;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub membership: Arc<MembershipContext>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(membership: Arc<MembershipContext>, auth_service: Arc<AuthService>) -> Self {
        Self {
            membership,
            auth_service,
        }
    }
}
