use crate::application::services::LeaseService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub lease_service: LeaseService,
}

impl AppState {
    pub fn new(lease_service: LeaseService) -> Self {
        Self { lease_service }
    }
}
