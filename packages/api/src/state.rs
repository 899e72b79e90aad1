use std::sync::Arc;

use shared::services::game_service::GameService;

#[derive(Clone)]
pub struct AppState {
    pub game_service: Arc<GameService>,
    /// Default page size for the listing routes.
    pub list_limit: usize,
}
