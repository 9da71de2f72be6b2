use std::sync::Arc;

use crate::service::RankService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RankService>,
}

impl AppState {
    pub fn new(service: RankService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
