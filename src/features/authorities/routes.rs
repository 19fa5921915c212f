use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::authorities::handlers;
use crate::features::authorities::services::AuthorityRepository;

/// Authority directory routes (auth middleware applied by caller)
pub fn routes(repository: Arc<dyn AuthorityRepository>) -> Router {
    Router::new()
        .route("/api/authorities", get(handlers::list_authorities))
        .with_state(repository)
}
