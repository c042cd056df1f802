use std::sync::Arc;

use crate::dispatch::RotationDispatcher;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RotationDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: RotationDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
