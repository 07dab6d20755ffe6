//! Shared application state for all routes.

use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Upper bound on distinct students enrolled in one course.
    pub max_students_per_course: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, max_students_per_course: usize) -> Self {
        AppState {
            store,
            max_students_per_course,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
