//! Resource routes: `/courses` and `/students`, each with a collection and an item path.
//! Every path is served with and without the trailing slash.

use crate::handlers::{course, student};
use crate::state::AppState;
use axum::routing::{get, MethodRouter};
use axum::Router;

fn with_and_without_slash(router: Router<AppState>, path: &str, methods: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, methods.clone())
        .route(&format!("{}/", path), methods)
}

pub fn resource_routes(state: AppState) -> Router {
    let router = Router::new();
    let router = with_and_without_slash(router, "/courses", get(course::list).post(course::create));
    let router = with_and_without_slash(
        router,
        "/courses/:id",
        get(course::read)
            .put(course::update)
            .patch(course::partial_update)
            .delete(course::delete),
    );
    let router = with_and_without_slash(router, "/students", get(student::list).post(student::create));
    let router = with_and_without_slash(
        router,
        "/students/:id",
        get(student::read)
            .put(student::update)
            .patch(student::partial_update)
            .delete(student::delete),
    );
    router.with_state(state)
}
