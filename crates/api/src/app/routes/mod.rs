use axum::Router;

pub mod home;
pub mod system;
pub mod users;

/// All HTTP routes, before cross-cutting layers.
pub fn router() -> Router {
    Router::new()
        .merge(system::router())
        .merge(home::router())
        .nest("/user", users::router())
}
