pub mod auth;
pub mod error;
pub mod medications;
pub mod middleware;
pub mod records;
pub mod routes;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
