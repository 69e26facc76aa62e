pub mod api;
pub mod models;
pub mod store;
pub mod time;
