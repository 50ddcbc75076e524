pub mod error;
pub mod handlers;
pub mod models;
pub mod rate_limit;
