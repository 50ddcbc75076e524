pub mod api;
pub mod practice;

pub use practice::core::{FetchError, PracticeApi, StandalonePracticeApi};
