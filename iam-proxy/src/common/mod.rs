pub mod config;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::is_valid_username;
