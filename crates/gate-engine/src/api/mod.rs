pub mod challenge;
pub mod services;
pub mod types;
