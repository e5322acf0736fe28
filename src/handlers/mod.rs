//! HTTP request handlers organized by functionality

pub mod health;
pub mod projects;
pub mod types;
pub mod uploads;

pub use health::*;
pub use projects::*;
pub use types::*;
pub use uploads::*;
