//! Request handlers.

pub mod analyze;
pub mod health;
pub mod models;

pub use analyze::*;
pub use health::*;
pub use models::*;
