//! Auth0 Core - Domain types and traits for the Auth0 resource provider

pub mod error;
pub mod ids;
pub mod models;
pub mod strategy;
pub mod traits;


pub use error::*;
pub use ids::*;
pub use models::*;
pub use strategy::*;
pub use traits::*;
