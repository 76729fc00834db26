//! Auth0 Management - HTTP client for the Auth0 Management API
//!
//! This crate provides:
//! - `ManagementClient`: the `ManagementApi` implementation over reqwest
//! - Static API token or client-credentials authentication with token caching
//! - Page-number pagination helpers for list endpoints
//! - `KeyedLocks`: a process-wide lock table for read-modify-write sequences

pub mod client;
pub mod config;
pub mod http;
pub mod locks;
pub mod pagination;

pub use client::ManagementClient;
pub use config::{Credentials, ManagementConfig};
pub use http::HttpClient;
pub use locks::KeyedLocks;
pub use pagination::{collect_all_pages, Page};
