//! # API Shared
//!
//! Shared definitions for medassist APIs.
//!
//! Contains:
//! - Request/response wire types (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
