//! HTTP surface for the Altairis social profile backend.
//!
//! The domain logic lives in the `altairis` library crate; this crate wires
//! it to an axum router with a uniform session guard, CORS, request-id
//! observability, Prometheus metrics, and a local object-storage
//! collaborator for avatar and post images.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod storage;
