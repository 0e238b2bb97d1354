//! Shared types for the shoutbox: domain models, HTTP request/response
//! structs, and the per-operation input structs the store consumes.

pub mod api;
pub mod input;
pub mod models;
