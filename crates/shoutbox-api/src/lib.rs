//! HTTP surface of the shoutbox. Handlers translate requests into core
//! operations and typed errors back into status codes; no business rule
//! lives here.

pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
