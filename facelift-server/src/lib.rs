//! Facelift Server
//!
//! A synchronous HTTP facade over an asynchronous prediction API: one POST
//! with an encoded image turns into a submit-then-poll sequence upstream,
//! and the caller gets the final output in the same response.
//!
//! Architecture:
//! - Configuration: loaded from the environment once at startup
//! - API layer: router, validation, response shaping
//! - Client: submission and polling live in `facelift-client`

pub mod api;
pub mod config;
