//! Data Transfer Objects for the upstream prediction API
//!
//! This module contains the wire shapes exchanged with the prediction API.
//! Every upstream response body is parsed into one of these closed shapes
//! at the boundary; a body that matches none of them is a protocol error,
//! never an optimistic field access.

pub mod prediction;
