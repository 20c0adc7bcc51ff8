//! Core domain types
//!
//! This module contains the domain structures shared between the proxy
//! server and the prediction API client.

pub mod prediction;
