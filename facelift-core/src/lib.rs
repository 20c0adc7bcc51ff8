//! Facelift Core
//!
//! Core types for the Facelift restoration proxy.
//!
//! This crate contains:
//! - Domain types: Prediction status and the polling handle
//! - DTOs: Wire shapes exchanged with the upstream prediction API

pub mod domain;
pub mod dto;
