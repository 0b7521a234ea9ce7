//! Core data models for the pack checksum service.
//!
//! `object` describes what the store hands back; `pack` is the JSON payload
//! returned to HTTP callers.

pub mod object;
pub mod pack;
