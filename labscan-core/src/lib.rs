//! Labscan Core
//!
//! Core types and abstractions for the Labscan assessment poller.
//!
//! This crate contains:
//! - Domain types: job snapshots, endpoint results, run summaries
//! - DTOs: request and capability payloads exchanged with the scanning service

pub mod domain;
pub mod dto;
