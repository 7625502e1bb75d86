//! Core domain types
//!
//! This module contains the structures shared between the HTTP gateway (which
//! decodes them) and the runner (which polls, normalizes and persists them).

pub mod scan;
pub mod summary;
