//! Shared domain types for Finsight.
//!
//! This crate contains the core domain types used across the Finsight
//! workspace: conversation turns, analysis payloads, stored-slot
//! identifiers, provider configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod analysis;
pub mod chat;
pub mod config;
pub mod error;
pub mod storage;
