//! Business logic and port definitions for Finsight.
//!
//! This crate defines the "ports" (the [`llm::ModelProvider`] and
//! [`storage::SlotStore`] traits) that the infrastructure layer implements,
//! plus the three pieces with real design weight: the prompt assembler, the
//! conversation orchestrator, and the dashboard recovery parser. It depends
//! only on `finsight-types` -- never on `finsight-infra` or any IO crate.

pub mod conversation;
pub mod dashboard;
pub mod llm;
pub mod prompt;
pub mod storage;
