//! # portal-core
//!
//! Core types, ID generation, and error types for the class portal.
//!
//! This crate provides the foundational types shared across all portal crates:
//! - Entity structs (applications, invite codes, the class config singleton)
//! - Status enums with state machine transitions
//! - Typed proof values classified by the task's declared proof type
//! - ID and invite-code generation
//! - The action table: one `ActionSpec` per wire action
//! - Wire response types
//! - Class config schema migration
//! - Submission validation and XP progress

pub mod actions;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod migration;
pub mod progress;
pub mod responses;
pub mod updates;
pub mod validate;
