//! Core business logic for Fundra.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `statement` - Statement upload validation and CSV/OFX/QFX parsing
//! - `reconciliation` - Reconciliation session state machine
//! - `matching` - Auto-match heuristic over statement transactions and ledger lines
//! - `storage` - Raw statement file archival

pub mod matching;
pub mod reconciliation;
pub mod statement;
pub mod storage;
