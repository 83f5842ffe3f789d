//! Statement file archival using Apache OpenDAL.
//!
//! Uploaded statement files are kept verbatim so an import can be audited or
//! re-parsed later. The backend is vendor-agnostic: S3-compatible object
//! storage in production, local filesystem in development.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{ArchivedFile, StatementArchive};
