//! Statement archive implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Metadata about an archived statement file.
#[derive(Debug, Clone)]
pub struct ArchivedFile {
    /// Storage key.
    pub storage_key: String,
    /// File size in bytes.
    pub file_size: u64,
}

/// Archive for uploaded statement files.
pub struct StatementArchive {
    operator: Operator,
    config: StorageConfig,
}

impl StatementArchive {
    /// Create a new archive from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Reject files over the configured size limit.
    ///
    /// # Errors
    ///
    /// Returns `FileTooLarge` when the size exceeds the limit.
    pub fn validate_size(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_bytes {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_bytes,
            ));
        }
        Ok(())
    }

    /// Generate the storage key for a statement file.
    ///
    /// Format: `statements/{statement_id}/{sanitized_filename}`
    #[must_use]
    pub fn storage_key(statement_id: Uuid, filename: &str) -> String {
        format!("statements/{statement_id}/{}", sanitize_filename(filename))
    }

    /// Write a statement file to the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or the write fails.
    pub async fn store(
        &self,
        statement_id: Uuid,
        filename: &str,
        bytes: Bytes,
    ) -> Result<ArchivedFile, StorageError> {
        let size = bytes.len() as u64;
        self.validate_size(size)?;

        let key = Self::storage_key(statement_id, filename);
        self.operator.write(&key, bytes).await?;

        Ok(ArchivedFile {
            storage_key: key,
            file_size: size,
        })
    }

    /// Read an archived statement file back.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key does not exist, or an operation error.
    pub async fn fetch(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_bytes())
    }

    /// Check if a file exists in the archive.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

/// Sanitize filename for storage key.
///
/// Only ASCII alphanumeric characters, dots, hyphens, and underscores pass
/// through; everything else becomes an underscore.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("january.csv"), "january.csv");
        assert_eq!(sanitize_filename("my file (1).ofx"), "my_file__1_.ofx");
        assert_eq!(sanitize_filename("stmt@#$%.qfx"), "stmt____.qfx");
    }

    #[test]
    fn test_storage_key_layout() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");
        let key = StatementArchive::storage_key(id, "january.csv");
        assert_eq!(
            key,
            "statements/550e8400-e29b-41d4-a716-446655440000/january.csv"
        );
    }

    #[test]
    fn test_validate_size() {
        let config = StorageConfig::new(StorageProvider::local_fs("./test"))
            .with_max_file_bytes(1024);
        let archive = StatementArchive::from_config(config).expect("should create archive");

        assert!(archive.validate_size(512).is_ok());
        assert!(archive.validate_size(1024).is_ok());
        let err = archive.validate_size(2048).unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_storage_key_has_three_parts(
            filename in "[a-zA-Z0-9_-]{1,50}\\.[a-z]{2,4}",
        ) {
            let id = Uuid::new_v4();
            let key = StatementArchive::storage_key(id, &filename);

            let parts: Vec<&str> = key.split('/').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0], "statements");
            prop_assert_eq!(parts[1], id.to_string());
        }
    }
}
