use std::fmt;

use crate::SyncError;

pub const BUCKET_ENV: &str = "R2_BUCKET";
pub const ACCOUNT_ID_ENV: &str = "R2_ACCOUNT_ID";
pub const ACCESS_KEY_ID_ENV: &str = "R2_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_ENV: &str = "R2_SECRET_ACCESS_KEY";

/// Credentials and location of the bucket holding the gallery images.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
    /// Account id, or a full `http(s)://` endpoint for other S3-compatible stores.
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageConfig {
    /// Validates that all four settings are present and non-blank.
    ///
    /// Every missing setting is reported at once, by its environment variable name.
    pub fn from_parts(
        bucket: Option<String>,
        account_id: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Result<Self, SyncError> {
        let mut missing: Vec<&'static str> = Vec::new();
        let mut take = |name: &'static str, v: Option<String>| -> String {
            match v.map(|s| s.trim().to_string()) {
                Some(s) if !s.is_empty() => s,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let cfg = Self {
            bucket: take(BUCKET_ENV, bucket),
            account_id: take(ACCOUNT_ID_ENV, account_id),
            access_key_id: take(ACCESS_KEY_ID_ENV, access_key_id),
            secret_access_key: take(SECRET_ACCESS_KEY_ENV, secret_access_key),
        };
        if !missing.is_empty() {
            return Err(SyncError::MissingConfig(missing.join(", ")));
        }
        Ok(cfg)
    }

    pub fn endpoint_url(&self) -> String {
        let id = self.account_id.trim_end_matches('/');
        if id.starts_with("http://") || id.starts_with("https://") {
            id.to_string()
        } else {
            format!("https://{id}.r2.cloudflarestorage.com")
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}
