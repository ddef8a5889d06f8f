#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod types;

pub use types::{IdentityKey, ManifestRow, ManifestRowError, SkipReason, Validated};
