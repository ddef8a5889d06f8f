use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials, Region};

use crate::config::StorageConfig;
use crate::lister::{ListPage, ObjectLister};

fn parse_env_bool(key: &str) -> Result<Option<bool>> {
    match std::env::var(key) {
        Ok(v) => {
            let s = v.trim().to_ascii_lowercase();
            let b = match s.as_str() {
                "1" | "true" | "yes" | "y" | "on" => true,
                "0" | "false" | "no" | "n" | "off" => false,
                _ => anyhow::bail!(
                    "invalid boolean env var {}={:?} (expected true/false/1/0)",
                    key,
                    v
                ),
            };
            Ok(Some(b))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)),
    }
}

/// Build an S3 client for the configured bucket account.
///
/// - Credentials come only from `cfg`; the ambient AWS credential chain is not consulted.
/// - Region is `auto` (what R2 expects) unless `GALLERY_S3_REGION` is set.
/// - Path-style addressing is on unless `GALLERY_S3_FORCE_PATH_STYLE=0`.
pub async fn client_for(cfg: &StorageConfig) -> Result<aws_sdk_s3::Client> {
    let region = std::env::var("GALLERY_S3_REGION").unwrap_or_else(|_| "auto".to_string());
    let force_path_style = parse_env_bool("GALLERY_S3_FORCE_PATH_STYLE")?.unwrap_or(true);

    let creds = Credentials::new(
        cfg.access_key_id.as_str(),
        cfg.secret_access_key.as_str(),
        None,
        None,
        "gallery-config",
    );
    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(region))
        .credentials_provider(creds)
        .endpoint_url(cfg.endpoint_url())
        .load()
        .await;

    let mut b: S3ConfigBuilder = aws_sdk_s3::config::Builder::from(&shared);
    if force_path_style {
        b = b.force_path_style(true);
    }
    Ok(aws_sdk_s3::Client::from_conf(b.build()))
}

/// `ListObjectsV2` over one bucket, optionally below a key prefix.
#[derive(Debug, Clone)]
pub struct S3Lister {
    client: aws_sdk_s3::Client,
    prefix: Option<String>,
}

impl S3Lister {
    pub fn new(client: aws_sdk_s3::Client, prefix: Option<String>) -> Self {
        let prefix = prefix
            .map(|p| p.trim().trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty());
        Self { client, prefix }
    }
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage> {
        let mut req = self.client.list_objects_v2().bucket(bucket);
        if let Some(p) = self.prefix.as_deref() {
            req = req.prefix(p);
        }
        if let Some(t) = continuation_token {
            req = req.continuation_token(t);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("list_objects_v2 failed: s3://{bucket}"))?;

        let keys = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| obj.key)
            .collect();
        Ok(ListPage {
            keys,
            is_truncated: resp.is_truncated.unwrap_or(false),
            next_continuation_token: resp.next_continuation_token,
        })
    }
}
