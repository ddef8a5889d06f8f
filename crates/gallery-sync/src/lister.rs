use anyhow::Result;
use async_trait::async_trait;
use gallery_core::{ManifestRow, SkipReason, Validated};
use tracing::{debug, warn};

/// Image extensions accepted from the bucket, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

/// Paginated listing of a bucket. Implementations issue exactly one request per call.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage>;
}

/// Every key in `bucket`, in provider order.
///
/// Pages are fetched one at a time. The first failing page aborts the whole listing.
pub async fn list_all_keys<L>(lister: &L, bucket: &str) -> Result<Vec<String>>
where
    L: ObjectLister + ?Sized,
{
    let mut keys: Vec<String> = Vec::new();
    let mut token: Option<String> = None;
    let mut pages: u64 = 0;
    loop {
        let page = lister.list_objects(bucket, token.as_deref()).await?;
        pages += 1;
        debug!(
            bucket,
            page = pages,
            keys = page.keys.len() as u64,
            truncated = page.is_truncated,
            "listed page"
        );
        keys.extend(page.keys);
        if !page.is_truncated {
            break;
        }
        token = page.next_continuation_token;
        if token.is_none() {
            warn!(
                bucket,
                page = pages,
                "listing reported more pages without a continuation token; stopping"
            );
            break;
        }
    }
    Ok(keys)
}

fn image_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Maps `<venue>/<moment>/<file...>` to a newly discovered row.
///
/// Keys with fewer than three segments or a non-image extension are skipped.
/// So are keys containing `"`, CR or LF: the manifest cannot read them back
/// unchanged, so their identity would never match on the next run.
pub fn key_to_row(key: &str) -> Validated<ManifestRow> {
    if let Some(ch) = key.chars().find(|c| matches!(c, '"' | '\r' | '\n')) {
        return Validated::Skip(SkipReason::UnrepresentableKey { ch });
    }

    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 3 {
        return Validated::Skip(SkipReason::TooFewSegments {
            segments: segments.len(),
        });
    }

    let last = segments[segments.len() - 1];
    let ext = image_extension(last);
    let allowed = ext
        .as_deref()
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e));
    if !allowed {
        return Validated::Skip(SkipReason::UnsupportedExtension { ext });
    }

    let file = segments[2..].join("/");
    let row = ManifestRow::discovered(segments[0], segments[1], &file);
    match row.validate() {
        Ok(()) => Validated::Keep(row),
        Err(e) => Validated::Skip(SkipReason::InvalidRow(e)),
    }
}
