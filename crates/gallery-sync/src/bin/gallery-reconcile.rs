#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

#[cfg(feature = "s3")]
use std::path::PathBuf;

#[cfg(feature = "s3")]
use anyhow::Result;

#[cfg(feature = "s3")]
use clap::Parser;

#[cfg(feature = "s3")]
use gallery_manifest::ManifestFile;

#[cfg(feature = "s3")]
use gallery_sync::{s3::S3Lister, Reconciler, StorageConfig};

#[cfg(not(feature = "s3"))]
fn main() {
    eprintln!(
        "gallery-reconcile requires feature 's3' (run with: cargo run -p gallery-sync --features s3 --bin gallery-reconcile -- ...)"
    );
    std::process::exit(2);
}

#[cfg(feature = "s3")]
#[derive(Debug, Parser)]
#[command(name = "gallery-reconcile")]
struct Args {
    /// Manifest CSV to extend with newly uploaded images.
    #[arg(env = "GALLERY_MANIFEST", default_value = "data/gallery.csv")]
    manifest: PathBuf,

    /// Bucket holding `<venue>/<moment>/<file>` objects.
    #[arg(long, env = "R2_BUCKET")]
    bucket: Option<String>,

    /// Storage account id, or a full endpoint URL.
    #[arg(long, env = "R2_ACCOUNT_ID")]
    account_id: Option<String>,

    #[arg(long, env = "R2_ACCESS_KEY_ID")]
    access_key_id: Option<String>,

    #[arg(long, env = "R2_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Only list keys below this prefix. Keys are still read from the bucket root.
    #[arg(long, env = "GALLERY_S3_PREFIX")]
    prefix: Option<String>,

    /// Report new rows without writing the manifest.
    #[arg(long, env = "GALLERY_DRY_RUN", default_value_t = false)]
    dry_run: bool,

    /// Print the summary as a JSON object.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[cfg(feature = "s3")]
#[tokio::main]
async fn main() -> Result<()> {
    gallery_observe::logging::init_tracing();
    let args = Args::parse();

    // Fail before touching the network or the manifest.
    let storage = StorageConfig::from_parts(
        args.bucket,
        args.account_id,
        args.access_key_id,
        args.secret_access_key,
    )?;

    let client = gallery_sync::s3::client_for(&storage).await?;
    let lister = S3Lister::new(client, args.prefix);

    let report = Reconciler::new(lister, storage.bucket.clone(), ManifestFile::new(args.manifest))
        .dry_run(args.dry_run)
        .run()
        .await?;

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}
