#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gallery_manifest::{ManifestFile, ManifestSchema};
use gallery_sync::normalize_dedup;

#[derive(Debug, Parser)]
#[command(name = "gallery-normalize")]
struct Args {
    /// Manifest CSV to rewrite in place.
    #[arg(env = "GALLERY_MANIFEST", default_value = "data/gallery.csv")]
    manifest: PathBuf,

    /// Output layout: thumbnails|catalog.
    ///
    /// `thumbnails` writes venue,category,filename,tags. `catalog` also keeps
    /// the published and sort columns.
    #[arg(long, env = "GALLERY_MANIFEST_SCHEMA", default_value = "thumbnails")]
    schema: String,

    /// Print the summary as a JSON object.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    gallery_observe::logging::init_tracing();
    let args = Args::parse();
    let schema: ManifestSchema = args.schema.parse()?;

    let report = normalize_dedup(&ManifestFile::new(args.manifest), schema)?;

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}
