use tracing_subscriber::EnvFilter;

/// Initializes a `tracing_subscriber` using `GALLERY_LOG` first, then `RUST_LOG`, then a default.
///
/// Log field contract for the maintenance tools:
/// - Pipeline milestones use target `gallery_sync` and carry an `event` field.
/// - Include `manifest` (path) on every event that touches the manifest file.
/// - Include `bucket` on every listing event.
/// - Skipped rows/keys are `debug` only; they are not errors.
pub fn init_tracing() {
    let filter = env_filter();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("GALLERY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
