//! The save pipeline: evaluate key, resolve paths, archive, upload.
//!
//! Stages run strictly in sequence; any fatal error aborts the remaining
//! stages. The one deliberate exception to "failure aborts" is an empty
//! resolved path set, which ends the run successfully with no archive and
//! no upload.

use crate::cli::CliError;
use crate::config::Config;
use crate::telemetry::Telemetry;
use indicatif::{HumanBytes, HumanDuration};
use savecache_archive::{ArchiveOutcome, Archiver, TarZstdArchiver};
use savecache_keytemplate::BuildContext;
use savecache_network::{UploadClient, UploadRequest};
use std::time::Instant;
use tracing::{debug, info};

/// Run the save pipeline to completion.
///
/// # Errors
///
/// Returns a [`CliError::Save`] when key evaluation, path resolution,
/// archive creation or the upload fails; each carries the stage's own
/// diagnostic message.
pub async fn run(config: Config, ctx: BuildContext) -> Result<(), CliError> {
    info!(template = %config.key, "evaluating key template");
    let cache_key = savecache_keytemplate::evaluate(&config.key, &ctx)
        .map_err(|e| CliError::save(format!("failed to evaluate key template: {e}")))?;
    info!(%cache_key, "cache key");

    let resolution = savecache_paths::resolve(&config.paths, &config.working_dir)
        .map_err(|e| CliError::save(format!("failed to resolve cache paths: {e}")))?;
    for path in &resolution.resolved {
        let rel = path.strip_prefix(&config.source_dir).unwrap_or(path);
        debug!(path = %rel.display(), "will archive");
    }

    let telemetry = Telemetry::new(resolution.resolved.len());

    info!("creating cache archive");
    let compression_started = Instant::now();
    let temp_dir = tempfile::Builder::new()
        .prefix("save-cache")
        .tempdir()
        .map_err(|e| CliError::save(format!("failed to create temporary directory: {e}")))?;

    let outcome = TarZstdArchiver::default()
        .build(&resolution.resolved, temp_dir.path())
        .map_err(|e| CliError::save(format!("compression failed: {e}")))?;
    let archive = match outcome {
        ArchiveOutcome::Empty => {
            info!("no paths to cache, skipping upload");
            return Ok(());
        }
        ArchiveOutcome::Created(archive) => archive,
    };
    let compression_time = compression_started.elapsed();
    info!(elapsed = %HumanDuration(compression_time), "cache archive created");
    info!(size = %HumanBytes(archive.size_bytes), "archive size");
    debug!(path = %archive.path.display(), "archive path");
    telemetry.archive_compressed(compression_time);

    let uploader = UploadClient::new()
        .map_err(|e| CliError::save(format!("failed to create upload client: {e}")))?;
    info!("uploading archive");
    let upload_started = Instant::now();
    uploader
        .upload(UploadRequest {
            api_base_url: config.api_base_url,
            token: config.token,
            archive_path: archive.path.clone(),
            archive_size: archive.size_bytes,
            cache_key,
        })
        .await
        .map_err(|e| CliError::save(format!("cache upload failed: {e}")))?;
    let upload_time = upload_started.elapsed();
    info!(elapsed = %HumanDuration(upload_time), "archive uploaded");
    telemetry.archive_uploaded(upload_time, archive.size_bytes);

    // The temp dir drops here: the archive file lives exactly as long as
    // the run that produced it.
    Ok(())
}
