//! Optional upload of processed data and the quality report to S3.

use std::io::Write;
use std::path::{Path, PathBuf};

use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info, warn};

use crate::config::DataPaths;
use crate::error::{PipelineError, Result};
use crate::output::processed_files;

/// Prefix for processed CSVs and join coverage.
pub const PROCESSED_PREFIX: &str = "processed";
/// Prefix for the quality report.
pub const REPORTS_PREFIX: &str = "reports";

/// Object key for `path` under `prefix`, with `.gz` appended when compressed.
pub fn object_key(prefix: &str, path: &Path, gzip: bool) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    Some(if gzip {
        format!("{prefix}/{name}.gz")
    } else {
        format!("{prefix}/{name}")
    })
}

pub fn gzip_bytes(contents: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents)?;
    Ok(encoder.finish()?)
}

/// Every artifact that exists on disk, paired with its object prefix.
pub fn artifacts(paths: &DataPaths) -> Result<Vec<(&'static str, PathBuf)>> {
    let mut files: Vec<(&'static str, PathBuf)> = processed_files(&paths.processed_dir)?
        .into_iter()
        .map(|p| (PROCESSED_PREFIX, p))
        .collect();

    for (prefix, path) in [
        (PROCESSED_PREFIX, paths.join_coverage_file()),
        (REPORTS_PREFIX, paths.report_file()),
    ] {
        if path.exists() {
            files.push((prefix, path));
        }
    }
    Ok(files)
}

/// Uploads processed CSVs, join coverage and the report, optionally
/// gzip-compressing them. Returns how many objects were written.
#[tracing::instrument(skip(client, paths))]
pub async fn publish(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    paths: &DataPaths,
    gzip: bool,
) -> Result<usize> {
    let files = artifacts(paths)?;
    if files.is_empty() {
        warn!("Nothing to publish");
        return Ok(0);
    }

    let mut upload_count = 0;
    for (prefix, path) in files {
        let Some(key) = object_key(prefix, &path, gzip) else {
            warn!(path = %path.display(), "Skipping file with non UTF-8 name");
            continue;
        };

        let contents = std::fs::read(&path)?;
        let body = if gzip { gzip_bytes(&contents)? } else { contents };

        client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| PipelineError::Publish {
                key: key.clone(),
                message: e.to_string(),
            })?;

        debug!(key, "Uploaded");
        upload_count += 1;
    }

    info!(upload_count, "S3 upload complete");
    Ok(upload_count)
}
