use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::APP_DIR_NAME;

const DOWNLOAD_CHUNK: usize = 256 * 1024;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{name} is not installed and has no download location; configure a model source that provides it")]
    NoSource { name: String },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `(bytes_downloaded, total_bytes)`; `total_bytes` is 0 when the server
/// sends no Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Joins a base URL and a model file name.
pub fn model_url(base_url: &str, name: &str) -> String {
    format!("{}/{name}", base_url.trim_end_matches('/'))
}

/// Finds `name` in the user cache, then `bundled_dir`, and downloads it from
/// `url` into the cache as a last resort.
pub fn resolve(
    name: &str,
    url: Option<&str>,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve_in(&model_cache_dir()?, name, url, bundled_dir, progress)
}

pub fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: Option<&str>,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached = cache_dir.join(name);
    if cached.is_file() {
        log::debug!("Using cached model {}", cached.display());
        return Ok(cached);
    }

    if let Some(bundled) = bundled_dir.map(|dir| dir.join(name)) {
        if bundled.is_file() {
            log::debug!("Using bundled model {}", bundled.display());
            return Ok(bundled);
        }
    }

    let url = url.ok_or_else(|| ModelResolveError::NoSource {
        name: name.to_string(),
    })?;
    fs::create_dir_all(cache_dir).map_err(|e| ModelResolveError::CacheDir {
        path: cache_dir.to_path_buf(),
        source: e,
    })?;
    log::info!("Downloading {url}");
    download(url, &cached, progress)?;
    Ok(cached)
}

/// Per-user model cache.
///
/// - macOS: `~/Library/Application Support/MoodSnap/models/`
/// - Linux: `$XDG_CACHE_HOME/MoodSnap/models/`
/// - Windows: `%LOCALAPPDATA%/MoodSnap/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

/// `models/` next to the running executable, for pre-packaged installs.
pub fn bundled_models_dir() -> Option<PathBuf> {
    let dir = std::env::current_exe().ok()?.parent()?.join("models");
    dir.is_dir().then_some(dir)
}

/// Streams `url` into `<dest>.part` and renames it into place; the partial
/// file is removed on any failure.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let part = dest.with_extension("part");
    let result = stream_to(url, dest, &part, progress);
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

fn stream_to(
    url: &str,
    dest: &Path,
    part: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let download_err = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };
    let write_err = |path: &Path, source| ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;
    let total = response.content_length().unwrap_or(0);

    let mut file = fs::File::create(part).map_err(|e| write_err(part, e))?;
    let mut buf = vec![0u8; DOWNLOAD_CHUNK];
    let mut downloaded = 0u64;
    loop {
        let n = response.read(&mut buf).map_err(|e| write_err(part, e))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(|e| write_err(part, e))?;
        downloaded += n as u64;
        if let Some(cb) = &progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(|e| write_err(part, e))?;
    drop(file);

    fs::rename(part, dest).map_err(|e| write_err(dest, e))
}
