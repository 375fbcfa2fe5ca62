//! # Build Host
//!
//! Walks a source tree, routes every file through the stage pipeline, and
//! writes the results mirrored under the output directory.
//!
//! - Files are processed concurrently, at most `jobs` at a time
//! - The output directory is skipped when it sits inside the context
//! - Symlinks are not followed
//! - Files that are not UTF-8 text are copied through unchanged
//! - The report lists files sorted by path, whatever order they finished in

use crate::config::BuildConfig;
use bannerline_core::{BannerlineError, MAX_SOURCE_SIZE, Pipeline, SourceUnit};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

// =============================================================================
// REPORT TYPES
// =============================================================================

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// At least one stage ran.
    Transformed,
    /// No rule matched; the text was written unchanged.
    PassedThrough,
    /// Not UTF-8 text; the bytes were copied unchanged.
    Copied,
}

/// Per-file entry of a [`BuildReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Routing path, relative to the context.
    pub path: String,
    pub outcome: FileOutcome,
    pub stages_applied: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Summary of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub transformed: usize,
    pub passed_through: usize,
    pub copied: usize,
    pub elapsed_ms: u128,
    pub files: Vec<FileReport>,
}

impl BuildReport {
    fn from_files(mut files: Vec<FileReport>, elapsed_ms: u128) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let count = |outcome: FileOutcome| {
            files.iter().filter(|f| f.outcome == outcome).count()
        };
        Self {
            transformed: count(FileOutcome::Transformed),
            passed_through: count(FileOutcome::PassedThrough),
            copied: count(FileOutcome::Copied),
            elapsed_ms,
            files,
        }
    }

    /// Total number of files written.
    #[must_use]
    pub fn total(&self) -> usize {
        self.files.len()
    }
}

// =============================================================================
// SOURCE DISCOVERY
// =============================================================================

/// A file found under the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub absolute: PathBuf,
    /// Path relative to the context.
    pub relative: PathBuf,
    /// `relative` with `/` separators, as rules see it.
    pub route: String,
}

/// Render a relative path the way rules match it: `/`-separated.
///
/// Returns `None` for paths that climb out of their root.
#[must_use]
pub fn route_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

// =============================================================================
// BUILD RUNNER
// =============================================================================

/// Runs a pipeline over a source tree.
#[derive(Debug, Clone)]
pub struct BuildRunner {
    pipeline: Arc<Pipeline>,
    context: PathBuf,
    output: PathBuf,
    jobs: usize,
    max_source_size: u64,
}

impl BuildRunner {
    /// Create a runner. `jobs` is clamped to at least 1.
    #[must_use]
    pub fn new(pipeline: Pipeline, context: PathBuf, output: PathBuf, jobs: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            context,
            output,
            jobs: jobs.max(1),
            max_source_size: MAX_SOURCE_SIZE,
        }
    }

    /// Lower the per-file size limit below [`MAX_SOURCE_SIZE`].
    #[must_use]
    pub fn with_max_source_size(mut self, max: u64) -> Self {
        self.max_source_size = max.min(MAX_SOURCE_SIZE);
        self
    }

    /// Create a runner from a loaded config.
    pub fn from_config(config: &BuildConfig) -> Result<Self, BannerlineError> {
        config.validate()?;
        Ok(Self::new(
            config.pipeline()?,
            config.context.clone(),
            config.output.clone(),
            config.effective_jobs(),
        ))
    }

    /// The pipeline files are run through.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// List every regular file under the context, sorted by path.
    pub fn collect_sources(&self) -> Result<Vec<SourceFile>, BannerlineError> {
        let context = self.context.canonicalize().map_err(|e| {
            BannerlineError::IoError(format!(
                "Invalid context directory '{}': {}",
                self.context.display(),
                e
            ))
        })?;

        if !context.is_dir() {
            return Err(BannerlineError::IoError(format!(
                "Context '{}' is not a directory",
                self.context.display()
            )));
        }

        // The output directory may not exist yet; if it doesn't, there is
        // nothing inside the context to skip.
        let output = self.output.canonicalize().ok();
        if output.as_deref() == Some(context.as_path()) {
            return Err(BannerlineError::Config(format!(
                "context '{}' and output '{}' resolve to the same directory",
                self.context.display(),
                self.output.display()
            )));
        }

        let walker = WalkDir::new(&context)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| output.as_deref() != Some(entry.path()));

        let mut sources = Vec::new();
        for entry in walker {
            let entry =
                entry.map_err(|e| BannerlineError::IoError(format!("Walk failed: {}", e)))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let absolute = entry.into_path();
            let relative = absolute
                .strip_prefix(&context)
                .map_err(|e| BannerlineError::IoError(e.to_string()))?
                .to_path_buf();
            let route = route_path(&relative).ok_or_else(|| {
                BannerlineError::IoError(format!("Unroutable path '{}'", relative.display()))
            })?;

            sources.push(SourceFile {
                absolute,
                relative,
                route,
            });
        }

        Ok(sources)
    }

    /// Process every source file and write the results.
    pub async fn run(&self) -> Result<BuildReport, BannerlineError> {
        let started = Instant::now();
        let sources = self.collect_sources()?;

        tracing::info!(
            "Building {} files from {} into {} ({} jobs)",
            sources.len(),
            self.context.display(),
            self.output.display(),
            self.jobs
        );

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut tasks = JoinSet::new();

        for source in sources {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| BannerlineError::IoError(format!("Job limiter closed: {}", e)))?;
            let pipeline = Arc::clone(&self.pipeline);
            let destination = self.output.join(&source.relative);
            let max_size = self.max_source_size;

            tasks.spawn(async move {
                let _permit = permit;
                process_file(&pipeline, source, destination, max_size).await
            });
        }

        // Every task runs to completion; dropping the set would abort
        // writes that are still in flight.
        let mut files = Vec::new();
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|e| BannerlineError::IoError(format!("Build task failed: {}", e)))
                .and_then(|report| report);
            match result {
                Ok(report) => files.push(report),
                Err(e) => {
                    tracing::warn!("{}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let report = BuildReport::from_files(files, started.elapsed().as_millis());
        tracing::info!(
            "Build finished: {} transformed, {} passed through, {} copied in {} ms",
            report.transformed,
            report.passed_through,
            report.copied,
            report.elapsed_ms
        );

        Ok(report)
    }
}

// =============================================================================
// FILE PROCESSING
// =============================================================================

/// Source content as read from disk.
enum SourceContent {
    Text(String),
    Binary(Vec<u8>),
}

/// Read a file, rejecting anything over `max_size` bytes.
async fn read_source(
    path: &Path,
    route: &str,
    max_size: u64,
) -> Result<SourceContent, BannerlineError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        BannerlineError::IoError(format!("Cannot stat '{}': {}", path.display(), e))
    })?;

    if metadata.len() > max_size {
        return Err(BannerlineError::SourceTooLarge {
            path: route.to_string(),
            size: metadata.len(),
            max: max_size,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        BannerlineError::IoError(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => SourceContent::Text(text),
        Err(e) => SourceContent::Binary(e.into_bytes()),
    })
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), BannerlineError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            BannerlineError::IoError(format!("Cannot create '{}': {}", parent.display(), e))
        })?;
    }

    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| BannerlineError::IoError(format!("Cannot write '{}': {}", path.display(), e)))
}

async fn process_file(
    pipeline: &Pipeline,
    source: SourceFile,
    destination: PathBuf,
    max_size: u64,
) -> Result<FileReport, BannerlineError> {
    match read_source(&source.absolute, &source.route, max_size).await? {
        SourceContent::Text(text) => {
            let bytes_in = text.len() as u64;
            let unit = SourceUnit::new(source.route, text);
            let processed = pipeline.process(&unit);

            write_output(&destination, processed.content.as_bytes()).await?;

            let outcome = if processed.is_transformed() {
                FileOutcome::Transformed
            } else {
                FileOutcome::PassedThrough
            };
            tracing::debug!(
                "{} -> {:?} ({} stages)",
                unit.path(),
                outcome,
                processed.stages_applied
            );

            Ok(FileReport {
                path: unit.path().to_string(),
                outcome,
                stages_applied: processed.stages_applied,
                bytes_in,
                bytes_out: processed.content.len() as u64,
            })
        }
        SourceContent::Binary(bytes) => {
            tracing::warn!("{} is not UTF-8 text, copying unchanged", source.route);
            write_output(&destination, &bytes).await?;

            Ok(FileReport {
                path: source.route,
                outcome: FileOutcome::Copied,
                stages_applied: 0,
                bytes_in: bytes.len() as u64,
                bytes_out: bytes.len() as u64,
            })
        }
    }
}

/// Run a single file through `pipeline`.
///
/// The file is routed by its path relative to `context` when it lies inside
/// it, and by its file name otherwise.
pub async fn transform_file(
    pipeline: &Pipeline,
    context: &Path,
    file: &Path,
) -> Result<String, BannerlineError> {
    let absolute = file.canonicalize().map_err(|e| {
        BannerlineError::IoError(format!("Invalid file path '{}': {}", file.display(), e))
    })?;

    if !absolute.is_file() {
        return Err(BannerlineError::IoError(format!(
            "Path '{}' is not a regular file",
            file.display()
        )));
    }

    let route = context
        .canonicalize()
        .ok()
        .and_then(|root| absolute.strip_prefix(root).ok().and_then(route_path))
        .or_else(|| {
            absolute
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    match read_source(&absolute, &route, MAX_SOURCE_SIZE).await? {
        SourceContent::Text(text) => Ok(pipeline.process(&SourceUnit::new(route, text)).content),
        SourceContent::Binary(_) => Err(BannerlineError::NotText(file.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_path_uses_forward_slashes() {
        let path: PathBuf = ["src", "components", "App.tsx"].iter().collect();
        assert_eq!(route_path(&path).as_deref(), Some("src/components/App.tsx"));
    }

    #[test]
    fn route_path_skips_cur_dir() {
        assert_eq!(route_path(Path::new("./a/b.js")).as_deref(), Some("a/b.js"));
    }

    #[test]
    fn route_path_rejects_parent_dir() {
        assert_eq!(route_path(Path::new("../secret.js")), None);
    }

    #[test]
    fn report_counts_and_sorts() {
        let entry = |path: &str, outcome| FileReport {
            path: path.to_string(),
            outcome,
            stages_applied: 0,
            bytes_in: 1,
            bytes_out: 1,
        };
        let report = BuildReport::from_files(
            vec![
                entry("z.js", FileOutcome::Transformed),
                entry("a.png", FileOutcome::Copied),
                entry("m.css", FileOutcome::PassedThrough),
                entry("b.js", FileOutcome::Transformed),
            ],
            5,
        );

        assert_eq!(report.transformed, 2);
        assert_eq!(report.passed_through, 1);
        assert_eq!(report.copied, 1);
        assert_eq!(report.total(), 4);
        let paths: Vec<_> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.png", "b.js", "m.css", "z.js"]);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&FileOutcome::PassedThrough).expect("serialize");
        assert_eq!(json, "\"passed_through\"");
    }
}
