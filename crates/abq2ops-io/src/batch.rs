//! Directory-wide conversion.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::convert::{ConvertOptions, ConvertedFile, SCRIPT_EXTENSION, convert_file};
use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    Converted,
    Failed,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Converted => "CONVERTED",
            FileStatus::Failed => "FAILED",
        }
    }
}

/// Result of converting one deck in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    pub message: String,
}

impl FileOutcome {
    fn converted(file: &ConvertedFile) -> Self {
        Self {
            input: file.input.clone(),
            output: Some(file.output.clone()),
            status: FileStatus::Converted,
            message: format!(
                "{} nodes, {} elements",
                file.summary.nodes, file.summary.elements
            ),
        }
    }

    fn failed(input: PathBuf, err: &ConvertError) -> Self {
        Self {
            input,
            output: None,
            status: FileStatus::Failed,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// One entry per input file, in sorted input order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FileStatus::Converted)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// `.inp` files directly inside `dir`, sorted by path.
pub fn collect_inp_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::NotADirectory(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("inp"))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Where `input` lands when the batch writes into `output_dir`.
pub fn batch_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match (output_dir, input.file_name()) {
        (Some(dir), Some(name)) => dir.join(name).with_extension(SCRIPT_EXTENSION),
        _ => input.with_extension(SCRIPT_EXTENSION),
    }
}

/// For each planned `(input, output)`, the earlier input whose output path is
/// the same ignoring ASCII case, if any.
fn find_output_collisions(plan: &[(PathBuf, PathBuf)]) -> Vec<Option<PathBuf>> {
    let mut claimed = HashMap::<String, &Path>::new();
    plan.iter()
        .map(|(input, output)| {
            let key = output.to_string_lossy().to_ascii_lowercase();
            match claimed.get(&key) {
                Some(first) => Some(first.to_path_buf()),
                None => {
                    claimed.insert(key, input.as_path());
                    None
                }
            }
        })
        .collect()
}

pub fn batch_convert(dir: &Path, output_dir: Option<&Path>, overwrite: bool) -> Result<BatchReport> {
    batch_convert_with_progress(dir, output_dir, overwrite, |_| {})
}

/// Convert every deck in `dir` in parallel. A failing file is recorded in
/// the report and never stops the others. `on_done` runs once per file, in
/// completion order.
pub fn batch_convert_with_progress<F>(
    dir: &Path,
    output_dir: Option<&Path>,
    overwrite: bool,
    on_done: F,
) -> Result<BatchReport>
where
    F: Fn(&FileOutcome) + Sync,
{
    let files = collect_inp_files(dir)?;
    if let Some(out) = output_dir {
        fs::create_dir_all(out)?;
    }
    info!("batch converting {} files from {}", files.len(), dir.display());

    let plan: Vec<(PathBuf, PathBuf)> = files
        .into_iter()
        .map(|input| {
            let output = batch_output_path(&input, output_dir);
            (input, output)
        })
        .collect();
    let collisions = find_output_collisions(&plan);

    let outcomes: Vec<FileOutcome> = plan
        .into_par_iter()
        .zip(collisions)
        .map(|((input, output), collision)| {
            if let Some(first) = collision {
                let err = ConvertError::OutputCollision { output, first };
                warn!("skipping {}: {err}", input.display());
                let outcome = FileOutcome::failed(input, &err);
                on_done(&outcome);
                return outcome;
            }
            let options = ConvertOptions {
                output: Some(output),
                overwrite,
                ..ConvertOptions::default()
            };
            let outcome = match convert_file(&input, &options) {
                Ok(file) => FileOutcome::converted(&file),
                Err(err) => {
                    warn!("failed to convert {}: {err}", input.display());
                    FileOutcome::failed(input, &err)
                }
            };
            on_done(&outcome);
            outcome
        })
        .collect();

    let report = BatchReport { outcomes };
    info!(
        "batch finished: {} converted, {} failed",
        report.converted(),
        report.failed()
    );
    Ok(report)
}
