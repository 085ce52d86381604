//! Parse → generate → write for a single deck.

use std::fs;
use std::path::{Path, PathBuf};

use abq2ops_gen::{ConversionStats, GeneratorOptions, ScriptGenerator};
use abq2ops_inp::{ParseOptions, parse_file_with_options};
use abq2ops_model::{Model, ModelSummary};
use tracing::info;

use crate::error::{ConvertError, Result};

/// Extension given to generated scripts.
pub const SCRIPT_EXTENSION: &str = "py";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Output path; defaults to the input path with a `.py` extension
    pub output: Option<PathBuf>,
    /// Replace an existing output file
    pub overwrite: bool,
    pub parse: ParseOptions,
    pub generator: GeneratorOptions,
}

/// What a successful file conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: ModelSummary,
    pub stats: ConversionStats,
    pub skipped_rows: usize,
}

/// Parse a deck file into a model.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Model> {
    Ok(abq2ops_inp::parse_file(path)?)
}

/// Render the script for a model. `None` is reported as an empty model.
pub fn generate(model: Option<&Model>) -> Result<String> {
    Ok(abq2ops_gen::generate_script(model)?.join("\n"))
}

/// Parse and render in one step, without touching the filesystem otherwise.
pub fn convert(path: impl AsRef<Path>) -> Result<String> {
    let model = parse_file(path)?;
    generate(Some(&model))
}

pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(SCRIPT_EXTENSION)
}

fn has_inp_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("inp"))
}

/// Convert `input` and write the script, refusing to clobber an existing
/// output unless `options.overwrite` is set.
pub fn convert_file(input: impl AsRef<Path>, options: &ConvertOptions) -> Result<ConvertedFile> {
    let input = input.as_ref();
    if !input.is_file() {
        return Err(abq2ops_inp::InpError::FileNotFound(input.to_path_buf()).into());
    }
    if !has_inp_extension(input) {
        return Err(ConvertError::NotInpFile(input.to_path_buf()));
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    if output.exists() && !options.overwrite {
        return Err(ConvertError::OutputExists(output));
    }

    info!("converting {} to {}", input.display(), output.display());
    let outcome = parse_file_with_options(input, &options.parse)?;
    let generator = ScriptGenerator::with_options(options.generator.clone());
    let (lines, stats) = generator.generate_with_stats(&outcome.model);
    write_script(&output, &lines.join("\n"))?;

    Ok(ConvertedFile {
        input: input.to_path_buf(),
        output,
        summary: ModelSummary::from_model(&outcome.model),
        stats,
        skipped_rows: outcome.diagnostics.len(),
    })
}

/// Write script text, creating parent directories as needed.
pub fn write_script(path: impl AsRef<Path>, script: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, script)?;
    Ok(())
}
