//! File-level conversion of Abaqus decks to OpenSeesPy scripts.
//!
//! Wraps the parser and generator crates with the filesystem concerns the
//! command line needs: output naming, overwrite protection, directory
//! batches and summary reports.

pub mod batch;
pub mod convert;
pub mod error;
pub mod report;

pub use batch::{
    BatchReport, FileOutcome, FileStatus, batch_convert, batch_convert_with_progress,
    collect_inp_files,
};
pub use convert::{
    ConvertOptions, ConvertedFile, convert, convert_file, default_output_path, generate,
    parse_file, write_script,
};
pub use error::{ConvertError, Result};
pub use report::{
    format_summary_details, format_summary_table, read_summary_json, summary_json,
    write_summary_json,
};
