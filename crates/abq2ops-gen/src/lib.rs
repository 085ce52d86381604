//! OpenSeesPy script generation for models parsed from Abaqus decks.
//!
//! - [`tables`]: static element/material/section/DOF lookup tables
//! - [`generator`]: the ordered, stage-by-stage statement emitter

pub mod error;
pub mod generator;
pub mod tables;

pub use error::{GenError, Result};
pub use generator::{
    ConversionStats, DEFAULT_DENSITY, DEFAULT_ELASTIC_MODULUS, DEFAULT_POISSONS_RATIO,
    FALLBACK_SECTION_TAG, GeneratorOptions, ScriptGenerator, format_real, generate_script,
};
pub use tables::{ElementInfo, ElementKind, Resolution, element_info, element_kind};
