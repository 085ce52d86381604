//! OpenSeesPy script generation from a parsed [`Model`].
//!
//! Stages run in a fixed order and each appends one statement group followed
//! by a blank separator line. Material and section tags are assigned per run,
//! so generating twice from the same model gives identical output.

use std::collections::HashMap;

use abq2ops_model::{Element, ElementId, Model};
use tracing::{debug, warn};

use crate::error::{GenError, Result};
use crate::tables::{self, Resolution};

/// Defaults substituted for material fields the deck never defined.
pub const DEFAULT_ELASTIC_MODULUS: f64 = 1.0;
pub const DEFAULT_POISSONS_RATIO: f64 = 0.3;
pub const DEFAULT_DENSITY: f64 = 0.0;

/// Section tag used by elements when no section statement was emitted.
pub const FALLBACK_SECTION_TAG: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// First line of the script
    pub header_comment: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            header_comment: "# Translated OpenSeesPy Model".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub nodes: usize,
    pub materials: usize,
    pub sections: usize,
    pub dropped_sections: usize,
    pub elements: usize,
    pub element_groups: usize,
    pub fixities: usize,
    pub loads: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptGenerator {
    options: GeneratorOptions,
}

/// Tags assigned during one generation run.
#[derive(Debug, Default)]
struct Tags<'m> {
    materials: HashMap<&'m str, u32>,
    sections: Vec<(&'m str, u32)>,
}

impl ScriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Statement lines for `model`, in emission order.
    pub fn generate(&self, model: &Model) -> Vec<String> {
        self.generate_with_stats(model).0
    }

    /// The script as one newline-joined string.
    pub fn render(&self, model: &Model) -> String {
        self.generate(model).join("\n")
    }

    pub fn generate_with_stats(&self, model: &Model) -> (Vec<String>, ConversionStats) {
        let mut out = Vec::new();
        let mut stats = ConversionStats::default();
        let mut tags = Tags::default();

        if model.is_empty() {
            warn!("model has no entities, emitting an empty script skeleton");
        }
        self.emit_header(&mut out);
        emit_nodes(model, &mut out, &mut stats);
        emit_materials(model, &mut tags, &mut out, &mut stats);
        emit_sections(model, &mut tags, &mut out, &mut stats);
        emit_elements(model, &tags, &mut out, &mut stats);
        emit_boundaries(model, &mut out, &mut stats);
        emit_loads(model, &mut out, &mut stats);
        emit_analysis(&mut out);

        debug!("generated {} statements", out.len());
        (out, stats)
    }

    fn emit_header(&self, out: &mut Vec<String>) {
        out.extend([
            self.options.header_comment.clone(),
            "from openseespy.opensees import *".to_string(),
            String::new(),
            "# Start Model".to_string(),
            "wipe()".to_string(),
            "model('basic', '-ndm', 3, '-ndf', 6)".to_string(),
            String::new(),
        ]);
    }
}

/// Statements for an optional model; `None` is a caller error.
pub fn generate_script(model: Option<&Model>) -> Result<Vec<String>> {
    let model = model.ok_or(GenError::EmptyModel)?;
    Ok(ScriptGenerator::new().generate(model))
}

/// Format a real as the shortest literal that parses back to the same value.
pub fn format_real(value: f64) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        format!("float('{value}')")
    }
}

fn join_reals(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_real(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_nodes(model: &Model, out: &mut Vec<String>, stats: &mut ConversionStats) {
    out.push("# Nodes".to_string());
    for (id, coords) in &model.nodes {
        out.push(format!("node({id}, {})", join_reals(coords)));
    }
    stats.nodes = model.nodes.len();
    out.push(String::new());
}

fn emit_materials<'m>(
    model: &'m Model,
    tags: &mut Tags<'m>,
    out: &mut Vec<String>,
    stats: &mut ConversionStats,
) {
    out.push("# Materials".to_string());
    let kind = tables::material_kind("ELASTIC");
    for (tag, material) in (1u32..).zip(&model.materials) {
        let e = material.elastic_modulus.unwrap_or(DEFAULT_ELASTIC_MODULUS);
        let nu = material.poissons_ratio.unwrap_or(DEFAULT_POISSONS_RATIO);
        let rho = material.density.unwrap_or(DEFAULT_DENSITY);
        if !material.is_elastic() {
            debug!(
                "material {} has no complete *ELASTIC data, using defaults",
                material.name
            );
        }
        out.push(format!(
            "nDMaterial('{kind}', {tag}, {}, {}, {})",
            format_real(e),
            format_real(nu),
            format_real(rho)
        ));
        tags.materials.insert(material.name.as_str(), tag);
        stats.materials += 1;
    }
    out.push(String::new());
}

fn emit_sections<'m>(
    model: &'m Model,
    tags: &mut Tags<'m>,
    out: &mut Vec<String>,
    stats: &mut ConversionStats,
) {
    out.push("# Sections".to_string());
    let mut next_tag = 1u32;
    for section in &model.sections {
        let resolved = section
            .material
            .as_deref()
            .and_then(|name| model.find_material(name))
            .and_then(|m| tags.materials.get(m.name.as_str()).map(|tag| (m, *tag)));
        let Some((material, material_tag)) = resolved else {
            warn!(
                "section {} references unknown material {:?}, section dropped",
                section.name,
                section.material.as_deref().unwrap_or("")
            );
            stats.dropped_sections += 1;
            continue;
        };

        let e = material.elastic_modulus.unwrap_or(DEFAULT_ELASTIC_MODULUS);
        let nu = material.poissons_ratio.unwrap_or(DEFAULT_POISSONS_RATIO);
        out.push(format!(
            "section('{}', {next_tag}, {}, {}, {}, {material_tag})",
            tables::section_kind(section.kind.as_key()),
            format_real(e),
            format_real(nu),
            format_real(section.thickness)
        ));
        tags.sections.push((section.name.as_str(), next_tag));
        next_tag += 1;
        stats.sections += 1;
    }
    out.push(String::new());
}

/// Group elements by type tag. Groups and their members follow the order in
/// which the deck first declared each element.
fn group_by_type(model: &Model) -> Vec<(&str, Vec<(ElementId, &Element)>)> {
    let mut groups: Vec<(&str, Vec<(ElementId, &Element)>)> = Vec::new();
    for (id, element) in model.elements_in_order() {
        let key = element.element_type.as_str();
        match groups.iter_mut().find(|(t, _)| *t == key) {
            Some((_, members)) => members.push((id, element)),
            None => groups.push((key, vec![(id, element)])),
        }
    }
    groups
}

fn emit_elements(model: &Model, tags: &Tags, out: &mut Vec<String>, stats: &mut ConversionStats) {
    out.push("# Elements".to_string());

    // Every element group shares the lowest emitted section tag.
    let section_tag = tags
        .sections
        .iter()
        .map(|(_, tag)| *tag)
        .min()
        .unwrap_or(FALLBACK_SECTION_TAG);
    if tags.sections.len() > 1 && !model.elements.is_empty() {
        warn!(
            "{} sections emitted but every element uses section tag {section_tag}",
            tags.sections.len()
        );
    }

    let groups = group_by_type(model);
    for (element_type, members) in &groups {
        let kind = tables::element_kind(element_type);
        match kind.resolution {
            Resolution::Exact => {}
            Resolution::Family => warn!(
                "element type {element_type} is not tabulated, using family kind {}",
                kind.name
            ),
            Resolution::Default => warn!(
                "unknown element type {element_type:?}, using default kind {}",
                kind.name
            ),
        }

        let info = tables::element_info(element_type);
        if let Some(info) = info
            && info.dofs_per_node < abq2ops_model::DOF_COUNT
        {
            debug!(
                "{element_type} elements use {} DOFs per node in a {}-DOF model",
                info.dofs_per_node,
                abq2ops_model::DOF_COUNT
            );
        }

        for (id, element) in members {
            if let Some(info) = info
                && info.nodes != element.nodes.len()
            {
                warn!(
                    "element {id} ({element_type}) has {} nodes, expected {}",
                    element.nodes.len(),
                    info.nodes
                );
            }
            let nodes = element
                .nodes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            out.push(format!(
                "element('{}', {id}, {nodes}, {section_tag})",
                kind.name
            ));
            stats.elements += 1;
        }
    }
    stats.element_groups = groups.len();
    out.push(String::new());
}

fn emit_boundaries(model: &Model, out: &mut Vec<String>, stats: &mut ConversionStats) {
    out.push("# Constraints".to_string());
    for (node, flags) in &model.boundaries {
        let flags = flags
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push(format!("fix({node}, {flags})"));
        stats.fixities += 1;
    }
    out.push(String::new());
}

fn emit_loads(model: &Model, out: &mut Vec<String>, stats: &mut ConversionStats) {
    if model.loads.is_empty() {
        return;
    }
    out.push("# Loads".to_string());
    out.push("timeSeries('Linear', 1)".to_string());
    out.push("pattern('Plain', 1, 1)".to_string());
    for (node, values) in &model.loads {
        out.push(format!("load({node}, {})", join_reals(values)));
        stats.loads += 1;
    }
    out.push(String::new());
}

fn emit_analysis(out: &mut Vec<String>) {
    out.extend(
        [
            "# Analysis",
            "constraints('Plain')",
            "numberer('Plain')",
            "system('BandGeneral')",
            "test('NormDispIncr', 1.0e-6, 10)",
            "algorithm('Newton')",
            "integrator('LoadControl', 1.0)",
            "analysis('Static')",
            "analyze(1)",
            "",
            "printModel()",
        ]
        .map(String::from),
    );
}
