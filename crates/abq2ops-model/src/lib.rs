//! Structured model extracted from an Abaqus `.inp` deck.
//!
//! The parser owns a [`Model`] while it scans the deck; afterwards the model is
//! handed to the script generator as read-only input. Optional material fields
//! stay `None` until the deck defines them so the model reflects exactly what
//! the source contained. Defaults are applied at generation time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod summary;

pub use summary::ModelSummary;

/// Degrees of freedom per node: three translations followed by three rotations.
pub const DOF_COUNT: usize = 6;

pub type NodeId = i32;
pub type ElementId = i32;

/// Nodal coordinates `(x, y, z)`.
pub type Coords = [f64; 3];

/// Per-DOF fixity flags, `0` = free and `1` = fixed. Index 0 is DOF 1.
pub type Fixity = [u8; DOF_COUNT];

/// Per-DOF concentrated forces/moments. Index 0 is DOF 1.
pub type LoadVector = [f64; DOF_COUNT];

/// An element definition: source type tag plus connectivity in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub element_type: String,
    pub nodes: Vec<NodeId>,
}

impl Element {
    pub fn new(element_type: impl Into<String>, nodes: Vec<NodeId>) -> Self {
        Self {
            element_type: element_type.into(),
            nodes,
        }
    }
}

/// A linear elastic material as declared by `*MATERIAL`, `*ELASTIC` and `*DENSITY`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    /// Material name, case preserved
    pub name: String,
    /// Young's modulus (E)
    pub elastic_modulus: Option<f64>,
    /// Poisson's ratio (ν)
    pub poissons_ratio: Option<f64>,
    /// Density (ρ)
    pub density: Option<f64>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True once both elastic constants are known.
    pub fn is_elastic(&self) -> bool {
        self.elastic_modulus.is_some() && self.poissons_ratio.is_some()
    }
}

/// Keyword family a section was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Shell,
    Solid,
}

impl SectionKind {
    /// Upper-case family name used as the lookup key for section tables.
    pub fn as_key(self) -> &'static str {
        match self {
            SectionKind::Shell => "SHELL",
            SectionKind::Solid => "SOLID",
        }
    }
}

/// A `*SHELL SECTION` or `*SOLID SECTION` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub kind: SectionKind,
    /// Referenced material name, if the header carried `MATERIAL=`
    pub material: Option<String>,
    pub thickness: f64,
    pub elset: Option<String>,
}

/// Everything the parser extracted from one deck.
///
/// Integer-keyed collections iterate in ascending id order. Materials and
/// sections keep first-declaration order, which drives tag numbering.
/// `element_order` lists element ids in the order the deck first declared
/// them; [`Model::insert_element`] keeps it in sync with `elements`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub nodes: BTreeMap<NodeId, Coords>,
    pub elements: BTreeMap<ElementId, Element>,
    #[serde(default)]
    pub element_order: Vec<ElementId>,
    pub materials: Vec<Material>,
    pub sections: Vec<Section>,
    pub boundaries: BTreeMap<NodeId, Fixity>,
    pub loads: BTreeMap<NodeId, LoadVector>,
    pub element_sets: BTreeMap<String, Vec<ElementId>>,
    pub node_sets: BTreeMap<String, Vec<NodeId>>,
    /// Section name to material name, derived from `sections`
    pub material_mapping: BTreeMap<String, String>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the deck contributed nothing at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.elements.is_empty()
            && self.materials.is_empty()
            && self.sections.is_empty()
            && self.boundaries.is_empty()
            && self.loads.is_empty()
            && self.element_sets.is_empty()
            && self.node_sets.is_empty()
    }

    /// Store a node, overwriting any earlier definition with the same id.
    pub fn insert_node(&mut self, id: NodeId, coords: Coords) {
        self.nodes.insert(id, coords);
    }

    /// Store an element, overwriting any earlier definition with the same id.
    /// A redefined id keeps its first declaration position.
    pub fn insert_element(&mut self, id: ElementId, element: Element) {
        if self.elements.insert(id, element).is_none() {
            self.element_order.push(id);
        }
    }

    /// Elements in first-declaration order.
    pub fn elements_in_order(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.element_order
            .iter()
            .filter_map(|id| self.elements.get(id).map(|element| (*id, element)))
    }

    /// Look a material up by its exact name.
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Look a material up ignoring ASCII case, preferring an exact match.
    pub fn find_material(&self, name: &str) -> Option<&Material> {
        self.material(name).or_else(|| {
            self.materials
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(name))
        })
    }

    /// Return the named material, creating an empty record at the end if absent.
    pub fn material_entry(&mut self, name: &str) -> &mut Material {
        let index = match self.materials.iter().position(|m| m.name == name) {
            Some(index) => index,
            None => {
                self.materials.push(Material::new(name));
                self.materials.len() - 1
            }
        };
        &mut self.materials[index]
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Store a section. A redeclared name replaces the earlier record in place.
    pub fn upsert_section(&mut self, section: Section) {
        match &section.material {
            Some(material) => {
                self.material_mapping
                    .insert(section.name.clone(), material.clone());
            }
            None => {
                self.material_mapping.remove(&section.name);
            }
        }
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    /// Mark DOFs `first..=last` (1-based) as fixed. DOFs outside `1..=6` are
    /// ignored. Returns how many DOFs were inside the valid range.
    pub fn fix_dofs(&mut self, node: NodeId, first: i32, last: i32) -> usize {
        let flags = self.boundaries.entry(node).or_insert([0; DOF_COUNT]);
        let mut applied = 0;
        for dof in first..=last {
            if let Some(index) = dof_index(dof) {
                flags[index] = 1;
                applied += 1;
            }
        }
        applied
    }

    /// Set the load on one DOF (1-based), overwriting any earlier value.
    /// Returns `false` and leaves the model untouched when `dof` is out of range.
    pub fn set_load(&mut self, node: NodeId, dof: i32, magnitude: f64) -> bool {
        let Some(index) = dof_index(dof) else {
            return false;
        };
        self.loads.entry(node).or_insert([0.0; DOF_COUNT])[index] = magnitude;
        true
    }

    /// Append ids to a named element set, creating it if needed.
    pub fn extend_element_set(&mut self, name: &str, ids: impl IntoIterator<Item = ElementId>) {
        self.element_sets
            .entry(name.to_string())
            .or_default()
            .extend(ids);
    }

    /// Append ids to a named node set, creating it if needed.
    pub fn extend_node_set(&mut self, name: &str, ids: impl IntoIterator<Item = NodeId>) {
        self.node_sets.entry(name.to_string()).or_default().extend(ids);
    }

    /// Node ids of a set, matched ignoring ASCII case.
    pub fn node_set(&self, name: &str) -> Option<&[NodeId]> {
        self.node_sets
            .get(name)
            .or_else(|| {
                self.node_sets
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(Vec::as_slice)
    }
}

/// Convert a 1-based DOF number into an array index.
pub fn dof_index(dof: i32) -> Option<usize> {
    if (1..=DOF_COUNT as i32).contains(&dof) {
        Some((dof - 1) as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_dofs_merges_ranges() {
        let mut model = Model::new();
        assert_eq!(model.fix_dofs(7, 1, 3), 3);
        assert_eq!(model.fix_dofs(7, 6, 6), 1);
        assert_eq!(model.boundaries[&7], [1, 1, 1, 0, 0, 1]);
        assert!(!model.boundaries.contains_key(&8));
    }

    #[test]
    fn fix_dofs_ignores_out_of_range() {
        let mut model = Model::new();
        assert_eq!(model.fix_dofs(1, 5, 9), 2);
        assert_eq!(model.boundaries[&1], [0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn set_load_overwrites_single_component() {
        let mut model = Model::new();
        assert!(model.set_load(4, 3, -1000.0));
        assert!(model.set_load(4, 3, -500.0));
        assert!(!model.set_load(4, 7, 1.0));
        assert_eq!(model.loads[&4], [0.0, 0.0, -500.0, 0.0, 0.0, 0.0]);
        assert_eq!(model.loads.len(), 1);
    }

    #[test]
    fn element_order_follows_first_declaration() {
        let mut model = Model::new();
        model.insert_element(10, Element::new("S4R", vec![1, 2, 3, 4]));
        model.insert_element(1, Element::new("T3D2", vec![1, 2]));
        model.insert_element(10, Element::new("S4", vec![4, 3, 2, 1]));

        let order: Vec<(ElementId, &str)> = model
            .elements_in_order()
            .map(|(id, e)| (id, e.element_type.as_str()))
            .collect();
        assert_eq!(order, vec![(10, "S4"), (1, "T3D2")]);
        assert_eq!(model.element_order, vec![10, 1]);
    }

    #[test]
    fn is_empty_tracks_any_contribution() {
        let mut model = Model::new();
        assert!(model.is_empty());
        model.extend_node_set("Edge", [1]);
        assert!(!model.is_empty());
    }

    #[test]
    fn material_entry_keeps_first_position() {
        let mut model = Model::new();
        model.material_entry("Steel").elastic_modulus = Some(210e3);
        model.material_entry("Alu");
        model.material_entry("Steel").density = Some(7.85e-9);
        assert_eq!(model.materials.len(), 2);
        assert_eq!(model.materials[0].name, "Steel");
        assert_eq!(model.materials[0].elastic_modulus, Some(210e3));
        assert_eq!(model.materials[0].density, Some(7.85e-9));
    }

    #[test]
    fn find_material_ignores_case() {
        let mut model = Model::new();
        model.material_entry("Steel");
        assert!(model.material("STEEL").is_none());
        assert_eq!(model.find_material("STEEL").map(|m| m.name.as_str()), Some("Steel"));
    }

    #[test]
    fn upsert_section_replaces_and_tracks_mapping() {
        let mut model = Model::new();
        model.upsert_section(Section {
            name: "Plate".into(),
            kind: SectionKind::Shell,
            material: Some("Steel".into()),
            thickness: 0.01,
            elset: Some("Plate".into()),
        });
        model.upsert_section(Section {
            name: "Plate".into(),
            kind: SectionKind::Shell,
            material: Some("Alu".into()),
            thickness: 0.02,
            elset: Some("Plate".into()),
        });
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].thickness, 0.02);
        assert_eq!(model.material_mapping.get("Plate").map(String::as_str), Some("Alu"));
    }

    #[test]
    fn sets_accumulate_duplicates() {
        let mut model = Model::new();
        model.extend_node_set("Fixed", [1, 2]);
        model.extend_node_set("Fixed", [2, 3]);
        assert_eq!(model.node_set("fixed"), Some(&[1, 2, 2, 3][..]));
    }

    #[test]
    fn model_serializes_to_json() {
        let mut model = Model::new();
        model.insert_node(1, [0.0, 1.5, -2.0]);
        let json = serde_json::to_string(&model).expect("serialize");
        let back: Model = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, model);
    }
}
