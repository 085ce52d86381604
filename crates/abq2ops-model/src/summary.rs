//! Read-only statistics over a parsed model, used by the `info` report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DOF_COUNT, Model};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub nodes: usize,
    pub elements: usize,
    pub materials: usize,
    pub sections: usize,
    pub boundaries: usize,
    pub loads: usize,
    pub element_sets: usize,
    pub node_sets: usize,
    pub element_types: BTreeMap<String, usize>,
    pub material_names: Vec<String>,
    pub fixed_dofs: usize,
    pub total_dofs: usize,
}

impl ModelSummary {
    pub fn from_model(model: &Model) -> Self {
        let mut element_types = BTreeMap::<String, usize>::new();
        for element in model.elements.values() {
            *element_types
                .entry(element.element_type.clone())
                .or_insert(0) += 1;
        }

        let fixed_dofs = model
            .boundaries
            .values()
            .map(|flags| flags.iter().filter(|f| **f == 1).count())
            .sum();

        Self {
            nodes: model.nodes.len(),
            elements: model.elements.len(),
            materials: model.materials.len(),
            sections: model.sections.len(),
            boundaries: model.boundaries.len(),
            loads: model.loads.len(),
            element_sets: model.element_sets.len(),
            node_sets: model.node_sets.len(),
            element_types,
            material_names: model.materials.iter().map(|m| m.name.clone()).collect(),
            fixed_dofs,
            total_dofs: model.nodes.len() * DOF_COUNT,
        }
    }

    /// `(label, count)` rows in display order.
    pub fn rows(&self) -> [(&'static str, usize); 8] {
        [
            ("Nodes", self.nodes),
            ("Elements", self.elements),
            ("Materials", self.materials),
            ("Sections", self.sections),
            ("Boundary Conditions", self.boundaries),
            ("Loads", self.loads),
            ("Element Sets", self.element_sets),
            ("Node Sets", self.node_sets),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::ModelSummary;
    use crate::{Element, Model};

    #[test]
    fn summarizes_collections_and_element_types() {
        let mut model = Model::new();
        model.insert_node(1, [0.0, 0.0, 0.0]);
        model.insert_node(2, [1.0, 0.0, 0.0]);
        model.insert_element(1, Element::new("S4R", vec![1, 2, 2, 1]));
        model.insert_element(2, Element::new("S4R", vec![1, 2, 2, 1]));
        model.insert_element(3, Element::new("T3D2", vec![1, 2]));
        model.material_entry("Steel");
        model.fix_dofs(1, 1, 6);
        model.fix_dofs(2, 3, 3);
        model.set_load(2, 1, 5.0);

        let s = ModelSummary::from_model(&model);
        assert_eq!(s.nodes, 2);
        assert_eq!(s.elements, 3);
        assert_eq!(s.element_types.get("S4R"), Some(&2));
        assert_eq!(s.element_types.get("T3D2"), Some(&1));
        assert_eq!(s.material_names, vec!["Steel".to_string()]);
        assert_eq!(s.boundaries, 2);
        assert_eq!(s.fixed_dofs, 7);
        assert_eq!(s.total_dofs, 12);
        assert_eq!(s.loads, 1);
        assert_eq!(s.rows()[0], ("Nodes", 2));
    }
}
