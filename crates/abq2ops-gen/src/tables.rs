//! Static Abaqus → OpenSeesPy lookup tables.
//!
//! All lookups are ASCII case-insensitive and never fail: a miss resolves to
//! the documented default for that table.

/// Element kind used when neither the table nor a family prefix matches.
pub const DEFAULT_ELEMENT_KIND: &str = "ShellMITC4";
pub const DEFAULT_MATERIAL_KIND: &str = "ElasticIsotropic";
pub const DEFAULT_SECTION_KIND: &str = "ElasticMembranePlateSection";

/// Abaqus element type → OpenSeesPy element kind.
pub static ELEMENT_KINDS: &[(&str, &str)] = &[
    // Shells
    ("S4", "ShellMITC4"),
    ("S4R", "ShellMITC4"),
    ("S4R5", "ShellMITC4"),
    ("S3", "ShellDKGT"),
    ("S3R", "ShellDKGT"),
    ("STRI3", "ShellDKGT"),
    ("STRI65", "ShellDKGT"),
    // Solids
    ("C3D8", "stdBrick"),
    ("C3D8R", "stdBrick"),
    ("C3D8I", "stdBrick"),
    ("C3D8H", "stdBrick"),
    ("C3D20", "stdBrick"),
    ("C3D20R", "stdBrick"),
    ("C3D6", "stdBrick"),
    ("C3D15", "stdBrick"),
    ("C3D4", "FourNodeTetrahedron"),
    ("C3D10", "TenNodeTetrahedron"),
    // Beams, pipes and trusses
    ("B31", "elasticBeamColumn"),
    ("B31R", "elasticBeamColumn"),
    ("B32", "elasticBeamColumn"),
    ("B33", "elasticBeamColumn"),
    ("FRAME3D", "elasticBeamColumn"),
    ("PIPE31", "elasticBeamColumn"),
    ("PIPE32", "elasticBeamColumn"),
    ("T3D2", "Truss"),
    ("T3D3", "Truss"),
    ("T2D2", "Truss"),
    ("T2D3", "Truss"),
    // Membranes
    ("M3D3", "tri31"),
    ("M3D6", "tri31"),
    ("M3D4", "quad"),
    ("M3D4R", "quad"),
    ("M3D8", "quad"),
];

/// Fallbacks by element family prefix, checked in order after an exact miss.
static ELEMENT_FAMILIES: &[(&str, &str)] = &[
    ("C3D", "stdBrick"),
    ("PIPE", "elasticBeamColumn"),
    ("S", "ShellMITC4"),
    ("B", "elasticBeamColumn"),
    ("T", "Truss"),
    ("M", "quad"),
];

/// Abaqus material behavior keyword → OpenSeesPy material kind.
/// Only `ELASTIC` is emitted today; the other rows name the kind a behavior
/// would translate to.
pub static MATERIAL_KINDS: &[(&str, &str)] = &[
    ("ELASTIC", "ElasticIsotropic"),
    ("PLASTIC", "J2Plasticity"),
    ("HYPERELASTIC", "ElasticIsotropic"),
    ("CONCRETE", "Concrete01"),
    ("STEEL", "Steel01"),
];

/// Abaqus section family → OpenSeesPy section kind. Solid sections have no
/// plate equivalent; they carry their material through the plate section.
pub static SECTION_KINDS: &[(&str, &str)] = &[
    ("SHELL", "ElasticMembranePlateSection"),
    ("SOLID", "ElasticMembranePlateSection"),
    ("MEMBRANE", "ElasticMembranePlateSection"),
    ("BEAM", "Elastic"),
    ("PIPE", "Elastic"),
    ("GENERAL", "Elastic"),
];

/// Expected connectivity and active DOFs for an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo {
    pub nodes: usize,
    pub dofs_per_node: usize,
}

const fn info(nodes: usize, dofs_per_node: usize) -> ElementInfo {
    ElementInfo {
        nodes,
        dofs_per_node,
    }
}

pub static ELEMENT_INFO: &[(&str, ElementInfo)] = &[
    ("S3", info(3, 6)),
    ("S3R", info(3, 6)),
    ("STRI3", info(3, 6)),
    ("S4", info(4, 6)),
    ("S4R", info(4, 6)),
    ("S4R5", info(4, 6)),
    ("S6", info(6, 6)),
    ("S8R", info(8, 6)),
    ("STRI65", info(6, 6)),
    ("C3D4", info(4, 3)),
    ("C3D10", info(10, 3)),
    ("C3D6", info(6, 3)),
    ("C3D15", info(15, 3)),
    ("C3D8", info(8, 3)),
    ("C3D8R", info(8, 3)),
    ("C3D8I", info(8, 3)),
    ("C3D8H", info(8, 3)),
    ("C3D20", info(20, 3)),
    ("C3D20R", info(20, 3)),
    ("B31", info(2, 6)),
    ("B31R", info(2, 6)),
    ("B32", info(3, 6)),
    ("B33", info(2, 6)),
    ("T3D2", info(2, 3)),
    ("T3D3", info(3, 3)),
    ("T2D2", info(2, 3)),
    ("T2D3", info(3, 3)),
    ("M3D3", info(3, 3)),
    ("M3D4", info(4, 3)),
    ("M3D4R", info(4, 3)),
    ("M3D6", info(6, 3)),
    ("M3D8", info(8, 3)),
];

/// How an element kind was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    Family,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementKind {
    pub name: &'static str,
    pub resolution: Resolution,
}

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    let key = key.trim();
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}

/// Resolve an Abaqus element type: exact entry, then family prefix, then
/// [`DEFAULT_ELEMENT_KIND`].
pub fn element_kind(abaqus_type: &str) -> ElementKind {
    if let Some(name) = lookup(ELEMENT_KINDS, abaqus_type) {
        return ElementKind {
            name,
            resolution: Resolution::Exact,
        };
    }
    let upper = abaqus_type.trim().to_ascii_uppercase();
    if let Some((_, name)) = ELEMENT_FAMILIES
        .iter()
        .find(|(prefix, _)| upper.starts_with(prefix))
    {
        return ElementKind {
            name: *name,
            resolution: Resolution::Family,
        };
    }
    ElementKind {
        name: DEFAULT_ELEMENT_KIND,
        resolution: Resolution::Default,
    }
}

pub fn material_kind(behavior: &str) -> &'static str {
    lookup(MATERIAL_KINDS, behavior).unwrap_or(DEFAULT_MATERIAL_KIND)
}

pub fn section_kind(family: &str) -> &'static str {
    lookup(SECTION_KINDS, family).unwrap_or(DEFAULT_SECTION_KIND)
}

pub fn element_info(abaqus_type: &str) -> Option<ElementInfo> {
    lookup(ELEMENT_INFO, abaqus_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_element_mapping() {
        assert_eq!(element_kind("S4R").name, "ShellMITC4");
        assert_eq!(element_kind("s3").name, "ShellDKGT");
        assert_eq!(element_kind("C3D8R").name, "stdBrick");
        assert_eq!(element_kind("C3D4").name, "FourNodeTetrahedron");
        assert_eq!(element_kind("T3D2").name, "Truss");
        assert_eq!(element_kind("B31").name, "elasticBeamColumn");
        assert_eq!(element_kind(" S4R ").resolution, Resolution::Exact);
    }

    #[test]
    fn family_fallback() {
        let kind = element_kind("C3D27");
        assert_eq!(kind.name, "stdBrick");
        assert_eq!(kind.resolution, Resolution::Family);
        assert_eq!(element_kind("PIPE33").name, "elasticBeamColumn");
        assert_eq!(element_kind("SC8R").name, "ShellMITC4");
    }

    #[test]
    fn unknown_element_uses_default() {
        let kind = element_kind("XYZ123");
        assert_eq!(kind.name, DEFAULT_ELEMENT_KIND);
        assert_eq!(kind.resolution, Resolution::Default);
        assert_eq!(element_kind("").name, DEFAULT_ELEMENT_KIND);
    }

    #[test]
    fn material_and_section_tables() {
        assert_eq!(material_kind("Elastic"), "ElasticIsotropic");
        assert_eq!(material_kind("plastic"), "J2Plasticity");
        assert_eq!(material_kind("CONCRETE"), "Concrete01");
        assert_eq!(material_kind("Steel"), "Steel01");
        assert_eq!(material_kind("MOHR COULOMB"), DEFAULT_MATERIAL_KIND);
        assert_eq!(section_kind("shell"), "ElasticMembranePlateSection");
        assert_eq!(section_kind("BEAM"), "Elastic");
        assert_eq!(section_kind("COHESIVE"), DEFAULT_SECTION_KIND);
    }

    #[test]
    fn element_info_table() {
        assert_eq!(element_info("S4R"), Some(info(4, 6)));
        assert_eq!(element_info("c3d20r"), Some(info(20, 3)));
        assert_eq!(element_info("FOO"), None);
    }

    #[test]
    fn every_mapped_kind_has_element_info_or_is_a_frame() {
        for (abaqus, _) in ELEMENT_KINDS {
            let known = element_info(abaqus).is_some();
            assert!(
                known || abaqus.starts_with("FRAME") || abaqus.starts_with("PIPE"),
                "{abaqus} has no node-count entry"
            );
        }
    }
}
