//! Plain-text and JSON renderings of a [`ModelSummary`].

use std::fs;
use std::path::Path;

use abq2ops_model::ModelSummary;

use crate::error::Result;

pub fn summary_json(summary: &ModelSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn write_summary_json(path: impl AsRef<Path>, summary: &ModelSummary) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, summary_json(summary)?)?;
    Ok(())
}

pub fn read_summary_json(path: impl AsRef<Path>) -> Result<ModelSummary> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Aligned `label: count` table, one row per line.
pub fn format_summary_table(summary: &ModelSummary) -> String {
    let rows = summary.rows();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, count) in rows {
        out.push_str(&format!("{label:<width$}  {count}\n"));
    }
    out
}

/// Element type counts and material names, for verbose reports.
pub fn format_summary_details(summary: &ModelSummary) -> String {
    let mut out = String::new();
    if !summary.element_types.is_empty() {
        out.push_str("Element types:\n");
        for (kind, count) in &summary.element_types {
            out.push_str(&format!("  {kind}: {count}\n"));
        }
    }
    if !summary.material_names.is_empty() {
        out.push_str(&format!("Materials: {}\n", summary.material_names.join(", ")));
    }
    out.push_str(&format!(
        "Fixed DOFs: {} of {}\n",
        summary.fixed_dofs, summary.total_dofs
    ));
    out
}
