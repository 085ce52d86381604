//! Single forward pass over deck lines that fills a [`Model`].
//!
//! Each keyword block is handled by its own function. The only state carried
//! between blocks is [`ParserState`], which is passed explicitly so a block can
//! be parsed in isolation. Malformed data rows are reported as [`Diagnostic`]s
//! (and logged) and contribute nothing; they never abort the parse.

use std::path::PathBuf;

use abq2ops_model::{Element, ElementId, Model, NodeId, Section, SectionKind, dof_index};
use tracing::{debug, warn};

use crate::header::Header;
use crate::source::{SourceMap, SourceText};

/// Thickness used when a section has no usable data line.
pub const DEFAULT_THICKNESS: f64 = 1.0;

/// Largest id count a single `GENERATE` row may expand to.
pub const MAX_GENERATED_IDS: i64 = 10_000_000;

/// Parse state that outlives a single keyword block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    /// Material that `*ELASTIC` and `*DENSITY` attach to
    pub current_material: Option<String>,
}

/// A skipped or suspicious row. `line` is 1-based within `path` when the deck
/// came from disk, else within the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: Option<PathBuf>,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutcome {
    pub model: Model,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
struct Diagnostics<'s> {
    items: Vec<Diagnostic>,
    map: Option<&'s SourceMap>,
}

impl Diagnostics<'_> {
    /// Record a diagnostic for 1-based buffer line `line`.
    fn warn(&mut self, line: usize, message: String) {
        let (path, line) = match self.map.and_then(|map| map.origin(line)) {
            Some((path, source_line)) => (Some(path.to_path_buf()), source_line),
            None => (None, line),
        };
        match &path {
            Some(path) => warn!("{}:{line}: {message}", path.display()),
            None => warn!("line {line}: {message}"),
        }
        self.items.push(Diagnostic {
            path,
            line,
            message,
        });
    }
}

/// A data line inside a keyword block.
#[derive(Debug, Clone, Copy)]
struct Row<'a> {
    line: usize,
    text: &'a str,
}

impl<'a> Row<'a> {
    fn fields(&self) -> Vec<&'a str> {
        self.text.split(',').map(str::trim).collect()
    }
}

pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with("**")
}

pub(crate) fn is_keyword(line: &str) -> bool {
    line.starts_with('*') && !is_comment(line)
}

/// Parse deck text into a model, discarding diagnostics.
pub fn parse_str(raw: &str) -> Model {
    parse_str_with_diagnostics(raw).model
}

/// Parse deck text into a model plus every row-level diagnostic.
pub fn parse_str_with_diagnostics(raw: &str) -> ParseOutcome {
    parse_lines(raw, None)
}

/// Parse a spliced deck, reporting diagnostics against the file and line each
/// row came from.
pub fn parse_source(source: &SourceText) -> ParseOutcome {
    parse_lines(&source.text, Some(&source.map))
}

fn parse_lines(raw: &str, map: Option<&SourceMap>) -> ParseOutcome {
    let lines: Vec<&str> = raw.lines().collect();
    let mut model = Model::new();
    let mut state = ParserState::default();
    let mut diagnostics = Diagnostics {
        items: Vec::new(),
        map,
    };
    let mut i = 0usize;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        if trimmed.is_empty() || is_comment(trimmed) {
            i += 1;
            continue;
        }

        if !is_keyword(trimmed) {
            // Rows of an unrecognized keyword land here, one line at a time.
            i += 1;
            continue;
        }

        let line_start = i + 1;
        let mut header_text = trimmed.trim_start_matches('*').trim().to_string();
        i += 1;
        if header_text.is_empty() {
            continue;
        }

        // Abaqus-style header continuation with a leading comma.
        while i < lines.len() {
            let next = lines[i].trim();
            if next.starts_with(',') {
                header_text.push_str(next);
                i += 1;
                continue;
            }
            break;
        }

        let header = Header::parse(&header_text);
        i = parse_keyword(
            &header,
            line_start,
            &lines,
            i,
            &mut model,
            &mut state,
            &mut diagnostics,
        );
    }

    debug!(
        "parsed {} nodes, {} elements, {} materials, {} sections",
        model.nodes.len(),
        model.elements.len(),
        model.materials.len(),
        model.sections.len()
    );

    ParseOutcome {
        model,
        diagnostics: diagnostics.items,
    }
}

/// Dispatch one keyword. `body` is the index of the first line after the
/// header; the return value is where the outer scan resumes.
fn parse_keyword(
    header: &Header,
    line_start: usize,
    lines: &[&str],
    body: usize,
    model: &mut Model,
    state: &mut ParserState,
    diags: &mut Diagnostics<'_>,
) -> usize {
    let keyword = header.normalized_keyword();
    let data = || read_block(lines, body);

    match keyword.as_str() {
        "NODE" => {
            let (rows, next) = data();
            parse_nodes(header, &rows, model, diags);
            next
        }
        kw if kw.starts_with("ELEMENT") => {
            let (rows, next) = data();
            parse_elements(header, line_start, &rows, model, diags);
            next
        }
        "MATERIAL" => {
            parse_material(header, line_start, model, state, diags);
            body
        }
        "ELASTIC" => {
            let (rows, next) = data();
            parse_elastic(header, line_start, &rows, model, state, diags);
            next
        }
        "DENSITY" => {
            let (rows, next) = data();
            parse_density(&rows, model, state, diags);
            next
        }
        "SHELLSECTION" | "SOLIDSECTION" => {
            let kind = if keyword == "SHELLSECTION" {
                SectionKind::Shell
            } else {
                SectionKind::Solid
            };
            let (rows, next) = data();
            parse_section(header, kind, &rows, model, diags);
            next
        }
        "BOUNDARY" => {
            let (rows, next) = data();
            parse_boundary(&rows, model, diags);
            next
        }
        "CLOAD" => {
            let (rows, next) = data();
            parse_cload(&rows, model, diags);
            next
        }
        "ELSET" | "NSET" => {
            let key = keyword.as_str();
            let Some(name) = header.value(key) else {
                diags.warn(line_start, format!("*{key} without {key}= name, block skipped"));
                return body;
            };
            let (rows, next) = data();
            let ids = parse_set_ids(header, &rows, diags);
            if key == "ELSET" {
                model.extend_element_set(name, ids);
            } else {
                model.extend_node_set(name, ids);
            }
            next
        }
        _ => {
            debug!("line {line_start}: ignoring *{}", header.keyword);
            body
        }
    }
}

/// Collect data rows from `start` until EOF, a blank line or a keyword line.
/// Comment lines inside the block are skipped.
fn read_block<'a>(lines: &[&'a str], start: usize) -> (Vec<Row<'a>>, usize) {
    let mut rows = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let candidate = lines[i].trim();
        if candidate.is_empty() || is_keyword(candidate) {
            break;
        }
        if !is_comment(candidate) {
            rows.push(Row {
                line: i + 1,
                text: candidate,
            });
        }
        i += 1;
    }
    (rows, i)
}

fn parse_nodes(header: &Header, rows: &[Row], model: &mut Model, diags: &mut Diagnostics<'_>) {
    let nset = header.value("NSET");
    for row in rows {
        let fields = row.fields();
        if fields.len() < 4 {
            diags.warn(
                row.line,
                format!("invalid node row (expected id, x, y, z): {}", row.text),
            );
            continue;
        }
        let parsed = (
            fields[0].parse::<NodeId>(),
            fields[1].parse::<f64>(),
            fields[2].parse::<f64>(),
            fields[3].parse::<f64>(),
        );
        let (Ok(id), Ok(x), Ok(y), Ok(z)) = parsed else {
            diags.warn(row.line, format!("invalid node row: {}", row.text));
            continue;
        };
        model.insert_node(id, [x, y, z]);
        if let Some(name) = nset {
            model.extend_node_set(name, [id]);
        }
    }
}

fn parse_elements(
    header: &Header,
    line_start: usize,
    rows: &[Row],
    model: &mut Model,
    diags: &mut Diagnostics<'_>,
) {
    let Some(element_type) = header.value("TYPE") else {
        diags.warn(
            line_start,
            format!("*{} without TYPE=, block skipped", header.keyword),
        );
        return;
    };
    let elset = header.value("ELSET");

    // A row ending with ',' continues on the next row.
    let mut pending: Option<(usize, String)> = None;
    for row in rows {
        let (line, text) = match pending.take() {
            Some((line, mut text)) => {
                text.push_str(row.text);
                (line, text)
            }
            None => (row.line, row.text.to_string()),
        };
        if text.ends_with(',') {
            pending = Some((line, text));
            continue;
        }
        if let Some(id) = parse_element_row(element_type, line, &text, model, diags)
            && let Some(name) = elset
        {
            model.extend_element_set(name, [id]);
        }
    }
    if let Some((line, text)) = pending
        && let Some(id) = parse_element_row(element_type, line, &text, model, diags)
        && let Some(name) = elset
    {
        model.extend_element_set(name, [id]);
    }
}

fn parse_element_row(
    element_type: &str,
    line: usize,
    text: &str,
    model: &mut Model,
    diags: &mut Diagnostics<'_>,
) -> Option<ElementId> {
    let fields: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() < 2 {
        diags.warn(
            line,
            format!("invalid element row (expected id and nodes): {text}"),
        );
        return None;
    }
    let id = fields[0].parse::<ElementId>().ok();
    let nodes = fields[1..]
        .iter()
        .map(|f| f.parse::<NodeId>())
        .collect::<Result<Vec<_>, _>>()
        .ok();
    match (id, nodes) {
        (Some(id), Some(nodes)) => {
            model.insert_element(id, Element::new(element_type, nodes));
            Some(id)
        }
        _ => {
            diags.warn(line, format!("invalid element row: {text}"));
            None
        }
    }
}

fn parse_material(
    header: &Header,
    line_start: usize,
    model: &mut Model,
    state: &mut ParserState,
    diags: &mut Diagnostics<'_>,
) {
    match header.value("NAME") {
        Some(name) => {
            model.material_entry(name);
            state.current_material = Some(name.to_string());
        }
        None => {
            diags.warn(line_start, "*MATERIAL without NAME=".to_string());
            state.current_material = None;
        }
    }
}

fn parse_elastic(
    header: &Header,
    line_start: usize,
    rows: &[Row],
    model: &mut Model,
    state: &ParserState,
    diags: &mut Diagnostics<'_>,
) {
    let Some(name) = state.current_material.as_deref() else {
        debug!("line {line_start}: *ELASTIC outside a material, ignored");
        return;
    };
    if let Some(kind) = header.value("TYPE")
        && !kind.eq_ignore_ascii_case("ISOTROPIC")
    {
        diags.warn(
            line_start,
            format!("*ELASTIC, TYPE={kind} is read as isotropic E, nu"),
        );
    }
    for row in rows {
        let fields = row.fields();
        if fields.len() < 2 {
            diags.warn(
                row.line,
                format!("invalid elastic row (expected E, nu): {}", row.text),
            );
            continue;
        }
        let (Ok(e), Ok(nu)) = (fields[0].parse::<f64>(), fields[1].parse::<f64>()) else {
            diags.warn(row.line, format!("invalid elastic row: {}", row.text));
            continue;
        };
        let material = model.material_entry(name);
        material.elastic_modulus = Some(e);
        material.poissons_ratio = Some(nu);
    }
}

fn parse_density(rows: &[Row], model: &mut Model, state: &ParserState, diags: &mut Diagnostics<'_>) {
    let Some(name) = state.current_material.as_deref() else {
        debug!("*DENSITY outside a material, ignored");
        return;
    };
    for row in rows {
        let fields = row.fields();
        match fields[0].parse::<f64>() {
            Ok(rho) => model.material_entry(name).density = Some(rho),
            Err(_) => diags.warn(row.line, format!("invalid density row: {}", row.text)),
        }
    }
}

fn parse_section(
    header: &Header,
    kind: SectionKind,
    rows: &[Row],
    model: &mut Model,
    diags: &mut Diagnostics<'_>,
) {
    let elset = header.value("ELSET").map(str::to_string);
    let name = elset
        .clone()
        .unwrap_or_else(|| format!("section_{}", model.sections.len() + 1));

    let thickness = match rows.first() {
        Some(row) => {
            let first = row.fields()[0];
            match first.parse::<f64>() {
                Ok(t) => t,
                Err(_) => {
                    if !first.is_empty() {
                        diags.warn(
                            row.line,
                            format!("invalid section thickness {first:?}, using {DEFAULT_THICKNESS}"),
                        );
                    }
                    DEFAULT_THICKNESS
                }
            }
        }
        None => DEFAULT_THICKNESS,
    };

    model.upsert_section(Section {
        name,
        kind,
        material: header.value("MATERIAL").map(str::to_string),
        thickness,
        elset,
    });
}

/// Resolve the node field of a boundary or load row: a node id or the name of
/// a node set declared earlier in the deck.
fn resolve_nodes(model: &Model, field: &str) -> Option<Vec<NodeId>> {
    match field.parse::<NodeId>() {
        Ok(id) => Some(vec![id]),
        Err(_) => model.node_set(field).map(<[NodeId]>::to_vec),
    }
}

fn parse_boundary(rows: &[Row], model: &mut Model, diags: &mut Diagnostics<'_>) {
    for row in rows {
        let fields = row.fields();
        if fields.len() < 2 {
            diags.warn(
                row.line,
                format!("invalid boundary row (expected node, first_dof[, last_dof[, value]]): {}", row.text),
            );
            continue;
        }
        let Some(nodes) = resolve_nodes(model, fields[0]) else {
            diags.warn(
                row.line,
                format!("unknown node or node set in boundary: {}", fields[0]),
            );
            continue;
        };
        let Ok(first) = fields[1].parse::<i32>() else {
            diags.warn(row.line, format!("invalid first DOF in boundary: {}", fields[1]));
            continue;
        };
        let last = match fields.get(2).filter(|f| !f.is_empty()) {
            Some(f) => match f.parse::<i32>() {
                Ok(last) => last,
                Err(_) => {
                    diags.warn(row.line, format!("invalid last DOF in boundary: {f}"));
                    continue;
                }
            },
            None => first,
        };
        if let Some(f) = fields.get(3).filter(|f| !f.is_empty()) {
            match f.parse::<f64>() {
                Ok(value) if value != 0.0 => {
                    debug!("line {}: prescribed value {value} is not retained", row.line);
                }
                Ok(_) => {}
                Err(_) => {
                    diags.warn(row.line, format!("invalid boundary value: {f}"));
                    continue;
                }
            }
        }
        if first > last || dof_index(first).is_none() || dof_index(last).is_none() {
            diags.warn(
                row.line,
                format!("boundary DOF range {first}..{last} is not within 1..6"),
            );
        }
        for node in nodes {
            model.fix_dofs(node, first, last);
        }
    }
}

fn parse_cload(rows: &[Row], model: &mut Model, diags: &mut Diagnostics<'_>) {
    for row in rows {
        let fields = row.fields();
        if fields.len() < 3 {
            diags.warn(
                row.line,
                format!("invalid cload row (expected node, dof, magnitude): {}", row.text),
            );
            continue;
        }
        let Some(nodes) = resolve_nodes(model, fields[0]) else {
            diags.warn(
                row.line,
                format!("unknown node or node set in cload: {}", fields[0]),
            );
            continue;
        };
        let (Ok(dof), Ok(magnitude)) = (fields[1].parse::<i32>(), fields[2].parse::<f64>()) else {
            diags.warn(row.line, format!("invalid cload row: {}", row.text));
            continue;
        };
        if dof_index(dof).is_none() {
            diags.warn(row.line, format!("cload DOF {dof} is not within 1..6"));
            continue;
        }
        for node in nodes {
            model.set_load(node, dof, magnitude);
        }
    }
}

fn parse_set_ids(header: &Header, rows: &[Row], diags: &mut Diagnostics<'_>) -> Vec<i32> {
    let mut ids = Vec::new();
    if header.has_flag("GENERATE") {
        for row in rows {
            let parsed: Result<Vec<i32>, _> = row
                .fields()
                .into_iter()
                .filter(|f| !f.is_empty())
                .map(str::parse::<i32>)
                .collect();
            let (first, last, step) = match parsed.as_deref() {
                Ok([first, last]) => (*first, *last, 1),
                Ok([first, last, step]) if *step > 0 => (*first, *last, *step),
                _ => {
                    diags.warn(
                        row.line,
                        format!("invalid generate row (expected first, last[, step]): {}", row.text),
                    );
                    continue;
                }
            };
            if first > last {
                diags.warn(row.line, format!("empty generate range {first}..{last}"));
                continue;
            }
            let count = (i64::from(last) - i64::from(first)) / i64::from(step) + 1;
            if count > MAX_GENERATED_IDS {
                diags.warn(
                    row.line,
                    format!("generate range {first}..{last} yields {count} ids, limit is {MAX_GENERATED_IDS}"),
                );
                continue;
            }
            ids.extend((first..=last).step_by(step as usize));
        }
        return ids;
    }

    for row in rows {
        for token in row.fields() {
            if token.is_empty() {
                continue;
            }
            match token.parse::<i32>() {
                Ok(id) => ids.push(id),
                Err(_) => debug!("line {}: discarding set token {token:?}", row.line),
            }
        }
    }
    ids
}
