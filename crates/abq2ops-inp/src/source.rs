//! Reading deck text from disk: encoding fallback and `*INCLUDE` splicing.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{InpError, Result};
use crate::header::Header;
use crate::parser::{is_comment, is_keyword};

/// Read a deck as text. UTF-8 is tried first; anything else is decoded as
/// Latin-1, which maps every byte to a char.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| InpError::io(path, e))?;
    decode(path, bytes)
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            debug!("{} is not valid UTF-8, falling back to Latin-1", path.display());
            let bytes = err.into_bytes();
            if bytes.contains(&0) {
                return Err(InpError::Encoding {
                    path: path.to_path_buf(),
                });
            }
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Maps each line of a spliced deck buffer back to the file and 1-based line
/// it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    files: Vec<PathBuf>,
    /// `(index into files, source line)` per buffer line
    lines: Vec<(usize, usize)>,
}

impl SourceMap {
    /// Identity map for a deck read without include expansion.
    pub fn single(path: impl Into<PathBuf>, line_count: usize) -> Self {
        Self {
            files: vec![path.into()],
            lines: (1..=line_count).map(|line| (0, line)).collect(),
        }
    }

    /// Origin of 1-based buffer line `line`.
    pub fn origin(&self, line: usize) -> Option<(&Path, usize)> {
        let (file, source_line) = *self.lines.get(line.checked_sub(1)?)?;
        Some((self.files.get(file)?.as_path(), source_line))
    }

    fn push_line(&mut self, path: &Path, line: usize) {
        let file = match self.files.iter().position(|f| f == path) {
            Some(index) => index,
            None => {
                self.files.push(path.to_path_buf());
                self.files.len() - 1
            }
        };
        self.lines.push((file, line));
    }
}

/// Deck text with every include spliced in, plus where each line came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    pub map: SourceMap,
}

/// Read a deck and splice every `*INCLUDE, INPUT=...` target in place, right
/// after its include card. Relative paths resolve against the including file.
pub fn read_with_includes(path: impl AsRef<Path>) -> Result<SourceText> {
    let mut include_stack = Vec::<PathBuf>::new();
    let mut active = HashSet::<PathBuf>::new();
    let mut out = SourceText::default();
    expand_into(path.as_ref(), &mut include_stack, &mut active, &mut out)?;
    Ok(out)
}

fn expand_into(
    path: &Path,
    include_stack: &mut Vec<PathBuf>,
    active: &mut HashSet<PathBuf>,
    out: &mut SourceText,
) -> Result<()> {
    let normalized_path = normalize_path(path);
    if active.contains(&normalized_path) {
        let mut chain = include_stack
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        chain.push(normalized_path.display().to_string());
        return Err(InpError::IncludeCycle(chain.join(" -> ")));
    }

    include_stack.push(normalized_path.clone());
    active.insert(normalized_path);

    let result = (|| -> Result<()> {
        let raw = read_text(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        for (index, line) in raw.lines().enumerate() {
            out.text.push_str(line);
            out.text.push('\n');
            out.map.push_line(path, index + 1);

            let trimmed = line.trim();
            if !is_keyword(trimmed) || is_comment(trimmed) {
                continue;
            }
            let header = Header::parse(trimmed.trim_start_matches('*'));
            if header.normalized_keyword() != "INCLUDE" {
                continue;
            }
            let target = header
                .value("INPUT")
                .ok_or(InpError::MissingIncludeInput { line: index + 1 })?;
            let include_path = resolve_include_path(base_dir, target);
            debug!("expanding include {}", include_path.display());
            expand_into(&include_path, include_stack, active, out)?;
        }
        Ok(())
    })();

    if let Some(path) = include_stack.pop() {
        active.remove(&path);
    }

    result
}

fn resolve_include_path(base_dir: &Path, include: &str) -> PathBuf {
    let raw_path = Path::new(include.trim());
    let joined = if raw_path.is_absolute() {
        raw_path.to_path_buf()
    } else {
        base_dir.join(raw_path)
    };
    normalize_path(&joined)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_fallback_decodes_every_byte() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("latin1.inp");
        // "** Stahl Träger" with a Latin-1 encoded umlaut
        let mut bytes = b"** Stahl Tr".to_vec();
        bytes.push(0xE4);
        bytes.extend_from_slice(b"ger\n*NODE\n1,0,0,0\n");
        fs::write(&path, bytes).expect("write");

        let text = read_text(&path).expect("latin-1 fallback");
        assert!(text.starts_with("** Stahl Träger"));
    }

    #[test]
    fn binary_content_is_an_encoding_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("blob.inp");
        fs::write(&path, [0xFF, 0x00, 0xFE]).expect("write");

        let err = read_text(&path).expect_err("binary should fail");
        assert!(matches!(err, InpError::Encoding { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = read_text(dir.path().join("nope.inp")).expect_err("missing");
        assert!(matches!(err, InpError::FileNotFound(_)));
    }

    #[test]
    fn includes_are_spliced_after_their_card() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("root.inp");
        let mid = dir.path().join("mid.inc");
        let leaf = dir.path().join("leaf.inc");
        fs::write(&root, "*NODE\n1,0,0,0\n*INCLUDE,INPUT=mid.inc\n*CLOAD\n1,1,5.\n")
            .expect("write root");
        fs::write(&mid, "*INCLUDE,INPUT=leaf.inc\n*NODE\n2,1,0,0\n").expect("write mid");
        fs::write(&leaf, "*MATERIAL,NAME=STEEL\n").expect("write leaf");

        let source = read_with_includes(&root).expect("expand");
        let lines: Vec<&str> = source.text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "*NODE",
                "1,0,0,0",
                "*INCLUDE,INPUT=mid.inc",
                "*INCLUDE,INPUT=leaf.inc",
                "*MATERIAL,NAME=STEEL",
                "*NODE",
                "2,1,0,0",
                "*CLOAD",
                "1,1,5.",
            ]
        );

        // Buffer line 5 is leaf.inc line 1; buffer line 8 is root.inp line 4.
        let (file, line) = source.map.origin(5).expect("origin of line 5");
        assert!(file.ends_with("leaf.inc"));
        assert_eq!(line, 1);
        let (file, line) = source.map.origin(8).expect("origin of line 8");
        assert!(file.ends_with("root.inp"));
        assert_eq!(line, 4);
        assert_eq!(source.map.origin(0), None);
        assert_eq!(source.map.origin(10), None);
    }

    #[test]
    fn single_map_is_identity() {
        let map = SourceMap::single("deck.inp", 3);
        assert_eq!(map.origin(2), Some((Path::new("deck.inp"), 2)));
        assert_eq!(map.origin(4), None);
    }

    #[test]
    fn include_cycles_are_detected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let a = dir.path().join("a.inp");
        let b = dir.path().join("b.inc");
        fs::write(&a, "*INCLUDE,INPUT=b.inc\n").expect("write a");
        fs::write(&b, "*INCLUDE,INPUT=a.inp\n").expect("write b");

        let err = read_with_includes(&a).expect_err("cycle should fail");
        assert!(matches!(err, InpError::IncludeCycle(_)));
    }

    #[test]
    fn include_without_input_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("root.inp");
        fs::write(&root, "*NODE\n1,0,0,0\n*INCLUDE\n").expect("write root");

        let err = read_with_includes(&root).expect_err("missing INPUT");
        assert!(matches!(err, InpError::MissingIncludeInput { line: 3 }));
    }

    #[test]
    fn quoted_include_path_with_comma() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("root.inp");
        fs::write(&root, "*INCLUDE, INPUT='leaf,part.inc'\n").expect("write root");
        fs::write(dir.path().join("leaf,part.inc"), "*NODE\n3,0,0,1\n").expect("write leaf");

        let source = read_with_includes(&root).expect("expand");
        assert!(source.text.contains("3,0,0,1"));
    }
}
