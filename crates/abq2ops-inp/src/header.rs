//! Keyword header lines: `*KEYWORD, KEY=value, FLAG, ...`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Upper-cased key
    pub key: String,
    /// Value with its original case, surrounding quotes removed
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Upper-cased keyword as written, e.g. `SHELL SECTION`
    pub keyword: String,
    pub parameters: Vec<Parameter>,
}

impl Header {
    /// Parse a header with the leading `*` already removed.
    pub fn parse(header: &str) -> Self {
        let fields = split_header_fields(header);
        let keyword = fields
            .first()
            .map(|s| s.trim().to_ascii_uppercase())
            .unwrap_or_default();

        let mut parameters = Vec::new();
        for part in fields.iter().skip(1) {
            let item = part.trim();
            if item.is_empty() {
                continue;
            }
            if let Some((k, v)) = item.split_once('=') {
                parameters.push(Parameter {
                    key: k.trim().to_ascii_uppercase(),
                    value: Some(unquote(v).to_string()),
                });
            } else {
                parameters.push(Parameter {
                    key: item.to_ascii_uppercase(),
                    value: None,
                });
            }
        }

        Self {
            keyword,
            parameters,
        }
    }

    /// Keyword with whitespace and underscores dropped, e.g. `SHELLSECTION`.
    pub fn normalized_keyword(&self) -> String {
        normalized_keyword(&self.keyword)
    }

    /// Value of `key` (case-insensitive), if present with a non-empty value.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .and_then(|p| p.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// True when `key` appears, with or without a value.
    pub fn has_flag(&self, key: &str) -> bool {
        self.parameters
            .iter()
            .any(|p| p.key.eq_ignore_ascii_case(key))
    }
}

pub fn normalized_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_ascii_uppercase()
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}

fn split_header_fields(header: &str) -> Vec<String> {
    let mut fields = Vec::<String>::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;

    for ch in header.chars() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(ch);
            }
            ',' if !in_single && !in_double => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keyword_and_parameters() {
        let h = Header::parse("Shell Section, elset=Plate, material=Steel");
        assert_eq!(h.keyword, "SHELL SECTION");
        assert_eq!(h.normalized_keyword(), "SHELLSECTION");
        assert_eq!(h.value("ELSET"), Some("Plate"));
        assert_eq!(h.value("material"), Some("Steel"));
        assert_eq!(h.value("TYPE"), None);
    }

    #[test]
    fn keeps_commas_inside_quotes() {
        let h = Header::parse("INCLUDE, INPUT=\"mesh,part.inc\"");
        assert_eq!(h.value("INPUT"), Some("mesh,part.inc"));
    }

    #[test]
    fn flags_have_no_value() {
        let h = Header::parse("NSET, NSET=Edge, GENERATE");
        assert!(h.has_flag("generate"));
        assert_eq!(h.value("GENERATE"), None);
    }

    #[test]
    fn empty_values_are_absent() {
        let h = Header::parse("MATERIAL, NAME=");
        assert_eq!(h.value("NAME"), None);
    }
}
