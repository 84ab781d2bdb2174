//! OBO 1.2/1.4 stanza parser.
//!
//! Reads the header and every `[Term]` and `[Typedef]` stanza of an OBO file
//! into flat records. Relationship tags are emitted as separate records in
//! file order; parents may be declared after the children that reference
//! them.

use crate::error::{ParseError, Result};
use crate::record::{
    OboHeader, ParsedOntology, RelationshipRecord, Synonym, SynonymScope, TermRecord,
};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Relationship label used for `is_a` tags.
const IS_A: &str = "is_a";

/// Parser for OBO flat files.
pub struct OboParser;

impl OboParser {
    /// Reads and parses an OBO file from disk.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedOntology> {
        let path = path.as_ref();
        debug!("Reading ontology file {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parses OBO content.
    ///
    /// Fails only on lines that are not `tag: value` pairs or stanza
    /// headers. A `[Term]` stanza without an `id` is skipped with a warning.
    pub fn parse_str(content: &str) -> Result<ParsedOntology> {
        let mut parsed = ParsedOntology::default();
        let mut stanza: Option<Stanza> = None;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('!') {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(ParseError::Malformed {
                        line: line_no,
                        message: format!("unterminated stanza header `{}`", line),
                    });
                }
                if let Some(finished) = stanza.take() {
                    finished.finish(&mut parsed);
                }
                stanza = Some(Stanza::open(&line[1..line.len() - 1], line_no));
                continue;
            }

            let Some((tag, value)) = line.split_once(':') else {
                return Err(ParseError::Malformed {
                    line: line_no,
                    message: format!("expected `tag: value`, found `{}`", line),
                });
            };
            let (tag, value) = (tag.trim(), value.trim());
            if tag.is_empty() || tag.contains(char::is_whitespace) {
                return Err(ParseError::Malformed {
                    line: line_no,
                    message: format!("invalid tag in `{}`", line),
                });
            }

            match stanza.as_mut() {
                Some(open) => open.tags.push((tag.to_string(), value.to_string())),
                None => Self::header_tag(&mut parsed.header, tag, value),
            }
        }

        if let Some(finished) = stanza.take() {
            finished.finish(&mut parsed);
        }

        if let Some(default_ns) = parsed.header.default_namespace.clone() {
            for term in parsed.terms.iter_mut().filter(|t| t.namespace.is_none()) {
                term.namespace = Some(default_ns.clone());
            }
        }

        info!(
            "Parsed {} terms, {} relationships and {} typedefs",
            parsed.terms.len(),
            parsed.relationships.len(),
            parsed.typedefs.len()
        );

        Ok(parsed)
    }

    fn header_tag(header: &mut OboHeader, tag: &str, value: &str) {
        let value = Some(value.to_string());
        match tag {
            "format-version" => header.format_version = value,
            "data-version" => header.data_version = value,
            "default-namespace" => header.default_namespace = value,
            "ontology" => header.ontology = value,
            _ => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StanzaKind {
    Term,
    Typedef,
    Other(String),
}

/// Tags of the stanza currently being read.
struct Stanza {
    kind: StanzaKind,
    line: usize,
    tags: Vec<(String, String)>,
}

impl Stanza {
    fn open(name: &str, line: usize) -> Self {
        let kind = match name.trim() {
            "Term" => StanzaKind::Term,
            "Typedef" => StanzaKind::Typedef,
            other => StanzaKind::Other(other.to_string()),
        };
        Self {
            kind,
            line,
            tags: Vec::new(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == "id")
            .map(|(_, value)| value.as_str())
    }

    fn finish(self, parsed: &mut ParsedOntology) {
        match self.kind {
            StanzaKind::Term => {
                if self.id().is_some() {
                    let (term, relationships) = self.into_term();
                    parsed.terms.push(term);
                    parsed.relationships.extend(relationships);
                } else {
                    warn!("Skipping [Term] stanza at line {} without an id", self.line);
                }
            }
            StanzaKind::Typedef => match self.id() {
                Some(id) => parsed.typedefs.push(id.to_string()),
                None => warn!("Skipping [Typedef] stanza at line {} without an id", self.line),
            },
            StanzaKind::Other(ref name) => {
                debug!("Ignoring [{}] stanza at line {}", name, self.line);
            }
        }
    }

    fn into_term(self) -> (TermRecord, Vec<RelationshipRecord>) {
        let mut term = TermRecord::new(self.id().unwrap_or_default());
        let mut relationships = Vec::new();

        for (tag, value) in self.tags {
            match tag.as_str() {
                "id" => {}
                "name" => term.name = Some(value),
                "namespace" => term.namespace = Some(value),
                "def" => term.definition = Some(quoted_text(&value).0),
                "comment" => term.comment = Some(value),
                "is_obsolete" => term.is_obsolete = value == "true",
                "alt_id" => term.alt_ids.push(value),
                "xref" | "xref_analog" => term.xrefs.push(strip_trailing_comment(&value)),
                "subset" => term.subsets.push(value),
                "synonym" => term.synonyms.push(parse_synonym(&value, None)),
                "is_a" => match relation_target(&value).first() {
                    Some(parent) => relationships.push(RelationshipRecord::new(
                        term.id.as_str(),
                        IS_A,
                        parent.as_str(),
                    )),
                    None => warn!("Empty is_a tag on term {}", term.id),
                },
                "relationship" => match relation_target(&value).as_slice() {
                    [rel, parent, ..] => relationships.push(RelationshipRecord::new(
                        term.id.as_str(),
                        rel.as_str(),
                        parent.as_str(),
                    )),
                    _ => warn!("Malformed relationship `{}` on term {}", value, term.id),
                },
                other => match SynonymScope::from_legacy_tag(other) {
                    Some(scope) => term.synonyms.push(parse_synonym(&value, Some(scope))),
                    None => term.extra.entry(other.to_string()).or_default().push(value),
                },
            }
        }

        (term, relationships)
    }
}

/// Removes a trailing `! comment` and any `{qualifier}` block.
fn strip_trailing_comment(value: &str) -> String {
    let end = value
        .find(" !")
        .into_iter()
        .chain(value.find('{'))
        .min()
        .unwrap_or(value.len());
    value[..end].trim().to_string()
}

/// Splits an `is_a`/`relationship` value into its whitespace tokens.
fn relation_target(value: &str) -> Vec<String> {
    strip_trailing_comment(value)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Extracts the leading quoted string, honouring `\"` escapes.
///
/// Returns the unescaped text and whatever follows the closing quote. A
/// value with no opening quote is returned whole.
fn quoted_text(value: &str) -> (String, &str) {
    let Some(start) = value.find('"') else {
        return (value.to_string(), "");
    };

    let body = &value[start + 1..];
    let mut text = String::new();
    let mut escaped = false;
    for (offset, ch) in body.char_indices() {
        match ch {
            _ if escaped => {
                text.push(ch);
                escaped = false;
            }
            '\\' => escaped = true,
            '"' => return (text, &body[offset + 1..]),
            _ => text.push(ch),
        }
    }

    (text, "")
}

/// Parses `"text" SCOPE [TYPE] [xref, ...]`.
///
/// Legacy tags pass their scope in; a modern tag without a recognised scope
/// token defaults to `RELATED`.
fn parse_synonym(value: &str, legacy_scope: Option<SynonymScope>) -> Synonym {
    let (text, rest) = quoted_text(value);
    let (head, xref_block) = match rest.find('[') {
        Some(open) => (&rest[..open], &rest[open + 1..]),
        None => (rest, ""),
    };

    let scope = legacy_scope
        .or_else(|| {
            head.split_whitespace()
                .next()
                .and_then(|token| SynonymScope::from_str(token).ok())
        })
        .unwrap_or(SynonymScope::Related);

    let xrefs = xref_block
        .split(']')
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|xref| !xref.is_empty())
        .map(str::to_string)
        .collect();

    Synonym { text, scope, xrefs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"format-version: 1.2
data-version: releases/2024-01-17
default-namespace: gene_ontology
ontology: go

[Term]
id: GO:0008150
name: biological_process
namespace: biological_process
def: "A biological process is the execution of a genetically-encoded \"program\"." [GOC:pdt]
synonym: "physiological process" EXACT []

[Term]
id: GO:0009987
name: cellular process
namespace: biological_process
is_a: GO:0008150 ! biological_process
relationship: part_of GO:0000001 {source="GOC"} ! placeholder
subset: goslim_generic
created_by: curator

[Term]
id: GO:0000003
name: reproduction
is_obsolete: true
exact_synonym: "reproductive physiological process" [GOC:isa_complete, ISBN:0198506732]

[Term]
name: orphan stanza

[Typedef]
id: part_of
name: part of

[Instance]
id: something
"#;

    #[test]
    fn test_parse_header() {
        let parsed = OboParser::parse_str(SAMPLE).unwrap();
        assert_eq!(parsed.header.format_version.as_deref(), Some("1.2"));
        assert_eq!(
            parsed.header.default_namespace.as_deref(),
            Some("gene_ontology")
        );
        assert_eq!(parsed.header.ontology.as_deref(), Some("go"));
    }

    #[test]
    fn test_parse_terms() {
        let parsed = OboParser::parse_str(SAMPLE).unwrap();
        assert_eq!(parsed.terms.len(), 3, "stanza without id is skipped");

        let root = &parsed.terms[0];
        assert_eq!(root.id, "GO:0008150");
        assert_eq!(
            root.definition.as_deref(),
            Some("A biological process is the execution of a genetically-encoded \"program\".")
        );
        assert_eq!(root.synonyms.len(), 1);
        assert_eq!(root.synonyms[0].scope, SynonymScope::Exact);

        let cellular = &parsed.terms[1];
        assert_eq!(cellular.subsets, vec!["goslim_generic".to_string()]);
        assert_eq!(cellular.extra["created_by"], vec!["curator".to_string()]);
    }

    #[test]
    fn test_default_namespace_and_obsolete() {
        let parsed = OboParser::parse_str(SAMPLE).unwrap();
        let obsolete = &parsed.terms[2];
        assert!(obsolete.is_obsolete);
        assert_eq!(obsolete.namespace.as_deref(), Some("gene_ontology"));
        assert_eq!(obsolete.synonyms[0].scope, SynonymScope::Exact);
        assert_eq!(
            obsolete.synonyms[0].xrefs,
            vec!["GOC:isa_complete".to_string(), "ISBN:0198506732".to_string()]
        );
    }

    #[test]
    fn test_parse_relationships() {
        let parsed = OboParser::parse_str(SAMPLE).unwrap();
        assert_eq!(
            parsed.relationships,
            vec![
                RelationshipRecord::new("GO:0009987", "is_a", "GO:0008150"),
                RelationshipRecord::new("GO:0009987", "part_of", "GO:0000001"),
            ]
        );
        assert_eq!(parsed.typedefs, vec!["part_of".to_string()]);
    }

    #[test]
    fn test_malformed_line() {
        let err = OboParser::parse_str("[Term]\nid GO:1\n").unwrap_err();
        match err {
            ParseError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_tag_is_malformed() {
        let err = OboParser::parse_str("[Term]\nid: GO:1\n: orphan value\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_synonym_without_scope() {
        let synonym = parse_synonym("\"cell growth\" []", None);
        assert_eq!(synonym.text, "cell growth");
        assert_eq!(synonym.scope, SynonymScope::Related);
        assert!(synonym.xrefs.is_empty());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let parsed = OboParser::parse_file(file.path()).unwrap();
        assert_eq!(parsed.terms.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = OboParser::parse_file("/nonexistent/vocdag.obo").unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
