//! Schema document and `$ref` resolution.
//!
//! A [`SchemaDocument`] owns the parsed schema tree. Every `$ref` string found
//! in the tree is decoded into a JSON Pointer once, at construction, so
//! resolution during validation is a map lookup followed by
//! [`Value::pointer`]. Nodes are addressed by reference string rather than by
//! links between nodes, so `$ref` cycles never become ownership cycles.
//!
//! Only same-document fragment references (`#`, `#/components/schemas/Pet`)
//! resolve. Regular expressions used by `pattern` and `patternProperties` are
//! compiled during the same walk.

use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// Parsed schema document with a prebuilt reference index
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    root: Value,
    /// `$ref` string -> decoded JSON Pointer (only references that resolve)
    references: HashMap<String, String>,
    /// `$ref` strings that did not resolve at construction
    dangling: Vec<String>,
    /// Pattern source -> compiled regex
    patterns: HashMap<String, Regex>,
}

impl SchemaDocument {
    /// Take ownership of a schema tree and index its references
    pub fn new(root: Value) -> Self {
        let mut found_refs = Vec::new();
        let mut found_patterns = Vec::new();
        collect(&root, &mut found_refs, &mut found_patterns);

        let mut references = HashMap::new();
        let mut dangling = Vec::new();
        for reference in found_refs {
            if references.contains_key(reference) || dangling.iter().any(|d| d == reference) {
                continue;
            }
            match fragment_pointer(reference) {
                Some(pointer) if root.pointer(&pointer).is_some() => {
                    references.insert(reference.to_string(), pointer);
                }
                _ => {
                    tracing::warn!(
                        reference,
                        "schema reference does not resolve within the document"
                    );
                    dangling.push(reference.to_string());
                }
            }
        }

        let mut patterns = HashMap::new();
        for source in found_patterns {
            if patterns.contains_key(source) {
                continue;
            }
            match Regex::new(source) {
                Ok(re) => {
                    patterns.insert(source.to_string(), re);
                }
                Err(e) => tracing::warn!(pattern = source, error = %e, "invalid pattern in schema"),
            }
        }

        tracing::debug!(
            references = references.len(),
            dangling = dangling.len(),
            patterns = patterns.len(),
            "indexed schema document"
        );

        Self {
            root,
            references,
            dangling,
            patterns,
        }
    }

    /// The document root
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resolve a reference string to the node it points at.
    ///
    /// Indexed references are looked up directly; anything else (for example
    /// an implicit discriminator reference) is decoded on demand.
    pub fn resolve(&self, reference: &str) -> Option<&Value> {
        match self.references.get(reference) {
            Some(pointer) => self.root.pointer(pointer),
            None => fragment_pointer(reference).and_then(|pointer| self.root.pointer(&pointer)),
        }
    }

    /// Number of distinct references that resolved at construction
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// References found in the document that point nowhere
    pub fn dangling_references(&self) -> &[String] {
        &self.dangling
    }

    /// Compiled regex for a pattern, compiling on the spot if it was not seen
    /// during indexing
    pub(crate) fn pattern(&self, source: &str) -> Result<Cow<'_, Regex>, regex::Error> {
        match self.patterns.get(source) {
            Some(re) => Ok(Cow::Borrowed(re)),
            None => Regex::new(source).map(Cow::Owned),
        }
    }
}

fn collect<'a>(value: &'a Value, refs: &mut Vec<&'a str>, patterns: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) => refs.push(reference),
                    ("pattern", Value::String(source)) => patterns.push(source),
                    ("patternProperties", Value::Object(props)) => {
                        patterns.extend(props.keys().map(String::as_str));
                    }
                    _ => {}
                }
                collect(child, refs, patterns);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, refs, patterns);
            }
        }
        _ => {}
    }
}

/// Decode a fragment reference (`#/a/b%20c`) into a JSON Pointer (`/a/b c`).
///
/// `~0` / `~1` escapes are left for [`Value::pointer`] to handle.
fn fragment_pointer(reference: &str) -> Option<String> {
    let fragment = reference.strip_prefix('#')?;
    if !fragment.is_empty() && !fragment.starts_with('/') {
        // Plain-name anchors are not supported
        return None;
    }
    percent_decode(fragment)
}

fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_string());
    }
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> SchemaDocument {
        SchemaDocument::new(json!({
            "$ref": "#/components/schemas/Pet",
            "components": {
                "schemas": {
                    "Pet": {
                        "properties": {
                            "tag": {"$ref": "#/components/schemas/Pet%20Tag"},
                            "owner": {"$ref": "#/components/schemas/Missing"},
                            "code": {"type": "string", "pattern": "^[A-Z]{3}$"}
                        }
                    },
                    "Pet Tag": {"type": "string"},
                    "a/b": {"type": "integer"}
                }
            }
        }))
    }

    #[test]
    fn test_indexes_resolvable_references() {
        let doc = document();
        assert_eq!(doc.reference_count(), 2);
        assert_eq!(doc.dangling_references(), ["#/components/schemas/Missing"]);
    }

    #[test]
    fn test_resolve_percent_encoded_reference() {
        let doc = document();
        assert_eq!(
            doc.resolve("#/components/schemas/Pet%20Tag"),
            Some(&json!({"type": "string"}))
        );
    }

    #[test]
    fn test_resolve_unindexed_reference_on_demand() {
        let doc = document();
        assert_eq!(
            doc.resolve("#/components/schemas/a~1b"),
            Some(&json!({"type": "integer"}))
        );
        assert_eq!(doc.resolve("#"), Some(doc.root()));
        assert!(doc.resolve("#/components/schemas/other").is_none());
    }

    #[test]
    fn test_remote_and_anchor_references_do_not_resolve() {
        let doc = document();
        assert!(doc.resolve("https://example.com/pet.json").is_none());
        assert!(doc.resolve("#pet").is_none());
        assert!(doc.resolve("#/bad%2").is_none());
    }

    #[test]
    fn test_patterns_are_precompiled() {
        let doc = document();
        assert!(matches!(doc.pattern("^[A-Z]{3}$"), Ok(Cow::Borrowed(_))));
        assert!(matches!(doc.pattern("^x$"), Ok(Cow::Owned(_))));
        assert!(doc.pattern("(").is_err());
    }
}
