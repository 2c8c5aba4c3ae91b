//! Graph serializations: Turtle and JSON-LD
//!
//! Both renderings compact IRIs against the registry's prefix table and walk
//! the basket in term order, so output is byte-stable for a given walk.

use std::fmt::Write as _;

use serde_json::{json, Map, Value};

use crate::error::MetadataError;
use crate::graph::{Basket, Term};
use crate::vocab::{term, RDF, VocabRegistry};

/// Compact an IRI to `prefix:local` when the local part is a simple name
fn compact(iri: &str, prefixes: &[(&'static str, &'static str)]) -> Option<String> {
    for (prefix, namespace) in prefixes {
        if let Some(local) = iri.strip_prefix(namespace) {
            if !local.is_empty()
                && local
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Some(format!("{prefix}:{local}"));
            }
        }
    }
    None
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn turtle_term(t: &Term, prefixes: &[(&'static str, &'static str)]) -> String {
    match t {
        Term::Iri(iri) => compact(iri, prefixes).unwrap_or_else(|| format!("<{iri}>")),
        Term::Literal {
            value,
            language: Some(lang),
        } => format!("\"{}\"@{lang}", escape_literal(value)),
        Term::Literal {
            value,
            language: None,
        } => format!("\"{}\"", escape_literal(value)),
        Term::Blank(n) => format!("_:b{n}"),
    }
}

/// Render the basket as Turtle with a prefix header
pub fn render_turtle(basket: &Basket, vocab: &VocabRegistry) -> String {
    let prefixes = vocab.prefixes();
    let rdf_type = Term::iri(term(RDF, "type"));
    let mut out = String::new();
    for (prefix, namespace) in &prefixes {
        let _ = writeln!(out, "@prefix {prefix}: <{namespace}> .");
    }
    for subject in basket.subjects() {
        out.push('\n');
        let _ = write!(out, "{}", turtle_term(subject, &prefixes));

        // type assertion first, then the rest in term order
        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        let types: Vec<String> = basket
            .objects(subject, &rdf_type)
            .map(|o| turtle_term(o, &prefixes))
            .collect();
        if !types.is_empty() {
            entries.push(("a".to_string(), types));
        }
        let mut current: Option<(Term, Vec<String>)> = None;
        for triple in basket.iter().filter(|t| &t.subject == subject) {
            if triple.predicate == rdf_type {
                continue;
            }
            match &mut current {
                Some((pred, objects)) if *pred == triple.predicate => {
                    objects.push(turtle_term(&triple.object, &prefixes));
                }
                _ => {
                    if let Some((pred, objects)) = current.take() {
                        entries.push((turtle_term(&pred, &prefixes), objects));
                    }
                    current = Some((
                        triple.predicate.clone(),
                        vec![turtle_term(&triple.object, &prefixes)],
                    ));
                }
            }
        }
        if let Some((pred, objects)) = current.take() {
            entries.push((turtle_term(&pred, &prefixes), objects));
        }

        let last = entries.len().saturating_sub(1);
        for (i, (pred, objects)) in entries.iter().enumerate() {
            let separator = if i == last { " ." } else { " ;" };
            if i == 0 {
                let _ = write!(out, " {pred} {}{separator}\n", objects.join(", "));
            } else {
                let _ = write!(out, "    {pred} {}{separator}\n", objects.join(", "));
            }
        }
    }
    out
}

fn jsonld_id(t: &Term, prefixes: &[(&'static str, &'static str)]) -> String {
    match t {
        Term::Iri(iri) => compact(iri, prefixes).unwrap_or_else(|| iri.clone()),
        Term::Blank(n) => format!("_:b{n}"),
        Term::Literal { value, .. } => value.clone(),
    }
}

fn jsonld_object(t: &Term, prefixes: &[(&'static str, &'static str)]) -> Value {
    match t {
        Term::Iri(_) | Term::Blank(_) => json!({ "@id": jsonld_id(t, prefixes) }),
        Term::Literal {
            value,
            language: Some(lang),
        } => json!({ "@value": value, "@language": lang }),
        Term::Literal {
            value,
            language: None,
        } => Value::String(value.clone()),
    }
}

/// Render the basket as a JSON-LD document with `@context` and `@graph`
pub fn render_jsonld(basket: &Basket, vocab: &VocabRegistry) -> Value {
    let prefixes = vocab.prefixes();
    let rdf_type = Term::iri(term(RDF, "type"));
    let mut graph: Vec<Value> = Vec::new();
    for subject in basket.subjects() {
        let mut node = Map::new();
        node.insert("@id".to_string(), Value::String(jsonld_id(subject, &prefixes)));
        let types: Vec<Value> = basket
            .objects(subject, &rdf_type)
            .map(|o| Value::String(jsonld_id(o, &prefixes)))
            .collect();
        if !types.is_empty() {
            node.insert("@type".to_string(), Value::Array(types));
        }
        for triple in basket.iter().filter(|t| &t.subject == subject) {
            if triple.predicate == rdf_type {
                continue;
            }
            let key = jsonld_id(&triple.predicate, &prefixes);
            let value = jsonld_object(&triple.object, &prefixes);
            match node.get_mut(&key) {
                Some(Value::Array(values)) => values.push(value),
                _ => {
                    node.insert(key, Value::Array(vec![value]));
                }
            }
        }
        graph.push(Value::Object(node));
    }
    let context: Map<String, Value> = prefixes
        .iter()
        .map(|(prefix, namespace)| (prefix.to_string(), Value::String(namespace.to_string())))
        .collect();
    json!({
        "@context": Value::Object(context),
        "@graph": graph,
    })
}

/// Pretty-printed JSON-LD document
pub fn render_jsonld_string(basket: &Basket, vocab: &VocabRegistry) -> Result<String, MetadataError> {
    Ok(serde_json::to_string_pretty(&render_jsonld(basket, vocab))?)
}
