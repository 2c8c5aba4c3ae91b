//! Triple graph model: terms, triples, the Focus wrapper, and the Basket
//! accumulator with its query interface.

use std::collections::BTreeSet;
use std::fmt;

use crate::vocab;

/// A node or edge label in the gathered graph
///
/// Terms are totally ordered so the [`Basket`] can hold them in a `BTreeSet`
/// and every serialization of a walk is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// An IRI (node identity or predicate)
    Iri(String),
    /// A literal scalar, optionally language-tagged
    Literal {
        value: String,
        language: Option<String>,
    },
    /// An anonymous node, numbered per walk
    Blank(u64),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: None,
        }
    }

    pub fn literal_with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: Some(language.into()),
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// Text content of the term regardless of kind, for format builders
    /// that only care about the rendered value.
    pub fn text(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal { value, .. } => Some(value),
            Term::Blank(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Literal {
                value,
                language: Some(lang),
            } => write!(f, "\"{value}\"@{lang}"),
            Term::Literal {
                value,
                language: None,
            } => write!(f, "\"{value}\""),
            Term::Blank(n) => write!(f, "_:b{n}"),
        }
    }
}

/// A single (subject, predicate, object) assertion
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// Identity wrapper around a describable same-domain resource
///
/// Two Focus values with equal `iri` are the same graph node. External
/// identifiers (DOI, ORCID, ROR, arbitrary URLs) are never wrapped in a
/// Focus; gatherers emit those as plain [`Term::Iri`] objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Focus {
    pub iri: String,
    pub rdf_type: String,
    pub guid: String,
}

impl Focus {
    pub fn new(vocab: &vocab::VocabRegistry, guid: &str, rdf_type: impl Into<String>) -> Self {
        Self {
            iri: vocab.guid_iri(guid),
            rdf_type: rdf_type.into(),
            guid: guid.to_string(),
        }
    }

    pub fn iri_term(&self) -> Term {
        Term::iri(self.iri.clone())
    }
}

/// Accumulator for the triples gathered during one walk, with query-style
/// lookup over the accumulated set
///
/// Adding the same triple twice is a no-op. Mutated only by gatherer output
/// during the walk; read-only during format building.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Basket {
    triples: BTreeSet<Triple>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert
    pub fn add(&mut self, triple: Triple) {
        self.triples.insert(triple);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        self.triples.contains(&Triple {
            subject: subject.clone(),
            predicate: predicate.clone(),
            object: object.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Objects of all `subject predicate ?o` triples, in term order
    ///
    /// Lazy and restartable: re-querying mid-walk reflects all triples
    /// added so far.
    pub fn objects<'a>(
        &'a self,
        subject: &Term,
        predicate: &Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        let subject = subject.clone();
        let predicate = predicate.clone();
        self.triples
            .iter()
            .filter(move |t| t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// All `(subject, object)` pairs for a predicate, across the whole graph
    pub fn pairs<'a>(&'a self, predicate: &Term) -> impl Iterator<Item = (&'a Term, &'a Term)> + 'a {
        let predicate = predicate.clone();
        self.triples
            .iter()
            .filter(move |t| t.predicate == predicate)
            .map(|t| (&t.subject, &t.object))
    }

    /// Objects reached by following a two-step predicate path from a subject
    pub fn objects_via<'a>(&'a self, subject: &Term, first: &Term, second: &Term) -> Vec<&'a Term> {
        let mut found = Vec::new();
        for mid in self.objects(subject, first).cloned().collect::<Vec<_>>() {
            for obj in self.objects(&mid, second) {
                if !found.contains(&obj) {
                    found.push(obj);
                }
            }
        }
        found
    }

    /// All distinct subjects appearing in the graph, in term order
    pub fn subjects(&self) -> Vec<&Term> {
        let mut subjects: Vec<&Term> = Vec::new();
        for triple in &self.triples {
            if subjects.last() != Some(&&triple.subject) {
                subjects.push(&triple.subject);
            }
        }
        subjects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{term, DCTERMS, RDF};

    fn t(s: &str, p: &str, o: Term) -> Triple {
        Triple::new(Term::iri(s), Term::iri(p), o)
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut basket = Basket::new();
        let triple = t("https://osf.io/abcde", &term(DCTERMS, "title"), Term::literal("hi"));
        basket.add(triple.clone());
        basket.add(triple);
        assert_eq!(basket.len(), 1);
    }

    #[test]
    fn test_objects_query() {
        let mut basket = Basket::new();
        let subj = Term::iri("https://osf.io/abcde");
        let pred = Term::iri(term(DCTERMS, "identifier"));
        basket.add(Triple::new(subj.clone(), pred.clone(), Term::literal("one")));
        basket.add(Triple::new(subj.clone(), pred.clone(), Term::literal("two")));
        basket.add(Triple::new(
            Term::iri("https://osf.io/zzzzz"),
            pred.clone(),
            Term::literal("other"),
        ));

        let objects: Vec<_> = basket.objects(&subj, &pred).collect();
        assert_eq!(objects.len(), 2);
        assert_eq!(basket.pairs(&pred).count(), 3);
    }

    #[test]
    fn test_contains_type_guard() {
        let mut basket = Basket::new();
        let subj = Term::iri("https://osf.io/abcde");
        let a = Term::iri(term(RDF, "type"));
        let registration = Term::iri("https://osf.io/vocab/2023/Registration");
        basket.add(Triple::new(subj.clone(), a.clone(), registration.clone()));
        assert!(basket.contains(&subj, &a, &registration));
        assert!(!basket.contains(&subj, &a, &Term::iri("https://osf.io/vocab/2023/File")));
    }

    #[test]
    fn test_objects_via_path() {
        let mut basket = Basket::new();
        let file = Term::iri("https://osf.io/filef");
        let project = Term::iri("https://osf.io/projp");
        let user = Term::iri("https://osf.io/useru");
        let contained_by = Term::iri(term(crate::vocab::OSF, "isContainedBy"));
        let creator = Term::iri(term(DCTERMS, "creator"));
        basket.add(Triple::new(file.clone(), contained_by.clone(), project.clone()));
        basket.add(Triple::new(project.clone(), creator.clone(), user.clone()));

        let found = basket.objects_via(&file, &contained_by, &creator);
        assert_eq!(found, vec![&user]);
    }

    #[test]
    fn test_subjects_are_distinct_and_ordered() {
        let mut basket = Basket::new();
        let pred = Term::iri(term(DCTERMS, "title"));
        basket.add(t("https://osf.io/bbbbb", &term(DCTERMS, "title"), Term::literal("b")));
        basket.add(Triple::new(
            Term::iri("https://osf.io/aaaaa"),
            pred.clone(),
            Term::literal("a1"),
        ));
        basket.add(Triple::new(
            Term::iri("https://osf.io/aaaaa"),
            pred,
            Term::literal("a2"),
        ));
        let subjects = basket.subjects();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].as_iri(), Some("https://osf.io/aaaaa"));
    }
}
