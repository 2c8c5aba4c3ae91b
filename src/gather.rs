//! Gatherer output normalization and the bounded graph walk
//!
//! Gatherers yield loosely-shaped statements ("twoples" with an implicit
//! subject, dates, Focus references); the tidy step normalizes them into
//! well-formed triples before they enter the [`Basket`]. The walker seeds a
//! frontier with one guid, runs every gatherer per visited resource, and
//! follows same-domain references breadth-first until the visit bound is
//! reached or the frontier empties.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::MetadataError;
use crate::gathering;
use crate::graph::{Basket, Focus, Term, Triple};
use crate::resource::ResourceStore;
use crate::vocab::{self, VocabRegistry};

/// How date/datetime values are rendered into literals
///
/// Day granularity matches the observed behavior of the catalog feeds this
/// crate serves; finer granularity is available but off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateGranularity {
    /// ISO-8601 calendar date, time-of-day discarded
    #[default]
    Day,
    /// Full RFC 3339 with seconds precision
    DateTime,
}

/// Options for one gathering walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Maximum number of resources to visit; 1 yields a "sparse" record
    /// describing only the seed.
    pub max_visits: usize,
    pub date_granularity: DateGranularity,
    /// Abort the walk when exceeded and return the partial graph with
    /// `complete = false`.
    pub deadline: Option<Instant>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_visits: 1,
            date_granularity: DateGranularity::Day,
            deadline: None,
        }
    }
}

/// Object position of a gathered statement, before normalization
#[derive(Debug, Clone)]
pub enum GatherValue {
    /// Optional field absent: the whole statement is politely skipped
    Missing,
    Term(Term),
    /// Reference to another same-domain resource; tidying emits both the
    /// relation triple and an rdf:type triple for the referenced IRI.
    Focus(Focus),
    Date(DateTime<Utc>),
}

impl GatherValue {
    pub fn literal(value: impl Into<String>) -> Self {
        GatherValue::Term(Term::literal(value))
    }

    pub fn iri(value: impl Into<String>) -> Self {
        GatherValue::Term(Term::iri(value))
    }

    pub fn opt_literal(value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => Self::literal(v),
            None => GatherValue::Missing,
        }
    }

    pub fn opt_date(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(v) => GatherValue::Date(v),
            None => GatherValue::Missing,
        }
    }
}

/// One statement as emitted by a gatherer
///
/// `subject = None` is the "twople" form: the focus's own IRI is prepended
/// during tidying.
#[derive(Debug, Clone)]
pub struct Gathered {
    pub subject: Option<Term>,
    pub predicate: String,
    pub value: GatherValue,
}

impl Gathered {
    /// Twople: subject is the focus itself
    pub fn about_focus(predicate: impl Into<String>, value: GatherValue) -> Self {
        Self {
            subject: None,
            predicate: predicate.into(),
            value,
        }
    }

    /// Full triple with an explicit subject
    pub fn about(subject: Term, predicate: impl Into<String>, value: GatherValue) -> Self {
        Self {
            subject: Some(subject),
            predicate: predicate.into(),
            value,
        }
    }
}

/// Blank-node id source for one walk; sequential so a walk is reproducible
#[derive(Debug, Default)]
pub struct BlankNodes {
    next: u64,
}

impl BlankNodes {
    pub fn fresh(&mut self) -> Term {
        let id = self.next;
        self.next += 1;
        Term::Blank(id)
    }
}

/// Everything a gatherer may consult besides the focus itself
pub struct GatherContext<'a> {
    pub store: &'a dyn ResourceStore,
    pub vocab: &'a VocabRegistry,
    pub blanks: &'a mut BlankNodes,
}

impl GatherContext<'_> {
    /// Build a Focus for a same-domain guid, if it resolves
    pub fn focus_for_guid(&self, guid: &str) -> Option<Focus> {
        let resource = self.store.resolve(guid)?;
        Some(Focus::new(
            self.vocab,
            guid,
            vocab::term(vocab::OSF, resource.kind().type_name()),
        ))
    }
}

/// Render a datetime into a literal per the configured granularity
fn date_literal(date: DateTime<Utc>, granularity: DateGranularity) -> Term {
    match granularity {
        DateGranularity::Day => Term::literal(date.date_naive().to_string()),
        DateGranularity::DateTime => Term::literal(date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
    }
}

fn term_is_empty(term: &Term) -> bool {
    match term {
        Term::Iri(iri) => iri.is_empty(),
        Term::Literal { value, .. } => value.is_empty(),
        Term::Blank(_) => false,
    }
}

/// Normalize one gathered statement into zero, one, or two triples
///
/// - missing or empty-valued statements are dropped, never errored
/// - Focus-valued objects expand into the relation triple plus an rdf:type
///   triple for the referenced resource
/// - a literal in subject position is a hard programming error
pub fn tidy(
    focus: &Focus,
    gathered: Gathered,
    granularity: DateGranularity,
) -> Result<Vec<Triple>, MetadataError> {
    let subject = gathered.subject.unwrap_or_else(|| focus.iri_term());
    match &subject {
        Term::Iri(_) | Term::Blank(_) => {}
        Term::Literal { .. } => {
            return Err(MetadataError::MalformedTriple(format!(
                "literal subject for predicate {}",
                gathered.predicate
            )));
        }
    }
    if gathered.predicate.is_empty() {
        return Ok(Vec::new());
    }
    let predicate = Term::iri(gathered.predicate);

    let mut triples = Vec::new();
    let object = match gathered.value {
        GatherValue::Missing => return Ok(triples),
        GatherValue::Date(date) => date_literal(date, granularity),
        GatherValue::Term(term) => term,
        GatherValue::Focus(related) => {
            // every referenced resource is minimally typed, even if the
            // walk never visits it
            triples.push(Triple::new(
                related.iri_term(),
                Term::iri(vocab::term(vocab::RDF, "type")),
                Term::iri(related.rdf_type.clone()),
            ));
            related.iri_term()
        }
    };
    if term_is_empty(&subject) || term_is_empty(&object) {
        return Ok(Vec::new());
    }
    triples.push(Triple::new(subject, predicate, object));
    Ok(triples)
}

/// Result of one gathering walk
#[derive(Debug)]
pub struct DescriptionSet {
    pub focus: Focus,
    pub basket: Basket,
    /// False when a deadline aborted the walk mid-way; the graph is then a
    /// valid but partial description and must not be treated as complete.
    pub complete: bool,
    /// Guids visited, in visit order
    pub visited: Vec<String>,
}

/// Resolve a seed identifier (bare guid or same-domain IRI) into a Focus
pub fn resolve_focus(
    store: &dyn ResourceStore,
    vocab_registry: &VocabRegistry,
    guid_or_iri: &str,
) -> Result<Focus, MetadataError> {
    let guid = if guid_or_iri.contains("://") {
        vocab_registry
            .guid_from_iri(guid_or_iri)
            .ok_or_else(|| MetadataError::NotFound(guid_or_iri.to_string()))?
    } else {
        guid_or_iri
    };
    let resource = store
        .resolve(guid)
        .ok_or_else(|| MetadataError::NotFound(guid.to_string()))?;
    Ok(Focus::new(
        vocab_registry,
        guid,
        vocab::term(vocab::OSF, resource.kind().type_name()),
    ))
}

/// Gather metadata about a guid's referent and, up to the visit bound,
/// related same-domain resources discovered along the way
///
/// The frontier is breadth-first in discovery order, so which nodes get
/// sparse treatment under a low visit bound is deterministic.
pub fn gather_description_set(
    store: &dyn ResourceStore,
    vocab_registry: &VocabRegistry,
    guid: &str,
    options: &WalkOptions,
) -> Result<DescriptionSet, MetadataError> {
    let seed_focus = resolve_focus(store, vocab_registry, guid)?;

    let mut basket = Basket::new();
    let mut blanks = BlankNodes::default();
    let mut visited: Vec<String> = Vec::new();
    let mut enqueued: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<String> = VecDeque::new();
    let mut complete = true;

    enqueued.insert(seed_focus.guid.clone());
    frontier.push_back(seed_focus.guid.clone());

    while let Some(current_guid) = frontier.pop_front() {
        if visited.len() >= options.max_visits {
            break;
        }
        if let Some(deadline) = options.deadline {
            if Instant::now() >= deadline {
                complete = false;
                break;
            }
        }
        let focus = match resolve_focus(store, vocab_registry, &current_guid) {
            Ok(focus) => focus,
            Err(_) if current_guid != seed_focus.guid => {
                // resource deleted mid-walk: recoverable
                warn!(guid = %current_guid, "skipping unresolvable guid");
                continue;
            }
            Err(err) => return Err(err),
        };
        visited.push(current_guid.clone());
        debug!(guid = %current_guid, visit = visited.len(), "gathering");

        let mut ctx = GatherContext {
            store,
            vocab: vocab_registry,
            blanks: &mut blanks,
        };
        for gathered in gathering::gather_all(&focus, &mut ctx) {
            for triple in tidy(&focus, gathered, options.date_granularity)? {
                if let Some(obj_iri) = triple.object.as_iri() {
                    if let Some(obj_guid) = vocab_registry.guid_from_iri(obj_iri) {
                        if enqueued.insert(obj_guid.to_string()) {
                            frontier.push_back(obj_guid.to_string());
                        }
                    }
                }
                basket.add(triple);
            }
        }
    }

    Ok(DescriptionSet {
        focus: seed_focus,
        basket,
        complete,
        visited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{term, DCTERMS, OSF, RDF};

    fn focus() -> Focus {
        Focus {
            iri: "https://osf.io/abcde".to_string(),
            rdf_type: term(OSF, "Project"),
            guid: "abcde".to_string(),
        }
    }

    #[test]
    fn test_tidy_prepends_focus_subject() {
        let gathered = Gathered::about_focus(term(DCTERMS, "title"), GatherValue::literal("hi"));
        let triples = tidy(&focus(), gathered, DateGranularity::Day).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].subject.as_iri(), Some("https://osf.io/abcde"));
    }

    #[test]
    fn test_tidy_skips_missing_and_empty() {
        let missing = Gathered::about_focus(term(DCTERMS, "description"), GatherValue::Missing);
        assert!(tidy(&focus(), missing, DateGranularity::Day).unwrap().is_empty());

        let empty = Gathered::about_focus(term(DCTERMS, "description"), GatherValue::literal(""));
        assert!(tidy(&focus(), empty, DateGranularity::Day).unwrap().is_empty());
    }

    #[test]
    fn test_tidy_rejects_literal_subject() {
        let bad = Gathered::about(
            Term::literal("not a subject"),
            term(DCTERMS, "title"),
            GatherValue::literal("hi"),
        );
        assert!(matches!(
            tidy(&focus(), bad, DateGranularity::Day),
            Err(MetadataError::MalformedTriple(_))
        ));
    }

    #[test]
    fn test_tidy_date_granularity() {
        let date = "2021-02-01T12:34:56Z".parse::<DateTime<Utc>>().unwrap();
        let gathered = Gathered::about_focus(term(DCTERMS, "created"), GatherValue::Date(date));
        let triples = tidy(&focus(), gathered.clone(), DateGranularity::Day).unwrap();
        assert_eq!(triples[0].object.as_literal(), Some("2021-02-01"));

        let triples = tidy(&focus(), gathered, DateGranularity::DateTime).unwrap();
        assert_eq!(triples[0].object.as_literal(), Some("2021-02-01T12:34:56Z"));
    }

    #[test]
    fn test_tidy_focus_object_emits_type_triple() {
        let related = Focus {
            iri: "https://osf.io/zzzzz".to_string(),
            rdf_type: term(OSF, "Registration"),
            guid: "zzzzz".to_string(),
        };
        let gathered = Gathered::about_focus(
            term(DCTERMS, "hasVersion"),
            GatherValue::Focus(related),
        );
        let triples = tidy(&focus(), gathered, DateGranularity::Day).unwrap();
        assert_eq!(triples.len(), 2);
        assert!(triples.iter().any(|t| {
            t.subject.as_iri() == Some("https://osf.io/zzzzz")
                && t.predicate.as_iri() == Some(term(RDF, "type").as_str())
        }));
    }

    #[test]
    fn test_blank_nodes_are_sequential() {
        let mut blanks = BlankNodes::default();
        assert_eq!(blanks.fresh(), Term::Blank(0));
        assert_eq!(blanks.fresh(), Term::Blank(1));
    }

    mod walk {
        use super::*;
        use crate::resource::MemoryStore;
        use crate::vocab::FOAF;
        use serde_json::json;

        fn fixture_store() -> MemoryStore {
            let doc = json!({
                "resources": {
                    "abcde": {
                        "kind": "project",
                        "title": "A Project",
                        "created": "2021-02-01T12:34:56Z",
                        "contributors": [{"user_guid": "useru"}],
                        "file_guids": ["filef"],
                        "registration_guids": ["regis"],
                        "subject_ids": ["subj1"]
                    },
                    "useru": {
                        "kind": "user",
                        "fullname": "Person McPersonface",
                        "orcid": {"value": "1234-4321-5678-8765", "verified": true}
                    },
                    "filef": {
                        "kind": "file",
                        "name": "data.csv",
                        "materialized_path": "/data.csv",
                        "target_guid": "abcde",
                        "versions": [{
                            "creator_guid": "useru",
                            "created": "2022-03-04T00:00:00Z",
                            "modified": "2022-03-05T00:00:00Z",
                            "content_type": "text/csv",
                            "size_bytes": 123456,
                            "version_number": "1",
                            "sha256": "6ac3c336e4094835293a3fed8a4b5fedde1b5e2626d9838fed50693bba00af0e"
                        }]
                    },
                    "regis": {
                        "kind": "registration",
                        "title": "A Registration",
                        "registered_date": "2021-06-01T00:00:00Z",
                        "registered_from_guid": "abcde"
                    }
                },
                "subjects": {
                    "subj0": {
                        "id": "subj0",
                        "text": "Social Sciences",
                        "iri": "https://bepress.example/social-sciences"
                    },
                    "subj1": {
                        "id": "subj1",
                        "text": "Economics",
                        "iri": "https://bepress.example/economics",
                        "parent_id": "subj0"
                    }
                }
            });
            MemoryStore::from_json_str(&doc.to_string()).unwrap()
        }

        fn has_triple(basket: &Basket, s: &str, p: String, o: Term) -> bool {
            basket.contains(&Term::iri(s), &Term::iri(p), &o)
        }

        #[test]
        fn test_walk_visits_discovered_resources_breadth_first() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let options = WalkOptions {
                max_visits: 10,
                ..WalkOptions::default()
            };
            let description =
                gather_description_set(&store, &vocab_registry, "abcde", &options).unwrap();
            assert!(description.complete);
            assert_eq!(description.visited, vec!["abcde", "filef", "regis", "useru"]);
            // facts about visited non-seed resources made it in
            assert!(has_triple(
                &description.basket,
                "https://osf.io/useru",
                term(FOAF, "name"),
                Term::literal("Person McPersonface"),
            ));
            assert!(has_triple(
                &description.basket,
                "https://osf.io/regis",
                term(DCTERMS, "isVersionOf"),
                Term::iri("https://osf.io/abcde"),
            ));
        }

        #[test]
        fn test_sparse_walk_types_but_does_not_visit_references() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let description = gather_description_set(
                &store,
                &vocab_registry,
                "abcde",
                &WalkOptions::default(),
            )
            .unwrap();
            assert_eq!(description.visited, vec!["abcde"]);
            // the reference and its type triple are present
            assert!(has_triple(
                &description.basket,
                "https://osf.io/abcde",
                term(DCTERMS, "creator"),
                Term::iri("https://osf.io/useru"),
            ));
            assert!(has_triple(
                &description.basket,
                "https://osf.io/useru",
                term(RDF, "type"),
                Term::iri(term(OSF, "User")),
            ));
            // but nothing gathered about the unvisited user
            assert!(!description
                .basket
                .iter()
                .any(|t| t.predicate == Term::iri(term(FOAF, "name"))));
        }

        #[test]
        fn test_walk_accepts_same_domain_iri_as_seed() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let description = gather_description_set(
                &store,
                &vocab_registry,
                "https://osf.io/abcde",
                &WalkOptions::default(),
            )
            .unwrap();
            assert_eq!(description.focus.guid, "abcde");
        }

        #[test]
        fn test_unknown_seed_is_not_found() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            assert!(matches!(
                gather_description_set(
                    &store,
                    &vocab_registry,
                    "nope!",
                    &WalkOptions::default()
                ),
                Err(MetadataError::NotFound(_))
            ));
        }

        #[test]
        fn test_expired_deadline_yields_partial_result() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let options = WalkOptions {
                max_visits: 10,
                deadline: Some(Instant::now()),
                ..WalkOptions::default()
            };
            let description =
                gather_description_set(&store, &vocab_registry, "abcde", &options).unwrap();
            assert!(!description.complete);
        }

        #[test]
        fn test_walk_is_deterministic() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let options = WalkOptions {
                max_visits: 10,
                ..WalkOptions::default()
            };
            let first =
                gather_description_set(&store, &vocab_registry, "abcde", &options).unwrap();
            let second =
                gather_description_set(&store, &vocab_registry, "abcde", &options).unwrap();
            assert_eq!(first.basket, second.basket);
            assert_eq!(first.visited, second.visited);
        }

        #[test]
        fn test_file_version_facts_surface_during_walk() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let options = WalkOptions {
                max_visits: 10,
                ..WalkOptions::default()
            };
            let description =
                gather_description_set(&store, &vocab_registry, "abcde", &options).unwrap();
            // human-readable extent on the version node
            assert!(description.basket.iter().any(|t| {
                t.predicate == Term::iri(term(DCTERMS, "extent"))
                    && t.object.as_literal() == Some("0.118 MB")
                    && t.subject.is_blank()
            }));
            // checksum urn via dct:requires
            assert!(description.basket.iter().any(|t| {
                t.predicate == Term::iri(term(DCTERMS, "requires"))
                    && t.object.as_iri().is_some_and(|iri| iri.starts_with("urn:checksum:sha-256:"))
            }));
        }

        #[test]
        fn test_subject_lineage_surfaces_during_walk() {
            let store = fixture_store();
            let vocab_registry = VocabRegistry::default();
            let description = gather_description_set(
                &store,
                &vocab_registry,
                "abcde",
                &WalkOptions::default(),
            )
            .unwrap();
            assert!(has_triple(
                &description.basket,
                "https://osf.io/abcde",
                term(DCTERMS, "subject"),
                Term::iri("https://bepress.example/economics"),
            ));
            assert!(has_triple(
                &description.basket,
                "https://bepress.example/economics",
                term(crate::vocab::SKOS, "broader"),
                Term::iri("https://bepress.example/social-sciences"),
            ));
        }
    }
}
