//! Vocabulary definitions for metadata gathering
//!
//! A closed set of named vocabularies qualifies every predicate and many
//! objects in the gathered graph. Namespace membership is a simple
//! prefix-match; the bases live in a [`VocabRegistry`] value that is passed
//! into gatherers and builders rather than reached through globals.

use crate::error::MetadataError;

/// Local vocabulary for terms with no good home in a standard one
pub const OSF: &str = "https://osf.io/vocab/2023/";

/// Dublin Core terms
pub const DCTERMS: &str = "http://purl.org/dc/terms/";

/// DCMI type vocabulary
pub const DCMITYPE: &str = "http://purl.org/dc/dcmitype/";

/// Friend-of-a-friend (agents: people and organizations)
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

/// RDF core (`rdf:type` mostly)
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// OWL (`owl:sameAs`)
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

/// SKOS concept schemes (subject taxonomies)
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";

/// Resolvable DOI prefix
pub const DOI: &str = "https://doi.org/";

/// ORCID researcher identifiers
pub const ORCID: &str = "https://orcid.org/";

/// Research Organization Registry identifiers
pub const ROR: &str = "https://ror.org/";

/// Default base for same-domain resource IRIs (guid-derived)
pub const DEFAULT_DOMAIN: &str = "https://osf.io/";

/// Qualify a local name with a namespace base
pub fn term(namespace: &str, local_name: &str) -> String {
    format!("{namespace}{local_name}")
}

/// Strip a namespace prefix from an IRI, if it matches
pub fn without_namespace<'a>(iri: &'a str, namespace: &str) -> Option<&'a str> {
    iri.strip_prefix(namespace)
}

/// Build a checksum URN from a hash-algorithm name and hex digest
pub fn checksum_iri(checksum_algorithm: &str, checksum_hex: &str) -> String {
    format!("urn:checksum:{checksum_algorithm}:{checksum_hex}")
}

/// Immutable registry of vocabulary bases used by gatherers and builders
///
/// The only configurable member is `domain`: the base under which this
/// deployment's guid-derived IRIs live. Everything else is fixed vocabulary.
#[derive(Debug, Clone)]
pub struct VocabRegistry {
    pub domain: String,
}

impl Default for VocabRegistry {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

impl VocabRegistry {
    /// Registry for a non-default deployment domain; the domain must be an
    /// absolute URL
    pub fn with_domain(domain: impl Into<String>) -> Result<Self, MetadataError> {
        let mut domain = domain.into();
        url::Url::parse(&domain)
            .map_err(|e| MetadataError::InvalidInput(format!("invalid domain '{domain}': {e}")))?;
        if !domain.ends_with('/') {
            domain.push('/');
        }
        Ok(Self { domain })
    }

    /// IRI for a guid under this deployment's domain
    pub fn guid_iri(&self, guid: &str) -> String {
        format!("{}{}", self.domain, guid)
    }

    /// Extract the guid from a same-domain IRI, if it is one
    ///
    /// Only single-segment paths count: `https://osf.io/abcde` yields
    /// `abcde`, while `https://osf.io/abcde/files/` yields nothing.
    pub fn guid_from_iri<'a>(&self, iri: &'a str) -> Option<&'a str> {
        let path = iri.strip_prefix(self.domain.as_str())?;
        let path = path.trim_matches('/');
        if path.is_empty() || path.contains('/') || path.contains('?') {
            return None;
        }
        Some(path)
    }

    /// Prefix table for compact rendering (Turtle, JSON-LD context)
    pub fn prefixes(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("osf", OSF),
            ("dcterms", DCTERMS),
            ("dcmitype", DCMITYPE),
            ("foaf", FOAF),
            ("rdf", RDF),
            ("owl", OWL),
            ("skos", SKOS),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term() {
        assert_eq!(term(DCTERMS, "title"), "http://purl.org/dc/terms/title");
    }

    #[test]
    fn test_without_namespace() {
        assert_eq!(
            without_namespace("https://doi.org/10.1/abc", DOI),
            Some("10.1/abc")
        );
        assert_eq!(without_namespace("https://ror.org/04xyz", DOI), None);
    }

    #[test]
    fn test_checksum_iri() {
        assert_eq!(
            checksum_iri("sha-256", "abc123"),
            "urn:checksum:sha-256:abc123"
        );
    }

    #[test]
    fn test_guid_iri_round_trip() {
        let vocab = VocabRegistry::default();
        let iri = vocab.guid_iri("abcde");
        assert_eq!(iri, "https://osf.io/abcde");
        assert_eq!(vocab.guid_from_iri(&iri), Some("abcde"));
    }

    #[test]
    fn test_guid_from_iri_rejects_non_guid_paths() {
        let vocab = VocabRegistry::default();
        assert_eq!(vocab.guid_from_iri("https://osf.io/abcde/files/"), None);
        assert_eq!(vocab.guid_from_iri("https://doi.org/10.1/abc"), None);
        assert_eq!(vocab.guid_from_iri("https://osf.io/"), None);
        assert_eq!(vocab.guid_from_iri("https://osf.io/ab?revision=1"), None);
    }

    #[test]
    fn test_with_domain_normalizes_trailing_slash() {
        let vocab = VocabRegistry::with_domain("https://example.test").unwrap();
        assert_eq!(vocab.guid_iri("zzzzz"), "https://example.test/zzzzz");
    }

    #[test]
    fn test_with_domain_rejects_relative() {
        assert!(VocabRegistry::with_domain("not a url").is_err());
    }
}
