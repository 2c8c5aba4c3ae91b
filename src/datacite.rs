//! DataCite metadata assembly
//!
//! Maps a gathered description graph onto the DataCite kernel-4 element
//! tree. The builder is format-blind: it writes into any [`TreeSink`], and
//! the XML/JSON entry points at the bottom pair it with the matching sink.

use std::collections::BTreeSet;

use crate::error::MetadataError;
use crate::gather::DescriptionSet;
use crate::gathering::SUBJECT_SCHEME_TITLE;
use crate::graph::{Basket, Focus, Term};
use crate::sink::{Child, JsonSink, Text, TreeSink, XmlSink};
use crate::vocab::{term, without_namespace, DCTERMS, DOI, FOAF, ORCID, OSF, RDF, ROR, SKOS};

pub const DATACITE_NAMESPACE: &str = "http://datacite.org/schema/kernel-4";

/// Relation predicates that surface as relatedIdentifier/relatedItem pairs
fn related_identifier_types() -> Vec<(Term, &'static str)> {
    vec![
        (Term::iri(term(DCTERMS, "hasPart")), "HasPart"),
        (Term::iri(term(DCTERMS, "hasVersion")), "HasVersion"),
        (Term::iri(term(DCTERMS, "isPartOf")), "IsPartOf"),
        (Term::iri(term(DCTERMS, "isVersionOf")), "IsVersionOf"),
        (Term::iri(term(DCTERMS, "references")), "References"),
        (Term::iri(term(DCTERMS, "relation")), "References"),
        (Term::iri(term(OSF, "archivedAt")), "IsIdenticalTo"),
        (Term::iri(term(OSF, "hasRoot")), "IsPartOf"),
        (Term::iri(term(OSF, "isContainedBy")), "IsPartOf"),
        (Term::iri(term(OSF, "supplements")), "IsSupplementTo"),
        (Term::iri(term(OSF, "isSupplementedBy")), "IsSupplementedBy"),
    ]
}

fn date_types() -> Vec<(Term, &'static str)> {
    vec![
        (Term::iri(term(DCTERMS, "created")), "Created"),
        (Term::iri(term(DCTERMS, "modified")), "Updated"),
        (Term::iri(term(DCTERMS, "dateSubmitted")), "Submitted"),
        (Term::iri(term(DCTERMS, "dateAccepted")), "Valid"),
        (Term::iri(term(DCTERMS, "available")), "Available"),
        (Term::iri(term(DCTERMS, "date")), "Other"),
        (Term::iri(term(OSF, "withdrawn")), "Withdrawn"),
    ]
}

fn publication_year_fallbacks() -> Vec<Term> {
    vec![
        Term::iri(term(DCTERMS, "available")),
        Term::iri(term(DCTERMS, "dateAccepted")),
        Term::iri(term(DCTERMS, "created")),
        Term::iri(term(DCTERMS, "modified")),
    ]
}

fn contributor_types() -> Vec<(Term, &'static str)> {
    vec![(
        Term::iri(term(OSF, "HostingInstitution")),
        "HostingInstitution",
    )]
}

/// Controlled resourceTypeGeneral vocabulary (kernel-4)
const RESOURCE_TYPES_GENERAL: &[&str] = &[
    "Audiovisual",
    "Book",
    "BookChapter",
    "Collection",
    "ComputationalNotebook",
    "ConferencePaper",
    "ConferenceProceeding",
    "DataPaper",
    "Dataset",
    "Dissertation",
    "Event",
    "Image",
    "InteractiveResource",
    "Journal",
    "JournalArticle",
    "Model",
    "OutputManagementPlan",
    "PeerReview",
    "PhysicalObject",
    "Preprint",
    "Report",
    "Service",
    "Software",
    "Sound",
    "Standard",
    "Text",
    "Workflow",
    "Other",
];

fn dct(name: &str) -> Term {
    Term::iri(term(DCTERMS, name))
}

fn osf(name: &str) -> Term {
    Term::iri(term(OSF, name))
}

fn foaf(name: &str) -> Term {
    Term::iri(term(FOAF, name))
}

fn rdf_type() -> Term {
    Term::iri(term(RDF, "type"))
}

fn is_four_digit_year(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

fn leading_year(value: &str) -> Option<&str> {
    value
        .get(..4)
        .filter(|prefix| prefix.bytes().all(|b| b.is_ascii_digit()))
}

/// Builds the DataCite element tree for one gathered description
pub struct DataciteBuilder<'a> {
    basket: &'a Basket,
    focus: &'a Focus,
}

impl<'a> DataciteBuilder<'a> {
    pub fn new(description: &'a DescriptionSet) -> Self {
        Self {
            basket: &description.basket,
            focus: &description.focus,
        }
    }

    pub fn build<S: TreeSink>(
        &self,
        sink: &mut S,
        explicit_doi: Option<&str>,
    ) -> Result<(), MetadataError> {
        let root = sink.root();
        self.add_identifier(sink, root, explicit_doi)?;
        self.add_creators(sink, root)?;
        self.add_titles(sink, root, &self.focus.iri_term());
        self.add_publisher(sink, root, &self.focus.iri_term());
        self.add_publication_year(sink, root, &self.focus.iri_term());
        self.add_subjects(sink, root);
        self.add_contributors(sink, root)?;
        self.add_dates(sink, root);
        self.add_language(sink, root);
        self.add_resource_type(sink, root);
        self.add_alternate_identifiers(sink, root)?;
        self.add_format(sink, root);
        self.add_rights(sink, root);
        self.add_descriptions(sink, root);
        self.add_funding_references(sink, root);
        self.add_related(sink, root)?;
        Ok(())
    }

    fn err(&self, detail: impl Into<String>) -> MetadataError {
        MetadataError::Serialization {
            focus_iri: self.focus.iri.clone(),
            detail: detail.into(),
        }
    }

    /// Split an identifier IRI into its DataCite identifierType and value
    ///
    /// DOI and ORCID identifiers are stripped to their bare form; ROR keeps
    /// the full IRI; anything else resolvable stays a URL.
    fn identifier_type_and_value(
        &self,
        iri: &str,
    ) -> Result<(&'static str, String), MetadataError> {
        if let Some(bare) = without_namespace(iri, DOI) {
            Ok(("DOI", bare.to_string()))
        } else if iri.starts_with(ROR) {
            Ok(("ROR", iri.to_string()))
        } else if let Some(bare) = without_namespace(iri, ORCID) {
            Ok(("ORCID", bare.to_string()))
        } else if iri.contains("://") {
            Ok(("URL", iri.to_string()))
        } else {
            Err(self.err(format!("does not look like an iri: {iri}")))
        }
    }

    /// Preferred single identifier for a node: a DOI if one was gathered,
    /// else any gathered identifier, else the node's own IRI
    fn one_identifier(&self, resource: &Term) -> Option<String> {
        let identifiers: Vec<&str> = self
            .basket
            .objects(resource, &dct("identifier"))
            .filter_map(Term::text)
            .collect();
        identifiers
            .iter()
            .find(|iri| iri.starts_with(DOI))
            .or_else(|| identifiers.first())
            .map(|iri| iri.to_string())
            .or_else(|| resource.as_iri().map(String::from))
    }

    fn name_type(&self, agent: &Term) -> Result<&'static str, MetadataError> {
        if self
            .basket
            .contains(agent, &rdf_type(), &foaf("Person"))
        {
            Ok("Personal")
        } else if self
            .basket
            .contains(agent, &rdf_type(), &foaf("Organization"))
        {
            Ok("Organizational")
        } else {
            Err(self.err(format!("could not determine nameType for {agent}")))
        }
    }

    fn resource_type_general(&self, subject: &Term) -> String {
        let mut general = "Text".to_string();
        for candidate in self.basket.objects(subject, &dct("type")) {
            if let Some(literal) = candidate.as_literal() {
                if RESOURCE_TYPES_GENERAL.contains(&literal) {
                    general = literal.to_string();
                }
            }
        }
        general
    }

    fn add_identifier<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
        explicit_doi: Option<&str>,
    ) -> Result<(), MetadataError> {
        let (identifier_type, value) = match explicit_doi {
            Some(doi) => ("DOI", doi.to_string()),
            None => {
                let identifier = self
                    .one_identifier(&self.focus.iri_term())
                    .ok_or_else(|| self.err("no identifier gathered for focus"))?;
                self.identifier_type_and_value(&identifier)?
            }
        };
        sink.add_child(
            parent,
            "identifier",
            Child::text(value).attr("identifierType", identifier_type),
        );
        Ok(())
    }

    fn add_creators<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
    ) -> Result<(), MetadataError> {
        let focus_term = self.focus.iri_term();
        let mut creators: BTreeSet<Term> = self
            .basket
            .objects(&focus_term, &dct("creator"))
            .cloned()
            .collect();
        if creators.is_empty() && self.basket.contains(&focus_term, &rdf_type(), &osf("File")) {
            creators.extend(
                self.basket
                    .objects_via(&focus_term, &osf("hasFileVersion"), &dct("creator"))
                    .into_iter()
                    .cloned(),
            );
        }
        let containment_fallbacks = [
            (osf("isContainedBy"), dct("creator")),
            (dct("isPartOf"), dct("creator")),
        ];
        for (step, target) in &containment_fallbacks {
            if creators.is_empty() {
                creators.extend(
                    self.basket
                        .objects_via(&focus_term, step, target)
                        .into_iter()
                        .cloned(),
                );
            }
        }
        if creators.is_empty() {
            creators.extend(
                self.basket
                    .objects(&focus_term, &dct("contributor"))
                    .cloned(),
            );
        }
        let contributor_fallbacks = [
            (osf("isContainedBy"), dct("contributor")),
            (dct("isPartOf"), dct("contributor")),
        ];
        for (step, target) in &contributor_fallbacks {
            if creators.is_empty() {
                creators.extend(
                    self.basket
                        .objects_via(&focus_term, step, target)
                        .into_iter()
                        .cloned(),
                );
            }
        }
        if creators.is_empty() {
            return Err(self.err("gathered no creators or contributors"));
        }

        let creators_el = sink.add_child(parent, "creators", Child::list());
        for creator in &creators {
            let creator_el = sink.add_child(creators_el, "creator", Child::node());
            for name in self.basket.objects(creator, &foaf("name")) {
                let name_type = self.name_type(creator)?;
                if let Some(text) = Text::from_term(name) {
                    sink.add_child(
                        creator_el,
                        "creatorName",
                        Child::text(text).attr("nameType", name_type),
                    );
                }
            }
            self.add_name_identifiers(sink, creator_el, creator)?;
            self.add_affiliations(sink, creator_el, creator)?;
        }
        Ok(())
    }

    fn add_titles<S: TreeSink>(&self, sink: &mut S, parent: S::Handle, subject: &Term) {
        let titles_el = sink.add_child(parent, "titles", Child::list());
        for title in self.basket.objects(subject, &dct("title")) {
            if let Some(text) = Text::from_term(title) {
                sink.add_child(titles_el, "title", Child::text(text));
            }
        }
        // a bare file may have no title; its name stands in
        if sink.child_count(titles_el) == 0
            && self.basket.contains(subject, &rdf_type(), &osf("File"))
        {
            if let Some(name) = self
                .basket
                .objects(subject, &osf("fileName"))
                .next()
                .and_then(Text::from_term)
            {
                sink.add_child(titles_el, "title", Child::text(name));
            }
        }
    }

    fn add_descriptions<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        let descriptions_el = sink.add_child(parent, "descriptions", Child::list());
        for description in self
            .basket
            .objects(&self.focus.iri_term(), &dct("description"))
        {
            if let Some(text) = Text::from_term(description) {
                sink.add_child(
                    descriptions_el,
                    "description",
                    Child::text(text).attr("descriptionType", "Abstract"),
                );
            }
        }
    }

    fn add_publisher<S: TreeSink>(&self, sink: &mut S, parent: S::Handle, subject: &Term) {
        let publisher = self
            .basket
            .objects_via(subject, &dct("publisher"), &foaf("name"))
            .first()
            .and_then(|name| name.text())
            .unwrap_or("OSF")
            .to_string();
        sink.add_child(parent, "publisher", Child::text(publisher));
    }

    fn add_publication_year<S: TreeSink>(&self, sink: &mut S, parent: S::Handle, subject: &Term) {
        let copyrighted = self
            .basket
            .objects(subject, &dct("dateCopyrighted"))
            .next()
            .and_then(Term::text);
        if let Some(year) = copyrighted.filter(|y| is_four_digit_year(y)) {
            sink.add_child(parent, "publicationYear", Child::text(year));
            return;
        }
        for predicate in publication_year_fallbacks() {
            let year = self
                .basket
                .objects(subject, &predicate)
                .next()
                .and_then(Term::text)
                .and_then(leading_year);
            if let Some(year) = year {
                // only one allowed
                sink.add_child(parent, "publicationYear", Child::text(year));
                return;
            }
        }
    }

    fn add_subjects<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        let subjects_el = sink.add_child(parent, "subjects", Child::list());
        let focus_term = self.focus.iri_term();
        for concept in self.basket.objects(&focus_term, &dct("subject")) {
            let label = self
                .basket
                .objects(concept, &Term::iri(term(SKOS, "prefLabel")))
                .next()
                .and_then(Text::from_term)
                .or_else(|| Text::from_term(concept));
            if let Some(label) = label {
                sink.add_child(
                    subjects_el,
                    "subject",
                    Child::text(label).attr("subjectScheme", SUBJECT_SCHEME_TITLE),
                );
            }
        }
        for keyword in self.basket.objects(&focus_term, &osf("keyword")) {
            if let Some(text) = Text::from_term(keyword) {
                sink.add_child(subjects_el, "subject", Child::text(text));
            }
        }
    }

    fn add_contributors<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
    ) -> Result<(), MetadataError> {
        let contributors_el = sink.add_child(parent, "contributors", Child::list());
        let focus_term = self.focus.iri_term();
        for (predicate, contributor_type) in contributor_types() {
            let contributors: Vec<Term> = self
                .basket
                .objects(&focus_term, &predicate)
                .cloned()
                .collect();
            for contributor in contributors {
                let contributor_el = sink.add_child(
                    contributors_el,
                    "contributor",
                    Child::node().attr("contributorType", contributor_type),
                );
                for name in self.basket.objects(&contributor, &foaf("name")) {
                    let name_type = self.name_type(&contributor)?;
                    if let Some(text) = Text::from_term(name) {
                        sink.add_child(
                            contributor_el,
                            "contributorName",
                            Child::text(text).attr("nameType", name_type),
                        );
                    }
                }
                self.add_name_identifiers(sink, contributor_el, &contributor)?;
                self.add_affiliations(sink, contributor_el, &contributor)?;
            }
        }
        Ok(())
    }

    fn add_dates<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        let dates_el = sink.add_child(parent, "dates", Child::list());
        let focus_term = self.focus.iri_term();
        for (predicate, date_type) in date_types() {
            for date in self.basket.objects(&focus_term, &predicate) {
                if let Some(text) = Text::from_term(date) {
                    sink.add_child(
                        dates_el,
                        "date",
                        Child::text(text).attr("dateType", date_type),
                    );
                }
            }
        }
    }

    fn add_language<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        if let Some(language) = self
            .basket
            .objects(&self.focus.iri_term(), &dct("language"))
            .next()
            .and_then(Text::from_term)
        {
            sink.add_child(parent, "language", Child::text(language));
        }
    }

    fn add_resource_type<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        let mut resource_type_text = String::new();
        if let Some(local) = without_namespace(&self.focus.rdf_type, OSF) {
            // kernel-4 has no StudyRegistration general type yet
            resource_type_text = if local == "Registration" {
                "Pre-registration".to_string()
            } else {
                local.to_string()
            };
        }
        sink.add_child(
            parent,
            "resourceType",
            Child::text(resource_type_text).attr(
                "resourceTypeGeneral",
                self.resource_type_general(&self.focus.iri_term()),
            ),
        );
    }

    fn add_alternate_identifiers<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
    ) -> Result<(), MetadataError> {
        let alt_ids_el = sink.add_child(parent, "alternateIdentifiers", Child::list());
        for identifier in self
            .basket
            .objects(&self.focus.iri_term(), &dct("identifier"))
            .filter_map(Term::text)
        {
            let (identifier_type, value) = self.identifier_type_and_value(identifier)?;
            if identifier_type != "DOI" {
                sink.add_child(
                    alt_ids_el,
                    "alternateIdentifier",
                    Child::text(value).attr("alternateIdentifierType", identifier_type),
                );
            }
        }
        Ok(())
    }

    fn add_format<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        if let Some(format) = self
            .basket
            .objects(&self.focus.iri_term(), &dct("format"))
            .next()
            .and_then(Text::from_term)
        {
            sink.add_child(parent, "format", Child::text(format));
        }
    }

    fn add_rights<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        let rights_list_el = sink.add_child(parent, "rightsList", Child::list());
        let rights_nodes: Vec<Term> = self
            .basket
            .objects(&self.focus.iri_term(), &dct("rights"))
            .cloned()
            .collect();
        for rights in rights_nodes {
            let name = self
                .basket
                .objects(&rights, &foaf("name"))
                .next()
                .and_then(Term::text)
                .unwrap_or("")
                .to_string();
            let mut child = Child::text(name);
            if let Some(uri) = self
                .basket
                .objects(&rights, &dct("identifier"))
                .next()
                .and_then(Term::text)
            {
                child = child.attr("rightsURI", uri);
            }
            sink.add_child(rights_list_el, "rights", child);
        }
    }

    fn add_funding_references<S: TreeSink>(&self, sink: &mut S, parent: S::Handle) {
        let fundrefs_el = sink.add_child(parent, "fundingReferences", Child::list());
        let focus_term = self.focus.iri_term();
        let funders: Vec<Term> = self.basket.objects(&focus_term, &osf("funder")).cloned().collect();
        let awards: Vec<Term> = self
            .basket
            .objects(&focus_term, &osf("hasFunding"))
            .cloned()
            .collect();
        for funder in funders {
            let fundref_el = sink.add_child(fundrefs_el, "fundingReference", Child::node());
            let funder_name = self
                .basket
                .objects(&funder, &foaf("name"))
                .next()
                .and_then(Term::text)
                .unwrap_or("");
            sink.add_child(fundref_el, "funderName", Child::text(funder_name));
            let funder_identifier = self
                .basket
                .objects(&funder, &dct("identifier"))
                .next()
                .and_then(Term::text)
                .unwrap_or("");
            let funder_identifier_type = self
                .basket
                .objects(&funder, &osf("funderIdentifierType"))
                .next()
                .and_then(Term::text)
                .unwrap_or("");
            sink.add_child(
                fundref_el,
                "funderIdentifier",
                Child::text(funder_identifier)
                    .attr("funderIdentifierType", funder_identifier_type),
            );
            // award details live on the award node crediting this funder
            let award = awards
                .iter()
                .find(|award| self.basket.contains(award, &dct("contributor"), &funder));
            let award_number = award
                .and_then(|a| self.basket.objects(a, &osf("awardNumber")).next())
                .and_then(Term::text)
                .unwrap_or("");
            let award_uri = award.and_then(|a| a.as_iri()).unwrap_or("");
            sink.add_child(
                fundref_el,
                "awardNumber",
                Child::text(award_number).attr("awardURI", award_uri),
            );
            let award_title = award
                .and_then(|a| self.basket.objects(a, &dct("title")).next())
                .and_then(Term::text)
                .unwrap_or("");
            sink.add_child(fundref_el, "awardTitle", Child::text(award_title));
        }
    }

    fn add_related<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
    ) -> Result<(), MetadataError> {
        let focus_term = self.focus.iri_term();
        let mut relation_pairs: BTreeSet<(&'static str, Term)> = BTreeSet::new();
        for (predicate, relation_type) in related_identifier_types() {
            for related in self.basket.objects(&focus_term, &predicate) {
                relation_pairs.insert((relation_type, related.clone()));
            }
        }
        let related_identifiers_el = sink.add_child(parent, "relatedIdentifiers", Child::list());
        let related_items_el = sink.add_child(parent, "relatedItems", Child::list());
        for (relation_type, related) in relation_pairs {
            self.add_related_identifier_and_item(
                sink,
                related_identifiers_el,
                related_items_el,
                &related,
                relation_type,
            )?;
        }
        Ok(())
    }

    fn add_related_identifier_and_item<S: TreeSink>(
        &self,
        sink: &mut S,
        identifier_parent: S::Handle,
        item_parent: S::Handle,
        related: &Term,
        relation_type: &str,
    ) -> Result<(), MetadataError> {
        let related_item_el = sink.add_child(
            item_parent,
            "relatedItem",
            Child::node()
                .attr("relationType", relation_type)
                .attr("relatedItemType", self.resource_type_general(related)),
        );
        // a relatedItem without an identifier is still worth emitting
        if let Some(identifier) = self.one_identifier(related) {
            let (identifier_type, value) = self.identifier_type_and_value(&identifier)?;
            sink.add_child(
                related_item_el,
                "relatedItemIdentifier",
                Child::text(value.clone()).attr("relatedItemIdentifierType", identifier_type),
            );
            sink.add_child(
                identifier_parent,
                "relatedIdentifier",
                Child::text(value)
                    .attr("relatedIdentifierType", identifier_type)
                    .attr("relationType", relation_type),
            );
        }
        self.add_titles(sink, related_item_el, related);
        self.add_publication_year(sink, related_item_el, related);
        self.add_publisher(sink, related_item_el, related);
        Ok(())
    }

    fn add_name_identifiers<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
        agent: &Term,
    ) -> Result<(), MetadataError> {
        let identifiers: Vec<&str> = self
            .basket
            .objects(agent, &dct("identifier"))
            .filter_map(Term::text)
            .collect();
        for identifier in identifiers {
            let (identifier_type, value) = self.identifier_type_and_value(identifier)?;
            sink.add_child(
                parent,
                "nameIdentifier",
                Child::text(value).attr("nameIdentifierScheme", identifier_type),
            );
        }
        Ok(())
    }

    fn add_affiliations<S: TreeSink>(
        &self,
        sink: &mut S,
        parent: S::Handle,
        agent: &Term,
    ) -> Result<(), MetadataError> {
        let institutions: Vec<Term> = self
            .basket
            .objects(agent, &osf("affiliation"))
            .cloned()
            .collect();
        for institution in institutions {
            let name = self
                .basket
                .objects(&institution, &foaf("name"))
                .next()
                .and_then(Text::from_term)
                .ok_or_else(|| self.err(format!("need foaf:name for affiliated {agent}")))?;
            let mut child = Child::text(name).repeated();
            if let Some(identifier) = self.one_identifier(&institution) {
                let (identifier_type, value) = self.identifier_type_and_value(&identifier)?;
                child = child
                    .attr("affiliationIdentifier", value)
                    .attr("affiliationIdentifierScheme", identifier_type);
            }
            sink.add_child(parent, "affiliation", child);
        }
        Ok(())
    }
}

/// Required-field check over the finished XML tree
///
/// Stands in for full schema validation: the fields DataCite rejects
/// registrations without must be present and nonempty.
pub fn check_required_fields(sink: &XmlSink) -> Result<(), MetadataError> {
    let root = sink.root();
    if sink.tag(root) != "resource" {
        return Err(MetadataError::SchemaValidation(format!(
            "root element must be resource, got {}",
            sink.tag(root)
        )));
    }
    for tag in ["identifier", "publisher", "publicationYear"] {
        let node = sink
            .child_by_tag(root, tag)
            .ok_or_else(|| MetadataError::SchemaValidation(format!("missing element: {tag}")))?;
        if sink.text(node).map(|t| t.value.is_empty()).unwrap_or(true) {
            return Err(MetadataError::SchemaValidation(format!(
                "element must have text: {tag}"
            )));
        }
    }
    for tag in ["creators", "titles"] {
        let node = sink
            .child_by_tag(root, tag)
            .ok_or_else(|| MetadataError::SchemaValidation(format!("missing element: {tag}")))?;
        if sink.children(node).is_empty() {
            return Err(MetadataError::SchemaValidation(format!(
                "element must have children: {tag}"
            )));
        }
    }
    if sink.child_by_tag(root, "resourceType").is_none() {
        return Err(MetadataError::SchemaValidation(
            "missing element: resourceType".to_string(),
        ));
    }
    Ok(())
}

/// Serialize a description as DataCite kernel-4 XML
pub fn serialize_xml(
    description: &DescriptionSet,
    explicit_doi: Option<&str>,
) -> Result<String, MetadataError> {
    let mut sink = XmlSink::new("resource");
    DataciteBuilder::new(description).build(&mut sink, explicit_doi)?;
    check_required_fields(&sink)?;
    Ok(sink.render(DATACITE_NAMESPACE))
}

/// Serialize a description as DataCite JSON (sorted keys, two-space indent)
pub fn serialize_json(
    description: &DescriptionSet,
    explicit_doi: Option<&str>,
) -> Result<String, MetadataError> {
    let mut sink = JsonSink::new();
    DataciteBuilder::new(description).build(&mut sink, explicit_doi)?;
    Ok(sink.render())
}
