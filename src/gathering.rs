//! The gatherer catalogue
//!
//! Each gatherer is a pure function over one [`Focus`] covering one facet of
//! metadata. Gatherers read the underlying resource through the capability
//! trait, emit loosely-shaped [`Gathered`] statements, and leave all
//! normalization to the tidy step. Each is independently testable.

use crate::gather::{GatherContext, GatherValue, Gathered};
use crate::graph::{Focus, Term};
use crate::resource::{custom_statement_triple, Describable, ModerationTrigger};
use crate::vocab::{checksum_iri, term, DCMITYPE, DCTERMS, DOI, FOAF, ORCID, OSF, OWL, RDF, SKOS};

/// Subject-taxonomy scheme surfaced with every subject concept
pub const SUBJECT_SCHEME_IRI: &str = "https://bepress.com/reference_guide_dc/disciplines/";
pub const SUBJECT_SCHEME_TITLE: &str = "bepress Digital Commons Three-Tiered Taxonomy";

fn dct(name: &str) -> String {
    term(DCTERMS, name)
}

fn osf(name: &str) -> String {
    term(OSF, name)
}

fn foaf(name: &str) -> String {
    term(FOAF, name)
}

fn skos(name: &str) -> String {
    term(SKOS, name)
}

fn rdf_type() -> String {
    term(RDF, "type")
}

/// Human-readable byte extent: mebibytes to exactly three decimal places
pub fn format_byte_extent(size_bytes: u64) -> String {
    format!("{:.3} MB", size_bytes as f64 / 1_048_576.0)
}

/// Run the full gatherer set for one focus
pub fn gather_all(focus: &Focus, ctx: &mut GatherContext) -> Vec<Gathered> {
    let Some(resource) = ctx.store.resolve(&focus.guid) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    out.extend(gather_identifiers(focus, resource, ctx));
    out.extend(gather_types(focus, resource, ctx));
    out.extend(gather_dates(focus, resource, ctx));
    out.extend(gather_licensing(focus, resource, ctx));
    out.extend(gather_text(focus, resource, ctx));
    out.extend(gather_keywords(focus, resource, ctx));
    out.extend(gather_subjects(focus, resource, ctx));
    out.extend(gather_file_basics(focus, resource, ctx));
    out.extend(gather_versions(focus, resource, ctx));
    out.extend(gather_files(focus, resource, ctx));
    out.extend(gather_parts(focus, resource, ctx));
    out.extend(gather_related_items(focus, resource, ctx));
    out.extend(gather_agents(focus, resource, ctx));
    out.extend(gather_affiliated_institutions(focus, resource, ctx));
    out.extend(gather_funding(focus, resource, ctx));
    out.extend(gather_user_basics(focus, resource, ctx));
    out.extend(gather_collection_membership(focus, resource, ctx));
    out.extend(gather_custom_metadata(focus, resource, ctx));
    out
}

/// Own guid-derived IRI plus external DOI, when present
pub fn gather_identifiers(
    focus: &Focus,
    resource: &dyn Describable,
    _ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = vec![Gathered::about_focus(
        dct("identifier"),
        GatherValue::literal(focus.iri.clone()),
    )];
    if let Some(doi) = resource.doi() {
        let doi_url = format!("{DOI}{doi}");
        out.push(Gathered::about_focus(
            dct("identifier"),
            GatherValue::literal(doi_url.clone()),
        ));
        out.push(Gathered::about_focus(
            term(OWL, "sameAs"),
            GatherValue::iri(doi_url),
        ));
    }
    out
}

/// rdf:type from the resource kind; dct:type from the flexible override
pub fn gather_types(
    focus: &Focus,
    _resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = vec![Gathered::about_focus(
        rdf_type(),
        GatherValue::iri(focus.rdf_type.clone()),
    )];
    if let Some(record) = ctx.store.metadata_record(&focus.guid) {
        out.push(Gathered::about_focus(
            dct("type"),
            GatherValue::opt_literal(record.resource_type_general.clone()),
        ));
    }
    out
}

/// created / available (embargo end) / modified / moderation dates
pub fn gather_dates(
    _focus: &Focus,
    resource: &dyn Describable,
    _ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = vec![
        Gathered::about_focus(dct("created"), GatherValue::opt_date(resource.created())),
        Gathered::about_focus(
            dct("available"),
            GatherValue::opt_date(resource.embargo_end_date()),
        ),
        Gathered::about_focus(
            dct("modified"),
            GatherValue::opt_date(resource.last_logged().or_else(|| resource.modified())),
        ),
    ];
    // earliest matching action per trigger category
    let earliest = |trigger: ModerationTrigger| {
        resource
            .moderation_actions()
            .iter()
            .filter(|a| a.trigger == trigger)
            .map(|a| a.created)
            .min()
    };
    out.push(Gathered::about_focus(
        dct("dateSubmitted"),
        GatherValue::opt_date(earliest(ModerationTrigger::Submit)),
    ));
    out.push(Gathered::about_focus(
        dct("dateAccepted"),
        GatherValue::opt_date(earliest(ModerationTrigger::Accept)),
    ));
    out
}

/// Copyright year, rights holders, and the rights object (blank node for a
/// custom/absent license URL, resolvable IRI otherwise)
pub fn gather_licensing(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let Some(record) = resource.license_record() else {
        return Vec::new();
    };
    let mut out = vec![Gathered::about_focus(
        dct("dateCopyrighted"),
        GatherValue::opt_literal(record.year.clone()),
    )];
    for holder in &record.copyright_holders {
        out.push(Gathered::about_focus(
            dct("rightsHolder"),
            GatherValue::literal(holder.clone()),
        ));
    }
    if let Some(license) = &record.license {
        match &license.url {
            Some(url) => {
                let rights = Term::iri(url.clone());
                out.push(Gathered::about_focus(
                    dct("rights"),
                    GatherValue::Term(rights.clone()),
                ));
                out.push(Gathered::about(
                    rights.clone(),
                    foaf("name"),
                    GatherValue::literal(license.name.clone()),
                ));
                out.push(Gathered::about(
                    rights,
                    dct("identifier"),
                    GatherValue::literal(url.clone()),
                ));
            }
            None => {
                let rights = ctx.blanks.fresh();
                out.push(Gathered::about_focus(
                    dct("rights"),
                    GatherValue::Term(rights.clone()),
                ));
                out.push(Gathered::about(
                    rights,
                    foaf("name"),
                    GatherValue::literal(license.name.clone()),
                ));
            }
        }
    }
    out
}

/// Title, description, language: override record first, else own fields
pub fn gather_text(
    focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let record = ctx.store.metadata_record(&focus.guid);
    let title = record
        .and_then(|r| r.title.clone())
        .or_else(|| resource.title().map(String::from));
    let description = record
        .and_then(|r| r.description.clone())
        .or_else(|| resource.description().map(String::from));
    let language = record.and_then(|r| r.language.clone());
    vec![
        Gathered::about_focus(dct("title"), GatherValue::opt_literal(title)),
        Gathered::about_focus(dct("description"), GatherValue::opt_literal(description)),
        Gathered::about_focus(dct("language"), GatherValue::opt_literal(language)),
    ]
}

/// Non-system tags become keywords
pub fn gather_keywords(
    _focus: &Focus,
    resource: &dyn Describable,
    _ctx: &mut GatherContext,
) -> Vec<Gathered> {
    resource
        .tags()
        .iter()
        .filter(|tag| !tag.system)
        .map(|tag| Gathered::about_focus(osf("keyword"), GatherValue::literal(tag.name.clone())))
        .collect()
}

/// Directly-assigned subjects, mapped to canonical concepts, with scheme
/// membership, labels, and broader links
pub fn gather_subjects(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = Vec::new();
    let scheme = Term::iri(SUBJECT_SCHEME_IRI);
    for subject_id in resource.subject_ids() {
        let Some(assigned) = ctx.store.subject(subject_id) else {
            continue;
        };
        // alt-lineage subjects surface as their canonical concept, with the
        // alt text as an alternate label
        let (concept, alt_label) = match assigned
            .canonical_id
            .as_ref()
            .and_then(|id| ctx.store.subject(id))
        {
            Some(canonical) => (canonical, Some(assigned.text.clone())),
            None => (assigned, None),
        };
        let concept_iri = Term::iri(concept.iri.clone());
        out.push(Gathered::about_focus(
            dct("subject"),
            GatherValue::Term(concept_iri.clone()),
        ));
        out.push(Gathered::about(
            concept_iri.clone(),
            rdf_type(),
            GatherValue::iri(skos("Concept")),
        ));
        out.push(Gathered::about(
            concept_iri.clone(),
            skos("inScheme"),
            GatherValue::Term(scheme.clone()),
        ));
        out.push(Gathered::about(
            scheme.clone(),
            dct("title"),
            GatherValue::literal(SUBJECT_SCHEME_TITLE),
        ));
        out.push(Gathered::about(
            concept_iri.clone(),
            skos("prefLabel"),
            GatherValue::literal(concept.text.clone()),
        ));
        out.push(Gathered::about(
            concept_iri.clone(),
            skos("altLabel"),
            GatherValue::opt_literal(alt_label),
        ));
        if let Some(parent) = concept.parent_id.as_ref().and_then(|id| ctx.store.subject(id)) {
            out.push(Gathered::about(
                concept_iri,
                skos("broader"),
                GatherValue::iri(parent.iri.clone()),
            ));
        }
    }
    out
}

/// File name, materialized path, and the containing resource
pub fn gather_file_basics(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let Some(info) = resource.file_info() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if let Some(target) = ctx.focus_for_guid(&info.target_guid) {
        out.push(Gathered::about_focus(
            osf("isContainedBy"),
            GatherValue::Focus(target),
        ));
    }
    out.push(Gathered::about_focus(
        osf("fileName"),
        GatherValue::literal(info.name.clone()),
    ));
    out.push(Gathered::about_focus(
        osf("filePath"),
        GatherValue::literal(info.materialized_path.clone()),
    ));
    out
}

/// Version history, one anonymous node per stored version; bare checksum
/// URNs for non-versioned files
pub fn gather_versions(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let Some(info) = resource.file_info() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if info.versions.is_empty() {
        for (algorithm, hex) in &info.hashes {
            if algorithm.contains(' ') {
                continue;
            }
            out.push(Gathered::about_focus(
                osf("hasContent"),
                GatherValue::iri(checksum_iri(algorithm, hex)),
            ));
        }
        return out;
    }
    for version in &info.versions {
        let node = ctx.blanks.fresh();
        out.push(Gathered::about_focus(
            osf("hasFileVersion"),
            GatherValue::Term(node.clone()),
        ));
        out.push(Gathered::about(
            node.clone(),
            rdf_type(),
            GatherValue::iri(osf("FileVersion")),
        ));
        if let Some(creator) = version
            .creator_guid
            .as_ref()
            .and_then(|guid| ctx.focus_for_guid(guid))
        {
            out.push(Gathered::about(
                node.clone(),
                dct("creator"),
                GatherValue::Focus(creator),
            ));
        }
        out.push(Gathered::about(
            node.clone(),
            dct("created"),
            GatherValue::Date(version.created),
        ));
        out.push(Gathered::about(
            node.clone(),
            dct("modified"),
            GatherValue::Date(version.modified),
        ));
        out.push(Gathered::about(
            node.clone(),
            dct("format"),
            GatherValue::literal(version.content_type.clone()),
        ));
        out.push(Gathered::about(
            node.clone(),
            dct("extent"),
            GatherValue::literal(format_byte_extent(version.size_bytes)),
        ));
        out.push(Gathered::about(
            node.clone(),
            osf("versionNumber"),
            GatherValue::literal(version.version_number.clone()),
        ));
        out.push(Gathered::about(
            node,
            dct("requires"),
            GatherValue::iri(checksum_iri("sha-256", &version.sha256)),
        ));
    }
    out
}

/// Guid-bearing files contained by this resource
pub fn gather_files(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    resource
        .file_guids()
        .iter()
        .filter_map(|guid| ctx.focus_for_guid(guid))
        .map(|file_focus| Gathered::about_focus(osf("contains"), GatherValue::Focus(file_focus)))
        .collect()
}

/// Containment both ways, plus the computed root shortcut
pub fn gather_parts(
    focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = Vec::new();
    for child_guid in resource.child_guids() {
        if let Some(child) = ctx.focus_for_guid(child_guid) {
            out.push(Gathered::about_focus(
                dct("hasPart"),
                GatherValue::Focus(child),
            ));
        }
    }
    if let Some(parent_guid) = resource.parent_guid() {
        if let Some(parent) = ctx.focus_for_guid(parent_guid) {
            out.push(Gathered::about_focus(
                dct("isPartOf"),
                GatherValue::Focus(parent),
            ));
        }
        if let Some(root_guid) = walk_to_root(resource, &focus.guid, ctx) {
            if let Some(root) = ctx.focus_for_guid(&root_guid) {
                out.push(Gathered::about_focus(
                    osf("hasRoot"),
                    GatherValue::Focus(root),
                ));
            }
        }
    }
    out
}

/// Follow parent links to their end. Hierarchies are expected to be DAGs,
/// but malformed data could introduce a cycle; the visited set makes the
/// walk terminate regardless.
fn walk_to_root(
    resource: &dyn Describable,
    own_guid: &str,
    ctx: &GatherContext,
) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    seen.insert(own_guid.to_string());
    let mut current = resource.parent_guid()?.to_string();
    loop {
        if !seen.insert(current.clone()) {
            return None;
        }
        let Some(parent_resource) = ctx.store.resolve(&current) else {
            return Some(current);
        };
        match parent_resource.parent_guid() {
            Some(next) => current = next.to_string(),
            None => return Some(current),
        }
    }
}

/// Version-of relations, external article DOI, and outcome artifacts
pub fn gather_related_items(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = Vec::new();
    for registration_guid in resource.registration_guids() {
        if let Some(registration) = ctx.focus_for_guid(registration_guid) {
            out.push(Gathered::about_focus(
                dct("hasVersion"),
                GatherValue::Focus(registration),
            ));
        }
    }
    if let Some(project_guid) = resource.registered_from_guid() {
        if let Some(project) = ctx.focus_for_guid(project_guid) {
            out.push(Gathered::about_focus(
                dct("isVersionOf"),
                GatherValue::Focus(project),
            ));
        }
    }
    if let Some(article_doi) = resource.article_doi() {
        let doi_iri = Term::iri(format!("{DOI}{article_doi}"));
        out.push(Gathered::about_focus(
            dct("relation"),
            GatherValue::Term(doi_iri.clone()),
        ));
        let doi_text = doi_iri.as_iri().map(String::from);
        out.push(Gathered::about(
            doi_iri,
            dct("identifier"),
            GatherValue::opt_literal(doi_text),
        ));
    }
    for artifact in resource.artifacts() {
        let artifact_iri = Term::iri(artifact.iri.clone());
        out.push(Gathered::about_focus(
            dct("references"),
            GatherValue::Term(artifact_iri.clone()),
        ));
        out.push(Gathered::about(
            artifact_iri.clone(),
            dct("title"),
            GatherValue::opt_literal(artifact.title.clone()),
        ));
        out.push(Gathered::about(
            artifact_iri,
            dct("description"),
            GatherValue::opt_literal(artifact.description.clone()),
        ));
    }
    out
}

/// Visible contributors become creators
pub fn gather_agents(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    resource
        .contributors()
        .iter()
        .filter(|c| c.visible)
        .filter_map(|c| ctx.focus_for_guid(&c.user_guid))
        .map(|user| Gathered::about_focus(dct("creator"), GatherValue::Focus(user)))
        .collect()
}

/// Institutional affiliations; institutions are identified by their own
/// domain IRI and are typed and named inline
pub fn gather_affiliated_institutions(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = Vec::new();
    for institution_id in resource.institution_ids() {
        let Some(institution) = ctx.store.institution(institution_id) else {
            continue;
        };
        let iri = Term::iri(institution.iri.clone());
        out.push(Gathered::about_focus(
            osf("affiliation"),
            GatherValue::Term(iri.clone()),
        ));
        out.push(Gathered::about(
            iri.clone(),
            rdf_type(),
            GatherValue::iri(dct("Agent")),
        ));
        out.push(Gathered::about(
            iri.clone(),
            rdf_type(),
            GatherValue::iri(foaf("Organization")),
        ));
        out.push(Gathered::about(
            iri.clone(),
            foaf("name"),
            GatherValue::literal(institution.name.clone()),
        ));
        out.push(Gathered::about(
            iri,
            dct("identifier"),
            GatherValue::literal(institution.iri.clone()),
        ));
    }
    out
}

/// Free-form funding records projected into funder agents and award nodes
pub fn gather_funding(
    focus: &Focus,
    _resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let Some(record) = ctx.store.metadata_record(&focus.guid) else {
        return Vec::new();
    };
    let funding_info = record.funding_info.clone();
    let mut out = Vec::new();
    for funding in &funding_info {
        let funder = match &funding.funder_identifier {
            Some(identifier) => Term::iri(identifier.clone()),
            None => ctx.blanks.fresh(),
        };
        out.push(Gathered::about_focus(
            osf("funder"),
            GatherValue::Term(funder.clone()),
        ));
        out.push(Gathered::about(
            funder.clone(),
            rdf_type(),
            GatherValue::iri(dct("Agent")),
        ));
        out.push(Gathered::about(
            funder.clone(),
            foaf("name"),
            GatherValue::literal(funding.funder_name.clone()),
        ));
        if let Some(identifier) = &funding.funder_identifier {
            out.push(Gathered::about(
                funder.clone(),
                dct("identifier"),
                GatherValue::literal(identifier.clone()),
            ));
        }
        out.push(Gathered::about(
            funder.clone(),
            osf("funderIdentifierType"),
            GatherValue::opt_literal(funding.funder_identifier_type.clone()),
        ));

        if funding.has_award() {
            let award = match &funding.award_uri {
                Some(uri) => Term::iri(uri.clone()),
                None => ctx.blanks.fresh(),
            };
            out.push(Gathered::about_focus(
                osf("hasFunding"),
                GatherValue::Term(award.clone()),
            ));
            out.push(Gathered::about(
                award.clone(),
                rdf_type(),
                GatherValue::iri(osf("FundingAward")),
            ));
            out.push(Gathered::about(
                award.clone(),
                dct("title"),
                GatherValue::opt_literal(funding.award_title.clone()),
            ));
            out.push(Gathered::about(
                award.clone(),
                osf("awardNumber"),
                GatherValue::opt_literal(funding.award_number.clone()),
            ));
            if let Some(uri) = &funding.award_uri {
                out.push(Gathered::about(
                    award.clone(),
                    dct("identifier"),
                    GatherValue::literal(uri.clone()),
                ));
            }
            out.push(Gathered::about(
                award,
                dct("contributor"),
                GatherValue::Term(funder),
            ));
        }
    }
    out
}

/// Person type, display name, and identity-provider identifiers
///
/// Unverified ORCID claims are never emitted.
pub fn gather_user_basics(
    _focus: &Focus,
    resource: &dyn Describable,
    _ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let Some(profile) = resource.user_profile() else {
        return Vec::new();
    };
    let mut out = vec![
        Gathered::about_focus(rdf_type(), GatherValue::iri(foaf("Person"))),
        Gathered::about_focus(foaf("name"), GatherValue::literal(profile.fullname.clone())),
    ];
    if let Some(orcid) = &profile.orcid {
        if orcid.verified {
            let orcid_url = format!("{ORCID}{}", orcid.value);
            out.push(Gathered::about_focus(
                dct("identifier"),
                GatherValue::literal(orcid_url.clone()),
            ));
            out.push(Gathered::about_focus(
                term(OWL, "sameAs"),
                GatherValue::iri(orcid_url),
            ));
        }
    }
    for website in &profile.profile_websites {
        out.push(Gathered::about_focus(
            dct("identifier"),
            GatherValue::literal(website.clone()),
        ));
    }
    for scholar_url in &profile.scholar_profile_urls {
        out.push(Gathered::about_focus(
            dct("identifier"),
            GatherValue::literal(scholar_url.clone()),
        ));
    }
    out
}

/// Curated collections this resource was submitted into
pub fn gather_collection_membership(
    _focus: &Focus,
    resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let mut out = Vec::new();
    for membership in resource.collection_memberships() {
        let collection_iri = Term::iri(format!(
            "{}collections/{}",
            ctx.vocab.domain, membership.provider_id
        ));
        out.push(Gathered::about_focus(
            osf("isPartOfCollection"),
            GatherValue::Term(collection_iri.clone()),
        ));
        out.push(Gathered::about(
            collection_iri.clone(),
            dct("type"),
            GatherValue::iri(term(DCMITYPE, "Collection")),
        ));
        out.push(Gathered::about(
            collection_iri,
            dct("title"),
            GatherValue::literal(membership.provider_name.clone()),
        ));
    }
    out
}

/// Escape hatch: pre-built statements from a custom metadata record,
/// merged verbatim (still tidied)
pub fn gather_custom_metadata(
    focus: &Focus,
    _resource: &dyn Describable,
    ctx: &mut GatherContext,
) -> Vec<Gathered> {
    let Some(record) = ctx.store.metadata_record(&focus.guid) else {
        return Vec::new();
    };
    record
        .custom
        .iter()
        .filter_map(|statement| custom_statement_triple(statement, &focus.iri))
        .map(|triple| {
            let predicate = match triple.predicate {
                Term::Iri(iri) => iri,
                _ => String::new(),
            };
            Gathered::about(triple.subject, predicate, GatherValue::Term(triple.object))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::{BlankNodes, GatherContext};
    use crate::resource::{
        Contributor, MemoryStore, OrcidClaim, ProjectRecord, ResourceRecord, ResourceStore,
        Subject, UserProfile, UserRecord,
    };
    use crate::vocab::VocabRegistry;

    fn user_record(profile: UserProfile) -> ResourceRecord {
        ResourceRecord::User(UserRecord {
            profile,
            institution_ids: vec![],
        })
    }

    #[test]
    fn test_format_byte_extent_rounding() {
        assert_eq!(format_byte_extent(123456), "0.118 MB");
        assert_eq!(format_byte_extent(0), "0.000 MB");
        assert_eq!(format_byte_extent(1_048_576), "1.000 MB");
    }

    #[test]
    fn test_unverified_orcid_is_excluded() {
        let mut store = MemoryStore::new();
        store.insert(
            "useru",
            user_record(UserProfile {
                fullname: "Shady Claimant".to_string(),
                orcid: Some(OrcidClaim {
                    value: "1234-4321-6789-9876".to_string(),
                    verified: false,
                }),
                profile_websites: vec![],
                scholar_profile_urls: vec![],
            }),
        );
        let vocab_registry = VocabRegistry::default();
        let mut blanks = BlankNodes::default();
        let mut ctx = GatherContext {
            store: &store,
            vocab: &vocab_registry,
            blanks: &mut blanks,
        };
        let focus = ctx.focus_for_guid("useru").unwrap();
        let resource = store.resolve("useru").unwrap();
        let gathered = gather_user_basics(&focus, resource, &mut ctx);
        // type + name only; no orcid identifier, no sameAs
        assert_eq!(gathered.len(), 2);
    }

    #[test]
    fn test_verified_orcid_is_included() {
        let mut store = MemoryStore::new();
        store.insert(
            "useru",
            user_record(UserProfile {
                fullname: "Verified Person".to_string(),
                orcid: Some(OrcidClaim {
                    value: "1234-4321-5678-8765".to_string(),
                    verified: true,
                }),
                profile_websites: vec![],
                scholar_profile_urls: vec![],
            }),
        );
        let vocab_registry = VocabRegistry::default();
        let mut blanks = BlankNodes::default();
        let mut ctx = GatherContext {
            store: &store,
            vocab: &vocab_registry,
            blanks: &mut blanks,
        };
        let focus = ctx.focus_for_guid("useru").unwrap();
        let resource = store.resolve("useru").unwrap();
        let gathered = gather_user_basics(&focus, resource, &mut ctx);
        assert_eq!(gathered.len(), 4);
    }

    #[test]
    fn test_invisible_contributors_are_excluded() {
        let mut store = MemoryStore::new();
        store.insert(
            "projp",
            ResourceRecord::Project(ProjectRecord {
                contributors: vec![
                    Contributor {
                        user_guid: "user1".to_string(),
                        visible: true,
                    },
                    Contributor {
                        user_guid: "user2".to_string(),
                        visible: false,
                    },
                ],
                ..Default::default()
            }),
        );
        store.insert(
            "user1",
            user_record(UserProfile {
                fullname: "Visible".to_string(),
                orcid: None,
                profile_websites: vec![],
                scholar_profile_urls: vec![],
            }),
        );
        store.insert(
            "user2",
            user_record(UserProfile {
                fullname: "Hidden".to_string(),
                orcid: None,
                profile_websites: vec![],
                scholar_profile_urls: vec![],
            }),
        );
        let vocab_registry = VocabRegistry::default();
        let mut blanks = BlankNodes::default();
        let mut ctx = GatherContext {
            store: &store,
            vocab: &vocab_registry,
            blanks: &mut blanks,
        };
        let focus = ctx.focus_for_guid("projp").unwrap();
        let resource = store.resolve("projp").unwrap();
        let gathered = gather_agents(&focus, resource, &mut ctx);
        assert_eq!(gathered.len(), 1);
    }

    #[test]
    fn test_alt_lineage_subject_surfaces_canonical_concept() {
        let mut store = MemoryStore::new();
        store.insert(
            "projp",
            ResourceRecord::Project(ProjectRecord {
                subject_ids: vec!["alt-econ".to_string()],
                ..Default::default()
            }),
        );
        store.subjects.insert(
            "alt-econ".to_string(),
            Subject {
                id: "alt-econ".to_string(),
                text: "Economia".to_string(),
                iri: "https://alt.example/economia".to_string(),
                parent_id: None,
                canonical_id: Some("econ".to_string()),
            },
        );
        store.subjects.insert(
            "econ".to_string(),
            Subject {
                id: "econ".to_string(),
                text: "Economics".to_string(),
                iri: "https://bepress.example/economics".to_string(),
                parent_id: None,
                canonical_id: None,
            },
        );
        let vocab_registry = VocabRegistry::default();
        let mut blanks = BlankNodes::default();
        let mut ctx = GatherContext {
            store: &store,
            vocab: &vocab_registry,
            blanks: &mut blanks,
        };
        let focus = ctx.focus_for_guid("projp").unwrap();
        let resource = store.resolve("projp").unwrap();
        let gathered = gather_subjects(&focus, resource, &mut ctx);

        // the subject points at the canonical concept, not the alt IRI
        let subjects: Vec<_> = gathered
            .iter()
            .filter(|g| g.predicate == dct("subject"))
            .collect();
        assert_eq!(subjects.len(), 1);
        assert!(matches!(
            &subjects[0].value,
            GatherValue::Term(Term::Iri(iri)) if iri == "https://bepress.example/economics"
        ));
        assert!(!gathered.iter().any(|g| matches!(
            &g.value,
            GatherValue::Term(Term::Iri(iri)) if iri == "https://alt.example/economia"
        )));
        // the alt text survives as an alternate label on the canonical concept
        assert!(gathered.iter().any(|g| {
            g.predicate == skos("altLabel")
                && g.subject.as_ref().and_then(Term::as_iri)
                    == Some("https://bepress.example/economics")
                && matches!(&g.value, GatherValue::Term(t) if t.as_literal() == Some("Economia"))
        }));
        // and the canonical label stays the preferred one
        assert!(gathered.iter().any(|g| {
            g.predicate == skos("prefLabel")
                && matches!(&g.value, GatherValue::Term(t) if t.as_literal() == Some("Economics"))
        }));
    }

    #[test]
    fn test_root_walk_terminates_on_cycle() {
        let mut store = MemoryStore::new();
        // malformed: a <-> b parent cycle
        store.insert(
            "aaaaa",
            ResourceRecord::Project(ProjectRecord {
                parent_guid: Some("bbbbb".to_string()),
                ..Default::default()
            }),
        );
        store.insert(
            "bbbbb",
            ResourceRecord::Project(ProjectRecord {
                parent_guid: Some("aaaaa".to_string()),
                ..Default::default()
            }),
        );
        let vocab_registry = VocabRegistry::default();
        let mut blanks = BlankNodes::default();
        let mut ctx = GatherContext {
            store: &store,
            vocab: &vocab_registry,
            blanks: &mut blanks,
        };
        let focus = ctx.focus_for_guid("aaaaa").unwrap();
        let resource = store.resolve("aaaaa").unwrap();
        // must terminate; the cycle yields no root shortcut but still
        // yields the isPartOf link
        let gathered = gather_parts(&focus, resource, &mut ctx);
        assert_eq!(gathered.len(), 1);
    }
}
