//! Resource capability model and the read-only resource store
//!
//! The durable data layer is an external collaborator; this module defines
//! the narrow interface the gatherers consume. Instead of probing arbitrary
//! attributes at runtime, each resource kind declares the facets it carries
//! through the [`Describable`] trait: an accessor per facet, defaulting to
//! "not present". Gatherers are written against the trait, never against a
//! concrete kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::graph::Triple;

/// Concrete kind of a describable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Registration,
    File,
    User,
}

impl ResourceKind {
    /// Local name of the kind's rdf:type in the OSF vocabulary
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Project => "Project",
            ResourceKind::Registration => "Registration",
            ResourceKind::File => "File",
            ResourceKind::User => "User",
        }
    }
}

/// A license applied through a license record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Copyright/licensing info attached to a container resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub copyright_holders: Vec<String>,
    /// None means a custom or absent license (rights become a blank node)
    #[serde(default)]
    pub license: Option<License>,
}

/// A tag on a resource; system tags never surface as keywords
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub system: bool,
}

/// A node in the hierarchical subject taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub text: String,
    pub iri: String,
    /// Parent subject id within the same lineage
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Canonical-taxonomy counterpart for alt-lineage subjects
    #[serde(default)]
    pub canonical_id: Option<String>,
}

/// One stored version of a content-addressable file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVersion {
    #[serde(default)]
    pub creator_guid: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub content_type: String,
    pub size_bytes: u64,
    pub version_number: String,
    pub sha256: String,
}

/// File-specific facets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub materialized_path: String,
    /// Guid of the containing resource
    pub target_guid: String,
    #[serde(default)]
    pub versions: Vec<FileVersion>,
    /// For non-versioned files: algorithm name -> hex digest
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

/// Trigger category of a moderation workflow action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationTrigger {
    Submit,
    Accept,
    Other,
}

/// One timestamped moderation workflow action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationAction {
    pub trigger: ModerationTrigger,
    pub created: DateTime<Utc>,
}

/// A contributor link; only visible contributors surface as creators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub user_guid: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

/// An outcome artifact attached to a registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeArtifact {
    pub iri: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An identity-provider claim on a user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrcidClaim {
    pub value: String,
    #[serde(default)]
    pub verified: bool,
}

/// User-specific facets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub fullname: String,
    #[serde(default)]
    pub orcid: Option<OrcidClaim>,
    #[serde(default)]
    pub profile_websites: Vec<String>,
    /// Full URLs of scholar-profile pages
    #[serde(default)]
    pub scholar_profile_urls: Vec<String>,
}

/// An institution, identified by its own domain IRI (never guid-wrapped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub iri: String,
}

/// Membership of a resource in a curated collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMembership {
    pub provider_id: String,
    pub provider_name: String,
}

/// One record in the free-form funding list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingRecord {
    pub funder_name: String,
    #[serde(default)]
    pub funder_identifier: Option<String>,
    #[serde(default)]
    pub funder_identifier_type: Option<String>,
    #[serde(default)]
    pub award_title: Option<String>,
    #[serde(default)]
    pub award_uri: Option<String>,
    #[serde(default)]
    pub award_number: Option<String>,
}

impl FundingRecord {
    pub fn has_award(&self) -> bool {
        self.award_title.is_some() || self.award_uri.is_some() || self.award_number.is_some()
    }
}

/// A pre-built statement from a custom metadata record, merged verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomStatement {
    /// None means the described resource itself
    #[serde(default)]
    pub subject: Option<String>,
    pub predicate: String,
    #[serde(default)]
    pub object_iri: Option<String>,
    #[serde(default)]
    pub object_literal: Option<String>,
}

/// Per-guid metadata override record
///
/// Title, description and language here take precedence over the resource's
/// own fields; for bare files this record is the only source of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub resource_type_general: Option<String>,
    #[serde(default)]
    pub funding_info: Vec<FundingRecord>,
    #[serde(default)]
    pub custom: Vec<CustomStatement>,
}

/// Per-facet read access to one resource
///
/// Every accessor defaults to "facet not carried"; each concrete kind
/// overrides only what it actually has.
pub trait Describable {
    fn kind(&self) -> ResourceKind;

    fn created(&self) -> Option<DateTime<Utc>> {
        None
    }
    fn modified(&self) -> Option<DateTime<Utc>> {
        None
    }
    /// Last-activity timestamp, preferred over `modified` when present
    fn last_logged(&self) -> Option<DateTime<Utc>> {
        None
    }
    fn embargo_end_date(&self) -> Option<DateTime<Utc>> {
        None
    }
    fn title(&self) -> Option<&str> {
        None
    }
    fn description(&self) -> Option<&str> {
        None
    }
    fn doi(&self) -> Option<&str> {
        None
    }
    fn article_doi(&self) -> Option<&str> {
        None
    }
    fn tags(&self) -> &[Tag] {
        &[]
    }
    fn subject_ids(&self) -> &[String] {
        &[]
    }
    fn license_record(&self) -> Option<&LicenseRecord> {
        None
    }
    fn file_info(&self) -> Option<&FileInfo> {
        None
    }
    /// Guids of files contained by this resource
    fn file_guids(&self) -> &[String] {
        &[]
    }
    fn child_guids(&self) -> &[String] {
        &[]
    }
    fn parent_guid(&self) -> Option<&str> {
        None
    }
    fn contributors(&self) -> &[Contributor] {
        &[]
    }
    fn institution_ids(&self) -> &[String] {
        &[]
    }
    fn moderation_actions(&self) -> &[ModerationAction] {
        &[]
    }
    /// Registrations derived from this project
    fn registration_guids(&self) -> &[String] {
        &[]
    }
    /// Project this registration was made from
    fn registered_from_guid(&self) -> Option<&str> {
        None
    }
    fn artifacts(&self) -> &[OutcomeArtifact] {
        &[]
    }
    fn user_profile(&self) -> Option<&UserProfile> {
        None
    }
    fn collection_memberships(&self) -> &[CollectionMembership] {
        &[]
    }
}

/// A project or project component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_logged: Option<DateTime<Utc>>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub subject_ids: Vec<String>,
    #[serde(default)]
    pub license_record: Option<LicenseRecord>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub institution_ids: Vec<String>,
    #[serde(default)]
    pub child_guids: Vec<String>,
    #[serde(default)]
    pub parent_guid: Option<String>,
    #[serde(default)]
    pub file_guids: Vec<String>,
    #[serde(default)]
    pub registration_guids: Vec<String>,
    #[serde(default)]
    pub collection_memberships: Vec<CollectionMembership>,
}

/// A registration: a frozen, versioned copy of a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub registered_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_logged: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embargo_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub article_doi: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub subject_ids: Vec<String>,
    #[serde(default)]
    pub license_record: Option<LicenseRecord>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub moderation_actions: Vec<ModerationAction>,
    #[serde(default)]
    pub registered_from_guid: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<OutcomeArtifact>,
    #[serde(default)]
    pub file_guids: Vec<String>,
}

/// A stored file with a guid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub info: FileInfo,
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub institution_ids: Vec<String>,
}

impl Describable for ProjectRecord {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Project
    }
    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
    fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }
    fn last_logged(&self) -> Option<DateTime<Utc>> {
        self.last_logged
    }
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }
    fn tags(&self) -> &[Tag] {
        &self.tags
    }
    fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }
    fn license_record(&self) -> Option<&LicenseRecord> {
        self.license_record.as_ref()
    }
    fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }
    fn institution_ids(&self) -> &[String] {
        &self.institution_ids
    }
    fn child_guids(&self) -> &[String] {
        &self.child_guids
    }
    fn parent_guid(&self) -> Option<&str> {
        self.parent_guid.as_deref()
    }
    fn file_guids(&self) -> &[String] {
        &self.file_guids
    }
    fn registration_guids(&self) -> &[String] {
        &self.registration_guids
    }
    fn collection_memberships(&self) -> &[CollectionMembership] {
        &self.collection_memberships
    }
}

impl Describable for RegistrationRecord {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Registration
    }
    fn created(&self) -> Option<DateTime<Utc>> {
        self.registered_date
    }
    fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }
    fn last_logged(&self) -> Option<DateTime<Utc>> {
        self.last_logged
    }
    fn embargo_end_date(&self) -> Option<DateTime<Utc>> {
        self.embargo_end_date
    }
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }
    fn article_doi(&self) -> Option<&str> {
        self.article_doi.as_deref()
    }
    fn tags(&self) -> &[Tag] {
        &self.tags
    }
    fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }
    fn license_record(&self) -> Option<&LicenseRecord> {
        self.license_record.as_ref()
    }
    fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }
    fn moderation_actions(&self) -> &[ModerationAction] {
        &self.moderation_actions
    }
    fn registered_from_guid(&self) -> Option<&str> {
        self.registered_from_guid.as_deref()
    }
    fn artifacts(&self) -> &[OutcomeArtifact] {
        &self.artifacts
    }
    fn file_guids(&self) -> &[String] {
        &self.file_guids
    }
}

impl Describable for FileRecord {
    fn kind(&self) -> ResourceKind {
        ResourceKind::File
    }
    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
    fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }
    fn file_info(&self) -> Option<&FileInfo> {
        Some(&self.info)
    }
}

impl Describable for UserRecord {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }
    fn user_profile(&self) -> Option<&UserProfile> {
        Some(&self.profile)
    }
    fn institution_ids(&self) -> &[String] {
        &self.institution_ids
    }
}

/// Tagged union of resource records, for store (de)serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceRecord {
    Project(ProjectRecord),
    Registration(RegistrationRecord),
    File(FileRecord),
    User(UserRecord),
}

impl ResourceRecord {
    pub fn as_describable(&self) -> &dyn Describable {
        match self {
            ResourceRecord::Project(r) => r,
            ResourceRecord::Registration(r) => r,
            ResourceRecord::File(r) => r,
            ResourceRecord::User(r) => r,
        }
    }
}

/// Read-only access to the durable data layer
///
/// Every call may be a blocking read against slow storage; the walker
/// treats each resolution as potentially failing (resource deleted
/// mid-walk) and skips rather than aborts.
pub trait ResourceStore {
    fn resolve(&self, guid: &str) -> Option<&dyn Describable>;

    fn metadata_record(&self, _guid: &str) -> Option<&MetadataRecord> {
        None
    }

    fn subject(&self, _id: &str) -> Option<&Subject> {
        None
    }

    fn institution(&self, _id: &str) -> Option<&Institution> {
        None
    }
}

/// In-memory store, loadable from a JSON document
///
/// The backing document has four maps: `resources` (guid -> tagged record),
/// `metadata_records` (guid -> override record), `subjects` (id -> subject),
/// `institutions` (id -> institution).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceRecord>,
    #[serde(default)]
    pub metadata_records: BTreeMap<String, MetadataRecord>,
    #[serde(default)]
    pub subjects: BTreeMap<String, Subject>,
    #[serde(default)]
    pub institutions: BTreeMap<String, Institution>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(content: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn insert(&mut self, guid: impl Into<String>, record: ResourceRecord) {
        self.resources.insert(guid.into(), record);
    }
}

impl ResourceStore for MemoryStore {
    fn resolve(&self, guid: &str) -> Option<&dyn Describable> {
        self.resources.get(guid).map(|r| r.as_describable())
    }

    fn metadata_record(&self, guid: &str) -> Option<&MetadataRecord> {
        self.metadata_records.get(guid)
    }

    fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.get(id)
    }

    fn institution(&self, id: &str) -> Option<&Institution> {
        self.institutions.get(id)
    }
}

/// Statements from a custom metadata record, resolved into triples
pub fn custom_statement_triple(
    statement: &CustomStatement,
    default_subject: &str,
) -> Option<Triple> {
    use crate::graph::Term;
    let subject = Term::iri(
        statement
            .subject
            .clone()
            .unwrap_or_else(|| default_subject.to_string()),
    );
    let object = match (&statement.object_iri, &statement.object_literal) {
        (Some(iri), _) => Term::iri(iri.clone()),
        (None, Some(literal)) => Term::literal(literal.clone()),
        (None, None) => return None,
    };
    Some(Triple::new(subject, Term::iri(statement.predicate.clone()), object))
}
