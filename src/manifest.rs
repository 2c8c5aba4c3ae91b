//! Bagit-style manifests for archived metadata bags
//!
//! A manifest line is `[hex hash][space][path]`. Payload manifests cover
//! files under `data/`; tag manifests cover everything else. Entries are
//! dual-keyed so membership can be checked from either direction.

use std::collections::BTreeMap;

use crate::error::MetadataError;

/// One manifest line: a content hash and the path it covers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManifestEntry {
    pub file_hash: String,
    pub file_path: String,
}

impl ManifestEntry {
    pub fn new(file_hash: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            file_hash: file_hash.into(),
            file_path: file_path.into(),
        }
    }

    /// Lowercase hexadecimal, nonempty
    pub fn is_hex_hash(&self) -> bool {
        !self.file_hash.is_empty()
            && self
                .file_hash
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    pub fn is_data_path(&self) -> bool {
        self.file_path.starts_with("data/")
    }

    pub fn to_line(&self) -> String {
        format!("{} {}", self.file_hash, self.file_path)
    }

    /// Parse a `[hash][space][path]` line; the path may itself contain spaces
    pub fn from_line(line: &str) -> Result<Self, MetadataError> {
        let (file_hash, file_path) = line
            .split_once(' ')
            .ok_or_else(|| MetadataError::InvalidInput(format!("malformed manifest line: {line}")))?;
        if file_hash.is_empty() || file_path.is_empty() {
            return Err(MetadataError::InvalidInput(format!(
                "malformed manifest line: {line}"
            )));
        }
        Ok(Self::new(file_hash, file_path))
    }
}

/// Which half of the bag a manifest covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `data/` files
    Payload,
    /// Everything outside `data/`
    Tag,
}

/// A set of manifest entries, queryable by hash or by path
#[derive(Debug, Clone)]
pub struct Manifest {
    kind: ManifestKind,
    by_hash: BTreeMap<String, ManifestEntry>,
    path_to_hash: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(kind: ManifestKind) -> Self {
        Self {
            kind,
            by_hash: BTreeMap::new(),
            path_to_hash: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// Parse manifest lines; fails if any entry is invalid for this kind
    pub fn from_lines<'a>(
        kind: ManifestKind,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, MetadataError> {
        let mut manifest = Self::new(kind);
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            manifest.add_entry(ManifestEntry::from_line(line)?);
        }
        if !manifest.all_entries_valid() {
            return Err(MetadataError::InvalidInput(
                "manifest contains an invalid entry".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Insert or replace; stale keys from a replaced entry are dropped
    pub fn add_entry(&mut self, entry: ManifestEntry) {
        if let Some(previous) = self.by_hash.get(&entry.file_hash) {
            self.path_to_hash.remove(&previous.file_path);
        }
        if let Some(previous_hash) = self.path_to_hash.get(&entry.file_path) {
            if previous_hash != &entry.file_hash {
                let previous_hash = previous_hash.clone();
                self.by_hash.remove(&previous_hash);
            }
        }
        self.path_to_hash
            .insert(entry.file_path.clone(), entry.file_hash.clone());
        self.by_hash.insert(entry.file_hash.clone(), entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.by_hash.values()
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn file_path(&self, file_hash: &str) -> Option<&str> {
        self.by_hash.get(file_hash).map(|e| e.file_path.as_str())
    }

    pub fn file_hash(&self, file_path: &str) -> Option<&str> {
        self.path_to_hash.get(file_path).map(String::as_str)
    }

    fn entry_is_valid(&self, entry: &ManifestEntry) -> bool {
        entry.is_hex_hash()
            && match self.kind {
                ManifestKind::Payload => entry.is_data_path(),
                ManifestKind::Tag => !entry.is_data_path(),
            }
    }

    pub fn all_entries_valid(&self) -> bool {
        self.entries().all(|entry| self.entry_is_valid(entry))
    }

    /// Serialized lines, sorted by hash
    pub fn to_lines(&self) -> Vec<String> {
        self.entries().map(ManifestEntry::to_line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_parsing_and_round_trip() {
        let entry = ManifestEntry::from_line("abc123 data/file with spaces.txt").unwrap();
        assert_eq!(entry.file_hash, "abc123");
        assert_eq!(entry.file_path, "data/file with spaces.txt");
        assert_eq!(entry.to_line(), "abc123 data/file with spaces.txt");

        assert!(ManifestEntry::from_line("no-space-here").is_err());
    }

    #[test]
    fn test_hex_hash_check() {
        assert!(ManifestEntry::new("0123456789abcdef", "data/x").is_hex_hash());
        assert!(!ManifestEntry::new("NOTHEX", "data/x").is_hex_hash());
        assert!(!ManifestEntry::new("", "data/x").is_hex_hash());
    }

    #[test]
    fn test_dual_keyed_lookup() {
        let mut manifest = Manifest::new(ManifestKind::Payload);
        manifest.add_entry(ManifestEntry::new("aaaa", "data/one.txt"));
        manifest.add_entry(ManifestEntry::new("bbbb", "data/two.txt"));
        assert_eq!(manifest.file_path("aaaa"), Some("data/one.txt"));
        assert_eq!(manifest.file_hash("data/two.txt"), Some("bbbb"));
        assert_eq!(manifest.file_path("cccc"), None);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_replacing_an_entry_drops_stale_keys() {
        let mut manifest = Manifest::new(ManifestKind::Payload);
        manifest.add_entry(ManifestEntry::new("aaaa", "data/one.txt"));
        manifest.add_entry(ManifestEntry::new("aaaa", "data/renamed.txt"));
        assert_eq!(manifest.file_path("aaaa"), Some("data/renamed.txt"));
        assert_eq!(manifest.file_hash("data/one.txt"), None);
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_payload_manifest_rejects_tag_paths() {
        let result = Manifest::from_lines(
            ManifestKind::Payload,
            ["aaaa data/fine.txt", "bbbb bagit.txt"],
        );
        assert!(matches!(result, Err(MetadataError::InvalidInput(_))));
    }

    #[test]
    fn test_tag_manifest_rejects_data_paths() {
        let result = Manifest::from_lines(ManifestKind::Tag, ["aaaa data/nope.txt"]);
        assert!(matches!(result, Err(MetadataError::InvalidInput(_))));

        let ok = Manifest::from_lines(ManifestKind::Tag, ["aaaa bag-info.txt", ""]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn test_to_lines_sorted_by_hash() {
        let mut manifest = Manifest::new(ManifestKind::Payload);
        manifest.add_entry(ManifestEntry::new("ffff", "data/z.txt"));
        manifest.add_entry(ManifestEntry::new("0000", "data/a.txt"));
        assert_eq!(
            manifest.to_lines(),
            vec!["0000 data/a.txt".to_string(), "ffff data/z.txt".to_string()]
        );
    }
}
