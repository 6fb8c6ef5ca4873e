// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Case, CaseKey};

/// Two-tier record cache. `master` is the authoritative snapshot as
/// last returned by the host for the active profile and is the only
/// input the search and filter pipelines ever read. `derived` is the
/// currently displayed subset and never a source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCache {
    master: Option<Vec<Case>>,
    derived: Vec<Case>,
    edit_target: Option<CaseKey>,
}

impl RecordCache {
    /// Replaces the derived tier always, and the master tier only when
    /// `make_master` is set or no master exists yet. Derived views
    /// (search/filter output) must load with `make_master = false` so
    /// they never compound against already-filtered data.
    pub fn load(&mut self, records: Vec<Case>, make_master: bool) {
        if make_master || self.master.is_none() {
            self.master = Some(records.clone());
        }
        self.derived = records;
    }

    /// Clears every tier. Must run before loading a different
    /// profile's data so no record leaks across identities.
    pub fn invalidate(&mut self) {
        self.master = None;
        self.derived.clear();
        self.edit_target = None;
    }

    /// Looks up a record in the last-rendered tier for populating the
    /// edit form. A miss is legitimate (the record may have been
    /// deleted underneath the view) and must not panic.
    pub fn editable(&self, key: &CaseKey) -> Option<&Case> {
        self.derived.iter().find(|case| &case.key == key)
    }

    pub fn master(&self) -> &[Case] {
        self.master.as_deref().unwrap_or_default()
    }

    pub fn has_master(&self) -> bool {
        self.master.is_some()
    }

    pub fn derived(&self) -> &[Case] {
        &self.derived
    }

    pub fn edit_target(&self) -> Option<&CaseKey> {
        self.edit_target.as_ref()
    }

    pub fn set_edit_target(&mut self, key: CaseKey) {
        self.edit_target = Some(key);
    }

    pub fn clear_edit_target(&mut self) {
        self.edit_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::RecordCache;
    use crate::{Case, CaseKey};
    use time::OffsetDateTime;

    fn case(key: &str, name: &str) -> Case {
        Case {
            key: CaseKey::from(key),
            case_no: String::new(),
            case_name: name.to_owned(),
            year: "2020".to_owned(),
            court: String::new(),
            description: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
            links_count: 0,
        }
    }

    #[test]
    fn first_load_establishes_master_even_without_flag() {
        let mut cache = RecordCache::default();
        cache.load(vec![case("a", "Alpha")], false);
        assert!(cache.has_master());
        assert_eq!(cache.master().len(), 1);
    }

    #[test]
    fn non_master_load_replaces_derived_only() {
        let mut cache = RecordCache::default();
        cache.load(vec![case("a", "Alpha"), case("b", "Beta")], true);
        cache.load(vec![case("b", "Beta")], false);

        assert_eq!(cache.derived().len(), 1);
        assert_eq!(cache.master().len(), 2, "master must survive derived loads");
    }

    #[test]
    fn master_load_replaces_master_wholesale() {
        let mut cache = RecordCache::default();
        cache.load(vec![case("a", "Alpha")], true);
        cache.load(vec![case("b", "Beta"), case("c", "Gamma")], true);

        assert_eq!(cache.master().len(), 2);
        assert!(cache.master().iter().all(|c| c.key.as_str() != "a"));
    }

    #[test]
    fn invalidate_clears_every_tier() {
        let mut cache = RecordCache::default();
        cache.load(vec![case("a", "Alpha")], true);
        cache.set_edit_target(CaseKey::from("a"));

        cache.invalidate();
        assert!(!cache.has_master());
        assert!(cache.derived().is_empty());
        assert!(cache.edit_target().is_none());
    }

    #[test]
    fn editable_reads_derived_tier_and_tolerates_misses() {
        let mut cache = RecordCache::default();
        cache.load(vec![case("a", "Alpha"), case("b", "Beta")], true);
        cache.load(vec![case("b", "Beta")], false);

        assert!(cache.editable(&CaseKey::from("b")).is_some());
        // Present in master but filtered out of the rendered tier.
        assert!(cache.editable(&CaseKey::from("a")).is_none());
        assert!(cache.editable(&CaseKey::from("missing")).is_none());
    }
}
