// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::PathBuf;

use crate::{Case, CaseDraft, CaseKey, Link, LinkDraft, LinkId, ProfileDraft, UserProfile};

/// A logical "no" from the host: the call reached it and it declined,
/// with a message meant for the operator. Transport failures stay as
/// plain `anyhow` errors; callers downcast to tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRejection(String);

impl HostRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HostRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HostRejection {}

/// Outcome of the storage-location dialog. A cancelled dialog is a
/// normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Chosen(PathBuf),
    Cancelled,
}

/// Outcome of deleting an account: either another profile was
/// activated or no profiles remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountDeletionOutcome {
    NoUsers,
    SwitchedTo(UserProfile),
}

/// The fixed request/response surface behind which storage, document
/// handling and the OS live. Calls are local IPC-style: no timeout, no
/// cancellation, no retry.
pub trait HostApi {
    fn has_storage_location(&self) -> Result<bool>;
    fn has_profile(&self) -> Result<bool>;
    fn pick_storage_location(&mut self) -> Result<PickOutcome>;

    fn get_cases(&self) -> Result<Vec<Case>>;
    fn create_case(&mut self, draft: &CaseDraft) -> Result<Case>;
    /// `prior_key` identifies the record being updated; the draft may
    /// rename the natural key, in which case the host must keep links
    /// and documents attached and must not leave two records behind.
    fn update_case(&mut self, prior_key: &CaseKey, draft: &CaseDraft) -> Result<Case>;
    fn delete_case(&mut self, key: &CaseKey) -> Result<()>;

    fn get_links(&self, case_key: &CaseKey) -> Result<Vec<Link>>;
    fn add_link(&mut self, case_key: &CaseKey, draft: &LinkDraft) -> Result<Link>;
    fn delete_link(&mut self, case_key: &CaseKey, id: &LinkId) -> Result<()>;

    fn add_documents(&mut self, case_key: &CaseKey) -> Result<()>;
    fn open_documents(&self, case_key: &CaseKey) -> Result<()>;
    fn open_external(&self, url: &str) -> Result<()>;

    fn create_profile(&mut self, draft: &ProfileDraft) -> Result<UserProfile>;
    fn get_current_profile(&self) -> Result<Option<UserProfile>>;
    fn get_all_profiles(&self) -> Result<Vec<UserProfile>>;
    fn switch_profile(&mut self, username: &str) -> Result<()>;
    fn delete_account(&mut self, username: &str) -> Result<AccountDeletionOutcome>;
}

#[cfg(test)]
mod tests {
    use super::HostRejection;

    #[test]
    fn rejection_is_downcastable_from_anyhow() {
        let err = anyhow::Error::new(HostRejection::new("case already exists"));
        let rejection = err
            .downcast_ref::<HostRejection>()
            .expect("rejection survives anyhow wrapping");
        assert_eq!(rejection.message(), "case already exists");
    }
}
