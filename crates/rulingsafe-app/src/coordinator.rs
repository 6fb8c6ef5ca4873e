// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::host::{AccountDeletionOutcome, HostApi, HostRejection, PickOutcome};
use crate::state::{Event, Session};
use crate::{CaseDraft, CaseKey, Link, LinkDraft, LinkId, ProfileDraft};

/// Failure taxonomy at the action boundary. `Validation` never reached
/// the host; `Host` is a logical "no" carrying the host's message;
/// `Transport` is a failed call surfaced with a generic notice;
/// `InFlight` is the overlapping-mutation guard. None of these leaves
/// a cache or screen mutation behind, and none triggers a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    Validation(String),
    InFlight(String),
    Host(String),
    Transport(String),
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => f.write_str(message),
            Self::InFlight(key) => write!(f, "operation in progress for {key}"),
            Self::Host(message) => f.write_str(message),
            Self::Transport(message) => write!(f, "call failed: {message}"),
        }
    }
}

impl std::error::Error for MutationError {}

pub type MutationResult<T> = std::result::Result<T, MutationError>;

fn classify(error: anyhow::Error) -> MutationError {
    match error.downcast_ref::<HostRejection>() {
        Some(rejection) => MutationError::Host(rejection.message().to_owned()),
        None => MutationError::Transport(format!("{error:#}")),
    }
}

/// Orchestrates every create/update/delete against the host and the
/// post-mutation reconciliation: on success the edit modal closes, the
/// full record set is re-fetched as the new master, the derived view
/// is recomputed through the active view mode and the screen is
/// re-evaluated. On any failure nothing else happens.
#[derive(Debug, Default)]
pub struct MutationCoordinator {
    in_flight: BTreeSet<String>,
}

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a record as having an outstanding mutation. A second
    /// mutation on the same key is rejected, not queued. Shells that
    /// drive host calls from an event loop hold the mark for the whole
    /// suspension window.
    pub fn begin_mutation(&mut self, key: &CaseKey) -> MutationResult<()> {
        self.guard(case_token(key))
    }

    pub fn finish_mutation(&mut self, key: &CaseKey) {
        self.release(&case_token(key));
    }

    pub fn is_in_flight(&self, key: &CaseKey) -> bool {
        self.in_flight.contains(&case_token(key))
    }

    /// Startup sync: readiness flags from the host, then the first
    /// authoritative load when a profile is active.
    pub fn startup(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
    ) -> MutationResult<Vec<Event>> {
        session.readiness.storage_location_set =
            host.has_storage_location().map_err(classify)?;
        session.readiness.profile_exists = host.has_profile().map_err(classify)?;

        if session.readiness.profile_exists {
            let cases = host.get_cases().map_err(classify)?;
            Ok(session.refresh_cases(cases))
        } else {
            Ok(session.recompute_screen().into_iter().collect())
        }
    }

    pub fn pick_storage_location(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
    ) -> MutationResult<Vec<Event>> {
        match host.pick_storage_location().map_err(classify)? {
            PickOutcome::Chosen(_) => {
                session.readiness.storage_location_set = true;
                Ok(session.recompute_screen().into_iter().collect())
            }
            PickOutcome::Cancelled => Ok(Vec::new()),
        }
    }

    /// Create vs update is decided solely by whether an edit target is
    /// set when the save fires. Updates carry the prior key because
    /// the draft may rename it.
    pub fn save_case(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        draft: &CaseDraft,
    ) -> MutationResult<Vec<Event>> {
        draft
            .validate()
            .map_err(|error| MutationError::Validation(error.to_string()))?;
        let draft = draft.trimmed();

        match session.cache.edit_target().cloned() {
            Some(prior_key) => {
                self.begin_mutation(&prior_key)?;
                let result = host.update_case(&prior_key, &draft);
                self.finish_mutation(&prior_key);
                result.map_err(classify)?;
            }
            None => {
                host.create_case(&draft).map_err(classify)?;
            }
        }

        let mut events = Vec::new();
        events.extend(session.end_edit());
        let cases = host.get_cases().map_err(classify)?;
        events.extend(session.refresh_cases(cases));
        Ok(events)
    }

    pub fn delete_case(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        key: &CaseKey,
    ) -> MutationResult<Vec<Event>> {
        self.begin_mutation(key)?;
        let result = host.delete_case(key);
        self.finish_mutation(key);
        result.map_err(classify)?;

        let mut events = Vec::new();
        if session.cache.edit_target() == Some(key) {
            events.extend(session.end_edit());
        }
        let cases = host.get_cases().map_err(classify)?;
        events.extend(session.refresh_cases(cases));
        Ok(events)
    }

    pub fn load_links(
        &self,
        host: &mut dyn HostApi,
        case_key: &CaseKey,
    ) -> MutationResult<Vec<Link>> {
        host.get_links(case_key).map_err(classify)
    }

    /// Returns the refreshed link list for the modal alongside the
    /// session events from the master reload (`links_count` changed).
    pub fn add_link(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        case_key: &CaseKey,
        draft: &LinkDraft,
    ) -> MutationResult<(Vec<Link>, Vec<Event>)> {
        draft
            .validate()
            .map_err(|error| MutationError::Validation(error.to_string()))?;
        let draft = draft.trimmed();

        self.begin_mutation(case_key)?;
        let result = host.add_link(case_key, &draft);
        self.finish_mutation(case_key);
        result.map_err(classify)?;

        self.reload_links(session, host, case_key)
    }

    pub fn delete_link(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        case_key: &CaseKey,
        id: &LinkId,
    ) -> MutationResult<(Vec<Link>, Vec<Event>)> {
        self.begin_mutation(case_key)?;
        let result = host.delete_link(case_key, id);
        self.finish_mutation(case_key);
        result.map_err(classify)?;

        self.reload_links(session, host, case_key)
    }

    pub fn create_profile(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        draft: &ProfileDraft,
    ) -> MutationResult<Vec<Event>> {
        draft
            .validate()
            .map_err(|error| MutationError::Validation(error.to_string()))?;
        let draft = draft.trimmed();

        host.create_profile(&draft).map_err(classify)?;
        session.readiness.profile_exists = true;
        let cases = host.get_cases().map_err(classify)?;
        Ok(session.refresh_cases(cases))
    }

    pub fn switch_profile(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        username: &str,
    ) -> MutationResult<Vec<Event>> {
        self.guard(profile_token(username))?;
        let result = host.switch_profile(username);
        self.release(&profile_token(username));
        result.map_err(classify)?;

        // Invalidate before the new load so no record of the previous
        // profile is ever rendered, even transiently.
        session.cache.invalidate();
        let cases = host.get_cases().map_err(classify)?;
        Ok(session.refresh_cases(cases))
    }

    pub fn delete_account(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        username: &str,
    ) -> MutationResult<Vec<Event>> {
        self.guard(profile_token(username))?;
        let result = host.delete_account(username);
        self.release(&profile_token(username));
        let outcome = result.map_err(classify)?;

        session.cache.invalidate();
        match outcome {
            AccountDeletionOutcome::NoUsers => {
                session.readiness.profile_exists = false;
                session.readiness.has_cases = false;
                Ok(session.recompute_screen().into_iter().collect())
            }
            AccountDeletionOutcome::SwitchedTo(_) => {
                let cases = host.get_cases().map_err(classify)?;
                Ok(session.refresh_cases(cases))
            }
        }
    }

    pub fn add_documents(
        &mut self,
        host: &mut dyn HostApi,
        case_key: &CaseKey,
    ) -> MutationResult<()> {
        host.add_documents(case_key).map_err(classify)
    }

    pub fn open_documents(&self, host: &mut dyn HostApi, case_key: &CaseKey) -> MutationResult<()> {
        host.open_documents(case_key).map_err(classify)
    }

    pub fn open_external(&self, host: &mut dyn HostApi, url: &str) -> MutationResult<()> {
        host.open_external(url).map_err(classify)
    }

    fn reload_links(
        &mut self,
        session: &mut Session,
        host: &mut dyn HostApi,
        case_key: &CaseKey,
    ) -> MutationResult<(Vec<Link>, Vec<Event>)> {
        let links = host.get_links(case_key).map_err(classify)?;
        let cases = host.get_cases().map_err(classify)?;
        let events = session.refresh_cases(cases);
        Ok((links, events))
    }

    fn guard(&mut self, token: String) -> MutationResult<()> {
        if !self.in_flight.insert(token.clone()) {
            let subject = token
                .split_once(':')
                .map_or(token.as_str(), |(_, rest)| rest)
                .to_owned();
            return Err(MutationError::InFlight(subject));
        }
        Ok(())
    }

    fn release(&mut self, token: &str) {
        self.in_flight.remove(token);
    }
}

fn case_token(key: &CaseKey) -> String {
    format!("case:{key}")
}

fn profile_token(username: &str) -> String {
    format!("profile:{username}")
}
