// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

/// A single ruling record. Optional text fields use the empty string
/// for "absent"; `case_name` and `year` are never empty once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub key: CaseKey,
    pub case_no: String,
    pub case_name: String,
    pub year: String,
    pub court: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    pub links_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub title: String,
    pub url: String,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// The three readiness flags that gate which screen is shown. Each is
/// set only from a host answer, never computed from other client state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppReadiness {
    pub storage_location_set: bool,
    pub profile_exists: bool,
    pub has_cases: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    LastUpdated,
    CaseName,
    Year,
    Court,
}

impl SortKey {
    pub const ALL: [Self; 4] = [Self::LastUpdated, Self::CaseName, Self::Year, Self::Court];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastUpdated => "last_updated",
            Self::CaseName => "case_name",
            Self::Year => "year",
            Self::Court => "court",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "last_updated" => Some(Self::LastUpdated),
            "case_name" => Some(Self::CaseName),
            "year" => Some(Self::Year),
            "court" => Some(Self::Court),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LastUpdated => "recently updated",
            Self::CaseName => "case name",
            Self::Year => "year",
            Self::Court => "court",
        }
    }
}

/// Column filter selection; "All" is the sentinel that disables the
/// equality filter for that column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterChoice {
    All,
    Value(String),
}

impl FilterChoice {
    pub const ALL_LABEL: &'static str = "All";

    pub fn parse(value: &str) -> Self {
        if value == Self::ALL_LABEL {
            Self::All
        } else {
            Self::Value(value.to_owned())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => Self::ALL_LABEL,
            Self::Value(value) => value,
        }
    }

    pub fn admits(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Value(wanted) => wanted == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub court: FilterChoice,
    pub year: FilterChoice,
    pub sort: SortKey,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            court: FilterChoice::All,
            year: FilterChoice::All,
            sort: SortKey::LastUpdated,
        }
    }
}

/// The two mutually exclusive views over the master set. Whichever
/// input the operator touched last wins; search and filters never
/// compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    Filtered,
    Search(String),
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::Filtered
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterChoice, FilterState, SortKey, UserProfile};
    use time::OffsetDateTime;

    #[test]
    fn sort_key_round_trips_through_strings() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("bogus"), None);
    }

    #[test]
    fn filter_choice_all_admits_everything() {
        assert!(FilterChoice::All.admits("Supreme Court"));
        assert!(FilterChoice::All.admits(""));
        assert!(FilterChoice::parse("All").admits("anything"));
    }

    #[test]
    fn filter_choice_value_admits_exact_match_only() {
        let choice = FilterChoice::parse("High Court");
        assert!(choice.admits("High Court"));
        assert!(!choice.admits("high court"));
        assert!(!choice.admits(""));
    }

    #[test]
    fn default_filter_state_is_fully_open() {
        let filters = FilterState::default();
        assert_eq!(filters.court, FilterChoice::All);
        assert_eq!(filters.year, FilterChoice::All);
        assert_eq!(filters.sort, SortKey::LastUpdated);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let profile = UserProfile {
            username: "amara".to_owned(),
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(profile.display_name(), "amara");

        let named = UserProfile {
            first_name: "Amara".to_owned(),
            last_name: "Okoye".to_owned(),
            ..profile
        };
        assert_eq!(named.display_name(), "Amara Okoye");
    }
}
