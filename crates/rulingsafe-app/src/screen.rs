// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::AppReadiness;

/// Which top-level screen is visible. There is no stored state and no
/// memory of the previous screen: the selection is a pure function of
/// the readiness flags, re-evaluated after every readiness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    SelectStorageLocation,
    CreateProfile,
    EmptyWorkspace,
    Dashboard,
}

impl Default for Screen {
    fn default() -> Self {
        Self::for_readiness(AppReadiness::default())
    }
}

impl Screen {
    /// Strict priority order: storage location, then profile, then
    /// cases. Exactly one screen matches any readiness triple.
    pub const fn for_readiness(readiness: AppReadiness) -> Self {
        if !readiness.storage_location_set {
            Self::SelectStorageLocation
        } else if !readiness.profile_exists {
            Self::CreateProfile
        } else if !readiness.has_cases {
            Self::EmptyWorkspace
        } else {
            Self::Dashboard
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SelectStorageLocation => "select storage location",
            Self::CreateProfile => "create profile",
            Self::EmptyWorkspace => "empty workspace",
            Self::Dashboard => "dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Screen;
    use crate::AppReadiness;

    fn readiness(storage: bool, profile: bool, cases: bool) -> AppReadiness {
        AppReadiness {
            storage_location_set: storage,
            profile_exists: profile,
            has_cases: cases,
        }
    }

    #[test]
    fn priority_is_total_over_all_triples() {
        for storage in [false, true] {
            for profile in [false, true] {
                for cases in [false, true] {
                    let selected = Screen::for_readiness(readiness(storage, profile, cases));
                    let expected = if !storage {
                        Screen::SelectStorageLocation
                    } else if !profile {
                        Screen::CreateProfile
                    } else if !cases {
                        Screen::EmptyWorkspace
                    } else {
                        Screen::Dashboard
                    };
                    assert_eq!(selected, expected, "triple ({storage},{profile},{cases})");
                }
            }
        }
    }

    #[test]
    fn missing_storage_wins_over_everything() {
        assert_eq!(
            Screen::for_readiness(readiness(false, true, true)),
            Screen::SelectStorageLocation
        );
    }

    #[test]
    fn selection_is_idempotent() {
        let triple = readiness(true, true, false);
        assert_eq!(
            Screen::for_readiness(triple),
            Screen::for_readiness(triple)
        );
    }
}
