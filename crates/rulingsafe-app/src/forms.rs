// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

/// Field values collected from the case form. Drafts are validated
/// locally before any host call; a failed validation has no side
/// effects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseDraft {
    pub case_no: String,
    pub case_name: String,
    pub year: String,
    pub court: String,
    pub description: String,
}

impl CaseDraft {
    pub fn validate(&self) -> Result<()> {
        if self.case_name.trim().is_empty() {
            bail!("case name is required -- enter a case name and retry");
        }
        if self.year.trim().is_empty() {
            bail!("year is required -- enter a year and retry");
        }
        Ok(())
    }

    /// Copy with surrounding whitespace removed from every field, the
    /// shape sent to the host.
    pub fn trimmed(&self) -> Self {
        Self {
            case_no: self.case_no.trim().to_owned(),
            case_name: self.case_name.trim().to_owned(),
            year: self.year.trim().to_owned(),
            court: self.court.trim().to_owned(),
            description: self.description.trim().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    pub platform: String,
}

impl LinkDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("link title is required -- enter a title and retry");
        }
        if self.url.trim().is_empty() {
            bail!("link URL is required -- enter a URL and retry");
        }
        Ok(())
    }

    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_owned(),
            url: self.url.trim().to_owned(),
            platform: self.platform.trim().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDraft {
    pub username: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

impl ProfileDraft {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            bail!("username is required -- enter a username and retry");
        }
        Ok(())
    }

    pub fn trimmed(&self) -> Self {
        Self {
            username: self.username.trim().to_owned(),
            first_name: self.first_name.trim().to_owned(),
            middle_name: self.middle_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CaseDraft, LinkDraft, ProfileDraft};

    #[test]
    fn case_draft_requires_name_and_year() {
        let mut draft = CaseDraft {
            case_name: "Rex v. Holt".to_owned(),
            year: "2019".to_owned(),
            ..CaseDraft::default()
        };
        assert!(draft.validate().is_ok());

        draft.case_name = "   ".to_owned();
        assert!(draft.validate().is_err());

        draft.case_name = "Rex v. Holt".to_owned();
        draft.year = String::new();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn case_draft_trims_every_field() {
        let draft = CaseDraft {
            case_no: " 44/2020 ".to_owned(),
            case_name: " Rex v. Holt ".to_owned(),
            year: " 2020 ".to_owned(),
            court: " High Court ".to_owned(),
            description: " appeal ".to_owned(),
        };
        let trimmed = draft.trimmed();
        assert_eq!(trimmed.case_no, "44/2020");
        assert_eq!(trimmed.case_name, "Rex v. Holt");
        assert_eq!(trimmed.year, "2020");
        assert_eq!(trimmed.court, "High Court");
        assert_eq!(trimmed.description, "appeal");
    }

    #[test]
    fn link_draft_requires_title_and_url() {
        let draft = LinkDraft {
            title: "Judgment PDF".to_owned(),
            url: "https://court.example/44".to_owned(),
            platform: String::new(),
        };
        assert!(draft.validate().is_ok());
        assert!(LinkDraft::default().validate().is_err());
        assert!(
            LinkDraft {
                title: "Judgment PDF".to_owned(),
                ..LinkDraft::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn profile_draft_requires_username_only() {
        assert!(ProfileDraft::default().validate().is_err());
        assert!(
            ProfileDraft {
                username: "amara".to_owned(),
                ..ProfileDraft::default()
            }
            .validate()
            .is_ok()
        );
    }
}
