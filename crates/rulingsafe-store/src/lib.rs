// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use rulingsafe_app::{
    AccountDeletionOutcome, Case, CaseDraft, CaseKey, HostApi, HostRejection, Link, LinkDraft,
    LinkId, PickOutcome, ProfileDraft, UserProfile,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub const APP_NAME: &str = "rulingsafe";

const CONFIG_FILE: &str = "config.json";
const BASE_DIR: &str = "RulingSafe";
const USERS_FILE: &str = "users.json";
const USERS_DIR: &str = "users";
const CASES_FILE: &str = "cases.json";
const CASES_DIR: &str = "cases";
const LINKS_FILE: &str = "links.json";
const DOCUMENTS_DIR: &str = "documents";

/// Folder and file choosers. The desktop shell backs these with native
/// dialogs; tests and the terminal shell back them with fixed paths.
pub trait Dialogs {
    /// `None` means the operator dismissed the chooser.
    fn pick_folder(&mut self) -> Result<Option<PathBuf>>;
    fn pick_files(&mut self) -> Result<Vec<PathBuf>>;
}

/// Hands paths and URLs to the operating system.
pub trait Launcher {
    fn open_path(&self, path: &Path) -> Result<()>;
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Dialogs that always answer with a preconfigured folder and never
/// offer files. Used by the terminal shell, where the storage location
/// comes from configuration rather than a native chooser.
#[derive(Debug, Clone)]
pub struct FixedDialogs {
    folder: Option<PathBuf>,
}

impl FixedDialogs {
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self { folder }
    }
}

impl Dialogs for FixedDialogs {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>> {
        Ok(self.folder.clone())
    }

    fn pick_files(&mut self) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

/// Opens paths and URLs through the platform opener.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

impl Launcher for SystemLauncher {
    fn open_path(&self, path: &Path) -> Result<()> {
        let status = std::process::Command::new(OPENER)
            .arg(path)
            .status()
            .with_context(|| format!("launch opener for {}", path.display()))?;
        if !status.success() {
            bail!("opener exited with {status} for {}", path.display());
        }
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        let status = std::process::Command::new(OPENER)
            .arg(url)
            .status()
            .with_context(|| format!("launch opener for {url}"))?;
        if !status.success() {
            bail!("opener exited with {status} for {url}");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreConfig {
    base_path: Option<PathBuf>,
    active_user: Option<String>,
}

/// JSON-file persistence. The chosen folder gets a `RulingSafe/` base
/// with this layout beneath it:
///
/// ```text
/// users.json
/// users/<username>/cases.json
/// users/<username>/cases/<case key>/links.json
/// users/<username>/cases/<case key>/documents/
/// ```
///
/// The app-level config (base folder, active user) lives in its own
/// file outside the base folder so the base can move.
pub struct Store {
    config_path: PathBuf,
    config: StoreConfig,
    dialogs: Box<dyn Dialogs>,
    launcher: Box<dyn Launcher>,
}

impl Store {
    pub fn open(
        config_dir: &Path,
        dialogs: Box<dyn Dialogs>,
        launcher: Box<dyn Launcher>,
    ) -> Result<Self> {
        fs::create_dir_all(config_dir)
            .with_context(|| format!("create config directory {}", config_dir.display()))?;
        let config_path = config_dir.join(CONFIG_FILE);
        let config = load_config(&config_path)?;
        Ok(Self {
            config_path,
            config,
            dialogs,
            launcher,
        })
    }

    /// Platform config directory for the app, e.g.
    /// `~/.config/rulingsafe` on Linux.
    pub fn default_config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("determine platform config directory")?;
        Ok(dir.join(APP_NAME))
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.config.base_path.as_deref()
    }

    pub fn active_user(&self) -> Option<&str> {
        self.config.active_user.as_deref()
    }

    /// Points the store at a base folder directly, bypassing the
    /// chooser. The terminal shell uses this when the folder comes
    /// from configuration.
    pub fn set_base_path(&mut self, base: &Path) -> Result<()> {
        let users = base.join(USERS_DIR);
        fs::create_dir_all(&users)
            .with_context(|| format!("create storage tree {}", users.display()))?;
        self.config.base_path = Some(base.to_path_buf());
        self.save_config()
    }

    fn save_config(&self) -> Result<()> {
        write_json(&self.config_path, &self.config)
    }

    fn base(&self) -> Result<&Path> {
        self.config
            .base_path
            .as_deref()
            .context("storage location is not set")
    }

    fn require_user(&self) -> Result<&str> {
        self.config
            .active_user
            .as_deref()
            .context("no active user profile")
    }

    fn users_path(&self) -> Result<PathBuf> {
        Ok(self.base()?.join(USERS_FILE))
    }

    fn user_dir(&self, username: &str) -> Result<PathBuf> {
        Ok(self.base()?.join(USERS_DIR).join(username))
    }

    fn cases_path(&self) -> Result<PathBuf> {
        Ok(self.user_dir(self.require_user()?)?.join(CASES_FILE))
    }

    fn case_dir(&self, key: &CaseKey) -> Result<PathBuf> {
        Ok(self
            .user_dir(self.require_user()?)?
            .join(CASES_DIR)
            .join(key.as_str()))
    }

    fn links_path(&self, key: &CaseKey) -> Result<PathBuf> {
        Ok(self.case_dir(key)?.join(LINKS_FILE))
    }

    fn documents_dir(&self, key: &CaseKey) -> Result<PathBuf> {
        Ok(self.case_dir(key)?.join(DOCUMENTS_DIR))
    }

    fn load_users(&self) -> Result<Vec<UserProfile>> {
        read_json(&self.users_path()?)
    }

    fn save_users(&self, users: &[UserProfile]) -> Result<()> {
        write_json(&self.users_path()?, &users)
    }

    fn load_cases(&self) -> Result<Vec<Case>> {
        read_json(&self.cases_path()?)
    }

    fn save_cases(&self, cases: &[Case]) -> Result<()> {
        write_json(&self.cases_path()?, &cases)
    }

    fn load_links(&self, key: &CaseKey) -> Result<Vec<Link>> {
        read_json(&self.links_path(key)?)
    }

    fn save_links(&self, key: &CaseKey, links: &[Link]) -> Result<()> {
        write_json(&self.links_path(key)?, &links)
    }

    fn set_links_count(&self, key: &CaseKey, count: u32) -> Result<()> {
        let mut cases = self.load_cases()?;
        if let Some(case) = cases.iter_mut().find(|case| &case.key == key) {
            case.links_count = count;
            case.last_updated = OffsetDateTime::now_utc();
            self.save_cases(&cases)?;
        }
        Ok(())
    }
}

/// Natural key for a case. Minted here, never by callers.
fn mint_key(case_name: &str, year: &str) -> CaseKey {
    CaseKey::new(format!("{case_name}_{year}"))
}

fn rejected<T>(message: impl Into<String>) -> Result<T> {
    Err(HostRejection::new(message).into())
}

impl HostApi for Store {
    fn has_storage_location(&self) -> Result<bool> {
        Ok(self
            .config
            .base_path
            .as_deref()
            .is_some_and(|base| base.is_dir()))
    }

    fn has_profile(&self) -> Result<bool> {
        let Some(active) = self.config.active_user.as_deref() else {
            return Ok(false);
        };
        if !self.has_storage_location()? {
            return Ok(false);
        }
        Ok(self
            .load_users()?
            .iter()
            .any(|profile| profile.username == active))
    }

    fn pick_storage_location(&mut self) -> Result<PickOutcome> {
        match self.dialogs.pick_folder()? {
            Some(folder) => {
                let base = folder.join(BASE_DIR);
                self.set_base_path(&base)?;
                Ok(PickOutcome::Chosen(base))
            }
            None => Ok(PickOutcome::Cancelled),
        }
    }

    fn get_cases(&self) -> Result<Vec<Case>> {
        self.load_cases()
    }

    fn create_case(&mut self, draft: &CaseDraft) -> Result<Case> {
        let mut cases = self.load_cases()?;
        let key = mint_key(&draft.case_name, &draft.year);
        if cases.iter().any(|case| case.key == key) {
            return rejected("a case with the same name and year already exists");
        }

        let now = OffsetDateTime::now_utc();
        let case = Case {
            key: key.clone(),
            case_no: draft.case_no.clone(),
            case_name: draft.case_name.clone(),
            year: draft.year.clone(),
            court: draft.court.clone(),
            description: draft.description.clone(),
            created_at: now,
            last_updated: now,
            links_count: 0,
        };
        cases.push(case.clone());
        self.save_cases(&cases)?;

        let documents = self.documents_dir(&key)?;
        fs::create_dir_all(&documents)
            .with_context(|| format!("create case folder {}", documents.display()))?;
        Ok(case)
    }

    fn update_case(&mut self, prior_key: &CaseKey, draft: &CaseDraft) -> Result<Case> {
        let mut cases = self.load_cases()?;
        let Some(position) = cases.iter().position(|case| &case.key == prior_key) else {
            return rejected(format!("case {prior_key} not found"));
        };

        let new_key = mint_key(&draft.case_name, &draft.year);
        if new_key != *prior_key && cases.iter().any(|case| case.key == new_key) {
            return rejected("a case with the same name and year already exists");
        }

        let prior = cases[position].clone();
        let case = &mut cases[position];
        case.key = new_key.clone();
        case.case_no = draft.case_no.clone();
        case.case_name = draft.case_name.clone();
        case.year = draft.year.clone();
        case.court = draft.court.clone();
        case.description = draft.description.clone();
        case.last_updated = OffsetDateTime::now_utc();
        let updated = case.clone();
        self.save_cases(&cases)?;

        // Move the folder only once the record is persisted; if the
        // move fails, put the record back so links and documents stay
        // attached to the key it is stored under.
        if new_key != *prior_key {
            let old_dir = self.case_dir(prior_key)?;
            let new_dir = self.case_dir(&new_key)?;
            if old_dir.is_dir() {
                if let Err(error) = fs::rename(&old_dir, &new_dir) {
                    cases[position] = prior;
                    self.save_cases(&cases)?;
                    return Err(error).with_context(|| {
                        format!(
                            "move case folder {} to {}",
                            old_dir.display(),
                            new_dir.display()
                        )
                    });
                }
            }
        }
        Ok(updated)
    }

    fn delete_case(&mut self, key: &CaseKey) -> Result<()> {
        let mut cases = self.load_cases()?;
        let before = cases.len();
        cases.retain(|case| &case.key != key);
        if cases.len() == before {
            return rejected(format!("case {key} not found"));
        }
        self.save_cases(&cases)?;

        let dir = self.case_dir(key)?;
        if dir.is_dir() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("remove case folder {}", dir.display()))?;
        }
        Ok(())
    }

    fn get_links(&self, case_key: &CaseKey) -> Result<Vec<Link>> {
        self.load_links(case_key)
    }

    fn add_link(&mut self, case_key: &CaseKey, draft: &LinkDraft) -> Result<Link> {
        let cases = self.load_cases()?;
        if !cases.iter().any(|case| &case.key == case_key) {
            return rejected(format!("case {case_key} not found"));
        }

        let mut links = self.load_links(case_key)?;
        let id = next_link_id(&links);
        let link = Link {
            id,
            title: draft.title.clone(),
            url: draft.url.clone(),
            platform: draft.platform.clone(),
        };
        links.push(link.clone());
        self.save_links(case_key, &links)?;
        self.set_links_count(case_key, links.len() as u32)?;
        Ok(link)
    }

    fn delete_link(&mut self, case_key: &CaseKey, id: &LinkId) -> Result<()> {
        let mut links = self.load_links(case_key)?;
        let before = links.len();
        links.retain(|link| &link.id != id);
        if links.len() == before {
            return rejected(format!("link {id} not found"));
        }
        self.save_links(case_key, &links)?;
        self.set_links_count(case_key, links.len() as u32)
    }

    fn add_documents(&mut self, case_key: &CaseKey) -> Result<()> {
        let cases = self.load_cases()?;
        if !cases.iter().any(|case| &case.key == case_key) {
            return rejected(format!("case {case_key} not found"));
        }

        let picked = self.dialogs.pick_files()?;
        if picked.is_empty() {
            return Ok(());
        }

        let documents = self.documents_dir(case_key)?;
        fs::create_dir_all(&documents)
            .with_context(|| format!("create documents folder {}", documents.display()))?;
        for source in picked {
            let file_name = source
                .file_name()
                .with_context(|| format!("picked path {} has no file name", source.display()))?;
            fs::copy(&source, documents.join(file_name))
                .with_context(|| format!("copy document {}", source.display()))?;
        }
        Ok(())
    }

    fn open_documents(&self, case_key: &CaseKey) -> Result<()> {
        let documents = self.documents_dir(case_key)?;
        fs::create_dir_all(&documents)
            .with_context(|| format!("create documents folder {}", documents.display()))?;
        self.launcher.open_path(&documents)
    }

    fn open_external(&self, url: &str) -> Result<()> {
        self.launcher.open_url(url)
    }

    fn create_profile(&mut self, draft: &ProfileDraft) -> Result<UserProfile> {
        let mut users = self.load_users()?;
        let user_dir = self.user_dir(&draft.username)?;
        if users.iter().any(|profile| profile.username == draft.username) || user_dir.exists() {
            return rejected(format!("username {} already exists", draft.username));
        }

        // Folder first: if this fails nothing has touched users.json.
        let cases_dir = user_dir.join(CASES_DIR);
        fs::create_dir_all(&cases_dir)
            .with_context(|| format!("create profile folder {}", cases_dir.display()))?;

        let profile = UserProfile {
            username: draft.username.clone(),
            first_name: draft.first_name.clone(),
            middle_name: draft.middle_name.clone(),
            last_name: draft.last_name.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(profile.clone());
        self.save_users(&users)?;

        // A new profile becomes the active one immediately.
        self.config.active_user = Some(profile.username.clone());
        self.save_config()?;
        self.save_cases(&[])?;
        Ok(profile)
    }

    fn get_current_profile(&self) -> Result<Option<UserProfile>> {
        let Some(active) = self.config.active_user.as_deref() else {
            return Ok(None);
        };
        Ok(self
            .load_users()?
            .into_iter()
            .find(|profile| profile.username == active))
    }

    fn get_all_profiles(&self) -> Result<Vec<UserProfile>> {
        self.load_users()
    }

    fn switch_profile(&mut self, username: &str) -> Result<()> {
        let users = self.load_users()?;
        if !users.iter().any(|profile| profile.username == username) {
            return rejected(format!("profile {username} does not exist"));
        }
        self.config.active_user = Some(username.to_owned());
        self.save_config()
    }

    fn delete_account(&mut self, username: &str) -> Result<AccountDeletionOutcome> {
        let mut users = self.load_users()?;
        let before = users.len();
        users.retain(|profile| profile.username != username);
        if users.len() == before {
            return rejected(format!("profile {username} does not exist"));
        }
        self.save_users(&users)?;

        let dir = self.user_dir(username)?;
        if dir.is_dir() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("remove profile folder {}", dir.display()))?;
        }

        let deleted_was_active = self.config.active_user.as_deref() == Some(username);
        match users.first().cloned() {
            None => {
                self.config.active_user = None;
                self.save_config()?;
                Ok(AccountDeletionOutcome::NoUsers)
            }
            Some(fallback) => {
                if deleted_was_active {
                    self.config.active_user = Some(fallback.username.clone());
                    self.save_config()?;
                    Ok(AccountDeletionOutcome::SwitchedTo(fallback))
                } else {
                    let current = self
                        .get_current_profile()?
                        .context("active profile missing after unrelated deletion")?;
                    Ok(AccountDeletionOutcome::SwitchedTo(current))
                }
            }
        }
    }
}

fn load_config(path: &Path) -> Result<StoreConfig> {
    if !path.is_file() {
        return Ok(StoreConfig::default());
    }
    read_json(path)
}

fn read_json<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if !path.is_file() {
        return Ok(T::default());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(value).context("serialize to json")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))
}

fn next_link_id(links: &[Link]) -> LinkId {
    let max = links
        .iter()
        .filter_map(|link| link.id.as_str().strip_prefix("link-"))
        .filter_map(|raw| raw.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    LinkId::new(format!("link-{}", max + 1))
}

#[cfg(test)]
mod tests {
    use super::next_link_id;
    use rulingsafe_app::{Link, LinkId};

    #[test]
    fn link_ids_are_monotonic_over_gaps() {
        let links = vec![
            Link {
                id: LinkId::new("link-1"),
                title: String::new(),
                url: String::new(),
                platform: String::new(),
            },
            Link {
                id: LinkId::new("link-7"),
                title: String::new(),
                url: String::new(),
                platform: String::new(),
            },
        ];
        assert_eq!(next_link_id(&links), LinkId::new("link-8"));
        assert_eq!(next_link_id(&[]), LinkId::new("link-1"));
    }
}
