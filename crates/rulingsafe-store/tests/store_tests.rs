// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use rulingsafe_app::{
    AccountDeletionOutcome, CaseDraft, CaseKey, HostApi, HostRejection, LinkDraft, PickOutcome,
    ProfileDraft,
};
use rulingsafe_store::{Dialogs, FixedDialogs, Launcher, Store};
use rulingsafe_testkit::{CaseFaker, temp_store_dirs};
use std::path::{Path, PathBuf};

struct NullLauncher;

impl Launcher for NullLauncher {
    fn open_path(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn open_url(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

/// File chooser that hands back a fixed set of files once.
struct PickFilesOnce {
    files: Vec<PathBuf>,
}

impl Dialogs for PickFilesOnce {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn pick_files(&mut self) -> Result<Vec<PathBuf>> {
        Ok(std::mem::take(&mut self.files))
    }
}

fn open_store(config_dir: &Path, folder: Option<PathBuf>) -> Result<Store> {
    Store::open(
        config_dir,
        Box::new(FixedDialogs::new(folder)),
        Box::new(NullLauncher),
    )
}

fn profile(username: &str) -> ProfileDraft {
    ProfileDraft {
        username: username.to_owned(),
        first_name: String::new(),
        middle_name: String::new(),
        last_name: String::new(),
    }
}

fn draft(name: &str, year: &str) -> CaseDraft {
    CaseDraft {
        case_name: name.to_owned(),
        year: year.to_owned(),
        ..CaseDraft::default()
    }
}

fn user_root(base_dir: &Path, username: &str) -> PathBuf {
    base_dir.join("RulingSafe").join("users").join(username)
}

fn case_root(base_dir: &Path, username: &str, key: &CaseKey) -> PathBuf {
    user_root(base_dir, username).join("cases").join(key.as_str())
}

fn ready_store(config_dir: &Path, base_dir: &Path, username: &str) -> Result<Store> {
    let mut store = open_store(config_dir, Some(base_dir.to_path_buf()))?;
    assert_eq!(
        store.pick_storage_location()?,
        PickOutcome::Chosen(base_dir.join("RulingSafe"))
    );
    store.create_profile(&profile(username))?;
    Ok(store)
}

#[test]
fn cancelled_folder_dialog_leaves_storage_unset() -> Result<()> {
    let (_guard, config_dir, _base_dir) = temp_store_dirs()?;
    let mut store = open_store(&config_dir, None)?;

    assert_eq!(store.pick_storage_location()?, PickOutcome::Cancelled);
    assert!(!store.has_storage_location()?);
    assert!(!store.has_profile()?);
    Ok(())
}

#[test]
fn configuration_survives_reopening_the_store() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    {
        let mut store = ready_store(&config_dir, &base_dir, "amara")?;
        store.create_case(&draft("Rex v. Holt", "2019"))?;
    }

    let reopened = open_store(&config_dir, None)?;
    assert!(reopened.has_storage_location()?);
    assert!(reopened.has_profile()?);
    assert_eq!(reopened.active_user(), Some("amara"));
    assert_eq!(reopened.get_cases()?.len(), 1);
    Ok(())
}

#[test]
fn chosen_folder_gets_a_rulingsafe_base_with_a_users_tree() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = open_store(&config_dir, Some(base_dir.clone()))?;

    let outcome = store.pick_storage_location()?;
    assert_eq!(outcome, PickOutcome::Chosen(base_dir.join("RulingSafe")));
    assert!(base_dir.join("RulingSafe").join("users").is_dir());
    assert!(store.has_storage_location()?);
    Ok(())
}

#[test]
fn existing_user_folder_blocks_profile_creation() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;

    // A leftover folder counts as a taken username even when the
    // profile list does not mention it.
    std::fs::create_dir_all(user_root(&base_dir, "ghost"))?;
    let err = store
        .create_profile(&profile("ghost"))
        .expect_err("folder already exists");
    assert!(err.downcast_ref::<HostRejection>().is_some());

    assert_eq!(store.get_all_profiles()?.len(), 1);
    assert_eq!(store.active_user(), Some("amara"));
    Ok(())
}

#[test]
fn profile_folders_never_collide_with_the_users_index() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;

    // A username that shadows the index file name lands under users/
    // and leaves users.json readable.
    store.create_profile(&profile("users.json"))?;
    store.create_case(&draft("Rex v. Holt", "2019"))?;

    assert_eq!(store.get_all_profiles()?.len(), 2);
    assert!(
        user_root(&base_dir, "users.json")
            .join("cases.json")
            .is_file()
    );
    Ok(())
}

#[test]
fn duplicate_name_and_year_is_rejected() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;

    store.create_case(&draft("Rex v. Holt", "2019"))?;
    let err = store
        .create_case(&draft("Rex v. Holt", "2019"))
        .expect_err("same name and year");
    assert!(err.downcast_ref::<HostRejection>().is_some());

    // Same name under a different year is a distinct case.
    store.create_case(&draft("Rex v. Holt", "2020"))?;
    assert_eq!(store.get_cases()?.len(), 2);
    Ok(())
}

#[test]
fn rename_moves_links_and_documents_to_the_new_key() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;

    let case = store.create_case(&draft("Rex v. Holt", "2019"))?;
    store.add_link(
        &case.key,
        &LinkDraft {
            title: "Judgment".to_owned(),
            url: "https://court.example/44".to_owned(),
            platform: "Kenya Law".to_owned(),
        },
    )?;
    let document = case_root(&base_dir, "amara", &case.key)
        .join("documents")
        .join("ruling.pdf");
    std::fs::write(&document, b"ruling text")?;

    let updated = store.update_case(&case.key, &draft("Rex v. Holt", "2021"))?;
    assert_eq!(updated.key, CaseKey::from("Rex v. Holt_2021"));

    let cases = store.get_cases()?;
    assert_eq!(cases.len(), 1, "rename must not leave a second record");
    assert_eq!(cases[0].key, updated.key);
    assert_eq!(cases[0].links_count, 1);

    let links = store.get_links(&updated.key)?;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].title, "Judgment");

    let moved = case_root(&base_dir, "amara", &updated.key)
        .join("documents")
        .join("ruling.pdf");
    assert!(moved.is_file());
    assert!(!case_root(&base_dir, "amara", &case.key).exists());
    Ok(())
}

#[test]
fn failed_folder_move_keeps_the_record_under_its_old_key() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;

    let case = store.create_case(&draft("Rex v. Holt", "2019"))?;
    store.add_link(
        &case.key,
        &LinkDraft {
            title: "Judgment".to_owned(),
            url: "https://court.example/44".to_owned(),
            platform: "Kenya Law".to_owned(),
        },
    )?;

    // A stray non-empty folder at the destination makes the move fail.
    let blocked = case_root(&base_dir, "amara", &CaseKey::from("Rex v. Holt_2021"));
    std::fs::create_dir_all(&blocked)?;
    std::fs::write(blocked.join("stray.txt"), b"stray")?;

    store
        .update_case(&case.key, &draft("Rex v. Holt", "2021"))
        .expect_err("destination folder is occupied");

    let cases = store.get_cases()?;
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].key, case.key, "record keeps the persisted key");
    assert_eq!(cases[0].year, "2019");
    assert_eq!(store.get_links(&case.key)?.len(), 1);
    Ok(())
}

#[test]
fn link_counts_track_additions_and_removals() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;
    let mut faker = CaseFaker::new(3);

    let case = store.create_case(&faker.case_draft())?;
    let first = store.add_link(&case.key, &faker.link_draft())?;
    store.add_link(&case.key, &faker.link_draft())?;
    assert_eq!(store.get_cases()?[0].links_count, 2);

    store.delete_link(&case.key, &first.id)?;
    assert_eq!(store.get_cases()?[0].links_count, 1);

    let err = store
        .delete_link(&case.key, &first.id)
        .expect_err("already removed");
    assert!(err.downcast_ref::<HostRejection>().is_some());
    Ok(())
}

#[test]
fn deleting_a_case_removes_its_folder() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;

    let case = store.create_case(&draft("Rex v. Holt", "2019"))?;
    let folder = case_root(&base_dir, "amara", &case.key);
    assert!(folder.is_dir());

    store.delete_case(&case.key)?;
    assert!(store.get_cases()?.is_empty());
    assert!(!folder.exists());

    let err = store.delete_case(&case.key).expect_err("already gone");
    assert!(err.downcast_ref::<HostRejection>().is_some());
    Ok(())
}

#[test]
fn profiles_keep_fully_separate_case_sets() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;
    store.create_case(&draft("Rex v. Holt", "2019"))?;

    store.create_profile(&profile("ben"))?;
    assert!(store.get_cases()?.is_empty(), "new profile starts empty");
    store.create_case(&draft("Okafor v. State", "2021"))?;

    store.switch_profile("amara")?;
    let names: Vec<String> = store
        .get_cases()?
        .into_iter()
        .map(|case| case.case_name)
        .collect();
    assert_eq!(names, vec!["Rex v. Holt".to_owned()]);

    let err = store.switch_profile("nobody").expect_err("unknown profile");
    assert!(err.downcast_ref::<HostRejection>().is_some());
    Ok(())
}

#[test]
fn deleting_the_last_account_clears_the_active_user() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;
    store.create_case(&draft("Rex v. Holt", "2019"))?;

    let outcome = store.delete_account("amara")?;
    assert_eq!(outcome, AccountDeletionOutcome::NoUsers);
    assert!(!store.has_profile()?);
    assert!(!user_root(&base_dir, "amara").exists());
    Ok(())
}

#[test]
fn deleting_the_active_account_switches_to_a_survivor() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;
    store.create_profile(&profile("ben"))?;
    store.create_case(&draft("Okafor v. State", "2021"))?;

    let outcome = store.delete_account("ben")?;
    match outcome {
        AccountDeletionOutcome::SwitchedTo(survivor) => {
            assert_eq!(survivor.username, "amara");
        }
        other => panic!("expected a switch, got {other:?}"),
    }
    assert_eq!(store.active_user(), Some("amara"));
    assert!(store.get_cases()?.is_empty());
    Ok(())
}

#[test]
fn add_documents_copies_picked_files_into_the_case_folder() -> Result<()> {
    let (_guard, config_dir, base_dir) = temp_store_dirs()?;
    let mut store = ready_store(&config_dir, &base_dir, "amara")?;
    let case = store.create_case(&draft("Rex v. Holt", "2019"))?;

    let source = base_dir.join("exhibit-a.pdf");
    std::fs::write(&source, b"exhibit")?;

    let mut picker = Store::open(
        &config_dir,
        Box::new(PickFilesOnce {
            files: vec![source.clone()],
        }),
        Box::new(NullLauncher),
    )?;
    picker.add_documents(&case.key)?;

    let copied = case_root(&base_dir, "amara", &case.key)
        .join("documents")
        .join("exhibit-a.pdf");
    assert_eq!(std::fs::read(copied)?, b"exhibit");

    // An empty pick is a quiet no-op.
    picker.add_documents(&case.key)?;
    Ok(())
}
