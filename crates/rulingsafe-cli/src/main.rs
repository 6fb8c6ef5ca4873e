// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result};
use config::Config;
use rulingsafe_app::{HostApi, MutationCoordinator, ProfileDraft, Session};
use rulingsafe_store::{FixedDialogs, Store, SystemLauncher};
use rulingsafe_testkit::CaseFaker;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `rulingsafe --print-example-config` for a template",
            options.config_path.display()
        )
    })?;

    let mut demo_guard = None;
    let (config_dir, store_folder) = if options.demo {
        let temp = tempfile::tempdir().context("create demo workspace")?;
        let dirs = (temp.path().join("config"), temp.path().join("storage"));
        demo_guard = Some(temp);
        dirs
    } else {
        (Store::default_config_dir()?, config.store_path()?)
    };

    if options.print_store_path {
        println!("{}", store_folder.display());
        return Ok(());
    }

    let mut store = Store::open(
        &config_dir,
        Box::new(FixedDialogs::new(Some(store_folder.clone()))),
        Box::new(SystemLauncher),
    )
    .with_context(|| {
        format!(
            "open store config {} -- if this path is wrong, set [storage].base_path or RULINGSAFE_STORE_PATH",
            config_dir.display()
        )
    })?;

    if options.demo {
        seed_demo(&mut store)?;
    }
    if options.check_only {
        return Ok(());
    }

    let mut session = Session::default();
    let mut coordinator = MutationCoordinator::new();
    let result = rulingsafe_tui::run_app(&mut session, &mut coordinator, &mut store);
    drop(demo_guard);
    result
}

/// Populates the throwaway demo workspace: one profile, a spread of
/// cases across courts and years, a few links.
fn seed_demo(store: &mut Store) -> Result<()> {
    store.pick_storage_location()?;
    store.create_profile(&ProfileDraft {
        username: "demo".to_owned(),
        first_name: "Demo".to_owned(),
        middle_name: String::new(),
        last_name: "User".to_owned(),
    })?;

    let mut faker = CaseFaker::new(2026);
    for _ in 0..12 {
        let case = store.create_case(&faker.case_draft())?;
        for _ in 0..faker.int_n(3) {
            store.add_link(&case.key, &faker.link_draft())?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_store_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_store_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_store_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rulingsafe");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved storage folder");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded throwaway data");
    println!("  --check                  Validate config and store, then exit");
    println!("  --help                   Show this help");
}
