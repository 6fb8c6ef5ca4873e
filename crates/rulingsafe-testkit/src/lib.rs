// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rulingsafe_app::{CaseDraft, LinkDraft};
use std::path::PathBuf;

const PLAINTIFFS: [&str; 14] = [
    "Rex", "Okafor", "Mendez", "Whitfield", "Aldana", "Kowalski", "Bhatt", "Ferreira", "Lindqvist",
    "Osei", "Tanaka", "Marsh", "Delgado", "Crane",
];

const DEFENDANTS: [&str; 14] = [
    "Holt",
    "Ironbridge Ltd",
    "State",
    "Cardea Trust",
    "Novak",
    "Harbor City Council",
    "Pellar",
    "Trident Freight",
    "Ostrander",
    "Bluefield Mining",
    "Quayle",
    "Meridian Bank",
    "Sutter",
    "Calloway",
];

const COURTS: [&str; 8] = [
    "Supreme Court",
    "High Court",
    "Court of Appeal",
    "Commercial Court",
    "District Court",
    "Magistrates' Court",
    "Labour Court",
    "Constitutional Court",
];

const YEARS: [&str; 10] = [
    "2016", "2017", "2018", "2019", "2020", "2021", "2022", "2023", "2024", "2025",
];

const PLATFORMS: [&str; 6] = [
    "Kenya Law",
    "BAILII",
    "AustLII",
    "SAFLII",
    "CanLII",
    "CourtListener",
];

const DESCRIPTION_SUBJECTS: [&str; 8] = [
    "breach of contract",
    "judicial review",
    "negligence",
    "unfair dismissal",
    "land boundary dispute",
    "trademark infringement",
    "constitutional petition",
    "insurance repudiation",
];

const DESCRIPTION_POSTURES: [&str; 6] = [
    "appeal pending",
    "awaiting judgment",
    "set down for hearing",
    "stayed by consent",
    "remitted for retrial",
    "decided with costs",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic fixture generator: the same seed always produces the
/// same sequence of drafts, so failures reproduce exactly.
#[derive(Debug, Clone)]
pub struct CaseFaker {
    rng: DeterministicRng,
    minted: u64,
}

impl CaseFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
            minted: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Every draft carries a distinct name/year pair, so seeding any
    /// number of cases never trips the duplicate check.
    pub fn case_draft(&mut self) -> CaseDraft {
        self.minted += 1;
        let plaintiff = self.pick(&PLAINTIFFS);
        let defendant = self.pick(&DEFENDANTS);
        let year = self.pick(&YEARS);
        CaseDraft {
            case_no: format!("CIV {}/{year}", 100 + self.rng.int_n(900)),
            case_name: format!("{plaintiff} v. {defendant} (No. {})", self.minted),
            year: year.to_owned(),
            court: self.pick(&COURTS).to_owned(),
            description: format!(
                "{}, {}",
                self.pick(&DESCRIPTION_SUBJECTS),
                self.pick(&DESCRIPTION_POSTURES)
            ),
        }
    }

    pub fn link_draft(&mut self) -> LinkDraft {
        self.minted += 1;
        let platform = self.pick(&PLATFORMS);
        LinkDraft {
            title: format!("Judgment copy {}", self.minted),
            url: format!(
                "https://cases.example/{}/{}",
                platform.to_lowercase().replace(' ', "-"),
                self.minted
            ),
            platform: platform.to_owned(),
        }
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.int_n(pool.len())]
    }
}

/// Temp config and storage folders for store tests. Keep the TempDirs
/// alive for the duration of the test.
pub fn temp_store_dirs() -> Result<(tempfile::TempDir, PathBuf, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let config_dir = dir.path().join("config");
    let base_dir = dir.path().join("storage");
    Ok((dir, config_dir, base_dir))
}
