// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Case;

pub const WEIGHT_CASE_NO: u32 = 100;
pub const WEIGHT_CASE_NAME: u32 = 75;
pub const WEIGHT_DESCRIPTION: u32 = 40;
pub const WEIGHT_COURT: u32 = 20;

/// Scores one record against an already lower-cased query by summing
/// the fixed weight of every field whose lower-cased value contains
/// the query as a substring. Zero means "no match at all".
pub fn score_case(case: &Case, normalized_query: &str) -> u32 {
    let mut score = 0;
    if field_hits(&case.case_no, normalized_query) {
        score += WEIGHT_CASE_NO;
    }
    if field_hits(&case.case_name, normalized_query) {
        score += WEIGHT_CASE_NAME;
    }
    if field_hits(&case.description, normalized_query) {
        score += WEIGHT_DESCRIPTION;
    }
    if field_hits(&case.court, normalized_query) {
        score += WEIGHT_COURT;
    }
    score
}

fn field_hits(field: &str, normalized_query: &str) -> bool {
    !field.is_empty() && field.to_lowercase().contains(normalized_query)
}

/// Ranks the master set against a raw query. Scoring is a filter, not
/// a rank-and-show-all: zero-score records are excluded. Equal scores
/// keep their master-set order so the ranking is reproducible. An
/// empty (or whitespace-only) query bypasses scoring entirely and
/// returns the master set unchanged.
pub fn rank(master: &[Case], query: &str) -> Vec<Case> {
    let normalized = query.trim().to_lowercase();
    if normalized.is_empty() {
        return master.to_vec();
    }

    let mut scored: Vec<(u32, &Case)> = master
        .iter()
        .filter_map(|case| {
            let score = score_case(case, &normalized);
            (score > 0).then_some((score, case))
        })
        .collect();

    // sort_by is stable; ties retain input order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().map(|(_, case)| case.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        WEIGHT_CASE_NAME, WEIGHT_CASE_NO, WEIGHT_COURT, WEIGHT_DESCRIPTION, rank, score_case,
    };
    use crate::{Case, CaseKey};
    use time::OffsetDateTime;

    fn case(key: &str, case_no: &str, name: &str, court: &str, description: &str) -> Case {
        Case {
            key: CaseKey::from(key),
            case_no: case_no.to_owned(),
            case_name: name.to_owned(),
            year: "2020".to_owned(),
            court: court.to_owned(),
            description: description.to_owned(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
            links_count: 0,
        }
    }

    #[test]
    fn court_only_match_scores_twenty() {
        let c = case("a", "12/19", "Rex v. Holt", "Labour Court", "dismissal appeal");
        assert_eq!(score_case(&c, "labour"), WEIGHT_COURT);
    }

    #[test]
    fn case_no_and_description_match_scores_one_forty() {
        let c = case("a", "CCT 44/20", "Rex v. Holt", "", "argued as cct 44/20 rehearing");
        assert_eq!(
            score_case(&c, "cct 44/20"),
            WEIGHT_CASE_NO + WEIGHT_DESCRIPTION
        );
    }

    #[test]
    fn name_match_scores_seventy_five() {
        let c = case("b", "", "Alpha Trading v. State", "", "");
        assert_eq!(score_case(&c, "alpha"), WEIGHT_CASE_NAME);
    }

    #[test]
    fn empty_query_returns_master_unchanged() {
        let master = vec![
            case("z", "", "Zeta", "", ""),
            case("a", "", "Alpha", "", ""),
        ];
        let ranked = rank(&master, "   ");
        assert_eq!(ranked, master);
    }

    #[test]
    fn zero_score_records_are_excluded() {
        let master = vec![
            case("a", "", "Zeta", "", ""),
            case("b", "", "Alpha", "", ""),
        ];
        let ranked = rank(&master, "alpha");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key.as_str(), "b");
    }

    #[test]
    fn matching_is_case_insensitive_on_both_sides() {
        let master = vec![case("a", "", "ALPHA TRADING", "", "")];
        assert_eq!(rank(&master, "Alpha").len(), 1);
    }

    #[test]
    fn equal_scores_keep_master_order() {
        let master = vec![
            case("first", "", "Port Review", "", ""),
            case("second", "", "Port Authority", "", ""),
            case("third", "", "Port Holdings", "", ""),
        ];
        let ranked = rank(&master, "port");
        let keys: Vec<&str> = ranked.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    #[test]
    fn higher_scores_rank_ahead_of_lower() {
        let master = vec![
            case("court-hit", "", "Review", "Harbour Court", ""),
            case("number-hit", "HARBOUR-9", "Review", "", ""),
        ];
        let ranked = rank(&master, "harbour");
        assert_eq!(ranked[0].key.as_str(), "number-hit");
        assert_eq!(ranked[1].key.as_str(), "court-hit");
        assert!(WEIGHT_CASE_NO > WEIGHT_COURT);
    }
}
