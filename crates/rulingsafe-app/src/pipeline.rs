// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{Case, FilterState, SortKey};

/// Applies the column filters and the active sort to the master set.
/// Always recomputes from scratch: never mutates the input and never
/// composes with a previous derived set.
pub fn apply(master: &[Case], filters: &FilterState) -> Vec<Case> {
    let mut rows: Vec<Case> = master
        .iter()
        .filter(|case| filters.court.admits(&case.court))
        .filter(|case| filters.year.admits(&case.year))
        .cloned()
        .collect();

    rows.sort_by(comparator(filters.sort));
    rows
}

fn comparator(sort: SortKey) -> impl Fn(&Case, &Case) -> Ordering {
    move |a, b| match sort {
        SortKey::LastUpdated => b.last_updated.cmp(&a.last_updated),
        SortKey::CaseName => fold(&a.case_name).cmp(&fold(&b.case_name)),
        SortKey::Year => b.year.cmp(&a.year),
        // Missing courts are empty strings and sort first.
        SortKey::Court => fold(&a.court).cmp(&fold(&b.court)),
    }
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::{Case, CaseKey, FilterChoice, FilterState, SortKey};
    use time::OffsetDateTime;

    fn case(key: &str, name: &str, year: &str, court: &str, updated_unix: i64) -> Case {
        Case {
            key: CaseKey::from(key),
            case_no: String::new(),
            case_name: name.to_owned(),
            year: year.to_owned(),
            court: court.to_owned(),
            description: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::from_unix_timestamp(updated_unix)
                .expect("valid timestamp"),
            links_count: 0,
        }
    }

    fn keys(rows: &[Case]) -> Vec<&str> {
        rows.iter().map(|c| c.key.as_str()).collect()
    }

    fn two_case_master() -> Vec<Case> {
        vec![
            case("a", "Zeta", "2020", "High Court", 100),
            case("b", "Alpha", "2021", "Labour Court", 50),
        ]
    }

    #[test]
    fn name_sort_is_ascending() {
        let filters = FilterState {
            sort: SortKey::CaseName,
            ..FilterState::default()
        };
        assert_eq!(keys(&apply(&two_case_master(), &filters)), vec!["b", "a"]);
    }

    #[test]
    fn year_sort_is_descending_lexical() {
        let filters = FilterState {
            sort: SortKey::Year,
            ..FilterState::default()
        };
        // "2021" > "2020" lexically, so b leads.
        assert_eq!(keys(&apply(&two_case_master(), &filters)), vec!["b", "a"]);
    }

    #[test]
    fn last_updated_sort_is_descending() {
        let filters = FilterState::default();
        assert_eq!(keys(&apply(&two_case_master(), &filters)), vec!["a", "b"]);
    }

    #[test]
    fn court_sort_places_missing_values_first() {
        let master = vec![
            case("named", "One", "2020", "High Court", 0),
            case("blank", "Two", "2020", "", 0),
        ];
        let filters = FilterState {
            sort: SortKey::Court,
            ..FilterState::default()
        };
        assert_eq!(keys(&apply(&master, &filters)), vec!["blank", "named"]);
    }

    #[test]
    fn court_filter_is_exact_equality() {
        let master = vec![
            case("a", "One", "2020", "High Court", 0),
            case("b", "Two", "2020", "Labour Court", 0),
        ];
        let filters = FilterState {
            court: FilterChoice::Value("High Court".to_owned()),
            ..FilterState::default()
        };
        assert_eq!(keys(&apply(&master, &filters)), vec!["a"]);
    }

    #[test]
    fn filters_compose_court_then_year() {
        let master = vec![
            case("a", "One", "2020", "High Court", 0),
            case("b", "Two", "2021", "High Court", 0),
            case("c", "Three", "2021", "Labour Court", 0),
        ];
        let filters = FilterState {
            court: FilterChoice::Value("High Court".to_owned()),
            year: FilterChoice::Value("2021".to_owned()),
            sort: SortKey::CaseName,
        };
        assert_eq!(keys(&apply(&master, &filters)), vec!["b"]);
    }

    #[test]
    fn output_is_independent_of_prior_runs() {
        let master = two_case_master();
        let narrow = FilterState {
            court: FilterChoice::Value("High Court".to_owned()),
            ..FilterState::default()
        };
        let open = FilterState {
            sort: SortKey::CaseName,
            ..FilterState::default()
        };

        assert_eq!(apply(&master, &narrow).len(), 1);
        // A later run over the same master sees the full set again.
        assert_eq!(apply(&master, &open).len(), 2);
        assert_eq!(master.len(), 2, "master is never mutated");
    }
}
