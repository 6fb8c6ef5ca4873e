// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::popover::{Anchor, MenuItem, MenuKind, PopoverController};
use crate::{
    AppReadiness, Case, CaseKey, FilterChoice, FilterState, RecordCache, Screen, SortKey,
    ViewMode, pipeline, search,
};

/// The whole client-side view state, passed around explicitly. All
/// mutation goes through `dispatch` (pure commands) or the refresh
/// entry points the coordinator calls after host mutations; nothing
/// reaches the cache tiers from anywhere else.
#[derive(Debug, Default)]
pub struct Session {
    pub readiness: AppReadiness,
    pub cache: RecordCache,
    pub filters: FilterState,
    pub view: ViewMode,
    pub popovers: PopoverController,
    pub status_line: Option<String>,
    screen: Screen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetSearchQuery(String),
    ClearSearch,
    SetCourtFilter(FilterChoice),
    SetYearFilter(FilterChoice),
    SetSort(SortKey),
    ResetFilters,
    BeginEdit(CaseKey),
    CancelEdit,
    /// Court/year/sort menus; the item list is built from the master
    /// set so the picker always reflects live data.
    OpenFilterMenu(MenuKind, Anchor),
    /// Menus whose items come from the host (account, profile list,
    /// document actions).
    OpenMenu(MenuKind, Anchor, Vec<MenuItem>),
    MenuCursor(isize),
    MenuSelect,
    Dismiss,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ScreenChanged(Screen),
    DerivedRefreshed(usize),
    EditStarted(CaseKey),
    EditTargetMissing(CaseKey),
    EditClosed,
    MenuOpened(MenuKind),
    MenuClosed,
    /// A selection the session does not route itself; the shell feeds
    /// it to the coordinator.
    MenuSelected(MenuKind, MenuItem),
    StatusUpdated(String),
    StatusCleared,
}

impl Session {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Single routing point for every user action that does not reach
    /// the host.
    pub fn dispatch(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::SetSearchQuery(query) => {
                self.view = ViewMode::Search(query);
                self.rederive()
            }
            Command::ClearSearch => {
                self.view = ViewMode::Filtered;
                self.rederive()
            }
            Command::SetCourtFilter(choice) => {
                self.filters.court = choice;
                self.view = ViewMode::Filtered;
                self.rederive()
            }
            Command::SetYearFilter(choice) => {
                self.filters.year = choice;
                self.view = ViewMode::Filtered;
                self.rederive()
            }
            Command::SetSort(sort) => {
                self.filters.sort = sort;
                self.view = ViewMode::Filtered;
                self.rederive()
            }
            Command::ResetFilters => {
                self.filters = FilterState::default();
                self.view = ViewMode::Filtered;
                self.rederive()
            }
            Command::BeginEdit(key) => {
                if self.cache.editable(&key).is_some() {
                    self.cache.set_edit_target(key.clone());
                    vec![Event::EditStarted(key)]
                } else {
                    // The record can legitimately vanish underneath
                    // the view; surface it, never crash.
                    let notice = format!("case {key} is no longer available");
                    vec![Event::EditTargetMissing(key), self.set_status(&notice)]
                }
            }
            Command::CancelEdit => {
                self.cache.clear_edit_target();
                vec![Event::EditClosed]
            }
            Command::OpenFilterMenu(kind, anchor) => {
                let items = self.filter_menu_items(kind);
                self.open_menu(kind, anchor, items)
            }
            Command::OpenMenu(kind, anchor, items) => self.open_menu(kind, anchor, items),
            Command::MenuCursor(delta) => {
                self.popovers.move_cursor(delta);
                Vec::new()
            }
            Command::MenuSelect => self.route_selection(),
            Command::Dismiss => {
                if self.popovers.dismiss() {
                    vec![Event::MenuClosed]
                } else {
                    Vec::new()
                }
            }
            Command::ClearStatus => {
                self.status_line = None;
                vec![Event::StatusCleared]
            }
        }
    }

    /// Authoritative reload after a load event (startup, mutation,
    /// profile switch). Replaces the master wholesale, recomputes the
    /// derived view through the active mode and re-evaluates the
    /// screen.
    pub fn refresh_cases(&mut self, cases: Vec<Case>) -> Vec<Event> {
        self.readiness.has_cases = !cases.is_empty();
        self.cache.load(cases, true);
        let mut events = self.rederive();
        events.extend(self.recompute_screen());
        events
    }

    pub fn recompute_screen(&mut self) -> Option<Event> {
        let next = Screen::for_readiness(self.readiness);
        if next == self.screen {
            None
        } else {
            self.screen = next;
            Some(Event::ScreenChanged(next))
        }
    }

    pub fn end_edit(&mut self) -> Option<Event> {
        if self.cache.edit_target().is_some() {
            self.cache.clear_edit_target();
            Some(Event::EditClosed)
        } else {
            None
        }
    }

    pub fn set_status(&mut self, message: &str) -> Event {
        self.status_line = Some(message.to_owned());
        Event::StatusUpdated(message.to_owned())
    }

    fn open_menu(&mut self, kind: MenuKind, anchor: Anchor, items: Vec<MenuItem>) -> Vec<Event> {
        if self.popovers.open(kind, anchor, items) {
            vec![Event::MenuOpened(kind)]
        } else {
            vec![Event::MenuClosed]
        }
    }

    fn route_selection(&mut self) -> Vec<Event> {
        let Some((kind, item)) = self.popovers.select() else {
            return Vec::new();
        };

        let mut events = vec![Event::MenuClosed];
        match kind {
            MenuKind::CourtFilter => {
                events.extend(self.dispatch(Command::SetCourtFilter(FilterChoice::parse(&item.id))));
            }
            MenuKind::YearFilter => {
                events.extend(self.dispatch(Command::SetYearFilter(FilterChoice::parse(&item.id))));
            }
            MenuKind::SortMenu => {
                if let Some(sort) = SortKey::parse(&item.id) {
                    events.extend(self.dispatch(Command::SetSort(sort)));
                }
            }
            MenuKind::AccountMenu | MenuKind::ProfileSwitcher | MenuKind::DocumentMenu => {
                events.push(Event::MenuSelected(kind, item));
            }
        }
        events
    }

    /// Recomputes the derived tier from the master through the active
    /// view mode. Before the first authoritative load there is nothing
    /// to derive from.
    fn rederive(&mut self) -> Vec<Event> {
        if !self.cache.has_master() {
            return Vec::new();
        }
        let rows = match &self.view {
            ViewMode::Filtered => pipeline::apply(self.cache.master(), &self.filters),
            ViewMode::Search(query) => search::rank(self.cache.master(), query),
        };
        let count = rows.len();
        self.cache.load(rows, false);
        vec![Event::DerivedRefreshed(count)]
    }

    fn filter_menu_items(&self, kind: MenuKind) -> Vec<MenuItem> {
        match kind {
            MenuKind::CourtFilter => {
                column_items(self.cache.master().iter().map(|case| case.court.as_str()))
            }
            MenuKind::YearFilter => {
                column_items(self.cache.master().iter().map(|case| case.year.as_str()))
            }
            MenuKind::SortMenu => SortKey::ALL
                .iter()
                .map(|key| MenuItem::new(key.as_str(), key.label()))
                .collect(),
            MenuKind::AccountMenu | MenuKind::ProfileSwitcher | MenuKind::DocumentMenu => {
                Vec::new()
            }
        }
    }
}

fn column_items<'a>(values: impl Iterator<Item = &'a str>) -> Vec<MenuItem> {
    let distinct: BTreeSet<&str> = values.filter(|value| !value.is_empty()).collect();
    let mut items = vec![MenuItem::new(
        FilterChoice::ALL_LABEL,
        FilterChoice::ALL_LABEL,
    )];
    items.extend(distinct.into_iter().map(|value| MenuItem::new(value, value)));
    items
}
