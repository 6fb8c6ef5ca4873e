// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use rulingsafe_app::{
    Anchor, Case, CaseDraft, CaseKey, Command, Event, HostApi, Link, LinkDraft, LinkId, MenuItem,
    MenuKind, MutationCoordinator, ProfileDraft, Screen, Session, ViewMode,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_SECS: u64 = 4;

const COURT_MENU_ANCHOR: Anchor = Anchor { x: 28, y: 3 };
const YEAR_MENU_ANCHOR: Anchor = Anchor { x: 44, y: 3 };
const SORT_MENU_ANCHOR: Anchor = Anchor { x: 58, y: 3 };
const ACCOUNT_MENU_ANCHOR: Anchor = Anchor { x: 2, y: 3 };
const DOCUMENT_MENU_ANCHOR: Anchor = Anchor { x: 12, y: 3 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormField {
    label: &'static str,
    value: String,
}

impl FormField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Flat field editor used by every form overlay. One field is active
/// at a time; printable keys append to it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormUi {
    title: &'static str,
    fields: Vec<FormField>,
    cursor: usize,
}

impl FormUi {
    fn case_form(existing: Option<&Case>) -> Self {
        let blank = String::new;
        let (case_no, case_name, year, court, description) = match existing {
            Some(case) => (
                case.case_no.clone(),
                case.case_name.clone(),
                case.year.clone(),
                case.court.clone(),
                case.description.clone(),
            ),
            None => (blank(), blank(), blank(), blank(), blank()),
        };
        Self {
            title: if existing.is_some() {
                "edit case"
            } else {
                "new case"
            },
            fields: vec![
                FormField::new("case no", case_no),
                FormField::new("case name", case_name),
                FormField::new("year", year),
                FormField::new("court", court),
                FormField::new("description", description),
            ],
            cursor: 0,
        }
    }

    fn profile_form() -> Self {
        Self {
            title: "create profile",
            fields: vec![
                FormField::new("username", ""),
                FormField::new("first name", ""),
                FormField::new("middle name", ""),
                FormField::new("last name", ""),
            ],
            cursor: 0,
        }
    }

    fn link_form() -> Self {
        Self {
            title: "add link",
            fields: vec![
                FormField::new("title", ""),
                FormField::new("url", ""),
                FormField::new("platform", ""),
            ],
            cursor: 0,
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.value.as_str())
            .unwrap_or_default()
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    fn push_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.cursor) {
            field.value.push(ch);
        }
    }

    fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.cursor) {
            field.value.pop();
        }
    }

    fn case_draft(&self) -> CaseDraft {
        CaseDraft {
            case_no: self.value(0).to_owned(),
            case_name: self.value(1).to_owned(),
            year: self.value(2).to_owned(),
            court: self.value(3).to_owned(),
            description: self.value(4).to_owned(),
        }
    }

    fn profile_draft(&self) -> ProfileDraft {
        ProfileDraft {
            username: self.value(0).to_owned(),
            first_name: self.value(1).to_owned(),
            middle_name: self.value(2).to_owned(),
            last_name: self.value(3).to_owned(),
        }
    }

    fn link_draft(&self) -> LinkDraft {
        LinkDraft {
            title: self.value(0).to_owned(),
            url: self.value(1).to_owned(),
            platform: self.value(2).to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinksUi {
    case_key: CaseKey,
    case_name: String,
    links: Vec<Link>,
    cursor: usize,
}

impl LinksUi {
    fn selected(&self) -> Option<&Link> {
        self.links.get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.links.len() {
            self.cursor = self.links.len().saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingAction {
    DeleteCase(CaseKey),
    DeleteLink(CaseKey, LinkId),
    DeleteAccount(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfirmUi {
    prompt: String,
    action: PendingAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Overlay {
    CaseForm(FormUi),
    ProfileForm(FormUi),
    LinkForm(CaseKey, FormUi),
    Links(LinksUi),
    Confirm(ConfirmUi),
    Help,
}

#[derive(Debug, Default)]
struct ViewData {
    table_cursor: usize,
    search_focused: bool,
    overlay: Option<Overlay>,
    /// Case the open document menu refers to.
    document_target: Option<CaseKey>,
    status_token: u64,
}

pub fn run_app(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = coordinator.startup(session, host) {
        emit_status(
            session,
            &mut view_data,
            &internal_tx,
            format!("startup load failed: {error}"),
        );
    }

    let mut result = Ok(());
    loop {
        process_internal_events(session, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, session, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(POLL_INTERVAL).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                TermEvent::Key(key) => {
                    if handle_key_event(session, coordinator, host, &mut view_data, &internal_tx, key)
                    {
                        break;
                    }
                }
                TermEvent::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    session: &mut Session,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                session.dispatch(Command::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn emit_status(
    session: &mut Session,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    session.set_status(&message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    let token = view_data.status_token;
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(STATUS_CLEAR_SECS));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn absorb_events(view_data: &mut ViewData, session: &Session, events: &[Event]) {
    for event in events {
        match event {
            Event::DerivedRefreshed(count) => {
                if view_data.table_cursor >= *count {
                    view_data.table_cursor = count.saturating_sub(1);
                }
            }
            Event::ScreenChanged(_) => {
                view_data.table_cursor = 0;
            }
            _ => {}
        }
    }
    let rows = session.cache.derived().len();
    if rows == 0 {
        view_data.table_cursor = 0;
    }
}

fn current_query(session: &Session) -> String {
    match &session.view {
        ViewMode::Search(query) => query.clone(),
        ViewMode::Filtered => String::new(),
    }
}

fn selected_case(session: &Session, view_data: &ViewData) -> Option<Case> {
    session
        .cache
        .derived()
        .get(view_data.table_cursor)
        .cloned()
}

fn handle_key_event(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if let Some(overlay) = view_data.overlay.take() {
        handle_overlay_key(
            session,
            coordinator,
            host,
            view_data,
            internal_tx,
            overlay,
            key,
        );
        return false;
    }

    if session.popovers.active().is_some() {
        handle_popover_key(session, coordinator, host, view_data, internal_tx, key);
        return false;
    }

    if view_data.search_focused {
        handle_search_key(session, view_data, key);
        return false;
    }

    match session.screen() {
        Screen::SelectStorageLocation => {
            handle_storage_screen_key(session, coordinator, host, view_data, internal_tx, key)
        }
        Screen::CreateProfile => {
            // The profile form is the whole screen; open it on any key.
            view_data.overlay = Some(Overlay::ProfileForm(FormUi::profile_form()));
            false
        }
        Screen::EmptyWorkspace => {
            handle_empty_workspace_key(session, host, view_data, internal_tx, key)
        }
        Screen::Dashboard => {
            handle_dashboard_key(session, coordinator, host, view_data, internal_tx, key)
        }
    }
}

fn handle_storage_screen_key(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Enter => {
            match coordinator.pick_storage_location(session, host) {
                Ok(events) => {
                    absorb_events(view_data, session, &events);
                    if session.screen() == Screen::SelectStorageLocation {
                        emit_status(session, view_data, internal_tx, "selection cancelled");
                    }
                }
                Err(error) => {
                    emit_status(
                        session,
                        view_data,
                        internal_tx,
                        format!("storage selection failed: {error}"),
                    );
                }
            }
            false
        }
        _ => false,
    }
}

fn handle_empty_workspace_key(
    session: &mut Session,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Char('n') => {
            view_data.overlay = Some(Overlay::CaseForm(FormUi::case_form(None)));
            false
        }
        KeyCode::Char('a') => {
            open_account_menu(session, host, view_data, internal_tx);
            false
        }
        KeyCode::Char('?') => {
            view_data.overlay = Some(Overlay::Help);
            false
        }
        _ => false,
    }
}

fn handle_dashboard_key(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => {
            view_data.search_focused = true;
        }
        KeyCode::Esc => {
            if matches!(session.view, ViewMode::Search(_)) {
                let events = session.dispatch(Command::ClearSearch);
                absorb_events(view_data, session, &events);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.table_cursor = view_data.table_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let rows = session.cache.derived().len();
            if rows > 0 && view_data.table_cursor + 1 < rows {
                view_data.table_cursor += 1;
            }
        }
        KeyCode::Char('n') => {
            view_data.overlay = Some(Overlay::CaseForm(FormUi::case_form(None)));
        }
        KeyCode::Char('e') => {
            if let Some(case) = selected_case(session, view_data) {
                let events = session.dispatch(Command::BeginEdit(case.key.clone()));
                absorb_events(view_data, session, &events);
                if let Some(editable) = session.cache.editable(&case.key).cloned() {
                    view_data.overlay = Some(Overlay::CaseForm(FormUi::case_form(Some(&editable))));
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(case) = selected_case(session, view_data) {
                view_data.overlay = Some(Overlay::Confirm(ConfirmUi {
                    prompt: format!("delete case {}? (y/n)", case.case_name),
                    action: PendingAction::DeleteCase(case.key),
                }));
            }
        }
        KeyCode::Char('l') => {
            if let Some(case) = selected_case(session, view_data) {
                match coordinator.load_links(host, &case.key) {
                    Ok(links) => {
                        view_data.overlay = Some(Overlay::Links(LinksUi {
                            case_key: case.key,
                            case_name: case.case_name,
                            links,
                            cursor: 0,
                        }));
                    }
                    Err(error) => {
                        emit_status(
                            session,
                            view_data,
                            internal_tx,
                            format!("load links failed: {error}"),
                        );
                    }
                }
            }
        }
        KeyCode::Char('c') => {
            let events = session.dispatch(Command::OpenFilterMenu(
                MenuKind::CourtFilter,
                COURT_MENU_ANCHOR,
            ));
            absorb_events(view_data, session, &events);
        }
        KeyCode::Char('y') => {
            let events = session.dispatch(Command::OpenFilterMenu(
                MenuKind::YearFilter,
                YEAR_MENU_ANCHOR,
            ));
            absorb_events(view_data, session, &events);
        }
        KeyCode::Char('s') => {
            let events =
                session.dispatch(Command::OpenFilterMenu(MenuKind::SortMenu, SORT_MENU_ANCHOR));
            absorb_events(view_data, session, &events);
        }
        KeyCode::Char('r') => {
            let events = session.dispatch(Command::ResetFilters);
            absorb_events(view_data, session, &events);
            emit_status(session, view_data, internal_tx, "filters reset");
        }
        KeyCode::Char('a') => {
            open_account_menu(session, host, view_data, internal_tx);
        }
        KeyCode::Char('o') => {
            if let Some(case) = selected_case(session, view_data) {
                view_data.document_target = Some(case.key);
                let events = session.dispatch(Command::OpenMenu(
                    MenuKind::DocumentMenu,
                    DOCUMENT_MENU_ANCHOR,
                    vec![
                        MenuItem::new("add", "Add documents"),
                        MenuItem::new("open", "Open documents folder"),
                    ],
                ));
                absorb_events(view_data, session, &events);
            }
        }
        KeyCode::Char('?') => {
            view_data.overlay = Some(Overlay::Help);
        }
        _ => {}
    }
    false
}

fn open_account_menu(
    session: &mut Session,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let active = match host.get_current_profile() {
        Ok(profile) => profile,
        Err(error) => {
            emit_status(
                session,
                view_data,
                internal_tx,
                format!("load profile failed: {error}"),
            );
            return;
        }
    };

    let mut items = vec![
        MenuItem::new("switch", "Switch profile"),
        MenuItem::new("new", "New profile"),
    ];
    if let Some(profile) = active {
        items.push(MenuItem::new(
            "delete",
            format!("Delete account {}", profile.username),
        ));
    }
    let events = session.dispatch(Command::OpenMenu(
        MenuKind::AccountMenu,
        ACCOUNT_MENU_ANCHOR,
        items,
    ));
    absorb_events(view_data, session, &events);
}

fn handle_search_key(session: &mut Session, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            view_data.search_focused = false;
            let events = session.dispatch(Command::ClearSearch);
            absorb_events(view_data, session, &events);
        }
        KeyCode::Enter => {
            view_data.search_focused = false;
        }
        KeyCode::Backspace => {
            let mut query = current_query(session);
            query.pop();
            let events = session.dispatch(Command::SetSearchQuery(query));
            absorb_events(view_data, session, &events);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut query = current_query(session);
            query.push(ch);
            let events = session.dispatch(Command::SetSearchQuery(query));
            absorb_events(view_data, session, &events);
        }
        _ => {}
    }
}

fn handle_popover_key(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            session.dispatch(Command::MenuCursor(-1));
        }
        KeyCode::Down | KeyCode::Char('j') => {
            session.dispatch(Command::MenuCursor(1));
        }
        KeyCode::Esc => {
            session.dispatch(Command::Dismiss);
            view_data.document_target = None;
        }
        KeyCode::Enter => {
            let events = session.dispatch(Command::MenuSelect);
            absorb_events(view_data, session, &events);
            let selections: Vec<(MenuKind, MenuItem)> = events
                .into_iter()
                .filter_map(|event| match event {
                    Event::MenuSelected(kind, item) => Some((kind, item)),
                    _ => None,
                })
                .collect();
            for (kind, item) in selections {
                handle_shell_selection(
                    session,
                    coordinator,
                    host,
                    view_data,
                    internal_tx,
                    kind,
                    item,
                );
            }
        }
        _ => {}
    }
}

/// Selections the session hands back: account actions, profile
/// switching and document actions all need the host.
fn handle_shell_selection(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: MenuKind,
    item: MenuItem,
) {
    match kind {
        MenuKind::AccountMenu => match item.id.as_str() {
            "switch" => {
                let profiles = match host.get_all_profiles() {
                    Ok(profiles) => profiles,
                    Err(error) => {
                        emit_status(
                            session,
                            view_data,
                            internal_tx,
                            format!("load profiles failed: {error}"),
                        );
                        return;
                    }
                };
                let items: Vec<MenuItem> = profiles
                    .iter()
                    .map(|profile| MenuItem::new(profile.username.clone(), profile.display_name()))
                    .collect();
                if items.is_empty() {
                    emit_status(session, view_data, internal_tx, "no profiles to switch to");
                    return;
                }
                let events = session.dispatch(Command::OpenMenu(
                    MenuKind::ProfileSwitcher,
                    ACCOUNT_MENU_ANCHOR,
                    items,
                ));
                absorb_events(view_data, session, &events);
            }
            "new" => {
                view_data.overlay = Some(Overlay::ProfileForm(FormUi::profile_form()));
            }
            "delete" => {
                let username = item
                    .label
                    .strip_prefix("Delete account ")
                    .unwrap_or(item.label.as_str())
                    .to_owned();
                view_data.overlay = Some(Overlay::Confirm(ConfirmUi {
                    prompt: format!("delete account {username} and all its cases? (y/n)"),
                    action: PendingAction::DeleteAccount(username),
                }));
            }
            _ => {}
        },
        MenuKind::ProfileSwitcher => {
            match coordinator.switch_profile(session, host, &item.id) {
                Ok(events) => {
                    absorb_events(view_data, session, &events);
                    emit_status(
                        session,
                        view_data,
                        internal_tx,
                        format!("now browsing {}", item.id),
                    );
                }
                Err(error) => {
                    emit_status(
                        session,
                        view_data,
                        internal_tx,
                        format!("switch failed: {error}"),
                    );
                }
            }
        }
        MenuKind::DocumentMenu => {
            let Some(case_key) = view_data.document_target.take() else {
                return;
            };
            let outcome = match item.id.as_str() {
                "add" => coordinator.add_documents(host, &case_key),
                "open" => coordinator.open_documents(host, &case_key),
                _ => Ok(()),
            };
            if let Err(error) = outcome {
                emit_status(
                    session,
                    view_data,
                    internal_tx,
                    format!("document action failed: {error}"),
                );
            }
        }
        MenuKind::CourtFilter | MenuKind::YearFilter | MenuKind::SortMenu => {}
    }
}

fn handle_overlay_key(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    overlay: Overlay,
    key: KeyEvent,
) {
    match overlay {
        Overlay::Help => {
            if !matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                view_data.overlay = Some(Overlay::Help);
            }
        }
        Overlay::Confirm(confirm) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                run_pending_action(session, coordinator, host, view_data, internal_tx, confirm);
            }
            _ => {}
        },
        Overlay::CaseForm(mut form) => match key.code {
            KeyCode::Esc => {
                let events = session.dispatch(Command::CancelEdit);
                absorb_events(view_data, session, &events);
            }
            KeyCode::Enter => match coordinator.save_case(session, host, &form.case_draft()) {
                Ok(events) => {
                    absorb_events(view_data, session, &events);
                    emit_status(session, view_data, internal_tx, "case saved");
                }
                Err(error) => {
                    emit_status(session, view_data, internal_tx, error.to_string());
                    view_data.overlay = Some(Overlay::CaseForm(form));
                }
            },
            _ => {
                edit_form_field(&mut form, key);
                view_data.overlay = Some(Overlay::CaseForm(form));
            }
        },
        Overlay::ProfileForm(mut form) => match key.code {
            KeyCode::Esc => {
                // On the create-profile screen there is nothing to go
                // back to; the form reopens on the next keypress.
            }
            KeyCode::Enter => {
                match coordinator.create_profile(session, host, &form.profile_draft()) {
                    Ok(events) => {
                        absorb_events(view_data, session, &events);
                        emit_status(session, view_data, internal_tx, "profile created");
                    }
                    Err(error) => {
                        emit_status(session, view_data, internal_tx, error.to_string());
                        view_data.overlay = Some(Overlay::ProfileForm(form));
                    }
                }
            }
            _ => {
                edit_form_field(&mut form, key);
                view_data.overlay = Some(Overlay::ProfileForm(form));
            }
        },
        Overlay::LinkForm(case_key, mut form) => match key.code {
            KeyCode::Esc => {
                reopen_links(session, coordinator, host, view_data, internal_tx, case_key);
            }
            KeyCode::Enter => {
                match coordinator.add_link(session, host, &case_key, &form.link_draft()) {
                    Ok((links, events)) => {
                        absorb_events(view_data, session, &events);
                        let case_name = case_name_for(session, &case_key);
                        view_data.overlay = Some(Overlay::Links(LinksUi {
                            case_key,
                            case_name,
                            links,
                            cursor: 0,
                        }));
                        emit_status(session, view_data, internal_tx, "link added");
                    }
                    Err(error) => {
                        emit_status(session, view_data, internal_tx, error.to_string());
                        view_data.overlay = Some(Overlay::LinkForm(case_key, form));
                    }
                }
            }
            _ => {
                edit_form_field(&mut form, key);
                view_data.overlay = Some(Overlay::LinkForm(case_key, form));
            }
        },
        Overlay::Links(mut links) => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {}
            KeyCode::Up | KeyCode::Char('k') => {
                links.cursor = links.cursor.saturating_sub(1);
                view_data.overlay = Some(Overlay::Links(links));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !links.links.is_empty() && links.cursor + 1 < links.links.len() {
                    links.cursor += 1;
                }
                view_data.overlay = Some(Overlay::Links(links));
            }
            KeyCode::Char('a') => {
                view_data.overlay = Some(Overlay::LinkForm(links.case_key, FormUi::link_form()));
            }
            KeyCode::Char('d') => {
                if let Some(link) = links.selected() {
                    view_data.overlay = Some(Overlay::Confirm(ConfirmUi {
                        prompt: format!("delete link {}? (y/n)", link.title),
                        action: PendingAction::DeleteLink(links.case_key.clone(), link.id.clone()),
                    }));
                } else {
                    view_data.overlay = Some(Overlay::Links(links));
                }
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                if let Some(link) = links.selected() {
                    if let Err(error) = coordinator.open_external(host, &link.url) {
                        emit_status(
                            session,
                            view_data,
                            internal_tx,
                            format!("open link failed: {error}"),
                        );
                    }
                }
                view_data.overlay = Some(Overlay::Links(links));
            }
            _ => {
                view_data.overlay = Some(Overlay::Links(links));
            }
        },
    }
}

fn edit_form_field(form: &mut FormUi, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.move_cursor(1),
        KeyCode::BackTab | KeyCode::Up => form.move_cursor(-1),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.push_char(ch),
        _ => {}
    }
}

fn run_pending_action(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    confirm: ConfirmUi,
) {
    match confirm.action {
        PendingAction::DeleteCase(key) => match coordinator.delete_case(session, host, &key) {
            Ok(events) => {
                absorb_events(view_data, session, &events);
                emit_status(session, view_data, internal_tx, "case deleted");
            }
            Err(error) => {
                emit_status(session, view_data, internal_tx, error.to_string());
            }
        },
        PendingAction::DeleteLink(case_key, id) => {
            match coordinator.delete_link(session, host, &case_key, &id) {
                Ok((links, events)) => {
                    absorb_events(view_data, session, &events);
                    let case_name = case_name_for(session, &case_key);
                    let mut ui = LinksUi {
                        case_key,
                        case_name,
                        links,
                        cursor: 0,
                    };
                    ui.clamp_cursor();
                    view_data.overlay = Some(Overlay::Links(ui));
                    emit_status(session, view_data, internal_tx, "link deleted");
                }
                Err(error) => {
                    emit_status(session, view_data, internal_tx, error.to_string());
                }
            }
        }
        PendingAction::DeleteAccount(username) => {
            match coordinator.delete_account(session, host, &username) {
                Ok(events) => {
                    absorb_events(view_data, session, &events);
                    emit_status(
                        session,
                        view_data,
                        internal_tx,
                        format!("account {username} deleted"),
                    );
                }
                Err(error) => {
                    emit_status(session, view_data, internal_tx, error.to_string());
                }
            }
        }
    }
}

fn reopen_links(
    session: &mut Session,
    coordinator: &mut MutationCoordinator,
    host: &mut dyn HostApi,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    case_key: CaseKey,
) {
    match coordinator.load_links(host, &case_key) {
        Ok(links) => {
            let case_name = case_name_for(session, &case_key);
            view_data.overlay = Some(Overlay::Links(LinksUi {
                case_key,
                case_name,
                links,
                cursor: 0,
            }));
        }
        Err(error) => {
            emit_status(
                session,
                view_data,
                internal_tx,
                format!("load links failed: {error}"),
            );
        }
    }
}

fn case_name_for(session: &Session, key: &CaseKey) -> String {
    session
        .cache
        .master()
        .iter()
        .find(|case| &case.key == key)
        .map(|case| case.case_name.clone())
        .unwrap_or_else(|| key.to_string())
}

fn render(frame: &mut ratatui::Frame<'_>, session: &Session, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(session, view_data))
        .block(Block::default().title("rulingsafe").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    match session.screen() {
        Screen::SelectStorageLocation => {
            let body = Paragraph::new(
                "no storage location is set\n\npress Enter to choose a folder, q to quit",
            )
            .block(Block::default().borders(Borders::ALL).title("welcome"));
            frame.render_widget(body, layout[1]);
        }
        Screen::CreateProfile => {
            let body = Paragraph::new("no profile exists yet\n\npress any key to create one")
                .block(Block::default().borders(Borders::ALL).title("profile"));
            frame.render_widget(body, layout[1]);
        }
        Screen::EmptyWorkspace => {
            let body = Paragraph::new(
                "no cases yet\n\nn: new case   a: account   ?: help   q: quit",
            )
            .block(Block::default().borders(Borders::ALL).title("cases"));
            frame.render_widget(body, layout[1]);
        }
        Screen::Dashboard => render_case_table(frame, layout[1], session, view_data),
    }

    let status = session
        .status_line
        .clone()
        .unwrap_or_else(|| key_hints(session, view_data).to_owned());
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(menu) = session.popovers.active() {
        render_popover(frame, menu);
    }

    match &view_data.overlay {
        Some(Overlay::CaseForm(form)) | Some(Overlay::ProfileForm(form)) => {
            render_form(frame, form);
        }
        Some(Overlay::LinkForm(_, form)) => render_form(frame, form),
        Some(Overlay::Links(links)) => render_links(frame, links),
        Some(Overlay::Confirm(confirm)) => {
            let area = centered_rect(48, 20, frame.area());
            frame.render_widget(Clear, area);
            let widget = Paragraph::new(confirm.prompt.clone()).block(
                Block::default()
                    .title("confirm")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
            frame.render_widget(widget, area);
        }
        Some(Overlay::Help) => {
            let area = centered_rect(70, 70, frame.area());
            frame.render_widget(Clear, area);
            let help = Paragraph::new(help_text())
                .block(Block::default().title("help").borders(Borders::ALL));
            frame.render_widget(help, area);
        }
        None => {}
    }
}

fn header_text(session: &Session, view_data: &ViewData) -> String {
    if session.screen() != Screen::Dashboard {
        return session.screen().label().to_owned();
    }

    let search = match &session.view {
        ViewMode::Search(query) if view_data.search_focused => format!("search: {query}_"),
        ViewMode::Search(query) => format!("search: {query}"),
        ViewMode::Filtered if view_data.search_focused => "search: _".to_owned(),
        ViewMode::Filtered => String::new(),
    };
    format!(
        "{search:<24} court: {:<12} year: {:<8} sort: {}",
        session.filters.court.label(),
        session.filters.year.label(),
        session.filters.sort.label(),
    )
}

fn key_hints(session: &Session, view_data: &ViewData) -> &'static str {
    if view_data.overlay.is_some() {
        return "Enter: confirm   Esc: close   Tab: next field";
    }
    if session.popovers.active().is_some() {
        return "Up/Down: move   Enter: select   Esc: dismiss";
    }
    match session.screen() {
        Screen::Dashboard => {
            "/: search   n: new   e: edit   d: delete   l: links   c/y/s: filters   r: reset   a: account   o: documents   ?: help"
        }
        _ => "?: help   q: quit",
    }
}

fn render_case_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    session: &Session,
    view_data: &ViewData,
) {
    let date_format = format_description!("[year]-[month]-[day]");
    let header_cells = ["no.", "case", "year", "court", "updated", "links"]
        .into_iter()
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let rows = session
        .cache
        .derived()
        .iter()
        .enumerate()
        .map(|(row_index, case)| {
            let style = if row_index == view_data.table_cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let updated = format_stamp(case.last_updated, date_format);
            Row::new(vec![
                Cell::from(case.case_no.clone()),
                Cell::from(case.case_name.clone()),
                Cell::from(case.year.clone()),
                Cell::from(case.court.clone()),
                Cell::from(updated),
                Cell::from(case.links_count.to_string()),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Length(14),
        Constraint::Min(24),
        Constraint::Length(6),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(6),
    ];
    let title = format!("cases ({})", session.cache.derived().len());
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn format_stamp(
    stamp: OffsetDateTime,
    format: &(impl time::formatting::Formattable + ?Sized),
) -> String {
    stamp.format(format).unwrap_or_default()
}

fn render_popover(frame: &mut ratatui::Frame<'_>, menu: &rulingsafe_app::OpenMenu) {
    let anchor = menu.anchor();
    let width = menu
        .items()
        .iter()
        .map(|item| item.label.len() as u16)
        .max()
        .unwrap_or(8)
        .max(menu.kind().label().len() as u16)
        + 4;
    let height = menu.items().len() as u16 + 2;
    let frame_area = frame.area();
    let x = anchor.x.min(frame_area.width.saturating_sub(width));
    let y = anchor.y.min(frame_area.height.saturating_sub(height));
    let area = Rect::new(x, y, width.min(frame_area.width), height.min(frame_area.height));

    frame.render_widget(Clear, area);
    let lines: Vec<String> = menu
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if index == menu.cursor() {
                format!("> {}", item.label)
            } else {
                format!("  {}", item.label)
            }
        })
        .collect();
    let widget = Paragraph::new(lines.join("\n")).block(
        Block::default()
            .title(menu.kind().label())
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, area);
}

fn render_form(frame: &mut ratatui::Frame<'_>, form: &FormUi) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);
    let lines: Vec<String> = form
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let marker = if index == form.cursor { ">" } else { " " };
            format!("{marker} {:<12} {}", field.label, field.value)
        })
        .collect();
    let body = format!("{}\n\nEnter: save   Esc: cancel", lines.join("\n"));
    let widget = Paragraph::new(body)
        .block(Block::default().title(form.title).borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_links(frame: &mut ratatui::Frame<'_>, links: &LinksUi) {
    let area = centered_rect(70, 55, frame.area());
    frame.render_widget(Clear, area);
    let body = if links.links.is_empty() {
        "no links yet\n\na: add   Esc: close".to_owned()
    } else {
        let lines: Vec<String> = links
            .links
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let marker = if index == links.cursor { ">" } else { " " };
                let platform = if link.platform.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", link.platform)
                };
                format!("{marker} {}{platform}  {}", link.title, link.url)
            })
            .collect();
        format!(
            "{}\n\na: add   d: delete   Enter: open   Esc: close",
            lines.join("\n")
        )
    };
    let title = format!("links: {}", links.case_name);
    let widget = Paragraph::new(body).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn help_text() -> String {
    [
        "navigation",
        "  Up/Down or j/k   move selection",
        "  /                search (Enter keeps, Esc clears)",
        "",
        "cases",
        "  n  new case      e  edit selected",
        "  d  delete        l  links",
        "  o  documents menu",
        "",
        "view",
        "  c  court filter  y  year filter",
        "  s  sort menu     r  reset filters",
        "",
        "profiles",
        "  a  account menu",
        "",
        "Ctrl-q or q quits",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
