// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Identity of a transient menu surface. At most one surface exists at
/// a time across all kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    CourtFilter,
    YearFilter,
    SortMenu,
    AccountMenu,
    ProfileSwitcher,
    DocumentMenu,
}

impl MenuKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CourtFilter => "court",
            Self::YearFilter => "year",
            Self::SortMenu => "sort",
            Self::AccountMenu => "account",
            Self::ProfileSwitcher => "switch profile",
            Self::DocumentMenu => "documents",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Screen position the surface is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMenu {
    kind: MenuKind,
    anchor: Anchor,
    items: Vec<MenuItem>,
    cursor: usize,
}

impl OpenMenu {
    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Generic transient-menu lifecycle shared by the column filter
/// pickers, the account menu, the profile switcher and the per-case
/// document menu.
///
/// The outside-dismiss hook is tracked explicitly: it is installed
/// exactly once per open surface and removed when the surface closes,
/// so repeated open/close cycles can never accumulate hooks. The
/// balance is observable for tests and asserted to stay in {0, 1}.
#[derive(Debug, Default)]
pub struct PopoverController {
    open: Option<OpenMenu>,
    listener_balance: i32,
}

impl PopoverController {
    /// Opens (or toggles) the named menu. Opening a kind that is
    /// already open closes it; opening a different kind replaces the
    /// current surface. Returns true when a surface is open afterward.
    pub fn open(&mut self, kind: MenuKind, anchor: Anchor, items: Vec<MenuItem>) -> bool {
        if let Some(current) = &self.open {
            let toggling = current.kind() == kind;
            self.close_surface();
            if toggling {
                return false;
            }
        }

        self.open = Some(OpenMenu {
            kind,
            anchor,
            items,
            cursor: 0,
        });
        self.install_listener();
        true
    }

    /// Outside click / escape. Returns true if a surface was closed.
    pub fn dismiss(&mut self) -> bool {
        if self.open.is_some() {
            self.close_surface();
            true
        } else {
            false
        }
    }

    /// Confirms the item under the cursor, closing the surface.
    pub fn select(&mut self) -> Option<(MenuKind, MenuItem)> {
        let surface = self.open.as_ref()?;
        let item = surface.items().get(surface.cursor())?.clone();
        let kind = surface.kind();
        self.close_surface();
        Some((kind, item))
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if let Some(surface) = &mut self.open {
            let len = surface.items.len();
            if len == 0 {
                return;
            }
            let current = surface.cursor as isize;
            surface.cursor = (current + delta).rem_euclid(len as isize) as usize;
        }
    }

    pub fn active(&self) -> Option<&OpenMenu> {
        self.open.as_ref()
    }

    pub fn is_open(&self, kind: MenuKind) -> bool {
        self.open.as_ref().is_some_and(|menu| menu.kind() == kind)
    }

    /// Net outside-dismiss hooks currently installed. 1 while a
    /// surface is open, 0 otherwise.
    pub fn listener_balance(&self) -> i32 {
        self.listener_balance
    }

    fn close_surface(&mut self) {
        if self.open.take().is_some() {
            self.remove_listener();
        }
    }

    fn install_listener(&mut self) {
        self.listener_balance += 1;
        debug_assert_eq!(self.listener_balance, 1);
    }

    fn remove_listener(&mut self) {
        self.listener_balance -= 1;
        debug_assert_eq!(self.listener_balance, 0);
    }
}
