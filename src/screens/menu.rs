//! Scrollable selection list.
//!
//! [`Menu`] is the pure cursor/window state; [`MenuScreen`] renders it.
//!
//! Invariants, after every operation:
//!
//! - `selected_index < items.len()`
//! - `window_offset <= selected_index < window_offset + visible_lines`
//! - `window_offset <= items.len().saturating_sub(visible_lines)`

use super::glyphs::RIGHT_ARROW;
use super::{Action, Bindings, DisplayHandle, Screen, ScreenId};
use crate::drivers::button::Button;
use crate::error::Result;

/// One selectable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub target: ScreenId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    items: &'static [MenuItem],
    selected_index: usize,
    window_offset: usize,
    visible_lines: usize,
}

impl Menu {
    /// `items` must not be empty; `visible_lines` is raised to at least 1.
    pub fn new(items: &'static [MenuItem], visible_lines: usize) -> Self {
        debug_assert!(!items.is_empty(), "menu without items");
        Self {
            items,
            selected_index: 0,
            window_offset: 0,
            visible_lines: visible_lines.max(1),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn window_offset(&self) -> usize {
        self.window_offset
    }

    pub fn selected(&self) -> Option<&MenuItem> {
        self.items.get(self.selected_index)
    }

    /// Advance by one; the window slides only when the selection leaves it.
    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.items.len() {
            self.selected_index += 1;
            if self.selected_index >= self.window_offset + self.visible_lines {
                self.window_offset += 1;
            }
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            if self.selected_index < self.window_offset {
                self.window_offset -= 1;
            }
        }
    }

    /// Visible items with their selected flag.
    pub fn window(&self) -> impl Iterator<Item = (&MenuItem, bool)> + '_ {
        self.items
            .iter()
            .enumerate()
            .skip(self.window_offset)
            .take(self.visible_lines)
            .map(|(i, item)| (item, i == self.selected_index))
    }

    /// Rendered lines: cursor glyph before the selected item, a blank
    /// before the others.
    pub fn lines(&self) -> Vec<String> {
        self.window()
            .map(|(item, selected)| {
                let cursor = if selected { RIGHT_ARROW.as_char() } else { ' ' };
                format!("{cursor}{}", item.label)
            })
            .collect()
    }
}

pub struct MenuScreen {
    id: ScreenId,
    bindings: Bindings,
    menu: Menu,
    display: DisplayHandle,
}

impl MenuScreen {
    pub fn new(
        id: ScreenId,
        bindings: Bindings,
        items: &'static [MenuItem],
        visible_lines: usize,
        display: DisplayHandle,
    ) -> Self {
        Self {
            id,
            bindings,
            menu: Menu::new(items, visible_lines),
            display,
        }
    }

    /// Target of the highlighted item.
    pub fn selected_target(&self) -> Option<ScreenId> {
        self.menu.selected().map(|item| item.target)
    }

    /// Re-renders even when already on the last item.
    pub fn select_next_item(&mut self) -> Result<()> {
        self.menu.select_next();
        self.render()
    }

    /// Re-renders even when already on the first item.
    pub fn select_previous_item(&mut self) -> Result<()> {
        self.menu.select_previous();
        self.render()
    }

    fn render(&self) -> Result<()> {
        let lines = self.menu.lines();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.display.show(&refs)
    }
}

impl Screen for MenuScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn initialize(&mut self) -> Result<()> {
        self.render()
    }

    fn menu(&mut self) -> Option<&mut MenuScreen> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

pub const WELCOME_ITEMS: [MenuItem; 2] = [
    MenuItem { label: "Measure", target: ScreenId::Measure },
    MenuItem { label: "Calibrate", target: ScreenId::ProbeSelect },
];

pub const PROBE_ITEMS: [MenuItem; 3] = [
    MenuItem { label: "Temperature", target: ScreenId::CalibrateTemperature },
    MenuItem { label: "EC", target: ScreenId::CalibrateConductivity },
    MenuItem { label: "ORP", target: ScreenId::CalibrateRedox },
];

pub fn welcome(display: DisplayHandle, visible_lines: usize) -> MenuScreen {
    let bindings = Bindings::new()
        .bind(Button::Up, Action::SelectPreviousItem)
        .bind(Button::Down, Action::SelectNextItem)
        .bind(Button::Select, Action::TransitionToSelected);
    MenuScreen::new(ScreenId::Welcome, bindings, &WELCOME_ITEMS, visible_lines, display)
}

pub fn probe_select(display: DisplayHandle, visible_lines: usize) -> MenuScreen {
    let bindings = Bindings::new()
        .bind(Button::Left, Action::TransitionTo(ScreenId::Welcome))
        .bind(Button::Up, Action::SelectPreviousItem)
        .bind(Button::Down, Action::SelectNextItem)
        .bind(Button::Select, Action::TransitionToSelected);
    MenuScreen::new(ScreenId::ProbeSelect, bindings, &PROBE_ITEMS, visible_lines, display)
}
