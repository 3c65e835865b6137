//! The "add members" dialog: search the contact directory and pick several
//! contacts at once.

use log::debug;
use tui_input::Input;

use crate::directory;
use crate::filter;
use crate::forms::Edit;
use crate::models::Contact;
use crate::selection::Selection;

#[derive(Debug, Clone, Default)]
pub struct AddMembersDialog {
    pub group_name: Option<String>,
    pub search: Input,
    selection: Selection,
    cursor: usize,  // Row within the filtered list
    chip_cursor: Option<usize>,  // Focused chip, when the chips row has focus
}

impl AddMembersDialog {
    pub fn new(group_name: Option<&str>) -> Self {
        AddMembersDialog {
            group_name: group_name.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        self.search.value()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the focused chip, or `None` while typing in the search box.
    pub fn chip_cursor(&self) -> Option<usize> {
        self.chip_cursor
    }

    /// Identity behind the focused chip.
    pub fn focused_chip(&self) -> Option<u32> {
        self.chip_cursor.and_then(|i| self.selection.ids().get(i).copied())
    }

    /// Whether `contact` passes the current search. Selected contacts that
    /// do not are still shown as chips.
    pub fn is_visible(&self, contact: &Contact) -> bool {
        filter::matches(contact, self.query())
    }

    /// Contacts matching the current query.
    pub fn visible(&self) -> impl Iterator<Item = &'static Contact> {
        filter::filter(directory::contacts(), self.query())
    }

    /// Edits the search text. The cursor goes back to the first row.
    pub fn edit_search(&mut self, edit: Edit) {
        edit.apply(&mut self.search);
        self.cursor = 0;
        self.chip_cursor = None;
    }

    /// Moves focus between the search box and the chips row. Focusing the
    /// chips starts on the most recent one.
    pub fn toggle_chip_focus(&mut self) {
        self.chip_cursor = match self.chip_cursor {
            None if !self.selection.is_empty() => Some(self.selection.len() - 1),
            _ => None,
        };
    }

    pub fn move_chip_cursor(&mut self, delta: isize) {
        if let Some(i) = self.chip_cursor {
            let last = self.selection.len() as isize - 1;
            self.chip_cursor = Some((i as isize + delta).clamp(0, last.max(0)) as usize);
        }
    }

    /// The chip a removal key drops: the focused one if the chips row has
    /// focus, otherwise the most recently selected one.
    pub fn chip_to_remove(&self) -> Option<u32> {
        self.focused_chip()
            .or_else(|| self.selection.ids().last().copied())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().count();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn toggle(&mut self, id: u32) {
        self.selection.toggle(id);
        self.clamp_chip_cursor();
    }

    fn clamp_chip_cursor(&mut self) {
        self.chip_cursor = match self.chip_cursor {
            Some(_) if self.selection.is_empty() => None,
            Some(i) => Some(i.min(self.selection.len() - 1)),
            None => None,
        };
    }

    /// Toggles the contact on the highlighted row, if there is one.
    pub fn toggle_under_cursor(&mut self) {
        if let Some(id) = self.visible().nth(self.cursor).map(|c| c.id) {
            self.toggle(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.chip_cursor = None;
    }

    pub fn can_confirm(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Empties both the selection and the search text.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.search.reset();
        self.cursor = 0;
        self.chip_cursor = None;
    }

    /// Takes the selected identities and resets the dialog. Returns `None`
    /// (and changes nothing) when nothing is selected.
    pub fn confirm(&mut self) -> Option<Vec<u32>> {
        if !self.can_confirm() {
            debug!("Add members: confirm ignored, nothing selected");
            return None;
        }
        let ids = self.selection.ids().to_vec();
        self.reset();
        Some(ids)
    }
}
