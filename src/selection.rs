//! Multi-select state for picking contacts.

use crate::directory;
use crate::models::Contact;

/// An ordered set of contact identities. Identities are unique and keep the
/// order in which they were first selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<u32>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present.
    pub fn toggle(&mut self, id: u32) {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Selected contacts in selection order. Identities missing from the
    /// directory are skipped.
    pub fn contacts(&self) -> impl Iterator<Item = &'static Contact> + '_ {
        self.ids.iter().filter_map(|&id| directory::contact(id))
    }
}
