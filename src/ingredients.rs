//! The editable working copy of detected ingredients.
//!
//! A successful detection replaces the list wholesale; everything after that
//! is positional editing. Removing or adding entries never reorders the
//! surviving entries relative to each other.

use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientList {
    entries: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self { entries: names }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned snapshot for handing to the gateway.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Discard the current entries in favor of a fresh detection result.
    pub fn replace(&mut self, names: Vec<String>) {
        self.entries = names;
    }

    /// Overwrite the entry at `index`. Blank text is permitted; an
    /// out-of-range index is ignored.
    pub fn edit(&mut self, index: usize, text: String) {
        match self.entries.get_mut(index) {
            Some(entry) => *entry = text,
            None => debug!(index, len = self.entries.len(), "ignoring edit outside the list"),
        }
    }

    /// Append one blank entry for the user to fill in.
    pub fn add_blank(&mut self) {
        self.entries.push(String::new());
    }

    /// Remove the entry at `index`, shifting later entries left by one. An
    /// out-of-range index is ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        } else {
            debug!(index, len = self.entries.len(), "ignoring removal outside the list");
        }
    }
}
