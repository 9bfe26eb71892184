//! Row selection for bulk actions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::types::RecordId;

/// Which rows the header checkbox selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllScope {
    /// Only the rows on the visible page.
    #[default]
    Page,
    /// Every row that passes the active filters, across all pages.
    Filtered,
}

/// What happens to selected rows that a filter change hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    #[default]
    Prune,
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckState {
    Unchecked,
    Checked,
    Indeterminate,
}

impl CheckState {
    pub fn is_checked(self) -> bool {
        matches!(self, CheckState::Checked)
    }

    pub fn is_indeterminate(self) -> bool {
        matches!(self, CheckState::Indeterminate)
    }
}

/// Selected record ids, unique and kept in the order they were picked.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<RecordId>,
    members: HashSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.members.contains(id)
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.order
    }

    pub fn insert(&mut self, id: RecordId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: &RecordId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }

    pub fn toggle(&mut self, id: RecordId, checked: bool) {
        if checked {
            self.insert(id);
        } else {
            self.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Header checkbox: checked replaces the selection with `relevant`,
    /// unchecked clears it.
    pub fn select_all<'a, I>(&mut self, relevant: I, checked: bool)
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        self.clear();
        if checked {
            for id in relevant {
                self.insert(id.clone());
            }
        }
    }

    /// Drop every id for which `keep` returns `false`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&RecordId) -> bool,
    {
        let members = &mut self.members;
        self.order.retain(|id| {
            let kept = keep(id);
            if !kept {
                members.remove(id);
            }
            kept
        });
    }

    pub fn check_state<'a, I>(&self, relevant: I) -> CheckState
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let mut total = 0usize;
        let mut selected = 0usize;
        for id in relevant {
            total += 1;
            if self.contains(id) {
                selected += 1;
            }
        }

        if selected == 0 {
            CheckState::Unchecked
        } else if selected == total {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }
}

/// Whether the bulk action button may be pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkGate {
    pub requires_action: bool,
}

impl BulkGate {
    pub fn new(requires_action: bool) -> Self {
        Self { requires_action }
    }

    pub fn is_open(&self, selection: &SelectionSet, action_chosen: bool) -> bool {
        !selection.is_empty() && (!self.requires_action || action_chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<RecordId> {
        values.iter().copied().map(RecordId::from).collect()
    }

    #[test]
    fn keeps_insertion_order_without_duplicates() {
        let mut selection = SelectionSet::new();
        assert!(selection.insert(RecordId::from(7)));
        assert!(selection.insert(RecordId::from(3)));
        assert!(!selection.insert(RecordId::from(7)));

        assert_eq!(selection.ids(), ids(&["7", "3"]).as_slice());

        selection.toggle(RecordId::from(7), false);
        assert_eq!(selection.ids(), ids(&["3"]).as_slice());
    }

    #[test]
    fn select_all_then_clear() {
        let page = ids(&["1", "2", "3"]);
        let mut selection = SelectionSet::new();
        selection.insert(RecordId::from(99));

        selection.select_all(&page, true);
        assert_eq!(selection.len(), 3);
        assert!(!selection.contains(&RecordId::from(99)));

        selection.select_all(&page, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn header_checkbox_is_tri_state() {
        let page = ids(&["1", "2"]);
        let mut selection = SelectionSet::new();
        assert_eq!(selection.check_state(&page), CheckState::Unchecked);

        selection.insert(RecordId::from(1));
        assert_eq!(selection.check_state(&page), CheckState::Indeterminate);

        selection.insert(RecordId::from(2));
        assert_eq!(selection.check_state(&page), CheckState::Checked);

        assert_eq!(selection.check_state(&Vec::<RecordId>::new()), CheckState::Unchecked);
    }

    #[test]
    fn retain_keeps_order_and_membership_in_sync() {
        let mut selection = SelectionSet::new();
        for id in ["4", "5", "6"] {
            selection.insert(RecordId::from(id));
        }

        selection.retain(|id| id.as_str() != "5");

        assert_eq!(selection.ids(), ids(&["4", "6"]).as_slice());
        assert!(!selection.contains(&RecordId::from(5)));
    }

    #[test]
    fn gate_requires_selection_and_optionally_an_action() {
        let mut selection = SelectionSet::new();
        let gate = BulkGate::new(true);
        assert!(!gate.is_open(&selection, true));

        selection.insert(RecordId::from(1));
        assert!(!gate.is_open(&selection, false));
        assert!(gate.is_open(&selection, true));
        assert!(BulkGate::new(false).is_open(&selection, false));
    }
}
