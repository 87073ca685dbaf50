//! The multi-configuration picker.
//!
//! A [`ConfigurationList`] holds the parameter trees the user has loaded, in
//! order, with exactly one current at a time. Switching the current entry
//! publishes a [`SelectorEvent::ConfigurationChanged`] carrying the newly
//! current tree; re-selecting the current entry publishes nothing. During a
//! capture the list can be locked, which blocks selection changes without
//! losing the entries.
//!
//! Each entry tracks its own "unsaved changes" flag, set when its editor
//! commits and cleared when the tree is persisted to a file. This flag is
//! independent of the editor's change counter, which only tracks pending,
//! uncommitted edits.

use crate::error::{AppResult, ScopeError};
use crate::parameter::ParameterTree;

/// Notification published to the owning application.
#[derive(Debug, Clone)]
pub enum SelectorEvent {
    /// A different configuration became current.
    ConfigurationChanged(ParameterTree),
}

#[derive(Debug, Clone)]
pub struct ConfigurationEntry {
    name: String,
    tree: ParameterTree,
    unsaved: bool,
}

impl ConfigurationEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &ParameterTree {
        &self.tree
    }

    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }
}

#[derive(Debug, Default)]
pub struct ConfigurationList {
    entries: Vec<ConfigurationEntry>,
    current: Option<usize>,
    locked: bool,
}

impl ConfigurationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration. The first entry added becomes current and
    /// publishes a change event; later additions do not steal selection.
    pub fn add(&mut self, tree: ParameterTree) -> Option<SelectorEvent> {
        let name = tree.display_name().to_string();
        self.entries.push(ConfigurationEntry {
            name,
            tree,
            unsaved: false,
        });
        if self.entries.len() == 1 {
            self.current = Some(0);
            Some(SelectorEvent::ConfigurationChanged(
                self.entries[0].tree.clone(),
            ))
        } else {
            None
        }
    }

    /// Make the entry at `index` current.
    ///
    /// Selecting the already-current entry is a no-op publish-wise; any
    /// other valid entry yields exactly one change event. Rejected while
    /// locked.
    pub fn select(&mut self, index: usize) -> AppResult<Option<SelectorEvent>> {
        if self.locked {
            return Err(ScopeError::SelectorLocked);
        }
        if index >= self.entries.len() {
            return Err(ScopeError::UnknownConfiguration(index.to_string()));
        }
        if self.current == Some(index) {
            return Ok(None);
        }
        self.current = Some(index);
        Ok(Some(SelectorEvent::ConfigurationChanged(
            self.entries[index].tree.clone(),
        )))
    }

    /// Select by name or position. Name lookup takes precedence when the
    /// identifier also parses as a valid position.
    pub fn select_by(&mut self, ident: &str) -> AppResult<Option<SelectorEvent>> {
        let index = self
            .index_of(ident)
            .ok_or_else(|| ScopeError::UnknownConfiguration(ident.to_string()))?;
        self.select(index)
    }

    /// Resolve an identifier to an index: by name first, then by position.
    pub fn index_of(&self, ident: &str) -> Option<usize> {
        if let Some(index) = self.entries.iter().position(|e| e.name == ident) {
            return Some(index);
        }
        match ident.parse::<usize>() {
            Ok(index) if index < self.entries.len() => Some(index),
            _ => None,
        }
    }

    pub fn is_valid(&self, ident: &str) -> bool {
        self.index_of(ident).is_some()
    }

    /// Remove a non-current entry. The current entry can never be removed;
    /// indices of entries after the removed one shift down and the current
    /// index follows its entry.
    pub fn remove(&mut self, index: usize) -> AppResult<ConfigurationEntry> {
        if index >= self.entries.len() {
            return Err(ScopeError::UnknownConfiguration(index.to_string()));
        }
        if self.current == Some(index) {
            return Err(ScopeError::CannotRemoveCurrent);
        }
        let removed = self.entries.remove(index);
        if let Some(current) = self.current {
            if current > index {
                self.current = Some(current - 1);
            }
        }
        Ok(removed)
    }

    /// Lock or unlock selection changes (used while a capture runs).
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Flag an entry as having committed-but-unpersisted changes, replacing
    /// its tree with the freshly committed one.
    pub fn store_committed(&mut self, index: usize, tree: ParameterTree) -> AppResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| ScopeError::UnknownConfiguration(index.to_string()))?;
        entry.tree = tree;
        entry.unsaved = true;
        Ok(())
    }

    /// Clear an entry's unsaved flag after persistence, renaming it to the
    /// saved file's stem.
    pub fn mark_saved(&mut self, index: usize, name: impl Into<String>) -> AppResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| ScopeError::UnknownConfiguration(index.to_string()))?;
        let name = name.into();
        entry.tree.set_display_name(name.clone());
        entry.name = name;
        entry.unsaved = false;
        Ok(())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_tree(&self) -> Option<&ParameterTree> {
        self.current.map(|i| &self.entries[i].tree)
    }

    pub fn entry(&self, index: usize) -> Option<&ConfigurationEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ConfigurationEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_tree(name: &str) -> ParameterTree {
        ParameterTree::new(name)
    }

    #[test]
    fn first_add_becomes_current_and_publishes() {
        let mut list = ConfigurationList::new();
        assert!(list.add(named_tree("default")).is_some());
        assert_eq!(list.current_index(), Some(0));
        // Second add does not steal selection and does not publish.
        assert!(list.add(named_tree("stimulation")).is_none());
        assert_eq!(list.current_index(), Some(0));
    }

    #[test]
    fn reselecting_current_never_publishes() {
        let mut list = ConfigurationList::new();
        list.add(named_tree("default"));
        list.add(named_tree("stimulation"));
        assert!(list.select(0).unwrap().is_none());
        // Switching publishes exactly once.
        let event = list.select(1).unwrap();
        assert!(matches!(
            event,
            Some(SelectorEvent::ConfigurationChanged(_))
        ));
        assert!(list.select(1).unwrap().is_none());
    }

    #[test]
    fn name_lookup_takes_precedence_over_position() {
        let mut list = ConfigurationList::new();
        list.add(named_tree("default"));
        list.add(named_tree("0"));
        // "0" matches the entry named "0" at index 1, not position 0.
        assert_eq!(list.index_of("0"), Some(1));
        assert_eq!(list.index_of("1"), Some(1));
        assert_eq!(list.index_of("default"), Some(0));
        assert_eq!(list.index_of("missing"), None);
        assert!(list.is_valid("default"));
        assert!(!list.is_valid("9"));
    }

    #[test]
    fn locked_list_blocks_selection_but_keeps_entries() {
        let mut list = ConfigurationList::new();
        list.add(named_tree("default"));
        list.add(named_tree("stimulation"));
        list.set_locked(true);
        assert!(matches!(list.select(1), Err(ScopeError::SelectorLocked)));
        assert_eq!(list.len(), 2);
        list.set_locked(false);
        assert!(list.select(1).unwrap().is_some());
    }

    #[test]
    fn current_entry_cannot_be_removed() {
        let mut list = ConfigurationList::new();
        list.add(named_tree("default"));
        list.add(named_tree("stimulation"));
        assert!(matches!(
            list.remove(0),
            Err(ScopeError::CannotRemoveCurrent)
        ));
        let removed = list.remove(1).unwrap();
        assert_eq!(removed.name(), "stimulation");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn removal_shifts_current_index_with_its_entry() {
        let mut list = ConfigurationList::new();
        list.add(named_tree("a"));
        list.add(named_tree("b"));
        list.add(named_tree("c"));
        list.select(2).unwrap();
        list.remove(0).unwrap();
        assert_eq!(list.current_index(), Some(1));
        assert_eq!(list.current_tree().unwrap().display_name(), "c");
    }

    #[test]
    fn unsaved_flag_follows_commit_and_save() {
        let mut list = ConfigurationList::new();
        list.add(named_tree("default"));
        assert!(!list.entry(0).unwrap().is_unsaved());

        let mut committed = named_tree("default");
        committed.insert(
            "directory",
            crate::parameter::Parameter::new(
                "directory",
                crate::parameter::ParameterKind::Directory,
                "/data".into(),
            ),
        );
        list.store_committed(0, committed).unwrap();
        assert!(list.entry(0).unwrap().is_unsaved());

        list.mark_saved(0, "default_v2").unwrap();
        let entry = list.entry(0).unwrap();
        assert!(!entry.is_unsaved());
        assert_eq!(entry.name(), "default_v2");
        assert_eq!(entry.tree().display_name(), "default_v2");
    }
}
