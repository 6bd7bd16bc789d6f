use crate::models::CanonicalItem;

/// Insertion-ordered set of chosen items, unique by id.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    items: Vec<CanonicalItem>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and changes nothing) when an item with the same id is
    /// already selected.
    pub fn add(&mut self, item: CanonicalItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Returns `false` when no item has this id.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[CanonicalItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
