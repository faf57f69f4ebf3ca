use super::OutboxItem;

/// Items processed sequentially, in order, as one executor task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboxItemGroup {
    pub items: Vec<OutboxItem>,
}

impl OutboxItemGroup {
    pub fn new(items: Vec<OutboxItem>) -> Self {
        OutboxItemGroup { items }
    }

    pub fn of(item: OutboxItem) -> Self {
        OutboxItemGroup { items: vec![item] }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.items.iter().any(|item| item.id == Some(id))
    }

    /// Whether any item was claimed in the current monitor cycle.
    pub fn has_marked_items(&self) -> bool {
        self.items.iter().any(OutboxItem::is_marked_for_processing)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.items.iter().filter_map(|item| item.id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutboxItem> {
        self.items.iter()
    }
}

impl IntoIterator for OutboxItemGroup {
    type Item = OutboxItem;
    type IntoIter = std::vec::IntoIter<OutboxItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a OutboxItemGroup {
    type Item = &'a OutboxItem;
    type IntoIter = std::slice::Iter<'a, OutboxItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
