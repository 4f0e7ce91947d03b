use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String, // Display text, the only field the filter looks at
    pub link: String,  // Target opened on activation
}

impl Entry {
    pub fn new(label: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: link.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Category {
    pub fn new(name: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// One group of a [`SearchResult`]: a category name and the entries that
/// survived filtering, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    pub category: String,
    pub items: Vec<Entry>,
}

/// Filtered, category-grouped view of a dataset. An empty query keeps every
/// category as declared, empty ones included; any other query omits groups
/// with zero items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchResult {
    pub groups: Vec<CategoryResult>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    /// Items across all groups in display order, paired with their group.
    pub fn flat_items(&self) -> impl Iterator<Item = (&CategoryResult, &Entry)> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter().map(move |item| (g, item)))
    }

    pub fn item_at(&self, index: usize) -> Option<&Entry> {
        self.flat_items().nth(index).map(|(_, item)| item)
    }
}
