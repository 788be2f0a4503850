use std::collections::TryReserveError;

/// A named `[section]` of key/value items, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    items: Vec<Item>,
}

impl Group {
    #[must_use]
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the first item whose key matches exactly.
    ///
    /// A loaded file may repeat a key within a group; later duplicates are shadowed.
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.key == key)
    }

    pub(crate) fn item_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.key == key)
    }

    /// Appends without checking for an existing key.
    pub(crate) fn push(&mut self, item: Item) -> Result<(), TryReserveError> {
        self.items.try_reserve(1)?;
        self.items.push(item);
        Ok(())
    }
}

/// A single `key = value` pair.
///
/// The value is always stored as text. `quoted` marks values that are written back wrapped in double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    key: String,
    value: String,
    quoted: bool,
}

impl Item {
    #[must_use]
    pub(crate) fn new(key: String, value: String, quoted: bool) -> Self {
        Self { key, value, quoted }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub(crate) fn set(&mut self, value: String, quoted: bool) {
        self.value = value;
        self.quoted = quoted;
    }
}
