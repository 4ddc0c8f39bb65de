//! Owned joint name storage
//!
//! All names of one skeleton live in a single string buffer owned by that
//! skeleton; joints refer to them by slot. Nothing borrows from the import
//! buffer, so the asset bytes can be dropped right after import.

/// Packed name storage for a skeleton
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    text: String,
    spans: Vec<(u32, u32)>,
}

impl NameTable {
    /// Create a table sized for `count` names
    pub fn with_capacity(count: usize) -> Self {
        Self {
            text: String::with_capacity(count * 16),
            spans: Vec::with_capacity(count),
        }
    }

    /// Append a name, returning its slot
    pub fn push(&mut self, name: &str) -> usize {
        let start = self.text.len() as u32;
        self.text.push_str(name);
        self.spans.push((start, self.text.len() as u32));
        self.spans.len() - 1
    }

    /// Name stored in `slot`
    pub fn get(&self, slot: usize) -> Option<&str> {
        self.spans
            .get(slot)
            .map(|&(start, end)| &self.text[start as usize..end as usize])
    }

    /// Number of stored names
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when no names are stored
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterate names in slot order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.spans
            .iter()
            .map(|&(start, end)| &self.text[start as usize..end as usize])
    }

    /// Slot of the first name equal to `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.iter().position(|n| n == name)
    }
}
