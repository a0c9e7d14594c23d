//! Index arena: categories and entries addressed by handles.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use tyria_dat::FileType;

use crate::{IndexError, Result};

/// Handle to a category in an [`Index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub(crate) u32);

/// Handle to an entry in an [`Index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u32);

impl CategoryId {
    /// Position in the category arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EntryId {
    /// Position in the entry arena (insertion order).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    parent: Option<CategoryId>,
    children: Vec<CategoryId>,
    entries: Vec<EntryId>,
}

impl Category {
    fn new(name: &str, parent: Option<CategoryId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Category name; empty for the root.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent category, `None` only for the root.
    #[inline]
    pub fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    /// Sub-categories in first-seen order.
    #[inline]
    pub fn sub_categories(&self) -> &[CategoryId] {
        &self.children
    }

    /// Own entries in name order.
    #[inline]
    pub fn entries(&self) -> &[EntryId] {
        &self.entries
    }
}

/// An indexed asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    base_id: u32,
    name: String,
    file_type: FileType,
    category: CategoryId,
}

impl IndexEntry {
    #[inline]
    pub fn base_id(&self) -> u32 {
        self.base_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    #[inline]
    pub fn category(&self) -> CategoryId {
        self.category
    }
}

/// Order entry names: purely numeric names first by value, then the rest by
/// byte order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fn is_numeric(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }

    match (is_numeric(a), is_numeric(b)) {
        (true, true) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.as_bytes().cmp(b.as_bytes()),
    }
}

/// Hierarchical index of the assets in one archive.
///
/// The root category always exists and has handle 0. Handles stay valid
/// until [`Index::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    categories: Vec<Category>,
    entries: Vec<IndexEntry>,
    by_base_id: FxHashMap<u32, EntryId>,
    dat_timestamp: u64,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Create an index holding only the root category.
    pub fn new() -> Self {
        Self {
            categories: vec![Category::new("", None)],
            entries: Vec::new(),
            by_base_id: FxHashMap::default(),
            dat_timestamp: 0,
        }
    }

    /// The root category.
    #[inline]
    pub fn root(&self) -> CategoryId {
        CategoryId(0)
    }

    /// Modification time (Unix seconds) of the archive this index describes.
    #[inline]
    pub fn dat_timestamp(&self) -> u64 {
        self.dat_timestamp
    }

    #[inline]
    pub fn set_dat_timestamp(&mut self, timestamp: u64) {
        self.dat_timestamp = timestamp;
    }

    /// Look up a category. Panics on a handle from another index.
    #[inline]
    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[id.index()]
    }

    /// Look up an entry. Panics on a handle from another index.
    #[inline]
    pub fn entry(&self, id: EntryId) -> &IndexEntry {
        &self.entries[id.index()]
    }

    /// Entry registered under `base_id`.
    pub fn entry_by_base_id(&self, base_id: u32) -> Option<EntryId> {
        self.by_base_id.get(&base_id).copied()
    }

    /// Number of categories, root included.
    #[inline]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All categories in creation order, root first.
    pub fn categories(&self) -> impl Iterator<Item = (CategoryId, &Category)> + '_ {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| (CategoryId(i as u32), c))
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &IndexEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryId(i as u32), e))
    }

    /// Direct child of `parent` named `name`.
    pub fn child(&self, parent: CategoryId, name: &str) -> Option<CategoryId> {
        self.category(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.category(c).name == name)
    }

    /// Resolve a path from the root. The empty path is the root.
    pub fn find_category(&self, path: &[&str]) -> Option<CategoryId> {
        path.iter()
            .try_fold(self.root(), |current, name| self.child(current, name))
    }

    /// Return the category at `path`, creating missing nodes in order.
    pub fn ensure_category(&mut self, path: &[&str]) -> CategoryId {
        let mut current = self.root();
        for name in path {
            current = match self.child(current, name) {
                Some(existing) => existing,
                None => self.push_category(current, name),
            };
        }
        current
    }

    pub(crate) fn push_category(&mut self, parent: CategoryId, name: &str) -> CategoryId {
        let id = CategoryId(self.categories.len() as u32);
        self.categories.push(Category::new(name, Some(parent)));
        self.categories[parent.index()].children.push(id);
        id
    }

    /// Names from the root down to `id`, root excluded.
    pub fn category_path(&self, id: CategoryId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            let category = self.category(c);
            if category.parent.is_some() {
                path.push(category.name.as_str());
            }
            current = category.parent;
        }
        path.reverse();
        path
    }

    /// Add an entry under the category at `path`.
    ///
    /// A duplicate `base_id` is rejected and leaves the index unchanged.
    pub fn add_entry(
        &mut self,
        base_id: u32,
        name: &str,
        file_type: FileType,
        path: &[&str],
    ) -> Result<EntryId> {
        if self.by_base_id.contains_key(&base_id) {
            return Err(IndexError::DuplicateEntry(base_id));
        }
        let category = self.ensure_category(path);
        self.insert_entry(base_id, name, file_type, category)
    }

    /// Add an entry directly under an existing category.
    pub(crate) fn insert_entry(
        &mut self,
        base_id: u32,
        name: &str,
        file_type: FileType,
        category: CategoryId,
    ) -> Result<EntryId> {
        if self.by_base_id.contains_key(&base_id) {
            return Err(IndexError::DuplicateEntry(base_id));
        }

        let id = EntryId(self.entries.len() as u32);
        self.entries.push(IndexEntry {
            base_id,
            name: name.to_string(),
            file_type,
            category,
        });

        let entries = &self.entries;
        let siblings = &mut self.categories[category.index()].entries;
        let position = siblings
            .partition_point(|&e| compare_names(&entries[e.index()].name, name) != Ordering::Greater);
        siblings.insert(position, id);

        self.by_base_id.insert(base_id, id);
        Ok(id)
    }

    /// Number of entries in `id`, optionally including all descendants.
    pub fn num_entries(&self, id: CategoryId, recursive: bool) -> usize {
        let category = self.category(id);
        let own = category.entries.len();
        if !recursive {
            return own;
        }
        own + category
            .children
            .iter()
            .map(|&c| self.num_entries(c, true))
            .sum::<usize>()
    }

    /// All entries below `id`, depth first: each category's sub-categories
    /// before its own entries.
    pub fn flatten(&self, id: CategoryId) -> Vec<EntryId> {
        let mut out = Vec::with_capacity(self.num_entries(id, true));
        self.flatten_into(id, &mut out);
        out
    }

    fn flatten_into(&self, id: CategoryId, out: &mut Vec<EntryId>) {
        let category = self.category(id);
        for &child in &category.children {
            self.flatten_into(child, out);
        }
        out.extend_from_slice(&category.entries);
    }

    /// Remove everything except an empty root. Resets the timestamp.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
