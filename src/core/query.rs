//! Query parameters and pagination utilities

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Page size used by the members screen
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smaller first
    Asc,
    /// Larger first
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// Sort field and direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Parse a `field` or `field:direction` expression
    ///
    /// A bare field sorts ascending.
    ///
    /// # Example
    /// ```
    /// use shepherd::core::query::{SortDirection, SortSpec};
    ///
    /// let sort = SortSpec::parse("created_at:desc").unwrap();
    /// assert_eq!(sort.field, "created_at");
    /// assert_eq!(sort.direction, SortDirection::Desc);
    /// ```
    pub fn parse(expr: &str) -> Result<Self, String> {
        match expr.split_once(':') {
            Some((field, direction)) => Ok(Self::new(field.trim(), direction.trim().parse()?)),
            None => Ok(Self::asc(expr.trim())),
        }
    }
}

/// Exact-match filters, AND-ed together
///
/// Entries with an empty value place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(BTreeMap<String, String>);

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Insert only when a value is present
    pub fn insert_opt(&mut self, field: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(field, value);
        }
    }

    /// Filters that actually constrain the result
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

/// Free-text search term
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSpec {
    pub term: String,
}

impl SearchSpec {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

/// Inclusive bounds on a sortable field
///
/// Bounds are parsed with the field's comparison kind, so dates compare
/// chronologically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeFilter {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl RangeFilter {
    pub fn new(field: impl Into<String>, from: Option<String>, to: Option<String>) -> Self {
        Self {
            field: field.into(),
            from: from.filter(|s| !s.is_empty()),
            to: to.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// A complete listing request: filter, search, sort and page
///
/// # Example
/// ```
/// use shepherd::core::query::{ListQuery, SortSpec};
///
/// let query = ListQuery::new(1, 10)
///     .filter("center_id", "1")
///     .search("jo")
///     .sort(SortSpec::asc("name"));
/// assert_eq!(query.page, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Exact-match filters
    pub filters: FilterSpec,

    /// Optional free-text search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchSpec>,

    /// Sort; the record type's default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,

    /// Optional inclusive range constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeFilter>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl ListQuery {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            filters: FilterSpec::default(),
            search: None,
            sort: None,
            range: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field, value);
        self
    }

    pub fn filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(SearchSpec::new(term));
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn range(mut self, range: RangeFilter) -> Self {
        self.range = Some(range);
        self
    }

    /// Same query on another page
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// Paginated result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The page-sized slice of matching records
    pub items: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    pub fn total_count(&self) -> usize {
        self.pagination.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters and search)
    pub total_count: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    ///
    /// `page` and `page_size` are expected to be validated (both at least 1).
    pub fn new(page: usize, page_size: usize, total_count: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size);

        Self {
            page,
            page_size,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Offset of the first item on this page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// 1-based position of the first item shown, 0 when the page is empty
    pub fn first_item(&self) -> usize {
        if self.offset() >= self.total_count {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based position of the last item shown, 0 when the page is empty
    pub fn last_item(&self) -> usize {
        if self.first_item() == 0 {
            0
        } else {
            self.offset()
                .saturating_add(self.page_size)
                .min(self.total_count)
        }
    }

    /// Up to `width` consecutive page numbers around the current page
    ///
    /// The window is centred on the current page and clamped to
    /// `1..=total_pages`.
    pub fn page_window(&self, width: usize) -> Vec<usize> {
        let width = width.min(self.total_pages);
        if width == 0 {
            return Vec::new();
        }
        let half = width / 2;
        let start = self
            .page
            .saturating_sub(half)
            .clamp(1, self.total_pages - width + 1);
        (start..start + width).collect()
    }
}
