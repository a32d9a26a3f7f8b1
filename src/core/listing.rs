//! The filter → search → sort → paginate pipeline
//!
//! Every listing screen runs its records through [`list`] (or [`select`] when
//! it shows the whole matching set). The pipeline is a pure projection: it
//! never mutates its input and returns the same page for the same arguments.

use crate::core::error::ValidationError;
use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::{ListQuery, Page, PaginationMeta, RangeFilter, SortDirection, SortSpec};
use crate::core::record::Record;
use std::cmp::Ordering;

/// A range filter with its bounds already parsed
struct ParsedRange {
    field: String,
    from: Option<FieldValue>,
    to: Option<FieldValue>,
}

/// A query that passed validation
struct ValidatedQuery {
    sort: SortSpec,
    range: Option<ParsedRange>,
}

/// Check paging, sort, filter and range parameters against a record type
///
/// Runs before any data is fetched so invalid requests never reach a backend.
pub fn validate<T: Record>(query: &ListQuery) -> Result<(), ValidationError> {
    validate_query::<T>(query, true).map(|_| ())
}

/// Run the full pipeline and return the requested page
///
/// `total_count` reflects the filtered and searched set regardless of the
/// page asked for; a page past the end yields no items.
pub fn list<T: Record>(records: &[T], query: &ListQuery) -> Result<Page<T>, ValidationError> {
    let validated = validate_query::<T>(query, true)?;
    let matching = run(records, query, &validated);

    let pagination = PaginationMeta::new(query.page, query.page_size, matching.len());
    let items = paginate(matching, query.page, query.page_size);

    Ok(Page { items, pagination })
}

/// Run filter, search and sort without slicing a page
///
/// Paging fields of the query are ignored.
pub fn select<T: Record>(records: &[T], query: &ListQuery) -> Result<Vec<T>, ValidationError> {
    let validated = validate_query::<T>(query, false)?;
    Ok(run(records, query, &validated))
}

/// Slice `[offset, offset + page_size)` out of an already sorted set
pub fn paginate<T>(records: Vec<T>, page: usize, page_size: usize) -> Vec<T> {
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    records.into_iter().skip(offset).take(page_size).collect()
}

/// Stable in-place sort by a sortable field
///
/// Records whose values tie keep their relative input order.
pub fn sort_records<T: Record>(records: &mut [T], sort: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = compare_field(a, b, &sort.field);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn run<T: Record>(records: &[T], query: &ListQuery, validated: &ValidatedQuery) -> Vec<T> {
    let term = query
        .search
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| s.term.to_lowercase());

    let mut matching: Vec<T> = records
        .iter()
        .filter(|record| matches_filters(*record, query))
        .filter(|record| {
            validated
                .range
                .as_ref()
                .is_none_or(|range| matches_range(*record, range))
        })
        .filter(|record| term.as_deref().is_none_or(|t| record.matches_search(t)))
        .cloned()
        .collect();

    sort_records(&mut matching, &validated.sort);

    tracing::trace!(
        record = T::KIND.table(),
        candidates = records.len(),
        matched = matching.len(),
        "listing pipeline ran"
    );

    matching
}

fn validate_query<T: Record>(
    query: &ListQuery,
    check_paging: bool,
) -> Result<ValidatedQuery, ValidationError> {
    if check_paging {
        if query.page_size == 0 {
            return Err(ValidationError::InvalidPageSize {
                page_size: query.page_size,
            });
        }
        if query.page == 0 {
            return Err(ValidationError::InvalidPage { page: query.page });
        }
    }

    let sort = query.sort.clone().unwrap_or_else(T::default_sort);
    if T::sort_kind(&sort.field).is_none() {
        return Err(ValidationError::UnknownSortField {
            record: T::KIND.singular().to_string(),
            field: sort.field,
        });
    }

    for (field, _) in query.filters.active() {
        if !T::filterable_fields().contains(&field) {
            return Err(ValidationError::UnknownFilterField {
                record: T::KIND.singular().to_string(),
                field: field.to_string(),
            });
        }
    }

    let range = match &query.range {
        Some(range) if !range.is_unbounded() => Some(parse_range::<T>(range)?),
        _ => None,
    };

    Ok(ValidatedQuery { sort, range })
}

fn parse_range<T: Record>(range: &RangeFilter) -> Result<ParsedRange, ValidationError> {
    let kind: FieldKind =
        T::sort_kind(&range.field).ok_or_else(|| ValidationError::UnknownFilterField {
            record: T::KIND.singular().to_string(),
            field: range.field.clone(),
        })?;

    let parse_bound = |raw: &Option<String>| -> Result<Option<FieldValue>, ValidationError> {
        raw.as_deref()
            .map(|value| {
                FieldValue::parse(kind, value).ok_or_else(|| ValidationError::InvalidRangeBound {
                    field: range.field.clone(),
                    value: value.to_string(),
                })
            })
            .transpose()
    };

    Ok(ParsedRange {
        field: range.field.clone(),
        from: parse_bound(&range.from)?,
        to: parse_bound(&range.to)?,
    })
}

fn matches_filters<T: Record>(record: &T, query: &ListQuery) -> bool {
    query.filters.active().all(|(field, expected)| {
        record
            .field_value(field)
            .is_some_and(|value| value.matches(expected))
    })
}

fn matches_range<T: Record>(record: &T, range: &ParsedRange) -> bool {
    let Some(value) = record.field_value(&range.field).filter(|v| !v.is_null()) else {
        return false;
    };
    let above_from = range
        .from
        .as_ref()
        .is_none_or(|from| value.compare(from) != Ordering::Less);
    let below_to = range
        .to
        .as_ref()
        .is_none_or(|to| value.compare(to) != Ordering::Greater);
    above_from && below_to
}

fn compare_field<T: Record>(a: &T, b: &T, field: &str) -> Ordering {
    let left = a.field_value(field).unwrap_or(FieldValue::Null);
    let right = b.field_value(field).unwrap_or(FieldValue::Null);
    left.compare(&right)
}
