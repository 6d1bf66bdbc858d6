use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::{category::CategoryId, product::DenormalizedProduct, user::UserId};
use crate::view::state::{FilterCriteria, SortDirection, SortKey, SortOrder};

/// Keeps rows whose category is owned by `owner`. A row with an unresolved
/// category never matches an owner.
pub fn filter_by_owner(rows: &[DenormalizedProduct], owner: Option<UserId>) -> Vec<DenormalizedProduct> {
    match owner {
        None => rows.to_vec(),
        Some(owner) => rows.iter().filter(|row| owner_matches(row, owner)).cloned().collect(),
    }
}

/// Case-insensitive substring match against the product name. An empty query
/// keeps every row.
pub fn filter_by_query(rows: &[DenormalizedProduct], query: &str) -> Vec<DenormalizedProduct> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter().filter(|row| query_matches(row, &needle)).cloned().collect()
}

pub fn filter_by_categories(
    rows: &[DenormalizedProduct],
    categories: &BTreeSet<CategoryId>,
) -> Vec<DenormalizedProduct> {
    if categories.is_empty() {
        return rows.to_vec();
    }
    rows.iter().filter(|row| categories.contains(&row.product.category_id)).cloned().collect()
}

/// Stable sort; rows that compare equal keep their relative order.
pub fn sort_rows(rows: &mut [DenormalizedProduct], order: SortOrder) {
    rows.sort_by(|left, right| {
        let ordering = compare_by_key(left, right, order.key);
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// The visible set for `criteria`, derived from scratch over `full`.
pub fn derive_visible(full: &[DenormalizedProduct], criteria: &FilterCriteria) -> Vec<DenormalizedProduct> {
    let needle = criteria.query.to_lowercase();
    let mut visible: Vec<_> = full
        .iter()
        .filter(|row| criteria.owner.map_or(true, |owner| owner_matches(row, owner)))
        .filter(|row| {
            criteria.categories.is_empty()
                || criteria.categories.contains(&row.product.category_id)
        })
        .filter(|row| query_matches(row, &needle))
        .cloned()
        .collect();

    if let Some(order) = criteria.sort {
        sort_rows(&mut visible, order);
    }
    visible
}

fn owner_matches(row: &DenormalizedProduct, owner: UserId) -> bool {
    row.category.as_ref().is_some_and(|category| category.owner_id == owner)
}

fn query_matches(row: &DenormalizedProduct, needle: &str) -> bool {
    needle.is_empty() || row.product.name.to_lowercase().contains(needle)
}

fn compare_by_key(left: &DenormalizedProduct, right: &DenormalizedProduct, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => left.id().cmp(&right.id()),
        SortKey::Product => compare_text(Some(left.name()), Some(right.name())),
        SortKey::Category => compare_text(left.category_title(), right.category_title()),
        SortKey::User => compare_text(left.user_name(), right.user_name()),
    }
}

// None sorts first.
fn compare_text(left: Option<&str>, right: Option<&str>) -> Ordering {
    left.map(str::to_lowercase).cmp(&right.map(str::to_lowercase))
}
