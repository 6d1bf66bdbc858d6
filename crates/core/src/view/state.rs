use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{category::CategoryId, user::UserId};

/// How `visible` is re-derived after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputePolicy {
    /// `visible` is a function of the full set and the current criteria.
    #[default]
    Pure,
    /// Owner changes recompute from the full set; query edits narrow whatever is
    /// currently visible. Category, sort and reset events are inert.
    Chained,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Product,
    Category,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub owner: Option<UserId>,
    pub query: String,
    pub categories: BTreeSet<CategoryId>,
    pub sort: Option<SortOrder>,
}

impl FilterCriteria {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Unsorted, then ascending, then descending, then unsorted again. Switching
    /// to another key starts over at ascending.
    pub fn cycle_sort(&mut self, key: SortKey) {
        self.sort = match self.sort {
            Some(SortOrder { key: current, direction: SortDirection::Ascending })
                if current == key =>
            {
                Some(SortOrder { key, direction: SortDirection::Descending })
            }
            Some(SortOrder { key: current, direction: SortDirection::Descending })
                if current == key =>
            {
                None
            }
            _ => Some(SortOrder { key, direction: SortDirection::Ascending }),
        };
    }

    pub fn toggle_category(&mut self, category_id: CategoryId) {
        if !self.categories.remove(&category_id) {
            self.categories.insert(category_id);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewEvent {
    SelectOwner(Option<UserId>),
    SetQuery(String),
    ClearQuery,
    ToggleCategory(CategoryId),
    ClearCategories,
    SortBy(SortKey),
    ResetAll,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTransition {
    pub event: ViewEvent,
    pub visible_before: usize,
    pub visible_after: usize,
    pub criteria_changed: bool,
}

#[cfg(test)]
mod tests {
    use super::{FilterCriteria, SortDirection, SortKey, SortOrder};
    use crate::domain::category::CategoryId;

    #[test]
    fn sort_cycles_through_both_directions_then_clears() {
        let mut criteria = FilterCriteria::default();

        criteria.cycle_sort(SortKey::Product);
        assert_eq!(
            criteria.sort,
            Some(SortOrder { key: SortKey::Product, direction: SortDirection::Ascending })
        );
        criteria.cycle_sort(SortKey::Product);
        assert_eq!(
            criteria.sort,
            Some(SortOrder { key: SortKey::Product, direction: SortDirection::Descending })
        );
        criteria.cycle_sort(SortKey::Product);
        assert_eq!(criteria.sort, None);
    }

    #[test]
    fn switching_sort_key_restarts_ascending() {
        let mut criteria = FilterCriteria::default();
        criteria.cycle_sort(SortKey::Id);
        criteria.cycle_sort(SortKey::Id);
        criteria.cycle_sort(SortKey::User);

        assert_eq!(
            criteria.sort,
            Some(SortOrder { key: SortKey::User, direction: SortDirection::Ascending })
        );
    }

    #[test]
    fn toggling_a_category_twice_removes_it() {
        let mut criteria = FilterCriteria::default();
        criteria.toggle_category(CategoryId(3));
        assert!(criteria.categories.contains(&CategoryId(3)));

        criteria.toggle_category(CategoryId(3));
        assert!(criteria.is_default());
    }
}
