use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::{category::CategoryId, product::DenormalizedProduct, user::UserId};
use crate::view::filters::{derive_visible, filter_by_owner, filter_by_query};
use crate::view::state::{FilterCriteria, RecomputePolicy, SortKey, ViewEvent, ViewTransition};

/// Owns the filter criteria and the visible subset for one view over a catalog.
pub struct FilterEngine<'a> {
    catalog: &'a Catalog,
    policy: RecomputePolicy,
    criteria: FilterCriteria,
    visible: Vec<DenormalizedProduct>,
}

impl<'a> FilterEngine<'a> {
    pub fn new(catalog: &'a Catalog, policy: RecomputePolicy) -> Self {
        Self {
            catalog,
            policy,
            criteria: FilterCriteria::default(),
            visible: catalog.denormalized().to_vec(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn policy(&self) -> RecomputePolicy {
        self.policy
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selected_owner(&self) -> Option<UserId> {
        self.criteria.owner
    }

    pub fn query(&self) -> &str {
        &self.criteria.query
    }

    pub fn visible(&self) -> &[DenormalizedProduct] {
        &self.visible
    }

    pub fn apply(&mut self, event: ViewEvent) -> ViewTransition {
        let visible_before = self.visible.len();
        let criteria_before = self.criteria.clone();

        match self.policy {
            RecomputePolicy::Pure => self.apply_pure(&event),
            RecomputePolicy::Chained => self.apply_chained(&event),
        }

        let transition = ViewTransition {
            event,
            visible_before,
            visible_after: self.visible.len(),
            criteria_changed: self.criteria != criteria_before,
        };

        debug!(
            event_name = "view.transition_applied",
            policy = ?self.policy,
            event = ?transition.event,
            visible_before = transition.visible_before,
            visible_after = transition.visible_after,
            criteria_changed = transition.criteria_changed,
            "view transition applied"
        );

        transition
    }

    pub fn filter_by_owner(&mut self, owner: Option<UserId>) -> ViewTransition {
        self.apply(ViewEvent::SelectOwner(owner))
    }

    pub fn filter_by_query(&mut self, query: impl Into<String>) -> ViewTransition {
        self.apply(ViewEvent::SetQuery(query.into()))
    }

    pub fn clear_query(&mut self) -> ViewTransition {
        self.apply(ViewEvent::ClearQuery)
    }

    pub fn toggle_category(&mut self, category_id: CategoryId) -> ViewTransition {
        self.apply(ViewEvent::ToggleCategory(category_id))
    }

    pub fn clear_categories(&mut self) -> ViewTransition {
        self.apply(ViewEvent::ClearCategories)
    }

    pub fn sort_by(&mut self, key: SortKey) -> ViewTransition {
        self.apply(ViewEvent::SortBy(key))
    }

    pub fn reset_all(&mut self) -> ViewTransition {
        self.apply(ViewEvent::ResetAll)
    }

    fn apply_pure(&mut self, event: &ViewEvent) {
        match event {
            ViewEvent::SelectOwner(owner) => self.criteria.owner = *owner,
            ViewEvent::SetQuery(query) => self.criteria.query.clone_from(query),
            ViewEvent::ClearQuery => self.criteria.query.clear(),
            ViewEvent::ToggleCategory(category_id) => self.criteria.toggle_category(*category_id),
            ViewEvent::ClearCategories => self.criteria.categories.clear(),
            ViewEvent::SortBy(key) => self.criteria.cycle_sort(*key),
            ViewEvent::ResetAll => self.criteria = FilterCriteria::default(),
        }
        self.visible = derive_visible(self.catalog.denormalized(), &self.criteria);
    }

    fn apply_chained(&mut self, event: &ViewEvent) {
        match event {
            ViewEvent::SelectOwner(owner) => {
                self.criteria.owner = *owner;
                let owned = filter_by_owner(self.catalog.denormalized(), *owner);
                self.visible = filter_by_query(&owned, &self.criteria.query);
            }
            ViewEvent::SetQuery(query) => {
                self.criteria.query.clone_from(query);
                self.visible = filter_by_query(&self.visible, query);
            }
            // resets the text only; the narrowed rows stay
            ViewEvent::ClearQuery => self.criteria.query.clear(),
            ViewEvent::ToggleCategory(_)
            | ViewEvent::ClearCategories
            | ViewEvent::SortBy(_)
            | ViewEvent::ResetAll => {
                debug!(
                    event_name = "view.event_inert",
                    event = ?event,
                    "event has no effect under chained recomputation"
                );
            }
        }
    }
}
