pub mod dataset;

use tracing::info;

use crate::domain::{
    category::{Category, CategoryId},
    product::{DenormalizedProduct, Product},
    user::{User, UserId},
};

use self::dataset::Dataset;

/// Resolves each product's category and that category's owner.
///
/// Lookups take the first record with a matching id. A product whose category
/// is missing gets neither category nor user; a category whose owner is
/// missing keeps the category. Product order is preserved.
pub fn join(users: &[User], categories: &[Category], products: &[Product]) -> Vec<DenormalizedProduct> {
    products
        .iter()
        .map(|product| {
            let category =
                categories.iter().find(|category| category.id == product.category_id).cloned();
            let user = category
                .as_ref()
                .and_then(|category| users.iter().find(|user| user.id == category.owner_id))
                .cloned();

            DenormalizedProduct { product: product.clone(), category, user }
        })
        .collect()
}

/// The static record sets plus their denormalized join, computed once.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<Product>,
    denormalized: Vec<DenormalizedProduct>,
}

impl Catalog {
    pub fn new(dataset: Dataset) -> Self {
        let Dataset { users, categories, products } = dataset;
        let denormalized = join(&users, &categories, &products);

        info!(
            event_name = "catalog.joined",
            products = denormalized.len(),
            unresolved_categories = denormalized.iter().filter(|row| row.category.is_none()).count(),
            unresolved_owners = denormalized
                .iter()
                .filter(|row| row.category.is_some() && row.user.is_none())
                .count(),
            "catalog joined"
        );

        Self { users, categories, products, denormalized }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn denormalized(&self) -> &[DenormalizedProduct] {
        &self.denormalized
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    pub fn category(&self, category_id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{dataset::Dataset, join, Catalog};
    use crate::domain::{
        category::{Category, CategoryId},
        product::{Product, ProductId},
        user::{Sex, User, UserId},
    };

    fn user(id: u32, name: &str, sex: Sex) -> User {
        User { id: UserId(id), name: name.to_owned(), sex }
    }

    fn category(id: u32, title: &str, owner: u32) -> Category {
        Category {
            id: CategoryId(id),
            title: title.to_owned(),
            icon: "🍎".to_owned(),
            owner_id: UserId(owner),
        }
    }

    fn product(id: u32, name: &str, category: u32) -> Product {
        Product { id: ProductId(id), name: name.to_owned(), category_id: CategoryId(category) }
    }

    #[test]
    fn join_resolves_category_and_category_owner() {
        let rows = join(
            &[user(1, "Max", Sex::Male)],
            &[category(10, "Fruits", 1)],
            &[product(100, "Banana", 10)],
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_title(), Some("Fruits"));
        assert_eq!(rows[0].user_name(), Some("Max"));
    }

    #[test]
    fn join_preserves_product_order_and_count() {
        let products =
            [product(3, "Cherry", 10), product(1, "Apple", 10), product(2, "Banana", 99)];
        let rows = join(&[user(1, "Max", Sex::Male)], &[category(10, "Fruits", 1)], &products);

        let ids: Vec<_> = rows.iter().map(|row| row.id()).collect();
        assert_eq!(ids, vec![ProductId(3), ProductId(1), ProductId(2)]);
    }

    #[test]
    fn missing_category_leaves_category_and_user_absent() {
        // user 100 exists so a lookup by product id would wrongly succeed
        let rows = join(
            &[user(100, "Ghost", Sex::Female)],
            &[category(10, "Fruits", 1)],
            &[product(100, "Banana", 11)],
        );

        assert!(rows[0].category.is_none());
        assert!(rows[0].user.is_none());
    }

    #[test]
    fn missing_owner_keeps_category() {
        let rows = join(
            &[user(2, "Anna", Sex::Female)],
            &[category(10, "Fruits", 1)],
            &[product(100, "Banana", 10)],
        );

        assert_eq!(rows[0].category_title(), Some("Fruits"));
        assert!(rows[0].user.is_none());
    }

    #[test]
    fn duplicate_ids_resolve_to_first_record() {
        let rows = join(
            &[user(1, "Max", Sex::Male), user(1, "Maxine", Sex::Female)],
            &[category(10, "Fruits", 1), category(10, "Vegetables", 1)],
            &[product(100, "Banana", 10)],
        );

        assert_eq!(rows[0].category_title(), Some("Fruits"));
        assert_eq!(rows[0].user_name(), Some("Max"));
    }

    #[test]
    fn join_is_idempotent() {
        let users = [user(1, "Max", Sex::Male)];
        let categories = [category(10, "Fruits", 1)];
        let products = [product(100, "Banana", 10), product(101, "Kiwi", 12)];

        assert_eq!(
            join(&users, &categories, &products),
            join(&users, &categories, &products)
        );
    }

    #[test]
    fn catalog_exposes_lookups_over_embedded_dataset() {
        let catalog = Catalog::new(Dataset::embedded().expect("embedded dataset"));

        assert_eq!(catalog.denormalized().len(), catalog.products().len());
        assert_eq!(catalog.user(UserId(2)).map(|user| user.name.as_str()), Some("Anna"));
        assert_eq!(
            catalog.category(CategoryId(5)).map(|category| category.title.as_str()),
            Some("Clothes")
        );
    }
}
