use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    category::{Category, CategoryId},
    product::{Product, ProductId},
    user::{Sex, User, UserId},
};

/// The three static record sets the catalog is built from. Every set must be
/// present, and a misspelled key fails the parse instead of loading as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read dataset file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse dataset file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("could not parse embedded dataset: {0}")]
    ParseEmbedded(#[source] serde_json::Error),
}

impl Dataset {
    /// JSON fixture compiled into the binary, used when no dataset path is configured.
    pub const EMBEDDED: &'static str = include_str!("../../fixtures/catalog.json");

    pub fn embedded() -> Result<Self, DatasetError> {
        serde_json::from_str(Self::EMBEDDED).map_err(DatasetError::ParseEmbedded)
    }

    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| DatasetError::ReadFile { path: path.to_path_buf(), source })?;

        serde_json::from_str(&raw)
            .map_err(|source| DatasetError::ParseFile { path: path.to_path_buf(), source })
    }

    /// Loads the configured dataset (or the embedded one) and logs every
    /// integrity finding. Findings never fail the load.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        let (dataset, source) = match path {
            Some(path) => (Self::from_file(path)?, path.display().to_string()),
            None => (Self::embedded()?, "embedded".to_string()),
        };

        info!(
            event_name = "dataset.loaded",
            source = %source,
            users = dataset.users.len(),
            categories = dataset.categories.len(),
            products = dataset.products.len(),
            "catalog dataset loaded"
        );

        for finding in dataset.integrity().findings {
            warn!(event_name = "dataset.integrity_warning", finding = %finding, "dataset integrity");
        }

        Ok(dataset)
    }

    pub fn integrity(&self) -> IntegrityReport {
        let mut findings = Vec::new();

        findings.extend(
            duplicates(self.users.iter().map(|user| user.id))
                .into_iter()
                .map(IntegrityFinding::DuplicateUserId),
        );
        findings.extend(
            duplicates(self.categories.iter().map(|category| category.id))
                .into_iter()
                .map(IntegrityFinding::DuplicateCategoryId),
        );
        findings.extend(
            duplicates(self.products.iter().map(|product| product.id))
                .into_iter()
                .map(IntegrityFinding::DuplicateProductId),
        );

        for user in &self.users {
            if user.sex == Sex::Unrecognized {
                findings.push(IntegrityFinding::UnrecognizedSex(user.id));
            }
        }

        for category in &self.categories {
            if !self.users.iter().any(|user| user.id == category.owner_id) {
                findings.push(IntegrityFinding::UnknownCategoryOwner {
                    category: category.id,
                    owner: category.owner_id,
                });
            }
        }

        for product in &self.products {
            if !self.categories.iter().any(|category| category.id == product.category_id) {
                findings.push(IntegrityFinding::UnknownProductCategory {
                    product: product.id,
                    category: product.category_id,
                });
            }
        }

        IntegrityReport { findings }
    }
}

fn duplicates<T>(ids: impl Iterator<Item = T>) -> Vec<T>
where
    T: Ord + Copy,
{
    let mut seen = BTreeSet::new();
    let mut repeated = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            repeated.insert(id);
        }
    }
    repeated.into_iter().collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityFinding {
    DuplicateUserId(UserId),
    DuplicateCategoryId(CategoryId),
    DuplicateProductId(ProductId),
    UnrecognizedSex(UserId),
    UnknownCategoryOwner { category: CategoryId, owner: UserId },
    UnknownProductCategory { product: ProductId, category: CategoryId },
}

impl fmt::Display for IntegrityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateUserId(id) => {
                write!(f, "user id {id} is not unique; the first record wins")
            }
            Self::DuplicateCategoryId(id) => {
                write!(f, "category id {id} is not unique; the first record wins")
            }
            Self::DuplicateProductId(id) => write!(f, "product id {id} is not unique"),
            Self::UnrecognizedSex(id) => {
                write!(f, "user {id} has an unrecognized sex; their rows are not highlighted")
            }
            Self::UnknownCategoryOwner { category, owner } => {
                write!(f, "category {category} references unknown owner {owner}")
            }
            Self::UnknownProductCategory { product, category } => {
                write!(f, "product {product} references unknown category {category}")
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub findings: Vec<IntegrityFinding>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}
