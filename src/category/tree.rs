//! Indexes categories as roots and children for rendering in tree order.

use std::collections::HashMap;

use crate::category::{Category, CategoryId, UNCATEGORIZED_LABEL};

/// The category tree built once per request from the flat category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    roots: Vec<Category>,
    children: HashMap<CategoryId, Vec<Category>>,
}

/// A category in tree order along with whether it is a root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTreeRow<'a> {
    pub category: &'a Category,
    pub is_root: bool,
}

impl CategoryTree {
    /// Build the tree, keeping the order of `categories` within roots and within each parent's children.
    ///
    /// A subcategory whose parent is missing is treated as a root so it is never hidden.
    pub fn new(categories: Vec<Category>) -> Self {
        let root_ids: Vec<CategoryId> = categories
            .iter()
            .filter(|category| category.is_root())
            .map(|category| category.id)
            .collect();

        let mut roots = Vec::new();
        let mut children: HashMap<CategoryId, Vec<Category>> = HashMap::new();

        for category in categories {
            match category.parent_id {
                Some(parent_id) if root_ids.contains(&parent_id) => {
                    children.entry(parent_id).or_default().push(category);
                }
                _ => roots.push(category),
            }
        }

        Self { roots, children }
    }

    pub fn roots(&self) -> &[Category] {
        &self.roots
    }

    /// The subcategories of `parent_id`, empty if it has none.
    pub fn children(&self, parent_id: CategoryId) -> &[Category] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every category, each root followed by its children.
    pub fn rows(&self) -> impl Iterator<Item = CategoryTreeRow<'_>> {
        self.roots.iter().flat_map(|root| {
            std::iter::once(CategoryTreeRow {
                category: root,
                is_root: true,
            })
            .chain(self.children(root.id).iter().map(|child| CategoryTreeRow {
                category: child,
                is_root: false,
            }))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The display name of a category, "Parent: Child" for subcategories.
    pub fn label(&self, category_id: Option<CategoryId>) -> String {
        let Some(category_id) = category_id else {
            return UNCATEGORIZED_LABEL.to_owned();
        };

        for root in &self.roots {
            if root.id == category_id {
                return root.name.to_string();
            }

            if let Some(child) = self
                .children(root.id)
                .iter()
                .find(|child| child.id == category_id)
            {
                return format!("{}: {}", root.name, child.name);
            }
        }

        UNCATEGORIZED_LABEL.to_owned()
    }
}
