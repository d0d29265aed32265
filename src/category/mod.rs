//! The two-level category tree and the pages for managing it.

mod categories_page;
mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod inline_edit;
mod tree;

pub use categories_page::get_categories_page;
pub use create_endpoint::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, get_all_categories, get_category,
    rename_category,
};
pub use delete_endpoint::delete_category_endpoint;
pub use domain::{Category, CategoryFormData, CategoryId, CategoryName, UNCATEGORIZED_LABEL};
pub use inline_edit::{get_category_edit_row, get_category_row, rename_category_endpoint};
pub use tree::CategoryTree;
