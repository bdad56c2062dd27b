use serde::Serialize;
use serde_json::Value;

use crate::models::Product;
use crate::store::field;

pub const FEATURED_CATEGORY: &str = "Machines";
pub const FEATURED_COUNT: usize = 3;

/// Case-insensitive substring match over name, description and category.
///
/// A blank query matches everything; otherwise the query is matched as
/// typed, surrounding spaces included.
pub fn matches_search(haystacks: [&str; 4], query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

pub fn value_matches_search(doc: &Value, query: &str) -> bool {
    let text = |path: &str| field(doc, path).and_then(Value::as_str).unwrap_or_default();
    matches_search(
        [text("name"), text("description"), text("category.main"), text("category.sub")],
        query,
    )
}

impl Product {
    pub fn matches_search(&self, query: &str) -> bool {
        matches_search(
            [
                self.name.as_str(),
                self.description.as_str(),
                self.category.main.as_str(),
                self.category.sub.as_str(),
            ],
            query,
        )
    }
}

/// Carousel picks: the newest machines, or the newest products when no
/// machine is listed. `products` must already be newest first.
pub fn featured(products: &[Product]) -> Vec<Product> {
    let machines: Vec<Product> = products
        .iter()
        .filter(|p| p.category.main == FEATURED_CATEGORY)
        .take(FEATURED_COUNT)
        .cloned()
        .collect();

    if machines.is_empty() {
        products.iter().take(FEATURED_COUNT).cloned().collect()
    } else {
        machines
    }
}

/// Browse state for one request: the listing plus the shopper's filters.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    pub products: Vec<Product>,
    pub selected_category: Option<String>,
    pub search_query: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResult {
    pub headline: String,
    pub selected_category: Option<String>,
    pub search_query: String,
    pub total: usize,
    pub products: Vec<Product>,
}

impl CatalogView {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.selected_category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn visible(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| {
                self.selected_category
                    .as_deref()
                    .map_or(true, |c| p.category.main == c)
            })
            .filter(|p| p.matches_search(&self.search_query))
            .collect()
    }

    pub fn headline(&self, visible: usize) -> String {
        let query = &self.search_query;
        match &self.selected_category {
            Some(category) => format!("Showing {visible} {category} products"),
            None if !query.trim().is_empty() => format!("Found {visible} products matching \"{query}\""),
            None => format!("Find the best machinery and equipment in Ghana ({visible} products)"),
        }
    }

    pub fn into_result(self) -> BrowseResult {
        let products: Vec<Product> = self.visible().into_iter().cloned().collect();
        BrowseResult {
            headline: self.headline(products.len()),
            total: products.len(),
            selected_category: self.selected_category,
            search_query: self.search_query,
            products,
        }
    }
}
