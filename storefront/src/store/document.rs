use std::cmp::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::TenantContext;
use serde_json::Value;

/// Structured-record storage, partitioned by tenant and collection.
///
/// Documents are JSON objects. The store owns the `id` field: `insert`
/// assigns it and `replace` keeps it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, tenant: &TenantContext, collection: &str, doc: Value) -> Result<Value>;

    async fn get(&self, tenant: &TenantContext, collection: &str, id: &str) -> Result<Option<Value>>;

    async fn query(&self, tenant: &TenantContext, collection: &str, query: &Query) -> Result<Vec<Value>>;

    /// Overwrites an existing document. `None` when `id` is unknown.
    async fn replace(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        doc: Value,
    ) -> Result<Option<Value>>;

    async fn delete(&self, tenant: &TenantContext, collection: &str, id: &str) -> Result<Option<Value>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Field equality filters, one ordering and an optional limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order: Option<(String, SortDirection)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `path` is dotted, e.g. `category.main`.
    pub fn where_eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((path.into(), value.into()));
        self
    }

    pub fn order_by(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some((path.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.filters
            .iter()
            .all(|(path, expected)| field(doc, path) == Some(expected))
    }

    pub fn ordering(&self) -> Option<(&str, SortDirection)> {
        self.order.as_ref().map(|(p, d)| (p.as_str(), *d))
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }
}

/// Looks up a dotted path inside a document.
pub fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.get(segment))
}

/// Total order over JSON scalars: null < bool < number < string < others.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let doc = json!({"category": {"main": "Machines", "sub": "Generators"}});
        assert_eq!(field(&doc, "category.sub"), Some(&json!("Generators")));
        assert_eq!(field(&doc, "category.missing"), None);
        assert_eq!(field(&doc, "price"), None);
    }

    #[test]
    fn where_eq_requires_every_filter() {
        let q = Query::new()
            .where_eq("category.main", "Machines")
            .where_eq("seller.verified", true);

        assert!(q.matches(&json!({"category": {"main": "Machines"}, "seller": {"verified": true}})));
        assert!(!q.matches(&json!({"category": {"main": "Machines"}, "seller": {"verified": false}})));
        assert!(!q.matches(&json!({"category": {"main": "Vehicles"}, "seller": {"verified": true}})));
    }

    #[test]
    fn values_compare_by_type_then_content() {
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(None, Some(&json!("a"))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(1)), Some(&json!("1"))), Ordering::Less);
    }
}
