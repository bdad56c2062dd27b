use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::TenantContext;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{compare_values, field, DocumentStore, Query, SortDirection};

struct Stored {
    seq: u64,
    doc: Value,
}

#[derive(Default)]
struct Collections {
    next_seq: u64,
    by_key: HashMap<(String, String), HashMap<String, Stored>>,
}

/// Process-local document store.
///
/// Ties in the requested ordering fall back to insertion order, so
/// "newest first" stays stable when timestamps collide.
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tenant: &TenantContext, collection: &str) -> (String, String) {
        (tenant.tenant_id.as_str().to_string(), collection.to_string())
    }
}

fn with_id(doc: Value, id: &str) -> Value {
    let mut obj = doc.as_object().cloned().unwrap_or_default();
    obj.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(obj)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, tenant: &TenantContext, collection: &str, doc: Value) -> Result<Value> {
        let id = Uuid::new_v4().simple().to_string();
        let doc = with_id(doc, &id);

        let mut inner = self.inner.write().await;
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner
            .by_key
            .entry(Self::key(tenant, collection))
            .or_default()
            .insert(id, Stored { seq, doc: doc.clone() });

        Ok(doc)
    }

    async fn get(&self, tenant: &TenantContext, collection: &str, id: &str) -> Result<Option<Value>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_key
            .get(&Self::key(tenant, collection))
            .and_then(|docs| docs.get(id))
            .map(|s| s.doc.clone()))
    }

    async fn query(&self, tenant: &TenantContext, collection: &str, query: &Query) -> Result<Vec<Value>> {
        let inner = self.inner.read().await;
        let Some(docs) = inner.by_key.get(&Self::key(tenant, collection)) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<&Stored> = docs.values().filter(|s| query.matches(&s.doc)).collect();
        hits.sort_by_key(|s| s.seq);

        if let Some((path, direction)) = query.ordering() {
            hits.sort_by(|a, b| {
                compare_values(field(&a.doc, path), field(&b.doc, path)).then(a.seq.cmp(&b.seq))
            });
            if direction == SortDirection::Desc {
                hits.reverse();
            }
        }

        let limit = query.max_results().unwrap_or(usize::MAX);
        Ok(hits.into_iter().take(limit).map(|s| s.doc.clone()).collect())
    }

    async fn replace(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        doc: Value,
    ) -> Result<Option<Value>> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner
            .by_key
            .get_mut(&Self::key(tenant, collection))
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(None);
        };

        stored.doc = with_id(doc, id);
        Ok(Some(stored.doc.clone()))
    }

    async fn delete(&self, tenant: &TenantContext, collection: &str, id: &str) -> Result<Option<Value>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .by_key
            .get_mut(&Self::key(tenant, collection))
            .and_then(|docs| docs.remove(id))
            .map(|s| s.doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_ids_and_partitions_by_tenant() {
        let store = MemoryDocumentStore::new();
        let acme = TenantContext::new("acme");
        let other = TenantContext::new("other");

        let doc = store.insert(&acme, "products", json!({"name": "Tractor"})).await.unwrap();
        let id = doc["id"].as_str().unwrap().to_string();

        assert!(store.get(&acme, "products", &id).await.unwrap().is_some());
        assert!(store.get(&other, "products", &id).await.unwrap().is_none());
        assert!(store.get(&acme, "purchase_requests", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn descending_order_breaks_ties_newest_first() {
        let store = MemoryDocumentStore::new();
        let t = TenantContext::default();
        for name in ["a", "b", "c"] {
            store
                .insert(&t, "products", json!({"name": name, "createdAt": "2024-01-01T00:00:00Z"}))
                .await
                .unwrap();
        }
        store
            .insert(&t, "products", json!({"name": "old", "createdAt": "2023-01-01T00:00:00Z"}))
            .await
            .unwrap();

        let q = Query::new().order_by("createdAt", SortDirection::Desc);
        let names: Vec<String> = store
            .query(&t, "products", &q)
            .await
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["c", "b", "a", "old"]);

        let limited = store.query(&t, "products", &q.limit(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn replace_keeps_the_id_and_delete_returns_the_document() {
        let store = MemoryDocumentStore::new();
        let t = TenantContext::default();
        let doc = store.insert(&t, "products", json!({"name": "x"})).await.unwrap();
        let id = doc["id"].as_str().unwrap();

        let replaced = store
            .replace(&t, "products", id, json!({"name": "y", "id": "ignored"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced["id"], json!(id));
        assert_eq!(replaced["name"], "y");

        assert!(store.replace(&t, "products", "nope", json!({})).await.unwrap().is_none());
        assert_eq!(store.delete(&t, "products", id).await.unwrap().unwrap()["name"], "y");
        assert!(store.delete(&t, "products", id).await.unwrap().is_none());
    }
}
