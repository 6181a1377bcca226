use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::RepoErr;
use crate::utils::now_ms;

/// Which schemaless collection a route serves, and the field holding its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Vendors,
    DeliveryPartners,
    Tenants,
}

impl CollectionKind {
    pub fn id_field(self) -> &'static str {
        match self {
            Self::Vendors => "vendor_id",
            Self::DeliveryPartners => "partner_id",
            Self::Tenants => "tenant_id",
        }
    }
}

/// Insertion-ordered JSON documents per collection.
#[derive(Clone, Default)]
pub struct InMemoryCollections {
    inner: Arc<RwLock<HashMap<CollectionKind, Vec<Map<String, Value>>>>>,
}

fn matches_search(doc: &Map<String, Value>, needle: &str) -> bool {
    doc.get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.to_lowercase().contains(needle))
}

fn matches_filters(doc: &Map<String, Value>, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(key, expected)| match doc.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

impl InMemoryCollections {
    pub async fn create(
        &self,
        kind: CollectionKind,
        body: Map<String, Value>,
    ) -> Result<Map<String, Value>, RepoErr> {
        if !body.get("name").is_some_and(Value::is_string) {
            return Err(RepoErr::Invalid("name is required".into()));
        }
        let mut doc = body;
        doc.insert(kind.id_field().into(), Value::String(Uuid::new_v4().to_string()));
        doc.insert("created_at".into(), Value::from(now_ms()));
        let mut map = self.inner.write().await;
        map.entry(kind).or_default().push(doc.clone());
        Ok(doc)
    }

    pub async fn get(&self, kind: CollectionKind, id: &str) -> Result<Map<String, Value>, RepoErr> {
        let map = self.inner.read().await;
        map.get(&kind)
            .and_then(|docs| {
                docs.iter()
                    .find(|d| d.get(kind.id_field()).and_then(Value::as_str) == Some(id))
            })
            .cloned()
            .ok_or(RepoErr::NotFound)
    }

    pub async fn list(
        &self,
        kind: CollectionKind,
        filters: &[(String, String)],
        search: Option<&str>,
        skip: usize,
        limit: Option<usize>,
    ) -> (Vec<Map<String, Value>>, u64) {
        let needle = search.filter(|s| !s.is_empty()).map(str::to_lowercase);
        let map = self.inner.read().await;
        let matching: Vec<&Map<String, Value>> = map
            .get(&kind)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_filters(d, filters))
                    .filter(|d| needle.as_deref().map_or(true, |n| matches_search(d, n)))
                    .collect()
            })
            .unwrap_or_default();
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        (page, total)
    }

    /// Full replace; the id and creation time survive.
    pub async fn replace(
        &self,
        kind: CollectionKind,
        id: &str,
        body: Map<String, Value>,
    ) -> Result<Map<String, Value>, RepoErr> {
        let mut map = self.inner.write().await;
        let doc = map
            .get_mut(&kind)
            .and_then(|docs| {
                docs.iter_mut()
                    .find(|d| d.get(kind.id_field()).and_then(Value::as_str) == Some(id))
            })
            .ok_or(RepoErr::NotFound)?;
        let created_at = doc.get("created_at").cloned();
        *doc = body;
        doc.insert(kind.id_field().into(), Value::String(id.to_string()));
        if let Some(created_at) = created_at {
            doc.insert("created_at".into(), created_at);
        }
        Ok(doc.clone())
    }

    pub async fn delete(&self, kind: CollectionKind, id: &str) -> Result<(), RepoErr> {
        let mut map = self.inner.write().await;
        let docs = map.get_mut(&kind).ok_or(RepoErr::NotFound)?;
        let pos = docs
            .iter()
            .position(|d| d.get(kind.id_field()).and_then(Value::as_str) == Some(id))
            .ok_or(RepoErr::NotFound)?;
        docs.remove(pos);
        Ok(())
    }
}
