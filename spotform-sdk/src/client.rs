//! API client abstraction
//!
//! Request bodies are sparse JSON documents produced by
//! [`marshal_json`](crate::jsonutil::marshal_json). Responses are full
//! object documents that callers decode into their API objects.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::jsonutil::{EncodeError, merge_patch};

/// Return type for async client operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{path}/{id} not found")]
    NotFound { path: String, id: String },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Transport for Spotinst API objects, addressed by collection path and id
pub trait ApiClient: Send + Sync {
    /// Create an object and return it as stored (with its new `id`)
    fn create<'a>(
        &'a self,
        path: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, ClientResult<serde_json::Value>>;

    /// Fetch an object; `None` when it does not exist
    fn read<'a>(
        &'a self,
        path: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, ClientResult<Option<serde_json::Value>>>;

    /// Apply a sparse update and return the object as stored
    fn update<'a>(
        &'a self,
        path: &'a str,
        id: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, ClientResult<serde_json::Value>>;

    fn delete<'a>(&'a self, path: &'a str, id: &'a str) -> BoxFuture<'a, ClientResult<()>>;
}

/// In-process client that stores objects in memory.
///
/// Updates are applied as JSON merge patches, so an omitted key keeps its
/// stored value and `null` removes it.
#[derive(Debug, Default)]
pub struct MemoryClient {
    objects: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    /// Store an object directly, bypassing `create`
    pub async fn insert(&self, path: &str, id: &str, mut object: serde_json::Value) {
        if let serde_json::Value::Object(map) = &mut object {
            map.insert("id".to_string(), serde_json::Value::String(id.to_string()));
        }
        self.objects.lock().await.insert(key(path, id), object);
    }
}

fn key(path: &str, id: &str) -> String {
    format!("{}/{}", path, id)
}

/// Id prefix per collection, e.g. "sig-" for groups
fn id_prefix(path: &str) -> &'static str {
    if path.starts_with("/ocean") {
        "o-"
    } else if path.contains("group") {
        "sig-"
    } else {
        "id-"
    }
}

fn new_id(path: &str) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", id_prefix(path), &uuid[..8])
}

impl ApiClient for MemoryClient {
    fn create<'a>(
        &'a self,
        path: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, ClientResult<serde_json::Value>> {
        Box::pin(async move {
            if !body.is_object() {
                return Err(ClientError::InvalidBody(body.to_string()));
            }
            let id = new_id(path);
            let mut object = serde_json::json!({ "id": id });
            merge_patch(&mut object, &body);
            // A create body cannot override the assigned id.
            if let serde_json::Value::Object(map) = &mut object {
                map.insert("id".to_string(), serde_json::Value::String(id.clone()));
            }

            info!("created {}/{}", path, id);
            debug!("stored object: {}", object);
            self.objects
                .lock()
                .await
                .insert(key(path, &id), object.clone());
            Ok(object)
        })
    }

    fn read<'a>(
        &'a self,
        path: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, ClientResult<Option<serde_json::Value>>> {
        Box::pin(async move { Ok(self.objects.lock().await.get(&key(path, id)).cloned()) })
    }

    fn update<'a>(
        &'a self,
        path: &'a str,
        id: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, ClientResult<serde_json::Value>> {
        Box::pin(async move {
            if !body.is_object() {
                return Err(ClientError::InvalidBody(body.to_string()));
            }
            let mut objects = self.objects.lock().await;
            let object = objects
                .get_mut(&key(path, id))
                .ok_or_else(|| ClientError::NotFound {
                    path: path.to_string(),
                    id: id.to_string(),
                })?;

            debug!("patch for {}/{}: {}", path, id, body);
            merge_patch(object, &body);
            if let serde_json::Value::Object(map) = &mut *object {
                map.insert("id".to_string(), serde_json::Value::String(id.to_string()));
            }
            info!("updated {}/{}", path, id);
            Ok(object.clone())
        })
    }

    fn delete<'a>(&'a self, path: &'a str, id: &'a str) -> BoxFuture<'a, ClientResult<()>> {
        Box::pin(async move {
            match self.objects.lock().await.remove(&key(path, id)) {
                Some(_) => {
                    info!("deleted {}/{}", path, id);
                    Ok(())
                }
                None => Err(ClientError::NotFound {
                    path: path.to_string(),
                    id: id.to_string(),
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PATH: &str = "/aws/ec2/group";

    #[tokio::test]
    async fn create_assigns_id_and_drops_nulls() {
        let client = MemoryClient::new();
        let created = client
            .create(PATH, json!({"name": "web", "description": null}))
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("sig-"));
        assert_eq!(created, json!({"id": id, "name": "web"}));
        assert_eq!(client.read(PATH, &id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let client = MemoryClient::new();
        client
            .insert(
                PATH,
                "sig-1",
                json!({"name": "web", "thirdPartiesIntegration": {"nomad": {"aclToken": "t", "masterHost": "h"}}}),
            )
            .await;

        let updated = client
            .update(
                PATH,
                "sig-1",
                json!({"thirdPartiesIntegration": {"nomad": {"aclToken": null}}}),
            )
            .await
            .unwrap();

        assert_eq!(
            updated,
            json!({"id": "sig-1", "name": "web", "thirdPartiesIntegration": {"nomad": {"masterHost": "h"}}})
        );
    }

    #[tokio::test]
    async fn missing_objects() {
        let client = MemoryClient::new();
        assert_eq!(client.read(PATH, "sig-x").await.unwrap(), None);
        assert!(matches!(
            client.update(PATH, "sig-x", json!({})).await,
            Err(ClientError::NotFound { .. })
        ));
        assert!(matches!(
            client.delete(PATH, "sig-x").await,
            Err(ClientError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let client = MemoryClient::new();
        let created = client.create("/ocean/aws/k8s/cluster", json!({"name": "c"})).await.unwrap();
        let id = created["id"].as_str().unwrap();
        assert!(id.starts_with("o-"));

        client.delete("/ocean/aws/k8s/cluster", id).await.unwrap();
        assert!(client.is_empty().await);
    }

    #[tokio::test]
    async fn rejects_non_object_body() {
        let client = MemoryClient::new();
        assert!(matches!(
            client.create(PATH, json!([1])).await,
            Err(ClientError::InvalidBody(_))
        ));
    }
}
