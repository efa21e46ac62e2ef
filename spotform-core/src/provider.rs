//! Provider - Trait abstracting resource operations
//!
//! A Provider owns the field maps of its resource types and turns each
//! CRUD entry point into field iteration plus one API request.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::plan::Plan;
use crate::resource::{ResourceData, ResourceId};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn unknown_resource_type(resource_type: &str) -> Self {
        Self::new(format!("Unknown resource type: {}", resource_type))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Main Provider trait
///
/// Resource types are addressed by name (e.g. "spotinst_elastigroup_aws").
/// `data` carries the id, prior state and desired config of the resource;
/// every operation leaves the refreshed state in it.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "spotinst")
    fn name(&self) -> &'static str;

    /// Resource types this Provider can handle
    fn resource_types(&self) -> Vec<&'static str>;

    /// Schema of a resource type
    fn schema(&self, resource_type: &str) -> Option<Arc<ResourceSchema>>;

    /// Compute the request a create or update would send, without sending it
    fn plan(&self, resource_type: &str, data: &mut ResourceData) -> ProviderResult<Plan>;

    /// Write an API object into state as a read would
    fn flatten(
        &self,
        resource_type: &str,
        object: serde_json::Value,
        data: &mut ResourceData,
    ) -> ProviderResult<()>;

    /// Refresh state; clears the id when the object no longer exists
    fn read<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Create the resource and record its id
    fn create<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Send changed attributes of an existing resource
    fn update<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Delete the resource and clear its id
    fn delete<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Value;
    use crate::schema::{AttributeSchema, AttributeType};

    // Mock Provider for testing
    struct MockProvider {
        schema: Arc<ResourceSchema>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                schema: Arc::new(
                    ResourceSchema::new("mock_group")
                        .attribute(AttributeSchema::new("name", AttributeType::String)),
                ),
            }
        }
    }

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<&'static str> {
            vec!["mock_group"]
        }

        fn schema(&self, resource_type: &str) -> Option<Arc<ResourceSchema>> {
            (resource_type == "mock_group").then(|| self.schema.clone())
        }

        fn plan(&self, resource_type: &str, data: &mut ResourceData) -> ProviderResult<Plan> {
            match data.id() {
                Some(id) => Ok(Plan::no_change(resource_type, id)),
                None => Ok(Plan::create(resource_type, serde_json::json!({}))),
            }
        }

        fn flatten(
            &self,
            _resource_type: &str,
            object: serde_json::Value,
            data: &mut ResourceData,
        ) -> ProviderResult<()> {
            let name = object["name"].as_str().unwrap_or_default().to_string();
            data.set("name", Value::String(name))
                .map_err(|e| ProviderError::new("failed to set name").with_cause(e))
        }

        fn read<'a>(
            &'a self,
            _resource_type: &'a str,
            data: &'a mut ResourceData,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.set_id(None);
                Ok(())
            })
        }

        fn create<'a>(
            &'a self,
            _resource_type: &'a str,
            data: &'a mut ResourceData,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.set_id(Some("mock-id-123".to_string()));
                Ok(())
            })
        }

        fn update<'a>(
            &'a self,
            _resource_type: &'a str,
            _data: &'a mut ResourceData,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn delete<'a>(
            &'a self,
            _resource_type: &'a str,
            data: &'a mut ResourceData,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.set_id(None);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn mock_provider_read_clears_missing_id() {
        let provider = MockProvider::new();
        let schema = provider.schema("mock_group").unwrap();
        let mut data = ResourceData::new(schema).with_id("gone");
        provider.read("mock_group", &mut data).await.unwrap();
        assert!(data.id().is_none());
    }

    #[tokio::test]
    async fn mock_provider_create_records_id() {
        let provider = MockProvider::new();
        let schema = provider.schema("mock_group").unwrap();
        let mut data = ResourceData::new(schema);
        provider.create("mock_group", &mut data).await.unwrap();
        assert_eq!(data.id(), Some("mock-id-123"));
    }

    #[test]
    fn provider_error_display_includes_resource() {
        let err = ProviderError::new("boom")
            .for_resource(ResourceId::new("spotinst_elastigroup_aws", "sig-1"));
        assert_eq!(err.to_string(), "[spotinst_elastigroup_aws.sig-1] boom");
    }
}
