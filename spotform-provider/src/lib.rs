//! Spotform Spotinst Provider
//!
//! Spotinst Elastigroup and Ocean resources on top of the field registry.
//!
//! ## Module Structure
//!
//! - `elastigroup_aws` / `ocean_aws` - Field groups of each resource type
//! - `autoscale` - Autoscaler blocks and sentinels shared by both resources
//! - `crud` - Generic handler driving a field map against the API
//! - `scalar` - Declarative table of top-level scalar fields
//! - `provider` - SpotinstProvider implementation
//! - `config` - Credentials and endpoint
//! - `utils` - Helpers for nested block values

pub mod autoscale;
pub mod config;
pub mod crud;
pub mod elastigroup_aws;
pub mod ocean_aws;
pub mod provider;
pub mod scalar;
pub mod utils;

pub use config::{ConfigError, ConfigOverrides, ProviderConfig};
pub use provider::SpotinstProvider;

use std::sync::Arc;

use spotform_core::plan::Plan;
use spotform_core::provider::{BoxFuture, Provider, ProviderError, ProviderResult};
use spotform_core::resource::ResourceData;
use spotform_core::schema::ResourceSchema;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for SpotinstProvider {
    fn name(&self) -> &'static str {
        "spotinst"
    }

    fn resource_types(&self) -> Vec<&'static str> {
        vec![elastigroup_aws::RESOURCE_TYPE, ocean_aws::RESOURCE_TYPE]
    }

    fn schema(&self, resource_type: &str) -> Option<Arc<ResourceSchema>> {
        match resource_type {
            elastigroup_aws::RESOURCE_TYPE => Some(self.elastigroup.schema()),
            ocean_aws::RESOURCE_TYPE => Some(self.ocean.schema()),
            _ => None,
        }
    }

    fn plan(&self, resource_type: &str, data: &mut ResourceData) -> ProviderResult<Plan> {
        match resource_type {
            elastigroup_aws::RESOURCE_TYPE => self.elastigroup.plan(data),
            ocean_aws::RESOURCE_TYPE => self.ocean.plan(data),
            _ => Err(ProviderError::unknown_resource_type(resource_type)),
        }
    }

    fn flatten(
        &self,
        resource_type: &str,
        object: serde_json::Value,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        match resource_type {
            elastigroup_aws::RESOURCE_TYPE => self.elastigroup.flatten(object, data),
            ocean_aws::RESOURCE_TYPE => self.ocean.flatten(object, data),
            _ => Err(ProviderError::unknown_resource_type(resource_type)),
        }
    }

    fn read<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            match resource_type {
                elastigroup_aws::RESOURCE_TYPE => self.elastigroup.read(self.client(), data).await,
                ocean_aws::RESOURCE_TYPE => self.ocean.read(self.client(), data).await,
                _ => Err(ProviderError::unknown_resource_type(resource_type)),
            }
        })
    }

    fn create<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            match resource_type {
                elastigroup_aws::RESOURCE_TYPE => {
                    self.elastigroup.create(self.client(), data).await
                }
                ocean_aws::RESOURCE_TYPE => self.ocean.create(self.client(), data).await,
                _ => Err(ProviderError::unknown_resource_type(resource_type)),
            }
        })
    }

    fn update<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            match resource_type {
                elastigroup_aws::RESOURCE_TYPE => {
                    self.elastigroup.update(self.client(), data).await
                }
                ocean_aws::RESOURCE_TYPE => self.ocean.update(self.client(), data).await,
                _ => Err(ProviderError::unknown_resource_type(resource_type)),
            }
        })
    }

    fn delete<'a>(
        &'a self,
        resource_type: &'a str,
        data: &'a mut ResourceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            match resource_type {
                elastigroup_aws::RESOURCE_TYPE => {
                    self.elastigroup.delete(self.client(), data).await
                }
                ocean_aws::RESOURCE_TYPE => self.ocean.delete(self.client(), data).await,
                _ => Err(ProviderError::unknown_resource_type(resource_type)),
            }
        })
    }
}
