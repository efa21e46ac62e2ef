//! Spotinst provider implementation
//!
//! Owns one [`ResourceHandler`] per resource type and the API client they
//! share.

use std::sync::Arc;

use log::debug;
use spotform_core::provider::{ProviderError, ProviderResult};
use spotform_sdk::client::ApiClient;
use spotform_sdk::service::elastigroup::aws::GROUP_PATH;
use spotform_sdk::service::ocean::aws::CLUSTER_PATH;

use crate::config::ProviderConfig;
use crate::crud::ResourceHandler;
use crate::elastigroup_aws::{self, ElastigroupWrapper};
use crate::ocean_aws::{self, OceanWrapper};

pub struct SpotinstProvider {
    config: ProviderConfig,
    client: Arc<dyn ApiClient>,
    pub(crate) elastigroup: ResourceHandler<ElastigroupWrapper>,
    pub(crate) ocean: ResourceHandler<OceanWrapper>,
}

impl SpotinstProvider {
    /// Validate the configuration and register every resource's fields
    pub fn new(config: ProviderConfig, client: Arc<dyn ApiClient>) -> ProviderResult<Self> {
        config.validate().map_err(|e| {
            ProviderError::new("invalid provider configuration").with_cause(e)
        })?;

        let setup_error =
            |e| ProviderError::new("failed to register resource fields").with_cause(e);
        let elastigroup = ResourceHandler::new(elastigroup_aws::setup().map_err(setup_error)?);
        let ocean = ResourceHandler::new(ocean_aws::setup().map_err(setup_error)?);
        debug!(
            "registered {} elastigroup and {} ocean fields",
            elastigroup.fields().len(),
            ocean.fields().len()
        );

        Ok(Self {
            config,
            client,
            elastigroup,
            ocean,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &dyn ApiClient {
        self.client.as_ref()
    }

    /// API collection path of a resource type
    pub fn path(resource_type: &str) -> Option<&'static str> {
        match resource_type {
            elastigroup_aws::RESOURCE_TYPE => Some(GROUP_PATH),
            ocean_aws::RESOURCE_TYPE => Some(CLUSTER_PATH),
            _ => None,
        }
    }

    /// Request URL of a resource, or of its collection when it has no id yet
    pub fn request_url(&self, resource_type: &str, id: Option<&str>) -> ProviderResult<String> {
        let path = Self::path(resource_type)
            .ok_or_else(|| ProviderError::unknown_resource_type(resource_type))?;
        Ok(self.config.request_url(path, id))
    }
}

impl std::fmt::Debug for SpotinstProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotinstProvider")
            .field("base_url", &self.config.base_url)
            .field("elastigroup", &self.elastigroup)
            .field("ocean", &self.ocean)
            .finish()
    }
}
