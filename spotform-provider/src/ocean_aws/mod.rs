//! spotinst_ocean_aws resource

pub mod auto_scaler;
pub mod base;

use spotform_core::field::{FieldMap, FieldResult, GenericField};
use spotform_sdk::service::ocean::aws::{CLUSTER_PATH, Cluster};

use crate::crud::ResourceWrapper;

pub const RESOURCE_TYPE: &str = "spotinst_ocean_aws";

type Field = GenericField<OceanWrapper>;

#[derive(Debug, Default)]
pub struct OceanWrapper {
    cluster: Option<Cluster>,
}

impl OceanWrapper {
    pub fn cluster(&self) -> Option<&Cluster> {
        self.cluster.as_ref()
    }

    pub fn cluster_mut(&mut self) -> &mut Cluster {
        self.cluster.get_or_insert_with(Cluster::default)
    }
}

impl ResourceWrapper for OceanWrapper {
    type Object = Cluster;
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;
    const PATH: &'static str = CLUSTER_PATH;

    fn object(&self) -> Option<&Cluster> {
        self.cluster()
    }

    fn set_object(&mut self, object: Cluster) {
        self.cluster = Some(object);
    }

    fn object_id(object: &Cluster) -> Option<String> {
        object.id.value().cloned()
    }
}

pub fn setup() -> FieldResult<FieldMap<OceanWrapper>> {
    let mut fields = FieldMap::new(RESOURCE_TYPE);
    base::setup(&mut fields)?;
    auto_scaler::setup(&mut fields)?;
    Ok(fields)
}
