//! Top-level Ocean cluster attributes

use spotform_core::field::{FieldCategory, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};

use super::OceanWrapper;
use crate::scalar::{ScalarField, register_all};

pub const NAME: &str = "name";
pub const CONTROLLER_ID: &str = "controller_id";
pub const REGION: &str = "region";

type Scalar = ScalarField<OceanWrapper>;

fn table() -> Vec<Scalar> {
    vec![
        Scalar::new(
            FieldCategory::Ocean,
            AttributeSchema::new(NAME, AttributeType::String).required(),
            |w| Some(Value::String(w.cluster()?.name.value()?.clone())),
            |w, v| {
                w.cluster_mut().set_name(v.and_then(Value::try_as));
            },
        ),
        Scalar::new(
            FieldCategory::Ocean,
            AttributeSchema::new(CONTROLLER_ID, AttributeType::String)
                .required()
                .with_description("Identifier the cluster controller reports with"),
            |w| {
                Some(Value::String(
                    w.cluster()?.controller_cluster_id.value()?.clone(),
                ))
            },
            |w, v| {
                w.cluster_mut()
                    .set_controller_cluster_id(v.and_then(Value::try_as));
            },
        ),
        Scalar::new(
            FieldCategory::Ocean,
            AttributeSchema::new(REGION, AttributeType::String).required(),
            |w| Some(Value::String(w.cluster()?.region.value()?.clone())),
            |w, v| {
                w.cluster_mut().set_region(v.and_then(Value::try_as));
            },
        ),
    ]
}

pub fn setup(fields: &mut FieldMap<OceanWrapper>) -> FieldResult<()> {
    register_all(fields, table())
}
