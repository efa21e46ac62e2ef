//! Top-level Elastigroup attributes

use spotform_core::field::{FieldCategory, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};

use super::ElastigroupWrapper;
use crate::scalar::{ScalarField, register_all};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const DESIRED_CAPACITY: &str = "desired_capacity";

type Scalar = ScalarField<ElastigroupWrapper>;

fn table() -> Vec<Scalar> {
    vec![
        Scalar::new(
            FieldCategory::Elastigroup,
            AttributeSchema::new(NAME, AttributeType::String)
                .required()
                .with_description("Group name"),
            |w| Some(Value::String(w.group()?.name.value()?.clone())),
            |w, v| {
                w.group_mut().set_name(v.and_then(Value::try_as));
            },
        ),
        Scalar::new(
            FieldCategory::Elastigroup,
            AttributeSchema::new(DESCRIPTION, AttributeType::String),
            |w| Some(Value::String(w.group()?.description.value()?.clone())),
            |w, v| {
                w.group_mut().set_description(v.and_then(Value::try_as));
            },
        )
        .zero_as_absent(),
        Scalar::new(
            FieldCategory::Elastigroup,
            AttributeSchema::new(DESIRED_CAPACITY, AttributeType::Int)
                .with_description("Number of instances the group should run"),
            |w| Some(Value::Int(*w.group()?.capacity.value()?.target.value()?)),
            |w, v| {
                w.group_mut()
                    .capacity
                    .get_or_insert_default()
                    .set_target(v.and_then(Value::try_as));
            },
        ),
    ]
}

pub fn setup(fields: &mut FieldMap<ElastigroupWrapper>) -> FieldResult<()> {
    register_all(fields, table())
}
