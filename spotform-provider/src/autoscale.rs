//! Autoscaler blocks shared by the Nomad and ECS integrations and Ocean

use spotform_core::field::{FieldError, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType, types};
use spotform_sdk::service::elastigroup::aws::{AutoScaleDown, AutoScaleHeadroom};

use crate::utils::{self, Attributes};

/// Marks an unset cooldown, headroom unit or down setting
pub const UNSET: i64 = -1;
pub const UNSET_PERCENTAGE: f64 = -1.0;

pub const AUTOSCALE_IS_ENABLED: &str = "autoscale_is_enabled";
pub const AUTOSCALE_IS_AUTO_CONFIG: &str = "autoscale_is_auto_config";
pub const AUTOSCALE_COOLDOWN: &str = "autoscale_cooldown";
pub const AUTOSCALE_HEADROOM: &str = "autoscale_headroom";
pub const AUTOSCALE_DOWN: &str = "autoscale_down";

pub const CPU_PER_UNIT: &str = "cpu_per_unit";
pub const GPU_PER_UNIT: &str = "gpu_per_unit";
pub const MEMORY_PER_UNIT: &str = "memory_per_unit";
pub const NUM_OF_UNITS: &str = "num_of_units";
pub const EVALUATION_PERIODS: &str = "evaluation_periods";
pub const MAX_SCALE_DOWN_PERCENTAGE: &str = "max_scale_down_percentage";

pub const KEY: &str = "key";
pub const VALUE: &str = "value";

pub fn unset_int(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::Int).with_default(Value::Int(UNSET))
}

pub fn cooldown_schema() -> AttributeSchema {
    unset_int(AUTOSCALE_COOLDOWN)
}

/// Ocean headroom also reserves GPUs
pub fn headroom_schema(with_gpu: bool) -> AttributeSchema {
    let mut attributes = vec![unset_int(CPU_PER_UNIT)];
    if with_gpu {
        attributes.push(unset_int(GPU_PER_UNIT));
    }
    attributes.push(unset_int(MEMORY_PER_UNIT));
    attributes.push(unset_int(NUM_OF_UNITS));
    AttributeSchema::new(AUTOSCALE_HEADROOM, AttributeType::block(attributes)).with_max_items(1)
}

/// Nomad only scales down by evaluation periods; ECS and Ocean also cap the percentage
pub fn down_schema(with_percentage: bool) -> AttributeSchema {
    let mut attributes = vec![unset_int(EVALUATION_PERIODS)];
    if with_percentage {
        attributes.push(
            AttributeSchema::new(MAX_SCALE_DOWN_PERCENTAGE, types::percentage())
                .with_default(Value::Float(UNSET_PERCENTAGE)),
        );
    }
    AttributeSchema::new(AUTOSCALE_DOWN, AttributeType::block(attributes)).with_max_items(1)
}

/// Set of `{key, value}` elements
pub fn key_value_schema(name: &str) -> AttributeSchema {
    AttributeSchema::new(
        name,
        AttributeType::block_set(vec![
            AttributeSchema::new(KEY, AttributeType::String).required(),
            AttributeSchema::new(VALUE, AttributeType::String).required(),
        ]),
    )
}

pub fn expand_headroom(m: &Attributes, nullify: bool) -> AutoScaleHeadroom {
    let mut headroom = AutoScaleHeadroom::default();
    utils::assign(
        &mut headroom.cpu_per_unit,
        utils::int_or_sentinel(m, CPU_PER_UNIT, UNSET),
        nullify,
    );
    utils::assign(
        &mut headroom.memory_per_unit,
        utils::int_or_sentinel(m, MEMORY_PER_UNIT, UNSET),
        nullify,
    );
    utils::assign(
        &mut headroom.num_of_units,
        utils::int_or_sentinel(m, NUM_OF_UNITS, UNSET),
        nullify,
    );
    headroom
}

pub fn flatten_headroom(headroom: &AutoScaleHeadroom) -> Value {
    Value::block(utils::block([
        (CPU_PER_UNIT, utils::int_value(&headroom.cpu_per_unit, UNSET)),
        (MEMORY_PER_UNIT, utils::int_value(&headroom.memory_per_unit, UNSET)),
        (NUM_OF_UNITS, utils::int_value(&headroom.num_of_units, UNSET)),
    ]))
}

pub fn expand_down(m: &Attributes, nullify: bool) -> AutoScaleDown {
    let mut down = AutoScaleDown::default();
    utils::assign(
        &mut down.evaluation_periods,
        utils::int_or_sentinel(m, EVALUATION_PERIODS, UNSET),
        nullify,
    );
    if m.contains_key(MAX_SCALE_DOWN_PERCENTAGE) {
        utils::assign(
            &mut down.max_scale_down_percentage,
            utils::float_or_sentinel(m, MAX_SCALE_DOWN_PERCENTAGE, UNSET_PERCENTAGE),
            nullify,
        );
    }
    down
}

pub fn flatten_down(down: &AutoScaleDown, with_percentage: bool) -> Value {
    let mut m = utils::block([(
        EVALUATION_PERIODS,
        utils::int_value(&down.evaluation_periods, UNSET),
    )]);
    if with_percentage {
        m.insert(
            MAX_SCALE_DOWN_PERCENTAGE.to_string(),
            utils::float_value(&down.max_scale_down_percentage, UNSET_PERCENTAGE),
        );
    }
    Value::block(m)
}

/// Expand `{key, value}` elements; both keys are required
pub fn expand_key_values<T>(
    m: &Attributes,
    name: &str,
    block: &'static str,
    build: impl Fn(String, String) -> T,
) -> FieldResult<Vec<T>> {
    utils::blocks(m, name)
        .map(|element| {
            let key = utils::string(element, KEY).ok_or_else(|| FieldError::missing(block, KEY))?;
            let value =
                utils::string(element, VALUE).ok_or_else(|| FieldError::missing(block, VALUE))?;
            Ok(build(key, value))
        })
        .collect()
}

pub fn flatten_key_values(pairs: impl Iterator<Item = (String, String)>) -> Value {
    Value::Set(
        pairs
            .map(|(key, value)| {
                Value::Map(utils::block([
                    (KEY, Value::String(key)),
                    (VALUE, Value::String(value)),
                ]))
            })
            .collect(),
    )
}
