//! Launch configuration attributes

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};
use spotform_sdk::service::elastigroup::aws::MetadataOptions;

use super::{ElastigroupWrapper, Field};
use crate::utils::{self, Attributes};

pub const METADATA_OPTIONS: &str = "metadata_options";
pub const HTTP_TOKENS: &str = "http_tokens";
pub const HTTP_PUT_RESPONSE_HOP_LIMIT: &str = "http_put_response_hop_limit";
pub const INSTANCE_METADATA_TAGS: &str = "instance_metadata_tags";

/// Marks an unset hop limit; any small value is a legal hop count
pub const UNSET_HOP_LIMIT: i64 = 1357997531;

/// Reported when the API omits the token requirement
const DEFAULT_HTTP_TOKENS: &str = "optional";

fn schema() -> AttributeSchema {
    AttributeSchema::new(
        METADATA_OPTIONS,
        AttributeType::block(vec![
            AttributeSchema::new(
                HTTP_TOKENS,
                AttributeType::Enum(vec!["optional".to_string(), "required".to_string()]),
            )
            .required(),
            AttributeSchema::new(HTTP_PUT_RESPONSE_HOP_LIMIT, AttributeType::Int)
                .with_default(Value::Int(UNSET_HOP_LIMIT)),
            AttributeSchema::new(INSTANCE_METADATA_TAGS, AttributeType::String)
                .with_description("\"enabled\" or \"disabled\""),
        ]),
    )
    .with_max_items(1)
}

pub fn setup(fields: &mut FieldMap<ElastigroupWrapper>) -> FieldResult<()> {
    fields.register(
        Field::new(FieldCategory::ElastigroupLaunchConfiguration, schema())
            .on_read(|w, d| {
                let value = w
                    .group()
                    .and_then(|g| g.compute.value())
                    .and_then(|c| c.launch_specification.value())
                    .and_then(|l| l.metadata_options.value())
                    .map(flatten)
                    .unwrap_or_else(|| Value::List(Vec::new()));
                d.set(METADATA_OPTIONS, value)
                    .map_err(|e| FieldError::write_back(METADATA_OPTIONS, e))
            })
            .on_create(|w, d| {
                if let Some(m) = d.get_ok(METADATA_OPTIONS).and_then(Value::first_block) {
                    let options = expand(m, false);
                    set_metadata_options(w, Some(options));
                }
                Ok(())
            })
            .on_update(|w, d| {
                let options = d
                    .get_ok(METADATA_OPTIONS)
                    .and_then(Value::first_block)
                    .map(|m| expand(m, true));
                set_metadata_options(w, options);
                Ok(())
            }),
    )
}

fn set_metadata_options(w: &mut ElastigroupWrapper, options: Option<MetadataOptions>) {
    w.group_mut()
        .compute
        .get_or_insert_default()
        .launch_specification
        .get_or_insert_default()
        .set_metadata_options(options);
}

pub fn expand(m: &Attributes, nullify: bool) -> MetadataOptions {
    let mut options = MetadataOptions::default();

    if let Some(v) = utils::string(m, HTTP_TOKENS) {
        options.set_http_tokens(Some(v));
    }
    utils::assign(
        &mut options.http_put_response_hop_limit,
        utils::int_or_sentinel(m, HTTP_PUT_RESPONSE_HOP_LIMIT, UNSET_HOP_LIMIT),
        nullify,
    );
    utils::assign(
        &mut options.instance_metadata_tags,
        utils::string(m, INSTANCE_METADATA_TAGS),
        nullify,
    );

    options
}

pub fn flatten(options: &MetadataOptions) -> Value {
    Value::block(utils::block([
        (
            HTTP_TOKENS,
            Value::String(options.http_tokens.value_or(DEFAULT_HTTP_TOKENS.to_string())),
        ),
        (
            HTTP_PUT_RESPONSE_HOP_LIMIT,
            utils::int_value(&options.http_put_response_hop_limit, UNSET_HOP_LIMIT),
        ),
        (
            INSTANCE_METADATA_TAGS,
            utils::string_value(&options.instance_metadata_tags),
        ),
    ]))
}
