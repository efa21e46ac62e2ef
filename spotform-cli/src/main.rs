use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{LevelFilter, debug};
use serde::Deserialize;

use spotform_core::plan::{Operation, Plan};
use spotform_core::provider::Provider;
use spotform_core::resource::{ResourceData, Value};
use spotform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use spotform_provider::{ConfigOverrides, ProviderConfig, SpotinstProvider};
use spotform_sdk::client::MemoryClient;

#[derive(Parser)]
#[command(name = "spotform")]
#[command(about = "Plan Spotinst Elastigroup and Ocean requests", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Spotinst account id (overrides SPOTINST_ACCOUNT)
    #[arg(long, global = true)]
    account: Option<String>,

    /// API endpoint (overrides SPOTINST_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the attribute schema of a resource type
    Schema {
        /// Resource type (e.g. elastigroup_aws)
        resource: String,
    },
    /// Validate a configuration file
    Validate {
        resource: String,
        /// Path to JSON configuration
        config: PathBuf,
    },
    /// Show the request a create or update would send
    Plan {
        resource: String,
        /// Path to JSON configuration
        config: PathBuf,

        /// Prior state, as printed by `flatten`; plans an update
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Flatten an API object into resource state
    Flatten {
        resource: String,
        /// Path to JSON API object
        object: PathBuf,
    },
}

/// Prior state of one resource
#[derive(Debug, Deserialize)]
struct StateFile {
    id: String,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_module_path(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let provider = build_provider(ConfigOverrides {
        token: None,
        account: cli.account,
        base_url: cli.base_url,
    })?;

    match cli.command {
        Commands::Schema { resource } => {
            let resource_type = resolve_resource_type(&provider, &resource)?;
            print!("{}", render_schema(&*schema_of(&provider, resource_type)?));
        }
        Commands::Validate { resource, config } => {
            let resource_type = resolve_resource_type(&provider, &resource)?;
            run_validate(&provider, resource_type, &config)?;
            println!("{} {} is valid", "✓".green(), config.display());
        }
        Commands::Plan {
            resource,
            config,
            state,
        } => {
            let resource_type = resolve_resource_type(&provider, &resource)?;
            let plan = build_plan(&provider, resource_type, &config, state.as_deref())?;
            print!("{}", render_plan(&provider, &plan)?);
        }
        Commands::Flatten { resource, object } => {
            let resource_type = resolve_resource_type(&provider, &resource)?;
            let state = flatten_object(&provider, resource_type, &object)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}

/// Requests are only planned here, so the provider never needs a live API
fn build_provider(overrides: ConfigOverrides) -> Result<SpotinstProvider> {
    let config = ProviderConfig::from_env().merge(overrides);
    SpotinstProvider::new(config, Arc::new(MemoryClient::new()))
        .context("failed to initialise provider")
}

/// Accept both `elastigroup_aws` and `spotinst_elastigroup_aws`
fn resolve_resource_type(provider: &SpotinstProvider, name: &str) -> Result<&'static str> {
    let full = if name.starts_with("spotinst_") {
        name.to_string()
    } else {
        format!("spotinst_{}", name)
    };
    provider
        .resource_types()
        .into_iter()
        .find(|t| *t == full)
        .with_context(|| {
            format!(
                "unknown resource '{}' (expected one of: {})",
                name,
                provider.resource_types().join(", ")
            )
        })
}

fn schema_of(provider: &SpotinstProvider, resource_type: &str) -> Result<Arc<ResourceSchema>> {
    provider
        .schema(resource_type)
        .with_context(|| format!("no schema for {}", resource_type))
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Typed and schema-checked configuration attributes
fn load_config(schema: &ResourceSchema, path: &Path) -> Result<HashMap<String, Value>> {
    let json = read_json(path)?;
    let attributes = schema
        .attributes_from_json(&json)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    if let Err(errors) = schema.validate(&attributes) {
        let messages: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        bail!(
            "invalid configuration in {}:\n{}",
            path.display(),
            messages.join("\n")
        );
    }
    Ok(attributes)
}

fn load_state(schema: &ResourceSchema, path: &Path) -> Result<(String, HashMap<String, Value>)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let state: StateFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    let attributes = schema
        .attributes_from_json(&serde_json::Value::Object(state.attributes))
        .with_context(|| format!("invalid state in {}", path.display()))?;
    Ok((state.id, attributes))
}

/// Schema checks, then a dry expansion so malformed nested blocks surface too
fn run_validate(provider: &SpotinstProvider, resource_type: &str, config: &Path) -> Result<()> {
    let schema = schema_of(provider, resource_type)?;
    let attributes = load_config(&schema, config)?;
    let mut data = ResourceData::new(schema).with_config(attributes);
    provider.plan(resource_type, &mut data)?;
    Ok(())
}

fn build_plan(
    provider: &SpotinstProvider,
    resource_type: &str,
    config: &Path,
    state: Option<&Path>,
) -> Result<Plan> {
    let schema = schema_of(provider, resource_type)?;
    let attributes = load_config(&schema, config)?;

    let mut data = ResourceData::new(schema.clone());
    if let Some(path) = state {
        let (id, prior) = load_state(&schema, path)?;
        debug!("planning update of {} from {}", id, path.display());
        data = data.with_id(id).with_state(prior);
    }
    let mut data = data.with_config(attributes);

    Ok(provider.plan(resource_type, &mut data)?)
}

fn flatten_object(
    provider: &SpotinstProvider,
    resource_type: &str,
    path: &Path,
) -> Result<serde_json::Value> {
    let schema = schema_of(provider, resource_type)?;
    let object = read_json(path)?;
    let mut data = ResourceData::new(schema);
    provider.flatten(resource_type, object, &mut data)?;

    let attributes: serde_json::Map<String, serde_json::Value> = data
        .state()
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    Ok(serde_json::json!({
        "id": data.id(),
        "attributes": attributes,
    }))
}

fn render_plan(provider: &SpotinstProvider, plan: &Plan) -> Result<String> {
    let mut out = String::new();
    let (method, url) = match &plan.operation {
        Operation::Create => {
            out.push_str(&format!(
                "{} {}\n",
                "+".green().bold(),
                plan.resource_type.cyan().bold()
            ));
            ("POST", provider.request_url(&plan.resource_type, None)?)
        }
        Operation::Update { id } => {
            out.push_str(&format!(
                "{} {} {}\n",
                "~".yellow().bold(),
                plan.resource_type.cyan().bold(),
                id
            ));
            ("PUT", provider.request_url(&plan.resource_type, Some(id))?)
        }
        Operation::NoChange { id } => {
            out.push_str(&format!(
                "{}\n",
                format!("No changes. {} {} is up-to-date.", plan.resource_type, id).green()
            ));
            return Ok(out);
        }
    };

    out.push_str(&format!("  {} {}\n", method.bold(), url));
    if let Some(body) = &plan.body {
        for line in serde_json::to_string_pretty(body)?.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    let cleared = plan.cleared_paths();
    if !cleared.is_empty() {
        out.push_str(&format!("  {}\n", "Cleared:".red().bold()));
        for path in cleared {
            out.push_str(&format!("    {} {}\n", "-".red(), path));
        }
    }
    Ok(out)
}

fn render_schema(schema: &ResourceSchema) -> String {
    let mut out = format!("{}\n", schema.resource_type.cyan().bold());
    let mut attributes: Vec<&AttributeSchema> = schema.attributes.values().collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    for attr in attributes {
        render_attribute(attr, 1, &mut out);
    }
    out
}

fn render_attribute(attr: &AttributeSchema, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{}{}: {}", indent, attr.name.bold(), attr.attr_type.type_name());
    if attr.required {
        line.push_str(&format!(" {}", "(required)".yellow()));
    }
    if let Some(default) = &attr.default {
        line.push_str(&format!(" [default: {}]", default.to_json()));
    }
    if let Some(max) = attr.max_items {
        line.push_str(&format!(" [max {}]", max));
    }
    out.push_str(&line);
    out.push('\n');

    if let Some(desc) = &attr.description {
        out.push_str(&format!("{}  {}\n", indent, desc.dimmed()));
    }

    if let Some(nested) = block_attributes(&attr.attr_type) {
        let mut nested: Vec<&AttributeSchema> = nested.iter().collect();
        nested.sort_by(|a, b| a.name.cmp(&b.name));
        for child in nested {
            render_attribute(child, depth + 1, out);
        }
    }
}

fn block_attributes(attr_type: &AttributeType) -> Option<&[AttributeSchema]> {
    match attr_type {
        AttributeType::List(inner) | AttributeType::Set(inner) => match inner.as_ref() {
            AttributeType::Block(attributes) => Some(attributes),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn provider() -> SpotinstProvider {
        SpotinstProvider::new(ProviderConfig::default(), Arc::new(MemoryClient::new())).unwrap()
    }

    fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    #[test]
    fn resolves_short_and_full_names() {
        let provider = provider();
        assert_eq!(
            resolve_resource_type(&provider, "elastigroup_aws").unwrap(),
            "spotinst_elastigroup_aws"
        );
        assert_eq!(
            resolve_resource_type(&provider, "spotinst_ocean_aws").unwrap(),
            "spotinst_ocean_aws"
        );
        let err = resolve_resource_type(&provider, "mrscaler_aws").unwrap_err();
        assert!(err.to_string().contains("unknown resource 'mrscaler_aws'"));
    }

    #[test]
    fn validate_reports_schema_errors() {
        let dir = tempdir().unwrap();
        let provider = provider();
        let rt = "spotinst_elastigroup_aws";

        let good = write_json(dir.path(), "good.json", json!({"name": "web"}));
        run_validate(&provider, rt, &good).unwrap();

        let bad = write_json(dir.path(), "bad.json", json!({"name": "web", "size": 3}));
        let err = run_validate(&provider, rt, &bad).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown attribute 'size'"));

        let missing = write_json(dir.path(), "missing.json", json!({"description": "x"}));
        let err = run_validate(&provider, rt, &missing).unwrap_err();
        assert!(err.to_string().contains("Required attribute 'name' is missing"));
    }

    #[test]
    fn plan_create_renders_request() {
        let dir = tempdir().unwrap();
        let provider = provider();
        let config = write_json(
            dir.path(),
            "config.json",
            json!({"name": "web", "desired_capacity": 2}),
        );

        let plan = build_plan(&provider, "spotinst_elastigroup_aws", &config, None).unwrap();
        assert_eq!(plan.operation, Operation::Create);
        assert_eq!(
            plan.body,
            Some(json!({"name": "web", "capacity": {"target": 2}}))
        );

        let rendered = render_plan(&provider, &plan).unwrap();
        assert!(rendered.contains("https://api.spotinst.io/aws/ec2/group"));
        assert!(rendered.contains("\"target\": 2"));
    }

    #[test]
    fn plan_update_lists_cleared_paths() {
        let dir = tempdir().unwrap();
        let provider = provider();
        let state = write_json(
            dir.path(),
            "state.json",
            json!({
                "id": "sig-1",
                "attributes": {"name": "web", "description": "frontend"}
            }),
        );
        let config = write_json(dir.path(), "config.json", json!({"name": "web"}));

        let plan =
            build_plan(&provider, "spotinst_elastigroup_aws", &config, Some(&state)).unwrap();
        assert_eq!(
            plan.operation,
            Operation::Update {
                id: "sig-1".to_string()
            }
        );
        assert_eq!(plan.cleared_paths(), vec!["description".to_string()]);

        let rendered = render_plan(&provider, &plan).unwrap();
        assert!(rendered.contains("/aws/ec2/group/sig-1"));
        assert!(rendered.contains("description"));
    }

    #[test]
    fn flattened_state_plans_no_change() {
        let dir = tempdir().unwrap();
        let provider = provider();
        let rt = "spotinst_ocean_aws";
        let object = write_json(
            dir.path(),
            "object.json",
            json!({
                "id": "o-1234",
                "name": "prod",
                "controllerClusterId": "prod-k8s",
                "region": "us-west-2",
                "autoScaler": {"isEnabled": true, "cooldown": 300}
            }),
        );

        let state = flatten_object(&provider, rt, &object).unwrap();
        assert_eq!(state["id"], json!("o-1234"));
        assert_eq!(state["attributes"]["controller_id"], json!("prod-k8s"));
        assert_eq!(
            state["attributes"]["autoscaler"][0]["autoscale_cooldown"],
            json!(300)
        );

        let state_path = write_json(dir.path(), "state.json", state);
        let config = write_json(
            dir.path(),
            "config.json",
            json!({
                "name": "prod",
                "controller_id": "prod-k8s",
                "region": "us-west-2",
                "autoscaler": [{"autoscale_is_enabled": true, "autoscale_cooldown": 300}]
            }),
        );
        let plan = build_plan(&provider, rt, &config, Some(&state_path)).unwrap();
        assert_eq!(
            plan.operation,
            Operation::NoChange {
                id: "o-1234".to_string()
            }
        );
        assert!(
            render_plan(&provider, &plan)
                .unwrap()
                .contains("is up-to-date")
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let err = read_json(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }

    #[test]
    fn schema_lists_nested_attributes() {
        let provider = provider();
        let schema = schema_of(&provider, "spotinst_elastigroup_aws").unwrap();
        let rendered = render_schema(&schema);
        assert!(rendered.contains("integration_codedeploy"));
        assert!(rendered.contains("deployment_group_name"));
        assert!(rendered.contains("1357997531"));
    }
}
