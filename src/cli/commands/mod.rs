//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Builds a [`MetadataClient`] from the selected adapter
//! 3. Runs the client operation and prints the result as JSON
//!
//! # Async Commands
//!
//! Client operations are async because they involve network I/O. Handlers
//! create a tokio runtime per command and block on the operation.

mod completion;
mod config_cmd;
mod facets;
mod fields;
mod identity;

pub use completion::completion;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use serde_json::Value;

use super::args::{Command, ConfigAction};
use crate::client::MetadataClient;
use crate::core::config::{AdapterConfig, Config};

/// Settings shared by every command, taken from the global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    /// Adapter name
    pub adapter: Option<String>,
    pub entity_type: String,
    pub entity_id: Option<String>,
    /// Prefix override
    pub prefix: Option<String>,
}

impl Context {
    /// Load the configuration.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path.as_deref()).context("Failed to load configuration")
    }

    /// Select the adapter and apply the `--prefix` override.
    pub fn load_adapter(&self) -> Result<AdapterConfig> {
        let config = self.load_config()?;
        let mut adapter = config
            .adapter(self.adapter.as_deref())
            .context("Failed to select adapter")?;
        if let Some(prefix) = &self.prefix {
            adapter.prefix = Some(prefix.clone());
        }
        Ok(adapter)
    }

    /// Client without an entity id.
    pub fn client(&self) -> Result<MetadataClient> {
        let adapter = self.load_adapter()?;
        let mut client =
            MetadataClient::from_config(&adapter).context("Failed to create client")?;
        client.set_entity_type(self.entity_type.as_str());
        Ok(client)
    }

    /// Client bound to `--entity-id`.
    pub fn entity_client(&self) -> Result<MetadataClient> {
        let Some(entity_id) = self.entity_id.as_deref() else {
            bail!("This command needs an entity. Pass --entity-id <ID>.");
        };
        if entity_id.trim().is_empty() {
            bail!("--entity-id must not be empty");
        }

        let mut client = self.client()?;
        client.set_entity_id(entity_id);
        Ok(client)
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Uuid { create } => identity::uuid(ctx, create),
        Command::LearningObject { create } => identity::learning_object(ctx, create),
        Command::Get { meta_type } => facets::get(ctx, &meta_type),
        Command::GetAll => facets::get_all(ctx),
        Command::Create { meta_type, data } => facets::create(ctx, &meta_type, &data),
        Command::CreateMany { data } => facets::create_many(ctx, &data),
        Command::Update {
            meta_type,
            meta_id,
            data,
        } => facets::update(ctx, &meta_type, &meta_id, &data),
        Command::Delete { meta_type, meta_id } => facets::delete(ctx, &meta_type, &meta_id),
        Command::AddGoal { goal_id } => facets::add_goal(ctx, &goal_id),
        Command::Keywords => facets::keywords(ctx),
        Command::SearchKeywords { text } => facets::search_keywords(ctx, &text),
        Command::MetaTypes => facets::meta_types(),
        Command::Field { action } => fields::field(ctx, action),
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion(shell),
    }
}

/// Run an async operation on a fresh runtime.
fn run_async<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    rt.block_on(future)
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

/// Interpret a command-line value: JSON if it parses, a plain string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    mod parse_value {
        use super::*;

        #[test]
        fn json_values_are_kept() {
            assert_eq!(parse_value("3"), json!(3));
            assert_eq!(parse_value("true"), json!(true));
            assert_eq!(parse_value(r#"{"a": 1}"#), json!({ "a": 1 }));
            assert_eq!(parse_value(r#""quoted""#), json!("quoted"));
        }

        #[test]
        fn anything_else_is_a_string() {
            assert_eq!(parse_value("algebra"), json!("algebra"));
            assert_eq!(parse_value("two words"), json!("two words"));
            assert_eq!(parse_value(""), json!(""));
        }
    }

    mod context {
        use super::*;

        #[test]
        fn prefix_flag_overrides_adapter() {
            let dir = TempDir::new().unwrap();
            let path = write_config(
                &dir,
                r#"
                [adapters.local]
                base_url = "http://localhost:8080"
                prefix = "h5p-"
                "#,
            );

            let ctx = Context {
                config_path: Some(path),
                entity_type: "course".to_string(),
                entity_id: Some("9".to_string()),
                prefix: Some("course-".to_string()),
                ..Default::default()
            };

            let client = ctx.entity_client().unwrap();
            assert_eq!(client.entity_guid(), "course-9");
            assert_eq!(client.entity_type().map(|t| t.as_str()), Some("course"));
        }

        #[test]
        fn entity_commands_need_an_id() {
            let ctx = Context {
                entity_type: "learningobject".to_string(),
                ..Default::default()
            };
            let err = ctx.entity_client().unwrap_err();
            assert!(err.to_string().contains("--entity-id"));
        }

        #[test]
        fn unknown_adapter_is_reported() {
            let dir = TempDir::new().unwrap();
            let path = write_config(
                &dir,
                r#"
                [adapters.local]
                base_url = "http://localhost:8080"
                "#,
            );

            let ctx = Context {
                config_path: Some(path),
                adapter: Some("remote".to_string()),
                ..Default::default()
            };
            let err = ctx.load_adapter().unwrap_err();
            assert!(format!("{:#}", err).contains("remote"));
        }

        #[test]
        fn missing_explicit_config_fails() {
            let dir = TempDir::new().unwrap();
            let ctx = Context {
                config_path: Some(dir.path().join("nope.toml")),
                ..Default::default()
            };
            assert!(ctx.load_config().is_err());
        }
    }
}
