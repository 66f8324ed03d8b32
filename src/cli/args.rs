//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of searching for one
//! - `--adapter <name>`: Select a configured adapter
//! - `--entity-type <type>` / `--entity-id <id>`: The entity to operate on
//! - `--prefix <prefix>`: Override the adapter's entity prefix
//! - `--debug`: Enable debug logging

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mdsc - Command-line client for the learning-object metadata service
#[derive(Parser, Debug)]
#[command(name = "mdsc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Configured adapter to use (defaults to the config's `default`)
    #[arg(long, global = true, value_name = "NAME")]
    pub adapter: Option<String>,

    /// Entity type, used when the entity is registered
    #[arg(long, global = true, default_value = "learningobject", value_name = "TYPE")]
    pub entity_type: String,

    /// Entity id; a UUID is used as-is, anything else gets the prefix
    #[arg(long, global = true, value_name = "ID")]
    pub entity_id: Option<String>,

    /// Entity prefix, overriding the adapter's
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the entity's metadata identifier
    #[command(
        name = "uuid",
        after_help = "\
EXAMPLES:
    # Look up the identifier of course 42
    mdsc --entity-type course --entity-id 42 uuid

    # Register the entity if the service does not know it yet
    mdsc --entity-id 42 uuid --create"
    )]
    Uuid {
        /// Register the entity if it has no identifier
        #[arg(long)]
        create: bool,
    },

    /// Read one metadata facet
    Get {
        /// Facet name (see `mdsc meta-types`)
        meta_type: String,
    },

    /// Read every metadata facet
    GetAll,

    /// Store a facet value
    #[command(after_help = "\
EXAMPLES:
    # Plain strings need no quoting
    mdsc --entity-id 42 create keywords algebra

    # Anything that parses as JSON is sent as JSON
    mdsc --entity-id 42 create difficulty 3
    mdsc --entity-id 42 create public true")]
    Create {
        /// Facet name
        meta_type: String,
        /// Value, as JSON or a plain string
        data: String,
    },

    /// Store several facets from a JSON object
    #[command(after_help = "\
EXAMPLES:
    mdsc --entity-id 42 create-many '{\"keywords\": [{\"keyword\": \"a\"}], \"difficulty\": {\"difficulty\": 2}}'")]
    CreateMany {
        /// Object of facet name to record or list of records
        data: String,
    },

    /// Replace a facet record's value
    Update {
        /// Facet name
        meta_type: String,
        /// Record id
        meta_id: String,
        /// Value, as JSON or a plain string
        data: String,
    },

    /// Delete a facet record
    Delete {
        /// Facet name
        meta_type: String,
        /// Record id
        meta_id: String,
    },

    /// Attach a learning goal
    AddGoal {
        /// Learning goal id
        goal_id: String,
    },

    /// List the entity's keywords
    Keywords,

    /// Search all keywords by prefix
    SearchKeywords {
        /// Keyword prefix
        text: String,
    },

    /// Work with custom fields
    Field {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Show the entity's learning object
    LearningObject {
        /// Register the entity as a resource if it is unknown
        #[arg(long)]
        create: bool,
    },

    /// List the metadata facets and their wire properties
    MetaTypes,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    mdsc completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    mdsc completion zsh >> ~/.zshrc

    # Fish
    mdsc completion fish > ~/.config/fish/completions/mdsc.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Custom field subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FieldAction {
    /// Declare a custom field
    Define {
        /// Field name
        name: String,
        /// Data type of the values
        #[arg(long, default_value = "text")]
        data_type: String,
        /// The field holds many values
        #[arg(long)]
        collection: bool,
        /// Values must be unique
        #[arg(long)]
        unique: bool,
    },
    /// Show a field definition
    Get {
        /// Field name
        name: String,
    },
    /// List the entity's values for a field
    Values {
        /// Field name
        name: String,
    },
    /// Set a field value according to its definition
    Set {
        /// Field name
        name: String,
        /// Value, as JSON or a plain string
        value: String,
        /// Skip values that already exist (collection fields)
        #[arg(long)]
        dedup: bool,
    },
    /// Add values to a collection field
    Add {
        /// Field name
        name: String,
        /// Values, each as JSON or a plain string
        #[arg(required = true)]
        values: Vec<String>,
        /// Skip values that already exist
        #[arg(long)]
        dedup: bool,
    },
    /// List every custom field value of the entity
    List,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the selected adapter with secrets redacted
    Show,
    /// Print the config file path
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
