//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Administer Service Bus queues, topics, subscriptions and rules.
#[derive(Parser, Debug)]
#[command(name = "sbadmin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./config.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Namespace connection string, overriding the configured one
    #[arg(long, global = true)]
    pub connection_string: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Queue operations
    Queue {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Topic operations
    Topic {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Subscription operations within a topic
    Subscription {
        /// Owning topic
        #[arg(long)]
        topic: String,
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Rule operations within a subscription
    Rule {
        /// Owning topic
        #[arg(long)]
        topic: String,
        /// Owning subscription
        #[arg(long)]
        subscription: String,
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntityAction {
    /// List one page, or every entity with --all
    List {
        /// Include runtime counters
        #[arg(long)]
        runtime: bool,
        /// Continuation token printed by a previous page
        #[arg(long, conflicts_with = "all")]
        token: Option<String>,
        /// Follow continuation tokens until the last page
        #[arg(long)]
        all: bool,
    },
    /// Show an entity's properties
    Get { name: String },
    /// Show an entity's runtime properties
    Runtime { name: String },
    /// Print whether an entity exists
    Exists { name: String },
    /// Create an entity
    Create {
        name: String,
        #[command(flatten)]
        settings: CreateSettings,
    },
    /// Delete an entity
    Delete { name: String },
}

/// Settings applied on top of the service defaults when creating.
#[derive(Args, Debug, Default, Clone)]
pub struct CreateSettings {
    /// Maximum delivery count (queues and subscriptions)
    #[arg(long)]
    pub max_delivery_count: Option<i32>,

    /// Peek-lock duration as ISO-8601, e.g. PT1M (queues and subscriptions)
    #[arg(long)]
    pub lock_duration: Option<String>,

    /// Default message time to live as ISO-8601, e.g. P14D
    #[arg(long)]
    pub default_ttl: Option<String>,

    /// Enable sessions (queues and subscriptions)
    #[arg(long)]
    pub requires_session: bool,

    /// Free-form user metadata
    #[arg(long)]
    pub metadata: Option<String>,

    /// SQL filter: the rule's filter, or the default rule of a new subscription
    #[arg(long)]
    pub sql_filter: Option<String>,

    /// SQL action applied by the rule
    #[arg(long)]
    pub sql_action: Option<String>,
}
