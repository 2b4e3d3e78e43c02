use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "noteable")]
#[command(about = "Tab-and-field note keeper with template expansion", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tabs and their fields
    #[command(alias = "ls")]
    List,

    /// Manage tabs
    Tab {
        #[command(subcommand)]
        action: TabAction,
    },

    /// Manage fields
    Field {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Blank all field values in a tab
    Clear {
        /// Tab id or name
        tab: String,
    },

    /// Resolve a template field and print the result
    Run {
        /// Tab id or name
        tab: String,
        /// Field id or label
        field: String,
    },

    /// Import tabs from a backup file (replaces existing tabs by default)
    Import {
        path: PathBuf,

        /// Append imported tabs instead of replacing
        #[arg(long)]
        merge: bool,
    },

    /// Export the whole notebook to a timestamped backup file
    Export {
        /// Target directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Get or set settings
    Config {
        /// Setting key (clear-tab-deletes-images, experimental)
        key: Option<String>,

        /// Value to set (if omitted, prints the current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TabAction {
    /// Add a tab and make it active
    Add { name: String },

    /// Remove a tab
    #[command(alias = "rm")]
    Remove {
        /// Tab id or name
        tab: String,
    },

    /// Rename a tab
    Rename {
        /// Tab id or name
        tab: String,
        name: String,
    },

    /// Make a tab active
    Select {
        /// Tab id or name
        tab: String,
    },

    /// Reorder tabs; tabs not listed are dropped
    Order {
        /// Tab ids or names in the new order
        #[arg(required = true, num_args = 1..)]
        tabs: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FieldAction {
    /// Add a field to a tab
    Add {
        /// Tab id or name
        tab: String,

        /// Field type: label, textarea, image, or template
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Display label (defaults per type)
        #[arg(default_value = "")]
        label: String,
    },

    /// Remove a field
    #[command(alias = "rm")]
    Remove {
        /// Tab id or name
        tab: String,
        /// Field id or label
        field: String,
    },

    /// Relabel a field
    Rename {
        /// Tab id or name
        tab: String,
        /// Field id or label
        field: String,
        label: String,
    },

    /// Set a field's value
    Set {
        /// Tab id or name
        tab: String,
        /// Field id or label
        field: String,
        value: String,
    },

    /// Reorder fields in a tab; fields not listed are dropped
    Order {
        /// Tab id or name
        tab: String,
        /// Field ids or labels in the new order
        #[arg(required = true, num_args = 1..)]
        fields: Vec<String>,
    },
}
