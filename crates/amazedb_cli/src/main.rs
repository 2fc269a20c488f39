//! AmazeDB CLI
//!
//! Command-line access to AmazeDB databases.
//!
//! # Commands
//!
//! - `create`, `list`, `drop`, `groups` - database management
//! - `insert`, `find`, `update`, `remove`, `drop-group` - group contents
//! - `export`, `import` - sealed database packages
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// AmazeDB command-line tools.
#[derive(Parser)]
#[command(name = "amazedb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory holding the `db` directory
    #[arg(global = true, short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a database
    Create {
        /// Database name
        database: String,

        /// Fail if the database already exists
        #[arg(long)]
        error_if_exists: bool,
    },

    /// List databases
    List,

    /// Delete a database and all of its groups
    Drop {
        /// Database name
        database: String,
    },

    /// List the groups of a database
    Groups {
        /// Database name
        database: String,
    },

    /// Insert documents, creating the group if needed
    Insert {
        /// Database name
        database: String,
        /// Group name
        group: String,
        /// Documents as JSON objects
        #[arg(required = true)]
        documents: Vec<String>,
    },

    /// Find documents matching a filter
    Find {
        /// Database name
        database: String,
        /// Group name
        group: String,
        /// Filter as a JSON object
        #[arg(default_value = "{}")]
        filter: String,
        /// Return only the first match
        #[arg(long)]
        one: bool,
        /// Sort results ascending by this field
        #[arg(long)]
        sort_by: Option<String>,
    },

    /// Merge values into documents matching a filter
    Update {
        /// Database name
        database: String,
        /// Group name
        group: String,
        /// Filter as a JSON object
        filter: String,
        /// Values to merge, as a JSON object
        values: String,
        /// Update only the first match
        #[arg(long)]
        one: bool,
    },

    /// Remove documents matching a filter
    Remove {
        /// Database name
        database: String,
        /// Group name
        group: String,
        /// Filter as a JSON object
        filter: String,
        /// Remove only the first match
        #[arg(long)]
        one: bool,
    },

    /// Delete a group
    DropGroup {
        /// Database name
        database: String,
        /// Group name
        group: String,
    },

    /// Export a database to `<dir>/<database>.amazedb`
    Export {
        /// Database name
        database: String,
        /// Directory to write the package into
        dir: PathBuf,
    },

    /// Replace a database's contents with an exported package
    Import {
        /// Database name
        database: String,
        /// Package file
        package: PathBuf,
        /// Key printed by `export`
        key: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.as_path();
    match cli.command {
        Commands::Create {
            database,
            error_if_exists,
        } => commands::database::create(root, &database, error_if_exists)?,
        Commands::List => commands::database::list(root)?,
        Commands::Drop { database } => commands::database::drop(root, &database)?,
        Commands::Groups { database } => commands::database::groups(root, &database)?,
        Commands::Insert {
            database,
            group,
            documents,
        } => commands::documents::insert(root, &database, &group, &documents)?,
        Commands::Find {
            database,
            group,
            filter,
            one,
            sort_by,
        } => commands::documents::find(root, &database, &group, &filter, one, sort_by.as_deref())?,
        Commands::Update {
            database,
            group,
            filter,
            values,
            one,
        } => commands::documents::update(root, &database, &group, &filter, &values, one)?,
        Commands::Remove {
            database,
            group,
            filter,
            one,
        } => commands::documents::remove(root, &database, &group, &filter, one)?,
        Commands::DropGroup { database, group } => {
            commands::documents::drop_group(root, &database, &group)?;
        }
        Commands::Export { database, dir } => commands::backup::export(root, &database, &dir)?,
        Commands::Import {
            database,
            package,
            key,
        } => commands::backup::import(root, &database, &package, &key)?,
        Commands::Version => {
            println!("AmazeDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("AmazeDB Core v{}", amazedb_core::VERSION);
        }
    }

    Ok(())
}
