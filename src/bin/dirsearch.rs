//! dirsearch: look up users or groups in the configured directory service.
//!
//! ## Usage
//! ```text
//! dirsearch users  [TERM] [--minimal|--full] [--max N] [--method OPERATION]
//! dirsearch groups [TERM] [--minimal|--full] [--max N]
//! ```
//!
//! Results are printed to stdout as JSON. Failures are logged and produce `[]`.
//!
//! ## Configuration
//! - DIRSEARCH_CONFIG: Path to a YAML config file (optional, `config.yaml` otherwise)
//! - DIRSEARCH__DIRECTORY__BASE_URL: Directory service base URL
//! - DIRSEARCH_LOG: Log filter (default: info)

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use directory_search::config::Config;
use directory_search::utils::bootstrap::init_tracing;
use directory_search::{
    DirectorySearch, GroupSearchOptions, HttpDispatcher, TracingSink, UserSearchOptions,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dirsearch")]
#[command(about = "Search users and groups in the configured directory service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search users
    Users {
        /// Search term (empty matches all users)
        #[arg(default_value = "")]
        term: String,
        #[command(flatten)]
        shape: ResultShape,
        /// Call this operation instead of userSearch (term is sent as `query`)
        #[arg(long)]
        method: Option<String>,
    },
    /// Search groups
    Groups {
        /// Search term; leading/trailing `%` are stripped
        #[arg(default_value = "")]
        term: String,
        #[command(flatten)]
        shape: ResultShape,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct ResultShape {
    /// Return minimal records
    #[arg(long, conflicts_with = "full")]
    minimal: bool,
    /// Return full records, even when the config asks for minimal ones
    #[arg(long)]
    full: bool,
    /// Maximum number of results (defaults to search.max_results)
    #[arg(long = "max")]
    max_results: Option<u32>,
}

impl ResultShape {
    /// Flags win over the configured default.
    fn minimal_or(&self, default: bool) -> bool {
        if self.full {
            false
        } else {
            self.minimal || default
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load(None)?;
    let dispatcher = Arc::new(HttpDispatcher::new(&config.directory)?);
    let search = DirectorySearch::new(dispatcher, Arc::new(TracingSink));

    info!(
        base_url = %config.directory.base_url,
        command = ?cli.command,
        "dirsearch started"
    );

    let output = match cli.command {
        Command::Users {
            term,
            shape,
            method,
        } => {
            let mut options = UserSearchOptions::new(term)
                .minimal(shape.minimal_or(config.search.minimal))
                .with_max_results(shape.max_results.unwrap_or(config.search.max_results));
            if let Some(method) = method {
                options = options.with_method_override(method);
            }
            serde_json::to_string_pretty(&search.search_users(&options).await)?
        }
        Command::Groups { term, shape } => {
            let options = GroupSearchOptions::new(term)
                .minimal(shape.minimal_or(config.search.minimal))
                .with_max_results(shape.max_results.unwrap_or(config.search.max_results));
            serde_json::to_string_pretty(&search.search_groups(&options).await)?
        }
    };

    println!("{}", output);
    Ok(())
}
