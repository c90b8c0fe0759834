//! memo CLI
//!
//! Command-line interface for memo - personal notes with tags, search and
//! markdown rendering.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use memo_core::{Config, NoteType, SortField, SortOrder, Store};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "memo")]
#[command(about = "memo - Personal notes with tags, search and markdown")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug detail to the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        title: String,
        /// Note content (opens editor if not provided)
        #[arg(short, long)]
        content: Option<String>,
        /// Tags to add
        #[arg(short, long)]
        tag: Vec<String>,
        /// Image references to attach
        #[arg(short, long)]
        image: Vec<String>,
        /// Note type (plain, structured, reference)
        #[arg(long = "type", value_name = "TYPE")]
        note_type: Option<NoteType>,
        /// Pin the note
        #[arg(long)]
        pin: bool,
    },
    /// List notes matching the given filters
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show note details
    Show {
        /// Note ID (full or prefix)
        id: String,
        /// Render the content as sanitized HTML
        #[arg(long)]
        html: bool,
    },
    /// Edit a note (opens editor when no field is given)
    Edit {
        /// Note ID (full or prefix)
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
        /// Replace tags
        #[arg(short, long)]
        tag: Vec<String>,
        /// New note type
        #[arg(long = "type", value_name = "TYPE")]
        note_type: Option<NoteType>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Toggle the pinned flag of a note
    Pin {
        /// Note ID (full or prefix)
        id: String,
    },
    /// List all tags
    Tags,
    /// Show the table of contents of a note
    Toc {
        /// Note ID (full or prefix)
        id: String,
    },
    /// Render markdown from a file (or stdin) to sanitized HTML
    Render {
        /// Markdown file; reads stdin when absent
        file: Option<PathBuf>,
    },
    /// Export all notes to a backup file
    Export {
        /// Destination path
        path: PathBuf,
    },
    /// Import notes from a backup file
    Import {
        /// Backup file path
        path: PathBuf,
        /// Replace the whole collection instead of merging
        #[arg(long)]
        replace: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive search in title, content and tags
    #[arg(short, long)]
    pub search: Option<String>,
    /// Filter by tag (repeatable; any may match)
    #[arg(short, long)]
    pub tag: Vec<String>,
    /// Restrict to note types (repeatable; any may match)
    #[arg(long = "type", value_name = "TYPE")]
    pub note_type: Vec<NoteType>,
    /// Only notes with images
    #[arg(long, conflicts_with = "no_images")]
    pub images: bool,
    /// Only notes without images
    #[arg(long)]
    pub no_images: bool,
    /// Created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    /// Sort field (title, createdAt, updatedAt)
    #[arg(long)]
    pub sort: Option<SortField>,
    /// Sort order (asc, desc)
    #[arg(long)]
    pub order: Option<SortOrder>,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, sort_field, sort_order)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file directly and never open the store
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(cli.config.as_ref(), &output)
            }
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, cli.config.as_ref(), &output)
            }
        };
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    // Rendering never touches the store
    if let Commands::Render { file } = &cli.command {
        return commands::render::render(file.as_deref(), &output);
    }

    let mut store = Store::open_with_config(config);
    debug!("Opened store at {:?}", store.config().notes_path());

    match cli.command {
        Commands::Add {
            title,
            content,
            tag,
            image,
            note_type,
            pin,
        } => commands::note::add(
            &mut store,
            commands::note::NewNote {
                title,
                content,
                tags: tag,
                images: image,
                note_type,
                pinned: pin,
            },
            &output,
        ),
        Commands::List(args) => commands::note::list(&store, &args, &output),
        Commands::Show { id, html } => commands::note::show(&store, &id, html, &output),
        Commands::Edit {
            id,
            title,
            content,
            tag,
            note_type,
        } => commands::note::edit(&mut store, &id, title, content, tag, note_type, &output),
        Commands::Delete { id, yes } => commands::note::delete(&mut store, &id, yes, &output),
        Commands::Pin { id } => commands::note::pin(&mut store, &id, &output),
        Commands::Tags => commands::tag::list(&store, &output),
        Commands::Toc { id } => commands::note::toc(&store, &id, &output),
        Commands::Export { path } => commands::backup::export(&store, &path, &output),
        Commands::Import { path, replace } => {
            commands::backup::import(&mut store, &path, replace, &output)
        }
        Commands::Render { .. } | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Initialize file-based logging
///
/// Logs to config.log_file or `<data_dir>/memo.log`. `RUST_LOG` wins over
/// the `--verbose` flag when set.
fn init_logging(config: &Config, verbose: bool) {
    let log_path = config.log_path();

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let log_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("memo_core={},memo_cli={}", log_level, log_level))
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_flags_parse() {
        let cli = Cli::try_parse_from([
            "memo", "list", "--search", "milk", "--tag", "errand", "--tag", "home", "--type",
            "plain", "--images", "--from", "2024-01-01", "--sort", "title", "--order", "asc",
        ])
        .unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.search.as_deref(), Some("milk"));
        assert_eq!(args.tag, vec!["errand", "home"]);
        assert_eq!(args.note_type, vec![NoteType::Plain]);
        assert!(args.images);
        assert_eq!(args.sort, Some(SortField::Title));
        assert_eq!(args.order, Some(SortOrder::Asc));
    }

    #[test]
    fn test_images_flags_conflict() {
        assert!(Cli::try_parse_from(["memo", "list", "--images", "--no-images"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["memo", "tags", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }
}
