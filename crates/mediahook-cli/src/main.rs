use clap::{ArgAction, Parser, Subcommand};
use commands::{ask, config, libraries, parse, plugins, run};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "mediahook")]
#[command(about = "mediahook - media automation plugins for your media server")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize name, year, season and episode in a release title
    Parse {
        title: String,

        /// Name template, e.g. "[AI]{name}" (defaults to the airecognition setting)
        #[arg(long, value_name = "TEMPLATE")]
        format: Option<String>,
    },
    /// Ask the chat model about a title using the autosubscribe settings
    Ask { message: String },
    /// List libraries and item counts of the configured Emby servers
    Libraries {
        /// Only this media server
        #[arg(long, value_name = "NAME")]
        server: Option<String>,
    },
    /// Fetch item details for a <server>:<id> media id
    Detail { mediaid: String },
    /// List plugins and whether they are enabled
    Plugins,
    /// Print a plugin's configuration form as JSON
    Form { plugin: String },
    /// Print a plugin's status page as JSON
    Page { plugin: String },
    /// Run the plugin host, reading events from stdin
    #[command(long_about = "Initialize every plugin and feed it events read from stdin. A line starting with '/' invokes a plugin command, 'title: X' asks for name recognition and anything else is sent as a user message. Emitted events are printed. Stops on EOF unless scheduled jobs are active, and always on Ctrl-C.")]
    Run {
        /// Write logs to a daily-rotated file (defaults to the log directory)
        #[arg(long, value_name = "PATH")]
        log_file: Option<Option<PathBuf>>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

impl Commands {
    fn works_without_config(&self) -> bool {
        matches!(
            self,
            Commands::Config {
                cmd: ConfigCommands::Path | ConfigCommands::Init { .. }
            }
        )
    }
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks keys)
    Show {
        /// Show keys unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = commands::config_path(cli.config.clone());
    // `config path` and `config init` must work even when the file is broken
    let (store, load_error) = match commands::load_store(&config_path) {
        Ok(store) => (store, None),
        Err(e) if cli.command.works_without_config() => (commands::default_store(), Some(e)),
        Err(e) => return Err(e),
    };
    let settings = store.snapshot().ok().and_then(|c| c.logging);

    // `run` may log to a file; everything else logs to stderr
    let log_file = match &cli.command {
        Commands::Run { log_file } => commands::resolve_log_file(log_file.clone(), settings.as_ref()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, settings.as_ref(), log_file.as_deref())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Ignoring unreadable configuration");
    }

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Parse { title, format } => parse::run_parse(&store, &title, format, &output),
        Commands::Ask { message } => ask::run_ask(&store, &message, &output).await,
        Commands::Libraries { server } => libraries::run_libraries(&store, server, &output).await,
        Commands::Detail { mediaid } => libraries::run_detail(&store, &mediaid, &output).await,
        Commands::Plugins => plugins::run_plugins(&store, &output),
        Commands::Form { plugin } => plugins::run_form(&store, &plugin, &output),
        Commands::Page { plugin } => plugins::run_page(&store, &plugin, &output),
        Commands::Run { .. } => run::run_host(store, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &store, &config_path, &output),
    }
}
