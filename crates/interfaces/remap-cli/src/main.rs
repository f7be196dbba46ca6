use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use remap_cli::profiles::{self, ProfileManager};
use remap_cli::StoreArgs;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Profiles file (defaults to the per-user config directory)
    #[arg(long, global = true, env = remap_config::PROFILES_FILE_ENV)]
    profiles_file: Option<Utf8PathBuf>,
    #[arg(long, global = true, help = "Do not keep daily backups")]
    no_backups: bool,
    #[arg(long, global = true, help = "Number of daily backups to keep")]
    keep_backups: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List profiles in order; `*` marks the selected one
    List,
    Show {
        /// Profile id or name
        profile: String,
    },
    Add {
        #[arg(long)]
        name: Option<String>,
    },
    Duplicate {
        profile: String,
    },
    Rename {
        profile: String,
        name: String,
    },
    Remove {
        profile: String,
    },
    Select {
        profile: String,
    },
    /// Move the profile at position FROM to position TO (1-based)
    Move {
        from: usize,
        to: usize,
    },
    /// Print changes as they happen, including edits made by other programs
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("default subscriber");

    let args = StoreArgs {
        profiles_file: cli.profiles_file,
        no_backups: cli.no_backups,
        keep_backups: cli.keep_backups,
    };
    let mgr = ProfileManager::open(args.gateway_options()?)?;

    let result = match cli.command {
        Commands::List => profiles::handle_list(&mgr),
        Commands::Show { profile } => profiles::handle_show(&mgr, &profile),
        Commands::Add { name } => profiles::handle_add(&mgr, name),
        Commands::Duplicate { profile } => profiles::handle_duplicate(&mgr, &profile),
        Commands::Rename { profile, name } => profiles::handle_rename(&mgr, &profile, name),
        Commands::Remove { profile } => profiles::handle_remove(&mgr, &profile),
        Commands::Select { profile } => profiles::handle_select(&mgr, &profile),
        Commands::Move { from, to } => profiles::handle_move(&mgr, from, to),
        Commands::Watch => profiles::handle_watch(&mgr).await,
    };

    mgr.finish();
    result
}
