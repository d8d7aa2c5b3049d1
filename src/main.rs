use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use asedex::cli::{
    handle_budget_command, handle_client_command, handle_login, handle_logout,
    handle_migrate_command, handle_module_command, handle_whoami, BudgetCommands,
    ClientCommands, ModuleCommands,
};
use asedex::config::{AsedexPaths, Settings};
use asedex::storage::Storage;

#[derive(Parser)]
#[command(
    name = "asedex",
    version,
    about = "Module catalog, clients and budgets for elevator installations",
    long_about = "Asedex keeps a catalog of priced installation modules, a client \
                  list and the budgets (quotes) issued to each client. Data is \
                  stored as versioned JSON and upgraded automatically on load."
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to enable changes
    Login {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Module catalog commands
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Client management commands
    #[command(subcommand)]
    Client(ClientCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Upgrade stored data to the latest format and write it back
    Migrate {
        /// Only this dataset (modules, clients, budgets, authState)
        #[arg(short, long)]
        dataset: Option<String>,
    },

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Initialize paths and settings
    let paths = AsedexPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    if !paths.is_initialized() {
        settings.save(&paths)?;
    }

    let storage = Storage::new(paths.clone(), &settings)?;

    match cli.command {
        Some(Commands::Login { username, password }) => {
            handle_login(&storage, &settings, username, password)?;
        }
        Some(Commands::Logout) => handle_logout(&storage, &settings)?,
        Some(Commands::Whoami) => handle_whoami(&storage, &settings)?,
        Some(Commands::Module(cmd)) => handle_module_command(&storage, &settings, cmd)?,
        Some(Commands::Client(cmd)) => handle_client_command(&storage, &settings, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&storage, &settings, cmd)?,
        Some(Commands::Migrate { dataset }) => handle_migrate_command(&storage, dataset)?,
        Some(Commands::Config) => {
            println!("Asedex Configuration");
            println!("====================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Uploads directory: {}", paths.uploads_dir().display());
            println!("Exports directory: {}", paths.exports_dir().display());
            println!("Settings file:     {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency:      {}", settings.currency_symbol);
            println!("  Date format:   {}", settings.date_format);
            println!("  Read repair:   {:?}", settings.read_repair);
            println!("  Require login: {}", settings.require_login);
        }
        None => {
            println!("Asedex - modules, clients and budgets");
            println!();
            println!("Run 'asedex --help' for usage information.");
            println!("Run 'asedex login' to enable changes.");
        }
    }

    Ok(())
}
