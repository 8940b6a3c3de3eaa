use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stockledger::auth::{Identity, TokenAuthority};
use stockledger::cli::{
    handle_history_command, handle_item_command, handle_token_command, HistoryCommands,
    ItemCommands, TokenCommands,
};
use stockledger::config::{paths::LedgerPaths, settings::Settings};
use stockledger::services::require_identity;
use stockledger::storage::Storage;

/// Environment variable holding the token secret
const SECRET_ENV: &str = "STOCKLEDGER_SECRET";

#[derive(Parser)]
#[command(
    name = "stockledger",
    version,
    about = "Access-controlled inventory ledger with an audit trail",
    long_about = "StockLedger keeps an inventory of items, lets callers mutate it \
                  according to their role, and records who changed what and when \
                  in an append-only history that can be queried and exported."
)]
struct Cli {
    /// Bearer token identifying the caller
    #[arg(long, global = true, env = "STOCKLEDGER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Token commands
    #[command(subcommand)]
    Token(TokenCommands),

    /// Item management commands
    #[command(subcommand)]
    Item(ItemCommands),

    /// Item history commands
    #[command(subcommand)]
    History(HistoryCommands),

    /// Show who the current token belongs to
    Whoami,

    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    stockledger::logging::init(&settings.log_level, cli.log_json);

    if settings.ensure_token_salt() {
        settings.save(&paths)?;
    }

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Token(cmd)) => {
            let authority = token_authority(&settings)?;
            handle_token_command(&authority, &settings, cmd)?;
        }
        Some(Commands::Item(cmd)) => {
            let caller = resolve_caller(cli.token.as_deref(), &settings)?;
            handle_item_command(&storage, &settings, caller.as_ref(), cmd)?;
        }
        Some(Commands::History(cmd)) => {
            let caller = resolve_caller(cli.token.as_deref(), &settings)?;
            handle_history_command(&storage, caller.as_ref(), cmd)?;
        }
        Some(Commands::Whoami) => {
            let caller = resolve_caller(cli.token.as_deref(), &settings)?;
            println!("{}", require_identity(caller.as_ref())?);
        }
        Some(Commands::Config) => {
            println!("StockLedger Configuration");
            println!("=========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Items file:      {}", paths.items_file().display());
            println!("History file:    {}", paths.history_file().display());
            println!();
            println!("Settings:");
            println!("  No-op updates:   {:?}", settings.noop_updates);
            println!("  Token lifetime:  {}h", settings.token_ttl_hours);
            println!("  Log level:       {}", settings.log_level);
        }
        None => {
            println!("StockLedger - access-controlled inventory with an audit trail");
            println!();
            println!("Run 'stockledger --help' for usage information.");
        }
    }

    Ok(())
}

fn token_authority(settings: &Settings) -> Result<TokenAuthority> {
    let secret = std::env::var(SECRET_ENV)
        .with_context(|| format!("{} must be set to issue or verify tokens", SECRET_ENV))?;
    Ok(TokenAuthority::new(&secret, &settings.token_key)?)
}

fn resolve_caller(token: Option<&str>, settings: &Settings) -> Result<Option<Identity>> {
    match token {
        Some(token) => {
            let authority = token_authority(settings)?;
            Ok(Some(authority.authenticate(token)?))
        }
        None => Ok(None),
    }
}
