//! Stockpile CLI - Shared inventory and shopping lists from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password may also come from STOCKPILE_PASSWORD)
//! stockpile login -e me@example.com -p hunter22
//!
//! # Load everything for the active group
//! stockpile sync
//!
//! # Work with the shopping list
//! stockpile shopping add "Eggs" -q 12
//! stockpile shopping toggle <id>
//!
//! # Change the active group
//! stockpile groups switch <id>
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `status` - Session management
//! - `sync` - Load groups, catalogs and lists
//! - `groups` - List, create, switch, join and delete groups
//! - `shopping` / `items` / `wishes` - Edit the active group's lists
//! - `categories` / `locations` / `filter` - Catalogs and their filters
//!
//! # Environment Variables
//!
//! See `stockpile_client::config` for `STOCKPILE_API_URL` and friends.
//! `RUST_LOG` controls verbosity (default: `info`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "stockpile")]
#[command(author, version, about = "Stockpile inventory and shopping lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STOCKPILE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STOCKPILE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget stored credentials
    Logout,
    /// Show the stored session
    Status,
    /// Load groups, catalogs and lists for the active group
    Sync,
    /// Manage groups
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Edit the shopping list
    Shopping {
        #[command(subcommand)]
        action: ShoppingAction,
    },
    /// Edit the inventory
    Items {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Edit the wish list
    Wishes {
        #[command(subcommand)]
        action: WishAction,
    },
    /// List categories
    Categories {
        /// Ignore the category filter
        #[arg(short, long)]
        all: bool,
    },
    /// List locations
    Locations {
        /// Ignore the location filter
        #[arg(short, long)]
        all: bool,
    },
    /// Change the category and location filters
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    List,
    Create { name: String },
    /// Make a group active
    Switch { id: String },
    /// Join a group with an invite code
    Join { invite_code: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum ShoppingAction {
    List,
    Add {
        name: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Flip the purchased mark
    Toggle { id: String },
    Remove { id: String },
}

#[derive(Subcommand)]
enum ItemAction {
    List,
    Add {
        name: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    Remove { id: String },
    /// Attach a photo
    Photo { id: String, path: PathBuf },
}

#[derive(Subcommand)]
enum WishAction {
    List,
    Add {
        name: String,

        #[arg(short, long)]
        url: Option<String>,
    },
    /// Flip the fulfilled mark
    Toggle { id: String },
    Remove { id: String },
}

#[derive(Subcommand)]
enum FilterAction {
    /// Toggle a category in the filter
    Category { id: String },
    /// Toggle a location in the filter
    Location { id: String },
    /// Show everything again
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use commands::{auth, catalog, groups, lists};

    match cli.command {
        Commands::Login { email, password } => auth::login(&email, &password).await?,
        Commands::Register {
            name,
            email,
            password,
        } => auth::register(&name, &email, &password).await?,
        Commands::Logout => auth::logout().await?,
        Commands::Status => auth::status()?,
        Commands::Sync => sync().await?,
        Commands::Groups { action } => match action {
            GroupAction::List => groups::list().await?,
            GroupAction::Create { name } => groups::create(&name).await?,
            GroupAction::Switch { id } => groups::switch(&id).await?,
            GroupAction::Join { invite_code } => groups::join(&invite_code).await?,
            GroupAction::Delete { id } => groups::delete(&id).await?,
        },
        Commands::Shopping { action } => match action {
            ShoppingAction::List => lists::shopping_list().await?,
            ShoppingAction::Add { name, quantity } => lists::shopping_add(&name, quantity).await?,
            ShoppingAction::Toggle { id } => lists::shopping_toggle(&id).await?,
            ShoppingAction::Remove { id } => lists::shopping_remove(&id).await?,
        },
        Commands::Items { action } => match action {
            ItemAction::List => lists::items_list().await?,
            ItemAction::Add { name, quantity } => lists::items_add(&name, quantity).await?,
            ItemAction::Remove { id } => lists::items_remove(&id).await?,
            ItemAction::Photo { id, path } => lists::items_photo(&id, &path).await?,
        },
        Commands::Wishes { action } => match action {
            WishAction::List => lists::wishes_list().await?,
            WishAction::Add { name, url } => lists::wishes_add(&name, url).await?,
            WishAction::Toggle { id } => lists::wishes_toggle(&id).await?,
            WishAction::Remove { id } => lists::wishes_remove(&id).await?,
        },
        Commands::Categories { all } => catalog::categories(all).await?,
        Commands::Locations { all } => catalog::locations(all).await?,
        Commands::Filter { action } => match action {
            FilterAction::Category { id } => catalog::select_category(&id)?,
            FilterAction::Location { id } => catalog::select_location(&id)?,
            FilterAction::Clear => catalog::clear_filters()?,
        },
    }
    Ok(())
}

/// Load everything and summarize what came back.
async fn sync() -> Result<(), commands::CommandError> {
    let context = commands::Context::synced().await?;
    let state = context.store.snapshot();

    tracing::info!(
        group = state.active_group().map_or("-", |g| g.name.as_str()),
        groups = state.groups.len(),
        categories = state.categories.len(),
        locations = state.locations.len(),
        items = state.items.len(),
        shopping = state.shopping.len(),
        wishes = state.wishes.len(),
        "Synced"
    );
    for (list, error) in [
        ("categories", state.categories.error()),
        ("locations", state.locations.error()),
        ("items", state.items.error()),
        ("shopping", state.shopping.error()),
        ("wishes", state.wishes.error()),
    ] {
        if let Some(error) = error {
            tracing::warn!(list, error, "List failed to load; showing stale entries");
        }
    }
    Ok(())
}
