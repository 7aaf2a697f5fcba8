//! Gaming Store CLI - browse the catalog, fill a cart and place orders.
//!
//! Each invocation is one visit to the store: the cart and signed-in user
//! are restored from `STORE_DATA_DIR` at start and persisted on change.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! gs products --platform PS5
//! gs search "controller"
//!
//! # Fill the cart
//! gs add game 4
//! gs add accessory 1
//! gs cart
//!
//! # Sign in and order
//! GS_PASSWORD=... gs login --email sara@example.com
//! gs checkout
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gaming_store_core::{ProductId, ProductType};
use gaming_store_storefront::Storefront;
use gaming_store_storefront::api::GameFilter;
use gaming_store_storefront::config::StorefrontConfig;
use gaming_store_storefront::error::AppError;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "gs")]
#[command(author, version, about = "Gaming Store command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List games and accessories
    Products {
        /// Only games in this category (e.g. `action`, `rpg`)
        #[arg(short, long)]
        category: Option<String>,

        /// Only games for this platform (e.g. `PS5`)
        #[arg(short, long)]
        platform: Option<String>,
    },
    /// Search product names and descriptions
    Search {
        /// Text to look for
        query: String,
    },
    /// Add one unit of a product to the cart
    Add {
        /// Product type (`game` or `accessory`)
        kind: ProductType,

        /// Product id
        id: String,
    },
    /// Show the cart
    Cart,
    /// Empty the cart
    Clear,
    /// Place an order for the cart contents
    Checkout,
    /// Sign in
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long, env = "GS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(short, long)]
        phone: String,

        /// Password (at least 6 characters)
        #[arg(long, env = "GS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out (the cart is kept)
    Logout,
    /// Show the signed-in user
    Whoami,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", AppError::from(e).user_message());
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean on stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gaming_store_storefront=info,gaming_store_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.report();
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let store = Storefront::open(config)?;

    match cli.command {
        Commands::Products { category, platform } => {
            commands::catalog::products(&store, &GameFilter { category, platform }).await
        }
        Commands::Search { query } => commands::catalog::search(&store, &query).await,
        Commands::Add { kind, id } => commands::cart::add(&store, kind, &ProductId::new(id)).await,
        Commands::Cart => {
            commands::cart::show(&store);
            Ok(())
        }
        Commands::Clear => {
            commands::cart::clear(&store);
            Ok(())
        }
        Commands::Checkout => commands::cart::checkout(&store).await,
        Commands::Login { email, password } => {
            commands::account::login(&store, &email, password).await
        }
        Commands::Register {
            name,
            email,
            phone,
            password,
        } => commands::account::register(&store, name, email, phone, password).await,
        Commands::Logout => {
            commands::account::logout(&store);
            Ok(())
        }
        Commands::Whoami => {
            commands::account::whoami(&store);
            Ok(())
        }
    }
}
