//! QKart CLI - terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! qkart products list
//! qkart products search phone
//!
//! # Account
//! qkart register -u crio.do -p learnbydoing --confirm learnbydoing
//! qkart login -u crio.do -p learnbydoing
//! qkart whoami
//! qkart logout
//!
//! # Cart
//! qkart cart add KCRwjF7lN97HnEaY
//! qkart cart inc KCRwjF7lN97HnEaY
//! qkart cart set KCRwjF7lN97HnEaY 3
//! qkart cart show
//! qkart checkout
//!
//! # Type search text line by line, results appear after the quiet period
//! qkart browse
//! ```
//!
//! # Environment Variables
//!
//! - `QKART_BACKEND_URL` - Backend base URL (required)
//! - `QKART_SESSION_FILE` - Where the login session is kept
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet period for `browse`
//! - `SENTRY_DSN` - Error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use qkart_core::ProductId;
use qkart_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{CommandError, Context};

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Log in and remember the session
    Login {
        /// Username
        #[arg(short, long, default_value = "")]
        username: String,

        /// Password
        #[arg(short, long, default_value = "")]
        password: String,
    },
    /// Create an account
    Register {
        /// Username (at least 6 characters)
        #[arg(short, long, default_value = "")]
        username: String,

        /// Password (at least 6 characters)
        #[arg(short, long, default_value = "")]
        password: String,

        /// Password again
        #[arg(long, default_value = "")]
        confirm: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user and wallet balance
    Whoami,
    /// View or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show the read-only cart with order totals
    Checkout,
    /// Interactive catalog with debounced search
    Browse,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List every product
    List,
    /// Search by name or category
    Search {
        /// Search text
        text: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product with quantity 1
    Add {
        /// Product ID
        product_id: String,
    },
    /// Set the quantity of a product (0 removes it)
    Set {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Increase the quantity by one
    Inc {
        /// Product ID
        product_id: String,
    },
    /// Decrease the quantity by one
    Dec {
        /// Product ID
        product_id: String,
    },
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

    Some(guard)
}

/// Log what was set up before tracing was installed.
fn log_startup(sentry_enabled: bool) {
    if sentry_enabled {
        tracing::info!("Sentry initialized");
    } else {
        tracing::debug!("Sentry disabled, no DSN configured");
    }
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is needed for Sentry, which must be initialized before tracing
    let config = StorefrontConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Notifications are printed on stdout, logs go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_storefront=warn,qkart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
    log_startup(sentry_guard.is_some());

    let result = match config {
        Ok(config) => run(cli, Context::new(config)).await,
        Err(e) => Err(CommandError::from(
            qkart_storefront::error::StorefrontError::from(e),
        )),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, ctx: Context) -> Result<(), CommandError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List => commands::products::list(&ctx).await?,
            ProductsAction::Search { text } => commands::products::search(&ctx, &text).await?,
        },
        Commands::Login { username, password } => {
            commands::account::login(&ctx, &username, &password).await?;
        }
        Commands::Register {
            username,
            password,
            confirm,
        } => commands::account::register(&ctx, &username, &password, &confirm).await?,
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Whoami => commands::account::whoami(&ctx)?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add { product_id } => {
                commands::cart::add(&ctx, &ProductId::new(product_id)).await?;
            }
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&ctx, &ProductId::new(product_id), quantity).await?,
            CartAction::Inc { product_id } => {
                commands::cart::step(&ctx, &ProductId::new(product_id), 1).await?;
            }
            CartAction::Dec { product_id } => {
                commands::cart::step(&ctx, &ProductId::new(product_id), -1).await?;
            }
        },
        Commands::Checkout => commands::cart::checkout(&ctx).await?,
        Commands::Browse => commands::browse::run(&ctx).await?,
    }
    Ok(())
}
