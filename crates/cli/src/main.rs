//! Storefront Cart CLI - drive the cart manager from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! cart-cli show
//!
//! # Add one unit of product 42
//! cart-cli add 42
//!
//! # Set product 42 to three units
//! cart-cli set 42 3
//!
//! # Remove product 42
//! cart-cli remove 42
//! ```
//!
//! Configuration comes from the environment (see the `CART_*` variables in
//! `storefront_cart::config`). The cart is kept in `CART_STORAGE_DIR`, so
//! consecutive invocations see each other's changes.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cart::{
    CartClientConfig, CartManager, ConfigError, FileStore, HttpCatalog, TracingNotifier,
};
use storefront_cart_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "cart-cli")]
#[command(author, version, about = "Storefront cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Set {
        /// Product ID
        product_id: ProductId,

        /// New quantity (must be at least 1)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: Option<&CartClientConfig>) -> Option<sentry::ClientInitGuard> {
    let dsn = config?.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Parse arguments first so --help and usage errors never need configuration
    let cli = Cli::parse();

    // A configuration error is reported by `run` once logging is up
    let config = CartClientConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(config.as_ref().ok());

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_cart=info,cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(
    cli: Cli,
    config: Result<CartClientConfig, ConfigError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config?;
    let manager = CartManager::initialize(
        HttpCatalog::new(&config.catalog)?,
        FileStore::new(&config.storage.dir),
        TracingNotifier,
        config.settings(),
    );

    match cli.command {
        Commands::Show => commands::cart::show(&manager),
        Commands::Add { product_id } => commands::cart::add(&manager, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(&manager, product_id).await?,
        Commands::Set { product_id, amount } => {
            commands::cart::set(&manager, product_id, amount).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_negative_amount() {
        let cli = Cli::try_parse_from(["cart-cli", "set", "42", "-1"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Set { product_id, amount: -1 } if product_id == ProductId::new(42)
        ));
    }

    #[test]
    fn test_rejects_non_numeric_product_id() {
        assert!(Cli::try_parse_from(["cart-cli", "add", "sneaker"]).is_err());
    }

    #[test]
    fn test_help_needs_no_configuration() {
        let err = Cli::try_parse_from(["cart-cli", "--help"])
            .err()
            .expect("help exits early");
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_sentry_is_skipped_without_configuration() {
        assert!(init_sentry(None).is_none());
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_command() {
        let cli = Cli::try_parse_from(["cart-cli", "show"]).expect("parse");
        let err = run(
            cli,
            Err(ConfigError::MissingEnvVar("CART_API_URL".to_string())),
        )
        .await
        .expect_err("config error surfaces");
        assert_eq!(
            err.to_string(),
            "Missing environment variable: CART_API_URL"
        );
    }
}
