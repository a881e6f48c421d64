//! Logs every notification a Ko-fi page sends, with a dedicated handler for
//! donations. Point Ko-fi's webhook URL at this process and run with
//! `cargo run --example donation_notifier`.

use clap::Parser;
use kofi_webhook::{Config, Dispatcher, Event, EventKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(about = "Log Ko-fi webhook notifications as they arrive")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "KOFI_CONFIG", default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("info,{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let mut dispatcher = Dispatcher::new(config.webhook.verification_token.clone());
    dispatcher.on(EventKind::Donation, |event| async move {
        if let Event::Donation(donation) = event {
            info!(
                from = %donation.from_name,
                amount = %donation.amount,
                currency = %donation.currency,
                message = %donation.message,
                "donation received"
            );
        }
        Ok(())
    });
    dispatcher.on(EventKind::Global, |event| async move {
        info!(kind = event.kind().registry_key(), "notification received");
        Ok(())
    });

    dispatcher.serve(config.server.to_socket_addrs()).await
}
