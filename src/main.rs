use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_notify::{
    ClientConfig, CoffeeType, HttpOrderGateway, Metrics, NotificationCenter, NotificationKind,
    OrderSubmissionController, Settlement,
};

/// Place a coffee order and report the resulting notifications.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the order backend
    #[arg(long, env = "ORDER_API_URL", default_value = order_notify::config::DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Path of the order endpoint
    #[arg(long, env = "ORDER_API_PATH", default_value = order_notify::config::DEFAULT_ORDER_PATH)]
    order_path: String,

    /// Customer name (letters, digits and hyphens)
    #[arg(long)]
    customer_name: String,

    /// One of: espresso, cappuccino, latte, americano, macchiato, mocha
    #[arg(long)]
    coffee_type: String,

    /// How long notifications stay visible, in milliseconds (0 = until dismissed)
    #[arg(long, env = "ORDER_NOTIFICATION_MS", default_value_t = 5000)]
    notification_ms: u64,

    /// Request timeout in seconds
    #[arg(long, env = "ORDER_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info,order_notify=debug")]
    log_level: String,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --log-level
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = ClientConfig::default()
        .with_api_base_url(args.api_url.clone())
        .with_order_path(args.order_path.clone())
        .with_request_timeout(Duration::from_secs(args.timeout_secs))
        .with_notification_expiry(Duration::from_millis(args.notification_ms));
    config.validate()?;

    tracing::info!(url = %config.order_url(), "Starting order client");

    if args.coffee_type.parse::<CoffeeType>().is_err() {
        tracing::warn!(
            coffee_type = %args.coffee_type,
            "Coffee type is not on the menu; sending it anyway"
        );
    }

    // === 1. Wire components ===
    let metrics = Arc::new(Metrics::new()?);
    let notifications =
        NotificationCenter::new_with_metrics(config.notification_expiry, metrics.clone());
    let gateway = Arc::new(HttpOrderGateway::new(&config)?);
    let controller = OrderSubmissionController::new_with_metrics(
        gateway,
        notifications.clone(),
        metrics.clone(),
    );

    // === 2. Report every notification change ===
    let mut updates = notifications.subscribe();
    let reporter = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let active = updates.borrow_and_update().clone();
            for n in &active {
                match n.kind() {
                    NotificationKind::Success => tracing::info!(id = %n.id(), "✅ {}", n.message()),
                    NotificationKind::Error => tracing::error!(id = %n.id(), "❌ {}", n.message()),
                }
            }
            if active.is_empty() {
                tracing::info!("No active notifications");
            }
        }
    });

    // === 3. Fill the form ===
    controller.set_customer_name(args.customer_name.clone());
    controller.set_item_type(args.coffee_type.to_lowercase());

    let violations = controller.violations();
    for violation in violations.iter() {
        tracing::error!("Invalid order: {}", violation);
    }

    // === 4. Submit ===
    let submitted = controller.submit();
    let was_submitted = submitted.is_some();
    let exit_code = match submitted {
        None => {
            tracing::warn!("Order not submitted");
            2
        }
        Some(handle) => match handle.await? {
            Settlement::Placed(response) => {
                tracing::info!(msg = %response.msg, "Backend confirmed order");
                0
            }
            Settlement::Failed(message) => {
                tracing::error!(error = %message, "Order failed");
                1
            }
        },
    };

    // === 5. Let timed notifications run out ===
    if let Some(wait) = expiry_wait(was_submitted, notifications.default_expiry()) {
        tracing::debug!(wait_ms = wait.as_millis() as u64, "Waiting for notifications to expire");
        tokio::time::sleep(wait).await;
    }
    notifications.clear_all();
    reporter.abort();

    if args.print_metrics {
        println!("{}", metrics.render()?);
    }

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

/// How long to keep running so timed notifications can expire on their own.
/// Nothing was raised when the order was never submitted.
fn expiry_wait(submitted: bool, expiry: Duration) -> Option<Duration> {
    if !submitted || expiry.is_zero() {
        return None;
    }
    Some(expiry + Duration::from_millis(100))
}
