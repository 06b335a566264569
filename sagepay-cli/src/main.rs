//! Sage Pay Direct command-line harness.
//!
//! Sends a single purchase or 3-D Secure completion to the gateway described
//! by a TOML configuration file and prints the outcome.
//!
//! Exit codes: 0 approved, 1 not approved (declined, rejected or 3-D Secure
//! required), 2 error.

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

mod observability;

use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sagepay_direct::{
    GatewayClient, GatewayConfig, GatewayResult, Result,
    client::generate_unique_id,
    models::{Address, Card, PurchaseOptions},
};
use tracing::{error, info};

use crate::observability::{LogFormat, init_observability};

#[derive(Parser, Debug)]
#[command(name = "sagepay-cli", version)]
#[command(about = "Exercise a Sage Pay Direct merchant account", long_about = None)]
struct Cli {
    /// Gateway configuration file
    #[arg(long, short, global = true, value_name = "TOML", default_value = "sagepay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Charge a card
    Purchase(PurchaseArgs),
    /// Complete a 3-D Secure authentication
    #[command(name = "complete-3d")]
    Complete3d(Complete3dArgs),
}

#[derive(Args, Debug)]
struct PurchaseArgs {
    /// Amount, e.g. 7.99
    #[arg(long)]
    amount: Decimal,

    /// Card number
    #[arg(long)]
    card_number: String,

    /// Expiry month (1-12)
    #[arg(long)]
    month: u32,

    /// Expiry year (four digits)
    #[arg(long)]
    year: i32,

    /// Card verification value
    #[arg(long)]
    cvv: String,

    /// Card brand: visa, master, maestro, american_express, diners_club, jcb
    #[arg(long, default_value = "visa")]
    brand: String,

    /// Billing name, e.g. "Cosmo Kramer"
    #[arg(long)]
    name: String,

    /// Name printed on the card (defaults to the billing name)
    #[arg(long)]
    card_holder: Option<String>,

    /// Billing address line 1
    #[arg(long)]
    address1: String,

    /// Billing address line 2
    #[arg(long)]
    address2: Option<String>,

    /// Billing city
    #[arg(long)]
    city: String,

    /// Billing postal code
    #[arg(long)]
    zip: String,

    /// Billing country (ISO 3166-1 alpha-2)
    #[arg(long)]
    country: String,

    /// Billing state or county
    #[arg(long)]
    state: Option<String>,

    /// Order description
    #[arg(long)]
    description: Option<String>,

    /// Vendor transaction code (generated when omitted)
    #[arg(long)]
    order_id: Option<String>,

    /// Currency override
    #[arg(long)]
    currency: Option<String>,

    /// Customer IP address
    #[arg(long)]
    ip: Option<String>,
}

#[derive(Args, Debug)]
struct Complete3dArgs {
    /// MD value returned by the purchase
    #[arg(long)]
    md: String,

    /// PARes value posted back by the issuer
    #[arg(long)]
    pa_res: String,
}

impl PurchaseArgs {
    fn into_purchase(self) -> (Decimal, Card, PurchaseOptions) {
        let card = Card {
            holder_name: self.card_holder.unwrap_or_else(|| self.name.clone()),
            number: self.card_number,
            expiry_month: self.month,
            expiry_year: self.year,
            verification_value: self.cvv,
            brand: self.brand,
        };

        let address = Address {
            name: self.name,
            line1: self.address1,
            line2: self.address2,
            city: self.city,
            state: self.state,
            postal_code: self.zip,
            country: self.country,
        };

        let order_id = self.order_id.unwrap_or_else(|| format!("REF{}", generate_unique_id()));

        let options = PurchaseOptions {
            order_id: Some(order_id),
            description: self.description,
            currency: self.currency,
            billing_address: Some(address),
            delivery_address: None,
            client_ip: self.ip,
        };

        (self.amount, card, options)
    }
}

async fn run(cli: Cli) -> Result<GatewayResult> {
    let config = GatewayConfig::from_file(&cli.config)?;
    info!(
        config = %cli.config.display(),
        environment = %config.merchant.environment,
        "loaded gateway configuration"
    );

    let client = GatewayClient::new(config)?;

    match cli.command {
        Command::Purchase(args) => {
            let (amount, card, options) = args.into_purchase();
            client.purchase(amount, &card, &options).await
        }
        Command::Complete3d(args) => client.complete_authentication(&args.md, &args.pa_res).await,
    }
}

fn report(result: &GatewayResult) {
    println!("{}", result.message);
    println!("success: {}", result.success);
    if result.test {
        println!("mode: test");
    }

    if let Some(challenge) = result.three_d_secure() {
        println!("3-D Secure required");
        println!("ACSURL: {}", challenge.acs_url);
        println!("MD: {}", challenge.md);
        println!("PAReq: {}", challenge.pa_req);
    }

    if let Some(ref token) = result.authorization
        && let Ok(blob) = token.to_blob()
    {
        println!("authorization: {blob}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_observability(LogFormat::from_env());

    let cli = Cli::parse();

    match run(cli).await {
        Ok(result) => {
            report(&result);
            if result.success { ExitCode::SUCCESS } else { ExitCode::from(1) }
        }
        Err(e) => {
            error!(error = %e, "gateway call failed");
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
