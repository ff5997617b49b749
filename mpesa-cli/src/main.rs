//! M-Pesa Relay CLI
//!
//! Command-line interface for the payment relay API.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mpesa_client::{RelayClient, simulated_callback};
use mpesa_types::Msisdn;

#[derive(Parser)]
#[command(name = "mpesa")]
#[command(author, version, about = "M-Pesa payment relay CLI client", long_about = None)]
struct Cli {
    /// Base URL of the relay API
    #[arg(long, env = "RELAY_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Prompt a phone for payment (STK push)
    Push {
        /// Phone number in 2547XXXXXXXX format
        #[arg(long, value_parser = parse_phone)]
        phone: Msisdn,
        /// Amount in whole shillings
        #[arg(long)]
        amount: i64,
    },
    /// Show whether a phone has paid
    Status {
        #[arg(long, value_parser = parse_phone)]
        phone: Msisdn,
    },
    /// Poll until a phone has paid or the timeout expires
    Wait {
        #[arg(long, value_parser = parse_phone)]
        phone: Msisdn,
        /// Seconds between polls
        #[arg(long, default_value = "5")]
        interval_secs: u64,
        /// Give up after this many seconds
        #[arg(long, default_value = "120")]
        timeout_secs: u64,
    },
    /// Post a synthetic gateway callback (local development)
    SimulateCallback {
        #[arg(long, value_parser = parse_phone)]
        phone: Msisdn,
        #[arg(long)]
        amount: i64,
        /// 0 for a completed payment; e.g. 1032 for a cancelled one
        #[arg(long, default_value = "0")]
        result_code: i64,
    },
}

fn parse_phone(s: &str) -> Result<Msisdn> {
    Msisdn::parse(s).map_err(|e| anyhow::anyhow!("{}: {} (expected 2547XXXXXXXX)", e, s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = RelayClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Push { phone, amount } => {
            let response = client.stk_push(phone.as_ref(), amount).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Status { phone } => {
            let status = client.check_payment(phone.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Commands::Wait {
            phone,
            interval_secs,
            timeout_secs,
        } => {
            println!("Waiting for payment from {} ...", phone);
            let paid = client
                .wait_until_paid(
                    phone.as_ref(),
                    Duration::from_secs(interval_secs.max(1)),
                    Duration::from_secs(timeout_secs),
                )
                .await?;
            if paid {
                println!("✓ Payment received from {}", phone);
            } else {
                println!("✗ No payment from {} within {}s", phone, timeout_secs);
                std::process::exit(1);
            }
        }

        Commands::SimulateCallback {
            phone,
            amount,
            result_code,
        } => {
            let body = simulated_callback(phone.as_ref(), amount, result_code);
            let ack = client.send_callback(&body).await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);
        }
    }

    Ok(())
}
