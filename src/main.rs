use std::io;
use std::process::ExitCode;

use bank_rails::account::{self, Alphabet, RandomAccounts};
use bank_rails::config::Settings;
use bank_rails::gateway::{HttpGateway, PaymentClient};
use bank_rails::routing::{self, HttpDirectory, RoutingCache, RoutingResolver};
use bank_rails::trend::StaticTrend;
use bank_rails::{Allocator, Amount, RoutingNumber, report};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate an account number
    Generate {
        #[arg(long, default_value_t = account::DEFAULT_LENGTH)]
        length: usize,

        /// Letters and digits, without a check digit
        #[arg(long)]
        alphanumeric: bool,
    },
    /// Check a routing number's checksum
    Validate { routing_number: String },
    /// Resolve a bank name to its routing number
    Routing { bank_name: String },
    /// Pay a single beneficiary
    Spend {
        amount: f64,

        #[arg(long, default_value = "")]
        description: String,

        /// Beneficiary account; generated when omitted
        #[arg(long)]
        account: Option<String>,
    },
    /// Split a total across the allocation buckets and pay each one
    Allocate {
        total: f64,

        #[arg(long, default_value = "")]
        description: String,
    },
    /// Query a payment's status
    Status { transaction_id: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let Cli { settings, command } = Cli::parse();

    match command {
        Command::Generate {
            length,
            alphanumeric,
        } => {
            let alphabet = if alphanumeric {
                Alphabet::Alphanumeric
            } else {
                Alphabet::Numeric
            };
            let account = account::generate(length, alphabet).into_diagnostic()?;
            println!("{account}");
        }
        Command::Validate { routing_number } => {
            if !routing::validate(&routing_number) {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
            println!("valid");
        }
        Command::Routing { bank_name } => {
            let routing = resolver(&settings)?
                .resolve(&bank_name)
                .await
                .into_diagnostic()?;
            println!("{routing}");
        }
        Command::Spend {
            amount,
            description,
            account,
        } => {
            let allocator = allocator(&settings).await?;
            let response = allocator
                .spend_for_beneficiary(Amount::from_float(amount), &description, account.as_deref())
                .await;
            match response {
                Some(response) => {
                    let receipt = response.into_diagnostic()?;
                    println!("{},{}", receipt.transaction_id, receipt.status);
                }
                None => bail!("no account number could be generated for the beneficiary"),
            }
        }
        Command::Allocate { total, description } => {
            let allocator = allocator(&settings).await?;
            let plan = allocator
                .allocate_and_spend(Amount::from_float(total), &description)
                .await;
            report::write_plan(io::stdout().lock(), &plan).into_diagnostic()?;
            info!("{}", report::summary(&plan));
        }
        Command::Status { transaction_id } => {
            let status = payments(&settings)?
                .get_status(&transaction_id)
                .await
                .into_diagnostic()?;
            println!("{},{}", status.transaction_id, status.status);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolver(settings: &Settings) -> Result<RoutingResolver<HttpDirectory>> {
    let directory =
        HttpDirectory::new(&settings.directory_url, settings.http_timeout()).into_diagnostic()?;
    let cache = RoutingCache::new(&settings.cache_path, settings.cache_ttl());
    Ok(RoutingResolver::new(directory, cache, settings.lookup_retry()))
}

fn payments(settings: &Settings) -> Result<PaymentClient<HttpGateway>> {
    let gateway = HttpGateway::new(
        &settings.gateway_url,
        settings.gateway_token.clone(),
        settings.http_timeout(),
    )
    .into_diagnostic()?;
    Ok(PaymentClient::new(gateway, settings.payment_retry()))
}

/// Routing number of the configured bank, or the configured fallback.
async fn payment_routing(settings: &Settings) -> Result<RoutingNumber> {
    match resolver(settings)?.resolve(&settings.bank_name).await {
        Ok(routing) => Ok(routing),
        Err(e) => {
            warn!(
                bank = %settings.bank_name,
                fallback = %settings.fallback_routing,
                reason = %e,
                "using fallback routing number"
            );
            Ok(settings.fallback_routing.clone())
        }
    }
}

async fn allocator(settings: &Settings) -> Result<Allocator<HttpGateway, StaticTrend>> {
    let routing = payment_routing(settings).await?;
    let accounts = RandomAccounts {
        length: settings.account_length,
        alphabet: Alphabet::Numeric,
    };
    Ok(
        Allocator::new(payments(settings)?, StaticTrend(settings.trend_signal), routing)
            .with_accounts(accounts)
            .with_symbol(&settings.trend_symbol),
    )
}
