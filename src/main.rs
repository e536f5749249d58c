mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use loopia_dns::{Client, DomainBreakdown, PublicSuffixList, Record};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "loopia-dns")]
#[command(about = "Manage Loopia DNS zone records over the XML-RPC API")]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The Loopia API username (overrides the config file)
    #[arg(long)]
    username: Option<String>,

    /// The Loopia API password (overrides the config file)
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a TXT record
    AddTxt {
        /// The domain for which to add a record
        #[arg(long)]
        domain: String,
        /// The TXT record content
        #[arg(long)]
        record: String,
    },
    /// Add a record of any type
    Add {
        #[arg(long)]
        domain: String,
        #[arg(long = "type")]
        record_type: String,
        #[arg(long)]
        rdata: String,
        /// TTL in seconds; 0 means the default of 3600
        #[arg(long, default_value_t = 0)]
        ttl: i64,
        #[arg(long, default_value_t = 0)]
        priority: i64,
    },
    /// Remove a record by id
    Remove {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        id: i64,
    },
    /// List the records of a domain as JSON
    List {
        #[arg(long)]
        domain: String,
    },
    /// Remove a subdomain and all of its records
    RemoveSubdomain {
        #[arg(long)]
        domain: String,
    },
}

impl Command {
    fn domain(&self) -> &str {
        match self {
            Command::AddTxt { domain, .. }
            | Command::Add { domain, .. }
            | Command::Remove { domain, .. }
            | Command::List { domain }
            | Command::RemoveSubdomain { domain } => domain,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_credentials(args.username, args.password);

    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if config.loopia.username.is_empty() {
        bail!("The username is empty.");
    }
    if config.loopia.password.is_empty() {
        bail!("The password is empty.");
    }

    // The library skips empty domains silently, so check here
    let domain = args.command.domain();
    if domain.is_empty() {
        bail!("The domain is empty.");
    }
    if PublicSuffixList.breakdown(domain).is_none() {
        bail!("Invalid domain: {}", domain);
    }

    let client = Client::new(
        config.loopia.username.as_str(),
        config.loopia.password.as_str(),
        Duration::from_secs(config.loopia.timeout_secs),
    )
    .context("Failed to build HTTP client")?
    .with_endpoint(config.loopia.endpoint.as_str());

    info!("Using endpoint {}", client.endpoint());

    match &args.command {
        Command::AddTxt { domain, record } => {
            client
                .add_record(&Record::txt(record.as_str()), domain)
                .await
                .with_context(|| format!("Failed to add TXT record to {}", domain))?;
        }
        Command::Add {
            domain,
            record_type,
            rdata,
            ttl,
            priority,
        } => {
            let record = Record {
                ttl: *ttl,
                priority: *priority,
                ..Record::new(record_type.as_str(), rdata.as_str())
            };
            client
                .add_record(&record, domain)
                .await
                .with_context(|| format!("Failed to add {} record to {}", record_type, domain))?;
        }
        Command::Remove { domain, id } => {
            client
                .remove_record(domain, *id)
                .await
                .with_context(|| format!("Failed to remove record {} from {}", id, domain))?;
        }
        Command::List { domain } => {
            let records = client
                .get_records(domain)
                .await
                .with_context(|| format!("Failed to list records of {}", domain))?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::RemoveSubdomain { domain } => {
            client
                .remove_subdomain(domain)
                .await
                .with_context(|| format!("Failed to remove subdomain {}", domain))?;
        }
    }

    Ok(())
}
