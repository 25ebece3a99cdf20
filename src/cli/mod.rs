//! Command line interface.
//!
//! Each invocation runs one command against the persisted record set:
//! settings are loaded, the tracker restores its snapshot, the command runs,
//! and the tracker saves on the way out.

/// Text rendering for command output
pub mod format;

use crate::{
    config::{
        DEFAULT_CONFIG_PATH, Settings, database::get_database_url, load_settings_or_default,
    },
    core::{
        ExpiryStatus, NetworkType, ProductId, ProductInput, ProductRecord, SearchColumn,
        SimProvider,
        analytics::{self, UNCATEGORIZED},
        search::search,
    },
    errors::{Error, Result},
    store::{DatabaseStore, SnapshotStore},
    tracker::Tracker,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::{fmt::Write, path::PathBuf};
use tracing::{info, instrument};

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "product-tracker")]
#[command(about = "Track installed product units and their subscription renewals")]
#[command(version)]
pub struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Database connection URL (overrides `DATABASE_URL`)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Action to run
    #[command(subcommand)]
    pub command: Command,
}

/// One action per invocation.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products, optionally filtered by a search term
    List {
        /// Case-insensitive substring to look for
        #[arg(long, default_value = "")]
        term: String,

        /// Field to search in (camelCase name), or "all"
        #[arg(long, default_value_t = SearchColumn::All)]
        column: SearchColumn,
    },

    /// Show every field of one product
    Show {
        /// Product id
        id: ProductId,
    },

    /// Register a new product unit
    Add(ProductArgs),

    /// Edit a product; fields not given keep their current value
    Update {
        /// Product id
        id: ProductId,

        /// Fields to change
        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Remove a product
    Delete {
        /// Product id
        id: ProductId,
    },

    /// Replace all products with the rows of a CSV file
    Import {
        /// CSV file with a header row of field names
        file: PathBuf,
    },

    /// Write all products to a dated CSV file
    Export {
        /// Target directory (defaults to `export_dir` from settings)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Headline counts and renewal alerts
    Dashboard,

    /// Products whose subscription has lapsed
    Expired,

    /// Industry, network and SIM provider breakdowns
    Analytics,

    /// Per-client summaries
    Clients {
        /// Only this client
        #[arg(long)]
        name: Option<String>,
    },

    /// SIM card inventory
    Sims {
        /// Inventory action
        #[command(subcommand)]
        action: SimCommand,
    },
}

/// Actions on the SIM inventory.
#[derive(Debug, Subcommand)]
pub enum SimCommand {
    /// List SIMs in inventory order
    List {
        /// Only SIMs still in stock
        #[arg(long)]
        available: bool,
    },

    /// Stock a new SIM
    Add {
        /// SIM number
        sim_number: String,

        /// VI or AIRTEL
        #[arg(long, default_value_t = SimProvider::Vi)]
        provider: SimProvider,

        /// Tariff or plan details
        #[arg(long)]
        plan: Option<String>,
    },
}

/// Product fields as command line flags. All optional, so the same set serves
/// both `add` (missing fields are reported by validation) and `update`.
#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    /// Unit serial number
    #[arg(long)]
    pub serial_number: Option<String>,
    /// Manufacturer serial number
    #[arg(long)]
    pub oem_serial_number: Option<String>,
    /// Product name
    #[arg(long)]
    pub product_name: Option<String>,
    /// Model
    #[arg(long)]
    pub model: Option<String>,
    /// Device UID
    #[arg(long = "device-uid")]
    pub device_uid: Option<String>,
    /// 2G or 4G
    #[arg(long)]
    pub network_type: Option<NetworkType>,
    /// Cable length
    #[arg(long)]
    pub cable_length: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub installation_date: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub activation_date: Option<NaiveDate>,
    /// Subscription length in months
    #[arg(long)]
    pub validity_period: Option<u32>,
    /// VI or AIRTEL
    #[arg(long)]
    pub sim_provider: Option<SimProvider>,
    /// SIM number
    #[arg(long)]
    pub sim_number: Option<String>,
    /// Channel partner
    #[arg(long)]
    pub channel_partner: Option<String>,
    /// Client (end user)
    #[arg(long)]
    pub end_user_name: Option<String>,
    /// Industry category
    #[arg(long)]
    pub industry_category: Option<String>,
}

impl ProductArgs {
    /// Overlays the flags that were given onto `base`.
    ///
    /// An empty string clears an optional text field (normalization turns it
    /// into "absent").
    #[must_use]
    pub fn apply(self, mut base: ProductInput) -> ProductInput {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fn set_some<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut base.serial_number, self.serial_number);
        set_some(&mut base.oem_serial_number, self.oem_serial_number);
        set(&mut base.product_name, self.product_name);
        set_some(&mut base.model, self.model);
        set(&mut base.device_uid, self.device_uid);
        set(&mut base.network_type, self.network_type);
        set_some(&mut base.cable_length, self.cable_length);
        set_some(&mut base.installation_date, self.installation_date);
        set_some(&mut base.activation_date, self.activation_date);
        set_some(&mut base.validity_period, self.validity_period);
        set(&mut base.sim_provider, self.sim_provider);
        set_some(&mut base.sim_number, self.sim_number);
        set_some(&mut base.channel_partner, self.channel_partner);
        set(&mut base.end_user_name, self.end_user_name);
        set(&mut base.industry_category, self.industry_category);
        base
    }
}

/// Runs one CLI invocation end to end against the configured database.
///
/// The tracker is torn down even when the command fails, so the snapshot on
/// disk always matches what was last held in memory.
///
/// # Errors
/// Returns configuration, database or command errors.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings_or_default(&cli.config)?;
    let database_url = cli.database_url.unwrap_or_else(get_database_url);

    let store = DatabaseStore::connect(&database_url, settings.collection_name.as_str())
        .await?
        .with_sim_collection(settings.sim_collection_name.as_str());
    let mut tracker = Tracker::init(store).await?;

    let today = Local::now().date_naive();
    let outcome = execute(cli.command, &mut tracker, &settings, today).await;
    tracker.teardown().await?;

    print!("{}", outcome?);
    Ok(())
}

/// Executes `command` against `tracker` and returns the text to show.
///
/// # Errors
/// Returns whatever the underlying tracker operation returns.
#[instrument(skip(tracker, settings))]
pub async fn execute<S: SnapshotStore>(
    command: Command,
    tracker: &mut Tracker<S>,
    settings: &Settings,
    today: NaiveDate,
) -> Result<String> {
    let window = settings.expiring_soon_days;

    let output = match command {
        Command::List { term, column } => {
            format::format_record_table(search(tracker.records(), &term, column), today, window)?
        }
        Command::Show { id } => match tracker.repository().get(id) {
            Some(record) => format::format_record_detail(record)?,
            None => return Err(Error::ProductNotFound { id }),
        },
        Command::Add(fields) => {
            let record = tracker.create(fields.apply(ProductInput::default())).await?;
            format!("Added product #{} ({})\n", record.id, record.serial_number)
        }
        Command::Update { id, fields } => {
            let base = tracker
                .repository()
                .get(id)
                .cloned()
                .map(|record| record.into_input())
                .unwrap_or_default();
            let record = tracker.update(id, fields.apply(base)).await?;
            let renewal = record
                .renewal_date
                .map_or_else(|| "-".to_string(), |date| date.to_string());
            format!("Updated product #{} (renews {renewal})\n", record.id)
        }
        Command::Delete { id } => {
            let record = tracker.delete(id).await?;
            format!("Deleted product #{} ({})\n", record.id, record.serial_number)
        }
        Command::Import { file } => {
            let count = tracker.import_file(&file).await?;
            format!("Imported {count} products from {}\n", file.display())
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| settings.export_dir.clone());
            let path = tracker.export_file(&dir, today).await?;
            info!(path = %path.display(), "Exported product records");
            format!("Exported {} products to {}\n", tracker.records().len(), path.display())
        }
        Command::Dashboard => dashboard(tracker.records(), today, window)?,
        Command::Expired => expired(tracker.records(), today)?,
        Command::Analytics => analytics_report(tracker.records())?,
        Command::Clients { name } => match name {
            Some(name) => {
                format::format_rollup(&analytics::client_rollup(tracker.records(), &name, today))
            }
            None => analytics::client_rollups(tracker.records(), today)
                .iter()
                .map(format::format_rollup)
                .collect(),
        },
        Command::Sims { action } => match action {
            SimCommand::List { available: true } => {
                format::format_sim_table(tracker.repository().sims().available())?
            }
            SimCommand::List { available: false } => {
                format::format_sim_table(tracker.repository().sims().snapshot())?
            }
            SimCommand::Add {
                sim_number,
                provider,
                plan,
            } => {
                let sim = tracker.add_sim(&sim_number, provider, plan, today).await?;
                format!("Added SIM {} ({})\n", sim.sim_number, sim.provider)
            }
        },
    };

    Ok(output)
}

fn dashboard(records: &[ProductRecord], today: NaiveDate, window: i64) -> Result<String> {
    let mut out = format::format_status_summary(&analytics::status_summary(records, today, window));
    let alerts = format::format_alerts(analytics::expiring_records(records, today, window), today)?;
    if !alerts.is_empty() {
        out.push_str("\nRenewal alerts:\n");
        out.push_str(&alerts);
    }
    Ok(out)
}

fn expired(records: &[ProductRecord], today: NaiveDate) -> Result<String> {
    let lapsed = analytics::expired_records(records, today);
    let count = lapsed.clone().count();
    if count == 0 {
        return Ok("No expired products.\n".to_string());
    }

    let mut out = format!("{count} expired products:\n");
    out.push_str(&format::format_alerts(
        lapsed.map(|record| (record, ExpiryStatus::Expired)),
        today,
    )?);
    Ok(out)
}

fn analytics_report(records: &[ProductRecord]) -> Result<String> {
    let total = records.len();
    let mut out = format!("Industry distribution ({total} products):\n");
    out.push_str(&format::format_distribution(
        &analytics::industry_distribution(records),
        total,
    )?);

    let networks = [NetworkType::TwoG, NetworkType::FourG].map(|network| {
        let count = analytics::count_by_network_type(records, &network);
        (network.to_string(), count)
    });
    out.push_str("\nNetwork type:\n");
    out.push_str(&format::format_distribution(&networks, total)?);

    let providers = [SimProvider::Vi, SimProvider::Airtel].map(|provider| {
        let count = analytics::count_by_sim_provider(records, &provider);
        (provider.to_string(), count)
    });
    out.push_str("\nSIM provider:\n");
    out.push_str(&format::format_distribution(&providers, total)?);

    let uncategorized = analytics::industry_distribution(records)
        .into_iter()
        .find_map(|(label, count)| (label == UNCATEGORIZED).then_some(count))
        .unwrap_or(0);
    writeln!(out, "\nClients: {}", analytics::clients(records).len())?;
    writeln!(out, "Missing industry category: {uncategorized}")?;
    Ok(out)
}
