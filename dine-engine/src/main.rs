//! `dine` - operator CLI for the dine-in order engine
//!
//! Every command hydrates the table from the backend, runs one operation and
//! prints the result as JSON. Refusals print a notice and exit non-zero.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dine_client::{ClientConfig, DineBackend, HttpBackend};
use dine_engine::logger::init_logger;
use dine_engine::{Action, EngineConfig, EngineError, TableEngine};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::request::{CloseOptions, Payment};
use shared::{AdvanceTarget, DraftItem, IdempotencyKey, ItemId, TableId};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dine")]
#[command(about = "Wave-based dine-in order orchestration")]
struct Cli {
    /// Table to operate on
    #[arg(long, short, env = "DINE_TABLE_ID", global = true)]
    table: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seat a party (get-or-create the table's session)
    Seat {
        #[arg(long, default_value_t = 2)]
        guests: u32,
        /// Reuse when retrying the same seating
        #[arg(long)]
        key: Option<String>,
    },

    /// Order one menu item
    Order {
        menu_item: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        seat: Option<u32>,
        #[arg(long)]
        wave: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        key: Option<String>,
    },

    /// Fire a wave (defaults to the next fireable wave)
    Fire {
        #[arg(long)]
        wave: Option<u32>,
    },

    /// Advance a wave one stage
    Advance {
        wave: u32,
        #[arg(long, value_enum)]
        to: Stage,
    },

    /// Mark one item served
    Serve { item: String },

    /// Void one item
    Void {
        item: String,
        #[arg(long, default_value = "voided by operator")]
        reason: String,
    },

    /// Show meal progress and bill
    Progress,

    /// Add a seat
    AddSeat,

    /// Remove an empty seat
    RemoveSeat { seat: u32 },

    /// Renumber a seat
    RenameSeat { seat: u32, new_seat: u32 },

    /// Open the next wave
    AddWave,

    /// Remove the last (empty) wave
    RemoveWave { wave: u32 },

    /// Pay and close the session
    Close {
        amount: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO)]
        tip: Decimal,
        #[arg(long, default_value = "card")]
        method: String,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        key: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Stage {
    Cooking,
    Ready,
    Served,
}

impl From<Stage> for AdvanceTarget {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Cooking => AdvanceTarget::Cooking,
            Stage::Ready => AdvanceTarget::Ready,
            Stage::Served => AdvanceTarget::Served,
        }
    }
}

impl Commands {
    fn action(&self) -> Option<Action> {
        Some(match self {
            Commands::Seat { .. } => Action::SeatParty,
            Commands::Order { .. } => Action::SubmitItems,
            Commands::Fire { .. } => Action::FireWave,
            Commands::Advance { .. } => Action::AdvanceWave,
            Commands::Serve { .. } => Action::ServeItem,
            Commands::Void { .. } => Action::VoidItem,
            Commands::AddSeat => Action::AddSeat,
            Commands::RemoveSeat { .. } => Action::RemoveSeat,
            Commands::RenameSeat { .. } => Action::RenameSeat,
            Commands::AddWave => Action::AddWave,
            Commands::RemoveWave { .. } => Action::RemoveWave,
            Commands::Close { .. } => Action::CloseSession,
            Commands::Progress => return None,
        })
    }
}

fn key_or_new(key: Option<String>) -> IdempotencyKey {
    key.map(|k| IdempotencyKey::from(k.as_str()))
        .unwrap_or_default()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let engine_config = EngineConfig::from_env().without_delay_watch();
    init_logger(
        &engine_config.log_level,
        engine_config.log_json,
        engine_config.log_dir.as_deref(),
    );

    let cli = Cli::parse();
    let table = cli
        .table
        .context("no table given (use --table or DINE_TABLE_ID)")?;

    let client_config = ClientConfig::from_env();
    let backend: Arc<dyn DineBackend> =
        Arc::new(HttpBackend::new(&client_config).context("failed to build HTTP client")?);
    tracing::debug!(api = %client_config.base_url, table = %table, "dine starting");

    let engine = TableEngine::new(TableId::new(table), backend, engine_config);
    let action = cli.command.action();

    if let Err(e) = run(&engine, cli.command).await {
        if let (Some(action), Some(err)) = (action, e.downcast_ref::<EngineError>()) {
            eprintln!("{}", serde_json::to_string_pretty(&err.notice(action))?);
            std::process::exit(1);
        }
        return Err(e);
    }
    Ok(())
}

async fn run(engine: &TableEngine, command: Commands) -> Result<()> {
    // Seating creates the session; everything else starts from backend state
    if !matches!(command, Commands::Seat { .. }) {
        engine.refresh().await?;
    }

    match command {
        Commands::Seat { guests, key } => {
            let session_id = engine.ensure_session(guests, &key_or_new(key)).await?;
            print_json(&serde_json::json!({ "sessionId": session_id }))
        }
        Commands::Order {
            menu_item,
            quantity,
            seat,
            wave,
            notes,
            key,
        } => {
            let mut draft = DraftItem::new(menu_item.as_str()).with_quantity(quantity);
            if let Some(seat) = seat {
                draft = draft.for_seat(seat);
            }
            if let Some(wave) = wave {
                draft = draft.in_wave(wave);
            }
            if let Some(notes) = notes {
                draft = draft.with_notes(notes);
            }
            let outcome = engine.submit_items(vec![draft], &key_or_new(key)).await?;
            print_json(&outcome)
        }
        Commands::Fire { wave } => match wave {
            Some(wave) => print_json(&engine.fire_wave(wave).await?),
            None => print_json(&engine.fire_next_wave().await?),
        },
        Commands::Advance { wave, to } => {
            print_json(&engine.advance_wave(wave, to.into()).await?)
        }
        Commands::Serve { item } => print_json(&engine.mark_item_served(&ItemId::new(item)).await?),
        Commands::Void { item, reason } => {
            print_json(&engine.void_item(&ItemId::new(item), &reason).await?)
        }
        Commands::Progress => print_json(&serde_json::json!({
            "progress": engine.progress(),
            "bill": engine.bill(),
            "waveCount": engine.store().wave_count(),
        })),
        Commands::AddSeat => print_json(&serde_json::json!({ "seat": engine.add_seat()? })),
        Commands::RemoveSeat { seat } => {
            let removed = engine.remove_seat(seat).await?;
            print_json(&serde_json::json!({ "removed": removed.number }))
        }
        Commands::RenameSeat { seat, new_seat } => {
            engine.rename_seat(seat, new_seat).await?;
            print_json(&serde_json::json!({ "seat": new_seat }))
        }
        Commands::AddWave => print_json(&serde_json::json!({ "wave": engine.add_wave().await? })),
        Commands::RemoveWave { wave } => {
            print_json(&serde_json::json!({ "waveCount": engine.remove_last_wave(wave)? }))
        }
        Commands::Close {
            amount,
            tip,
            method,
            force,
            key,
        } => {
            let payment = Payment {
                amount,
                tip_amount: tip,
                method,
            };
            let outcome = engine
                .close_session(payment, CloseOptions { force }, &key_or_new(key))
                .await?;
            print_json(&outcome)
        }
    }
}
