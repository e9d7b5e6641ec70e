//! Brigade operator CLI
//!
//! Runs the promotion engine over named fixture sets: price a basket at a
//! moment in time, preview what a customer would see, or review schedule
//! conflicts across the catalog.

use std::process::ExitCode;

use brigade::{
    conflicts::find_conflicts,
    fixtures::Fixture,
    promotions::Promotion,
    resolver::{preview, resolve},
};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use tabled::{Table, Tabled};

#[derive(Debug, Parser)]
#[command(name = "brigade", about = "Promotion scheduling and discount resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve discounts for the fixture basket at a moment in time
    Price(MomentArgs),

    /// Preview which promotions are live at a moment in time
    Simulate(MomentArgs),

    /// Report scheduling conflicts across the catalog
    Conflicts(SetArgs),
}

#[derive(Debug, Args)]
struct MomentArgs {
    /// Fixture set to load
    #[arg(short, long, default_value = "trattoria")]
    set: String,

    /// Evaluation timestamp, "YYYY-MM-DD HH:MM"
    #[arg(short, long)]
    at: String,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Fixture set to load
    #[arg(short, long, default_value = "trattoria")]
    set: String,
}

#[derive(Debug, Tabled)]
struct ActiveRow {
    #[tabled(rename = "Promotion")]
    name: String,

    #[tabled(rename = "Priority")]
    priority: i32,

    #[tabled(rename = "Stackable")]
    stackable: &'static str,

    #[tabled(rename = "Wins")]
    wins: &'static str,
}

#[derive(Debug, Tabled)]
struct AppliedRow {
    #[tabled(rename = "Promotion")]
    name: String,

    #[tabled(rename = "Discount")]
    discount: String,
}

#[derive(Debug, Tabled)]
struct ConflictRow {
    #[tabled(rename = "Promotion A")]
    first: String,

    #[tabled(rename = "Promotion B")]
    second: String,

    #[tabled(rename = "Days")]
    days: String,

    #[tabled(rename = "Window")]
    window: String,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Price(args) => price(&args),
        Commands::Simulate(args) => simulate(&args),
        Commands::Conflicts(args) => conflicts(&args),
    }
}

fn parse_at(s: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    Ok(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")?)
}

fn price(args: &MomentArgs) -> Result<(), Box<dyn std::error::Error>> {
    let at = parse_at(&args.at)?;
    let fixture = Fixture::from_set(&args.set)?;
    let basket = fixture.basket()?;
    let catalog = fixture.catalog();

    let resolution = resolve(catalog, &basket, at)?;
    let subtotal = basket.subtotal()?;

    let rows: Vec<AppliedRow> = resolution
        .applied
        .iter()
        .map(|applied| AppliedRow {
            name: catalog.name(applied.key).to_string(),
            discount: applied.discount.to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No promotions apply at {at}.");
    } else {
        println!("{}", Table::new(rows));
    }

    let percent = resolution.savings_percent(&subtotal) * rust_decimal::Decimal::from(100u8);

    println!("Subtotal:       {subtotal}");
    println!(
        "Total discount: {} ({}% of subtotal)",
        resolution.total_discount,
        percent.round_dp(1)
    );

    Ok(())
}

fn simulate(args: &MomentArgs) -> Result<(), Box<dyn std::error::Error>> {
    let at = parse_at(&args.at)?;
    let fixture = Fixture::from_set(&args.set)?;
    let catalog = fixture.catalog();

    let preview = preview(catalog, at);

    if preview.active.is_empty() {
        println!("No promotions are live at {at}.");

        return Ok(());
    }

    let rows: Vec<ActiveRow> = preview
        .active
        .iter()
        .map(|key| {
            let promotion = catalog.get(*key);

            ActiveRow {
                name: catalog.name(*key).to_string(),
                priority: promotion.map_or(0, Promotion::priority),
                stackable: if promotion.is_some_and(Promotion::is_stackable) {
                    "yes"
                } else {
                    "no"
                },
                wins: if preview.winning_exclusive == Some(*key) {
                    "yes"
                } else {
                    ""
                },
            }
        })
        .collect();

    println!("{}", Table::new(rows));

    Ok(())
}

fn conflicts(args: &SetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut fixture = Fixture::new();

    fixture.load_menu(&args.set)?.load_catalog(&args.set)?;

    let catalog = fixture.catalog();
    let found = find_conflicts(catalog);

    if found.is_empty() {
        println!("No scheduling conflicts found.");

        return Ok(());
    }

    let rows: Vec<ConflictRow> = found
        .iter()
        .map(|conflict| ConflictRow {
            first: catalog.name(conflict.first).to_string(),
            second: catalog.name(conflict.second).to_string(),
            days: conflict.days.to_string(),
            window: conflict.window.to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("Review priorities so the intended promotion wins when these collide.");

    Ok(())
}
