use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

/// Statement day used by most cards the ledger was written for.
pub const DEFAULT_STATEMENT_DAY: u32 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Balance of every account
    Balances,
    /// Asset and liability totals and net worth
    NetWorth,
    /// Spending per category, payments excluded
    Categories,
    /// Outstanding card debt and the part of it already billed
    Debt,
    /// What each participant owes for shared expenses
    Shared,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Reconciles ledger events into net-worth-correct balances", long_about = None)]
pub struct Config {
    /// CSV file of ledger events
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = ReportKind::Balances)]
    pub report: ReportKind,

    /// Day of month on which a card billing cycle starts
    #[arg(long, default_value_t = DEFAULT_STATEMENT_DAY, value_parser = clap::value_parser!(u32).range(1..=28))]
    pub statement_day: u32,

    /// Date the debt report is computed for, defaults to the latest transaction
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Limits the shared report to one participant
    #[arg(long)]
    pub participant: Option<String>,

    /// Limits the shared report to one category
    #[arg(long)]
    pub category: Option<String>,
}
