use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;
use serde::Serialize;

use crate::billing::BillingCycle;
use crate::config::{Config, ReportKind};
use crate::domain::{AccountKind, Error, LedgerRepository, Money};
use crate::shared;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetWorth {
    pub assets: Money,
    pub liabilities: Money,
    pub net_worth: Money,
}

impl NetWorth {
    pub fn of<R: LedgerRepository>(repository: &R) -> Self {
        let mut assets = Money::ZERO;
        let mut liabilities = Money::ZERO;
        for account in repository.accounts() {
            match account.kind {
                AccountKind::Asset => assets += account.balance,
                AccountKind::Liability => liabilities += account.balance,
            }
        }

        Self {
            assets,
            liabilities,
            net_worth: assets - liabilities,
        }
    }
}

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    account: &'a str,
    kind: &'static str,
    label: &'a str,
    opening: Money,
    balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

/// Spending per category. Payments and transfers are not spending, so a
/// card purchase shows up here once even after it has been paid off.
pub fn category_totals<R: LedgerRepository>(repository: &R) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for tx in repository.transactions().filter(|tx| tx.is_spending()) {
        let category = if tx.category.is_empty() {
            UNCATEGORIZED
        } else {
            tx.category.as_str()
        };
        *totals.entry(category).or_default() += tx.amount;
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardDebt {
    pub account: String,
    pub balance: Money,
    /// Purchases no payment has settled yet.
    pub unsettled: Money,
    /// Unsettled purchases made in the cycle containing the as-of date.
    pub current: Money,
    /// Unsettled purchases from earlier cycles.
    pub due: Money,
}

pub fn outstanding_debt<R: LedgerRepository>(
    repository: &R,
    statement_day: u32,
    as_of: Option<NaiveDate>,
) -> Result<Vec<CardDebt>, Error> {
    let as_of = as_of.or_else(|| repository.transactions().map(|tx| tx.date).max());
    let cycle = as_of
        .map(|date| BillingCycle::containing(date, statement_day))
        .transpose()?;

    let mut rows = Vec::new();
    for account in repository
        .accounts()
        .filter(|account| account.kind == AccountKind::Liability)
    {
        let mut row = CardDebt {
            account: account.id.to_string(),
            balance: account.balance,
            unsettled: Money::ZERO,
            current: Money::ZERO,
            due: Money::ZERO,
        };
        for purchase in repository.unsettled_purchases(&account.id) {
            row.unsettled += purchase.amount;
            match cycle {
                Some(cycle) if purchase.date < cycle.start => row.due += purchase.amount,
                Some(cycle) if cycle.contains(purchase.date) => row.current += purchase.amount,
                _ => {}
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Writes the report selected in `config` as CSV.
pub fn write<R, O>(repository: &R, config: &Config, out: O) -> Result<(), Error>
where
    R: LedgerRepository,
    O: io::Write,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    match config.report {
        ReportKind::Balances => {
            writer.write_record(["account", "kind", "label", "opening", "balance"])?;
            for account in repository.accounts() {
                writer.serialize(BalanceRow {
                    account: account.id.as_str(),
                    kind: account.kind.as_str(),
                    label: &account.label,
                    opening: account.opening_balance,
                    balance: account.balance,
                })?;
            }
        }
        ReportKind::NetWorth => {
            writer.write_record(["assets", "liabilities", "net_worth"])?;
            writer.serialize(NetWorth::of(repository))?;
        }
        ReportKind::Categories => {
            writer.write_record(["category", "total"])?;
            for row in category_totals(repository) {
                writer.serialize(row)?;
            }
        }
        ReportKind::Debt => {
            writer.write_record(["account", "balance", "unsettled", "current", "due"])?;
            for row in outstanding_debt(repository, config.statement_day, config.as_of)? {
                writer.serialize(row)?;
            }
        }
        ReportKind::Shared => {
            writer.write_record(["participant", "owed"])?;
            let rows = shared::summarize(
                repository,
                config.participant.as_deref(),
                config.category.as_deref(),
            );
            for row in rows {
                writer.serialize(row)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
