use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{LedgerRepository, Money, Transaction, TransactionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedBalance {
    pub participant: String,
    /// Negative when refunds outweigh what the participant was charged.
    pub owed: Money,
}

fn add_share(allocations: &mut Vec<(String, Money)>, name: &str, share: Money) {
    match allocations.iter_mut().find(|(known, _)| known == name) {
        Some((_, total)) => *total += share,
        None => allocations.push((name.to_string(), share)),
    }
}

/// Per-participant shares of a shared transaction, in the order the
/// participants were first named.
///
/// Explicit shares are taken as given (sign dropped). What they leave of the
/// amount is split evenly between the participants without one, and the last
/// of them absorbs the rounding remainder. When the explicit shares already
/// cover the amount the others get nothing.
pub fn allocations(tx: &Transaction) -> Vec<(String, Money)> {
    let mut allocations = Vec::new();
    let mut unspecified = Vec::new();
    for split in &tx.shared {
        let name = split.name.trim();
        if name.is_empty() {
            continue;
        }
        match split.amount {
            Some(share) => add_share(&mut allocations, name, share.abs()),
            None => unspecified.push(name),
        }
    }

    let specified: Money = allocations.iter().map(|(_, share)| *share).sum();
    let remaining = tx
        .amount
        .checked_sub(specified)
        .filter(Money::is_positive)
        .unwrap_or(Money::ZERO);

    let base = remaining.split(unspecified.len());
    let mut distributed = Money::ZERO;
    for (position, name) in unspecified.iter().enumerate() {
        let share = if position + 1 == unspecified.len() {
            (remaining - distributed).max(Money::ZERO)
        } else {
            distributed += base;
            base
        };
        add_share(&mut allocations, name, share);
    }
    allocations
}

fn normalized(filter: Option<&str>) -> Option<String> {
    filter
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

/// What each participant owes across shared expenses. Expenses and card
/// purchases add to the total, income on a shared row is a refund and takes
/// from it. Both filters are case-insensitive; participants who end up even
/// are left out.
pub fn summarize<R: LedgerRepository>(
    repository: &R,
    participant: Option<&str>,
    category: Option<&str>,
) -> Vec<SharedBalance> {
    let participant = normalized(participant);
    let category = normalized(category);

    let mut owed: BTreeMap<String, Money> = BTreeMap::new();
    for tx in repository.transactions().filter(|tx| !tx.shared.is_empty()) {
        let refund = match tx.kind {
            TransactionKind::Expense | TransactionKind::Purchase => false,
            TransactionKind::Income => true,
            TransactionKind::Payment | TransactionKind::Transfer => continue,
        };
        if category
            .as_ref()
            .is_some_and(|category| tx.category.trim().to_lowercase() != *category)
        {
            continue;
        }

        for (name, share) in allocations(tx) {
            if participant
                .as_ref()
                .is_some_and(|participant| name.to_lowercase() != *participant)
            {
                continue;
            }
            let total = owed.entry(name).or_default();
            if refund {
                *total -= share;
            } else {
                *total += share;
            }
        }
    }

    owed.into_iter()
        .filter(|(_, owed)| *owed != Money::ZERO)
        .map(|(participant, owed)| SharedBalance { participant, owed })
        .collect()
}
