use crate::domain::{AccountId, Money, TransactionId};

/// Non-fatal conditions raised while applying an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A payment pushed a liability below zero.
    Overpayment {
        account: AccountId,
        payment: TransactionId,
        balance: Money,
    },
    /// The purchases a payment names do not add up to the amount paid.
    SettlementMismatch {
        payment: TransactionId,
        paid: Money,
        settled: Money,
    },
}

impl core::fmt::Display for Warning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Warning::Overpayment {
                account,
                payment,
                balance,
            } => write!(
                f,
                "Payment {} overpaid account {}, balance now {}",
                payment, account, balance
            ),
            Warning::SettlementMismatch {
                payment,
                paid,
                settled,
            } => write!(
                f,
                "Payment {} of {} settles purchases totalling {}",
                payment, paid, settled
            ),
        }
    }
}
