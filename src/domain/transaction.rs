use chrono::NaiveDate;

use crate::domain::{AccountId, Money};

pub type TransactionId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
    Purchase,
    Payment,
    Transfer,
}

/// One participant of a shared expense. Without an amount the participant
/// takes an even part of whatever the explicit shares leave over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSplit {
    pub name: String,
    pub amount: Option<Money>,
}

/// A recorded ledger entry.
///
/// `account` is the account whose balance the entry is booked against: the
/// card for purchases and payments, the receiving account for transfers.
/// `counter_account` is the funding asset of a payment or the source of a
/// transfer.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub account: AccountId,
    pub counter_account: Option<AccountId>,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    pub is_credit_card_purchase: bool,
    pub settled_by: Option<TransactionId>,
    pub settles: Vec<TransactionId>,
    pub shared: Vec<SharedSplit>,
}

impl Transaction {
    pub fn is_unsettled_purchase(&self) -> bool {
        self.is_credit_card_purchase && self.settled_by.is_none()
    }

    pub fn is_spending(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense | TransactionKind::Purchase)
    }
}
