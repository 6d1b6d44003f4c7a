use chrono::NaiveDate;

use crate::domain::{
    AccountId, AccountKind, Money, SharedSplit, Transaction, TransactionId, TransactionKind,
};

/// One input record for the reconciler.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    Open(OpenAccount),
    Post(Posting),
}

#[derive(Debug, Clone)]
pub struct OpenAccount {
    pub account: AccountId,
    pub kind: AccountKind,
    pub label: String,
    pub opening_balance: Money,
}

#[derive(Debug, Clone)]
pub enum PostingKind {
    Income,
    Expense,
    Purchase,
    /// An empty `settles` lets the reconciler pick the oldest open purchases.
    Payment {
        from: AccountId,
        settles: Vec<TransactionId>,
    },
    Transfer {
        from: AccountId,
    },
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub tx: TransactionId,
    pub kind: PostingKind,
    pub account: AccountId,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    /// Participants an expense or refund is split between.
    pub shared: Vec<SharedSplit>,
}

impl Posting {
    pub fn into_transaction(self, kind: TransactionKind) -> Transaction {
        let counter_account = match self.kind {
            PostingKind::Payment { from, .. } | PostingKind::Transfer { from } => Some(from),
            _ => None,
        };

        Transaction {
            id: self.tx,
            kind,
            account: self.account,
            counter_account,
            amount: self.amount,
            date: self.date,
            category: self.category,
            is_credit_card_purchase: kind == TransactionKind::Purchase,
            settled_by: None,
            settles: Vec::new(),
            shared: self.shared,
        }
    }
}

impl core::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LedgerEvent::Open(open) => write!(
                f,
                "Open {},account={},opening={}",
                open.kind, open.account, open.opening_balance
            ),
            LedgerEvent::Post(posting) => write!(
                f,
                "{:?},tx={},account={},amount={}",
                posting.kind, posting.tx, posting.account, posting.amount
            ),
        }
    }
}
