use crate::domain::{AccountId, AccountKind, Money, TransactionId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Account {0} does not exist")]
    UnknownAccount(AccountId),

    #[error("Account {0} already exists")]
    DuplicateAccount(AccountId),

    #[error("Transaction ID {0} already exists")]
    DuplicateTransaction(TransactionId),

    #[error("Account {account} is a {actual} account, expected {expected}")]
    WrongAccountKind {
        account: AccountId,
        expected: AccountKind,
        actual: AccountKind,
    },

    #[error("Transaction {tx} has non-positive amount {amount}")]
    InvalidAmount { tx: TransactionId, amount: Money },

    #[error("Transaction {tx} would take a balance out of range")]
    AmountOverflow { tx: TransactionId },

    #[error("Transfer {0} moves money from an account to itself")]
    SelfTransfer(TransactionId),

    #[error("Payment {payment} cannot settle transaction {purchase}: {reason}")]
    InvalidSettlement {
        payment: TransactionId,
        purchase: TransactionId,
        reason: &'static str,
    },

    #[error("Statement day {0} is outside 1..=28")]
    InvalidStatementDay(u32),
}
