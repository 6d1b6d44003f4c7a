use futures::Stream;

use crate::domain::{Account, AccountId, Error, LedgerEvent, Transaction, TransactionId, Warning};

pub trait EventStream {
    type Events: Stream<Item = Result<LedgerEvent, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::Events;
}

/// Destination for rejected events and non-fatal warnings.
pub trait WarningSink {
    fn reject(&self, error: &Error);

    fn warn(&self, warning: &Warning);
}

pub trait LedgerRepository {
    fn open_account(&mut self, account: Account) -> Result<(), Error>;

    fn get_account(&self, account_id: &AccountId) -> Option<&Account>;

    fn get_account_mut(&mut self, account_id: &AccountId) -> Option<&mut Account>;

    /// Accounts ordered by id.
    fn accounts(&self) -> impl Iterator<Item = &Account>;

    fn record_transaction(&mut self, transaction: Transaction) -> Result<(), Error>;

    fn get_transaction(&self, transaction_id: TransactionId) -> Option<&Transaction>;

    /// Transactions in the order they were recorded.
    fn transactions(&self) -> impl Iterator<Item = &Transaction>;

    fn mark_settled(&mut self, purchase_id: TransactionId, payment_id: TransactionId);

    /// Unsettled purchases on `account_id`, oldest first.
    fn unsettled_purchases(&self, account_id: &AccountId) -> Vec<&Transaction>;
}
