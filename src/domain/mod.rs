pub mod account;
pub mod error;
pub mod event;
pub mod money;
pub mod traits;
pub mod transaction;
pub mod warning;

pub use account::{Account, AccountId, AccountKind};
pub use error::Error;
pub use event::{LedgerEvent, OpenAccount, Posting, PostingKind};
pub use money::Money;
pub use traits::{EventStream, LedgerRepository, WarningSink};
pub use transaction::{SharedSplit, Transaction, TransactionId, TransactionKind};
pub use warning::Warning;
