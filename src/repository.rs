use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{Account, AccountId, Error, LedgerRepository, Transaction, TransactionId};

#[derive(Default, Debug)]
pub struct InMemoryLedger {
    accounts: BTreeMap<AccountId, Account>,
    ledger: Vec<Transaction>,
    index: HashMap<TransactionId, usize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerRepository for InMemoryLedger {
    fn open_account(&mut self, account: Account) -> Result<(), Error> {
        if self.accounts.contains_key(&account.id) {
            return Err(Error::DuplicateAccount(account.id));
        }
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    fn get_account(&self, account_id: &AccountId) -> Option<&Account> {
        self.accounts.get(account_id)
    }

    fn get_account_mut(&mut self, account_id: &AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(account_id)
    }

    fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    fn record_transaction(&mut self, transaction: Transaction) -> Result<(), Error> {
        match self.index.entry(transaction.id) {
            Entry::Vacant(e) => {
                e.insert(self.ledger.len());
                self.ledger.push(transaction);
                Ok(())
            }
            Entry::Occupied(_) => Err(Error::DuplicateTransaction(transaction.id)),
        }
    }

    fn get_transaction(&self, transaction_id: TransactionId) -> Option<&Transaction> {
        self.index
            .get(&transaction_id)
            .and_then(|&position| self.ledger.get(position))
    }

    fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.ledger.iter()
    }

    fn mark_settled(&mut self, purchase_id: TransactionId, payment_id: TransactionId) {
        if let Some(&position) = self.index.get(&purchase_id) {
            self.ledger[position].settled_by = Some(payment_id);
        }
    }

    fn unsettled_purchases(&self, account_id: &AccountId) -> Vec<&Transaction> {
        let mut purchases: Vec<&Transaction> = self
            .ledger
            .iter()
            .filter(|tx| tx.is_unsettled_purchase() && &tx.account == account_id)
            .collect();
        // stable, so same-day purchases keep their recording order
        purchases.sort_by_key(|tx| tx.date);
        purchases
    }
}
