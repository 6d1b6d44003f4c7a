use std::io;

use futures::StreamExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{
    Account, AccountId, AccountKind, Error, EventStream, LedgerEvent, LedgerRepository, Money,
    OpenAccount, Posting, PostingKind, TransactionId, TransactionKind, Warning, WarningSink,
};
use crate::report::{self, NetWorth};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStats {
    pub applied: usize,
    pub rejected: usize,
    pub warnings: usize,
}

/// Applies ledger events so that a card purchase reduces net worth once,
/// when it is made, and the payment settling it moves money without
/// changing net worth.
#[derive(Debug)]
pub struct Reconciler<I, R, W>
where
    I: EventStream,
    R: LedgerRepository,
    W: WarningSink,
{
    ingestion: I,
    repository: R,
    sink: W,
}

impl<I, R, W> Reconciler<I, R, W>
where
    I: EventStream,
    R: LedgerRepository,
    W: WarningSink,
{
    pub fn new(ingestion: I, repository: R, sink: W) -> Self {
        Self {
            ingestion,
            repository,
            sink,
        }
    }

    /// Drains the event stream. Unreadable rows and rejected events go to the
    /// sink and the run goes on, so there is no error to return.
    pub async fn process(&mut self) -> ProcessStats {
        let mut stats = ProcessStats::default();
        let mut events = self.ingestion.stream();

        while let Some(event) = events.next().await {
            match event.and_then(|event| self.apply_event(event)) {
                Ok(warnings) => {
                    stats.applied += 1;
                    stats.warnings += warnings.len();
                    for warning in &warnings {
                        self.sink.warn(warning);
                    }
                }
                Err(e) => {
                    stats.rejected += 1;
                    self.sink.reject(&e);
                }
            }
        }

        info!(
            applied = stats.applied,
            rejected = stats.rejected,
            warnings = stats.warnings,
            "event stream reconciled"
        );
        stats
    }

    /// Applies one event. On error the ledger is left as it was.
    pub fn apply_event(&mut self, event: LedgerEvent) -> Result<Vec<Warning>, Error> {
        debug!(%event, "applying event");
        match event {
            LedgerEvent::Open(open) => self.open_account(open).map(|()| Vec::new()),
            LedgerEvent::Post(posting) => self.post(posting),
        }
    }

    pub fn net_worth(&self) -> Money {
        NetWorth::of(&self.repository).net_worth
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn flush<O: io::Write>(&self, config: &Config, out: O) -> Result<(), Error> {
        report::write(&self.repository, config, out)
    }

    fn open_account(&mut self, open: OpenAccount) -> Result<(), Error> {
        let account = Account::new(open.account, open.kind, open.label, open.opening_balance);
        info!(account = %account.id, kind = %account.kind, opening = %account.balance, "account opened");
        self.repository.open_account(account)
    }

    fn post(&mut self, posting: Posting) -> Result<Vec<Warning>, Error> {
        if !posting.amount.is_positive() {
            return Err(Error::InvalidAmount {
                tx: posting.tx,
                amount: posting.amount,
            });
        }
        if self.repository.get_transaction(posting.tx).is_some() {
            return Err(Error::DuplicateTransaction(posting.tx));
        }

        match posting.kind.clone() {
            PostingKind::Income => self.income(posting),
            PostingKind::Expense => match self.kind_of(&posting.account)? {
                AccountKind::Asset => self.expense(posting),
                // spending on a card is a purchase, whatever the row called it
                AccountKind::Liability => self.purchase(posting),
            },
            PostingKind::Purchase => self.purchase(posting),
            PostingKind::Payment { from, settles } => self.payment(posting, from, settles),
            PostingKind::Transfer { from } => self.transfer(posting, from),
        }
    }

    fn income(&mut self, posting: Posting) -> Result<Vec<Warning>, Error> {
        self.require(&posting.account, AccountKind::Asset)?;

        let account_id = posting.account.clone();
        let balance = self.credited(posting.tx, &account_id, posting.amount)?;
        self.repository
            .record_transaction(posting.into_transaction(TransactionKind::Income))?;
        self.account_mut(&account_id)?.balance = balance;

        Ok(Vec::new())
    }

    fn expense(&mut self, posting: Posting) -> Result<Vec<Warning>, Error> {
        self.require(&posting.account, AccountKind::Asset)?;

        let account_id = posting.account.clone();
        let balance = self.debited(posting.tx, &account_id, posting.amount)?;
        self.repository
            .record_transaction(posting.into_transaction(TransactionKind::Expense))?;
        self.account_mut(&account_id)?.balance = balance;

        Ok(Vec::new())
    }

    fn purchase(&mut self, posting: Posting) -> Result<Vec<Warning>, Error> {
        self.require(&posting.account, AccountKind::Liability)?;

        let (tx, card_id, amount) = (posting.tx, posting.account.clone(), posting.amount);
        let balance = self.credited(tx, &card_id, amount)?;
        self.repository
            .record_transaction(posting.into_transaction(TransactionKind::Purchase))?;
        self.account_mut(&card_id)?.balance = balance;

        debug!(tx, card = %card_id, %amount, "purchase recorded");
        Ok(Vec::new())
    }

    fn payment(
        &mut self,
        posting: Posting,
        from: AccountId,
        settles: Vec<TransactionId>,
    ) -> Result<Vec<Warning>, Error> {
        self.require(&posting.account, AccountKind::Liability)?;
        self.require(&from, AccountKind::Asset)?;

        let explicit = !settles.is_empty();
        let settled = if explicit {
            self.check_settlement(&posting, &settles)?;
            settles
        } else {
            self.match_open_purchases(&posting)
        };
        let settled_total: Money = settled
            .iter()
            .filter_map(|id| self.repository.get_transaction(*id))
            .map(|tx| tx.amount)
            .sum();

        let (payment_id, card_id, amount) = (posting.tx, posting.account.clone(), posting.amount);
        // both sides move by the same amount, so net worth stays put
        let from_balance = self.debited(payment_id, &from, amount)?;
        let card_balance = self.debited(payment_id, &card_id, amount)?;

        let mut transaction = posting.into_transaction(TransactionKind::Payment);
        transaction.settles = settled.clone();
        self.repository.record_transaction(transaction)?;
        for purchase_id in &settled {
            self.repository.mark_settled(*purchase_id, payment_id);
        }

        self.account_mut(&from)?.balance = from_balance;
        let card = self.account_mut(&card_id)?;
        card.balance = card_balance;
        let overpaid = card.is_overpaid();

        let mut warnings = Vec::new();
        if overpaid {
            warnings.push(Warning::Overpayment {
                account: card_id.clone(),
                payment: payment_id,
                balance: card_balance,
            });
        }
        if explicit && settled_total != amount {
            warnings.push(Warning::SettlementMismatch {
                payment: payment_id,
                paid: amount,
                settled: settled_total,
            });
        }

        info!(
            payment = payment_id,
            card = %card_id,
            %from,
            %amount,
            settled = settled.len(),
            "payment applied"
        );
        Ok(warnings)
    }

    fn transfer(&mut self, posting: Posting, from: AccountId) -> Result<Vec<Warning>, Error> {
        if from == posting.account {
            return Err(Error::SelfTransfer(posting.tx));
        }
        self.require(&from, AccountKind::Asset)?;
        self.require(&posting.account, AccountKind::Asset)?;

        let (tx, to, amount) = (posting.tx, posting.account.clone(), posting.amount);
        let from_balance = self.debited(tx, &from, amount)?;
        let to_balance = self.credited(tx, &to, amount)?;
        self.repository
            .record_transaction(posting.into_transaction(TransactionKind::Transfer))?;
        self.account_mut(&from)?.balance = from_balance;
        self.account_mut(&to)?.balance = to_balance;

        Ok(Vec::new())
    }

    fn check_settlement(&self, payment: &Posting, settles: &[TransactionId]) -> Result<(), Error> {
        for (position, &purchase_id) in settles.iter().enumerate() {
            let invalid = |reason: &'static str| Error::InvalidSettlement {
                payment: payment.tx,
                purchase: purchase_id,
                reason,
            };

            if settles[..position].contains(&purchase_id) {
                return Err(invalid("listed more than once"));
            }
            let purchase = self
                .repository
                .get_transaction(purchase_id)
                .ok_or_else(|| invalid("no such transaction"))?;
            if !purchase.is_credit_card_purchase {
                return Err(invalid("not a card purchase"));
            }
            if purchase.account != payment.account {
                return Err(invalid("purchase is on another account"));
            }
            if purchase.date > payment.date {
                return Err(invalid("purchase is dated after the payment"));
            }
            if purchase.settled_by.is_some() {
                return Err(invalid("already settled"));
            }
        }
        Ok(())
    }

    /// Oldest unsettled purchases on the paid card, made no later than the
    /// payment, whose running total fits in the payment amount.
    fn match_open_purchases(&self, payment: &Posting) -> Vec<TransactionId> {
        let mut remaining = payment.amount;
        let mut matched = Vec::new();
        for purchase in self
            .repository
            .unsettled_purchases(&payment.account)
            .into_iter()
            .filter(|purchase| purchase.date <= payment.date)
        {
            if purchase.amount > remaining {
                break;
            }
            remaining -= purchase.amount;
            matched.push(purchase.id);
        }
        matched
    }

    /// Balance of `account_id` once `amount` is added to it.
    fn credited(
        &self,
        tx: TransactionId,
        account_id: &AccountId,
        amount: Money,
    ) -> Result<Money, Error> {
        self.balance_of(account_id)?
            .checked_add(amount)
            .ok_or(Error::AmountOverflow { tx })
    }

    /// Balance of `account_id` once `amount` is taken from it.
    fn debited(
        &self,
        tx: TransactionId,
        account_id: &AccountId,
        amount: Money,
    ) -> Result<Money, Error> {
        self.balance_of(account_id)?
            .checked_sub(amount)
            .ok_or(Error::AmountOverflow { tx })
    }

    fn balance_of(&self, account_id: &AccountId) -> Result<Money, Error> {
        self.repository
            .get_account(account_id)
            .map(|account| account.balance)
            .ok_or_else(|| Error::UnknownAccount(account_id.clone()))
    }

    fn kind_of(&self, account_id: &AccountId) -> Result<AccountKind, Error> {
        self.repository
            .get_account(account_id)
            .map(|account| account.kind)
            .ok_or_else(|| Error::UnknownAccount(account_id.clone()))
    }

    fn require(&self, account_id: &AccountId, expected: AccountKind) -> Result<(), Error> {
        let actual = self.kind_of(account_id)?;
        if actual != expected {
            return Err(Error::WrongAccountKind {
                account: account_id.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn account_mut(&mut self, account_id: &AccountId) -> Result<&mut Account, Error> {
        self.repository
            .get_account_mut(account_id)
            .ok_or_else(|| Error::UnknownAccount(account_id.clone()))
    }
}
