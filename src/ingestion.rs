use std::io::Read;
use std::pin::Pin;

use chrono::NaiveDate;
use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::{
    AccountId, AccountKind, Error, EventStream, LedgerEvent, Money, OpenAccount, Posting,
    PostingKind, SharedSplit, TransactionId,
};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    tx: Option<TransactionId>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    amount: Option<Money>,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    settles: Option<String>,
    #[serde(default)]
    shared: Option<String>,
}

const EVENT_TYPES: [&str; 7] = [
    "asset",
    "liability",
    "income",
    "expense",
    "purchase",
    "payment",
    "transfer",
];

/// Rows whose amount can be split between participants; income is a refund.
const SHAREABLE_TYPES: [&str; 3] = ["income", "expense", "purchase"];

impl CsvRow {
    fn required<T>(value: Option<T>, field: &str, kind: &str) -> Result<T, Error> {
        value.ok_or_else(|| Error::Ingestion(format!("{} row is missing {}", kind, field)))
    }
}

fn parse_settles(raw: Option<&str>) -> Result<Vec<TransactionId>, Error> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<TransactionId>()
                .map_err(|_| Error::Ingestion(format!("Invalid settled transaction id: {}", id)))
        })
        .collect()
}

/// `name` or `name:amount` entries separated by `;`.
fn parse_shared(raw: Option<&str>) -> Result<Vec<SharedSplit>, Error> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || Error::Ingestion(format!("Invalid shared split: {}", entry));
            let (name, amount) = match entry.split_once(':') {
                Some((name, amount)) => (
                    name.trim(),
                    Some(Money::from_decimal_str(amount).ok_or_else(invalid)?),
                ),
                None => (entry, None),
            };
            if name.is_empty() {
                return Err(invalid());
            }
            Ok(SharedSplit {
                name: name.to_string(),
                amount,
            })
        })
        .collect()
}

impl TryFrom<CsvRow> for LedgerEvent {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let kind = row.kind.trim().to_ascii_lowercase();
        if !EVENT_TYPES.contains(&kind.as_str()) {
            return Err(Error::Ingestion(format!("Invalid event type: {}", kind)));
        }
        let shared = parse_shared(row.shared.as_deref())?;
        if !shared.is_empty() && !SHAREABLE_TYPES.contains(&kind.as_str()) {
            return Err(Error::Ingestion(format!("{} row cannot be shared", kind)));
        }

        let account = CsvRow::required(
            row.account.filter(|name| !name.is_empty()),
            "account",
            &kind,
        )
        .map(AccountId::new)?;

        let account_kind = match kind.as_str() {
            "asset" => Some(AccountKind::Asset),
            "liability" => Some(AccountKind::Liability),
            _ => None,
        };
        if let Some(account_kind) = account_kind {
            return Ok(LedgerEvent::Open(OpenAccount {
                account,
                kind: account_kind,
                label: row.category.unwrap_or_default(),
                opening_balance: row.amount.unwrap_or(Money::ZERO),
            }));
        }

        let posting_kind = match kind.as_str() {
            "income" => PostingKind::Income,
            "expense" => PostingKind::Expense,
            "purchase" => PostingKind::Purchase,
            "payment" => PostingKind::Payment {
                from: AccountId(CsvRow::required(row.source, "source", &kind)?),
                settles: parse_settles(row.settles.as_deref())?,
            },
            "transfer" => PostingKind::Transfer {
                from: AccountId(CsvRow::required(row.source, "source", &kind)?),
            },
            other => return Err(Error::Ingestion(format!("Invalid event type: {}", other))),
        };

        Ok(LedgerEvent::Post(Posting {
            tx: CsvRow::required(row.tx, "tx", &kind)?,
            kind: posting_kind,
            account,
            amount: CsvRow::required(row.amount, "amount", &kind)?,
            date: CsvRow::required(row.date, "date", &kind)?,
            category: row.category.unwrap_or_default(),
            shared,
        }))
    }
}

impl<R: Read + Send + 'static> EventStream for CsvReader<R> {
    type Events = Pin<Box<dyn Stream<Item = Result<LedgerEvent, Error>> + Send>>;

    fn stream(&mut self) -> Self::Events {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<LedgerEvent, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => LedgerEvent::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    async fn read(input: &'static str) -> Vec<Result<LedgerEvent, Error>> {
        CsvReader::new(input.as_bytes()).stream().collect().await
    }

    #[tokio::test]
    async fn parses_every_event_type() {
        let events = read(
            "type, tx, account, source, amount, date, category, settles\n\
             asset, , checking, , 1000, , Checking,\n\
             liability, , visa, , , , Visa card,\n\
             income, 1, checking, , 2500.00, 2026-01-01, Salary,\n\
             expense, 2, checking, , 40.10, 2026-01-02, Groceries,\n\
             purchase, 3, visa, , 50, 2026-01-03, Dining,\n\
             payment, 4, visa, checking, 50, 2026-01-20, Credit card bill, 3;5\n\
             transfer, 5, savings, checking, 200, 2026-01-05, Savings,\n",
        )
        .await;
        assert_eq!(events.len(), 7);

        match &events[1] {
            Ok(LedgerEvent::Open(open)) => {
                assert_eq!(open.kind, AccountKind::Liability);
                assert_eq!(open.opening_balance, Money::ZERO);
                assert_eq!(open.label, "Visa card");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &events[5] {
            Ok(LedgerEvent::Post(Posting {
                kind: PostingKind::Payment { from, settles },
                account,
                amount,
                ..
            })) => {
                assert_eq!(from, &AccountId::new("checking"));
                assert_eq!(account, &AccountId::new("visa"));
                assert_eq!(settles, &vec![3, 5]);
                assert_eq!(*amount, Money::from(50));
            }
            other => panic!("unexpected {:?}", other),
        }
        match &events[6] {
            Ok(LedgerEvent::Post(posting)) => {
                assert!(matches!(posting.kind, PostingKind::Transfer { .. }));
                assert_eq!(posting.date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn short_and_malformed_rows_become_errors() {
        let events = read(
            "type,tx,account,source,amount,date,category,settles\n\
             refund,1,checking,,5,2026-01-01,,\n\
             payment,2,visa,,5,2026-01-01,,\n\
             income,3,checking,,abc,2026-01-01,,\n\
             income,4,checking\n\
             payment,5,visa,checking,5,2026-01-01,,x\n\
             expense,6,checking,,5,2026-01-01\n",
        )
        .await;

        let messages: Vec<String> = events
            .iter()
            .take(5)
            .map(|event| event.as_ref().unwrap_err().to_string())
            .collect();
        assert!(messages[0].contains("Invalid event type: refund"));
        assert!(messages[1].contains("payment row is missing source"));
        assert!(messages[2].contains("CSV deserialization error"));
        assert!(messages[3].contains("income row is missing amount"));
        assert!(messages[4].contains("Invalid settled transaction id: x"));
        assert!(events[5].is_ok());
    }

    #[tokio::test]
    async fn reads_shared_splits() {
        let events = read(
            "type,tx,account,source,amount,date,category,settles,shared\n\
             purchase,1,visa,,30,2026-01-03,Dining,,ana:12.50; ben ;cy\n\
             income,2,checking,,10,2026-01-04,Dining,,ana\n\
             payment,3,visa,checking,30,2026-01-20,,,ana\n\
             expense,4,checking,,5,2026-01-05,,,ana:x\n\
             expense,5,checking,,5,2026-01-05,,,:5\n\
             expense,6,checking,,5,2026-01-05,,\n",
        )
        .await;

        match &events[0] {
            Ok(LedgerEvent::Post(posting)) => assert_eq!(
                posting.shared,
                vec![
                    SharedSplit {
                        name: "ana".to_string(),
                        amount: Some(Money::from_decimal_str("12.5").unwrap()),
                    },
                    SharedSplit {
                        name: "ben".to_string(),
                        amount: None,
                    },
                    SharedSplit {
                        name: "cy".to_string(),
                        amount: None,
                    },
                ]
            ),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&events[1], Ok(LedgerEvent::Post(posting)) if posting.shared.len() == 1));

        let message = |index: usize| events[index].as_ref().unwrap_err().to_string();
        assert!(message(2).contains("payment row cannot be shared"));
        assert!(message(3).contains("Invalid shared split: ana:x"));
        assert!(message(4).contains("Invalid shared split: :5"));
        assert!(matches!(&events[5], Ok(LedgerEvent::Post(posting)) if posting.shared.is_empty()));
    }

    #[tokio::test]
    async fn amounts_past_the_limit_are_rejected() {
        let events = read(
            "type,tx,account,source,amount,date,category,settles\n\
             asset,,checking,,79228162514264337593543950335,,,\n\
             income,1,checking,,1000000000000000,2026-01-01,,\n\
             income,2,checking,,999999999999999.99,2026-01-01,,\n",
        )
        .await;

        assert!(events[0].as_ref().unwrap_err().to_string().contains("CSV deserialization error"));
        assert!(events[1].is_err());
        assert!(events[2].is_ok());
    }

    #[tokio::test]
    async fn stream_can_only_be_taken_once() {
        let mut reader = CsvReader::new("type,tx,account\n".as_bytes());
        assert!(reader.stream().collect::<Vec<_>>().await.is_empty());
        assert!(reader.stream().next().await.is_none());
    }
}
