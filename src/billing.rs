use chrono::{Datelike, Months, NaiveDate};

use crate::domain::Error;

/// A card statement period, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingCycle {
    /// The cycle that `date` falls in when statements start on `statement_day`.
    pub fn containing(date: NaiveDate, statement_day: u32) -> Result<Self, Error> {
        if !(1..=28).contains(&statement_day) {
            return Err(Error::InvalidStatementDay(statement_day));
        }

        let start = if date.day() >= statement_day {
            date.with_day(statement_day)
        } else {
            date.checked_sub_months(Months::new(1))
                .and_then(|d| d.with_day(statement_day))
        };
        let end = start
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .and_then(|d| d.pred_opt());

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(Error::InvalidStatementDay(statement_day)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cycle_runs_from_statement_day_to_the_day_before() {
        let cycle = BillingCycle::containing(date(2026, 1, 19), 19).unwrap();
        assert_eq!(cycle.start, date(2026, 1, 19));
        assert_eq!(cycle.end, date(2026, 2, 18));

        let cycle = BillingCycle::containing(date(2026, 1, 5), 19).unwrap();
        assert_eq!(cycle.start, date(2025, 12, 19));
        assert_eq!(cycle.end, date(2026, 1, 18));
        assert!(cycle.contains(date(2026, 1, 18)));
        assert!(!cycle.contains(date(2026, 1, 19)));
    }

    #[test]
    fn first_of_month_cycles_cover_whole_months() {
        let cycle = BillingCycle::containing(date(2028, 2, 10), 1).unwrap();
        assert_eq!(cycle.start, date(2028, 2, 1));
        assert_eq!(cycle.end, date(2028, 2, 29));
    }

    #[test]
    fn statement_day_must_exist_in_every_month() {
        assert!(matches!(
            BillingCycle::containing(date(2026, 1, 1), 30),
            Err(Error::InvalidStatementDay(30))
        ));
        assert!(BillingCycle::containing(date(2026, 1, 1), 0).is_err());
    }
}
