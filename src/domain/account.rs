use crate::domain::Money;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Asset,
    Liability,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Asset => "asset",
            AccountKind::Liability => "liability",
        }
    }
}

impl core::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub kind: AccountKind,
    pub label: String,
    pub opening_balance: Money,
    pub balance: Money, // held for assets, owed for liabilities
}

impl Account {
    pub fn new(id: AccountId, kind: AccountKind, label: String, opening_balance: Money) -> Self {
        Self {
            id,
            kind,
            label,
            opening_balance,
            balance: opening_balance,
        }
    }

    /// A liability paid down past zero.
    pub fn is_overpaid(&self) -> bool {
        self.kind == AccountKind::Liability && self.balance.is_negative()
    }
}
