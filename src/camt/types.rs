use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::Amount;

/// Credit/debit indicator of a balance or entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditDebit {
    /// CRDT — money in.
    Credit,
    /// DBIT — money out.
    Debit,
}

impl CreditDebit {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Credit => "CRDT",
            Self::Debit => "DBIT",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CRDT" => Some(Self::Credit),
            "DBIT" => Some(Self::Debit),
            _ => None,
        }
    }
}

/// An opening or closing balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Unsigned amount in minor units; the sign lives in the indicator.
    pub amount: Amount,
    pub currency: String,
    pub credit_debit: CreditDebit,
    pub date: NaiveDate,
}

impl Balance {
    /// The balance as a signed amount (debit balances are negative).
    pub fn signed(&self) -> Amount {
        match self.credit_debit {
            CreditDebit::Credit => self.amount,
            CreditDebit::Debit => -self.amount,
        }
    }
}

/// One booked statement entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEntry {
    /// Unsigned amount in minor units; the sign lives in the indicator.
    pub amount: Amount,
    pub currency: String,
    pub credit_debit: CreditDebit,
    pub booking_date: NaiveDate,
    pub value_date: Option<NaiveDate>,
    /// End-to-end reference from the underlying transaction.
    pub end_to_end_ref: Option<String>,
    /// Bank-side entry reference.
    pub transaction_ref: Option<String>,
    pub counterparty_name: Option<String>,
    pub counterparty_iban: Option<String>,
    /// Unstructured remittance or additional entry information.
    pub description: Option<String>,
}

impl StatementEntry {
    /// The entry as a signed amount (debits are negative).
    pub fn signed(&self) -> Amount {
        match self.credit_debit {
            CreditDebit::Credit => self.amount,
            CreditDebit::Debit => -self.amount,
        }
    }
}

/// A decoded bank statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    pub statement_id: String,
    /// IBAN of the statement account as reported by the bank.
    pub account_iban: String,
    pub created_at: Option<NaiveDateTime>,
    pub opening_balance: Option<Balance>,
    pub closing_balance: Option<Balance>,
    pub entries: Vec<StatementEntry>,
}

impl BankStatement {
    /// Sum of the signed entry amounts.
    pub fn booked_total(&self) -> Amount {
        self.entries.iter().map(StatementEntry::signed).sum()
    }
}
