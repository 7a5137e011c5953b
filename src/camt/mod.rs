//! camt.053 bank statement ingest.
//!
//! Decodes ISO 20022 bank-to-customer statements into a typed model with
//! cent-exact amounts and checks the reported balances against the booked
//! entries. Statements are consumed only; this crate never produces them.

mod parse;
mod types;
mod validate;

pub use parse::from_camt053_xml;
pub use types::{Balance, BankStatement, CreditDebit, StatementEntry};
pub use validate::validate_statement;

/// camt.053.001.02 document namespace.
pub const CAMT053_NS: &str = "urn:iso:std:iso:20022:tech:xsd:camt.053.001.02";
