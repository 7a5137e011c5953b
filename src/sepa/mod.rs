//! SEPA payment initiation (ISO 20022).
//!
//! Builds credit-transfer batches (pain.001.001.03) and direct-debit
//! batches (pain.008.001.02). Control sum and transaction count are
//! derived, end-to-end identifiers are generated where omitted, and both
//! batch kinds validate the full ruleset before rendering.
//!
//! ```
//! use chrono::NaiveDate;
//! use fiskal::Amount;
//! use fiskal::sepa::CreditTransferBuilder;
//!
//! let batch = CreditTransferBuilder::new("MSG-2025-001", "Muster GmbH", "AT611904300234573201")?
//!     .execution_date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
//!     .add_transaction("Lieferant AG", "DE89370400440532013000", Amount::from_cents(125_000))?
//!     .build()?;
//! assert_eq!(batch.control_sum(), Amount::from_cents(125_000));
//! # Ok::<(), fiskal::FiskalError>(())
//! ```

mod csv;
mod pain001;
mod pain008;
mod types;
mod validate;

pub use csv::credit_transfers_from_csv;
pub use pain001::to_pain001_xml;
pub use pain008::to_pain008_xml;
pub use types::{
    CreditTransferBatch, CreditTransferBuilder, CreditTransferTx, DirectDebitBatch,
    DirectDebitBuilder, DirectDebitTx, SequenceType,
};
pub use validate::{validate_credit_transfer, validate_direct_debit};

/// pain.001.001.03 document namespace.
pub const PAIN001_NS: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";

/// pain.008.001.02 document namespace.
pub const PAIN008_NS: &str = "urn:iso:std:iso:20022:tech:xsd:pain.008.001.02";
