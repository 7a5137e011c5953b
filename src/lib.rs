//! # fiskal
//!
//! Austrian tax and compliance toolkit: FinanzOnline webservices, advance
//! VAT returns (UVA), EU recapitulative statements (ZM), ELDA employee
//! declarations, EN 16931 e-invoicing (XRechnung UBL + ZUGFeRD CII), SEPA
//! payment instructions (pain.001 / pain.008), and camt.053 bank-statement
//! ingest.
//!
//! All monetary values are euro cents in the integer [`Amount`] type;
//! [`rust_decimal::Decimal`] appears only at the boundaries (rates,
//! quantities, wire parsing) with half-even rounding into cents.
//!
//! ## Quick Start
//!
//! ```rust
//! use fiskal::{Amount, Iban};
//!
//! let net = Amount::from_euro(80_000);
//! let vat = net.percent(rust_decimal_macros::dec!(20));
//! assert_eq!(vat, Amount::from_euro(16_000));
//! assert_eq!((net + vat).to_string(), "96000.00");
//!
//! let iban = Iban::parse("AT61 1904 3002 3457 3201")?;
//! assert_eq!(iban.country_code(), "AT");
//! assert_eq!(iban.electronic(), "AT611904300234573201");
//! # Ok::<(), fiskal::ValidationError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Amounts, identifiers (Svnr, FN, UID, IBAN/BIC), validation errors |
//! | `uva` | Advance VAT return (U30 XML) |
//! | `zm` | Recapitulative statement (XML + CSV ingest) |
//! | `elda` | Employee on/off-boarding declarations |
//! | `erechnung` | EN 16931 invoice model, UBL 2.1 and CII renderings |
//! | `sepa` | pain.001 credit transfer, pain.008 direct debit |
//! | `camt` | camt.053 bank statement decoder |
//! | `fon` | FinanzOnline SOAP client (session, databox, upload, UID, dashboard) |
//! | `fb` | Firmenbuch watchlist and change detector |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub(crate) mod xml;

#[cfg(feature = "uva")]
pub mod uva;

#[cfg(feature = "zm")]
pub mod zm;

#[cfg(feature = "elda")]
pub mod elda;

#[cfg(feature = "erechnung")]
pub mod erechnung;

#[cfg(feature = "sepa")]
pub mod sepa;

#[cfg(feature = "camt")]
pub mod camt;

#[cfg(feature = "fon")]
pub mod fon;

#[cfg(feature = "fb")]
pub mod fb;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
