//! Advance VAT return (Umsatzsteuervoranmeldung, form U30).
//!
//! Builds the periodic VAT declaration from its numbered line items,
//! derives the payable/refund result, validates the full ruleset, and
//! round-trips the ministry XML format for FinanzOnline submission.
//!
//! ```
//! use fiskal::Amount;
//! use fiskal::uva::{Period, UvaBuilder, to_u30_xml};
//!
//! let uva = UvaBuilder::new(Period::month(2025, 1))
//!     .standard_base(Amount::from_cents(80_000))
//!     .input_tax(Amount::from_cents(1_600))
//!     .build()?;
//! assert_eq!(uva.payable, Amount::from_cents(14_400));
//!
//! let xml = to_u30_xml(&uva)?;
//! assert!(xml.contains("<KZ083>144.00</KZ083>"));
//! # Ok::<(), fiskal::FiskalError>(())
//! ```

mod types;
mod validate;
mod xml;

pub use types::{Period, Uva, UvaBuilder};
pub use validate::validate_uva;
pub use xml::{from_u30_xml, to_u30_xml};

/// Namespace of the U30 declaration accepted by the FinanzOnline upload
/// channel.
pub const U30_NS: &str = "http://www.bmf.gv.at/steuern/fon/u30";
