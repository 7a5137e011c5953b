//! Recapitulative statement (Zusammenfassende Meldung, "ZM").
//!
//! Quarterly report of intra-Community supplies: one position per EU
//! trading partner with the partner's VAT identifier, destination country,
//! delivery type, and net amount. The statement carries a monotone status
//! machine from draft through submission to acceptance or rejection.
//!
//! ```
//! use fiskal::Amount;
//! use fiskal::zm::{DeliveryType, ZmBuilder};
//!
//! let zm = ZmBuilder::new(2025, 1)
//!     .add_entry("DE123456789", "DE", DeliveryType::Goods, Amount::from_cents(500_000))?
//!     .add_entry("FR12345678901", "FR", DeliveryType::Services, Amount::from_cents(250_000))?
//!     .build()?;
//! assert_eq!(zm.total_amount(), Amount::from_cents(750_000));
//! # Ok::<(), fiskal::FiskalError>(())
//! ```

mod csv;
mod types;
mod validate;
mod xml;

pub use csv::entries_from_csv;
pub use types::{DeliveryType, Zm, ZmBuilder, ZmEntry, ZmStatus};
pub use validate::validate_zm;
pub use xml::{from_zm_xml, to_zm_xml};
