//! Structured e-invoicing per EN 16931.
//!
//! Builds invoice documents and renders them in the two syntaxes accepted
//! by Austrian and German public-sector buyers: UBL 2.1 ([`to_ubl_xml`])
//! and UN/CEFACT Cross Industry Invoice ([`to_cii_xml`]). Both syntaxes can
//! also be parsed back into the [`Invoice`] model.
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use fiskal::Amount;
//! use fiskal::erechnung::*;
//!
//! let invoice = InvoiceBuilder::new("R2025-001", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
//!     .seller(
//!         PartyBuilder::new("Muster GmbH", AddressBuilder::new("Wien", "1010", "AT").build())
//!             .vat_id("ATU12345678")
//!             .build(),
//!     )
//!     .buyer(PartyBuilder::new("Kunde AG", AddressBuilder::new("Graz", "8010", "AT").build()).build())
//!     .add_line(LineBuilder::new("1", "Beratung", dec!(8), "HUR", Amount::from_cents(12_000)).build())
//!     .build()?;
//!
//! let xml = to_ubl_xml(&invoice)?;
//! assert!(xml.contains("<cbc:ID>R2025-001</cbc:ID>"));
//! # Ok::<(), fiskal::FiskalError>(())
//! ```

mod builder;
mod numbering;
mod parse;
mod totals;
mod types;
mod validate;

pub mod cii;
pub mod ubl;

pub use builder::{AddressBuilder, InvoiceBuilder, LineBuilder, PartyBuilder};
pub use cii::{from_cii_xml, to_cii_xml};
pub use numbering::NumberSequence;
pub use totals::calc_totals;
pub use types::*;
pub use ubl::{from_ubl_xml, to_ubl_xml};
pub use validate::validate_invoice;

/// XRechnung 2.3 customization identifier (BT-24).
pub const CUSTOMIZATION_ID: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:xoev-de:kosit:standard:xrechnung_2.3";

/// Peppol BIS Billing 3.0 profile identifier (BT-23).
pub const PROFILE_ID: &str = "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0";

/// UBL 2.1 namespaces.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CREDIT_NOTE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

/// UN/CEFACT CII D16B namespaces.
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const QDT: &str = "urn:un:unece:uncefact:data:standard:QualifiedDataType:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
}
