//! Identifier primitives, money arithmetic, and shared error types.
//!
//! This module provides the foundation the document codecs and portal
//! services build on: minor-unit amounts, validated Austrian identifiers
//! (social-security number, companies-register number, VAT identifier),
//! IBAN/BIC, and the structured validation error carried by every
//! document ruleset.

mod countries;
mod currencies;
mod error;
mod fbnr;
mod iban;
mod money;
mod svnr;
mod uid;
pub mod units;

pub use countries::{is_eu_member, is_known_country_code};
pub use currencies::is_known_currency_code;
pub use error::*;
pub use fbnr::*;
pub use iban::*;
pub use money::*;
pub use svnr::*;
pub use uid::*;
pub use units::is_known_unit_code;
