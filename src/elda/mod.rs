//! ELDA employee declarations (Anmeldung / Abmeldung).
//!
//! On-boarding reports a new employment to the social-insurance carrier
//! before the first working day; off-boarding reports the exit with a
//! coded reason and any severance or vacation-compensation payments. Both
//! declarations revolve around the employee's social-security number,
//! whose embedded birth date must agree with the separately supplied one.
//!
//! ```
//! use chrono::NaiveDate;
//! use fiskal::Amount;
//! use fiskal::elda::{AnmeldungBuilder, EmploymentType};
//!
//! let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
//! let anmeldung = AnmeldungBuilder::new("1234150189", "Huber", "Anna")?
//!     .birth_date(date(1989, 1, 15))
//!     .employer_account("1234567890")
//!     .start_date(date(2025, 9, 1))
//!     .employment_type(EmploymentType::Angestellt)
//!     .hours_per_week(rust_decimal_macros::dec!(38.5))
//!     .gross_pay(Amount::from_cents(320_000))
//!     .build()?;
//! assert_eq!(anmeldung.svnr.to_string(), "1234 150189");
//! # Ok::<(), fiskal::FiskalError>(())
//! ```

mod types;
mod validate;
mod xml;

pub use types::{
    Abmeldung, AbmeldungBuilder, AbmeldungReason, Anmeldung, AnmeldungBuilder, EmploymentType,
};
pub use validate::{validate_abmeldung, validate_anmeldung};
pub use xml::{from_elda_xml, to_abmeldung_xml, to_anmeldung_xml, EldaMeldung};
