use serde::{Deserialize, Serialize};

use crate::core::{Amount, FiskalError, Uid, ValidationError};

use super::validate::validate_zm;

/// Delivery type of one ZM position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryType {
    /// L — intra-Community supply of goods.
    Goods,
    /// D — triangular transaction (middle party).
    Triangular,
    /// S — supply of services under the reverse charge.
    Services,
}

impl DeliveryType {
    /// Single-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Goods => "L",
            Self::Triangular => "D",
            Self::Services => "S",
        }
    }

    /// Parse from the wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Self::Goods),
            "D" => Some(Self::Triangular),
            "S" => Some(Self::Services),
            _ => None,
        }
    }
}

/// One position of a recapitulative statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZmEntry {
    /// The trading partner's VAT identifier (non-Austrian EU).
    pub partner_uid: Uid,
    /// 2-letter destination country code.
    pub country_code: String,
    pub delivery_type: DeliveryType,
    /// Net amount in minor units; must be positive.
    pub amount: Amount,
}

/// Submission status. Transitions are strictly monotone: a rejected
/// statement is copied into a new draft, never re-opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ZmStatus {
    Draft,
    Submitted { reference: String },
    Accepted { reference: String },
    Rejected { reference: String },
}

/// A recapitulative statement for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zm {
    pub year: i32,
    pub quarter: u32,
    pub entries: Vec<ZmEntry>,
    pub status: ZmStatus,
}

impl Zm {
    /// Sum of all position amounts.
    pub fn total_amount(&self) -> Amount {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Record the submission reference. Only a draft can be submitted.
    pub fn mark_submitted(&mut self, reference: impl Into<String>) -> Result<(), FiskalError> {
        match &self.status {
            ZmStatus::Draft => {
                self.status = ZmStatus::Submitted { reference: reference.into() };
                Ok(())
            }
            other => Err(FiskalError::Validation(format!(
                "cannot submit a statement in status {other:?}"
            ))),
        }
    }

    /// Record acceptance of a submitted statement.
    pub fn mark_accepted(&mut self) -> Result<(), FiskalError> {
        match &self.status {
            ZmStatus::Submitted { reference } => {
                self.status = ZmStatus::Accepted { reference: reference.clone() };
                Ok(())
            }
            other => Err(FiskalError::Validation(format!(
                "cannot accept a statement in status {other:?}"
            ))),
        }
    }

    /// Record rejection of a submitted statement.
    pub fn mark_rejected(&mut self) -> Result<(), FiskalError> {
        match &self.status {
            ZmStatus::Submitted { reference } => {
                self.status = ZmStatus::Rejected { reference: reference.clone() };
                Ok(())
            }
            other => Err(FiskalError::Validation(format!(
                "cannot reject a statement in status {other:?}"
            ))),
        }
    }

    /// Copy a rejected statement's content into a fresh draft. The
    /// rejected original is left untouched.
    pub fn reopen_rejected(&self) -> Result<Zm, FiskalError> {
        match &self.status {
            ZmStatus::Rejected { .. } => Ok(Zm {
                year: self.year,
                quarter: self.quarter,
                entries: self.entries.clone(),
                status: ZmStatus::Draft,
            }),
            other => Err(FiskalError::Validation(format!(
                "only rejected statements can be re-drafted, status is {other:?}"
            ))),
        }
    }
}

/// Builder for [`Zm`].
#[derive(Debug, Clone)]
pub struct ZmBuilder {
    year: i32,
    quarter: u32,
    entries: Vec<ZmEntry>,
}

impl ZmBuilder {
    pub fn new(year: i32, quarter: u32) -> Self {
        Self { year, quarter, entries: Vec::new() }
    }

    /// Append a position. The partner UID must parse; the remaining rules
    /// (EU membership, country ≠ AT, amount > 0) run in `build`.
    pub fn add_entry(
        mut self,
        partner_uid: &str,
        country_code: &str,
        delivery_type: DeliveryType,
        amount: Amount,
    ) -> Result<Self, FiskalError> {
        let partner_uid = Uid::parse(partner_uid)
            .map_err(|e: ValidationError| FiskalError::from_validation_errors(&[e]))?;
        self.entries.push(ZmEntry {
            partner_uid,
            country_code: country_code.to_ascii_uppercase(),
            delivery_type,
            amount,
        });
        Ok(self)
    }

    /// Append an already-parsed position.
    pub fn push_entry(mut self, entry: ZmEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Assemble as a draft and validate.
    pub fn build(self) -> Result<Zm, FiskalError> {
        let zm = self.build_unchecked();
        let errors = validate_zm(&zm);
        if errors.is_empty() {
            Ok(zm)
        } else {
            Err(FiskalError::from_validation_errors(&errors))
        }
    }

    /// Assemble without validating.
    pub fn build_unchecked(self) -> Zm {
        Zm {
            year: self.year,
            quarter: self.quarter,
            entries: self.entries,
            status: ZmStatus::Draft,
        }
    }
}
