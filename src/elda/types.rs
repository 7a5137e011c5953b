use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Amount, FiskalError, Svnr};

use super::validate::{validate_abmeldung, validate_anmeldung};

/// Employment type of an on-boarding declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    /// Blue-collar employment.
    Arbeiter,
    /// White-collar employment.
    Angestellt,
    /// Apprenticeship.
    Lehrling,
    /// Marginal employment below the insurance threshold.
    Geringfuegig,
}

impl EmploymentType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Arbeiter => "AR",
            Self::Angestellt => "AN",
            Self::Lehrling => "LE",
            Self::Geringfuegig => "GF",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "AR" => Some(Self::Arbeiter),
            "AN" => Some(Self::Angestellt),
            "LE" => Some(Self::Lehrling),
            "GF" => Some(Self::Geringfuegig),
            _ => None,
        }
    }
}

/// Coded exit reason of an off-boarding declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbmeldungReason {
    /// Termination by the employer.
    KuendigungDienstgeber,
    /// Termination by the employee.
    KuendigungDienstnehmer,
    /// Mutually agreed dissolution.
    EinvernehmlicheLoesung,
    /// Expiry of a fixed-term contract.
    Zeitablauf,
    /// Summary dismissal.
    Entlassung,
    /// Resignation without notice.
    VorzeitigerAustritt,
    /// Retirement.
    Pensionierung,
    /// Death of the employee.
    Tod,
}

impl AbmeldungReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::KuendigungDienstgeber => "KDG",
            Self::KuendigungDienstnehmer => "KDN",
            Self::EinvernehmlicheLoesung => "EVL",
            Self::Zeitablauf => "ZAB",
            Self::Entlassung => "ENT",
            Self::VorzeitigerAustritt => "VAU",
            Self::Pensionierung => "PEN",
            Self::Tod => "TOD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KDG" => Some(Self::KuendigungDienstgeber),
            "KDN" => Some(Self::KuendigungDienstnehmer),
            "EVL" => Some(Self::EinvernehmlicheLoesung),
            "ZAB" => Some(Self::Zeitablauf),
            "ENT" => Some(Self::Entlassung),
            "VAU" => Some(Self::VorzeitigerAustritt),
            "PEN" => Some(Self::Pensionierung),
            "TOD" => Some(Self::Tod),
            _ => None,
        }
    }
}

/// On-boarding declaration (Anmeldung).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anmeldung {
    pub svnr: Svnr,
    pub last_name: String,
    pub first_name: String,
    /// Full birth date; its day/month/two-digit-year must match the svnr.
    pub birth_date: NaiveDate,
    /// Employer contribution-account number (Beitragskontonummer).
    pub employer_account: String,
    pub start_date: NaiveDate,
    pub employment_type: EmploymentType,
    /// Agreed weekly working hours.
    pub hours_per_week: Decimal,
    /// Monthly gross pay in minor units.
    pub gross_pay: Amount,
}

/// Off-boarding declaration (Abmeldung).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abmeldung {
    pub svnr: Svnr,
    pub last_name: String,
    pub first_name: String,
    pub employer_account: String,
    pub exit_date: NaiveDate,
    pub reason: AbmeldungReason,
    /// Severance payment, if any.
    pub severance: Option<Amount>,
    /// Compensation for unused vacation, if any.
    pub vacation_compensation: Option<Amount>,
}

/// Builder for [`Anmeldung`].
#[derive(Debug, Clone)]
pub struct AnmeldungBuilder {
    svnr: Svnr,
    last_name: String,
    first_name: String,
    birth_date: Option<NaiveDate>,
    employer_account: String,
    start_date: Option<NaiveDate>,
    employment_type: EmploymentType,
    hours_per_week: Decimal,
    gross_pay: Amount,
}

impl AnmeldungBuilder {
    /// Start a declaration. The social-security number must parse; the
    /// remaining fields have setters and are checked in `build`.
    pub fn new(svnr: &str, last_name: &str, first_name: &str) -> Result<Self, FiskalError> {
        let svnr =
            Svnr::parse(svnr).map_err(|e| FiskalError::from_validation_errors(&[e]))?;
        Ok(Self {
            svnr,
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            birth_date: None,
            employer_account: String::new(),
            start_date: None,
            employment_type: EmploymentType::Angestellt,
            hours_per_week: Decimal::ZERO,
            gross_pay: Amount::ZERO,
        })
    }

    pub fn birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn employer_account(mut self, account: &str) -> Self {
        self.employer_account = account.to_string();
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn employment_type(mut self, t: EmploymentType) -> Self {
        self.employment_type = t;
        self
    }

    pub fn hours_per_week(mut self, hours: Decimal) -> Self {
        self.hours_per_week = hours;
        self
    }

    pub fn gross_pay(mut self, pay: Amount) -> Self {
        self.gross_pay = pay;
        self
    }

    /// Assemble and validate.
    pub fn build(self) -> Result<Anmeldung, FiskalError> {
        let anmeldung = Anmeldung {
            svnr: self.svnr,
            last_name: self.last_name,
            first_name: self.first_name,
            birth_date: self
                .birth_date
                .ok_or_else(|| FiskalError::Builder("birth date is required".into()))?,
            employer_account: self.employer_account,
            start_date: self
                .start_date
                .ok_or_else(|| FiskalError::Builder("start date is required".into()))?,
            employment_type: self.employment_type,
            hours_per_week: self.hours_per_week,
            gross_pay: self.gross_pay,
        };
        let errors = validate_anmeldung(&anmeldung);
        if errors.is_empty() {
            Ok(anmeldung)
        } else {
            Err(FiskalError::from_validation_errors(&errors))
        }
    }
}

/// Builder for [`Abmeldung`].
#[derive(Debug, Clone)]
pub struct AbmeldungBuilder {
    svnr: Svnr,
    last_name: String,
    first_name: String,
    employer_account: String,
    exit_date: Option<NaiveDate>,
    reason: Option<AbmeldungReason>,
    severance: Option<Amount>,
    vacation_compensation: Option<Amount>,
}

impl AbmeldungBuilder {
    pub fn new(svnr: &str, last_name: &str, first_name: &str) -> Result<Self, FiskalError> {
        let svnr =
            Svnr::parse(svnr).map_err(|e| FiskalError::from_validation_errors(&[e]))?;
        Ok(Self {
            svnr,
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            employer_account: String::new(),
            exit_date: None,
            reason: None,
            severance: None,
            vacation_compensation: None,
        })
    }

    pub fn employer_account(mut self, account: &str) -> Self {
        self.employer_account = account.to_string();
        self
    }

    pub fn exit_date(mut self, date: NaiveDate) -> Self {
        self.exit_date = Some(date);
        self
    }

    pub fn reason(mut self, reason: AbmeldungReason) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn severance(mut self, amount: Amount) -> Self {
        self.severance = Some(amount);
        self
    }

    pub fn vacation_compensation(mut self, amount: Amount) -> Self {
        self.vacation_compensation = Some(amount);
        self
    }

    /// Assemble and validate.
    pub fn build(self) -> Result<Abmeldung, FiskalError> {
        let abmeldung = Abmeldung {
            svnr: self.svnr,
            last_name: self.last_name,
            first_name: self.first_name,
            employer_account: self.employer_account,
            exit_date: self
                .exit_date
                .ok_or_else(|| FiskalError::Builder("exit date is required".into()))?,
            reason: self
                .reason
                .ok_or_else(|| FiskalError::Builder("exit reason is required".into()))?,
            severance: self.severance,
            vacation_compensation: self.vacation_compensation,
        };
        let errors = validate_abmeldung(&abmeldung);
        if errors.is_empty() {
            Ok(abmeldung)
        } else {
            Err(FiskalError::from_validation_errors(&errors))
        }
    }
}
