use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::{Amount, FiskalError};

use super::validate::validate_uva;

/// Filing period of an advance VAT return.
///
/// Businesses above the turnover threshold file monthly, the rest
/// quarterly. The two variants are mutually exclusive on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Period {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Self {
        Period::Month { year, month }
    }

    pub fn quarter(year: i32, quarter: u32) -> Self {
        Period::Quarter { year, quarter }
    }

    pub fn year(&self) -> i32 {
        match self {
            Period::Month { year, .. } | Period::Quarter { year, .. } => *year,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Month { year, month } => write!(f, "{month:02}/{year}"),
            Period::Quarter { year, quarter } => write!(f, "Q{quarter}/{year}"),
        }
    }
}

/// Advance VAT return (Umsatzsteuervoranmeldung, form U30).
///
/// Every monetary field is one numbered line item ("Kennzahl") of the
/// form. Bases are net amounts; the payable line is derived, see
/// [`expected_payable`](Uva::expected_payable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uva {
    pub period: Period,
    /// KZ000: total turnover for the period.
    pub total_turnover: Amount,
    /// KZ022: base taxed at the 20% standard rate.
    pub standard_base: Amount,
    /// KZ029: base taxed at the 10% reduced rate.
    pub reduced_base_10: Amount,
    /// KZ006: base taxed at the 13% reduced rate.
    pub reduced_base_13: Amount,
    /// KZ061: import VAT payable.
    pub import_vat: Amount,
    /// KZ072: intra-Community acquisitions taxed at the standard rate.
    pub ic_acquisitions: Amount,
    /// KZ060: total deductible input tax.
    pub input_tax: Amount,
    /// KZ062: import VAT claimed as input tax.
    pub import_vat_deducted: Amount,
    /// KZ065: input tax on intra-Community acquisitions.
    pub ic_input_tax: Amount,
    /// KZ090: other corrections reducing the liability.
    pub adjustments: Amount,
    /// KZ083: payable (positive) or refund (negative). Derived.
    pub payable: Amount,
}

impl Uva {
    /// The payable amount the other line items imply.
    ///
    /// `0.20·KZ022 + 0.10·KZ029 + 0.13·KZ006 + KZ061 + 0.20·KZ072
    ///  − (KZ060 + KZ062 + KZ065 + KZ090)`, each product rounded
    /// half-to-even.
    pub fn expected_payable(&self) -> Amount {
        let output_tax = self.standard_base.percent(dec!(20))
            + self.reduced_base_10.percent(dec!(10))
            + self.reduced_base_13.percent(dec!(13))
            + self.import_vat
            + self.ic_acquisitions.percent(dec!(20));
        let deductions =
            self.input_tax + self.import_vat_deducted + self.ic_input_tax + self.adjustments;
        output_tax - deductions
    }

    /// Recompute KZ083 from the stored line items.
    pub fn calc_payable(&mut self) {
        self.payable = self.expected_payable();
    }
}

/// Builder for [`Uva`].
///
/// Unset line items stay zero. KZ000 defaults to the sum of the three
/// taxed bases; KZ083 is always derived.
#[derive(Debug, Clone)]
pub struct UvaBuilder {
    period: Period,
    total_turnover: Option<Amount>,
    standard_base: Amount,
    reduced_base_10: Amount,
    reduced_base_13: Amount,
    import_vat: Amount,
    ic_acquisitions: Amount,
    input_tax: Amount,
    import_vat_deducted: Amount,
    ic_input_tax: Amount,
    adjustments: Amount,
}

impl UvaBuilder {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            total_turnover: None,
            standard_base: Amount::ZERO,
            reduced_base_10: Amount::ZERO,
            reduced_base_13: Amount::ZERO,
            import_vat: Amount::ZERO,
            ic_acquisitions: Amount::ZERO,
            input_tax: Amount::ZERO,
            import_vat_deducted: Amount::ZERO,
            ic_input_tax: Amount::ZERO,
            adjustments: Amount::ZERO,
        }
    }

    pub fn total_turnover(mut self, amount: Amount) -> Self {
        self.total_turnover = Some(amount);
        self
    }

    pub fn standard_base(mut self, amount: Amount) -> Self {
        self.standard_base = amount;
        self
    }

    pub fn reduced_base_10(mut self, amount: Amount) -> Self {
        self.reduced_base_10 = amount;
        self
    }

    pub fn reduced_base_13(mut self, amount: Amount) -> Self {
        self.reduced_base_13 = amount;
        self
    }

    pub fn import_vat(mut self, amount: Amount) -> Self {
        self.import_vat = amount;
        self
    }

    pub fn ic_acquisitions(mut self, amount: Amount) -> Self {
        self.ic_acquisitions = amount;
        self
    }

    pub fn input_tax(mut self, amount: Amount) -> Self {
        self.input_tax = amount;
        self
    }

    pub fn import_vat_deducted(mut self, amount: Amount) -> Self {
        self.import_vat_deducted = amount;
        self
    }

    pub fn ic_input_tax(mut self, amount: Amount) -> Self {
        self.ic_input_tax = amount;
        self
    }

    pub fn adjustments(mut self, amount: Amount) -> Self {
        self.adjustments = amount;
        self
    }

    /// Assemble, derive KZ000 and KZ083, and validate.
    pub fn build(self) -> Result<Uva, FiskalError> {
        let uva = self.build_unchecked();
        let errors = validate_uva(&uva);
        if errors.is_empty() {
            Ok(uva)
        } else {
            Err(FiskalError::from_validation_errors(&errors))
        }
    }

    /// Assemble and derive without validating.
    pub fn build_unchecked(self) -> Uva {
        let total_turnover = self
            .total_turnover
            .unwrap_or(self.standard_base + self.reduced_base_10 + self.reduced_base_13);
        let mut uva = Uva {
            period: self.period,
            total_turnover,
            standard_base: self.standard_base,
            reduced_base_10: self.reduced_base_10,
            reduced_base_13: self.reduced_base_13,
            import_vat: self.import_vat,
            ic_acquisitions: self.ic_acquisitions,
            input_tax: self.input_tax,
            import_vat_deducted: self.import_vat_deducted,
            ic_input_tax: self.ic_input_tax,
            adjustments: self.adjustments,
            payable: Amount::ZERO,
        };
        uva.calc_payable();
        uva
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_payable_identity() {
        let uva = UvaBuilder::new(Period::month(2025, 1))
            .standard_base(Amount::from_cents(80_000))
            .input_tax(Amount::from_cents(1_600))
            .build()
            .unwrap();

        assert_eq!(uva.payable, Amount::from_cents(14_400));
        assert_eq!(uva.total_turnover, Amount::from_cents(80_000));
    }

    #[test]
    fn all_rates_contribute() {
        let uva = UvaBuilder::new(Period::quarter(2025, 2))
            .standard_base(Amount::from_cents(100_000))
            .reduced_base_10(Amount::from_cents(50_000))
            .reduced_base_13(Amount::from_cents(10_000))
            .import_vat(Amount::from_cents(700))
            .ic_acquisitions(Amount::from_cents(20_000))
            .input_tax(Amount::from_cents(3_000))
            .import_vat_deducted(Amount::from_cents(700))
            .ic_input_tax(Amount::from_cents(4_000))
            .adjustments(Amount::from_cents(100))
            .build()
            .unwrap();

        // 20000 + 5000 + 1300 + 700 + 4000 - (3000 + 700 + 4000 + 100)
        assert_eq!(uva.payable, Amount::from_cents(23_200));
        assert_eq!(uva.total_turnover, Amount::from_cents(160_000));
    }

    #[test]
    fn refund_is_negative_payable() {
        let uva = UvaBuilder::new(Period::month(2025, 7))
            .input_tax(Amount::from_cents(5_000))
            .build()
            .unwrap();
        assert_eq!(uva.payable, Amount::from_cents(-5_000));
    }

    #[test]
    fn explicit_total_turnover_wins() {
        let uva = UvaBuilder::new(Period::month(2025, 1))
            .total_turnover(Amount::from_cents(90_000))
            .standard_base(Amount::from_cents(80_000))
            .build()
            .unwrap();
        assert_eq!(uva.total_turnover, Amount::from_cents(90_000));
    }

    #[test]
    fn period_display() {
        assert_eq!(Period::month(2025, 3).to_string(), "03/2025");
        assert_eq!(Period::quarter(2025, 4).to_string(), "Q4/2025");
    }

    #[test]
    fn half_even_rounding_per_term() {
        // 10% of 25 cents is 2.5 cents; half-even rounds to 2
        let uva = UvaBuilder::new(Period::month(2025, 1))
            .reduced_base_10(Amount::from_cents(25))
            .build()
            .unwrap();
        assert_eq!(uva.payable, Amount::from_cents(2));

        // 10% of 35 cents is 3.5 cents; half-even rounds to 4
        let uva = UvaBuilder::new(Period::month(2025, 1))
            .reduced_base_10(Amount::from_cents(35))
            .build()
            .unwrap();
        assert_eq!(uva.payable, Amount::from_cents(4));
    }
}
