use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::{Amount, FiskalError};

use super::totals::calc_totals;
use super::types::*;
use super::validate::validate_invoice;

/// Builder for constructing valid invoices.
///
/// ```
/// use fiskal::erechnung::*;
/// use fiskal::Amount;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("R2025-001", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
///     .seller(
///         PartyBuilder::new("Muster GmbH", AddressBuilder::new("Wien", "1010", "AT").build())
///             .vat_id("ATU12345678")
///             .build(),
///     )
///     .buyer(PartyBuilder::new("Kunde AG", AddressBuilder::new("Graz", "8010", "AT").build()).build())
///     .add_line(
///         LineBuilder::new("1", "Beratung", dec!(10), "HUR", Amount::from_cents(15_000)).build(),
///     )
///     .build()
///     .unwrap();
/// assert!(invoice.totals.is_some());
/// ```
pub struct InvoiceBuilder {
    number: String,
    type_code: InvoiceTypeCode,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency_code: String,
    buyer_reference: Option<String>,
    order_reference: Option<String>,
    notes: Vec<String>,
    seller: Option<Party>,
    buyer: Option<Party>,
    lines: Vec<InvoiceLine>,
    payment: Option<PaymentDetails>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            type_code: InvoiceTypeCode::Invoice,
            issue_date,
            due_date: None,
            currency_code: "EUR".to_string(),
            buyer_reference: None,
            order_reference: None,
            notes: Vec::new(),
            seller: None,
            buyer: None,
            lines: Vec::new(),
            payment: None,
        }
    }

    pub fn type_code(mut self, code: InvoiceTypeCode) -> Self {
        self.type_code = code;
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn buyer_reference(mut self, reference: impl Into<String>) -> Self {
        self.buyer_reference = Some(reference.into());
        self
    }

    pub fn order_reference(mut self, reference: impl Into<String>) -> Self {
        self.order_reference = Some(reference.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = Some(party);
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = Some(party);
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn payment(mut self, payment: PaymentDetails) -> Self {
        self.payment = Some(payment);
        self
    }

    /// Build the invoice, calculating totals and running the full ruleset.
    /// Fails with all rule violations joined, not just the first.
    pub fn build(self) -> Result<Invoice, FiskalError> {
        let mut invoice = self.assemble()?;
        calc_totals(&mut invoice);
        let errors = validate_invoice(&invoice);
        if !errors.is_empty() {
            return Err(FiskalError::from_validation_errors(&errors));
        }
        Ok(invoice)
    }

    /// Build with totals but without validation, for importing external
    /// data that is checked separately.
    pub fn build_unchecked(self) -> Result<Invoice, FiskalError> {
        let mut invoice = self.assemble()?;
        calc_totals(&mut invoice);
        Ok(invoice)
    }

    fn assemble(self) -> Result<Invoice, FiskalError> {
        let seller = self
            .seller
            .ok_or_else(|| FiskalError::Builder("seller is required".into()))?;
        let buyer = self
            .buyer
            .ok_or_else(|| FiskalError::Builder("buyer is required".into()))?;
        if self.lines.is_empty() {
            return Err(FiskalError::Builder("at least one line is required".into()));
        }
        if self.lines.len() > 10_000 {
            return Err(FiskalError::Builder(
                "invoice cannot have more than 10,000 lines".into(),
            ));
        }

        Ok(Invoice {
            number: self.number,
            type_code: self.type_code,
            issue_date: self.issue_date,
            due_date: self.due_date,
            currency_code: self.currency_code,
            buyer_reference: self.buyer_reference,
            order_reference: self.order_reference,
            notes: self.notes,
            seller,
            buyer,
            lines: self.lines,
            payment: self.payment,
            totals: None,
        })
    }
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    vat_id: Option<String>,
    registration_id: Option<String>,
    address: Address,
    email: Option<String>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            vat_id: None,
            registration_id: None,
            address,
            email: None,
        }
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.vat_id = Some(id.into());
        self
    }

    pub fn registration_id(mut self, id: impl Into<String>) -> Self {
        self.registration_id = Some(id.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            vat_id: self.vat_id,
            registration_id: self.registration_id,
            address: self.address,
            email: self.email,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: Option<String>,
    city: String,
    postal_code: String,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            city: city.into(),
            postal_code: postal_code.into(),
            country_code: country_code.into(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            country_code: self.country_code,
        }
    }
}

/// Builder for an invoice line. Defaults to the Austrian standard rate.
pub struct LineBuilder {
    id: String,
    description: String,
    quantity: Decimal,
    unit: String,
    unit_price: Amount,
    tax_category: TaxCategory,
    tax_rate: Decimal,
}

impl LineBuilder {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
        unit_price: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit: unit.into(),
            unit_price,
            tax_category: TaxCategory::Standard,
            tax_rate: dec!(20),
        }
    }

    pub fn tax(mut self, category: TaxCategory, rate: Decimal) -> Self {
        self.tax_category = category;
        self.tax_rate = rate;
        self
    }

    pub fn build(self) -> InvoiceLine {
        InvoiceLine {
            id: self.id,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            tax_category: self.tax_category,
            tax_rate: self.tax_rate,
            total: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller() -> Party {
        PartyBuilder::new("Muster GmbH", AddressBuilder::new("Wien", "1010", "AT").build())
            .vat_id("ATU12345678")
            .build()
    }

    fn buyer() -> Party {
        PartyBuilder::new("Kunde AG", AddressBuilder::new("Graz", "8010", "AT").build()).build()
    }

    #[test]
    fn builds_and_totals() {
        let invoice = InvoiceBuilder::new("R2025-001", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .seller(seller())
            .buyer(buyer())
            .add_line(LineBuilder::new("1", "Beratung", dec!(10), "HUR", Amount::from_cents(15_000)).build())
            .build()
            .unwrap();

        let totals = invoice.totals.unwrap();
        assert_eq!(totals.net, Amount::from_cents(150_000));
        assert_eq!(totals.tax, Amount::from_cents(30_000));
        assert_eq!(totals.gross, Amount::from_cents(180_000));
    }

    #[test]
    fn missing_seller_fails() {
        let err = InvoiceBuilder::new("R2025-002", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .buyer(buyer())
            .add_line(LineBuilder::new("1", "X", dec!(1), "C62", Amount::from_cents(100)).build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("seller"));
    }

    #[test]
    fn empty_lines_fail() {
        let err = InvoiceBuilder::new("R2025-003", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .seller(seller())
            .buyer(buyer())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("line"));
    }

    #[test]
    fn validation_errors_surface() {
        // Standard category with rate 0 violates the category rule.
        let err = InvoiceBuilder::new("R2025-004", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .seller(seller())
            .buyer(buyer())
            .add_line(
                LineBuilder::new("1", "X", dec!(1), "C62", Amount::from_cents(100))
                    .tax(TaxCategory::Standard, dec!(0))
                    .build(),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, FiskalError::Validation(_)));
    }
}
