//! Shared accumulator for the UBL and CII event parsers.
//!
//! Both codecs walk the document with a path stack and collect leaf text
//! into string fields; the conversion into a typed [`Invoice`] is common.

use chrono::NaiveDate;

use crate::core::FiskalError;
pub(super) use crate::xml::{parse_amount, parse_decimal, parse_iso_date};

use super::types::*;

#[derive(Default)]
pub(super) struct ParsedDoc {
    pub number: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub type_code: Option<String>,
    pub currency_code: Option<String>,
    pub buyer_reference: Option<String>,
    pub order_reference: Option<String>,
    pub notes: Vec<String>,

    pub seller: ParsedParty,
    pub buyer: ParsedParty,

    pub payment_iban: Option<String>,
    pub payment_bic: Option<String>,
    pub payment_account_name: Option<String>,
    pub payment_remittance: Option<String>,

    pub tax_amount: Option<String>,
    pub net: Option<String>,
    pub gross: Option<String>,
    pub payable: Option<String>,

    pub subtotals: Vec<ParsedSubtotal>,
    pub current_subtotal: Option<ParsedSubtotal>,

    pub lines: Vec<ParsedLine>,
    pub current_line: Option<ParsedLine>,

    pub current_unit_code: Option<String>,
}

#[derive(Default)]
pub(super) struct ParsedParty {
    pub name: Option<String>,
    pub vat_id: Option<String>,
    pub registration_id: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub email: Option<String>,
}

#[derive(Default, Clone)]
pub(super) struct ParsedSubtotal {
    pub taxable: Option<String>,
    pub tax: Option<String>,
    pub category: Option<String>,
    pub rate: Option<String>,
}

#[derive(Default, Clone)]
pub(super) struct ParsedLine {
    pub id: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub total: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<String>,
    pub tax_category: Option<String>,
    pub tax_rate: Option<String>,
}

pub(super) type DateParser = fn(&str) -> Result<NaiveDate, FiskalError>;

impl ParsedDoc {
    /// Commit the line under construction, if any.
    pub fn finish_line(&mut self) {
        if let Some(line) = self.current_line.take() {
            self.lines.push(line);
        }
    }

    /// Commit the tax breakdown under construction, if any.
    pub fn finish_subtotal(&mut self) {
        if let Some(sub) = self.current_subtotal.take() {
            self.subtotals.push(sub);
        }
    }

    pub fn into_invoice(self, parse_date: DateParser) -> Result<Invoice, FiskalError> {
        let number = self
            .number
            .ok_or_else(|| FiskalError::Codec("missing invoice number".into()))?;
        let issue_date = parse_date(
            self.issue_date
                .as_deref()
                .ok_or_else(|| FiskalError::Codec("missing issue date".into()))?,
        )?;
        let due_date = self.due_date.as_deref().map(parse_date).transpose()?;
        let type_code = match self.type_code {
            Some(raw) => {
                let code: u16 = raw
                    .parse()
                    .map_err(|_| FiskalError::Codec(format!("invalid type code '{raw}'")))?;
                InvoiceTypeCode::from_code(code)
                    .ok_or_else(|| FiskalError::Codec(format!("unknown type code {code}")))?
            }
            None => InvoiceTypeCode::Invoice,
        };
        let currency_code = self
            .currency_code
            .ok_or_else(|| FiskalError::Codec("missing currency code".into()))?;

        let seller = self.seller.into_party("seller")?;
        let buyer = self.buyer.into_party("buyer")?;

        let payment = self.payment_iban.map(|iban| PaymentDetails {
            iban,
            bic: self.payment_bic,
            account_name: self.payment_account_name,
            remittance_info: self.payment_remittance,
        });

        let mut lines = Vec::with_capacity(self.lines.len());
        for (i, raw) in self.lines.into_iter().enumerate() {
            lines.push(raw.into_line(i)?);
        }

        let totals = match (self.net, self.gross, self.payable, self.tax_amount) {
            (Some(net), Some(gross), Some(payable), Some(tax)) => {
                let mut subtotals = Vec::with_capacity(self.subtotals.len());
                for sub in self.subtotals {
                    subtotals.push(sub.into_subtotal()?);
                }
                Some(Totals {
                    net: parse_amount(&net)?,
                    tax: parse_amount(&tax)?,
                    gross: parse_amount(&gross)?,
                    payable: parse_amount(&payable)?,
                    subtotals,
                })
            }
            _ => None,
        };

        Ok(Invoice {
            number,
            type_code,
            issue_date,
            due_date,
            currency_code,
            buyer_reference: self.buyer_reference,
            order_reference: self.order_reference,
            notes: self.notes,
            seller,
            buyer,
            lines,
            payment,
            totals,
        })
    }
}

impl ParsedParty {
    fn into_party(self, role: &str) -> Result<Party, FiskalError> {
        Ok(Party {
            name: self
                .name
                .ok_or_else(|| FiskalError::Codec(format!("missing {role} name")))?,
            vat_id: self.vat_id,
            registration_id: self.registration_id,
            address: Address {
                street: self.street,
                city: self.city.unwrap_or_default(),
                postal_code: self.postal_code.unwrap_or_default(),
                country_code: self.country_code.unwrap_or_default(),
            },
            email: self.email,
        })
    }
}

impl ParsedSubtotal {
    fn into_subtotal(self) -> Result<TaxSubtotal, FiskalError> {
        let category_code = self
            .category
            .ok_or_else(|| FiskalError::Codec("tax breakdown without category".into()))?;
        Ok(TaxSubtotal {
            category: TaxCategory::from_code(&category_code).ok_or_else(|| {
                FiskalError::Codec(format!("unknown tax category '{category_code}'"))
            })?,
            rate: parse_decimal(self.rate.as_deref().unwrap_or("0"))?,
            taxable: parse_amount(
                self.taxable
                    .as_deref()
                    .ok_or_else(|| FiskalError::Codec("tax breakdown without base".into()))?,
            )?,
            tax: parse_amount(
                self.tax
                    .as_deref()
                    .ok_or_else(|| FiskalError::Codec("tax breakdown without tax".into()))?,
            )?,
        })
    }
}

impl ParsedLine {
    fn into_line(self, index: usize) -> Result<InvoiceLine, FiskalError> {
        let missing = |what: &str| FiskalError::Codec(format!("line {index}: missing {what}"));
        let category_code = self.tax_category.ok_or_else(|| missing("tax category"))?;
        Ok(InvoiceLine {
            id: self.id.ok_or_else(|| missing("id"))?,
            description: self.description.ok_or_else(|| missing("item name"))?,
            quantity: parse_decimal(&self.quantity.ok_or_else(|| missing("quantity"))?)?,
            unit: self.unit.unwrap_or_else(|| "C62".to_string()),
            unit_price: parse_amount(&self.unit_price.ok_or_else(|| missing("price"))?)?,
            tax_category: TaxCategory::from_code(&category_code).ok_or_else(|| {
                FiskalError::Codec(format!("unknown tax category '{category_code}'"))
            })?,
            tax_rate: parse_decimal(self.tax_rate.as_deref().unwrap_or("0"))?,
            total: self.total.as_deref().map(parse_amount).transpose()?,
        })
    }
}

/// Parse an UN/EDIFACT format 102 date (`20250502`).
pub(super) fn parse_102_date(s: &str) -> Result<NaiveDate, FiskalError> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| FiskalError::Codec(format!("invalid date '{s}'")))
}
