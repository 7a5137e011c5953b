use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Amount;

/// BG-0: Invoice — the top-level document, shared by the UBL and CII
/// renderings. Monetary fields are euro cents; quantities and rates are
/// decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// BT-1: Invoice number (unique, gapless within sequence).
    pub number: String,
    /// BT-3: Invoice type code (UNTDID 1001).
    pub type_code: InvoiceTypeCode,
    /// BT-2: Invoice issue date.
    pub issue_date: NaiveDate,
    /// BT-9: Payment due date.
    pub due_date: Option<NaiveDate>,
    /// BT-5: Invoice currency code (ISO 4217).
    pub currency_code: String,
    /// BT-10: Buyer reference (Leitweg-ID for XRechnung).
    pub buyer_reference: Option<String>,
    /// BT-13: Purchase order reference.
    pub order_reference: Option<String>,
    /// BT-22: Notes / free text.
    pub notes: Vec<String>,
    /// BG-4: Seller.
    pub seller: Party,
    /// BG-7: Buyer.
    pub buyer: Party,
    /// BG-25: Invoice lines.
    pub lines: Vec<InvoiceLine>,
    /// BG-16/BG-17: Payment instructions (bank account block).
    pub payment: Option<PaymentDetails>,
    /// BG-22: Calculated totals; set by `calc_totals`.
    pub totals: Option<Totals>,
}

/// BG-4 / BG-7: Party (seller or buyer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Name.
    pub name: String,
    /// BT-31 / BT-48: VAT identifier (e.g. "ATU12345678").
    pub vat_id: Option<String>,
    /// BT-30 / BT-47: Companies-register number.
    pub registration_id: Option<String>,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BT-43 / BT-58: Contact email.
    pub email: Option<String>,
}

/// BG-5 / BG-8: Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// BT-35 / BT-50: Street + house number.
    pub street: Option<String>,
    /// BT-37 / BT-52: City.
    pub city: String,
    /// BT-38 / BT-53: Postal code.
    pub postal_code: String,
    /// BT-40 / BT-55: Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
}

/// BG-25: Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// BT-126: Line identifier.
    pub id: String,
    /// BT-153: Item name / description.
    pub description: String,
    /// BT-129: Invoiced quantity.
    pub quantity: Decimal,
    /// BT-130: Unit of measure (UNECE Rec 20).
    pub unit: String,
    /// BT-146: Net unit price in minor units.
    pub unit_price: Amount,
    /// BT-151: Tax category.
    pub tax_category: TaxCategory,
    /// BT-152: Tax rate percentage.
    pub tax_rate: Decimal,
    /// BT-131: Line net amount; set by `calc_totals`.
    pub total: Option<Amount>,
}

/// UNTDID 5305 tax category codes used in Austrian invoicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCategory {
    /// S — standard rate (20%).
    Standard,
    /// AA — reduced rate (10% or 13%).
    Reduced,
    /// Z — zero rated.
    ZeroRated,
    /// E — exempt.
    Exempt,
    /// AE — reverse charge.
    ReverseCharge,
}

impl TaxCategory {
    /// UNTDID 5305 code letter.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Standard => "S",
            Self::Reduced => "AA",
            Self::ZeroRated => "Z",
            Self::Exempt => "E",
            Self::ReverseCharge => "AE",
        }
    }

    /// Parse from a UNTDID 5305 code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::Standard),
            "AA" => Some(Self::Reduced),
            "Z" => Some(Self::ZeroRated),
            "E" => Some(Self::Exempt),
            "AE" => Some(Self::ReverseCharge),
            _ => None,
        }
    }

    /// Whether the category carries a positive rate.
    pub fn requires_positive_rate(&self) -> bool {
        matches!(self, Self::Standard | Self::Reduced)
    }
}

/// UNTDID 1001 invoice type codes (subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceTypeCode {
    /// 380 — Commercial invoice.
    Invoice,
    /// 381 — Credit note.
    CreditNote,
    /// 384 — Corrected invoice.
    Corrected,
    /// 386 — Prepayment invoice.
    Prepayment,
}

impl InvoiceTypeCode {
    /// UNTDID 1001 numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Invoice => 380,
            Self::CreditNote => 381,
            Self::Corrected => 384,
            Self::Prepayment => 386,
        }
    }

    /// Parse from a UNTDID 1001 numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            380 => Some(Self::Invoice),
            381 => Some(Self::CreditNote),
            384 => Some(Self::Corrected),
            386 => Some(Self::Prepayment),
            _ => None,
        }
    }
}

/// BG-16/BG-17: Payment instructions (SEPA credit transfer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// BT-84: IBAN of the account to pay into.
    pub iban: String,
    /// BT-86: BIC.
    pub bic: Option<String>,
    /// BT-85: Account holder name.
    pub account_name: Option<String>,
    /// BT-83: Remittance information.
    pub remittance_info: Option<String>,
}

/// BG-22: Document totals with BG-23 tax breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// BT-106/BT-109: Sum of line net amounts.
    pub net: Amount,
    /// BT-110: Total tax amount.
    pub tax: Amount,
    /// BT-112: Tax-inclusive total.
    pub gross: Amount,
    /// BT-115: Amount due for payment.
    pub payable: Amount,
    /// BG-23: Per-(category, rate) subtotals, first-seen order.
    pub subtotals: Vec<TaxSubtotal>,
}

/// BG-23: Tax subtotal for one (category, rate) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    /// BT-118: Tax category.
    pub category: TaxCategory,
    /// BT-119: Tax rate percentage.
    pub rate: Decimal,
    /// BT-116: Taxable amount.
    pub taxable: Amount,
    /// BT-117: Tax amount.
    pub tax: Amount,
}
