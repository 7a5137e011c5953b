//! UBL 2.1 rendering and parsing (XRechnung).

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::FiskalError;
use crate::xml::{XmlResult, XmlWriter, format_decimal};

use super::parse::{ParsedDoc, ParsedParty, parse_iso_date};
use super::types::*;
use super::{CUSTOMIZATION_ID, PROFILE_ID, ubl_ns};

/// Render an invoice as an XRechnung-compliant UBL 2.1 document.
pub fn to_ubl_xml(invoice: &Invoice) -> XmlResult {
    let totals = invoice.totals.as_ref().ok_or_else(|| {
        FiskalError::Builder("totals must be calculated before XML generation".into())
    })?;

    let currency = &invoice.currency_code;
    let is_credit_note = invoice.type_code == InvoiceTypeCode::CreditNote;
    let root_tag = if is_credit_note { "ubl:CreditNote" } else { "ubl:Invoice" };
    let root_ns = if is_credit_note { ubl_ns::CREDIT_NOTE } else { ubl_ns::INVOICE };

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        root_tag,
        &[
            ("xmlns:ubl", root_ns),
            ("xmlns:cac", ubl_ns::CAC),
            ("xmlns:cbc", ubl_ns::CBC),
        ],
    )?;

    w.text_element("cbc:CustomizationID", CUSTOMIZATION_ID)?;
    w.text_element("cbc:ProfileID", PROFILE_ID)?;
    w.text_element("cbc:ID", &invoice.number)?;
    w.text_element("cbc:IssueDate", &invoice.issue_date.to_string())?;
    if let Some(due) = &invoice.due_date {
        w.text_element("cbc:DueDate", &due.to_string())?;
    }
    let type_tag = if is_credit_note { "cbc:CreditNoteTypeCode" } else { "cbc:InvoiceTypeCode" };
    w.text_element(type_tag, &invoice.type_code.code().to_string())?;
    for note in &invoice.notes {
        w.text_element("cbc:Note", note)?;
    }
    w.text_element("cbc:DocumentCurrencyCode", currency)?;
    if let Some(br) = &invoice.buyer_reference {
        w.text_element("cbc:BuyerReference", br)?;
    }
    if let Some(or) = &invoice.order_reference {
        w.start_element("cac:OrderReference")?;
        w.text_element("cbc:ID", or)?;
        w.end_element("cac:OrderReference")?;
    }

    write_party(&mut w, &invoice.seller, "cac:AccountingSupplierParty")?;
    write_party(&mut w, &invoice.buyer, "cac:AccountingCustomerParty")?;

    if let Some(payment) = &invoice.payment {
        w.start_element("cac:PaymentMeans")?;
        // 58 = SEPA credit transfer (UNTDID 4461)
        w.text_element("cbc:PaymentMeansCode", "58")?;
        if let Some(ri) = &payment.remittance_info {
            w.text_element("cbc:PaymentID", ri)?;
        }
        w.start_element("cac:PayeeFinancialAccount")?;
        w.text_element("cbc:ID", &payment.iban)?;
        if let Some(name) = &payment.account_name {
            w.text_element("cbc:Name", name)?;
        }
        if let Some(bic) = &payment.bic {
            w.start_element("cac:FinancialInstitutionBranch")?;
            w.text_element("cbc:ID", bic)?;
            w.end_element("cac:FinancialInstitutionBranch")?;
        }
        w.end_element("cac:PayeeFinancialAccount")?;
        w.end_element("cac:PaymentMeans")?;
    }

    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", totals.tax, currency)?;
    for subtotal in &totals.subtotals {
        w.start_element("cac:TaxSubtotal")?;
        w.amount_element("cbc:TaxableAmount", subtotal.taxable, currency)?;
        w.amount_element("cbc:TaxAmount", subtotal.tax, currency)?;
        w.start_element("cac:TaxCategory")?;
        w.text_element("cbc:ID", subtotal.category.code())?;
        w.text_element("cbc:Percent", &format_decimal(subtotal.rate))?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:TaxCategory")?;
        w.end_element("cac:TaxSubtotal")?;
    }
    w.end_element("cac:TaxTotal")?;

    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element("cbc:LineExtensionAmount", totals.net, currency)?;
    w.amount_element("cbc:TaxExclusiveAmount", totals.net, currency)?;
    w.amount_element("cbc:TaxInclusiveAmount", totals.gross, currency)?;
    w.amount_element("cbc:PayableAmount", totals.payable, currency)?;
    w.end_element("cac:LegalMonetaryTotal")?;

    let (line_tag, qty_tag) = if is_credit_note {
        ("cac:CreditNoteLine", "cbc:CreditedQuantity")
    } else {
        ("cac:InvoiceLine", "cbc:InvoicedQuantity")
    };
    for line in &invoice.lines {
        w.start_element(line_tag)?;
        w.text_element("cbc:ID", &line.id)?;
        w.quantity_element(qty_tag, line.quantity, &line.unit)?;
        if let Some(total) = line.total {
            w.amount_element("cbc:LineExtensionAmount", total, currency)?;
        }
        w.start_element("cac:Item")?;
        w.text_element("cbc:Name", &line.description)?;
        w.start_element("cac:ClassifiedTaxCategory")?;
        w.text_element("cbc:ID", line.tax_category.code())?;
        w.text_element("cbc:Percent", &format_decimal(line.tax_rate))?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:ClassifiedTaxCategory")?;
        w.end_element("cac:Item")?;
        w.start_element("cac:Price")?;
        w.amount_element("cbc:PriceAmount", line.unit_price, currency)?;
        w.end_element("cac:Price")?;
        w.end_element(line_tag)?;
    }

    w.end_element(root_tag)?;
    w.into_string()
}

fn write_party(w: &mut XmlWriter, party: &Party, wrapper: &str) -> Result<(), FiskalError> {
    w.start_element(wrapper)?;
    w.start_element("cac:Party")?;

    w.start_element("cac:PostalAddress")?;
    if let Some(street) = &party.address.street {
        w.text_element("cbc:StreetName", street)?;
    }
    w.text_element("cbc:CityName", &party.address.city)?;
    w.text_element("cbc:PostalZone", &party.address.postal_code)?;
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", &party.address.country_code)?;
    w.end_element("cac:Country")?;
    w.end_element("cac:PostalAddress")?;

    if let Some(vat_id) = &party.vat_id {
        w.start_element("cac:PartyTaxScheme")?;
        w.text_element("cbc:CompanyID", vat_id)?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:PartyTaxScheme")?;
    }

    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &party.name)?;
    if let Some(reg_id) = &party.registration_id {
        w.text_element("cbc:CompanyID", reg_id)?;
    }
    w.end_element("cac:PartyLegalEntity")?;

    if let Some(email) = &party.email {
        w.start_element("cac:Contact")?;
        w.text_element("cbc:ElectronicMail", email)?;
        w.end_element("cac:Contact")?;
    }

    w.end_element("cac:Party")?;
    w.end_element(wrapper)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a UBL Invoice or CreditNote document.
pub fn from_ubl_xml(xml: &str) -> Result<Invoice, FiskalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedDoc::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();

                if matches!(
                    name.as_str(),
                    "cbc:InvoicedQuantity" | "cbc:CreditedQuantity"
                ) {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"unitCode" {
                            parsed.current_unit_code =
                                Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }

                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    handle_ubl_text(&mut parsed, &path, &text);
                }
            }
            Ok(Event::End(_)) => match path.pop().unwrap_or_default().as_str() {
                "cac:InvoiceLine" | "cac:CreditNoteLine" => parsed.finish_line(),
                "cac:TaxSubtotal" => parsed.finish_subtotal(),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(FiskalError::Codec(format!("ubl parse error: {e}"))),
            _ => {}
        }
    }

    parsed.into_invoice(parse_iso_date)
}

fn is_ubl_root(name: &str) -> bool {
    matches!(
        name,
        "ubl:Invoice" | "ubl:CreditNote" | "Invoice" | "CreditNote"
    )
}

fn handle_ubl_text(parsed: &mut ParsedDoc, path: &[String], text: &str) {
    let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
    let parent = if path.len() >= 2 { path[path.len() - 2].as_str() } else { "" };

    let in_seller = path.iter().any(|p| p == "cac:AccountingSupplierParty");
    let in_buyer = path.iter().any(|p| p == "cac:AccountingCustomerParty");
    let in_line = path
        .iter()
        .any(|p| p == "cac:InvoiceLine" || p == "cac:CreditNoteLine");
    let in_subtotal = path.iter().any(|p| p == "cac:TaxSubtotal");

    if !in_seller && !in_buyer && !in_line {
        match leaf {
            "cbc:ID" if is_ubl_root(parent) => parsed.number = Some(text.to_string()),
            "cbc:IssueDate" if is_ubl_root(parent) => {
                parsed.issue_date = Some(text.to_string());
            }
            "cbc:DueDate" => parsed.due_date = Some(text.to_string()),
            "cbc:InvoiceTypeCode" | "cbc:CreditNoteTypeCode" => {
                parsed.type_code = Some(text.to_string());
            }
            "cbc:DocumentCurrencyCode" => parsed.currency_code = Some(text.to_string()),
            "cbc:BuyerReference" => parsed.buyer_reference = Some(text.to_string()),
            "cbc:Note" if is_ubl_root(parent) => parsed.notes.push(text.to_string()),
            "cbc:ID" if parent == "cac:OrderReference" => {
                parsed.order_reference = Some(text.to_string());
            }
            "cbc:PaymentID" if parent == "cac:PaymentMeans" => {
                parsed.payment_remittance = Some(text.to_string());
            }
            "cbc:ID" if parent == "cac:PayeeFinancialAccount" => {
                parsed.payment_iban = Some(text.to_string());
            }
            "cbc:Name" if parent == "cac:PayeeFinancialAccount" => {
                parsed.payment_account_name = Some(text.to_string());
            }
            "cbc:ID" if parent == "cac:FinancialInstitutionBranch" => {
                parsed.payment_bic = Some(text.to_string());
            }
            "cbc:TaxAmount" if parent == "cac:TaxTotal" => {
                parsed.tax_amount = Some(text.to_string());
            }
            "cbc:TaxExclusiveAmount" => parsed.net = Some(text.to_string()),
            "cbc:TaxInclusiveAmount" => parsed.gross = Some(text.to_string()),
            "cbc:PayableAmount" => parsed.payable = Some(text.to_string()),
            _ => {}
        }

        if in_subtotal {
            let sub = parsed.current_subtotal.get_or_insert_with(Default::default);
            match leaf {
                "cbc:TaxableAmount" if parent == "cac:TaxSubtotal" => {
                    sub.taxable = Some(text.to_string());
                }
                "cbc:TaxAmount" if parent == "cac:TaxSubtotal" => {
                    sub.tax = Some(text.to_string());
                }
                "cbc:ID" if parent == "cac:TaxCategory" => {
                    sub.category = Some(text.to_string());
                }
                "cbc:Percent" if parent == "cac:TaxCategory" => {
                    sub.rate = Some(text.to_string());
                }
                _ => {}
            }
        }
    }

    if in_seller && !in_line {
        handle_ubl_party_text(&mut parsed.seller, leaf, parent, text);
    }
    if in_buyer && !in_line {
        handle_ubl_party_text(&mut parsed.buyer, leaf, parent, text);
    }

    if in_line {
        let line = parsed.current_line.get_or_insert_with(Default::default);
        match leaf {
            "cbc:ID" if parent == "cac:InvoiceLine" || parent == "cac:CreditNoteLine" => {
                line.id = Some(text.to_string());
            }
            "cbc:InvoicedQuantity" | "cbc:CreditedQuantity" => {
                line.quantity = Some(text.to_string());
                line.unit = parsed.current_unit_code.take();
            }
            "cbc:LineExtensionAmount" => line.total = Some(text.to_string()),
            "cbc:Name" if parent == "cac:Item" => {
                line.description = Some(text.to_string());
            }
            "cbc:PriceAmount" => line.unit_price = Some(text.to_string()),
            "cbc:ID" if parent == "cac:ClassifiedTaxCategory" => {
                line.tax_category = Some(text.to_string());
            }
            "cbc:Percent" if parent == "cac:ClassifiedTaxCategory" => {
                line.tax_rate = Some(text.to_string());
            }
            _ => {}
        }
    }
}

fn handle_ubl_party_text(party: &mut ParsedParty, leaf: &str, parent: &str, text: &str) {
    match leaf {
        "cbc:RegistrationName" if parent == "cac:PartyLegalEntity" => {
            party.name = Some(text.to_string());
        }
        "cbc:CompanyID" if parent == "cac:PartyTaxScheme" => {
            party.vat_id = Some(text.to_string());
        }
        "cbc:CompanyID" if parent == "cac:PartyLegalEntity" => {
            party.registration_id = Some(text.to_string());
        }
        "cbc:StreetName" => party.street = Some(text.to_string()),
        "cbc:CityName" => party.city = Some(text.to_string()),
        "cbc:PostalZone" => party.postal_code = Some(text.to_string()),
        "cbc:IdentificationCode" if parent == "cac:Country" => {
            party.country_code = Some(text.to_string());
        }
        "cbc:ElectronicMail" if parent == "cac:Contact" => {
            party.email = Some(text.to_string());
        }
        _ => {}
    }
}
