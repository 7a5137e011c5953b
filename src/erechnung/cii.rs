//! UN/CEFACT Cross Industry Invoice (CII) rendering and parsing.
//!
//! CII uses one root element for invoices and credit notes; the document
//! kind is carried by `ram:TypeCode`. Dates are written in UN/EDIFACT
//! format 102 (`YYYYMMDD`).

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::FiskalError;
use crate::xml::{XmlResult, XmlWriter, format_decimal};

use super::parse::{ParsedDoc, ParsedParty, parse_102_date};
use super::types::*;
use super::{CUSTOMIZATION_ID, cii_ns};

/// Render an invoice as a CII `CrossIndustryInvoice` document.
pub fn to_cii_xml(invoice: &Invoice) -> XmlResult {
    let totals = invoice.totals.as_ref().ok_or_else(|| {
        FiskalError::Builder("totals must be calculated before XML generation".into())
    })?;

    let currency = &invoice.currency_code;

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "rsm:CrossIndustryInvoice",
        &[
            ("xmlns:rsm", cii_ns::RSM),
            ("xmlns:ram", cii_ns::RAM),
            ("xmlns:qdt", cii_ns::QDT),
            ("xmlns:udt", cii_ns::UDT),
        ],
    )?;

    w.start_element("rsm:ExchangedDocumentContext")?;
    w.start_element("ram:GuidelineSpecifiedDocumentContextParameter")?;
    w.text_element("ram:ID", CUSTOMIZATION_ID)?;
    w.end_element("ram:GuidelineSpecifiedDocumentContextParameter")?;
    w.end_element("rsm:ExchangedDocumentContext")?;

    w.start_element("rsm:ExchangedDocument")?;
    w.text_element("ram:ID", &invoice.number)?;
    w.text_element("ram:TypeCode", &invoice.type_code.code().to_string())?;
    w.start_element("ram:IssueDateTime")?;
    write_102_date(&mut w, &invoice.issue_date)?;
    w.end_element("ram:IssueDateTime")?;
    for note in &invoice.notes {
        w.start_element("ram:IncludedNote")?;
        w.text_element("ram:Content", note)?;
        w.end_element("ram:IncludedNote")?;
    }
    w.end_element("rsm:ExchangedDocument")?;

    w.start_element("rsm:SupplyChainTradeTransaction")?;

    for line in &invoice.lines {
        write_line(&mut w, line)?;
    }

    w.start_element("ram:ApplicableHeaderTradeAgreement")?;
    if let Some(br) = &invoice.buyer_reference {
        w.text_element("ram:BuyerReference", br)?;
    }
    write_trade_party(&mut w, &invoice.seller, "ram:SellerTradeParty")?;
    write_trade_party(&mut w, &invoice.buyer, "ram:BuyerTradeParty")?;
    if let Some(or) = &invoice.order_reference {
        w.start_element("ram:BuyerOrderReferencedDocument")?;
        w.text_element("ram:IssuerAssignedID", or)?;
        w.end_element("ram:BuyerOrderReferencedDocument")?;
    }
    w.end_element("ram:ApplicableHeaderTradeAgreement")?;

    w.start_element("ram:ApplicableHeaderTradeDelivery")?;
    w.end_element("ram:ApplicableHeaderTradeDelivery")?;

    w.start_element("ram:ApplicableHeaderTradeSettlement")?;
    if let Some(payment) = &invoice.payment {
        if let Some(ri) = &payment.remittance_info {
            w.text_element("ram:PaymentReference", ri)?;
        }
    }
    w.text_element("ram:InvoiceCurrencyCode", currency)?;
    if let Some(payment) = &invoice.payment {
        w.start_element("ram:SpecifiedTradeSettlementPaymentMeans")?;
        // 58 = SEPA credit transfer (UNTDID 4461)
        w.text_element("ram:TypeCode", "58")?;
        w.start_element("ram:PayeePartyCreditorFinancialAccount")?;
        w.text_element("ram:IBANID", &payment.iban)?;
        if let Some(name) = &payment.account_name {
            w.text_element("ram:AccountName", name)?;
        }
        w.end_element("ram:PayeePartyCreditorFinancialAccount")?;
        if let Some(bic) = &payment.bic {
            w.start_element("ram:PayeeSpecifiedCreditorFinancialInstitution")?;
            w.text_element("ram:BICID", bic)?;
            w.end_element("ram:PayeeSpecifiedCreditorFinancialInstitution")?;
        }
        w.end_element("ram:SpecifiedTradeSettlementPaymentMeans")?;
    }
    for subtotal in &totals.subtotals {
        w.start_element("ram:ApplicableTradeTax")?;
        w.text_element("ram:CalculatedAmount", &subtotal.tax.to_string())?;
        w.text_element("ram:TypeCode", "VAT")?;
        w.text_element("ram:BasisAmount", &subtotal.taxable.to_string())?;
        w.text_element("ram:CategoryCode", subtotal.category.code())?;
        w.text_element("ram:RateApplicablePercent", &format_decimal(subtotal.rate))?;
        w.end_element("ram:ApplicableTradeTax")?;
    }
    if let Some(due) = &invoice.due_date {
        w.start_element("ram:SpecifiedTradePaymentTerms")?;
        w.start_element("ram:DueDateDateTime")?;
        write_102_date(&mut w, due)?;
        w.end_element("ram:DueDateDateTime")?;
        w.end_element("ram:SpecifiedTradePaymentTerms")?;
    }
    w.start_element("ram:SpecifiedTradeSettlementHeaderMonetarySummation")?;
    w.text_element("ram:LineTotalAmount", &totals.net.to_string())?;
    w.text_element("ram:TaxBasisTotalAmount", &totals.net.to_string())?;
    w.amount_element("ram:TaxTotalAmount", totals.tax, currency)?;
    w.text_element("ram:GrandTotalAmount", &totals.gross.to_string())?;
    w.text_element("ram:DuePayableAmount", &totals.payable.to_string())?;
    w.end_element("ram:SpecifiedTradeSettlementHeaderMonetarySummation")?;
    w.end_element("ram:ApplicableHeaderTradeSettlement")?;

    w.end_element("rsm:SupplyChainTradeTransaction")?;
    w.end_element("rsm:CrossIndustryInvoice")?;
    w.into_string()
}

fn write_102_date(w: &mut XmlWriter, date: &chrono::NaiveDate) -> Result<(), FiskalError> {
    w.text_element_with_attrs(
        "udt:DateTimeString",
        &date.format("%Y%m%d").to_string(),
        &[("format", "102")],
    )?;
    Ok(())
}

fn write_line(w: &mut XmlWriter, line: &InvoiceLine) -> Result<(), FiskalError> {
    w.start_element("ram:IncludedSupplyChainTradeLineItem")?;

    w.start_element("ram:AssociatedDocumentLineDocument")?;
    w.text_element("ram:LineID", &line.id)?;
    w.end_element("ram:AssociatedDocumentLineDocument")?;

    w.start_element("ram:SpecifiedTradeProduct")?;
    w.text_element("ram:Name", &line.description)?;
    w.end_element("ram:SpecifiedTradeProduct")?;

    w.start_element("ram:SpecifiedLineTradeAgreement")?;
    w.start_element("ram:NetPriceProductTradePrice")?;
    w.text_element("ram:ChargeAmount", &line.unit_price.to_string())?;
    w.end_element("ram:NetPriceProductTradePrice")?;
    w.end_element("ram:SpecifiedLineTradeAgreement")?;

    w.start_element("ram:SpecifiedLineTradeDelivery")?;
    w.quantity_element("ram:BilledQuantity", line.quantity, &line.unit)?;
    w.end_element("ram:SpecifiedLineTradeDelivery")?;

    w.start_element("ram:SpecifiedLineTradeSettlement")?;
    w.start_element("ram:ApplicableTradeTax")?;
    w.text_element("ram:TypeCode", "VAT")?;
    w.text_element("ram:CategoryCode", line.tax_category.code())?;
    w.text_element("ram:RateApplicablePercent", &format_decimal(line.tax_rate))?;
    w.end_element("ram:ApplicableTradeTax")?;
    if let Some(total) = line.total {
        w.start_element("ram:SpecifiedTradeSettlementLineMonetarySummation")?;
        w.text_element("ram:LineTotalAmount", &total.to_string())?;
        w.end_element("ram:SpecifiedTradeSettlementLineMonetarySummation")?;
    }
    w.end_element("ram:SpecifiedLineTradeSettlement")?;

    w.end_element("ram:IncludedSupplyChainTradeLineItem")?;
    Ok(())
}

fn write_trade_party(w: &mut XmlWriter, party: &Party, wrapper: &str) -> Result<(), FiskalError> {
    w.start_element(wrapper)?;
    w.text_element("ram:Name", &party.name)?;

    if let Some(reg_id) = &party.registration_id {
        w.start_element("ram:SpecifiedLegalOrganization")?;
        w.text_element("ram:ID", reg_id)?;
        w.end_element("ram:SpecifiedLegalOrganization")?;
    }

    if let Some(email) = &party.email {
        w.start_element("ram:DefinedTradeContact")?;
        w.start_element("ram:EmailURIUniversalCommunication")?;
        w.text_element("ram:URIID", email)?;
        w.end_element("ram:EmailURIUniversalCommunication")?;
        w.end_element("ram:DefinedTradeContact")?;
    }

    w.start_element("ram:PostalTradeAddress")?;
    w.text_element("ram:PostcodeCode", &party.address.postal_code)?;
    if let Some(street) = &party.address.street {
        w.text_element("ram:LineOne", street)?;
    }
    w.text_element("ram:CityName", &party.address.city)?;
    w.text_element("ram:CountryID", &party.address.country_code)?;
    w.end_element("ram:PostalTradeAddress")?;

    if let Some(vat_id) = &party.vat_id {
        w.start_element("ram:SpecifiedTaxRegistration")?;
        w.text_element_with_attrs("ram:ID", vat_id, &[("schemeID", "VA")])?;
        w.end_element("ram:SpecifiedTaxRegistration")?;
    }

    w.end_element(wrapper)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const LINE_ITEM: &str = "ram:IncludedSupplyChainTradeLineItem";

/// Parse a CII `CrossIndustryInvoice` document.
pub fn from_cii_xml(xml: &str) -> Result<Invoice, FiskalError> {
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

                if name == "ram:BilledQuantity" {
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
                    handle_cii_text(&mut parsed, &path, &text);
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                match ended.as_str() {
                    LINE_ITEM => parsed.finish_line(),
                    // header-level breakdown only; line tax repeats the rate
                    "ram:ApplicableTradeTax" if !path.iter().any(|p| p == LINE_ITEM) => {
                        parsed.finish_subtotal();
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FiskalError::Codec(format!("cii parse error: {e}"))),
            _ => {}
        }
    }

    parsed.into_invoice(parse_102_date)
}

fn handle_cii_text(parsed: &mut ParsedDoc, path: &[String], text: &str) {
    let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
    let parent = if path.len() >= 2 { path[path.len() - 2].as_str() } else { "" };

    let in_line = path.iter().any(|p| p == LINE_ITEM);
    let in_seller = path.iter().any(|p| p == "ram:SellerTradeParty");
    let in_buyer = path.iter().any(|p| p == "ram:BuyerTradeParty");

    if !in_line && !in_seller && !in_buyer {
        match leaf {
            "ram:ID" if parent == "rsm:ExchangedDocument" => {
                parsed.number = Some(text.to_string());
            }
            "ram:TypeCode" if parent == "rsm:ExchangedDocument" => {
                parsed.type_code = Some(text.to_string());
            }
            "udt:DateTimeString" if parent == "ram:IssueDateTime" => {
                parsed.issue_date = Some(text.to_string());
            }
            "udt:DateTimeString" if parent == "ram:DueDateDateTime" => {
                parsed.due_date = Some(text.to_string());
            }
            "ram:Content" if parent == "ram:IncludedNote" => {
                parsed.notes.push(text.to_string());
            }
            "ram:BuyerReference" => parsed.buyer_reference = Some(text.to_string()),
            "ram:IssuerAssignedID" if parent == "ram:BuyerOrderReferencedDocument" => {
                parsed.order_reference = Some(text.to_string());
            }
            "ram:PaymentReference" => parsed.payment_remittance = Some(text.to_string()),
            "ram:InvoiceCurrencyCode" => parsed.currency_code = Some(text.to_string()),
            "ram:IBANID" => parsed.payment_iban = Some(text.to_string()),
            "ram:AccountName" => parsed.payment_account_name = Some(text.to_string()),
            "ram:BICID" => parsed.payment_bic = Some(text.to_string()),
            "ram:LineTotalAmount"
                if parent == "ram:SpecifiedTradeSettlementHeaderMonetarySummation" =>
            {
                parsed.net = Some(text.to_string());
            }
            "ram:TaxTotalAmount" => parsed.tax_amount = Some(text.to_string()),
            "ram:GrandTotalAmount" => parsed.gross = Some(text.to_string()),
            "ram:DuePayableAmount" => parsed.payable = Some(text.to_string()),
            _ => {}
        }

        if parent == "ram:ApplicableTradeTax" {
            let sub = parsed.current_subtotal.get_or_insert_with(Default::default);
            match leaf {
                "ram:CalculatedAmount" => sub.tax = Some(text.to_string()),
                "ram:BasisAmount" => sub.taxable = Some(text.to_string()),
                "ram:CategoryCode" => sub.category = Some(text.to_string()),
                "ram:RateApplicablePercent" => sub.rate = Some(text.to_string()),
                _ => {}
            }
        }
    }

    if (in_seller || in_buyer) && !in_line {
        let party = if in_seller { &mut parsed.seller } else { &mut parsed.buyer };
        handle_cii_party_text(party, leaf, parent, text);
    }

    if in_line {
        let line = parsed.current_line.get_or_insert_with(Default::default);
        match leaf {
            "ram:LineID" => line.id = Some(text.to_string()),
            "ram:Name" if parent == "ram:SpecifiedTradeProduct" => {
                line.description = Some(text.to_string());
            }
            "ram:ChargeAmount" => line.unit_price = Some(text.to_string()),
            "ram:BilledQuantity" => {
                line.quantity = Some(text.to_string());
                line.unit = parsed.current_unit_code.take();
            }
            "ram:CategoryCode" => line.tax_category = Some(text.to_string()),
            "ram:RateApplicablePercent" => line.tax_rate = Some(text.to_string()),
            "ram:LineTotalAmount" => line.total = Some(text.to_string()),
            _ => {}
        }
    }
}

fn handle_cii_party_text(party: &mut ParsedParty, leaf: &str, parent: &str, text: &str) {
    match leaf {
        "ram:Name" if parent == "ram:SellerTradeParty" || parent == "ram:BuyerTradeParty" => {
            party.name = Some(text.to_string());
        }
        "ram:ID" if parent == "ram:SpecifiedLegalOrganization" => {
            party.registration_id = Some(text.to_string());
        }
        "ram:ID" if parent == "ram:SpecifiedTaxRegistration" => {
            party.vat_id = Some(text.to_string());
        }
        "ram:URIID" if parent == "ram:EmailURIUniversalCommunication" => {
            party.email = Some(text.to_string());
        }
        "ram:PostcodeCode" => party.postal_code = Some(text.to_string()),
        "ram:LineOne" => party.street = Some(text.to_string()),
        "ram:CityName" => party.city = Some(text.to_string()),
        "ram:CountryID" => party.country_code = Some(text.to_string()),
        _ => {}
    }
}
