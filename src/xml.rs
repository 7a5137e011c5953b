//! Shared XML writing helpers for the document codecs.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;

use crate::core::{Amount, FiskalError};

pub type XmlResult = Result<String, FiskalError>;

fn xml_io(e: std::io::Error) -> FiskalError {
    FiskalError::Codec(format!("xml write error: {e}"))
}

/// Event-writer wrapper producing indented UTF-8 documents.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, FiskalError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, FiskalError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| FiskalError::Codec(format!("xml utf-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, FiskalError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, FiskalError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, FiskalError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, FiskalError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, FiskalError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write a minor-unit amount as a 2-decimal value with a currencyID
    /// attribute.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Amount,
        currency: &str,
    ) -> Result<&mut Self, FiskalError> {
        self.text_element_with_attrs(name, &amount.to_string(), &[("currencyID", currency)])
    }

    /// Write a quantity with a unitCode attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
    ) -> Result<&mut Self, FiskalError> {
        self.text_element_with_attrs(name, &format_decimal(qty), &[("unitCode", unit)])
    }
}

/// Parse a wire decimal.
pub(crate) fn parse_decimal(s: &str) -> Result<Decimal, FiskalError> {
    use std::str::FromStr;
    Decimal::from_str(s).map_err(|_| FiskalError::Codec(format!("invalid decimal '{s}'")))
}

/// Parse a wire amount ("123.45", "123.4", "123") into minor units.
pub(crate) fn parse_amount(s: &str) -> Result<Amount, FiskalError> {
    Amount::from_decimal(parse_decimal(s)?)
        .map_err(|_| FiskalError::Codec(format!("amount '{s}' has sub-cent precision")))
}

/// Parse an ISO 8601 calendar date (`2025-05-02`).
pub(crate) fn parse_iso_date(s: &str) -> Result<chrono::NaiveDate, FiskalError> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| FiskalError::Codec(format!("invalid date '{s}'")))
}

/// Format a Decimal for XML output with at least 2 decimal places and no
/// trailing zeros beyond that.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}
