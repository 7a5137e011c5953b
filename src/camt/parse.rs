//! camt.053 event parsing.

use chrono::NaiveDateTime;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::FiskalError;
use crate::xml::{parse_amount, parse_iso_date};

use super::types::{Balance, BankStatement, CreditDebit, StatementEntry};

#[derive(Default)]
struct RawBalance {
    kind: Option<String>,
    amount: Option<String>,
    currency: Option<String>,
    indicator: Option<String>,
    date: Option<String>,
}

impl RawBalance {
    fn into_balance(self) -> Result<Balance, FiskalError> {
        let missing = |what: &str| FiskalError::Codec(format!("Bal: missing {what}"));
        let indicator = self.indicator.ok_or_else(|| missing("CdtDbtInd"))?;
        Ok(Balance {
            amount: parse_amount(&self.amount.ok_or_else(|| missing("Amt"))?)?,
            currency: self.currency.unwrap_or_else(|| "EUR".to_string()),
            credit_debit: CreditDebit::from_code(&indicator).ok_or_else(|| {
                FiskalError::Codec(format!("Bal: unknown CdtDbtInd '{indicator}'"))
            })?,
            date: parse_iso_date(&self.date.ok_or_else(|| missing("Dt"))?)?,
        })
    }
}

#[derive(Default)]
struct RawEntry {
    amount: Option<String>,
    currency: Option<String>,
    indicator: Option<String>,
    booking_date: Option<String>,
    value_date: Option<String>,
    end_to_end_ref: Option<String>,
    transaction_ref: Option<String>,
    counterparty_name: Option<String>,
    counterparty_iban: Option<String>,
    description: Option<String>,
}

impl RawEntry {
    fn into_entry(self, index: usize) -> Result<StatementEntry, FiskalError> {
        let missing = |what: &str| FiskalError::Codec(format!("Ntry {index}: missing {what}"));
        let indicator = self.indicator.ok_or_else(|| missing("CdtDbtInd"))?;
        Ok(StatementEntry {
            amount: parse_amount(&self.amount.ok_or_else(|| missing("Amt"))?)?,
            currency: self.currency.unwrap_or_else(|| "EUR".to_string()),
            credit_debit: CreditDebit::from_code(&indicator).ok_or_else(|| {
                FiskalError::Codec(format!("Ntry {index}: unknown CdtDbtInd '{indicator}'"))
            })?,
            booking_date: parse_iso_date(&self.booking_date.ok_or_else(|| missing("BookgDt"))?)?,
            value_date: self.value_date.as_deref().map(parse_iso_date).transpose()?,
            end_to_end_ref: self.end_to_end_ref.filter(|r| r != "NOTPROVIDED"),
            transaction_ref: self.transaction_ref,
            counterparty_name: self.counterparty_name,
            counterparty_iban: self.counterparty_iban,
            description: self.description,
        })
    }
}

/// Parse a camt.053 bank-to-customer statement. Only the first `Stmt`
/// block of the document is read.
pub fn from_camt053_xml(xml: &str) -> Result<BankStatement, FiskalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut statement_id: Option<String> = None;
    let mut account_iban: Option<String> = None;
    let mut created_at: Option<NaiveDateTime> = None;
    let mut opening: Option<Balance> = None;
    let mut closing: Option<Balance> = None;
    let mut entries: Vec<StatementEntry> = Vec::new();

    let mut current_balance: Option<RawBalance> = None;
    let mut current_entry: Option<RawEntry> = None;
    let mut pending_ccy: Option<String> = None;
    let mut statements_seen = 0u32;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                match name.as_str() {
                    "Stmt" => statements_seen += 1,
                    "Bal" if statements_seen == 1 => current_balance = Some(RawBalance::default()),
                    "Ntry" if statements_seen == 1 => current_entry = Some(RawEntry::default()),
                    "Amt" => {
                        pending_ccy = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"Ccy" {
                                pending_ccy =
                                    Some(String::from_utf8_lossy(&attr.value).into_owned());
                            }
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if text.is_empty() || statements_seen != 1 {
                    continue;
                }
                handle_text(
                    &path,
                    text,
                    &mut statement_id,
                    &mut account_iban,
                    &mut created_at,
                    &mut current_balance,
                    &mut current_entry,
                    &mut pending_ccy,
                );
            }
            Ok(Event::End(_)) => match path.pop().unwrap_or_default().as_str() {
                "Bal" => {
                    if let Some(raw) = current_balance.take() {
                        match raw.kind.as_deref() {
                            Some("OPBD") => opening = Some(raw.into_balance()?),
                            Some("CLBD") => closing = Some(raw.into_balance()?),
                            // interim and forward balances are not modelled
                            _ => {}
                        }
                    }
                }
                "Ntry" => {
                    if let Some(raw) = current_entry.take() {
                        entries.push(raw.into_entry(entries.len())?);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(FiskalError::Codec(format!("camt parse error: {e}"))),
            _ => {}
        }
    }

    Ok(BankStatement {
        statement_id: statement_id
            .ok_or_else(|| FiskalError::Codec("missing statement Id".into()))?,
        account_iban: account_iban
            .ok_or_else(|| FiskalError::Codec("missing account IBAN".into()))?,
        created_at,
        opening_balance: opening,
        closing_balance: closing,
        entries,
    })
}

#[allow(clippy::too_many_arguments)]
fn handle_text(
    path: &[String],
    text: String,
    statement_id: &mut Option<String>,
    account_iban: &mut Option<String>,
    created_at: &mut Option<NaiveDateTime>,
    current_balance: &mut Option<RawBalance>,
    current_entry: &mut Option<RawEntry>,
    pending_ccy: &mut Option<String>,
) {
    let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
    let parent = if path.len() >= 2 {
        path[path.len() - 2].as_str()
    } else {
        ""
    };

    if let Some(bal) = current_balance.as_mut() {
        match leaf {
            "Cd" if parent == "CdOrPrtry" => bal.kind = Some(text),
            "Amt" => {
                bal.amount = Some(text);
                bal.currency = pending_ccy.take();
            }
            "CdtDbtInd" => bal.indicator = Some(text),
            "Dt" => bal.date = Some(text),
            _ => {}
        }
        return;
    }

    if let Some(entry) = current_entry.as_mut() {
        match leaf {
            "Amt" if parent == "Ntry" => {
                entry.amount = Some(text);
                entry.currency = pending_ccy.take();
            }
            "CdtDbtInd" if parent == "Ntry" => entry.indicator = Some(text),
            "Dt" if parent == "BookgDt" => entry.booking_date = Some(text),
            "Dt" if parent == "ValDt" => entry.value_date = Some(text),
            "EndToEndId" => entry.end_to_end_ref = Some(text),
            "AcctSvcrRef" | "NtryRef" => entry.transaction_ref = Some(text),
            "Nm" if parent == "Dbtr" || parent == "Cdtr" => {
                entry.counterparty_name.get_or_insert(text);
            }
            "IBAN" => {
                entry.counterparty_iban.get_or_insert(text);
            }
            "Ustrd" | "AddtlNtryInf" => {
                entry.description.get_or_insert(text);
            }
            _ => {}
        }
        return;
    }

    match leaf {
        "Id" if parent == "Stmt" => *statement_id = Some(text),
        "IBAN" => *account_iban = Some(text),
        "CreDtTm" if parent == "Stmt" => {
            // timestamps may carry fractions or zone offsets; seconds are enough
            if text.len() >= 19 {
                *created_at =
                    NaiveDateTime::parse_from_str(&text[..19], "%Y-%m-%dT%H:%M:%S").ok();
            }
        }
        _ => {}
    }
}
