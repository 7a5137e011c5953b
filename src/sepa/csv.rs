//! CSV ingest for credit-transfer transactions.
//!
//! Expected columns: `creditor_name,creditor_iban,amount` with optional
//! `currency`, `reference`, and `creditor_bic` columns. Amounts are major
//! units ("125.50" or "125").

use rust_decimal::Decimal;

use crate::core::{Amount, Bic, FiskalError, Iban};

use super::types::CreditTransferTx;

/// Read credit-transfer transactions from CSV data with a header row.
/// End-to-end ids are left empty for the builder to generate.
pub fn credit_transfers_from_csv(data: &str) -> Result<Vec<CreditTransferTx>, FiskalError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FiskalError::Codec(format!("csv header error: {e}")))?
        .clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let name_col = col("creditor_name")
        .ok_or_else(|| FiskalError::Codec("csv is missing a 'creditor_name' column".into()))?;
    let iban_col = col("creditor_iban")
        .ok_or_else(|| FiskalError::Codec("csv is missing a 'creditor_iban' column".into()))?;
    let amount_col = col("amount")
        .ok_or_else(|| FiskalError::Codec("csv is missing an 'amount' column".into()))?;
    let currency_col = col("currency");
    let reference_col = col("reference");
    let bic_col = col("creditor_bic");

    let mut transactions = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 2;
        let record = record.map_err(|e| FiskalError::Codec(format!("csv row {row}: {e}")))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let optional = |idx: Option<usize>| idx.map(field).filter(|s| !s.is_empty());

        let creditor_iban = Iban::parse(field(iban_col))
            .map_err(|e| FiskalError::Codec(format!("csv row {row}: {e}")))?;
        let raw_amount = field(amount_col);
        let amount = raw_amount
            .parse::<Decimal>()
            .map_err(|_| FiskalError::Codec(format!("csv row {row}: invalid amount '{raw_amount}'")))
            .and_then(|d| {
                Amount::from_decimal(d).map_err(|_| {
                    FiskalError::Codec(format!(
                        "csv row {row}: amount '{raw_amount}' has sub-cent precision"
                    ))
                })
            })?;
        let creditor_bic = optional(bic_col)
            .map(Bic::parse)
            .transpose()
            .map_err(|e| FiskalError::Codec(format!("csv row {row}: {e}")))?;

        transactions.push(CreditTransferTx {
            end_to_end_id: String::new(),
            creditor_name: field(name_col).to_string(),
            creditor_iban,
            creditor_bic,
            amount,
            currency: optional(currency_col).unwrap_or("EUR").to_string(),
            remittance_info: optional(reference_col).map(str::to_string),
        });
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_columns() {
        let csv = "creditor_name,creditor_iban,amount\n\
                   Lieferant AG,DE89370400440532013000,1250.00\n";
        let txs = credit_transfers_from_csv(csv).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, Amount::from_cents(125_000));
        assert_eq!(txs[0].currency, "EUR");
        assert!(txs[0].remittance_info.is_none());
        assert!(txs[0].end_to_end_id.is_empty());
    }

    #[test]
    fn full_columns() {
        let csv = "creditor_name,creditor_iban,amount,currency,reference,creditor_bic\n\
                   Lieferant AG,DE89370400440532013000,99.90,EUR,RE-42,DEUTDEFFXXX\n";
        let txs = credit_transfers_from_csv(csv).unwrap();
        assert_eq!(txs[0].amount, Amount::from_cents(9_990));
        assert_eq!(txs[0].remittance_info.as_deref(), Some("RE-42"));
        assert_eq!(txs[0].creditor_bic.as_ref().unwrap().as_str(), "DEUTDEFFXXX");
    }

    #[test]
    fn whole_euro_amounts_are_accepted() {
        let csv = "creditor_name,creditor_iban,amount\nA,DE89370400440532013000,125\n";
        let txs = credit_transfers_from_csv(csv).unwrap();
        assert_eq!(txs[0].amount, Amount::from_cents(12_500));
    }

    #[test]
    fn sub_cent_amount_is_rejected() {
        let csv = "creditor_name,creditor_iban,amount\nA,DE89370400440532013000,1.005\n";
        let err = credit_transfers_from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("sub-cent"));
    }

    #[test]
    fn invalid_iban_names_the_row() {
        let csv = "creditor_name,creditor_iban,amount\n\
                   A,DE89370400440532013000,1.00\n\
                   B,DE89370400440532013001,2.00\n";
        let err = credit_transfers_from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn missing_column_is_codec_error() {
        assert!(credit_transfers_from_csv("creditor_name,amount\nA,1.00\n").is_err());
    }
}
