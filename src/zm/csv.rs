//! CSV ingest for ZM positions.
//!
//! Expected columns: `partner_uid,country_code,delivery_type,amount` with
//! the amount in minor units (cents).

use crate::core::{Amount, FiskalError, Uid};

use super::types::{DeliveryType, ZmEntry};

/// Read ZM positions from CSV data with a header row.
pub fn entries_from_csv(data: &str) -> Result<Vec<ZmEntry>, FiskalError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FiskalError::Codec(format!("csv header error: {e}")))?
        .clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| FiskalError::Codec(format!("csv is missing a '{name}' column")))
    };
    let uid_col = col("partner_uid")?;
    let country_col = col("country_code")?;
    let type_col = col("delivery_type")?;
    let amount_col = col("amount")?;

    let mut entries = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 2; // 1-based, after the header
        let record = record.map_err(|e| FiskalError::Codec(format!("csv row {row}: {e}")))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let partner_uid = Uid::parse(field(uid_col))
            .map_err(|e| FiskalError::Codec(format!("csv row {row}: {e}")))?;
        let raw_type = field(type_col);
        let delivery_type = DeliveryType::from_code(&raw_type.to_ascii_uppercase())
            .ok_or_else(|| {
                FiskalError::Codec(format!("csv row {row}: unknown delivery type '{raw_type}'"))
            })?;
        let cents: i64 = field(amount_col)
            .parse()
            .map_err(|_| {
                FiskalError::Codec(format!(
                    "csv row {row}: amount '{}' is not an integer cent value",
                    field(amount_col)
                ))
            })?;

        entries.push(ZmEntry {
            partner_uid,
            country_code: field(country_col).to_ascii_uppercase(),
            delivery_type,
            amount: Amount::from_cents(cents),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_rows() {
        let csv = "partner_uid,country_code,delivery_type,amount\n\
                   DE123456789,DE,L,500000\n\
                   FR12345678901,FR,S,250000\n";
        let entries = entries_from_csv(csv).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].partner_uid.as_str(), "DE123456789");
        assert_eq!(entries[0].amount, Amount::from_cents(500_000));
        assert_eq!(entries[1].delivery_type, DeliveryType::Services);
    }

    #[test]
    fn header_order_is_free() {
        let csv = "amount,delivery_type,partner_uid,country_code\n\
                   1000,D,IT12345678901,IT\n";
        let entries = entries_from_csv(csv).unwrap();
        assert_eq!(entries[0].delivery_type, DeliveryType::Triangular);
        assert_eq!(entries[0].country_code, "IT");
    }

    #[test]
    fn missing_column_is_codec_error() {
        let err = entries_from_csv("partner_uid,country_code,amount\nDE123456789,DE,1\n")
            .unwrap_err();
        assert!(err.to_string().contains("delivery_type"));
    }

    #[test]
    fn bad_amount_names_the_row() {
        let csv = "partner_uid,country_code,delivery_type,amount\n\
                   DE123456789,DE,L,12.50\n";
        let err = entries_from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn lowercase_delivery_type_is_accepted() {
        let csv = "partner_uid,country_code,delivery_type,amount\n\
                   DE123456789,de,l,100\n";
        let entries = entries_from_csv(csv).unwrap();
        assert_eq!(entries[0].delivery_type, DeliveryType::Goods);
        assert_eq!(entries[0].country_code, "DE");
    }
}
