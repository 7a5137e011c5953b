use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::{Amount, Bic, FiskalError, Iban};

use super::validate::{validate_credit_transfer, validate_direct_debit};

/// Direct-debit sequence type (ISO 20022 SeqTp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceType {
    /// FRST — first collection under a mandate.
    First,
    /// RCUR — recurrent collection.
    Recurrent,
    /// FNAL — final collection.
    Final,
    /// OOFF — one-off collection.
    OneOff,
}

impl SequenceType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::First => "FRST",
            Self::Recurrent => "RCUR",
            Self::Final => "FNAL",
            Self::OneOff => "OOFF",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FRST" => Some(Self::First),
            "RCUR" => Some(Self::Recurrent),
            "FNAL" => Some(Self::Final),
            "OOFF" => Some(Self::OneOff),
            _ => None,
        }
    }
}

/// One credit-transfer transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTransferTx {
    /// End-to-end identifier, unique within the batch.
    pub end_to_end_id: String,
    pub creditor_name: String,
    pub creditor_iban: Iban,
    pub creditor_bic: Option<Bic>,
    pub amount: Amount,
    pub currency: String,
    /// Unstructured remittance information.
    pub remittance_info: Option<String>,
}

/// A credit-transfer batch (pain.001).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTransferBatch {
    pub message_id: String,
    pub created_at: NaiveDateTime,
    /// Initiating party and debtor.
    pub debtor_name: String,
    pub debtor_iban: Iban,
    pub debtor_bic: Option<Bic>,
    pub execution_date: NaiveDate,
    pub transactions: Vec<CreditTransferTx>,
}

impl CreditTransferBatch {
    /// Sum of all transaction amounts.
    pub fn control_sum(&self) -> Amount {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

/// One direct-debit transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectDebitTx {
    pub end_to_end_id: String,
    pub debtor_name: String,
    pub debtor_iban: Iban,
    pub debtor_bic: Option<Bic>,
    pub amount: Amount,
    pub currency: String,
    /// Mandate identifier agreed with the debtor.
    pub mandate_id: String,
    /// Date the mandate was signed.
    pub mandate_date: NaiveDate,
    pub sequence_type: SequenceType,
    pub remittance_info: Option<String>,
}

/// A direct-debit batch (pain.008).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectDebitBatch {
    pub message_id: String,
    pub created_at: NaiveDateTime,
    pub creditor_name: String,
    pub creditor_iban: Iban,
    pub creditor_bic: Option<Bic>,
    /// SEPA creditor identifier (CI).
    pub creditor_id: String,
    pub collection_date: NaiveDate,
    pub transactions: Vec<DirectDebitTx>,
}

impl DirectDebitBatch {
    /// Sum of all transaction amounts.
    pub fn control_sum(&self) -> Amount {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

fn generated_end_to_end_id(message_id: &str, index: usize) -> String {
    format!("{message_id}-{:03}", index + 1)
}

/// Builder for [`CreditTransferBatch`].
#[derive(Debug, Clone)]
pub struct CreditTransferBuilder {
    message_id: String,
    created_at: Option<NaiveDateTime>,
    debtor_name: String,
    debtor_iban: Iban,
    debtor_bic: Option<Bic>,
    execution_date: Option<NaiveDate>,
    transactions: Vec<CreditTransferTx>,
}

impl CreditTransferBuilder {
    /// Start a batch. The debtor IBAN must validate.
    pub fn new(message_id: &str, debtor_name: &str, debtor_iban: &str) -> Result<Self, FiskalError> {
        let debtor_iban =
            Iban::parse(debtor_iban).map_err(|e| FiskalError::from_validation_errors(&[e]))?;
        Ok(Self {
            message_id: message_id.to_string(),
            created_at: None,
            debtor_name: debtor_name.to_string(),
            debtor_iban,
            debtor_bic: None,
            execution_date: None,
            transactions: Vec::new(),
        })
    }

    pub fn debtor_bic(mut self, bic: &str) -> Result<Self, FiskalError> {
        self.debtor_bic =
            Some(Bic::parse(bic).map_err(|e| FiskalError::from_validation_errors(&[e]))?);
        Ok(self)
    }

    /// Creation timestamp for the group header. Defaults to now.
    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn execution_date(mut self, date: NaiveDate) -> Self {
        self.execution_date = Some(date);
        self
    }

    /// Append a EUR transaction with a generated end-to-end id.
    pub fn add_transaction(
        self,
        creditor_name: &str,
        creditor_iban: &str,
        amount: Amount,
    ) -> Result<Self, FiskalError> {
        let id = generated_end_to_end_id(&self.message_id, self.transactions.len());
        self.add_transaction_with_id(&id, creditor_name, creditor_iban, amount)
    }

    /// Append a EUR transaction with an explicit end-to-end id.
    pub fn add_transaction_with_id(
        mut self,
        end_to_end_id: &str,
        creditor_name: &str,
        creditor_iban: &str,
        amount: Amount,
    ) -> Result<Self, FiskalError> {
        let creditor_iban =
            Iban::parse(creditor_iban).map_err(|e| FiskalError::from_validation_errors(&[e]))?;
        self.transactions.push(CreditTransferTx {
            end_to_end_id: end_to_end_id.to_string(),
            creditor_name: creditor_name.to_string(),
            creditor_iban,
            creditor_bic: None,
            amount,
            currency: "EUR".to_string(),
            remittance_info: None,
        });
        Ok(self)
    }

    /// Append an already-assembled transaction, generating the end-to-end
    /// id when empty.
    pub fn push_transaction(mut self, mut tx: CreditTransferTx) -> Self {
        if tx.end_to_end_id.is_empty() {
            tx.end_to_end_id = generated_end_to_end_id(&self.message_id, self.transactions.len());
        }
        self.transactions.push(tx);
        self
    }

    /// Set the remittance info of the most recently added transaction.
    pub fn remittance_info(mut self, info: &str) -> Self {
        if let Some(tx) = self.transactions.last_mut() {
            tx.remittance_info = Some(info.to_string());
        }
        self
    }

    /// Assemble and validate.
    pub fn build(self) -> Result<CreditTransferBatch, FiskalError> {
        let batch = CreditTransferBatch {
            message_id: self.message_id,
            created_at: self
                .created_at
                .unwrap_or_else(|| chrono::Utc::now().naive_utc()),
            debtor_name: self.debtor_name,
            debtor_iban: self.debtor_iban,
            debtor_bic: self.debtor_bic,
            execution_date: self
                .execution_date
                .ok_or_else(|| FiskalError::Builder("execution date is required".into()))?,
            transactions: self.transactions,
        };
        let errors = validate_credit_transfer(&batch);
        if errors.is_empty() {
            Ok(batch)
        } else {
            Err(FiskalError::from_validation_errors(&errors))
        }
    }
}

/// Builder for [`DirectDebitBatch`].
#[derive(Debug, Clone)]
pub struct DirectDebitBuilder {
    message_id: String,
    created_at: Option<NaiveDateTime>,
    creditor_name: String,
    creditor_iban: Iban,
    creditor_bic: Option<Bic>,
    creditor_id: String,
    collection_date: Option<NaiveDate>,
    transactions: Vec<DirectDebitTx>,
}

impl DirectDebitBuilder {
    pub fn new(
        message_id: &str,
        creditor_name: &str,
        creditor_iban: &str,
        creditor_id: &str,
    ) -> Result<Self, FiskalError> {
        let creditor_iban =
            Iban::parse(creditor_iban).map_err(|e| FiskalError::from_validation_errors(&[e]))?;
        Ok(Self {
            message_id: message_id.to_string(),
            created_at: None,
            creditor_name: creditor_name.to_string(),
            creditor_iban,
            creditor_bic: None,
            creditor_id: creditor_id.to_string(),
            collection_date: None,
            transactions: Vec::new(),
        })
    }

    pub fn creditor_bic(mut self, bic: &str) -> Result<Self, FiskalError> {
        self.creditor_bic =
            Some(Bic::parse(bic).map_err(|e| FiskalError::from_validation_errors(&[e]))?);
        Ok(self)
    }

    /// Creation timestamp for the group header. Defaults to now.
    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn collection_date(mut self, date: NaiveDate) -> Self {
        self.collection_date = Some(date);
        self
    }

    /// Append a EUR collection with a generated end-to-end id.
    pub fn add_transaction(
        mut self,
        debtor_name: &str,
        debtor_iban: &str,
        amount: Amount,
        mandate_id: &str,
        mandate_date: NaiveDate,
        sequence_type: SequenceType,
    ) -> Result<Self, FiskalError> {
        let debtor_iban =
            Iban::parse(debtor_iban).map_err(|e| FiskalError::from_validation_errors(&[e]))?;
        let end_to_end_id = generated_end_to_end_id(&self.message_id, self.transactions.len());
        self.transactions.push(DirectDebitTx {
            end_to_end_id,
            debtor_name: debtor_name.to_string(),
            debtor_iban,
            debtor_bic: None,
            amount,
            currency: "EUR".to_string(),
            mandate_id: mandate_id.to_string(),
            mandate_date,
            sequence_type,
            remittance_info: None,
        });
        Ok(self)
    }

    /// Append an already-assembled collection, generating the end-to-end
    /// id when empty.
    pub fn push_transaction(mut self, mut tx: DirectDebitTx) -> Self {
        if tx.end_to_end_id.is_empty() {
            tx.end_to_end_id = generated_end_to_end_id(&self.message_id, self.transactions.len());
        }
        self.transactions.push(tx);
        self
    }

    /// Assemble and validate.
    pub fn build(self) -> Result<DirectDebitBatch, FiskalError> {
        let batch = DirectDebitBatch {
            message_id: self.message_id,
            created_at: self
                .created_at
                .unwrap_or_else(|| chrono::Utc::now().naive_utc()),
            creditor_name: self.creditor_name,
            creditor_iban: self.creditor_iban,
            creditor_bic: self.creditor_bic,
            creditor_id: self.creditor_id,
            collection_date: self
                .collection_date
                .ok_or_else(|| FiskalError::Builder("collection date is required".into()))?,
            transactions: self.transactions,
        };
        let errors = validate_direct_debit(&batch);
        if errors.is_empty() {
            Ok(batch)
        } else {
            Err(FiskalError::from_validation_errors(&errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn credit_transfer_control_sum_and_count() {
        let batch = CreditTransferBuilder::new("MSG-1", "Muster GmbH", "AT611904300234573201")
            .unwrap()
            .execution_date(date(2025, 9, 1))
            .add_transaction("A", "DE89370400440532013000", Amount::from_cents(100_000))
            .unwrap()
            .add_transaction("B", "AT611904300234573201", Amount::from_cents(25_000))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(batch.control_sum(), Amount::from_cents(125_000));
        assert_eq!(batch.transaction_count(), 2);
    }

    #[test]
    fn end_to_end_ids_are_generated_in_sequence() {
        let batch = CreditTransferBuilder::new("MSG-1", "Muster GmbH", "AT611904300234573201")
            .unwrap()
            .execution_date(date(2025, 9, 1))
            .add_transaction("A", "DE89370400440532013000", Amount::from_cents(1))
            .unwrap()
            .add_transaction("B", "DE89370400440532013000", Amount::from_cents(1))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(batch.transactions[0].end_to_end_id, "MSG-1-001");
        assert_eq!(batch.transactions[1].end_to_end_id, "MSG-1-002");
    }

    #[test]
    fn invalid_iban_fails_early() {
        assert!(CreditTransferBuilder::new("M", "X", "AT611904300234573202").is_err());
        let builder =
            CreditTransferBuilder::new("M", "X", "AT611904300234573201").unwrap();
        assert!(
            builder
                .add_transaction("A", "DE00000000000000000000", Amount::from_cents(1))
                .is_err()
        );
    }

    #[test]
    fn missing_execution_date_is_builder_error() {
        let r = CreditTransferBuilder::new("M", "X", "AT611904300234573201")
            .unwrap()
            .add_transaction("A", "DE89370400440532013000", Amount::from_cents(1))
            .unwrap()
            .build();
        assert!(matches!(r, Err(FiskalError::Builder(_))));
    }

    #[test]
    fn direct_debit_carries_mandate_details() {
        let batch = DirectDebitBuilder::new(
            "DD-1",
            "Verein Musterklub",
            "AT611904300234573201",
            "AT12ZZZ00000000001",
        )
        .unwrap()
        .collection_date(date(2025, 10, 1))
        .add_transaction(
            "Mitglied Huber",
            "DE89370400440532013000",
            Amount::from_cents(3_500),
            "MANDATE-42",
            date(2024, 1, 10),
            SequenceType::Recurrent,
        )
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(batch.transactions[0].mandate_id, "MANDATE-42");
        assert_eq!(batch.transactions[0].sequence_type, SequenceType::Recurrent);
        assert_eq!(batch.control_sum(), Amount::from_cents(3_500));
    }

    #[test]
    fn sequence_codes_round_trip() {
        for st in [
            SequenceType::First,
            SequenceType::Recurrent,
            SequenceType::Final,
            SequenceType::OneOff,
        ] {
            assert_eq!(SequenceType::from_code(st.code()), Some(st));
        }
        assert_eq!(SequenceType::from_code("XXXX"), None);
    }

    #[test]
    fn push_transaction_fills_empty_id() {
        let tx = CreditTransferTx {
            end_to_end_id: String::new(),
            creditor_name: "A".into(),
            creditor_iban: Iban::parse("DE89370400440532013000").unwrap(),
            creditor_bic: None,
            amount: Amount::from_cents(1),
            currency: "EUR".into(),
            remittance_info: None,
        };
        let batch = CreditTransferBuilder::new("MSG-9", "X", "AT611904300234573201")
            .unwrap()
            .execution_date(date(2025, 9, 1))
            .push_transaction(tx)
            .build()
            .unwrap();
        assert_eq!(batch.transactions[0].end_to_end_id, "MSG-9-001");
    }
}
