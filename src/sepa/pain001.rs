//! pain.001.001.03 credit-transfer rendering.

use crate::core::FiskalError;
use crate::xml::{XmlResult, XmlWriter};

use super::PAIN001_NS;
use super::types::CreditTransferBatch;
use super::validate::validate_credit_transfer;

/// Render a credit-transfer batch as a pain.001.001.03 document.
pub fn to_pain001_xml(batch: &CreditTransferBatch) -> XmlResult {
    let errors = validate_credit_transfer(batch);
    if !errors.is_empty() {
        return Err(FiskalError::from_validation_errors(&errors));
    }

    let control_sum = batch.control_sum().to_string();
    let tx_count = batch.transaction_count().to_string();

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("Document", &[("xmlns", PAIN001_NS)])?;
    w.start_element("CstmrCdtTrfInitn")?;

    w.start_element("GrpHdr")?;
    w.text_element("MsgId", &batch.message_id)?;
    w.text_element("CreDtTm", &batch.created_at.format("%Y-%m-%dT%H:%M:%S").to_string())?;
    w.text_element("NbOfTxs", &tx_count)?;
    w.text_element("CtrlSum", &control_sum)?;
    w.start_element("InitgPty")?;
    w.text_element("Nm", &batch.debtor_name)?;
    w.end_element("InitgPty")?;
    w.end_element("GrpHdr")?;

    w.start_element("PmtInf")?;
    w.text_element("PmtInfId", &format!("{}-P1", batch.message_id))?;
    w.text_element("PmtMtd", "TRF")?;
    w.text_element("NbOfTxs", &tx_count)?;
    w.text_element("CtrlSum", &control_sum)?;
    w.text_element("ReqdExctnDt", &batch.execution_date.to_string())?;
    w.start_element("Dbtr")?;
    w.text_element("Nm", &batch.debtor_name)?;
    w.end_element("Dbtr")?;
    w.start_element("DbtrAcct")?;
    w.start_element("Id")?;
    w.text_element("IBAN", batch.debtor_iban.electronic())?;
    w.end_element("Id")?;
    w.end_element("DbtrAcct")?;
    w.start_element("DbtrAgt")?;
    w.start_element("FinInstnId")?;
    match &batch.debtor_bic {
        Some(bic) => w.text_element("BIC", bic.as_str())?,
        None => {
            w.start_element("Othr")?;
            w.text_element("Id", "NOTPROVIDED")?;
            w.end_element("Othr")?
        }
    };
    w.end_element("FinInstnId")?;
    w.end_element("DbtrAgt")?;
    w.text_element("ChrgBr", "SLEV")?;

    for tx in &batch.transactions {
        w.start_element("CdtTrfTxInf")?;
        w.start_element("PmtId")?;
        w.text_element("EndToEndId", &tx.end_to_end_id)?;
        w.end_element("PmtId")?;
        w.start_element("Amt")?;
        w.text_element_with_attrs("InstdAmt", &tx.amount.to_string(), &[("Ccy", &tx.currency)])?;
        w.end_element("Amt")?;
        if let Some(bic) = &tx.creditor_bic {
            w.start_element("CdtrAgt")?;
            w.start_element("FinInstnId")?;
            w.text_element("BIC", bic.as_str())?;
            w.end_element("FinInstnId")?;
            w.end_element("CdtrAgt")?;
        }
        w.start_element("Cdtr")?;
        w.text_element("Nm", &tx.creditor_name)?;
        w.end_element("Cdtr")?;
        w.start_element("CdtrAcct")?;
        w.start_element("Id")?;
        w.text_element("IBAN", tx.creditor_iban.electronic())?;
        w.end_element("Id")?;
        w.end_element("CdtrAcct")?;
        if let Some(info) = &tx.remittance_info {
            w.start_element("RmtInf")?;
            w.text_element("Ustrd", info)?;
            w.end_element("RmtInf")?;
        }
        w.end_element("CdtTrfTxInf")?;
    }

    w.end_element("PmtInf")?;
    w.end_element("CstmrCdtTrfInitn")?;
    w.end_element("Document")?;
    w.into_string()
}
