//! pain.008.001.02 direct-debit rendering.

use crate::core::FiskalError;
use crate::xml::{XmlResult, XmlWriter};

use super::PAIN008_NS;
use super::types::DirectDebitBatch;
use super::validate::validate_direct_debit;

/// Render a direct-debit batch as a pain.008.001.02 document.
pub fn to_pain008_xml(batch: &DirectDebitBatch) -> XmlResult {
    let errors = validate_direct_debit(batch);
    if !errors.is_empty() {
        return Err(FiskalError::from_validation_errors(&errors));
    }

    let control_sum = batch.control_sum().to_string();
    let tx_count = batch.transaction_count().to_string();

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("Document", &[("xmlns", PAIN008_NS)])?;
    w.start_element("CstmrDrctDbtInitn")?;

    w.start_element("GrpHdr")?;
    w.text_element("MsgId", &batch.message_id)?;
    w.text_element("CreDtTm", &batch.created_at.format("%Y-%m-%dT%H:%M:%S").to_string())?;
    w.text_element("NbOfTxs", &tx_count)?;
    w.text_element("CtrlSum", &control_sum)?;
    w.start_element("InitgPty")?;
    w.text_element("Nm", &batch.creditor_name)?;
    w.end_element("InitgPty")?;
    w.end_element("GrpHdr")?;

    w.start_element("PmtInf")?;
    w.text_element("PmtInfId", &format!("{}-P1", batch.message_id))?;
    w.text_element("PmtMtd", "DD")?;
    w.text_element("NbOfTxs", &tx_count)?;
    w.text_element("CtrlSum", &control_sum)?;
    w.start_element("PmtTpInf")?;
    w.start_element("SvcLvl")?;
    w.text_element("Cd", "SEPA")?;
    w.end_element("SvcLvl")?;
    w.start_element("LclInstrm")?;
    w.text_element("Cd", "CORE")?;
    w.end_element("LclInstrm")?;
    w.end_element("PmtTpInf")?;
    w.text_element("ReqdColltnDt", &batch.collection_date.to_string())?;
    w.start_element("Cdtr")?;
    w.text_element("Nm", &batch.creditor_name)?;
    w.end_element("Cdtr")?;
    w.start_element("CdtrAcct")?;
    w.start_element("Id")?;
    w.text_element("IBAN", batch.creditor_iban.electronic())?;
    w.end_element("Id")?;
    w.end_element("CdtrAcct")?;
    w.start_element("CdtrAgt")?;
    w.start_element("FinInstnId")?;
    match &batch.creditor_bic {
        Some(bic) => w.text_element("BIC", bic.as_str())?,
        None => {
            w.start_element("Othr")?;
            w.text_element("Id", "NOTPROVIDED")?;
            w.end_element("Othr")?
        }
    };
    w.end_element("FinInstnId")?;
    w.end_element("CdtrAgt")?;
    w.text_element("ChrgBr", "SLEV")?;
    w.start_element("CdtrSchmeId")?;
    w.start_element("Id")?;
    w.start_element("PrvtId")?;
    w.start_element("Othr")?;
    w.text_element("Id", &batch.creditor_id)?;
    w.start_element("SchmeNm")?;
    w.text_element("Prtry", "SEPA")?;
    w.end_element("SchmeNm")?;
    w.end_element("Othr")?;
    w.end_element("PrvtId")?;
    w.end_element("Id")?;
    w.end_element("CdtrSchmeId")?;

    for tx in &batch.transactions {
        w.start_element("DrctDbtTxInf")?;
        w.start_element("PmtId")?;
        w.text_element("EndToEndId", &tx.end_to_end_id)?;
        w.end_element("PmtId")?;
        w.start_element("PmtTpInf")?;
        w.text_element("SeqTp", tx.sequence_type.code())?;
        w.end_element("PmtTpInf")?;
        w.text_element_with_attrs("InstdAmt", &tx.amount.to_string(), &[("Ccy", &tx.currency)])?;
        w.start_element("DrctDbtTx")?;
        w.start_element("MndtRltdInf")?;
        w.text_element("MndtId", &tx.mandate_id)?;
        w.text_element("DtOfSgntr", &tx.mandate_date.to_string())?;
        w.end_element("MndtRltdInf")?;
        w.end_element("DrctDbtTx")?;
        if let Some(bic) = &tx.debtor_bic {
            w.start_element("DbtrAgt")?;
            w.start_element("FinInstnId")?;
            w.text_element("BIC", bic.as_str())?;
            w.end_element("FinInstnId")?;
            w.end_element("DbtrAgt")?;
        }
        w.start_element("Dbtr")?;
        w.text_element("Nm", &tx.debtor_name)?;
        w.end_element("Dbtr")?;
        w.start_element("DbtrAcct")?;
        w.start_element("Id")?;
        w.text_element("IBAN", tx.debtor_iban.electronic())?;
        w.end_element("Id")?;
        w.end_element("DbtrAcct")?;
        if let Some(info) = &tx.remittance_info {
            w.start_element("RmtInf")?;
            w.text_element("Ustrd", info)?;
            w.end_element("RmtInf")?;
        }
        w.end_element("DrctDbtTxInf")?;
    }

    w.end_element("PmtInf")?;
    w.end_element("CstmrDrctDbtInitn")?;
    w.end_element("Document")?;
    w.into_string()
}
