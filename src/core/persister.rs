use crate::domain::model::ServiceRequestTable;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// Serializes the table as CSV: header row in column order, no index column.
pub fn to_csv_bytes(table: &ServiceRequestTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // 沒有欄位時寫出空檔案
    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
        for record in table.records() {
            let row: Vec<String> = table
                .columns()
                .iter()
                .map(|column| cell(record.get(column)))
                .collect::<Result<_>>()?;
            writer.write_record(&row)?;
        }
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV buffer: {}", e.error()),
    })
}

fn cell(value: Option<&Value>) -> Result<String> {
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => serde_json::to_string(nested)?,
    })
}
