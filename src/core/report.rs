use crate::domain::model::CheckResult;
use crate::utils::error::{EtlError, Result};

/// Longest report body kept before truncation, in characters.
pub const REPORT_SIZE_LIMIT: usize = 10000;

/// Human readable report of every failure, truncated to [`REPORT_SIZE_LIMIT`].
pub fn text_report(result: &CheckResult) -> String {
    let mut message = format!(
        "\n(this message is autogenerated)\n\n\
         The schedule data updater found inconsistent data.\n\
         Please check the messages below and fix the sources.\n\n\
         {} data non-compliances:\n",
        result.failures.len()
    );
    for failure in &result.failures {
        message.push_str(&failure.to_string());
        message.push_str("\n\n");
    }
    truncate(message, REPORT_SIZE_LIMIT)
}

fn truncate(message: String, limit: usize) -> String {
    let total = message.chars().count();
    if total <= limit {
        return message;
    }
    let mut truncated: String = message.chars().take(limit).collect();
    truncated.push_str(&format!(
        "\n\n--- MESSAGE TRUNCATED, {} CHARS REMAINING (CHECK LOG) ---",
        total - limit
    ));
    truncated
}

/// `entity,entity_id,reason` rows, one per failure.
pub fn csv_report(result: &CheckResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["entity", "entity_id", "reason"])?;
    for failure in &result.failures {
        writer.write_record([
            failure.entity.as_str(),
            failure.entity_id.as_deref().unwrap_or_default(),
            failure.reason.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("failed to flush CSV report: {}", e),
    })
}
