use std::io::Write;

use crate::error::Result;
use crate::extraction_client::ExtractionResult;

pub const RESULT_HEADERS: [&str; 3] = ["Entity", "Prompt", "Extracted Info"];

/// Writes the result table as CSV, header first.
pub fn write_results<W: Write>(writer: W, results: &[ExtractionResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(RESULT_HEADERS)?;

    for result in results {
        csv_writer.write_record([
            result.entity.as_str(),
            result.prompt.as_str(),
            result.extracted_info().as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
