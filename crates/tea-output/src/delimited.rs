//! CSV rendering.

use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use tea_model::ResponseEnvelope;

/// Label line followed by one record per row.
pub fn render_csv(envelope: &ResponseEnvelope) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record(envelope.headers.iter().map(|h| h.display_name.as_str()))
        .context("write csv header")?;
    for (index, row) in envelope.rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("write csv row {index}"))?;
    }

    let bytes = writer.into_inner().context("flush csv writer")?;
    String::from_utf8(bytes).context("csv output is not UTF-8")
}
