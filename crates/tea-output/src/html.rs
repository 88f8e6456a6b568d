//! HTML table renderings.

use std::fmt::Write;

use anyhow::Result;
use quick_xml::escape::escape;
use tea_model::ResponseEnvelope;

const TABLE_CLASS: &str = "listTable";

const STYLESHEET: &str = "\
table.listTable { border-collapse: collapse; }
table.listTable th, table.listTable td { border: 1px solid #ccc; padding: 4px 8px; }
table.listTable th { background-color: #f5f5f5; text-align: left; }
table.listTable tbody tr:nth-child(even) { background-color: #fafafa; }";

/// Plain table with escaped labels and cells.
pub fn render_html(envelope: &ResponseEnvelope) -> Result<String> {
    let mut out = String::new();
    write_table(&mut out, envelope, None)?;
    Ok(out)
}

/// Table preceded by an embedded stylesheet.
pub fn render_html_css(envelope: &ResponseEnvelope) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "<style type=\"text/css\">")?;
    writeln!(out, "{STYLESHEET}")?;
    writeln!(out, "</style>")?;
    write_table(&mut out, envelope, Some(TABLE_CLASS))?;
    Ok(out)
}

fn write_table(out: &mut String, envelope: &ResponseEnvelope, class: Option<&str>) -> Result<()> {
    match class {
        Some(class) => writeln!(out, "<table class=\"{class}\">")?,
        None => writeln!(out, "<table>")?,
    }

    writeln!(out, "<thead>")?;
    out.push_str("<tr>");
    for header in &envelope.headers {
        write!(out, "<th>{}</th>", escape(header.display_name.as_str()))?;
    }
    writeln!(out, "</tr>")?;
    writeln!(out, "</thead>")?;

    writeln!(out, "<tbody>")?;
    for row in &envelope.rows {
        out.push_str("<tr>");
        for cell in row {
            write!(out, "<td>{}</td>", escape(cell.as_str()))?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")?;
    Ok(())
}
