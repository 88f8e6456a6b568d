//! Response renderings.
//!
//! Every rendering carries the same cells in the same column order as the
//! JSON envelope:
//!
//! - **JSON**: the wire envelope itself
//! - **CSV**: a label line followed by one line per row
//! - **HTML / HTML+CSS**: a table, with or without an embedded stylesheet
//! - **XML**: a `<grid>` document with headers, counts and rows

mod common;
mod delimited;
mod html;
mod xml;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use tea_model::ResponseEnvelope;

pub use common::ensure_parent_dir;
pub use delimited::render_csv;
pub use html::{render_html, render_html_css};
pub use xml::render_xml;

/// Output format of a rendered response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Json,
    Csv,
    Html,
    HtmlCss,
    Xml,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Csv,
        Format::Html,
        Format::HtmlCss,
        Format::Xml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Html => "html",
            Format::HtmlCss => "html+css",
            Format::Xml => "xml",
        }
    }

    /// File extension for written responses.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Html | Format::HtmlCss => "html",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            "html" => Ok(Format::Html),
            "html+css" | "htmlcss" | "html-css" => Ok(Format::HtmlCss),
            "xml" => Ok(Format::Xml),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

/// Render a response in the given format.
pub fn render(envelope: &ResponseEnvelope, format: Format) -> Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(envelope).context("serialize response"),
        Format::Csv => render_csv(envelope),
        Format::Html => render_html(envelope),
        Format::HtmlCss => render_html_css(envelope),
        Format::Xml => render_xml(envelope),
    }
}

/// Render a response and write it to `path`.
pub fn write_response(path: &Path, envelope: &ResponseEnvelope, format: Format) -> Result<()> {
    let content = render(envelope, format)?;
    ensure_parent_dir(path)?;
    fs::write(path, content).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_round_trip() {
        for format in Format::ALL {
            assert_eq!(format.as_str().parse::<Format>(), Ok(format));
        }
        assert_eq!("HTMLCSS".parse::<Format>(), Ok(Format::HtmlCss));
        assert!("xls".parse::<Format>().is_err());
    }
}
