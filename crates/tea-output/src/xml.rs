//! XML grid rendering.

use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tea_model::{GridHeader, Pager, ResponseEnvelope};

/// `<grid>` document: headers, counts, pager and rows.
pub fn render_xml(envelope: &ResponseEnvelope) -> Result<String> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new("grid")))?;

    xml.write_event(Event::Start(BytesStart::new("headers")))?;
    for header in &envelope.headers {
        xml.write_event(Event::Empty(header_element(header)))?;
    }
    xml.write_event(Event::End(BytesEnd::new("headers")))?;

    write_text_element(&mut xml, "width", &envelope.width.to_string())?;
    write_text_element(&mut xml, "height", &envelope.height.to_string())?;
    write_text_element(&mut xml, "headerWidth", &envelope.header_width.to_string())?;

    xml.write_event(Event::Start(BytesStart::new("metaData")))?;
    xml.write_event(Event::Empty(pager_element(&envelope.meta_data.pager)))?;
    xml.write_event(Event::End(BytesEnd::new("metaData")))?;

    xml.write_event(Event::Start(BytesStart::new("rows")))?;
    for row in &envelope.rows {
        xml.write_event(Event::Start(BytesStart::new("row")))?;
        for cell in row {
            if cell.is_empty() {
                xml.write_event(Event::Empty(BytesStart::new("field")))?;
            } else {
                write_text_element(&mut xml, "field", cell)?;
            }
        }
        xml.write_event(Event::End(BytesEnd::new("row")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("rows")))?;

    xml.write_event(Event::End(BytesEnd::new("grid")))?;
    String::from_utf8(xml.into_inner()).context("xml output is not UTF-8")
}

fn header_element(header: &GridHeader) -> BytesStart<'static> {
    let mut element = BytesStart::new("header");
    element.push_attribute(("name", header.name.as_str()));
    element.push_attribute(("column", header.display_name.as_str()));
    element.push_attribute(("valueType", header.value_type.as_str()));
    element.push_attribute(("type", header.value_class.as_str()));
    element.push_attribute(("hidden", bool_text(header.hidden)));
    element.push_attribute(("meta", bool_text(header.meta)));
    if let Some(option_set) = &header.option_set {
        element.push_attribute(("optionSet", option_set.as_str()));
    }
    if let Some(program_stage) = &header.program_stage {
        element.push_attribute(("programStage", program_stage.as_str()));
    }
    if let Some(offset) = header.stage_offset {
        element.push_attribute(("stageOffset", offset.to_string().as_str()));
    }
    element
}

fn pager_element(pager: &Pager) -> BytesStart<'static> {
    let mut element = BytesStart::new("pager");
    element.push_attribute(("page", pager.page.to_string().as_str()));
    element.push_attribute(("pageSize", pager.page_size.to_string().as_str()));
    element.push_attribute(("isLastPage", bool_text(pager.is_last_page)));
    if let Some(total) = pager.total {
        element.push_attribute(("total", total.to_string().as_str()));
    }
    if let Some(page_count) = pager.page_count {
        element.push_attribute(("pageCount", page_count.to_string().as_str()));
    }
    element
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn write_text_element(xml: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
