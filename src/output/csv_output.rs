//! CSV rendering of a scraped page
//!
//! One file per page: a bare `url,title,content` header followed by a single
//! row whose three fields are always quoted, with embedded quotes doubled.

use crate::output::traits::{OutputResult, PageRecord};
use csv::{QuoteStyle, WriterBuilder};

/// Header line written at the top of every page CSV
pub const CSV_HEADER: &str = "url,title,content\n";

/// Renders a page record as CSV bytes
pub fn render_csv(record: &PageRecord) -> OutputResult<Vec<u8>> {
    let mut buffer = CSV_HEADER.as_bytes().to_vec();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .has_headers(false)
        .from_writer(&mut buffer);
    writer.write_record([
        record.url.as_str(),
        record.title.as_str(),
        record.content.as_str(),
    ])?;
    writer.flush()?;
    drop(writer);

    Ok(buffer)
}
