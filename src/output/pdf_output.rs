//! PDF rendering of a scraped page
//!
//! Produces a plain A4 document with the built-in Helvetica fonts: the page
//! title as a centered heading, an underlined `Source:` line that links back
//! to the page, and the extracted content as justified body text. Text is
//! wrapped and paginated here since the base-14 fonts carry no layout engine.

use crate::output::traits::{OutputResult, PageRecord};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 72.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LINE_SPACING: f32 = 1.2;

const TITLE_SIZE: f32 = 20.0;
const LINK_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 12.0;

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Bold glyphs run slightly wider than the regular metrics
const BOLD_WIDTH_FACTOR: f32 = 1.06;

/// Clickable region on a page
#[derive(Debug, Clone, PartialEq)]
struct LinkArea {
    rect: [f32; 4],
    uri: String,
}

/// Operations and link areas for one output page
#[derive(Debug, Default)]
struct PageLayout {
    operations: Vec<Operation>,
    links: Vec<LinkArea>,
}

/// Places lines top to bottom, starting a new page when one fills up
struct LayoutWriter {
    pages: Vec<PageLayout>,
    current: PageLayout,
    y: f32,
}

impl LayoutWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: PageLayout::default(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Moves the cursor down by `lines` body lines
    fn move_down(&mut self, lines: f32) {
        self.y -= BODY_SIZE * LINE_SPACING * lines;
    }

    /// Reserves a line of the given font size and returns its baseline
    fn next_baseline(&mut self, size: f32) -> f32 {
        let leading = size * LINE_SPACING;
        if self.y - leading < MARGIN {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= leading;
        self.y
    }

    fn push_text(&mut self, line: &TextLine<'_>, x: f32, y: f32) {
        let ops = &mut self.current.operations;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![line.font.into(), line.size.into()]));
        ops.push(Operation::new(
            "rg",
            vec![line.color[0].into(), line.color[1].into(), line.color[2].into()],
        ));
        ops.push(Operation::new("Tw", vec![line.word_spacing.into()]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(line.bytes.to_vec(), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    fn push_underline(&mut self, x: f32, y: f32, width: f32, color: [f32; 3]) {
        let ops = &mut self.current.operations;
        ops.push(Operation::new(
            "RG",
            vec![color[0].into(), color[1].into(), color[2].into()],
        ));
        ops.push(Operation::new("w", vec![0.5f32.into()]));
        ops.push(Operation::new("m", vec![x.into(), (y - 1.5).into()]));
        ops.push(Operation::new("l", vec![(x + width).into(), (y - 1.5).into()]));
        ops.push(Operation::new("S", vec![]));
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.current.operations.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// A single line of encoded text with its styling
struct TextLine<'a> {
    bytes: &'a [u8],
    font: &'static str,
    size: f32,
    color: [f32; 3],
    word_spacing: f32,
}

/// Renders a page record as PDF bytes
pub fn render_pdf(record: &PageRecord) -> OutputResult<Vec<u8>> {
    let layout = layout_page(record);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.len());
    for page in layout {
        let content = Content {
            operations: page.operations,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut annots: Vec<Object> = Vec::with_capacity(page.links.len());
        for link in &page.links {
            annots.push(doc.add_object(link_annotation(link)).into());
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(&record.title), StringFormat::Literal),
        "Subject" => Object::String(encode_win_ansi(&record.url), StringFormat::Literal),
        "Producer" => Object::string_literal("sitemap-scribe"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn link_annotation(link: &LinkArea) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => link.rect.iter().map(|v| Object::from(*v)).collect::<Vec<_>>(),
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal(link.uri.as_str()),
        },
    }
}

/// Lays out heading, source link and body across as many pages as needed
fn layout_page(record: &PageRecord) -> Vec<PageLayout> {
    let mut writer = LayoutWriter::new();

    // Heading, centered
    let title = encode_win_ansi(&record.title);
    for line in wrap_words(&title, TITLE_SIZE * BOLD_WIDTH_FACTOR, TEXT_WIDTH) {
        let width = text_width(&line, TITLE_SIZE * BOLD_WIDTH_FACTOR);
        let y = writer.next_baseline(TITLE_SIZE);
        let x = MARGIN + ((TEXT_WIDTH - width) / 2.0).max(0.0);
        writer.push_text(
            &TextLine {
                bytes: &line,
                font: BOLD_FONT,
                size: TITLE_SIZE,
                color: BLACK,
                word_spacing: 0.0,
            },
            x,
            y,
        );
    }
    writer.move_down(1.0);

    // Source line; URLs have no spaces, so long ones are broken by character
    let source = encode_win_ansi(&format!("Source: {}", record.url));
    for line in wrap_chars(&source, LINK_SIZE, TEXT_WIDTH) {
        let width = text_width(&line, LINK_SIZE);
        let y = writer.next_baseline(LINK_SIZE);
        writer.push_text(
            &TextLine {
                bytes: &line,
                font: REGULAR_FONT,
                size: LINK_SIZE,
                color: BLUE,
                word_spacing: 0.0,
            },
            MARGIN,
            y,
        );
        writer.push_underline(MARGIN, y, width, BLUE);
        writer.current.links.push(LinkArea {
            rect: [MARGIN, y - 3.0, MARGIN + width, y + LINK_SIZE],
            uri: record.url.clone(),
        });
    }
    writer.move_down(2.0);

    // Body, justified except for the last line of each paragraph
    for paragraph in record.content.lines() {
        let encoded = encode_win_ansi(paragraph);
        if encoded.iter().all(|b| *b == b' ') {
            writer.move_down(0.5);
            continue;
        }

        let lines = wrap_words(&encoded, BODY_SIZE, TEXT_WIDTH);
        let last = lines.len().saturating_sub(1);
        for (index, line) in lines.iter().enumerate() {
            let word_spacing = if index < last {
                justify_spacing(line, BODY_SIZE, TEXT_WIDTH)
            } else {
                0.0
            };
            let y = writer.next_baseline(BODY_SIZE);
            writer.push_text(
                &TextLine {
                    bytes: line,
                    font: REGULAR_FONT,
                    size: BODY_SIZE,
                    color: BLACK,
                    word_spacing,
                },
                MARGIN,
                y,
            );
        }
    }

    writer.finish()
}

/// Maps text onto WinAnsiEncoding bytes; unmappable characters become `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if c.is_control() => continue,
            _ => b'?',
        };
        out.push(byte);
    }
    out
}

fn glyph_width(byte: u8) -> u16 {
    match byte {
        32..=126 => HELVETICA_WIDTHS[(byte - 32) as usize],
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        0x96 => 556,
        0x85 | 0x97 => 1000,
        _ => 556,
    }
}

fn text_width(bytes: &[u8], size: f32) -> f32 {
    bytes.iter().map(|b| glyph_width(*b) as f32).sum::<f32>() * size / 1000.0
}

/// Extra space per word gap needed to stretch `line` to `max_width`
fn justify_spacing(line: &[u8], size: f32, max_width: f32) -> f32 {
    let gaps = line.iter().filter(|b| **b == b' ').count();
    if gaps == 0 {
        return 0.0;
    }
    ((max_width - text_width(line, size)) / gaps as f32).max(0.0)
}

/// Greedy word wrap; words wider than a line are broken by character
fn wrap_words(text: &[u8], size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let space = text_width(b" ", size);
    let mut lines = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    let mut width = 0.0;

    for word in text.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
        let word_width = text_width(word, size);

        if word_width > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let mut chunks = wrap_chars(word, size, max_width);
            line = chunks.pop().unwrap_or_default();
            width = text_width(&line, size);
            lines.extend(chunks);
            continue;
        }

        if line.is_empty() {
            line.extend_from_slice(word);
            width = word_width;
        } else if width + space + word_width <= max_width {
            line.push(b' ');
            line.extend_from_slice(word);
            width += space + word_width;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_vec()));
            width = word_width;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Breaks text into lines by character, ignoring word boundaries
fn wrap_chars(text: &[u8], size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut line = Vec::new();
    let mut width = 0.0;

    for &byte in text {
        let w = glyph_width(byte) as f32 * size / 1000.0;
        if width + w > max_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
        }
        line.push(byte);
        width += w;
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
