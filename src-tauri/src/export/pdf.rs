use std::borrow::Cow;
use std::io::BufWriter;
use std::path::PathBuf;

use printpdf::{Line, Mm, PdfDocument, Point};
use unicode_bidi::{BidiInfo, Level};
use unicode_bidi_mirroring::get_mirrored;

use crate::document::{DocumentDescription, Field, PageSpec, SummaryLine, TextDirection};
use crate::error::{AppError, AppResult};
use crate::format::{LRI, PDI};

use super::ExportBackend;

const PT_TO_MM: f32 = 0.352_778;
/// Average advance of a glyph relative to its size; good enough to anchor
/// text on the right margin without font metrics.
const GLYPH_WIDTH_RATIO: f32 = 0.5;
const SUMMARY_WIDTH_PT: f32 = 200.0;

const DEFAULT_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const DEFAULT_FONT_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// A4 PDF writer built on printpdf.
///
/// Lines are put into visual order with the Unicode bidi algorithm before
/// they are written; isolates around left-to-right tokens are honoured and
/// then dropped. Glyphs are not shaped, so Arabic-script letters appear in
/// their isolated forms. The embedded DejaVu Sans covers Persian letters and
/// digits; `font_path` swaps in another TTF for both weights.
///
/// The items table flows onto as many pages as it needs. Rows are never
/// split and the column titles repeat at the top of each continuation page.
#[derive(Debug, Default, Clone)]
pub struct PdfBackend {
    pub font_path: Option<PathBuf>,
}

impl PdfBackend {
    pub fn with_font(font_path: Option<PathBuf>) -> Self {
        Self { font_path }
    }

    fn fonts(&self) -> AppResult<(Cow<'static, [u8]>, Cow<'static, [u8]>)> {
        match &self.font_path {
            Some(path) => {
                let data = std::fs::read(path)?;
                Ok((Cow::Owned(data.clone()), Cow::Owned(data)))
            }
            None => Ok((Cow::Borrowed(DEFAULT_FONT), Cow::Borrowed(DEFAULT_FONT_BOLD))),
        }
    }
}

impl ExportBackend for PdfBackend {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &DocumentDescription) -> AppResult<Vec<u8>> {
        let page = document.page;
        let pages = layout(document);
        let (regular_data, bold_data) = self.fonts()?;

        let (doc, first_page, first_layer) = PdfDocument::new(
            document.title.as_str(),
            Mm(page.width_mm),
            Mm(page.height_mm),
            "Layer 1",
        );
        let regular = doc
            .add_external_font(&*regular_data)
            .map_err(|e| AppError::Export(e.to_string()))?;
        let bold = doc
            .add_external_font(&*bold_data)
            .map_err(|e| AppError::Export(e.to_string()))?;

        for (i, marks) in pages.iter().enumerate() {
            let (page_index, layer_index) = if i == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(page.width_mm), Mm(page.height_mm), "Layer 1")
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for mark in marks {
                match mark {
                    Mark::Text {
                        text,
                        size,
                        x,
                        y,
                        bold: is_bold,
                    } => {
                        let font = if *is_bold { &bold } else { &regular };
                        layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), font);
                    }
                    Mark::Path { points, closed } => layer.add_line(Line {
                        points: points
                            .iter()
                            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
                            .collect(),
                        is_closed: *closed,
                    }),
                }
            }
        }
        tracing::debug!(pages = pages.len(), "pdf laid out");

        let mut writer = BufWriter::new(Vec::<u8>::new());
        doc.save(&mut writer)
            .map_err(|e| AppError::Export(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| AppError::Export(e.to_string()))
    }
}

/// Puts one line of logical text into display order for a paragraph running
/// in `direction`. Right-to-left runs are reversed with their brackets
/// mirrored; LRI/PDI are removed afterwards.
pub(crate) fn visual_line(text: &str, direction: TextDirection) -> String {
    let level = match direction {
        TextDirection::Rtl => Level::rtl(),
        TextDirection::Ltr => Level::ltr(),
    };
    let info = BidiInfo::new(text, Some(level));

    let mut visual = String::with_capacity(text.len());
    for para in &info.paragraphs {
        let (levels, runs) = info.visual_runs(para, para.range.clone());
        for run in runs {
            let chunk = &text[run.clone()];
            if levels[run.start].is_rtl() {
                visual.extend(chunk.chars().rev().map(|c| get_mirrored(c).unwrap_or(c)));
            } else {
                visual.push_str(chunk);
            }
        }
    }
    visual.retain(|c| c != LRI && c != PDI);
    visual
}

/// Something placed on a page; coordinates in mm from the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
enum Mark {
    Text {
        text: String,
        size: f32,
        x: f32,
        y: f32,
        bold: bool,
    },
    Path {
        points: Vec<(f32, f32)>,
        closed: bool,
    },
}

/// Column titles with their horizontal centres.
#[derive(Debug, Clone)]
struct TableHeader {
    cells: Vec<(f32, String)>,
}

struct Canvas {
    pages: Vec<Vec<Mark>>,
    direction: TextDirection,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    y: f32,
    base_size: f32,
    table_header: Option<TableHeader>,
}

impl Canvas {
    fn new(page: &PageSpec) -> Self {
        let margin = page.padding_pt * PT_TO_MM;
        Self {
            pages: vec![Vec::new()],
            direction: page.direction,
            left: margin,
            right: page.width_mm - margin,
            top: page.height_mm - margin,
            bottom: margin,
            y: page.height_mm - margin,
            base_size: page.font_size_pt,
            table_header: None,
        }
    }

    fn push(&mut self, mark: Mark) {
        if let Some(page) = self.pages.last_mut() {
            page.push(mark);
        }
    }

    fn width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * GLYPH_WIDTH_RATIO * PT_TO_MM
    }

    /// Writes text that is already in display order.
    fn place(&mut self, text: String, size: f32, x: f32, bold: bool) {
        if text.trim().is_empty() {
            return;
        }
        let y = self.y;
        self.push(Mark::Text {
            text,
            size,
            x,
            y,
            bold,
        });
    }

    fn text_at(&mut self, text: &str, size: f32, x: f32, bold: bool) {
        let visual = visual_line(text, self.direction);
        self.place(visual, size, x, bold);
    }

    /// Right edge of the text sits at `x_right`.
    fn text_right(&mut self, text: &str, size: f32, x_right: f32, bold: bool) {
        let visual = visual_line(text, self.direction);
        let x = x_right - Self::width(&visual, size);
        self.place(visual, size, x, bold);
    }

    fn text_center(&mut self, text: &str, size: f32, x_center: f32, bold: bool) {
        let visual = visual_line(text, self.direction);
        let x = x_center - Self::width(&visual, size) / 2.0;
        self.place(visual, size, x, bold);
    }

    fn field_right(&mut self, field: &Field, size: f32, x_right: f32) {
        self.text_right(&format!("{}: {}", field.label, field.value), size, x_right, false);
    }

    fn rule(&mut self, from: f32, to: f32) {
        let y = self.y;
        self.push(Mark::Path {
            points: vec![(from, y), (to, y)],
            closed: false,
        });
    }

    /// Outline standing in for an embedded image; top edge at the cursor.
    fn frame(&mut self, x: f32, width: f32, height: f32) {
        let top = self.y;
        self.push(Mark::Path {
            points: vec![
                (x, top),
                (x + width, top),
                (x + width, top - height),
                (x, top - height),
            ],
            closed: true,
        });
    }

    fn down(&mut self, mm: f32) {
        if self.y - mm < self.bottom {
            self.new_page();
        }
        self.y -= mm;
    }

    /// Starts a new page unless `mm` more fit on this one.
    fn ensure(&mut self, mm: f32) {
        if self.y - mm < self.bottom {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = self.top;
        if let Some(header) = self.table_header.clone() {
            self.y -= 4.0;
            self.draw_table_header(&header);
        }
    }

    fn draw_table_header(&mut self, header: &TableHeader) {
        let size = self.base_size;
        for (center, title) in &header.cells {
            self.text_center(title, size, *center, true);
        }
        self.y -= 2.0;
        self.rule(self.left, self.right);
    }
}

fn layout(doc: &DocumentDescription) -> Vec<Vec<Mark>> {
    let mut c = Canvas::new(&doc.page);
    let base = c.base_size;
    let content_width = c.right - c.left;
    let center = c.left + content_width / 2.0;

    c.down(8.0);
    c.text_center(&doc.heading, 22.0, center, true);
    c.down(10.0);

    // Header: logo on the right, seller in the middle, number/date on the left.
    let header_top = c.y;
    if doc.header.logo.is_some() {
        c.frame(c.right - 28.0, 28.0, 28.0);
    }
    if let Some(name) = &doc.header.seller_name {
        c.text_center(name, 15.0, center, true);
    }
    c.down(6.0);
    if let Some(address) = &doc.header.seller_address {
        c.text_center(address, base - 1.0, center, false);
        c.down(4.0);
    }
    for contact in &doc.header.contacts {
        c.text_center(
            &format!("{}: {}", contact.label, contact.value),
            base - 1.0,
            center,
            false,
        );
        c.down(4.0);
    }

    let middle_bottom = c.y;
    c.y = header_top;
    c.field_right(&doc.header.number, base, c.left + content_width * 0.25);
    c.down(5.0);
    c.field_right(&doc.header.date, base, c.left + content_width * 0.25);

    c.y = middle_bottom.min(header_top - 30.0);
    c.rule(c.left, c.right);
    c.down(8.0);

    // Buyer
    c.text_center(&doc.buyer.title, base + 1.0, center, true);
    c.down(6.0);
    c.field_right(&doc.buyer.client, base + 1.0, c.right);
    c.down(5.0);
    c.text_right(
        &format!(
            "{}: {} / {}: {}",
            doc.buyer.address.label,
            doc.buyer.address.value,
            doc.buyer.phone.label,
            doc.buyer.phone.value
        ),
        base,
        c.right,
        false,
    );
    c.down(8.0);

    // Items table, columns laid out from the right edge.
    let mut edges = Vec::with_capacity(doc.items.columns.len());
    let mut x = c.right;
    for column in &doc.items.columns {
        let width = content_width * f32::from(column.width_percent) / 100.0;
        edges.push((x, width));
        x -= width;
    }
    let header = TableHeader {
        cells: edges
            .iter()
            .zip(&doc.items.columns)
            .map(|((x_right, width), column)| (x_right - width / 2.0, column.title.clone()))
            .collect(),
    };
    c.ensure(2.0 + 11.5);
    c.draw_table_header(&header);
    c.table_header = Some(header);

    for row in &doc.items.rows {
        let row_height = if row.description.is_some() { 11.5 } else { 8.0 };
        c.ensure(row_height);
        c.down(6.0);
        let quantity = format!("{} {}", row.quantity, row.unit);
        let cells = [
            row.sequence.as_str(),
            row.name.as_str(),
            quantity.as_str(),
            row.unit_price.as_str(),
            row.discount.as_str(),
            row.net_total.as_str(),
        ];
        for (i, ((x_right, width), cell)) in edges.iter().zip(cells).enumerate() {
            if i == 1 {
                c.text_right(cell, base, x_right - 1.5, true);
            } else {
                c.text_center(cell, base, x_right - width / 2.0, i == 5);
            }
        }
        if let Some(description) = &row.description {
            c.down(3.5);
            let (x_right, _) = edges[1];
            c.text_right(description, base - 2.0, x_right - 1.5, false);
        }
        c.down(2.0);
        c.rule(c.left, c.right);
    }
    c.table_header = None;

    // Totals box on the left, payment details on the right. The box is kept
    // whole; a long payment description may run onto the next page.
    let summary = &doc.summary;
    let summary_lines: Vec<&SummaryLine> = [
        Some(&summary.subtotal),
        summary.discount.as_ref(),
        Some(&summary.tax),
    ]
    .into_iter()
    .flatten()
    .collect();
    c.ensure(10.0 + 5.0 * summary_lines.len() as f32 + 10.0);
    c.down(10.0);
    let block_top = c.y;
    let block_page = c.pages.len();
    let summary_width = SUMMARY_WIDTH_PT * PT_TO_MM;
    let summary_left = c.left;
    let summary_right = c.left + summary_width;

    for line in summary_lines {
        summary_line(&mut c, line, base, summary_left, summary_right);
        c.down(5.0);
    }
    c.rule(summary_left, summary_right);
    c.down(5.0);
    let grand = SummaryLine {
        value: format!("{} {}", summary.grand_total.value, summary.currency),
        ..summary.grand_total.clone()
    };
    summary_line(&mut c, &grand, base + 2.0, summary_left, summary_right);
    let summary_bottom = c.y;

    c.y = block_top;
    c.text_right(&doc.payment.title, base, c.right, true);
    if let Some(account) = &doc.payment.account {
        c.down(5.0);
        c.field_right(account, base, c.right);
    }
    for line in doc.payment.description.lines() {
        c.down(4.5);
        c.text_right(line, base - 1.0, c.right, false);
    }
    if c.pages.len() == block_page {
        c.y = c.y.min(summary_bottom);
    }

    if let Some(notes) = &doc.notes {
        c.ensure(10.0 + 4.5);
        c.down(10.0);
        c.text_right(&notes.title, base, c.right, true);
        for line in notes.text.lines() {
            c.down(4.5);
            c.text_right(line, base - 1.0, c.right, false);
        }
    }

    if let Some(signature) = &doc.signature {
        c.ensure(14.0 + 5.0 + 2.0 + 16.0);
        c.down(14.0);
        let seller_width = signature.seller.width_pt * PT_TO_MM;
        let buyer_width = signature.buyer.width_pt * PT_TO_MM;
        let seller_center = c.right - content_width / 4.0;
        let buyer_center = c.left + content_width / 4.0;

        c.rule(seller_center - seller_width / 2.0, seller_center + seller_width / 2.0);
        c.rule(buyer_center - buyer_width / 2.0, buyer_center + buyer_width / 2.0);
        c.down(5.0);
        c.text_center(&signature.seller.label, base, seller_center, true);
        c.text_center(&signature.buyer.label, base, buyer_center, true);
        if signature.seller.image.is_some() {
            c.down(2.0);
            c.frame(seller_center - 16.0, 32.0, 16.0);
        }
    }

    c.pages
}

fn summary_line(c: &mut Canvas, line: &SummaryLine, size: f32, left: f32, right: f32) {
    c.text_right(&line.label, size, right - 2.0, line.emphasized);
    c.text_at(&line.value, size, left + 2.0, line.emphasized);
}
