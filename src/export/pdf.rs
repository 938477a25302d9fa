use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Approximate Helvetica advance per character, as a fraction of the size.
const CHAR_WIDTH: f32 = 0.55;

/// Multi-page table writer on landscape A4 with the built-in Helvetica.
pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    font_size: f32,
    header_font_size: f32,
    title_font_size: f32,
}

impl Default for PdfManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfManager {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            page_refs: Vec::new(),
            next_id: 4,

            page_w: 842.0,
            page_h: 595.0,
            margin: 36.0,
            row_h: 18.0,

            font_size: 8.0,
            header_font_size: 8.5,
            title_font_size: 13.0,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Writes a finished page and its content stream.
    fn push_page(&mut self, content: Content) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
                .contents(content_id);
            page.resources().fonts().pair(Name(b"F1"), self.font_id);
        }

        self.pdf.stream(content_id, &content.finish());
    }

    fn draw_text(content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        // Type1 Helvetica only covers Latin-1; anything else becomes '?'
        let bytes: Vec<u8> = text
            .chars()
            .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
            .collect();

        content.begin_text();
        content.set_font(Name(b"F1"), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&bytes));
        content.end_text();
    }

    fn fill_band(&self, content: &mut Content, y: f32, width: f32, shade: f32) {
        content.save_state();
        content.set_fill_rgb(shade, shade, shade);
        content.rect(self.margin, y, width, self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_row(&self, content: &mut Content, y: f32, widths: &[f32], row: &[String], size: f32) {
        let mut x = self.margin;

        for (text, w) in row.iter().zip(widths) {
            let fit = ((w - 6.0) / (size * CHAR_WIDTH)).max(1.0) as usize;
            let shown = if text.chars().count() > fit {
                let mut s: String = text.chars().take(fit.saturating_sub(1)).collect();
                s.push('.');
                s
            } else {
                text.clone()
            };
            Self::draw_text(content, x + 3.0, y + 5.0, size, &shown);

            content.save_state();
            content.set_stroke_rgb(0.65, 0.65, 0.65);
            content.rect(x, y, *w, self.row_h);
            content.stroke();
            content.restore_state();

            x += w;
        }
    }

    /// Column widths proportional to the longest cell, scaled to the page.
    fn compute_col_widths(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let mut chars: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate().take(chars.len()) {
                chars[i] = chars[i].max(cell.chars().count());
            }
        }

        let mut widths: Vec<f32> = chars
            .iter()
            .map(|c| *c as f32 * self.font_size * CHAR_WIDTH + 8.0)
            .collect();

        let total: f32 = widths.iter().sum();
        let max = self.page_w - 2.0 * self.margin;
        if total > max {
            let scale = max / total;
            for w in &mut widths {
                *w *= scale;
            }
        }
        widths
    }

    /// Table spread over as many pages as needed, with the title and the
    /// header row repeated on each page.
    pub fn write_table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        let widths = self.compute_col_widths(headers, rows);
        let table_w: f32 = widths.iter().sum();
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let top = self.page_h - self.margin - 30.0;
        let per_page = (((top - self.margin) / self.row_h) as usize).saturating_sub(1).max(1);

        let empty: &[Vec<String>] = &[];
        let chunks: Vec<&[Vec<String>]> = if rows.is_empty() {
            vec![empty]
        } else {
            rows.chunks(per_page).collect()
        };
        let pages = chunks.len();

        for (page_idx, chunk) in chunks.into_iter().enumerate() {
            let mut content = Content::new();

            Self::draw_text(
                &mut content,
                self.margin,
                self.page_h - self.margin,
                self.title_font_size,
                title,
            );
            Self::draw_text(
                &mut content,
                self.page_w - self.margin - 70.0,
                self.margin - 20.0,
                self.font_size,
                &format!("Page {} of {}", page_idx + 1, pages),
            );

            let mut y = top;
            self.fill_band(&mut content, y, table_w, 0.85);
            self.draw_row(&mut content, y, &widths, &header_row, self.header_font_size);
            y -= self.row_h;

            for (i, row) in chunk.iter().enumerate() {
                if i % 2 == 0 {
                    self.fill_band(&mut content, y, table_w, 0.96);
                }
                self.draw_row(&mut content, y, &widths, row, self.font_size);
                y -= self.row_h;
            }

            self.push_page(content);
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);

        {
            let mut pages = self.pdf.pages(self.pages_id);
            pages.count(self.page_refs.len() as i32);
            pages.kids(self.page_refs.iter().copied());
        }

        let bytes = self.pdf.finish();
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }
}
