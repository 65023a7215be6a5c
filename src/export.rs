//! Document export
//!
//! Plain text is always available. PDF rendering needs the `pdf` cargo
//! feature and `export.pdf_enabled`; otherwise it fails with
//! [`PlannerError::CapabilityUnavailable`] and callers fall back to text.

use crate::PlannerError;
use crate::config::ExportConfig;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Txt,
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Pdf => "pdf",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// UTF-8 bytes of the document, unchanged
#[must_use]
pub fn to_plain_bytes(document: &str) -> Vec<u8> {
    document.as_bytes().to_vec()
}

/// Renders documents in the formats this build supports
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    pdf_enabled: bool,
}

impl Exporter {
    #[must_use]
    pub fn new(pdf_enabled: bool) -> Self {
        Self { pdf_enabled }
    }

    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.pdf_enabled)
    }

    /// Whether PDF export will succeed in this build
    #[must_use]
    pub fn pdf_available(&self) -> bool {
        self.pdf_enabled && cfg!(feature = "pdf")
    }

    /// Export `document` in `format`
    pub fn export(&self, document: &str, format: ExportFormat) -> crate::Result<Vec<u8>> {
        match format {
            ExportFormat::Txt => Ok(to_plain_bytes(document)),
            ExportFormat::Pdf => self.to_pdf_bytes(document),
        }
    }

    /// Render `document` as a paginated A4 PDF
    pub fn to_pdf_bytes(&self, document: &str) -> crate::Result<Vec<u8>> {
        if !self.pdf_available() {
            return Err(PlannerError::capability_unavailable("PDF"));
        }
        pdf::render(document)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

#[cfg(feature = "pdf")]
mod pdf {
    use std::io::BufWriter;

    use printpdf::{BuiltinFont, Mm, PdfDocument};
    use tracing::debug;

    use crate::PlannerError;

    const PAGE_WIDTH: Mm = Mm(210.0);
    const PAGE_HEIGHT: Mm = Mm(297.0);
    const MARGIN: Mm = Mm(20.0);
    const LINE_HEIGHT: Mm = Mm(5.0);
    const FONT_SIZE: f32 = 10.0;
    const WRAP_COLUMNS: usize = 95;

    pub(super) fn render(document: &str) -> crate::Result<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new("Travel Itinerary", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PlannerError::encoding(format!("Failed to load PDF font: {e}")))?;

        let mut current_layer = doc.get_page(page).get_layer(layer);
        let mut y_position = PAGE_HEIGHT - MARGIN;
        let mut pages = 1;

        for line in wrap_lines(document) {
            if y_position < MARGIN {
                let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
                current_layer = doc.get_page(page).get_layer(layer);
                y_position = PAGE_HEIGHT - MARGIN;
                pages += 1;
            }
            current_layer.use_text(line, FONT_SIZE, MARGIN, y_position, &font);
            y_position -= LINE_HEIGHT;
        }

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|e| PlannerError::encoding(format!("Failed to save PDF: {e}")))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| PlannerError::encoding(format!("Failed to flush PDF: {e}")))?;

        debug!("Rendered PDF with {} pages ({} bytes)", pages, bytes.len());
        Ok(bytes)
    }

    /// Wrap every source line to the page width; blank lines are kept and
    /// tokens wider than the page (inline map links) are split
    fn wrap_lines(document: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for source in document.lines() {
            let source = to_builtin_charset(source);
            let wrapped = crate::chunk::chunk(&source, WRAP_COLUMNS);
            if wrapped.is_empty() {
                lines.push(String::new());
                continue;
            }
            for line in wrapped {
                if line.chars().count() <= WRAP_COLUMNS {
                    lines.push(line);
                } else {
                    let chars: Vec<char> = line.chars().collect();
                    lines.extend(chars.chunks(WRAP_COLUMNS).map(|c| c.iter().collect::<String>()));
                }
            }
        }
        lines
    }

    /// Builtin fonts only cover Latin-1
    fn to_builtin_charset(line: &str) -> String {
        line.chars()
            .map(|c| match c {
                '—' | '–' => '-',
                '•' => '*',
                '‘' | '’' => '\'',
                '“' | '”' => '"',
                c if u32::from(c) <= 0xFF => c,
                _ => '?',
            })
            .collect()
    }

}

#[cfg(not(feature = "pdf"))]
mod pdf {
    use crate::PlannerError;

    pub(super) fn render(_document: &str) -> crate::Result<Vec<u8>> {
        Err(PlannerError::capability_unavailable("PDF"))
    }
}
