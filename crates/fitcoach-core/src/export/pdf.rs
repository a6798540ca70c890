//! Minimal PDF 1.4 writer for laid-out documents.
//!
//! Emits one content stream per page using the two standard Type 1 fonts
//! (Helvetica, Helvetica-Bold) with WinAnsi encoding, so no font data is
//! embedded.

use std::io::Write;

use super::layout::{Document, FontWeight, PT_TO_MM};

/// Encode a string as WinAnsi bytes. Unmappable characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Write a PDF literal string, escaping delimiters and non-ASCII bytes.
fn write_literal(out: &mut Vec<u8>, text: &str) {
    out.push(b'(');
    for b in win_ansi(text) {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            0x20..=0x7e => out.push(b),
            _ => {
                // Octal escape keeps the stream 7-bit clean.
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out.push(b')');
}

fn mm_to_pt(mm: f64) -> f64 {
    mm / PT_TO_MM
}

fn page_content(doc: &Document, page_index: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let page_height_pt = mm_to_pt(doc.page_height);
    for line in &doc.pages[page_index].lines {
        let font = match line.weight {
            FontWeight::Normal => "F1",
            FontWeight::Bold => "F2",
        };
        let _ = write!(
            out,
            "BT /{font} {:.1} Tf {:.2} {:.2} Td ",
            line.size,
            mm_to_pt(line.x),
            page_height_pt - mm_to_pt(line.y)
        );
        write_literal(&mut out, &line.text);
        out.extend_from_slice(b" Tj ET\n");
    }
    out
}

/// Serialize `doc` as a complete PDF file.
pub fn render_pdf(doc: &Document) -> Vec<u8> {
    let width_pt = mm_to_pt(doc.page_width);
    let height_pt = mm_to_pt(doc.page_height);
    let page_count = doc.pages.len();

    // Object numbering: 1 catalog, 2 page tree, 3-4 fonts, then a
    // (page, content) pair per page.
    let page_id = |i: usize| 5 + 2 * i;
    let content_id = |i: usize| 6 + 2 * i;
    let object_count = 4 + 2 * page_count;

    let mut out: Vec<u8> = Vec::new();
    let mut offsets = vec![0usize; object_count + 1];

    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let kids = (0..page_count)
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut object = |out: &mut Vec<u8>, id: usize, body: &[u8]| {
        offsets[id] = out.len();
        let _ = write!(out, "{id} 0 obj\n");
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    };

    object(&mut out, 1, b"<< /Type /Catalog /Pages 2 0 R >>");
    object(
        &mut out,
        2,
        format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").as_bytes(),
    );
    object(
        &mut out,
        3,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    object(
        &mut out,
        4,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for i in 0..page_count {
        let page = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width_pt:.2} {height_pt:.2}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            content_id(i)
        );
        object(&mut out, page_id(i), page.as_bytes());

        let content = page_content(doc, i);
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        object(&mut out, content_id(i), &stream);
    }

    let xref_offset = out.len();
    let _ = write!(out, "xref\n0 {}\n", object_count + 1);
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets[1..] {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        object_count + 1
    );

    out
}
