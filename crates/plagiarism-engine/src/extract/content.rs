//! Content sniffing and raw-text sanitising.

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Number of leading bytes inspected when sniffing content.
const SNIFF_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Text,
    Binary,
}

/// Classifies downloaded bytes by their leading bytes.
pub fn sniff(data: &[u8]) -> ContentKind {
    let head = &data[..data.len().min(SNIFF_LEN)];
    if head.starts_with(PDF_MAGIC) {
        ContentKind::Pdf
    } else if head.contains(&0) {
        ContentKind::Binary
    } else {
        ContentKind::Text
    }
}

/// Replaces everything except printable ASCII, tab, newline, carriage return
/// and the Cyrillic block with a space, then collapses whitespace runs.
pub fn sanitize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_kept(c: char) -> bool {
    matches!(c, ' '..='~' | '\t' | '\n' | '\r' | '\u{0400}'..='\u{04FF}')
}
