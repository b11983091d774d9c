use lopdf::Document;

/// Extracts the text layer of every page, one page per line block.
///
/// Pages whose text cannot be decoded are skipped; an error is returned only
/// when the document cannot be parsed or yields no text at all.
pub fn extract_text(data: &[u8]) -> Result<String, String> {
    let _span = tracing::debug_span!("extract.pdf", bytes = data.len()).entered();

    let doc = Document::load_mem(data).map_err(|e| format!("failed to parse PDF: {}", e))?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(page = page_num, error = %e, "Skipping undecodable PDF page");
            }
        }
    }

    if text.trim().is_empty() {
        return Err("PDF contains no extractable text".to_string());
    }

    Ok(text)
}
