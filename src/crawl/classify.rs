// src/crawl/classify.rs
// =============================================================================
// Decides whether a URL points at a PDF.
//
// The check is purely on the URL path: ".pdf" at the end, any case. We never
// look at Content-Type or the file's magic bytes, so a PDF served from
// /download?id=42 is missed and /fake.pdf returning HTML is counted. Existing
// PDF lists were produced with exactly this rule, keep it.
// =============================================================================

use url::Url;

pub fn looks_like_pdf(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => has_pdf_suffix(parsed.path()),
        Err(_) => {
            // Not absolute: cut query and fragment by hand
            let path = url.split(['?', '#']).next().unwrap_or(url);
            has_pdf_suffix(path)
        }
    }
}

fn has_pdf_suffix(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".pdf")
}
