use std::fmt::Write;

use travel_search::{ContentType, Pagination, SearchResponse, SuggestionItem, SuggestionKind};

pub fn results(response: &SearchResponse, content_type: ContentType) -> String {
    let mut out = String::new();
    if response.is_empty() {
        let _ = writeln!(out, "No {} found.", content_type);
        return out;
    }

    let _ = writeln!(
        out,
        "{} {} (page {} of {})",
        response.total, content_type, response.page, response.total_pages
    );
    let offset = u64::from(response.page.saturating_sub(1)) * u64::from(response.page_size);
    for (i, item) in response.results.iter().enumerate() {
        let _ = writeln!(out, "{:>4}. {}", offset + i as u64 + 1, item.summary(content_type));
    }
    out
}

/// Page strip like `« 1 [2] 3 4 5 »`. Empty when there is a single page.
pub fn pager(pagination: &Pagination, window: u32) -> String {
    if pagination.total_pages() <= 1 {
        return String::new();
    }

    let mut parts = Vec::new();
    if pagination.has_prev_page() {
        parts.push("«".to_string());
    }
    for page in pagination.page_numbers(window) {
        if page == pagination.current_page() {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if pagination.has_next_page() {
        parts.push("»".to_string());
    }
    parts.join(" ")
}

pub fn suggestions(items: &[SuggestionItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let kind = match item.kind {
            SuggestionKind::Destination => "destination",
            SuggestionKind::Hotel => "hotel",
        };
        let _ = writeln!(out, "{:>3}. {} ({})", i + 1, item.text, kind);
    }
    out
}
