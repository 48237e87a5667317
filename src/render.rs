//! Pure projection of session state into a view model, plus the terminal
//! adapter that prints it. The view is rebuilt in full on every call.

use crate::categories::{CategoryFilter, category_options};
use crate::formatting::FormatContext;
use crate::quote::Quote;
use crate::shared::table::{render_table, truncate_with_ellipsis};

pub const PREVIEW_LEN: usize = 40;
pub const NO_LAST_VIEWED: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRow {
    /// Position in the full collection (0-based).
    pub index: usize,
    pub text: String,
    pub author: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteView {
    pub rows: Vec<QuoteRow>,
    pub categories: Vec<String>,
    pub filter: String,
    pub total: usize,
    pub last_viewed: String,
}

pub fn build_view(
    quotes: &[Quote],
    filter: &CategoryFilter,
    last_viewed: Option<usize>,
) -> QuoteView {
    let rows = quotes
        .iter()
        .enumerate()
        .filter(|(_, q)| filter.matches(q))
        .map(|(index, q)| QuoteRow {
            index,
            text: q.text.clone(),
            author: q.author_label().to_string(),
            category: q.category.clone(),
        })
        .collect();
    QuoteView {
        rows,
        categories: category_options(quotes),
        filter: filter.as_str().to_string(),
        total: quotes.len(),
        last_viewed: last_viewed_summary(quotes, last_viewed),
    }
}

/// One-line summary of the last viewed quote, or `—` when there is none.
pub fn last_viewed_summary(quotes: &[Quote], last_viewed: Option<usize>) -> String {
    last_viewed
        .and_then(|i| quotes.get(i))
        .map(|q| preview(&q.text))
        .unwrap_or_else(|| NO_LAST_VIEWED.to_string())
}

/// First `PREVIEW_LEN` characters, with `…` appended when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LEN {
        let mut out: String = text.chars().take(PREVIEW_LEN).collect();
        out.push('…');
        out
    } else {
        text.to_string()
    }
}

/// Terminal rendering of the list view. `width` limits the quote column when
/// known.
pub fn format_view(view: &QuoteView, ctx: &FormatContext, width: Option<usize>) -> String {
    let mut out = String::new();
    if view.rows.is_empty() {
        if view.total == 0 {
            out.push_str("No quotes yet. Try `qk add \"text\"`.");
        } else {
            out.push_str(&format!("No quotes in category {}.", view.filter));
        }
    } else {
        // Room left for the quote after position, author and category columns.
        let text_width = width.map(|w| {
            let author = view.rows.iter().map(|r| r.author.chars().count()).max();
            let category = view.rows.iter().map(|r| r.category.chars().count()).max();
            w.saturating_sub(author.unwrap_or(0) + category.unwrap_or(0) + 16)
                .max(20)
        });
        let headers = ["#", "Quote", "Author", "Category"]
            .iter()
            .map(|h| ctx.format_header(h))
            .collect::<Vec<_>>();
        let rows = view
            .rows
            .iter()
            .map(|r| {
                let quoted = format!("\"{}\"", r.text);
                let text = match text_width {
                    Some(w) => truncate_with_ellipsis(&quoted, w),
                    None => quoted,
                };
                vec![
                    ctx.format_position(r.index + 1),
                    text,
                    ctx.format_author(&r.author),
                    ctx.format_category(&r.category),
                ]
            })
            .collect::<Vec<_>>();
        out.push_str(&render_table(&headers, &rows));
    }
    out.push_str(&format!(
        "\n\nFilter: {}  ({} of {} shown)\nLast viewed: {}",
        view.filter,
        view.rows.len(),
        view.total,
        view.last_viewed
    ));
    out
}

/// Full display of a single quote.
pub fn format_quote(quote: &Quote, ctx: &FormatContext) -> String {
    format!(
        "\"{}\"\n\n— {}  [{}]",
        quote.text,
        ctx.format_author(quote.author_label()),
        ctx.format_category(&quote.category)
    )
}

pub fn terminal_columns() -> Option<usize> {
    terminal_size::terminal_size().map(|(terminal_size::Width(w), _)| w as usize)
}
