//! Table and text layout helpers used by the list view.
//! Widths are measured in visible characters so colored cells still line up.

/// Render a simple text table. Column widths come from the widest cell
/// (header or row) ignoring ANSI color codes.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_len(cell));
        }
    }

    let header_line = format_row(headers, &widths);
    let mut out = header_line.clone();
    out.push('\n');
    out.push_str(&"-".repeat(display_len(&header_line)));
    for row in rows {
        out.push('\n');
        out.push_str(format_row(row, &widths).trim_end());
    }
    out
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    row.iter()
        .zip(widths.iter())
        .map(|(cell, width)| pad_field(cell, *width))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Right-pad a cell to `target` visible characters.
pub fn pad_field(cell: &str, target: usize) -> String {
    let padding = target.saturating_sub(display_len(cell));
    format!("{cell}{}", " ".repeat(padding))
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

/// Visible length of a string, skipping ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        len += 1;
    }
    len
}
