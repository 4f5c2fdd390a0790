//! Terminal rendering shared by the subcommands.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use desk_client::Page;
use desk_core::Badge;
use serde::Serialize;

/// Whether ANSI colour should be emitted on stdout.
///
/// Honours `NO_COLOR` and stays plain when stdout is not a terminal.
pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Render a badge, coloured when `color` is set.
pub fn badge(value: &impl Badge, color: bool) -> String {
    if color {
        value.tone().paint(value.label())
    } else {
        value.label().to_string()
    }
}

/// Pretty-print any serialisable value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{text}");
    Ok(())
}

#[derive(Serialize)]
struct PageOut<'a, T> {
    items: &'a [T],
    page: u32,
    total: Option<u64>,
    total_pages: Option<u32>,
}

/// JSON form of a page, including paging metadata.
pub fn print_page_json<T: Serialize>(page: &Page<T>) -> Result<()> {
    print_json(&PageOut {
        items: &page.items,
        page: page.page,
        total: page.total,
        total_pages: page.total_pages,
    })
}

/// Footer line for a table, e.g. `page 1 of 3 (57 total)`.
pub fn page_footer<T>(page: &Page<T>) -> String {
    match (page.total_pages, page.total) {
        (Some(pages), Some(total)) => format!("page {} of {pages} ({total} total)", page.page),
        (Some(pages), None) => format!("page {} of {pages}", page.page),
        _ if page.has_next() => format!("page {} (more available)", page.page),
        _ => format!("page {}", page.page),
    }
}

/// Value or a dash for empty cells.
pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::TaskStatus;

    fn page(total_pages: Option<u32>, total: Option<u64>) -> Page<u8> {
        Page {
            items: vec![1, 2],
            page: 1,
            per_page: 2,
            total,
            total_pages,
        }
    }

    #[test]
    fn footer_variants() {
        assert_eq!(page_footer(&page(Some(3), Some(6))), "page 1 of 3 (6 total)");
        assert_eq!(page_footer(&page(Some(3), None)), "page 1 of 3");
        assert_eq!(page_footer(&page(None, None)), "page 1 (more available)");
    }

    #[test]
    fn plain_badge_is_the_label() {
        assert_eq!(badge(&TaskStatus::InProgress, false), "in progress");
        assert!(badge(&TaskStatus::Completed, true).starts_with("\x1b[32m"));
    }

    #[test]
    fn blank_cells_render_as_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ")), "-");
        assert_eq!(or_dash(Some("Riyadh")), "Riyadh");
    }
}
