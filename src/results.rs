//! Text rendering of search results, the page selector, upload outcomes and
//! the stats panel. Nothing here holds filter state.

use std::fmt::{self, Write as _};

use chrono::{Local, TimeZone};

use crate::models::dto::{EventFile, EventRecord, SearchResultPage, UploadOutcome};
use crate::stats::AggregateStats;

/// Most page buttons shown at once.
const MAX_PAGE_BUTTONS: i64 = 5;

/// What the results area currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsView {
    #[default]
    Empty,
    Page(SearchResultPage),
    Failed(String),
}

impl ResultsView {
    pub fn page(&self) -> Option<&SearchResultPage> {
        match self {
            ResultsView::Page(page) => Some(page),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            ResultsView::Empty => String::new(),
            ResultsView::Page(page) => render_page(page),
            ResultsView::Failed(message) => format!("Search failed: {message}\n"),
        }
    }
}

/// Page buttons around the current page, clamped to `[1, total]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStrip {
    pub current: u32,
    pub total: u32,
    pub pages: Vec<u32>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PageStrip {
    pub fn new(current: u32, total: u32) -> Self {
        let (cur, last) = (i64::from(current), i64::from(total));
        let start = (last - (MAX_PAGE_BUTTONS - 1)).min(cur - 2).max(1);
        let pages = (start..start + MAX_PAGE_BUTTONS.min(last))
            .filter(|p| (1..=last).contains(p))
            .map(|p| p as u32)
            .collect();

        Self {
            current,
            total,
            pages,
            prev_enabled: current > 1,
            next_enabled: current < total,
        }
    }

    /// A single page needs no selector.
    pub fn is_visible(&self) -> bool {
        self.total > 1
    }

    pub fn accepts(&self, page: u32) -> bool {
        (1..=self.total).contains(&page)
    }
}

impl fmt::Display for PageStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.prev_enabled { "< Prev " } else { "  ---- " })?;
        for page in &self.pages {
            if *page == self.current {
                write!(f, " [{page}]")?;
            } else {
                write!(f, " {page}")?;
            }
        }
        f.write_str(if self.next_enabled { "  Next >" } else { "  ----" })
    }
}

pub fn format_time(epoch_secs: i64) -> String {
    Local
        .timestamp_opt(epoch_secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}

/// File size as shown next to staged files, e.g. `1.5MB`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / 1024.0 / 1024.0)
}

/// `1234567` -> `1,234,567`
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn render_summary(page: &SearchResultPage) -> String {
    format!(
        "Found {} results in {}s (page {} of {})",
        page.total_count, page.search_time, page.page, page.total_pages
    )
}

fn render_record(out: &mut String, event: &EventRecord) {
    let _ = writeln!(
        out,
        "{:<34} {:<12} {:<7} {:<7} {:<19} {:<19} {:>13} {:>5} {:>10} {:>14}  {}",
        format!("{} -> {}", event.src_addr, event.dst_addr),
        event.account_id,
        event.action,
        event.log_status,
        format_time(event.start_time),
        format_time(event.end_time),
        format!("{}->{}", event.src_port, event.dst_port),
        event.protocol,
        group_digits(event.packets),
        group_digits(event.bytes_transferred),
        event.file_name,
    );
}

pub fn render_page(page: &SearchResultPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_summary(page));

    if page.results.is_empty() {
        out.push_str("No events found. No events match your search criteria; try adjusting your filters.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<34} {:<12} {:<7} {:<7} {:<19} {:<19} {:>13} {:>5} {:>10} {:>14}  {}",
        "SOURCE -> DESTINATION",
        "ACCOUNT",
        "ACTION",
        "STATUS",
        "START",
        "END",
        "PORTS",
        "PROTO",
        "PACKETS",
        "BYTES",
        "FILE",
    );
    for event in &page.results {
        render_record(&mut out, event);
    }

    let strip = PageStrip::new(page.page, page.total_pages);
    if strip.is_visible() {
        let _ = writeln!(out, "{strip}");
    }
    out
}

pub fn render_outcomes(outcomes: &[UploadOutcome]) -> String {
    let mut out = String::new();
    for (index, outcome) in outcomes.iter().enumerate() {
        let line = if outcome.is_success() {
            format!(
                "Successfully processed {} events",
                group_digits(outcome.events_processed.max(0) as u64)
            )
        } else {
            format!("Error: {}", outcome.error.as_deref().unwrap_or("Upload failed"))
        };
        let mark = if outcome.is_success() { "ok " } else { "err" };
        let _ = writeln!(out, "[{index}] {mark} {}  {line}", outcome.name);
    }
    out
}

pub fn render_stats(stats: &AggregateStats) -> String {
    format!(
        "Total Events: {} | Total Files: {} | Files Processed: {}",
        group_digits(stats.total_events),
        group_digits(stats.total_files),
        group_digits(stats.processed_files)
    )
}

pub fn render_files(files: &[EventFile]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(
            out,
            "{:>6}  {:<40} {:<25} {:<9} {:>12}",
            file.id,
            file.name,
            file.uploaded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            if file.processed { "processed" } else { "pending" },
            group_digits(file.total_events.max(0) as u64),
        );
    }
    out
}
