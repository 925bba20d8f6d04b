//! Presentation arithmetic shared by every front end: the "showing x-y of n"
//! line, the pager window, sort header state and date formatting.

use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::domain::{SortDirection, SortField};

use crate::query::QueryState;

pub const MAX_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub start: u64,
    pub end: u64,
    pub total_items: u64,
}

pub fn page_info(page: u32, page_size: u32, total_items: u64) -> PageInfo {
    if total_items == 0 {
        return PageInfo {
            start: 0,
            end: 0,
            total_items: 0,
        };
    }
    let page_size = u64::from(page_size.max(1));
    let start = u64::from(page.max(1) - 1) * page_size + 1;
    let end = (start + page_size - 1).min(total_items);
    PageInfo {
        start,
        end,
        total_items,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub pages: RangeInclusive<u32>,
    pub current: u32,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

/// Window of at most [`MAX_VISIBLE_PAGES`] page links around `current`.
/// `None` when everything fits on one page.
pub fn pager(current: u32, total_pages: u32) -> Option<Pager> {
    if total_pages <= 1 {
        return None;
    }
    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total_pages);
    if end - start + 1 < MAX_VISIBLE_PAGES {
        start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }
    Some(Pager {
        pages: start..=end,
        current,
        previous_enabled: current > 1,
        next_enabled: current < total_pages,
    })
}

/// Direction marker for a column header, `None` for inactive columns.
pub fn header_state(query: &QueryState, field: SortField) -> Option<SortDirection> {
    (query.sort_field() == field).then(|| query.sort_direction())
}

/// Renders a backend timestamp as e.g. `Mar 5, 2024`. Values that are not a
/// recognizable date come back unchanged.
pub fn format_display_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|value| value.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|value| value.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|value| value.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match date {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
