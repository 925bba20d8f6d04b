//! Plain-text rendering of dashboard state for the terminal.

use std::fmt::Write as _;

use client_core::{
    view::{format_display_date, header_state, pager},
    FetchContext, FetchError, FilterOptions, PerformanceRecord, QueryState, ResultPage,
};
use shared::domain::{SortDirection, SortField};

pub const NO_RESULTS: &str = "No results found.";

fn header_label(query: &QueryState, field: SortField) -> String {
    match header_state(query, field) {
        Some(SortDirection::Asc) => format!("{} ↑", field.label()),
        Some(SortDirection::Desc) => format!("{} ↓", field.label()),
        None => field.label().to_string(),
    }
}

fn row_cells(record: &PerformanceRecord) -> [String; 7] {
    [
        record.student_id.clone(),
        record.student_name.clone(),
        record.course_name.clone(),
        record.subject_name.clone(),
        record.grade.clone(),
        format_display_date(&record.submitted_on),
        format_display_date(&record.modified_on),
    ]
}

pub fn results_table(result: &ResultPage, query: &QueryState) -> String {
    let header: Vec<String> = SortField::ALL
        .into_iter()
        .map(|field| header_label(query, field))
        .collect();
    let rows: Vec<[String; 7]> = result.items.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

pub fn page_summary(result: &ResultPage) -> String {
    let info = result.page_info();
    format!(
        "Showing {} to {} of {} results",
        info.start, info.end, info.total_items
    )
}

/// `« 1 [2] 3 4 5 »`, with unavailable arrows dimmed to `·`.
pub fn pager_line(result: &ResultPage) -> Option<String> {
    let pager = pager(result.current_page, result.total_pages)?;
    let mut parts = vec![if pager.previous_enabled { "«" } else { "·" }.to_string()];
    parts.extend(pager.pages.clone().map(|page| {
        if page == pager.current {
            format!("[{page}]")
        } else {
            page.to_string()
        }
    }));
    parts.push(if pager.next_enabled { "»" } else { "·" }.to_string());
    Some(parts.join(" "))
}

/// Table (or the no-results line), the "showing" line and the pager.
pub fn results_view(result: &ResultPage, query: &QueryState) -> String {
    let mut out = if result.is_empty() {
        format!("{NO_RESULTS}\n")
    } else {
        results_table(result, query)
    };
    let _ = writeln!(out, "{}", page_summary(result));
    if let Some(line) = pager_line(result) {
        let _ = writeln!(out, "{line}");
    }
    out
}

pub fn options_list(options: &FilterOptions, query: &QueryState) -> String {
    let mut out = String::from("Courses:\n");
    push_options(
        &mut out,
        options.courses.iter().map(|o| (o.id.0, o.name.as_str())),
        query.course().map(|id| id.0),
    );
    out.push_str("Subjects:\n");
    push_options(
        &mut out,
        options.subjects.iter().map(|o| (o.id.0, o.name.as_str())),
        query.subject().map(|id| id.0),
    );
    out
}

fn push_options<'a>(
    out: &mut String,
    entries: impl Iterator<Item = (i64, &'a str)>,
    selected: Option<i64>,
) {
    let marker = |active: bool| if active { '*' } else { ' ' };
    let _ = writeln!(out, " {} all", marker(selected.is_none()));
    for (id, name) in entries {
        let _ = writeln!(out, " {} {id:>4}  {name}", marker(selected == Some(id)));
    }
}

pub fn error_banner(context: FetchContext, error: &FetchError) -> String {
    let headline = match context {
        FetchContext::FilterOptions => {
            "Failed to load filter options. Some features may be limited."
        }
        FetchContext::Data => "Failed to fetch performance data. Please try again later.",
    };
    format!("!! {headline}\n!! {error} (type 'dismiss' to hide)")
}
