//! User-controlled view parameters and the transitions each control applies.

use shared::{
    domain::{CourseId, PageSize, SortDirection, SortField, SubjectId},
    protocol::PerformanceQuery,
};

/// Shorter search terms are held locally and never sent.
pub const MIN_SEARCH_CHARS: usize = 3;

pub fn search_qualifies(raw: &str) -> bool {
    let len = raw.trim().chars().count();
    len == 0 || len >= MIN_SEARCH_CHARS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search_text: String,
    course: Option<CourseId>,
    subject: Option<SubjectId>,
    page: u32,
    page_size: PageSize,
    sort_field: SortField,
    sort_direction: SortDirection,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            course: None,
            subject: None,
            page: 1,
            page_size: PageSize::default(),
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

impl QueryState {
    pub fn new(page_size: PageSize, sort_field: SortField, sort_direction: SortDirection) -> Self {
        Self {
            page_size,
            sort_field,
            sort_direction,
            ..Self::default()
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn course(&self) -> Option<CourseId> {
        self.course
    }

    pub fn subject(&self) -> Option<SubjectId> {
        self.subject
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Commits a search term. Returns `false` (and changes nothing) for terms
    /// of one or two characters.
    pub fn commit_search(&mut self, raw: &str) -> bool {
        if !search_qualifies(raw) {
            return false;
        }
        self.search_text = raw.trim().to_string();
        self.page = 1;
        true
    }

    pub fn set_course(&mut self, course: Option<CourseId>) {
        self.course = course;
        self.page = 1;
    }

    pub fn set_subject(&mut self, subject: Option<SubjectId>) {
        self.subject = subject;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Re-selecting the active column flips its direction; another column
    /// becomes active ascending. The page is kept.
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }

    /// Moves to `requested`, clamped to `[1, total_pages]`. With no pages known
    /// yet the only valid page is 1.
    pub fn go_to_page(&mut self, requested: u32, total_pages: u32) {
        self.page = requested.clamp(1, total_pages.max(1));
    }

    /// Adopts the page number the backend reports for the data it returned.
    pub(crate) fn sync_page(&mut self, current_page: u32) {
        self.page = current_page.max(1);
    }

    pub fn to_query(&self) -> PerformanceQuery {
        let search = self.search_text.trim();
        PerformanceQuery {
            search: (search.chars().count() >= MIN_SEARCH_CHARS).then(|| search.to_string()),
            course_id: self.course,
            subject_id: self.subject,
            page: self.page,
            page_size: self.page_size,
            sort_by: self.sort_field,
            sort_direction: self.sort_direction,
        }
    }
}
