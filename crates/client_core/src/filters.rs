//! Course and subject dropdown options derived from a sample of records.
//!
//! The backend has no endpoint listing courses or subjects, so the options are
//! built from one large page of data. Values that only occur outside the sample
//! never show up in the dropdowns.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

use shared::domain::{CourseId, CourseOption, FilterOption, SubjectId, SubjectOption};
use tracing::debug;

use crate::records::PerformanceRecord;

pub const DEFAULT_SAMPLE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub courses: Vec<CourseOption>,
    pub subjects: Vec<SubjectOption>,
}

impl FilterOptions {
    pub fn course_name(&self, id: CourseId) -> Option<&str> {
        self.courses
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.name.as_str())
    }

    pub fn subject_name(&self, id: SubjectId) -> Option<&str> {
        self.subjects
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.name.as_str())
    }
}

pub fn derive_options(sample: &[PerformanceRecord]) -> FilterOptions {
    let courses = derive_list(
        "course",
        sample
            .iter()
            .map(|record| (record.course_name.as_str(), record.course_id)),
        CourseId,
    );
    let subjects = derive_list(
        "subject",
        sample
            .iter()
            .map(|record| (record.subject_name.as_str(), record.subject_id)),
        SubjectId,
    );
    FilterOptions { courses, subjects }
}

/// Alphabetical order used for option lists: case-insensitive, ties broken by
/// the raw name so distinct spellings keep a fixed order.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn derive_list<'a, Id: Copy>(
    kind: &'static str,
    entries: impl Iterator<Item = (&'a str, Option<Id>)>,
    synthetic: impl Fn(i64) -> Id,
) -> Vec<FilterOption<Id>> {
    let mut explicit: HashMap<&str, Id> = HashMap::new();
    let mut names: BTreeSet<&str> = BTreeSet::new();

    for (name, id) in entries {
        if name.trim().is_empty() {
            continue;
        }
        names.insert(name);
        if let Some(id) = id {
            explicit.insert(name, id);
        }
    }

    let mut options: Vec<FilterOption<Id>> = if explicit.is_empty() {
        debug!(kind, "no ids in sample, assigning synthetic ids");
        let mut sorted: Vec<&str> = names.into_iter().collect();
        sorted.sort_by(|a, b| collate(a, b));
        sorted
            .into_iter()
            .zip(1_i64..)
            .map(|(name, index)| FilterOption {
                id: synthetic(index),
                name: name.to_string(),
            })
            .collect()
    } else {
        explicit
            .into_iter()
            .map(|(name, id)| FilterOption {
                id,
                name: name.to_string(),
            })
            .collect()
    };

    options.sort_by(|a, b| collate(&a.name, &b.name));
    options
}

#[cfg(test)]
#[path = "tests/filters_tests.rs"]
mod tests;
