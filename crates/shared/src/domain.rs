use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                raw.trim()
                    .parse::<i64>()
                    .map($name)
                    .map_err(|_| DomainError::InvalidId(raw.to_string()))
            }
        }
    };
}

id_newtype!(CourseId);
id_newtype!(SubjectId);

/// Columns the backend accepts in `sortBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    StudentId,
    #[default]
    StudentName,
    Course,
    Subject,
    Grade,
    SubmittedOn,
    ModifiedOn,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::StudentId,
        SortField::StudentName,
        SortField::Course,
        SortField::Subject,
        SortField::Grade,
        SortField::SubmittedOn,
        SortField::ModifiedOn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::StudentId => "studentId",
            SortField::StudentName => "studentName",
            SortField::Course => "course",
            SortField::Subject => "subject",
            SortField::Grade => "grade",
            SortField::SubmittedOn => "submittedOn",
            SortField::ModifiedOn => "modifiedOn",
        }
    }

    /// Column header text.
    pub fn label(self) -> &'static str {
        match self {
            SortField::StudentId => "Student ID",
            SortField::StudentName => "Name",
            SortField::Course => "Course",
            SortField::Subject => "Subject",
            SortField::Grade => "Grade",
            SortField::SubmittedOn => "Submitted On",
            SortField::ModifiedOn => "Modified On",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    // Older backends expect `StudentName`, so matching ignores case.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownSortField(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(DomainError::UnknownSortDirection(raw.to_string())),
        }
    }
}

/// Rows per page. Only the sizes offered by the page-size selector are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub const SUPPORTED: [u32; 4] = [5, 10, 25, 50];

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if Self::SUPPORTED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::UnsupportedPageSize(value))
        }
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageSize {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidPageSize(raw.to_string()))?;
        Self::try_from(value)
    }
}

/// One entry of a course or subject dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption<Id> {
    pub id: Id,
    pub name: String,
}

pub type CourseOption = FilterOption<CourseId>;
pub type SubjectOption = FilterOption<SubjectId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_field_parses_either_casing() {
        assert_eq!(
            "StudentName".parse::<SortField>().expect("parse"),
            SortField::StudentName
        );
        assert_eq!(
            "submittedon".parse::<SortField>().expect("parse"),
            SortField::SubmittedOn
        );
        assert!("shoe_size".parse::<SortField>().is_err());
    }

    #[test]
    fn page_size_rejects_unsupported_values() {
        assert_eq!(PageSize::try_from(25).expect("supported").get(), 25);
        assert!(matches!(
            PageSize::try_from(7),
            Err(DomainError::UnsupportedPageSize(7))
        ));
        assert!("ten".parse::<PageSize>().is_err());
    }

    #[test]
    fn sort_direction_toggles() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
    }
}
