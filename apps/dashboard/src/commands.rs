use anyhow::{anyhow, bail, Context, Result};
use shared::domain::{CourseId, PageSize, SortField, SubjectId};

pub const HELP: &str = "\
commands:
  search <text>        filter by student name (empty text clears)
  course <id|all>      filter by course
  subject <id|all>     filter by subject
  size <5|10|25|50>    rows per page
  sort <field>         sort by a column, again to reverse
  page <n>             jump to a page
  next | prev          step through pages
  refresh              reload the current page
  options              list course and subject filters
  dismiss              hide the error banner
  help                 show this text
  quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Course(Option<CourseId>),
    Subject(Option<SubjectId>),
    PageSize(PageSize),
    Sort(SortField),
    Page(u32),
    Next,
    Previous,
    Refresh,
    Options,
    Dismiss,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "course" => Command::Course(optional_id(rest, "course")?),
        "subject" => Command::Subject(optional_id(rest, "subject")?),
        "size" => Command::PageSize(rest.parse::<PageSize>().with_context(|| {
            format!("page size must be one of {:?}", PageSize::SUPPORTED)
        })?),
        "sort" => Command::Sort(rest.parse::<SortField>().map_err(|_| {
            let fields: Vec<&str> = SortField::ALL.iter().map(|field| field.as_str()).collect();
            anyhow!("unknown sort field '{rest}', expected one of {}", fields.join(", "))
        })?),
        "page" | "p" => {
            let page = rest
                .parse::<u32>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or_else(|| anyhow!("page must be a positive number"))?;
            Command::Page(page)
        }
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Previous,
        "refresh" | "r" => Command::Refresh,
        "options" => Command::Options,
        "dismiss" => Command::Dismiss,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{other}', type 'help'"),
    };
    Ok(Some(command))
}

fn optional_id<T>(raw: &str, what: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .with_context(|| format!("{what} must be a numeric id or 'all'"))
}
