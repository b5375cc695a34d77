use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Columns a leading tab counts for when measuring indentation.
pub const TAB_WIDTH: usize = 2;

pub const DONE_DATE_FORMAT: &str = "%Y-%m-%d";

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\[[xX ]\]").expect("valid task regex"));

static COMPLETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\[[xX]\]").expect("valid completed task regex"));

static DONE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@done\(([0-9]{4}-[0-9]{2}-[0-9]{2})\)").expect("valid done tag regex")
});

pub fn is_task(line: &str) -> bool {
    TASK_RE.is_match(line)
}

pub fn is_completed(line: &str) -> bool {
    COMPLETED_RE.is_match(line)
}

/// First `@done(YYYY-MM-DD)` tag on the line whose date is a real calendar day.
pub fn done_date(line: &str) -> Option<NaiveDate> {
    DONE_TAG_RE
        .captures_iter(line)
        .find_map(|caps| NaiveDate::parse_from_str(&caps[1], DONE_DATE_FORMAT).ok())
}

/// A tag counts only when its date parses; `@done(2026-02-30)` reads as untagged.
pub fn has_done_tag(line: &str) -> bool {
    done_date(line).is_some()
}

/// The tag pattern is present but none of its dates parse.
pub fn has_malformed_done_tag(line: &str) -> bool {
    DONE_TAG_RE.is_match(line) && !has_done_tag(line)
}

pub fn indent_depth(line: &str) -> usize {
    let mut depth = 0;
    for ch in line.chars() {
        match ch {
            ' ' => depth += 1,
            '\t' => depth += TAB_WIDTH,
            _ => break,
        }
    }
    depth
}

pub fn format_done_tag(date: NaiveDate) -> String {
    format!("@done({})", date.format(DONE_DATE_FORMAT))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 0-based position in the file; identity for archive partitioning.
    pub position: usize,
    pub text: String,
    pub indent: usize,
    pub is_task: bool,
    pub is_completed: bool,
    pub has_done_tag: bool,
}

impl Line {
    pub fn classify(position: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            position,
            indent: indent_depth(&text),
            is_task: is_task(&text),
            is_completed: is_completed(&text),
            has_done_tag: has_done_tag(&text),
            text,
        }
    }

    pub fn set_text(&mut self, text: String) {
        *self = Self::classify(self.position, text);
    }

    pub fn done_date(&self) -> Option<NaiveDate> {
        if self.has_done_tag {
            done_date(&self.text)
        } else {
            None
        }
    }
}

pub fn parse_lines(content: &str) -> Vec<Line> {
    content
        .split('\n')
        .enumerate()
        .map(|(position, text)| Line::classify(position, text))
        .collect()
}

pub fn join_lines(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
