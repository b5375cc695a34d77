use chrono::NaiveDate;

use crate::ttt::line::{Line, format_done_tag, join_lines, parse_lines};
use crate::ttt::tree::{Forest, build_forest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub content: String,
    /// Open tasks completed because an ancestor was completed.
    pub cascaded: usize,
    /// Completed tasks that only needed a `@done` tag.
    pub tagged: usize,
}

impl ProcessOutcome {
    pub fn changed(&self) -> usize {
        self.cascaded + self.tagged
    }
}

/// Append ` @done(date)`, keeping a trailing `\r` last.
fn append_done_tag(text: &str, today: NaiveDate) -> String {
    let tag = format_done_tag(today);
    match text.strip_suffix('\r') {
        Some(body) => format!("{body} {tag}\r"),
        None => format!("{text} {tag}"),
    }
}

/// Tag a completed line that has no valid `@done` tag yet.
pub fn add_done_tag(text: &str, today: NaiveDate) -> (String, bool) {
    let line = Line::classify(0, text);
    if !line.is_completed || line.has_done_tag {
        return (text.to_string(), false);
    }
    (append_done_tag(text, today), true)
}

fn complete_below(forest: &Forest, id: usize, lines: &mut [Line], today: NaiveDate) -> usize {
    let mut count = 0;
    for node in forest.descendants(id) {
        let line = &mut lines[forest.node(node).line];
        if !line.is_completed {
            let checked = line.text.replacen("[ ]", "[x]", 1);
            line.set_text(append_done_tag(&checked, today));
            count += 1;
        }
    }
    count
}

fn cascade_node(forest: &Forest, id: usize, lines: &mut [Line], today: NaiveDate) -> usize {
    let mut count = 0;
    if lines[forest.node(id).line].is_completed {
        count += complete_below(forest, id, lines, today);
    }
    // Completed nodes below an open parent still trigger for their own children.
    for &child in &forest.node(id).children {
        count += cascade_node(forest, child, lines, today);
    }
    count
}

/// Complete every task below a completed task, tagging it with `today`.
/// Returns the number of tasks that changed.
pub fn cascade(lines: &mut [Line], today: NaiveDate) -> usize {
    let forest = build_forest(lines);
    forest
        .roots
        .iter()
        .map(|&root| cascade_node(&forest, root, lines, today))
        .sum()
}

/// Cascade, then tag anything completed directly by the user.
pub fn process_content(content: &str, today: NaiveDate) -> ProcessOutcome {
    let mut lines = parse_lines(content);
    let cascaded = cascade(&mut lines, today);

    let mut tagged = 0;
    for line in &mut lines {
        let (text, changed) = add_done_tag(&line.text, today);
        if changed {
            line.set_text(text);
            tagged += 1;
        }
    }

    ProcessOutcome {
        content: join_lines(&lines),
        cascaded,
        tagged,
    }
}
