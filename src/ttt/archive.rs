use anyhow::Result;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ttt::cascade::process_content;
use crate::ttt::line::{DONE_DATE_FORMAT, Line, parse_lines};
use crate::ttt::store;
use crate::ttt::tree::{Forest, build_forest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub position: usize,
    pub content: String,
    /// Done date of the archived subtree's root, shared by the whole subtree.
    pub group_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub entries: Vec<ArchiveEntry>,
    pub remaining: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub tagged: usize,
    pub archived: usize,
}

/// Tags dated strictly before this day are old enough to archive.
pub fn cutoff(today: NaiveDate, delay_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(delay_days)))
        .unwrap_or(NaiveDate::MIN)
}

fn mark_archivable(
    forest: &Forest,
    id: usize,
    lines: &[Line],
    cutoff: NaiveDate,
    inherited: Option<NaiveDate>,
    is_root: bool,
    marks: &mut [Option<NaiveDate>],
) {
    let line = &lines[forest.node(id).line];
    let mut group_date = inherited;

    // Only roots qualify on their own; everything below follows its root.
    if is_root && group_date.is_none() && line.is_completed {
        group_date = line.done_date().filter(|done| *done < cutoff);
    }

    if let Some(date) = group_date {
        marks[line.position] = Some(date);
    }

    for &child in &forest.node(id).children {
        mark_archivable(forest, child, lines, cutoff, group_date, false, marks);
    }
}

/// Claim untracked note lines indented inside an archived task.
fn sweep_notes(lines: &[Line], marks: &mut [Option<NaiveDate>]) {
    for i in 0..lines.len() {
        let Some(date) = marks[i].filter(|_| lines[i].is_task) else {
            continue;
        };
        let parent_indent = lines[i].indent;
        for j in (i + 1)..lines.len() {
            if lines[j].indent <= parent_indent {
                break;
            }
            if !lines[j].is_task && marks[j].is_none() {
                marks[j] = Some(date);
            }
        }
    }
}

/// Split content into entries old enough to archive and the text that stays.
pub fn filter_archivable(content: &str, delay_days: u32, today: NaiveDate) -> Partition {
    let lines = parse_lines(content);
    let forest = build_forest(&lines);
    let cutoff = cutoff(today, delay_days);

    let mut marks: Vec<Option<NaiveDate>> = vec![None; lines.len()];
    for &root in &forest.roots {
        mark_archivable(&forest, root, &lines, cutoff, None, true, &mut marks);
    }
    sweep_notes(&lines, &mut marks);

    let mut entries = Vec::new();
    let mut remaining = Vec::new();
    for (line, mark) in lines.into_iter().zip(marks) {
        match mark {
            Some(group_date) => entries.push(ArchiveEntry {
                position: line.position,
                content: line.text,
                group_date,
            }),
            None => remaining.push(line.text),
        }
    }

    Partition {
        entries,
        remaining: remaining.join("\n"),
    }
}

/// Render `## YYYY-MM-DD` sections, newest first, entries in file order.
pub fn format_entries(entries: &[ArchiveEntry]) -> String {
    let mut by_date: BTreeMap<NaiveDate, Vec<&str>> = BTreeMap::new();
    for entry in entries {
        by_date
            .entry(entry.group_date)
            .or_default()
            .push(entry.content.as_str());
    }

    let mut out = String::new();
    for (date, lines) in by_date.iter().rev() {
        out.push_str(&format!("## {}\n\n", date.format(DONE_DATE_FORMAT)));
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// What an archive run would move, computed without touching disk.
pub fn preview(content: &str, delay_days: u32, today: NaiveDate) -> Partition {
    let processed = process_content(content, today);
    filter_archivable(&processed.content, delay_days, today)
}

/// Tag the task file, then move old completed subtrees to the front of the
/// archive file. Neither file is rewritten for archiving when nothing qualifies.
pub fn archive(
    tasks_path: &Path,
    archive_path: &Path,
    delay_days: u32,
    today: NaiveDate,
) -> Result<ArchiveOutcome> {
    let tagged = store::process_file(tasks_path, today)?;
    let content = store::load(tasks_path)?;

    let partition = filter_archivable(&content, delay_days, today);
    if partition.entries.is_empty() {
        return Ok(ArchiveOutcome {
            tagged,
            archived: 0,
        });
    }

    store::prepend(archive_path, &format_entries(&partition.entries))?;
    store::save(tasks_path, &partition.remaining)?;

    Ok(ArchiveOutcome {
        tagged,
        archived: partition.entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn contents(partition: &Partition) -> Vec<&str> {
        partition.entries.iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn open_parent_blocks_old_child() {
        let content = "- [ ] P\n  - [x] C @done(2020-01-01)";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert!(got.entries.is_empty());
        assert_eq!(got.remaining, content);
    }

    #[test]
    fn recent_parent_blocks_old_child() {
        let content = "- [x] P @done(2026-01-18)\n  - [x] C @done(2020-01-01)";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert!(got.entries.is_empty());
        assert_eq!(got.remaining, content);
    }

    #[test]
    fn old_root_takes_its_subtree_and_notes() {
        let content = "- [x] P @done(2020-01-01)\n  - [x] C @done(2020-01-01)\n  - note";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert_eq!(got.entries.len(), 3);
        assert!(got.entries.iter().all(|e| e.group_date == day(2020, 1, 1)));
        assert_eq!(got.remaining.trim(), "");
    }

    #[test]
    fn subtree_groups_under_root_date() {
        let content = "- [x] P @done(2026-01-10)\n  - [x] C @done(2025-12-01)\n    - [ ] G\n- [ ] keep";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert_eq!(contents(&got), vec![
            "- [x] P @done(2026-01-10)",
            "  - [x] C @done(2025-12-01)",
            "    - [ ] G",
        ]);
        assert!(got.entries.iter().all(|e| e.group_date == day(2026, 1, 10)));
        assert_eq!(got.remaining, "- [ ] keep");
    }

    #[test]
    fn cutoff_day_itself_does_not_qualify() {
        let today = day(2026, 1, 19);
        let at_cutoff = filter_archivable("- [x] a @done(2026-01-17)", 2, today);
        assert!(at_cutoff.entries.is_empty());
        let before_cutoff = filter_archivable("- [x] a @done(2026-01-16)", 2, today);
        assert_eq!(before_cutoff.entries.len(), 1);
    }

    #[test]
    fn zero_delay_archives_anything_before_today() {
        let today = day(2026, 1, 19);
        assert!(filter_archivable("- [x] a @done(2026-01-19)", 0, today).entries.is_empty());
        assert_eq!(filter_archivable("- [x] a @done(2026-01-18)", 0, today).entries.len(), 1);
    }

    #[test]
    fn untagged_or_malformed_roots_stay() {
        let content = "- [x] untagged\n- [x] bad @done(2020-02-31)\n- [ ] open @done(2020-01-01)";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert!(got.entries.is_empty());
        assert_eq!(got.remaining, content);
    }

    #[test]
    fn stray_notes_without_archived_task_stay() {
        let content = "  orphan note\n- [x] a @done(2020-01-01)\nheading\n  indented under heading";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert_eq!(contents(&got), vec!["- [x] a @done(2020-01-01)"]);
        assert_eq!(got.remaining, "  orphan note\nheading\n  indented under heading");
    }

    #[test]
    fn note_sweep_stops_at_shallower_line() {
        let content = "- [x] a @done(2020-01-01)\n  note a\n\n  after blank\n- [ ] b\n  note b\n";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert_eq!(contents(&got), vec!["- [x] a @done(2020-01-01)", "  note a"]);
        assert_eq!(got.remaining, "\n  after blank\n- [ ] b\n  note b\n");
    }

    #[test]
    fn nested_archived_tasks_do_not_reassign_notes() {
        let content = "- [x] a @done(2020-03-01)\n  - [x] b @done(2020-01-01)\n    deep note\n  shallow note";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        assert_eq!(got.entries.len(), 4);
        let positions: Vec<usize> = got.entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert!(got.entries.iter().all(|e| e.group_date == day(2020, 3, 1)));
    }

    #[test]
    fn separate_roots_keep_their_own_dates() {
        let content = "- [x] a @done(2026-01-01)\n- [ ] stay\n- [x] b @done(2025-06-01)";
        let got = filter_archivable(content, 2, day(2026, 1, 19));
        let dates: Vec<NaiveDate> = got.entries.iter().map(|e| e.group_date).collect();
        assert_eq!(dates, vec![day(2026, 1, 1), day(2025, 6, 1)]);
        assert_eq!(got.remaining, "- [ ] stay");
    }

    #[test]
    fn format_sorts_sections_newest_first() {
        let entries = vec![
            ArchiveEntry {
                position: 0,
                content: "- [x] older @done(2026-01-17)".into(),
                group_date: day(2026, 1, 17),
            },
            ArchiveEntry {
                position: 1,
                content: "- [x] newer @done(2026-01-18)".into(),
                group_date: day(2026, 1, 18),
            },
            ArchiveEntry {
                position: 2,
                content: "  - [x] child @done(2026-01-17)".into(),
                group_date: day(2026, 1, 17),
            },
        ];
        assert_eq!(
            format_entries(&entries),
            "## 2026-01-18\n\n- [x] newer @done(2026-01-18)\n\n\
             ## 2026-01-17\n\n- [x] older @done(2026-01-17)\n  - [x] child @done(2026-01-17)\n\n"
        );
    }

    #[test]
    fn format_empty_is_empty() {
        assert_eq!(format_entries(&[]), "");
    }

    #[test]
    fn preview_tags_before_partitioning() {
        let got = preview("- [x] a\n  - [ ] b", 0, day(2026, 1, 19));
        assert!(got.entries.is_empty());
        assert_eq!(
            got.remaining,
            "- [x] a @done(2026-01-19)\n  - [x] b @done(2026-01-19)"
        );
    }

    #[test]
    fn archive_moves_entries_and_prepends_sections() {
        let tmp = tempdir().expect("tempdir");
        let tasks = tmp.path().join("tasks.md");
        let archive_file = tmp.path().join("archive.md");
        fs::write(
            &tasks,
            "- [x] old @done(2026-01-10)\n  - [ ] sub\n- [ ] open\n- [x] fresh\n",
        )
        .expect("write tasks");
        fs::write(&archive_file, "## 2025-12-01\n\n- [x] ancient @done(2025-12-01)\n\n")
            .expect("write archive");

        let out = archive(&tasks, &archive_file, 2, day(2026, 1, 19)).expect("archive");
        assert_eq!(out.tagged, 2);
        assert_eq!(out.archived, 2);

        assert_eq!(
            fs::read_to_string(&tasks).expect("read tasks"),
            "- [ ] open\n- [x] fresh @done(2026-01-19)\n"
        );
        assert_eq!(
            fs::read_to_string(&archive_file).expect("read archive"),
            "## 2026-01-10\n\n- [x] old @done(2026-01-10)\n  - [x] sub @done(2026-01-19)\n\n\
             ## 2025-12-01\n\n- [x] ancient @done(2025-12-01)\n\n"
        );
    }

    #[test]
    fn archive_with_nothing_old_leaves_archive_untouched() {
        let tmp = tempdir().expect("tempdir");
        let tasks = tmp.path().join("tasks.md");
        let archive_file = tmp.path().join("archive.md");
        fs::write(&tasks, "- [ ] open\n").expect("write tasks");

        let out = archive(&tasks, &archive_file, 2, day(2026, 1, 19)).expect("archive");
        assert_eq!(out, ArchiveOutcome::default());
        assert!(!archive_file.exists());
        assert_eq!(fs::read_to_string(&tasks).expect("read"), "- [ ] open\n");
    }

    #[test]
    fn archive_requires_task_file() {
        let tmp = tempdir().expect("tempdir");
        let err = archive(
            &tmp.path().join("missing.md"),
            &tmp.path().join("archive.md"),
            2,
            day(2026, 1, 19),
        )
        .expect_err("missing task file");
        assert!(format!("{err:#}").contains("not found"));
    }
}
