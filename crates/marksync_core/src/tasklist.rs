//! Markdown checklist parsing with remote anchors.
//!
//! A tracked task is a checklist line carrying an anchor token naming its
//! remote counterpart, e.g.:
//!
//! ```text
//! - [ ] Review roadmap 📅 2026-09-01 ^gtask-abc123
//! - [x] Ship release notes ✅ 2026-08-20 ^gtask-def456
//! - [ ] Untracked local idea
//! ```
//!
//! The anchor's presence is the sole signal the task is linked; its absence
//! marks the task unlinked. One unparseable line never aborts the file: it is
//! reported per item and the rest of the list is parsed.

use crate::error::CoreError;
use chrono::NaiveDate;

const DUE_MARKER: char = '📅';
const DONE_MARKER: char = '✅';

/// Completion status of a task. `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task is pending.
    Open,
    /// Task is done. Never transitions back to `Open`.
    Complete,
}

/// One checklist line parsed from an artifact body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTask {
    /// 1-based line number in the body.
    pub line: usize,
    /// Checkbox status.
    pub status: TaskStatus,
    /// Task title, anchor and date tokens stripped.
    pub title: String,
    /// Due date, if a `📅 YYYY-MM-DD` token is present.
    pub due: Option<NaiveDate>,
    /// Remote anchor id, if a trailing `^service-id` token is present.
    pub anchor: Option<String>,
}

/// Result of parsing a checklist body: tasks plus per-line parse errors.
#[derive(Debug, Default)]
pub struct TaskParseOutcome {
    /// Successfully parsed tasks.
    pub tasks: Vec<LocalTask>,
    /// Lines that looked like tasks but could not be parsed. Enumerable in
    /// the final report, never silently dropped.
    pub errors: Vec<CoreError>,
}

/// Parses all checklist lines in a body, extracting anchors for the given
/// service name.
pub fn parse_tasks(body: &str, service: &str) -> TaskParseOutcome {
    let mut outcome = TaskParseOutcome::default();
    for (idx, line) in body.lines().enumerate() {
        let line_no = idx + 1;
        match parse_task_line(line, service) {
            Ok(Some(mut task)) => {
                task.line = line_no;
                outcome.tasks.push(task);
            }
            Ok(None) => {}
            Err(message) => {
                tracing::warn!(line = line_no, %message, "skipping unparseable task line");
                outcome.errors.push(CoreError::TaskParse {
                    line: line_no,
                    message,
                });
            }
        }
    }
    outcome
}

/// Parses a single line; `Ok(None)` for non-checklist lines.
fn parse_task_line(line: &str, service: &str) -> Result<Option<LocalTask>, String> {
    let trimmed = line.trim_start();
    let Some(rest) = trimmed.strip_prefix("- [") else {
        return Ok(None);
    };
    let mut chars = rest.chars();
    let marker = chars.next().ok_or("truncated checkbox")?;
    if chars.next() != Some(']') {
        return Err("unterminated checkbox".into());
    }
    let status = match marker {
        ' ' => TaskStatus::Open,
        'x' | 'X' => TaskStatus::Complete,
        other => return Err(format!("unknown status marker `{other}`")),
    };
    let mut text = chars.as_str().trim().to_owned();

    let anchor_prefix = format!("^{service}-");
    let mut anchor = None;
    if let Some(pos) = text.rfind(&anchor_prefix) {
        let token = &text[pos..];
        if !token.contains(char::is_whitespace) {
            anchor = Some(token[anchor_prefix.len()..].to_owned());
            text.truncate(pos);
        }
    }

    let mut due = None;
    if let Some(pos) = text.find(DUE_MARKER) {
        let after = text[pos + DUE_MARKER.len_utf8()..].trim_start();
        let date_str: String = after.chars().take_while(|c| !c.is_whitespace()).collect();
        due = Some(
            NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|e| format!("bad due date `{date_str}`: {e}"))?,
        );
        text.truncate(pos);
    }

    if let Some(pos) = text.find(DONE_MARKER) {
        text.truncate(pos);
    }

    let title = text.trim().to_owned();
    if anchor.as_deref() == Some("") {
        return Err("empty anchor id".into());
    }

    Ok(Some(LocalTask {
        line: 0,
        status,
        title,
        due,
        anchor,
    }))
}

/// Formats the anchor token for a remote id: `^service-id`.
pub fn anchor_token(service: &str, remote_id: &str) -> String {
    format!("^{service}-{remote_id}")
}

/// Formats a capture line for a newly discovered remote task.
pub fn format_capture_line(
    title: &str,
    due: Option<NaiveDate>,
    service: &str,
    remote_id: &str,
) -> String {
    let mut line = format!("- [ ] {title}");
    if let Some(due) = due {
        line.push_str(&format!(" {DUE_MARKER} {}", due.format("%Y-%m-%d")));
    }
    line.push(' ');
    line.push_str(&anchor_token(service, remote_id));
    line
}

/// Rewrites an open checklist line as complete, recording the completion
/// date. Lines already complete are returned unchanged.
pub fn complete_task_line(line: &str, completed_on: NaiveDate) -> String {
    let Some(pos) = line.find("- [ ]") else {
        return line.to_owned();
    };
    let mut out = String::with_capacity(line.len() + 16);
    out.push_str(&line[..pos]);
    out.push_str("- [x]");
    out.push_str(&line[pos + 5..]);
    out.push_str(&format!(
        " {DONE_MARKER} {}",
        completed_on.format("%Y-%m-%d")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_linked_and_unlinked() {
        let body = "\
# Tasks

- [ ] Review roadmap 📅 2026-09-01 ^gtask-abc123
- [x] Ship notes ^gtask-def456
- [ ] Untracked idea
plain text
";
        let outcome = parse_tasks(body, "gtask");
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.tasks.len(), 3);

        let t = &outcome.tasks[0];
        assert_eq!(t.title, "Review roadmap");
        assert_eq!(t.status, TaskStatus::Open);
        assert_eq!(t.anchor.as_deref(), Some("abc123"));
        assert_eq!(
            t.due,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
        assert_eq!(t.line, 3);

        assert_eq!(outcome.tasks[1].status, TaskStatus::Complete);
        assert!(outcome.tasks[2].anchor.is_none());
    }

    #[test]
    fn bad_line_is_reported_not_fatal() {
        let body = "- [?] mystery\n- [ ] fine ^gtask-x1\n";
        let outcome = parse_tasks(body, "gtask");
        assert_eq!(outcome.tasks.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            CoreError::TaskParse { line: 1, .. }
        ));
    }

    #[test]
    fn bad_due_date_is_reported() {
        let body = "- [ ] oops 📅 soon\n";
        let outcome = parse_tasks(body, "gtask");
        assert!(outcome.tasks.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn other_service_anchor_is_not_a_link() {
        let outcome = parse_tasks("- [ ] item ^todoist-9\n", "gtask");
        assert_eq!(outcome.tasks[0].anchor, None);
        assert_eq!(outcome.tasks[0].title, "item ^todoist-9");
    }

    #[test]
    fn capture_line_carries_anchor() {
        let line = format_capture_line(
            "New remote task",
            NaiveDate::from_ymd_opt(2026, 9, 15),
            "gtask",
            "zz9",
        );
        assert_eq!(line, "- [ ] New remote task 📅 2026-09-15 ^gtask-zz9");

        let reparsed = parse_tasks(&line, "gtask");
        assert_eq!(reparsed.tasks[0].anchor.as_deref(), Some("zz9"));
    }

    #[test]
    fn complete_line_rewrites_checkbox() {
        let done = complete_task_line(
            "  - [ ] Review roadmap ^gtask-abc",
            NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
        );
        assert_eq!(done, "  - [x] Review roadmap ^gtask-abc ✅ 2026-08-26");

        // Already complete: unchanged.
        assert_eq!(
            complete_task_line(&done, NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()),
            done
        );
    }
}
