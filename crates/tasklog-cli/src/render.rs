use std::io::{self, IsTerminal, Write};

use tasklog_core::display::{format_date, format_date_time, note_or_dash};
use tasklog_core::filter::ActiveFilter;
use tasklog_core::session::{Alert, AlertKind};
use tasklog_core::task::{Task, TaskStatus};
use tasklog_core::Zone;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    zone: Zone,
}

impl Renderer {
    pub fn new(color: bool, zone: Zone) -> Self {
        Self { color, zone }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&self, tasks: &[Task]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if tasks.is_empty() {
            writeln!(out, "No tasks found.")?;
            return Ok(());
        }
        write_table(&mut out, task_headers(), self.task_rows(tasks))?;
        writeln!(out)?;
        writeln!(out, "{} task(s)", tasks.len())?;
        Ok(())
    }

    pub fn print_active_filters(&self, badges: &[ActiveFilter]) -> anyhow::Result<()> {
        if badges.is_empty() {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        let chips = badges
            .iter()
            .map(|badge| format!("[{}: {}]", badge.label, badge.value))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "Filters: {chips}")?;
        Ok(())
    }

    pub fn print_names(&self, names: &[String]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for name in names {
            writeln!(out, "{name}")?;
        }
        Ok(())
    }

    pub fn print_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        let code = match alert.kind {
            AlertKind::Success => "32",
            AlertKind::Error => "31",
        };
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint(&alert.message, code))?;
        Ok(())
    }

    pub fn print_warning(&self, alert: &Alert) -> anyhow::Result<()> {
        let mut err = io::stderr().lock();
        writeln!(err, "{}", self.paint(&format!("warning: {}", alert.message), "33"))?;
        Ok(())
    }

    fn task_rows(&self, tasks: &[Task]) -> Vec<Vec<String>> {
        tasks
            .iter()
            .map(|task| {
                let status = match task.status {
                    TaskStatus::Open => self.paint(task.status.label(), "32"),
                    TaskStatus::Closed => self.paint(task.status.label(), "90"),
                };
                vec![
                    self.paint(&task.id.to_string(), "33"),
                    format_date(task.date_created, &self.zone),
                    task.entity_name.clone(),
                    task.task_type.clone(),
                    format_date_time(task.task_time, &self.zone),
                    task.contact_person.clone(),
                    note_or_dash(task.note.as_deref()).to_string(),
                    status,
                ]
            })
            .collect()
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn task_headers() -> Vec<String> {
    [
        "ID",
        "Created",
        "Entity",
        "Type",
        "Task Time",
        "Contact",
        "Note",
        "Status",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let mut line = String::new();
    for (header, width) in headers.iter().zip(&widths) {
        line.push_str(&pad(header, *width));
    }
    writeln!(writer, "{}", line.trim_end())?;

    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{rule}")?;

    for row in rows {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(&widths) {
            line.push_str(&pad(cell, *width));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn pad(cell: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
    let padding = width.saturating_sub(visible_width);
    format!("{cell}{} ", " ".repeat(padding))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_on_display_width() {
        let mut out = Vec::new();
        write_table(
            &mut out,
            vec!["ID".to_string(), "Entity".to_string()],
            vec![
                vec!["\x1b[33m1\x1b[0m".to_string(), "東京".to_string()],
                vec!["12".to_string(), "Acme".to_string()],
            ],
        )
        .expect("table");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID Entity");
        assert_eq!(lines[1], "-- ------");
        assert_eq!(strip_ansi(lines[2]), "1  東京");
        assert_eq!(lines[3], "12 Acme");
    }

    #[test]
    fn plain_output_when_color_is_off() {
        let renderer = Renderer::new(false, Zone::Local);
        assert_eq!(renderer.paint("Open", "32"), "Open");
    }
}
