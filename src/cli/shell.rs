use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::cli::output::{category_to_json, task_table, tasks_to_json};
use crate::model::task::{PRIORITY_MAX, PRIORITY_MIN, Task, TaskEdit};
use crate::ops::history::ActionReport;
use crate::ops::session::Session;

/// Date format accepted at the prompts, independent of the display format
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

const MENU: &str = "\
Task manager:
 1. Add task
 2. Delete task
 3. Modify task
 4. List tasks by priority
 5. Undo
 6. Redo
 7. Mark task urgent
 8. Process urgent task
 9. Show tasks by category
10. Exit
11. Show urgent queue";

/// A menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    Delete,
    Modify,
    List,
    Undo,
    Redo,
    MarkUrgent,
    ProcessUrgent,
    Categories,
    Exit,
    UrgentQueue,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<MenuChoice> {
        let choice = match input.trim().parse::<u8>().ok()? {
            1 => MenuChoice::Add,
            2 => MenuChoice::Delete,
            3 => MenuChoice::Modify,
            4 => MenuChoice::List,
            5 => MenuChoice::Undo,
            6 => MenuChoice::Redo,
            7 => MenuChoice::MarkUrgent,
            8 => MenuChoice::ProcessUrgent,
            9 => MenuChoice::Categories,
            10 => MenuChoice::Exit,
            11 => MenuChoice::UrgentQueue,
            _ => return None,
        };
        Some(choice)
    }
}

/// Parse a priority in `PRIORITY_MIN..=PRIORITY_MAX`
pub fn parse_priority(input: &str) -> Option<u8> {
    input
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|p| (PRIORITY_MIN..=PRIORITY_MAX).contains(p))
}

/// Parse a `YYYY-MM-DD` due date that is not before `today`
pub fn parse_due_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), INPUT_DATE_FORMAT)
        .ok()
        .filter(|d| *d >= today)
}

/// Write `value` as one line of JSON
fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    let text = serde_json::to_string(value).map_err(io::Error::other)?;
    writeln!(out, "{}", text)
}

/// Interactive menu over a `Session`.
///
/// Reads from any `BufRead` and writes to any `Write`; end of input ends the
/// loop as if "Exit" had been chosen.
pub struct Shell<'s, R, W> {
    session: &'s mut Session,
    input: R,
    out: W,
    json: bool,
    today: NaiveDate,
}

impl<'s, R: BufRead, W: Write> Shell<'s, R, W> {
    pub fn new(session: &'s mut Session, input: R, out: W, today: NaiveDate) -> Self {
        Shell {
            session,
            input,
            out,
            json: false,
            today,
        }
    }

    /// Print listings and undo/redo results as JSON
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", MENU)?;
            let Some(line) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.out, "Invalid option.")?;
                continue;
            };
            debug!(?choice, "menu");
            match choice {
                MenuChoice::Add => self.add()?,
                MenuChoice::Delete => self.delete()?,
                MenuChoice::Modify => self.modify()?,
                MenuChoice::List => self.list()?,
                MenuChoice::Undo => self.undo()?,
                MenuChoice::Redo => self.redo()?,
                MenuChoice::MarkUrgent => self.mark_urgent()?,
                MenuChoice::ProcessUrgent => self.process_urgent()?,
                MenuChoice::Categories => self.categories()?,
                MenuChoice::UrgentQueue => self.urgent_queue()?,
                MenuChoice::Exit => return Ok(()),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Prompt helpers
    // -----------------------------------------------------------------------

    /// Print `label` and read one line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompt until `parse` accepts the answer. `None` at end of input.
    fn prompt_until<T>(
        &mut self,
        label: &str,
        retry: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(line) = self.prompt(label)? else {
                return Ok(None);
            };
            match parse(&line) {
                Some(value) => return Ok(Some(value)),
                None => writeln!(self.out, "{}", retry)?,
            }
        }
    }

    /// Prompt for an optional replacement; blank keeps the current value.
    fn prompt_optional(&mut self, label: &str) -> io::Result<Option<Option<String>>> {
        Ok(self
            .prompt(label)?
            .map(|s| if s.trim().is_empty() { None } else { Some(s) }))
    }

    /// Like `prompt`, but returns the answer trimmed, the way titles are stored.
    fn prompt_title(&mut self, label: &str) -> io::Result<Option<String>> {
        Ok(self.prompt(label)?.map(|s| s.trim().to_string()))
    }

    // -----------------------------------------------------------------------
    // Flows
    // -----------------------------------------------------------------------

    fn add(&mut self) -> io::Result<()> {
        let Some(title) = self.prompt_until("Title: ", "Title cannot be empty.", |s| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        })?
        else {
            return Ok(());
        };
        if self.session.find(&title).is_ok() {
            writeln!(self.out, "A task with this title already exists.")?;
            return Ok(());
        }
        let Some(description) = self.prompt("Description: ")? else {
            return Ok(());
        };
        let Some(priority) = self.prompt_until(
            "Priority (1-5): ",
            "Invalid priority. Enter a number from 1 to 5.",
            parse_priority,
        )?
        else {
            return Ok(());
        };
        let today = self.today;
        let Some(due_date) = self.prompt_until(
            "Due date (YYYY-MM-DD): ",
            "Invalid or past date. Try again.",
            |s| parse_due_date(s, today),
        )?
        else {
            return Ok(());
        };
        let Some(category) = self.prompt("Category: ")? else {
            return Ok(());
        };
        let Some(subcategory) = self.prompt("Subcategory: ")? else {
            return Ok(());
        };

        let task = Task::new(title, description, priority, due_date, category, subcategory);
        match self.session.add_task(task) {
            Ok(_) => writeln!(self.out, "Task added."),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(title) = self.prompt_title("Title of the task to delete: ")? else {
            return Ok(());
        };
        match self.session.remove_task(&title) {
            Ok(_) => writeln!(self.out, "Task deleted."),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn modify(&mut self) -> io::Result<()> {
        let Some(title) = self.prompt_title("Title of the task to modify: ")? else {
            return Ok(());
        };
        if let Err(e) = self.session.find(&title) {
            return writeln!(self.out, "{}", e);
        }
        writeln!(self.out, "Leave a field blank to keep it.")?;

        let Some(new_title) = self.prompt_optional("New title: ")? else {
            return Ok(());
        };
        let Some(description) = self.prompt_optional("New description: ")? else {
            return Ok(());
        };
        // an unparseable priority or date keeps the old value
        let Some(priority) = self.prompt("New priority (1-5): ")? else {
            return Ok(());
        };
        let Some(due_date) = self.prompt("New due date (YYYY-MM-DD): ")? else {
            return Ok(());
        };
        let Some(category) = self.prompt_optional("New category: ")? else {
            return Ok(());
        };
        let Some(subcategory) = self.prompt_optional("New subcategory: ")? else {
            return Ok(());
        };

        let edit = TaskEdit {
            title: new_title.map(|s| s.trim().to_string()),
            description,
            priority: parse_priority(&priority),
            due_date: parse_due_date(&due_date, self.today),
            category,
            subcategory,
        };
        if edit.is_empty() {
            return writeln!(self.out, "Nothing to change.");
        }
        match self.session.modify_task(&title, &edit) {
            Ok(_) => writeln!(self.out, "Task modified."),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn list(&mut self) -> io::Result<()> {
        let tasks = self.session.sorted_tasks();
        if self.json {
            return write_json(&mut self.out, &tasks_to_json(&tasks));
        }
        if tasks.is_empty() {
            return writeln!(self.out, "No tasks to show.");
        }
        for line in task_table(&tasks, self.session.date_format()) {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn report(&mut self, verb: &str, report: &ActionReport) -> io::Result<()> {
        if self.json {
            return write_json(&mut self.out, report);
        }
        writeln!(self.out, "{}: {} - {}", verb, report.kind, report.title)
    }

    fn undo(&mut self) -> io::Result<()> {
        match self.session.undo() {
            Ok(report) => self.report("Undone", &report),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn redo(&mut self) -> io::Result<()> {
        match self.session.redo() {
            Ok(report) => self.report("Redone", &report),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn mark_urgent(&mut self) -> io::Result<()> {
        let Some(title) = self.prompt_title("Title of the urgent task: ")? else {
            return Ok(());
        };
        match self.session.mark_urgent(&title) {
            Ok(_) => writeln!(self.out, "Task queued as urgent."),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn process_urgent(&mut self) -> io::Result<()> {
        let line = match self.session.process_urgent() {
            Ok((_, task)) => format!("Processed urgent task: {}", task),
            Err(e) => e.to_string(),
        };
        writeln!(self.out, "{}", line)
    }

    fn categories(&mut self) -> io::Result<()> {
        if self.json {
            let store = self.session.store();
            let rows = category_to_json(self.session.categories().render(), |id| {
                (store.get(id).map(|t| t.title.as_str()), store.is_live(id))
            });
            return write_json(&mut self.out, &rows);
        }
        let lines: Vec<String> = self.session.category_lines().collect();
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn urgent_queue(&mut self) -> io::Result<()> {
        let pending = self.session.urgent_pending();
        if self.json {
            return write_json(&mut self.out, &tasks_to_json(&pending));
        }
        if pending.is_empty() {
            return writeln!(self.out, "No urgent tasks queued.");
        }
        let lines: Vec<String> = pending
            .iter()
            .enumerate()
            .map(|(i, (_, task))| format!("{}. {}", i + 1, task.summary(self.session.date_format())))
            .collect();
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}
