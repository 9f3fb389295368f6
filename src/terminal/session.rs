//! JSON-lines session protocol
//!
//! This module drives an [`AccessTerminal`] from a stream of commands, one
//! JSON object per line, writing one JSON response line per command. Blank
//! lines and lines starting with `#` are skipped.

use chrono::{FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::ledger::{DateRange, VisitFilter, VisitRow};
use crate::store::Store;
use crate::student::NewStudent;
use crate::terminal::{render_student_table, render_visit_table, AccessTerminal};
use crate::types::{AccessError, StudentId, Zone};

/// A command accepted by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Verify and register an entry
    CheckIn {
        /// Scan code or passcode
        credential: String,
        /// Zone of the terminal
        zone: Zone,
    },
    /// Verify and register an exit
    CheckOut {
        /// Scan code or passcode
        credential: String,
        /// Zone of the terminal
        zone: Zone,
    },
    /// Verify only
    Verify {
        /// Scan code or passcode
        credential: String,
        /// Zone of the terminal
        zone: Zone,
    },
    /// Register a student
    Register {
        /// Full name
        name: String,
        /// Class label
        class_label: String,
        /// Enrollment number
        enrollment_number: String,
        /// Optional call-list number
        #[serde(default)]
        roll_number: Option<String>,
    },
    /// Bulk import from a roster file or inline rows
    Import {
        /// JSON roster file; takes precedence over `rows`
        #[serde(default)]
        path: Option<String>,
        /// Inline roster rows
        #[serde(default)]
        rows: Vec<NewStudent>,
    },
    /// List students
    Students {
        /// Include a rendered text table
        #[serde(default)]
        table: bool,
    },
    /// List visits
    Visits {
        /// Only this zone
        #[serde(default)]
        zone: Option<Zone>,
        /// Only this student
        #[serde(default)]
        student_id: Option<StudentId>,
        /// Only classes containing this text
        #[serde(default)]
        class_contains: Option<String>,
        /// Only entries on this calendar day
        #[serde(default)]
        date: Option<NaiveDate>,
        /// Only visits in progress
        #[serde(default)]
        open_only: bool,
        /// Include a rendered text table
        #[serde(default)]
        table: bool,
    },
    /// Visit counts
    Summary,
}

impl Command {
    /// Wire name of the command
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::CheckIn { .. } => "check_in",
            Command::CheckOut { .. } => "check_out",
            Command::Verify { .. } => "verify",
            Command::Register { .. } => "register",
            Command::Import { .. } => "import",
            Command::Students { .. } => "students",
            Command::Visits { .. } => "visits",
            Command::Summary => "summary",
        }
    }
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Commands processed, malformed lines included
    pub commands: usize,
    /// Commands answered with `"ok": false`
    pub failures: usize,
}

/// Executes commands against one terminal
#[derive(Debug)]
pub struct Session<'a, S: Store> {
    terminal: &'a AccessTerminal<S>,
    time_zone: Option<FixedOffset>,
}

impl<'a, S: Store> Session<'a, S> {
    /// Session reporting dates in the machine's local time zone
    pub fn new(terminal: &'a AccessTerminal<S>) -> Self {
        Self { terminal, time_zone: None }
    }

    /// Session reporting dates at a fixed UTC offset
    pub fn with_time_zone(terminal: &'a AccessTerminal<S>, time_zone: FixedOffset) -> Self {
        Self { terminal, time_zone: Some(time_zone) }
    }

    /// Handle one input line; `None` for blank lines and comments
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let response = match serde_json::from_str::<Command>(line) {
            Ok(command) => self.execute(command),
            Err(err) => {
                crate::kiosk_event!(warn, "Malformed session command", error = err.to_string().as_str());
                json!({
                    "ok": false,
                    "op": Value::Null,
                    "error": {
                        "kind": "malformed_command",
                        "message": "Comando inválido",
                        "detail": err.to_string(),
                    }
                })
            }
        };
        Some(response)
    }

    /// Execute a parsed command and build its response
    pub fn execute(&self, command: Command) -> Value {
        let op = command.op_name();
        crate::kiosk_event!(debug, "Session command", op = op);

        match self.dispatch(command) {
            Ok(mut body) => {
                if let Value::Object(map) = &mut body {
                    map.insert("ok".to_string(), Value::Bool(true));
                    map.insert("op".to_string(), Value::String(op.to_string()));
                }
                body
            }
            Err(err) => {
                crate::kiosk_event!(info, "Session command failed", op = op, kind = err.kind());
                error_response(op, &err)
            }
        }
    }

    fn dispatch(&self, command: Command) -> Result<Value, AccessError> {
        let terminal = self.terminal;

        match command {
            Command::CheckIn { credential, zone } => {
                let outcome = terminal.check_in(&credential, zone)?;
                Ok(json!({
                    "message": format!("Bem-vindo(a), {}!", outcome.student.name),
                    "student": outcome.student,
                    "visit": outcome.visit,
                }))
            }
            Command::CheckOut { credential, zone } => {
                let outcome = terminal.check_out(&credential, zone)?;
                Ok(json!({
                    "message": format!("Até mais, {}!", outcome.student.name),
                    "student": outcome.student,
                    "visit": outcome.visit,
                }))
            }
            Command::Verify { credential, zone } => {
                let student = terminal.verify(&credential, zone)?;
                Ok(json!({ "student": student }))
            }
            Command::Register { name, class_label, enrollment_number, roll_number } => {
                let request = NewStudent { name, class_label, enrollment_number, roll_number };
                let student = terminal.register_student(request)?;
                Ok(json!({ "student": student }))
            }
            Command::Import { path, rows } => {
                let summary = match path {
                    Some(path) => terminal.import_roster_file(path)?,
                    None => terminal.import_roster(rows)?,
                };
                Ok(json!({ "imported": summary.imported, "total": summary.total }))
            }
            Command::Students { table } => {
                let students = terminal.students()?;
                let mut body = json!({ "students": students });
                if table {
                    body["table"] = Value::String(render_student_table(&students));
                }
                Ok(body)
            }
            Command::Visits { zone, student_id, class_contains, date, open_only, table } => {
                let filter = VisitFilter {
                    zone,
                    student_id,
                    class_contains: class_contains.filter(|text| !text.is_empty()),
                    date_range: date.map(|d| self.day_range(d)),
                    open_only,
                };
                let rows = terminal.visits(&filter)?;
                let mut body = json!({ "visits": rows });
                if table {
                    body["table"] = Value::String(self.render_visits(&rows));
                }
                Ok(body)
            }
            Command::Summary => {
                let summary = terminal.summary()?;
                Ok(json!({ "summary": summary }))
            }
        }
    }

    fn day_range(&self, date: NaiveDate) -> DateRange {
        match &self.time_zone {
            Some(tz) => DateRange::for_day(date, tz),
            None => DateRange::for_local_day(date),
        }
    }

    fn render_visits(&self, rows: &[VisitRow]) -> String {
        match &self.time_zone {
            Some(tz) => render_visit_table(rows, tz),
            None => render_visit_table(rows, &Local),
        }
    }

    /// Run every line of `reader`, writing responses to `writer`
    pub fn run<R: BufRead, W: Write>(&self, reader: R, writer: &mut W) -> io::Result<SessionStats> {
        let mut stats = SessionStats::default();

        for line in reader.lines() {
            let line = line?;
            let Some(response) = self.handle_line(&line) else {
                continue;
            };

            stats.commands += 1;
            if response["ok"] != Value::Bool(true) {
                stats.failures += 1;
            }

            serde_json::to_writer(&mut *writer, &response)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        crate::kiosk_event!(
            info,
            "Session finished",
            commands = stats.commands,
            failures = stats.failures
        );
        Ok(stats)
    }
}

/// Run a session in the machine's local time zone
pub fn run_session<S, R, W>(terminal: &AccessTerminal<S>, reader: R, writer: &mut W) -> io::Result<SessionStats>
where
    S: Store,
    R: BufRead,
    W: Write,
{
    Session::new(terminal).run(reader, writer)
}

fn error_response(op: &str, err: &AccessError) -> Value {
    json!({
        "ok": false,
        "op": op,
        "error": {
            "kind": err.kind(),
            "message": err.user_message(),
            "detail": err.to_string(),
        }
    })
}
