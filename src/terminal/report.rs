//! Plain text reports
//!
//! This module renders visit listings and the student list as aligned text
//! tables for the administrator.

use chrono::TimeZone;
use std::fmt::{self, Write};

use crate::ledger::{VisitRow, IN_PROGRESS_LABEL};
use crate::student::Student;

/// Date column format (dd/mm/yyyy)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Time column format (HH:MM)
pub const TIME_FORMAT: &str = "%H:%M";

/// Render visits as a table, with times shown in `tz`
pub fn render_visit_table<Tz>(rows: &[VisitRow], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let headers = ["Aluno", "Turma", "Banheiro", "Data", "Entrada", "Saída", "Duração"];

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let entry = row.visit.entry_time.with_timezone(tz);
            let exit = match row.visit.exit_time {
                Some(exit) => exit.with_timezone(tz).format(TIME_FORMAT).to_string(),
                None => IN_PROGRESS_LABEL.to_string(),
            };

            vec![
                row.student_name.clone().unwrap_or_else(|| "-".to_string()),
                row.student_class.clone().unwrap_or_else(|| "-".to_string()),
                row.visit.zone.display_label().to_string(),
                entry.format(DATE_FORMAT).to_string(),
                entry.format(TIME_FORMAT).to_string(),
                exit,
                row.visit.duration.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    render_table(&headers, &cells)
}

/// Render the student list as a table, credentials included
pub fn render_student_table(students: &[Student]) -> String {
    let headers = ["Nome", "Turma", "Matrícula", "Nº", "Senha", "Código QR"];

    let cells: Vec<Vec<String>> = students
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.class_label.clone(),
                s.enrollment_number.clone(),
                s.roll_number.clone().unwrap_or_default(),
                s.passcode.clone(),
                s.scan_code.clone(),
            ]
        })
        .collect();

    render_table(&headers, &cells)
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header_cells, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);

    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}
