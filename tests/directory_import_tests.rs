//! Tests for student registration and roster import
//!
//! These tests cover credential generation, enrollment uniqueness and the
//! all-or-nothing behavior of bulk imports, including roster files on disk.

use restroom_access::student::sample_import_roster;
use restroom_access::*;
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn terminal() -> AccessTerminal<MemoryStore> {
    AccessTerminal::new(TerminalConfig { seed: Some(77), ..Default::default() }, MemoryStore::new())
}

#[test]
fn test_duplicate_enrollment_is_rejected() {
    let terminal = terminal();
    terminal.register_student(NewStudent::new("Ana", "8A", "900")).unwrap();

    let err = terminal.register_student(NewStudent::new("Ana Clara", "8B", "900")).unwrap_err();
    assert!(matches!(err, AccessError::DuplicateEnrollment(_)));
    assert_eq!(err.user_message(), "Já existe um aluno com esta matrícula");
    assert_eq!(terminal.students().unwrap().len(), 1);
}

#[test]
fn test_missing_fields_are_rejected() {
    let terminal = terminal();
    let cases = [
        (NewStudent::new("", "8A", "900"), "name"),
        (NewStudent::new("Ana", "", "900"), "class_label"),
        (NewStudent::new("Ana", "8A", "  "), "enrollment_number"),
    ];

    for (request, field) in cases {
        match terminal.register_student(request) {
            Err(AccessError::MissingField(missing)) => assert_eq!(missing, field),
            other => panic!("expected missing {}, got {:?}", field, other),
        }
    }
    assert!(terminal.students().unwrap().is_empty());
}

#[test]
fn test_generated_credentials_are_well_formed_and_unique() {
    let terminal = terminal();
    for n in 0..50 {
        terminal
            .register_student(NewStudent::new(format!("Aluno {:02}", n), "6A", format!("{}", 5000 + n)))
            .unwrap();
    }

    let students = terminal.students().unwrap();
    let passcodes: HashSet<&str> = students.iter().map(|s| s.passcode.as_str()).collect();
    let scan_codes: HashSet<&str> = students.iter().map(|s| s.scan_code.as_str()).collect();
    assert_eq!(passcodes.len(), 50);
    assert_eq!(scan_codes.len(), 50);

    for student in &students {
        assert!((4..=6).contains(&student.passcode.len()));
        assert!(student.passcode.chars().all(|c| c.is_ascii_digit()));
        assert!(student.scan_code.starts_with("QR-"));
    }
}

#[test]
fn test_students_are_listed_by_name() {
    let terminal = terminal();
    terminal.import_roster(sample_import_roster().into_rows()).unwrap();
    terminal.register_student(NewStudent::new("Aaron", "8B", "1")).unwrap();

    let names: Vec<String> = terminal.students().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec!["Aaron", "Ana Beatriz", "Bruno Costa", "Carla Dias", "Daniel Esteves", "Eduarda Freitas"]
    );
}

#[test]
fn test_import_reports_counts_and_keeps_roll_numbers() {
    let terminal = terminal();
    let summary = terminal.import_roster(sample_import_roster().into_rows()).unwrap();
    assert_eq!(summary, ImportSummary { imported: 5, total: 5 });

    let carla = terminal
        .students()
        .unwrap()
        .into_iter()
        .find(|s| s.enrollment_number == "2023012")
        .unwrap();
    assert_eq!(carla.roll_number.as_deref(), Some("03"));
}

#[test]
fn test_import_is_all_or_nothing() {
    let terminal = terminal();
    terminal.register_student(NewStudent::new("Existing", "8B", "2023013")).unwrap();

    let err = terminal.import_roster(sample_import_roster().into_rows()).unwrap_err();
    assert!(matches!(err, AccessError::DuplicateEnrollment(ref e) if e == "2023013"));
    assert_eq!(terminal.students().unwrap().len(), 1);

    let mut rows = vec![NewStudent::new("Fabio", "8B", "3000")];
    rows.push(NewStudent::new("", "8B", "3001"));
    assert!(matches!(terminal.import_roster(rows), Err(AccessError::MissingField("name"))));
    assert_eq!(terminal.students().unwrap().len(), 1);
}

#[test]
fn test_import_from_roster_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("turma.json");
    fs::write(
        &path,
        r#"[
            {"name": "Gabi", "class_label": "7A", "enrollment_number": "700", "roll_number": "01"},
            {"name": "Hugo", "class_label": "7A", "enrollment_number": "701"}
        ]"#,
    )
    .unwrap();

    let terminal = terminal();
    let summary = terminal.import_roster_file(&path).unwrap();
    assert_eq!(summary.imported, 2);

    let hugo = terminal.check_in(
        &terminal.students().unwrap()[1].passcode,
        Zone::Male,
    );
    assert_eq!(hugo.unwrap().student.name, "Hugo");
}

#[test]
fn test_roster_file_errors() {
    let dir = TempDir::new().unwrap();
    let terminal = terminal();

    let missing = terminal.import_roster_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, AccessError::Roster(RosterError::FileNotFound(_))));

    let sheet = dir.path().join("turma.xlsx");
    fs::write(&sheet, b"PK").unwrap();
    let unsupported = terminal.import_roster_file(&sheet).unwrap_err();
    assert!(matches!(unsupported, AccessError::Roster(RosterError::UnsupportedFormat(_))));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "[{\"name\": ").unwrap();
    let parse = terminal.import_roster_file(&broken).unwrap_err();
    assert!(matches!(parse, AccessError::Roster(RosterError::JsonError(_))));
    assert_eq!(parse.kind(), "roster");
}
