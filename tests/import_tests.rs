use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

use quizbank::import::{apply_import, parse_categories, ImportReport};
use quizbank::model::Database;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn seed_database(path: &Path) {
    let doc = json!({
        "quizCategories": [
            { "id": "a", "name": "Alpha", "questions": [ { "q": "old" } ] },
            { "id": "b", "name": "Beta", "questions": [] }
        ],
        "topics": [ { "id": "a" }, { "id": "b" } ],
        "version": "1.0.0",
        "lastUpdated": "2024-01-01",
        "settings": { "shuffle": true }
    });
    fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

#[test]
fn report_counts_match_question_lists() {
    let raw = r#"[
        { "id": "a", "name": "Alpha", "questions": [ {"q":1}, {"q":2} ] },
        { "id": "b", "name": "Beta" },
        { "id": "c", "name": "Gamma", "questions": [ {"q":3} ] }
    ]"#;
    let categories = parse_categories(raw).unwrap();
    let report = ImportReport::new(&categories);

    assert_eq!(
        report.counts,
        vec![
            ("a".to_string(), 2),
            ("b".to_string(), 0),
            ("c".to_string(), 1)
        ]
    );
    assert_eq!(report.total, 3);
}

#[test]
fn import_replaces_categories_wholesale() {
    let dir = temp_dir("quizbank-import-wholesale");
    let db_path = dir.join("db.json");
    seed_database(&db_path);

    // export with a and c, but no b — broken separators included
    let raw = "[\n{ \"id\": \"a\", \"name\": \"Alpha\", \"questions\": [ {\"q\": \"new\"} ] }\n{ \"id\": \"c\", \"name\": \"Gamma\", \"questions\": [] }\n]";
    let categories = parse_categories(raw).unwrap();

    let mut db = Database::load(&db_path).unwrap();
    apply_import(&mut db, categories, "2.2.0", "2025-01-19");
    db.save(&db_path).unwrap();

    let reread = Database::load(&db_path).unwrap();
    let ids: Vec<&str> = reread.quiz_categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(reread.quiz_categories[0].questions[0]["q"], "new");
    assert_eq!(reread.version, "2.2.0");
    assert_eq!(reread.last_updated, "2025-01-19");
}

#[test]
fn unknown_document_fields_survive_import() {
    let dir = temp_dir("quizbank-import-extra-fields");
    let db_path = dir.join("db.json");
    seed_database(&db_path);

    let categories = parse_categories(r#"[{ "id": "a", "questions": [] }]"#).unwrap();
    let mut db = Database::load(&db_path).unwrap();
    apply_import(&mut db, categories, "2.2.0", "2025-01-19");
    db.save(&db_path).unwrap();

    let reread = Database::load(&db_path).unwrap();
    assert_eq!(reread.extra["settings"]["shuffle"], true);
    // topics are not the import's business
    assert_eq!(reread.topics.len(), 2);
}

#[test]
fn failed_parse_leaves_target_file_byte_identical() {
    let dir = temp_dir("quizbank-import-abort");
    let db_path = dir.join("db.json");
    seed_database(&db_path);
    let before = fs::read(&db_path).unwrap();

    // the whole pipeline: the write only happens after a successful parse
    let result = parse_categories("definitely {{{ not repairable");
    assert!(result.is_err());

    let after = fs::read(&db_path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn output_keeps_non_ascii_literal_and_two_space_indent() {
    let dir = temp_dir("quizbank-import-encoding");
    let db_path = dir.join("db.json");
    seed_database(&db_path);

    let categories =
        parse_categories(r#"[{ "id": "adab-tidur", "name": "Adab Tidur آداب", "questions": [] }]"#)
            .unwrap();
    let mut db = Database::load(&db_path).unwrap();
    apply_import(&mut db, categories, "2.2.0", "2025-01-19");
    db.save(&db_path).unwrap();

    let text = fs::read_to_string(&db_path).unwrap();
    assert!(text.contains("آداب"), "non-ASCII must not be escaped");
    assert!(text.contains("\n  \"quizCategories\""), "two-space indent");
}
