//! End-to-end tests driving the compiled binary over stdin/stdout, the way
//! a human would at the `db > ` prompt. Grounded on the subprocess-script
//! harness pattern used to exercise page-splitting behavior end-to-end.
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

struct Database {
    path: PathBuf,
}

impl Database {
    fn new() -> Database {
        let filename = format!("{}.db", uuid::Uuid::new_v4());
        Database {
            path: std::env::temp_dir().join(filename),
        }
    }

    fn run_script<T: AsRef<str>>(&self, commands: Vec<T>) -> Vec<String> {
        let mut process = Command::new(env!("CARGO_BIN_EXE_tinytable"))
            .arg(&self.path)
            .arg("--no-history")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("failed to spawn tinytable");

        let mut input = String::new();
        for command in commands {
            input.push_str(command.as_ref());
            input.push('\n');
        }
        process
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();

        let mut output = String::new();
        process
            .stdout
            .take()
            .unwrap()
            .read_to_string(&mut output)
            .unwrap();
        process.wait().unwrap();
        output.lines().map(|l| l.to_string()).collect()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[test]
fn inserts_and_selects_a_row() {
    let db = Database::new();
    let output = db.run_script(vec![
        "insert 1 user1 person1@example.com",
        "select",
        ".exit",
    ]);
    assert_eq!(
        output,
        vec![
            "db > Executed.",
            "db > (1, user1, person1@example.com)",
            "Executed.",
            "db > ",
        ]
    );
}

#[test]
fn rejects_a_duplicate_key() {
    let db = Database::new();
    let output = db.run_script(vec![
        "insert 1 user1 person1@example.com",
        "insert 1 user1 person1@example.com",
        ".exit",
    ]);
    assert_eq!(
        output,
        vec![
            "db > Executed.",
            "db > Error: Duplicate key.",
            "db > ",
        ]
    );
}

#[test]
fn rejects_a_negative_id() {
    let db = Database::new();
    let output = db.run_script(vec!["insert -1 user1 person1@example.com", ".exit"]);
    assert_eq!(output, vec!["db > ID must be positive.", "db > "]);
}

#[test]
fn rejects_a_username_over_the_column_width() {
    let db = Database::new();
    let long_username = "a".repeat(33);
    let output = db.run_script(vec![
        &format!("insert 1 {} person1@example.com", long_username),
        ".exit",
    ]);
    assert_eq!(output, vec!["db > String is too long.", "db > "]);
}

#[test]
fn keeps_data_after_closing_and_reopening_the_file() {
    let db = Database::new();
    db.run_script(vec!["insert 1 user1 person1@example.com", ".exit"]);
    let output = db.run_script(vec!["select", ".exit"]);
    assert_eq!(
        output,
        vec![
            "db > (1, user1, person1@example.com)",
            "Executed.",
            "db > ",
        ]
    );
}

#[test]
fn prints_constants() {
    let db = Database::new();
    let output = db.run_script(vec![".constants", ".exit"]);
    assert_eq!(
        output,
        vec![
            "db > Constants:",
            "ROW_SIZE: 293",
            "COMMON_NODE_HEADER_SIZE: 6",
            "LEAF_NODE_HEADER_SIZE: 14",
            "LEAF_NODE_CELL_SIZE: 297",
            "LEAF_NODE_SPACE_FOR_CELLS: 4082",
            "LEAF_NODE_MAX_CELLS: 13",
            "db > ",
        ]
    );
}

#[test]
fn prints_a_single_leaf_tree() {
    let db = Database::new();
    let output = db.run_script(vec![
        "insert 3 user3 person3@example.com",
        "insert 1 user1 person1@example.com",
        "insert 2 user2 person2@example.com",
        ".btree",
        ".exit",
    ]);
    assert_eq!(
        output,
        vec![
            "db > Executed.",
            "db > Executed.",
            "db > Executed.",
            "db > Tree:",
            "- leaf (size 3)",
            "   - 1",
            "   - 2",
            "   - 3",
            "db > ",
        ]
    );
}

#[test]
fn splits_the_root_after_fourteen_inserts() {
    let db = Database::new();
    let mut input: Vec<String> = (1..=14)
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    input.push(".btree".to_string());
    input.push(".exit".to_string());
    let output = db.run_script(input);

    assert_eq!(
        &output[14..],
        &vec![
            "db > Tree:",
            "- internal (size 1)",
            "   - leaf (size 7)",
            "      - 1",
            "      - 2",
            "      - 3",
            "      - 4",
            "      - 5",
            "      - 6",
            "      - 7",
            "   - key 7",
            "   - leaf (size 7)",
            "      - 8",
            "      - 9",
            "      - 10",
            "      - 11",
            "      - 12",
            "      - 13",
            "      - 14",
            "db > ",
        ]
    );
}

#[test]
fn scans_every_row_across_a_multi_level_tree_in_key_order() {
    let db = Database::new();
    let mut input: Vec<String> = (1..=30)
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    input.push("select".to_string());
    input.push(".exit".to_string());
    let output = db.run_script(input);

    let mut expected: Vec<String> = vec!["db > Executed.".to_string(); 1];
    for _ in 1..30 {
        expected.push("db > Executed.".to_string());
    }
    expected.push("db > (1, user1, person1@example.com)".to_string());
    for i in 2..=30 {
        expected.push(format!("({i}, user{i}, person{i}@example.com)"));
    }
    expected.push("Executed.".to_string());
    expected.push("db > ".to_string());
    assert_eq!(output, expected);
}

#[test]
fn reports_an_unrecognized_command() {
    let db = Database::new();
    let output = db.run_script(vec!["delete 1", ".exit"]);
    assert_eq!(output, vec!["db > Unrecognized keyword at start of 'delete 1'.", "db > "]);
}

#[test]
fn reports_an_unrecognized_meta_command() {
    let db = Database::new();
    let output = db.run_script(vec![".frobnicate", ".exit"]);
    assert_eq!(output, vec!["db > Unrecognized command '.frobnicate'.", "db > "]);
}
