//! Append-only history file in the user's home directory. Every line the
//! REPL executes (statements and meta-commands alike) is appended after
//! it runs; there is no line editor, so there is nothing to recall into.
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

const HISTORY_FILENAME: &str = ".tinytable_history";

pub fn history_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILENAME))
}

pub fn append_history(line: &str, path: &PathBuf) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", line.trim())?;
    writer.flush()
}

pub fn load_history(path: &PathBuf) -> Vec<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return Vec::new(),
    };
    let reader = BufReader::new(file);
    reader
        .lines()
        .filter_map(|line| {
            line.ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn appends_and_loads_lines_in_order() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        append_history("insert 1 alice alice@example.com", &path).unwrap();
        append_history(".btree", &path).unwrap();

        let history = load_history(&path);
        assert_eq!(history, vec!["insert 1 alice alice@example.com", ".btree"]);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let path = PathBuf::from("/nonexistent/path/history_that_does_not_exist");
        assert!(load_history(&path).is_empty());
    }
}
