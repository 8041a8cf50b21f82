//! The public storage facade: an open pager plus the page number of its
//! root. Everything the REPL needs (insert, full scan, tree dump) goes
//! through here so callers never touch `Pager`/`btree` directly.
use super::btree::leaf_node_insert;
use super::cursor::{advance, find, table_start, value};
use super::node::NodeKind;
use super::pager::Pager;
use super::row::{Row, COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};
use super::storage_backend::{FileStorage, Storage};
use crate::errors::{ExecuteError, FatalError};
use std::path::Path;
use tracing::info;

pub struct Table<S: Storage> {
    pager: Pager<S>,
    root_page_num: u32,
}

impl Table<FileStorage> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Table<FileStorage>, FatalError> {
        let storage = FileStorage::open(path)?;
        Table::from_storage(storage)
    }
}

impl<S: Storage> Table<S> {
    pub fn from_storage(storage: S) -> Result<Table<S>, FatalError> {
        let mut pager = Pager::open(storage)?;
        if pager.num_pages() == 0 {
            let root = pager.get_page(0)?;
            let mut root = root.lock().expect("page mutex poisoned");
            root.init_leaf();
            root.set_is_root(true);
        }
        info!("table opened");
        Ok(Table {
            pager,
            root_page_num: 0,
        })
    }

    pub fn close(self) -> Result<(), FatalError> {
        self.pager.close()
    }

    /// Validates column widths, then inserts. The outer `Result` is fatal
    /// (I/O or tree corruption); the inner one is a recoverable executor
    /// error the REPL prints and continues past.
    pub fn insert(&mut self, row: Row) -> Result<Result<(), ExecuteError>, FatalError> {
        debug_assert!(row.username_str().len() <= COLUMN_USERNAME_SIZE);
        debug_assert!(row.email_str().len() <= COLUMN_EMAIL_SIZE);

        let key_to_insert = row.id;
        let cursor = find(&mut self.pager, self.root_page_num, key_to_insert)?;

        let leaf = self.pager.get_page(cursor.page_num)?;
        let num_cells = leaf.lock().expect("page mutex poisoned").leaf_num_cells();
        if cursor.cell_num < num_cells {
            let key_at_index = leaf
                .lock()
                .expect("page mutex poisoned")
                .leaf_key(cursor.cell_num);
            if key_at_index == key_to_insert {
                return Ok(Err(ExecuteError::DuplicateKey));
            }
        }

        leaf_node_insert(&mut self.pager, &cursor, key_to_insert, &row)?;
        Ok(Ok(()))
    }

    /// Full ascending scan via the leaf chain.
    pub fn select(&mut self) -> Result<Vec<Row>, FatalError> {
        let mut rows = Vec::new();
        let mut cursor = table_start(&mut self.pager, self.root_page_num)?;
        while !cursor.end_of_table {
            rows.push(value(&mut self.pager, &cursor)?);
            advance(&mut self.pager, &mut cursor)?;
        }
        Ok(rows)
    }

    /// Renders the tree the way the historical `print_tree` does: 3 spaces
    /// of indent per level, leaves and internal nodes labelled with their
    /// size, internal keys interleaved with their children.
    pub fn print_tree(&mut self) -> Result<String, FatalError> {
        let mut out = String::new();
        self.print_tree_at(self.root_page_num, 0, &mut out)?;
        Ok(out)
    }

    fn print_tree_at(
        &mut self,
        page_num: u32,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FatalError> {
        let node = self.pager.get_page(page_num)?;
        let kind = node.lock().expect("page mutex poisoned").kind();

        match kind {
            NodeKind::Leaf => {
                let num_cells = node.lock().expect("page mutex poisoned").leaf_num_cells();
                out.push_str(&"   ".repeat(depth));
                out.push_str(&format!("- leaf (size {})\n", num_cells));
                for i in 0..num_cells {
                    let key = node.lock().expect("page mutex poisoned").leaf_key(i);
                    out.push_str(&"   ".repeat(depth + 1));
                    out.push_str(&format!("- {}\n", key));
                }
            }
            NodeKind::Internal => {
                let num_keys = node.lock().expect("page mutex poisoned").internal_num_keys();
                out.push_str(&"   ".repeat(depth));
                out.push_str(&format!("- internal (size {})\n", num_keys));
                for i in 0..num_keys {
                    let child = node
                        .lock()
                        .expect("page mutex poisoned")
                        .internal_child_raw(i);
                    self.print_tree_at(child, depth + 1, out)?;
                    let key = node.lock().expect("page mutex poisoned").internal_key(i);
                    out.push_str(&"   ".repeat(depth + 1));
                    out.push_str(&format!("- key {}\n", key));
                }
                let right_child = node
                    .lock()
                    .expect("page mutex poisoned")
                    .internal_right_child_raw();
                self.print_tree_at(right_child, depth + 1, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::storage_backend::InMemoryStorage;

    fn open_test_table() -> Table<InMemoryStorage> {
        Table::from_storage(InMemoryStorage::new()).unwrap()
    }

    #[test]
    fn inserts_and_selects_back_in_key_order() {
        let mut table = open_test_table();
        for id in [5, 1, 3, 2, 4] {
            table
                .insert(Row::new(id, "user", "user@example.com"))
                .unwrap()
                .unwrap();
        }
        let rows = table.select().unwrap();
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let mut table = open_test_table();
        table.insert(Row::new(1, "a", "a@example.com")).unwrap().unwrap();
        let result = table.insert(Row::new(1, "b", "b@example.com")).unwrap();
        assert_eq!(result, Err(ExecuteError::DuplicateKey));
    }

    #[test]
    fn survives_enough_inserts_to_split_the_root() {
        let mut table = open_test_table();
        for id in 0..200u32 {
            table
                .insert(Row::new(id, "user", "user@example.com"))
                .unwrap()
                .unwrap();
        }
        let rows = table.select().unwrap();
        assert_eq!(rows.len(), 200);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.id, i as u32);
        }
    }

    #[test]
    fn reopening_an_empty_store_initializes_a_root_leaf() {
        let storage = InMemoryStorage::new();
        let table = Table::from_storage(storage).unwrap();
        drop(table);
    }
}
