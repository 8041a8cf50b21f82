//! A (page, cell) position: the result of a lookup, the insertion point for
//! a new key, and the mechanism for a full ascending scan via the leaf chain.
use super::node::NodeKind;
use super::pager::Pager;
use super::row::Row;
use super::storage_backend::Storage;
use crate::errors::FatalError;

pub struct Cursor {
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

/// Binary search within a leaf for the first cell with `key >= target`.
fn leaf_find<S: Storage>(
    pager: &mut Pager<S>,
    page_num: u32,
    key: u32,
) -> Result<Cursor, FatalError> {
    let node = pager.get_page(page_num)?;
    let node = node.lock().expect("page mutex poisoned");
    let num_cells = node.leaf_num_cells();

    let mut min = 0u32;
    let mut max = num_cells;
    while min != max {
        let index = (min + max) / 2;
        let key_at_index = node.leaf_key(index);
        if key == key_at_index {
            return Ok(Cursor {
                page_num,
                cell_num: index,
                end_of_table: false,
            });
        }
        if key < key_at_index {
            max = index;
        } else {
            min = index + 1;
        }
    }

    Ok(Cursor {
        page_num,
        cell_num: min,
        end_of_table: false,
    })
}

fn internal_find<S: Storage>(
    pager: &mut Pager<S>,
    page_num: u32,
    key: u32,
) -> Result<Cursor, FatalError> {
    let node = pager.get_page(page_num)?;
    let child_num = {
        let node = node.lock().expect("page mutex poisoned");
        let child_index = node.internal_find_child(key);
        node.internal_child(child_index)?
    };
    let child = pager.get_page(child_num)?;
    let kind = child.lock().expect("page mutex poisoned").kind();
    match kind {
        NodeKind::Internal => internal_find(pager, child_num, key),
        NodeKind::Leaf => leaf_find(pager, child_num, key),
    }
}

/// Finds the cursor position for `key`: an exact hit, or the insertion
/// point if absent. Descends from `root_page_num`.
pub fn find<S: Storage>(
    pager: &mut Pager<S>,
    root_page_num: u32,
    key: u32,
) -> Result<Cursor, FatalError> {
    let root = pager.get_page(root_page_num)?;
    let kind = root.lock().expect("page mutex poisoned").kind();
    match kind {
        NodeKind::Leaf => leaf_find(pager, root_page_num, key),
        NodeKind::Internal => internal_find(pager, root_page_num, key),
    }
}

pub fn table_start<S: Storage>(
    pager: &mut Pager<S>,
    root_page_num: u32,
) -> Result<Cursor, FatalError> {
    let mut cursor = find(pager, root_page_num, 0)?;
    let node = pager.get_page(cursor.page_num)?;
    let num_cells = node.lock().expect("page mutex poisoned").leaf_num_cells();
    cursor.end_of_table = num_cells == 0;
    Ok(cursor)
}

pub fn value<S: Storage>(pager: &mut Pager<S>, cursor: &Cursor) -> Result<Row, FatalError> {
    let node = pager.get_page(cursor.page_num)?;
    let node = node.lock().expect("page mutex poisoned");
    Ok(node.leaf_value(cursor.cell_num))
}

pub fn advance<S: Storage>(pager: &mut Pager<S>, cursor: &mut Cursor) -> Result<(), FatalError> {
    let node = pager.get_page(cursor.page_num)?;
    let (num_cells, next_leaf) = {
        let node = node.lock().expect("page mutex poisoned");
        (node.leaf_num_cells(), node.leaf_next_leaf())
    };
    cursor.cell_num += 1;

    if cursor.cell_num >= num_cells {
        if next_leaf == 0 {
            // Sentinel: page 0 is the root and is never another leaf's
            // successor, so `next_leaf == 0` unambiguously means "no more".
            cursor.end_of_table = true;
        } else {
            cursor.page_num = next_leaf;
            cursor.cell_num = 0;
        }
    }
    Ok(())
}
