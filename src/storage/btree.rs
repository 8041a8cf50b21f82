//! Insertion, splitting and root creation. Free functions rather than
//! methods on `Table` because each one needs to juggle several page
//! buffers at once; threading them through `&mut Table` methods would
//! fight the borrow checker for no benefit over passing `&mut Pager` directly.
use super::cursor::Cursor;
use super::node::{
    NodeKind, INTERNAL_NODE_MAX_CELLS, INVALID_PAGE_NUM, LEAF_NODE_LEFT_SPLIT_COUNT,
    LEAF_NODE_MAX_CELLS, LEAF_NODE_RIGHT_SPLIT_COUNT,
};
use super::pager::{get_node_max_key, Pager};
use super::row::Row;
use super::storage_backend::Storage;
use crate::errors::FatalError;

/// Inserts `row` (whose key is `key`) into the leaf the cursor points at.
pub fn leaf_node_insert<S: Storage>(
    pager: &mut Pager<S>,
    cursor: &Cursor,
    key: u32,
    row: &Row,
) -> Result<(), FatalError> {
    let node = pager.get_page(cursor.page_num)?;
    let num_cells = node.lock().expect("page mutex poisoned").leaf_num_cells();

    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        return leaf_node_split_and_insert(pager, cursor, key, row);
    }

    let mut node = node.lock().expect("page mutex poisoned");
    if cursor.cell_num < num_cells {
        let mut i = num_cells;
        while i > cursor.cell_num {
            node.copy_leaf_cell(i, i - 1);
            i -= 1;
        }
    }
    node.set_leaf_num_cells(num_cells + 1);
    node.set_leaf_key(cursor.cell_num, key);
    node.set_leaf_value(cursor.cell_num, row);
    Ok(())
}

fn leaf_node_split_and_insert<S: Storage>(
    pager: &mut Pager<S>,
    cursor: &Cursor,
    key: u32,
    row: &Row,
) -> Result<(), FatalError> {
    let old_arc = pager.get_page(cursor.page_num)?;
    let old_page_num = cursor.page_num;
    let old_max = get_node_max_key(pager, old_page_num)?;
    let new_page_num = pager.get_unused_page_num();
    let new_arc = pager.get_page(new_page_num)?;

    let (old_parent, old_is_root) = {
        let mut old = old_arc.lock().expect("page mutex poisoned");
        let mut new = new_arc.lock().expect("page mutex poisoned");
        new.init_leaf();
        new.set_parent(old.parent());
        new.set_leaf_next_leaf(old.leaf_next_leaf());
        old.set_leaf_next_leaf(new_page_num);

        // Redistribute MAX+1 logical cells right to left so writes never
        // clobber a source slot that still needs to be read.
        let mut i = LEAF_NODE_MAX_CELLS as i64;
        while i >= 0 {
            let i_u = i as u32;
            let index_within_node = i_u % LEAF_NODE_LEFT_SPLIT_COUNT as u32;
            let goes_right = i_u >= LEAF_NODE_LEFT_SPLIT_COUNT as u32;

            if i_u == cursor.cell_num {
                if goes_right {
                    new.set_leaf_key(index_within_node, key);
                    new.set_leaf_value(index_within_node, row);
                } else {
                    old.set_leaf_key(index_within_node, key);
                    old.set_leaf_value(index_within_node, row);
                }
            } else if i_u > cursor.cell_num {
                let src = i_u - 1;
                if goes_right {
                    new.copy_leaf_cell_from(index_within_node, &old, src);
                } else {
                    old.copy_leaf_cell(index_within_node, src);
                }
            } else {
                let src = i_u;
                if goes_right {
                    new.copy_leaf_cell_from(index_within_node, &old, src);
                } else {
                    old.copy_leaf_cell(index_within_node, src);
                }
            }
            i -= 1;
        }

        old.set_leaf_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT as u32);
        new.set_leaf_num_cells(LEAF_NODE_RIGHT_SPLIT_COUNT as u32);

        (old.parent(), old.is_root())
    };

    if old_is_root {
        return create_new_root(pager, new_page_num);
    }

    let new_max = get_node_max_key(pager, old_page_num)?;
    let parent_arc = pager.get_page(old_parent)?;
    {
        let mut parent = parent_arc.lock().expect("page mutex poisoned");
        parent.update_internal_key(old_max, new_max);
    }
    internal_node_insert(pager, old_parent, new_page_num)
}

/// Adds a child/key pair to `parent` that corresponds to `child`.
pub fn internal_node_insert<S: Storage>(
    pager: &mut Pager<S>,
    parent_page_num: u32,
    child_page_num: u32,
) -> Result<(), FatalError> {
    let child_max = get_node_max_key(pager, child_page_num)?;
    let parent_arc = pager.get_page(parent_page_num)?;

    let (index, original_num_keys, right_child_page_num) = {
        let parent = parent_arc.lock().expect("page mutex poisoned");
        (
            parent.internal_find_child(child_max),
            parent.internal_num_keys(),
            parent.internal_right_child_raw(),
        )
    };

    if original_num_keys as usize >= INTERNAL_NODE_MAX_CELLS {
        return internal_node_split_and_insert(pager, parent_page_num, child_page_num);
    }

    if right_child_page_num == INVALID_PAGE_NUM {
        let mut parent = parent_arc.lock().expect("page mutex poisoned");
        parent.set_internal_right_child(child_page_num);
        drop(parent);
        let child_arc = pager.get_page(child_page_num)?;
        child_arc.lock().expect("page mutex poisoned").set_parent(parent_page_num);
        return Ok(());
    }

    let right_child_max = get_node_max_key(pager, right_child_page_num)?;

    if child_max > right_child_max {
        let mut parent = parent_arc.lock().expect("page mutex poisoned");
        parent.set_internal_child(original_num_keys, right_child_page_num);
        parent.set_internal_key(original_num_keys, right_child_max);
        parent.set_internal_right_child(child_page_num);
        parent.set_internal_num_keys(original_num_keys + 1);
        drop(parent);

        let child_arc = pager.get_page(child_page_num)?;
        child_arc.lock().expect("page mutex poisoned").set_parent(parent_page_num);
        let rc_arc = pager.get_page(right_child_page_num)?;
        rc_arc.lock().expect("page mutex poisoned").set_parent(parent_page_num);
    } else {
        let mut parent = parent_arc.lock().expect("page mutex poisoned");
        parent.set_internal_num_keys(original_num_keys + 1);
        let mut i = original_num_keys;
        while i > index {
            parent.copy_internal_cell(i, i - 1);
            i -= 1;
        }
        parent.set_internal_child(index, child_page_num);
        parent.set_internal_key(index, child_max);
        drop(parent);

        let child_arc = pager.get_page(child_page_num)?;
        child_arc.lock().expect("page mutex poisoned").set_parent(parent_page_num);
    }

    Ok(())
}

fn internal_node_split_and_insert<S: Storage>(
    pager: &mut Pager<S>,
    parent_page_num: u32,
    child_page_num: u32,
) -> Result<(), FatalError> {
    let old_max = get_node_max_key(pager, parent_page_num)?;
    let child_max = get_node_max_key(pager, child_page_num)?;
    let new_page_num = pager.get_unused_page_num();

    let old_arc = pager.get_page(parent_page_num)?;
    let splitting_root = old_arc.lock().expect("page mutex poisoned").is_root();

    let (old_page_num, grandparent_page_num) = if splitting_root {
        create_new_root(pager, new_page_num)?;
        let root_arc = pager.get_page(0)?;
        let left = root_arc.lock().expect("page mutex poisoned").internal_child(0)?;
        (left, 0)
    } else {
        let new_arc = pager.get_page(new_page_num)?;
        new_arc.lock().expect("page mutex poisoned").init_internal();
        let parent_of_parent = old_arc.lock().expect("page mutex poisoned").parent();
        (parent_page_num, parent_of_parent)
    };

    let old_arc = pager.get_page(old_page_num)?;

    let old_right_child = old_arc
        .lock()
        .expect("page mutex poisoned")
        .internal_right_child_raw();
    internal_node_insert(pager, new_page_num, old_right_child)?;
    let rc_arc = pager.get_page(old_right_child)?;
    rc_arc.lock().expect("page mutex poisoned").set_parent(new_page_num);
    old_arc
        .lock()
        .expect("page mutex poisoned")
        .set_internal_right_child(INVALID_PAGE_NUM);

    // Move every cell above the middle key into `new`.
    let mut i = INTERNAL_NODE_MAX_CELLS as i64 - 1;
    while i > INTERNAL_NODE_MAX_CELLS as i64 / 2 {
        let cur_page_num = old_arc
            .lock()
            .expect("page mutex poisoned")
            .internal_child_raw(i as u32);
        internal_node_insert(pager, new_page_num, cur_page_num)?;
        let cur_arc = pager.get_page(cur_page_num)?;
        cur_arc.lock().expect("page mutex poisoned").set_parent(new_page_num);

        let mut old = old_arc.lock().expect("page mutex poisoned");
        let nk = old.internal_num_keys();
        old.set_internal_num_keys(nk - 1);
        i -= 1;
    }

    {
        let mut old = old_arc.lock().expect("page mutex poisoned");
        let nk = old.internal_num_keys();
        let promoted = old.internal_child_raw(nk - 1);
        old.set_internal_right_child(promoted);
        old.set_internal_num_keys(nk - 1);
    }

    let max_after_split = get_node_max_key(pager, old_page_num)?;
    let destination_page_num = if child_max < max_after_split {
        old_page_num
    } else {
        new_page_num
    };
    internal_node_insert(pager, destination_page_num, child_page_num)?;
    let child_arc = pager.get_page(child_page_num)?;
    child_arc
        .lock()
        .expect("page mutex poisoned")
        .set_parent(destination_page_num);

    let new_old_max = get_node_max_key(pager, old_page_num)?;
    let grandparent_arc = pager.get_page(grandparent_page_num)?;
    grandparent_arc
        .lock()
        .expect("page mutex poisoned")
        .update_internal_key(old_max, new_old_max);

    if !splitting_root {
        internal_node_insert(pager, grandparent_page_num, new_page_num)?;
        let new_arc = pager.get_page(new_page_num)?;
        new_arc
            .lock()
            .expect("page mutex poisoned")
            .set_parent(grandparent_page_num);
    }

    Ok(())
}

/// Splits the root in place: the old root's bytes move into a freshly
/// allocated left child, and page 0 is re-initialized as an internal node
/// with `left` and `right_child_page_num` as its two children.
pub fn create_new_root<S: Storage>(
    pager: &mut Pager<S>,
    right_child_page_num: u32,
) -> Result<(), FatalError> {
    let root_page_num = 0u32;
    let root_arc = pager.get_page(root_page_num)?;
    let right_arc = pager.get_page(right_child_page_num)?;
    let left_page_num = pager.get_unused_page_num();
    let left_arc = pager.get_page(left_page_num)?;

    let root_kind = root_arc.lock().expect("page mutex poisoned").kind();
    if root_kind == NodeKind::Internal {
        right_arc.lock().expect("page mutex poisoned").init_internal();
        left_arc.lock().expect("page mutex poisoned").init_internal();
    }

    {
        let root = root_arc.lock().expect("page mutex poisoned");
        let mut left = left_arc.lock().expect("page mutex poisoned");
        left.copy_from(&root);
    }
    left_arc.lock().expect("page mutex poisoned").set_is_root(false);

    let left_is_internal = left_arc.lock().expect("page mutex poisoned").kind() == NodeKind::Internal;
    if left_is_internal {
        let num_keys = left_arc.lock().expect("page mutex poisoned").internal_num_keys();
        for i in 0..num_keys {
            let child_page_num = left_arc.lock().expect("page mutex poisoned").internal_child_raw(i);
            let child_arc = pager.get_page(child_page_num)?;
            child_arc.lock().expect("page mutex poisoned").set_parent(left_page_num);
        }
    }

    let left_max_key = get_node_max_key(pager, left_page_num)?;

    let root_arc = pager.get_page(root_page_num)?;
    {
        let mut root = root_arc.lock().expect("page mutex poisoned");
        root.init_internal();
        root.set_is_root(true);
        root.set_internal_num_keys(1);
        root.set_internal_child(0, left_page_num);
        root.set_internal_key(0, left_max_key);
        root.set_internal_right_child(right_child_page_num);
    }

    let left_arc = pager.get_page(left_page_num)?;
    left_arc.lock().expect("page mutex poisoned").set_parent(root_page_num);
    let right_arc = pager.get_page(right_child_page_num)?;
    right_arc.lock().expect("page mutex poisoned").set_parent(root_page_num);

    Ok(())
}
