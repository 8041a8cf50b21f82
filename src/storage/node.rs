//! Byte-offset view over a single 4096-byte page. A `Node` owns its buffer;
//! accessors read and write named fields at fixed offsets rather than
//! exposing the raw bytes, so callers never have to remember the layout.
use super::row::{Row, ROW_SIZE};

pub const PAGE_SIZE: usize = 4096;
pub const MAX_PAGES: u32 = 100;
pub const INVALID_PAGE_NUM: u32 = u32::MAX;

/// Historical encoding: 0 = internal, 1 = leaf (C enum declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Internal = 0,
    Leaf = 1,
}

impl NodeKind {
    fn from_byte(b: u8) -> NodeKind {
        match b {
            0 => NodeKind::Internal,
            _ => NodeKind::Leaf,
        }
    }
}

// Common header.
const NODE_KIND_SIZE: usize = 1;
const NODE_KIND_OFFSET: usize = 0;
const IS_ROOT_SIZE: usize = 1;
const IS_ROOT_OFFSET: usize = NODE_KIND_OFFSET + NODE_KIND_SIZE;
const PARENT_POINTER_SIZE: usize = 4;
const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_KIND_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

// Leaf header.
const LEAF_NODE_NUM_CELLS_SIZE: usize = 4;
const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
const LEAF_NODE_NEXT_LEAF_SIZE: usize = 4;
const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE + LEAF_NODE_NEXT_LEAF_SIZE;

// Leaf body.
const LEAF_NODE_KEY_SIZE: usize = 4;
const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

// Internal header.
const INTERNAL_NODE_NUM_KEYS_SIZE: usize = 4;
const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = 4;
const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
pub const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + INTERNAL_NODE_NUM_KEYS_SIZE + INTERNAL_NODE_RIGHT_CHILD_SIZE;

// Internal body.
const INTERNAL_NODE_KEY_SIZE: usize = 4;
const INTERNAL_NODE_CHILD_SIZE: usize = 4;
const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
pub const INTERNAL_NODE_MAX_CELLS: usize = 3;

#[derive(Clone)]
pub struct Node {
    pub page_num: u32,
    buf: [u8; PAGE_SIZE],
}

fn get_u32(buf: &[u8], offset: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_ne_bytes(b)
}

fn set_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
}

impl Node {
    pub fn from_raw(page_num: u32, buf: [u8; PAGE_SIZE]) -> Node {
        Node { page_num, buf }
    }

    pub fn raw(&self) -> &[u8; PAGE_SIZE] {
        &self.buf
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_byte(self.buf[NODE_KIND_OFFSET])
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.buf[NODE_KIND_OFFSET] = kind as u8;
    }

    pub fn is_root(&self) -> bool {
        self.buf[IS_ROOT_OFFSET] != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.buf[IS_ROOT_OFFSET] = is_root as u8;
    }

    pub fn parent(&self) -> u32 {
        get_u32(&self.buf, PARENT_POINTER_OFFSET)
    }

    pub fn set_parent(&mut self, parent: u32) {
        set_u32(&mut self.buf, PARENT_POINTER_OFFSET, parent);
    }

    pub fn init_leaf(&mut self) {
        self.set_kind(NodeKind::Leaf);
        self.set_is_root(false);
        self.set_leaf_num_cells(0);
        self.set_leaf_next_leaf(0);
    }

    pub fn init_internal(&mut self) {
        self.set_kind(NodeKind::Internal);
        self.set_is_root(false);
        self.set_internal_num_keys(0);
        self.set_internal_right_child(INVALID_PAGE_NUM);
    }

    // --- leaf body ---

    pub fn leaf_num_cells(&self) -> u32 {
        get_u32(&self.buf, LEAF_NODE_NUM_CELLS_OFFSET)
    }

    pub fn set_leaf_num_cells(&mut self, n: u32) {
        set_u32(&mut self.buf, LEAF_NODE_NUM_CELLS_OFFSET, n);
    }

    pub fn leaf_next_leaf(&self) -> u32 {
        get_u32(&self.buf, LEAF_NODE_NEXT_LEAF_OFFSET)
    }

    pub fn set_leaf_next_leaf(&mut self, page_num: u32) {
        set_u32(&mut self.buf, LEAF_NODE_NEXT_LEAF_OFFSET, page_num);
    }

    fn leaf_cell_offset(cell_num: u32) -> usize {
        LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
    }

    pub fn leaf_key(&self, cell_num: u32) -> u32 {
        get_u32(&self.buf, Self::leaf_cell_offset(cell_num))
    }

    pub fn set_leaf_key(&mut self, cell_num: u32, key: u32) {
        set_u32(&mut self.buf, Self::leaf_cell_offset(cell_num), key);
    }

    pub fn leaf_value(&self, cell_num: u32) -> Row {
        let offset = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        Row::deserialize_from(&self.buf[offset..offset + ROW_SIZE])
    }

    pub fn set_leaf_value(&mut self, cell_num: u32, row: &Row) {
        let offset = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        row.serialize_into(&mut self.buf[offset..offset + ROW_SIZE]);
    }

    pub fn copy_leaf_cell(&mut self, dest: u32, src: u32) {
        let d = Self::leaf_cell_offset(dest);
        let s = Self::leaf_cell_offset(src);
        let mut tmp = [0u8; LEAF_NODE_CELL_SIZE];
        tmp.copy_from_slice(&self.buf[s..s + LEAF_NODE_CELL_SIZE]);
        self.buf[d..d + LEAF_NODE_CELL_SIZE].copy_from_slice(&tmp);
    }

    pub fn copy_leaf_cell_from(&mut self, dest: u32, other: &Node, src: u32) {
        let d = Self::leaf_cell_offset(dest);
        let s = Node::leaf_cell_offset(src);
        self.buf[d..d + LEAF_NODE_CELL_SIZE]
            .copy_from_slice(&other.buf[s..s + LEAF_NODE_CELL_SIZE]);
    }

    // --- internal body ---

    pub fn internal_num_keys(&self) -> u32 {
        get_u32(&self.buf, INTERNAL_NODE_NUM_KEYS_OFFSET)
    }

    pub fn set_internal_num_keys(&mut self, n: u32) {
        set_u32(&mut self.buf, INTERNAL_NODE_NUM_KEYS_OFFSET, n);
    }

    pub fn internal_right_child_raw(&self) -> u32 {
        get_u32(&self.buf, INTERNAL_NODE_RIGHT_CHILD_OFFSET)
    }

    pub fn set_internal_right_child(&mut self, page_num: u32) {
        set_u32(&mut self.buf, INTERNAL_NODE_RIGHT_CHILD_OFFSET, page_num);
    }

    fn internal_cell_offset(cell_num: u32) -> usize {
        INTERNAL_NODE_HEADER_SIZE + cell_num as usize * INTERNAL_NODE_CELL_SIZE
    }

    pub fn internal_child_raw(&self, cell_num: u32) -> u32 {
        get_u32(&self.buf, Self::internal_cell_offset(cell_num))
    }

    pub fn set_internal_child(&mut self, cell_num: u32, page_num: u32) {
        set_u32(&mut self.buf, Self::internal_cell_offset(cell_num), page_num);
    }

    /// Returns the child page number at logical index `child_num`, where
    /// `child_num == num_keys` means the right child. Fatal on out-of-range
    /// or invalid-sentinel access (mirrors the historical `internal_node_child`).
    pub fn internal_child(&self, child_num: u32) -> Result<u32, crate::errors::FatalError> {
        let num_keys = self.internal_num_keys();
        if child_num > num_keys {
            return Err(crate::errors::FatalError::InvalidChildAccess { child_num });
        }
        let page_num = if child_num == num_keys {
            self.internal_right_child_raw()
        } else {
            self.internal_child_raw(child_num)
        };
        if page_num == INVALID_PAGE_NUM {
            return Err(crate::errors::FatalError::InvalidChildAccess { child_num });
        }
        Ok(page_num)
    }

    pub fn internal_key(&self, key_num: u32) -> u32 {
        get_u32(
            &self.buf,
            Self::internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE,
        )
    }

    pub fn set_internal_key(&mut self, key_num: u32, key: u32) {
        set_u32(
            &mut self.buf,
            Self::internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE,
            key,
        );
    }

    pub fn copy_internal_cell(&mut self, dest: u32, src: u32) {
        let d = Self::internal_cell_offset(dest);
        let s = Self::internal_cell_offset(src);
        let mut tmp = [0u8; INTERNAL_NODE_CELL_SIZE];
        tmp.copy_from_slice(&self.buf[s..s + INTERNAL_NODE_CELL_SIZE]);
        self.buf[d..d + INTERNAL_NODE_CELL_SIZE].copy_from_slice(&tmp);
    }

    /// Smallest index `i` with `key(i) >= key`, defaulting to `num_keys`
    /// (the right child) when every key is smaller.
    pub fn internal_find_child(&self, key: u32) -> u32 {
        let num_keys = self.internal_num_keys();
        let mut min = 0u32;
        let mut max = num_keys;
        while min != max {
            let mid = (min + max) / 2;
            if self.internal_key(mid) >= key {
                max = mid;
            } else {
                min = mid + 1;
            }
        }
        min
    }

    pub fn update_internal_key(&mut self, old_key: u32, new_key: u32) {
        let index = self.internal_find_child(old_key);
        self.set_internal_key(index, new_key);
    }

    /// Copies `other`'s entire buffer verbatim into this node (used by
    /// `create_new_root` to push the old root down into a new left child).
    pub fn copy_from(&mut self, other: &Node) {
        self.buf = other.buf;
    }
}
