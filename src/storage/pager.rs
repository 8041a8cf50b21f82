//! Page cache and file handle. Pages are loaded lazily and held in memory
//! as `Arc<Mutex<Node>>` slots, not for concurrency (there is none) but so
//! a split can hold two page buffers mutably at once by cloning two `Arc`s
//! out of the slot array instead of borrowing the array itself twice.
use super::node::{Node, INVALID_PAGE_NUM, MAX_PAGES, PAGE_SIZE};
use super::storage_backend::Storage;
use crate::errors::FatalError;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

pub struct Pager<S: Storage> {
    storage: S,
    num_pages: u32,
    pages: Vec<Option<Arc<Mutex<Node>>>>,
}

impl<S: Storage> Pager<S> {
    pub fn open(mut storage: S) -> Result<Pager<S>, FatalError> {
        let file_length = storage.len()?;
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(FatalError::CorruptFile);
        }
        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        debug!(num_pages, "opened pager");
        Ok(Pager {
            storage,
            num_pages,
            pages: (0..MAX_PAGES).map(|_| None).collect(),
        })
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Fetches (loading from disk on first touch) the page at `page_num`.
    pub fn get_page(&mut self, page_num: u32) -> Result<Arc<Mutex<Node>>, FatalError> {
        if page_num >= MAX_PAGES {
            return Err(FatalError::PageOutOfRange {
                page_num,
                max_pages: MAX_PAGES,
            });
        }

        let idx = page_num as usize;
        if self.pages[idx].is_none() {
            trace!(page_num, "cache miss, loading page");
            let mut buf = [0u8; PAGE_SIZE];
            let on_disk_pages = self.num_pages;
            if page_num < on_disk_pages {
                self.storage.read_page(page_num, &mut buf)?;
            }
            self.pages[idx] = Some(Arc::new(Mutex::new(Node::from_raw(page_num, buf))));
            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }

        Ok(self.pages[idx].as_ref().unwrap().clone())
    }

    pub fn flush(&mut self, page_num: u32) -> Result<(), FatalError> {
        let idx = page_num as usize;
        let slot = self.pages[idx]
            .as_ref()
            .ok_or(FatalError::FlushEmptySlot { page_num })?;
        let node = slot.lock().expect("page mutex poisoned");
        self.storage.write_page(page_num, node.raw())?;
        Ok(())
    }

    pub fn get_unused_page_num(&mut self) -> u32 {
        let unused = self.num_pages;
        self.num_pages += 1;
        unused
    }

    pub fn close(mut self) -> Result<(), FatalError> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_none() {
                continue;
            }
            self.flush(page_num)?;
            self.pages[page_num as usize] = None;
        }
        debug!("pager closed");
        Ok(())
    }
}

pub fn get_node_max_key<S: Storage>(
    pager: &mut Pager<S>,
    page_num: u32,
) -> Result<u32, FatalError> {
    let node = pager.get_page(page_num)?;
    let node = node.lock().expect("page mutex poisoned");
    match node.kind() {
        super::node::NodeKind::Leaf => {
            let num_cells = node.leaf_num_cells();
            if num_cells == 0 {
                Ok(0)
            } else {
                Ok(node.leaf_key(num_cells - 1))
            }
        }
        super::node::NodeKind::Internal => {
            let right_child = node.internal_right_child_raw();
            drop(node);
            if right_child == INVALID_PAGE_NUM {
                return Ok(0);
            }
            get_node_max_key(pager, right_child)
        }
    }
}
