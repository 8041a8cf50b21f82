//! Swappable byte-range storage behind the pager: a real file in
//! production, an in-memory map in unit tests.
use super::node::PAGE_SIZE;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

pub trait Storage {
    fn len(&mut self) -> std::io::Result<u64>;
    fn read_page(&mut self, page_num: u32, buf: &mut [u8; PAGE_SIZE]) -> std::io::Result<()>;
    fn write_page(&mut self, page_num: u32, buf: &[u8; PAGE_SIZE]) -> std::io::Result<()>;
}

pub struct FileStorage {
    file: File,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<FileStorage> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(FileStorage { file })
    }
}

impl Storage for FileStorage {
    fn len(&mut self) -> std::io::Result<u64> {
        self.file.seek(SeekFrom::End(0))
    }

    fn read_page(&mut self, page_num: u32, buf: &mut [u8; PAGE_SIZE]) -> std::io::Result<()> {
        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        // Short reads at EOF are fine; the rest of `buf` stays zeroed.
        let _ = self.file.read(buf)?;
        Ok(())
    }

    fn write_page(&mut self, page_num: u32, buf: &[u8; PAGE_SIZE]) -> std::io::Result<()> {
        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(buf)?;
        self.file.flush()
    }
}

#[cfg(test)]
pub struct InMemoryStorage {
    pages: std::collections::HashMap<u32, [u8; PAGE_SIZE]>,
    len: u64,
}

#[cfg(test)]
impl InMemoryStorage {
    pub fn new() -> InMemoryStorage {
        InMemoryStorage {
            pages: std::collections::HashMap::new(),
            len: 0,
        }
    }
}

#[cfg(test)]
impl Storage for InMemoryStorage {
    fn len(&mut self) -> std::io::Result<u64> {
        Ok(self.len)
    }

    fn read_page(&mut self, page_num: u32, buf: &mut [u8; PAGE_SIZE]) -> std::io::Result<()> {
        if let Some(page) = self.pages.get(&page_num) {
            buf.copy_from_slice(page);
        }
        Ok(())
    }

    fn write_page(&mut self, page_num: u32, buf: &[u8; PAGE_SIZE]) -> std::io::Result<()> {
        self.pages.insert(page_num, *buf);
        self.len = self.len.max((page_num as u64 + 1) * PAGE_SIZE as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trip() {
        let mut storage = InMemoryStorage::new();
        let mut page = [0u8; PAGE_SIZE];
        page[0] = 42;
        storage.write_page(3, &page).unwrap();

        let mut buf = [0u8; PAGE_SIZE];
        storage.read_page(3, &mut buf).unwrap();
        assert_eq!(buf[0], 42);
        assert_eq!(storage.len().unwrap(), 4 * PAGE_SIZE as u64);
    }
}
