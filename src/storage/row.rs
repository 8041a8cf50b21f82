//! Fixed-schema row: a 32-bit id plus two NUL-terminated fixed-width
//! string slots. Layout matches the historical `(id:4, username:33,
//! email:256)` struct byte-for-byte so the file format doesn't drift.
use heapless::Vec as HVec;

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = 4;
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: HVec<u8, COLUMN_USERNAME_SIZE>,
    pub email: HVec<u8, COLUMN_EMAIL_SIZE>,
}

impl Row {
    /// Builds a row from already-validated slices. Callers (the parser) are
    /// responsible for the length checks that produce `StringTooLong`.
    pub fn new(id: u32, username: &str, email: &str) -> Row {
        let mut uname = HVec::new();
        let _ = uname.extend_from_slice(username.as_bytes());
        let mut mail = HVec::new();
        let _ = mail.extend_from_slice(email.as_bytes());
        Row {
            id,
            username: uname,
            email: mail,
        }
    }

    pub fn username_str(&self) -> &str {
        std::str::from_utf8(&self.username).unwrap_or("")
    }

    pub fn email_str(&self) -> &str {
        std::str::from_utf8(&self.email).unwrap_or("")
    }

    pub fn serialize_into(&self, dest: &mut [u8]) {
        debug_assert!(dest.len() >= ROW_SIZE);
        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_ne_bytes());

        let uname_slot = &mut dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE];
        uname_slot.fill(0);
        uname_slot[..self.username.len()].copy_from_slice(&self.username);

        let email_slot = &mut dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE];
        email_slot.fill(0);
        email_slot[..self.email.len()].copy_from_slice(&self.email);
    }

    pub fn deserialize_from(src: &[u8]) -> Row {
        debug_assert!(src.len() >= ROW_SIZE);
        let mut id_bytes = [0u8; ID_SIZE];
        id_bytes.copy_from_slice(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]);
        let id = u32::from_ne_bytes(id_bytes);

        let uname_slot = &src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE];
        let uname_len = uname_slot.iter().position(|&b| b == 0).unwrap_or(uname_slot.len());
        let mut username = HVec::new();
        let _ = username.extend_from_slice(&uname_slot[..uname_len.min(COLUMN_USERNAME_SIZE)]);

        let email_slot = &src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE];
        let email_len = email_slot.iter().position(|&b| b == 0).unwrap_or(email_slot.len());
        let mut email = HVec::new();
        let _ = email.extend_from_slice(&email_slot[..email_len.min(COLUMN_EMAIL_SIZE)]);

        Row { id, username, email }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username_str(), self.email_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_fixed_buffers() {
        let row = Row::new(7, "user1", "person1@example.com");
        let mut buf = [0u8; ROW_SIZE];
        row.serialize_into(&mut buf);
        let back = Row::deserialize_from(&buf);
        assert_eq!(back, row);
    }

    #[test]
    fn round_trips_at_maximum_length() {
        let username = "a".repeat(COLUMN_USERNAME_SIZE);
        let email = "b".repeat(COLUMN_EMAIL_SIZE);
        let row = Row::new(1, &username, &email);
        let mut buf = [0u8; ROW_SIZE];
        row.serialize_into(&mut buf);
        let back = Row::deserialize_from(&buf);
        assert_eq!(back.username_str(), username);
        assert_eq!(back.email_str(), email);
    }

    #[test]
    fn row_size_matches_historical_layout() {
        assert_eq!(ROW_SIZE, 293);
        assert_eq!(USERNAME_SIZE, 33);
        assert_eq!(EMAIL_SIZE, 256);
    }
}
