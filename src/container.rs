//! Shared helpers for the self-describing container headers.
//!
//! Both codecs wrap their payload in the same header shape: a little-endian
//! `u32` length followed by that many bytes of UTF-8 file name, then a
//! length-prefixed side table (frequency table or match stream). Truncation
//! anywhere maps to [`Error::Corrupted`].

use crate::error::{Error, Result};

/// Append a little-endian `u32` to `buf`.
pub(crate) fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append `[u32 len][bytes]` to `buf`.
pub(crate) fn put_block(buf: &mut Vec<u8>, block: &[u8]) {
    put_u32(buf, block.len() as u32);
    buf.extend_from_slice(block);
}

/// Sequential reader over a container buffer.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// All bytes not yet consumed. Used for trailing payloads whose length
    /// is implied by the end of the container.
    pub(crate) fn rest(self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn read_u8(&mut self, what: &str) -> Result<u8> {
        let bytes = self.read_bytes(1, what)?;
        Ok(bytes[0])
    }

    pub(crate) fn read_u16(&mut self, what: &str) -> Result<u16> {
        let bytes = self.read_bytes(2, what)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u32(&mut self, what: &str) -> Result<u32> {
        let bytes = self.read_bytes(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::corrupted(format!(
                "truncated while reading {what}: need {len} bytes, {} left",
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a `[u32 len][bytes]` block.
    pub(crate) fn read_block(&mut self, what: &str) -> Result<&'a [u8]> {
        let len = self.read_u32(what)? as usize;
        self.read_bytes(len, what)
    }

    /// Read the length-prefixed UTF-8 file name at the front of a container.
    pub(crate) fn read_file_name(&mut self) -> Result<String> {
        let bytes = self.read_block("file name")?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::corrupted("file name is not valid UTF-8"))
    }
}

/// Append the `[u32 len][name]` file-name field shared by both containers.
pub(crate) fn put_file_name(buf: &mut Vec<u8>, file_name: &str) {
    put_block(buf, file_name.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_header_fields() {
        let mut buf = Vec::new();
        put_file_name(&mut buf, "notes.txt");
        put_block(&mut buf, &[1, 2, 3]);
        buf.extend_from_slice(&[0xAA, 0xBB]);

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_file_name().unwrap(), "notes.txt");
        assert_eq!(reader.read_block("side table").unwrap(), &[1, 2, 3]);
        assert_eq!(reader.rest(), &[0xAA, 0xBB]);
    }

    #[test]
    fn truncated_length_field_is_corruption() {
        let mut reader = ByteReader::new(&[0x05, 0x00]);
        let err = reader.read_u32("file name").unwrap_err();
        assert!(matches!(err, Error::Corrupted(_)));
    }

    #[test]
    fn length_beyond_buffer_is_corruption() {
        // Claims a 100-byte name but provides 2 bytes.
        let mut buf = Vec::new();
        put_u32(&mut buf, 100);
        buf.extend_from_slice(b"ab");
        let mut reader = ByteReader::new(&buf);
        assert!(matches!(
            reader.read_file_name(),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    fn invalid_utf8_name_is_corruption() {
        let mut buf = Vec::new();
        put_block(&mut buf, &[0xFF, 0xFE]);
        let mut reader = ByteReader::new(&buf);
        assert!(matches!(
            reader.read_file_name(),
            Err(Error::Corrupted(_))
        ));
    }
}
