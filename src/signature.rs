//! Archive signature sniffing.
//!
//! Classifies a file by its magic bytes so callers can gate operations: a
//! file is eligible for compression only when it classifies as
//! [`ArchiveKind::None`], and for decompression only when it carries one of
//! the extensions this crate produces. The two container formats written by
//! this crate have no magic of their own, so they are recognized by
//! extension, not by signature.

use std::io::Read;
use std::path::Path;

/// How much of a file prefix the classifier looks at. TAR needs the most:
/// its `"ustar"` marker sits at offset 0x101.
pub const SNIFF_LEN: usize = 512;

/// Byte offset of the `"ustar"` marker in a TAR header.
const TAR_MAGIC_OFFSET: usize = 0x101;

/// Classification result of signature sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveKind {
    /// No recognized signature; the file may be compressed.
    #[default]
    None,
    /// A Huffman container produced by this crate (`.huff`).
    Huffman,
    /// A sliding-window container produced by this crate (`.swc`).
    SlidingWindow,
    Zip,
    Rar,
    SevenZip,
    Tar,
    GZip,
    BZip2,
    Xz,
}

impl ArchiveKind {
    /// The file extension this crate produces for the kind, or `""` for
    /// kinds that are detected but never produced.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Huffman => ".huff",
            ArchiveKind::SlidingWindow => ".swc",
            _ => "",
        }
    }

    /// Map a produced extension (without the dot) back to its kind.
    /// Extensions of foreign archive formats map to `None`.
    pub fn from_extension(extension: &str) -> ArchiveKind {
        match extension {
            "huff" => ArchiveKind::Huffman,
            "swc" => ArchiveKind::SlidingWindow,
            _ => ArchiveKind::None,
        }
    }
}

/// Classify a byte prefix against the known magic-byte patterns.
///
/// Only the first [`SNIFF_LEN`] bytes are considered. Patterns are checked
/// in fixed priority order and the first match wins; every pattern must be
/// fully present in the given bytes (a short prefix never matches).
///
/// # Example
/// ```
/// use filepress::signature::{classify, ArchiveKind};
///
/// assert_eq!(classify(&[0x1F, 0x8B, 0x08]), ArchiveKind::GZip);
/// assert_eq!(classify(&[0x12, 0x22, 0x32, 0x42]), ArchiveKind::None);
/// ```
pub fn classify(bytes: &[u8]) -> ArchiveKind {
    let header = &bytes[..bytes.len().min(SNIFF_LEN)];

    // ZIP: "PK" then 03 (local file), 05 (empty/end), or 07 (spanned).
    if header.len() >= 3
        && header[0] == 0x50
        && header[1] == 0x4B
        && matches!(header[2], 0x03 | 0x05 | 0x07)
    {
        return ArchiveKind::Zip;
    }

    // RAR: "Rar!\x1A\x07" then 00 (v4) or 01 00 (v5).
    if header.len() >= 7
        && header.starts_with(&[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07])
        && (header[6] == 0x00 || (header.len() >= 8 && header[6] == 0x01 && header[7] == 0x00))
    {
        return ArchiveKind::Rar;
    }

    if header.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]) {
        return ArchiveKind::SevenZip;
    }

    if header.starts_with(&[0x1F, 0x8B]) {
        return ArchiveKind::GZip;
    }

    // "BZh"
    if header.starts_with(&[0x42, 0x5A, 0x68]) {
        return ArchiveKind::BZip2;
    }

    if header.starts_with(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]) {
        return ArchiveKind::Xz;
    }

    // TAR: "ustar" at offset 0x101, so the full 512-byte prefix must exist.
    if header.len() > TAR_MAGIC_OFFSET + 4
        && &header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5] == b"ustar"
    {
        return ArchiveKind::Tar;
    }

    ArchiveKind::None
}

/// Classify a file on disk by reading up to [`SNIFF_LEN`] bytes of it.
///
/// A missing, unreadable, or empty file classifies as [`ArchiveKind::None`].
pub fn classify_path(path: &Path) -> ArchiveKind {
    let Ok(file) = std::fs::File::open(path) else {
        return ArchiveKind::None;
    };
    let mut header = Vec::with_capacity(SNIFF_LEN);
    if file.take(SNIFF_LEN as u64).read_to_end(&mut header).is_err() {
        return ArchiveKind::None;
    }
    classify(&header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_zip_signatures() {
        assert_eq!(classify(&[0x50, 0x4B, 0x03, 0x04]), ArchiveKind::Zip);
        assert_eq!(classify(&[0x50, 0x4B, 0x05, 0x06]), ArchiveKind::Zip);
        assert_eq!(classify(&[0x50, 0x4B, 0x07, 0x08]), ArchiveKind::Zip);
        // "PK" with an unexpected third byte is not a ZIP.
        assert_eq!(classify(&[0x50, 0x4B, 0x01, 0x02]), ArchiveKind::None);
    }

    #[test]
    fn recognizes_rar_v4_and_v5() {
        assert_eq!(
            classify(&[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00]),
            ArchiveKind::Rar
        );
        assert_eq!(
            classify(&[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01, 0x00]),
            ArchiveKind::Rar
        );
        // v5 marker cut short.
        assert_eq!(
            classify(&[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01]),
            ArchiveKind::None
        );
    }

    #[test]
    fn recognizes_seven_zip_gzip_bzip2_xz() {
        assert_eq!(
            classify(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
            ArchiveKind::SevenZip
        );
        assert_eq!(classify(&[0x1F, 0x8B]), ArchiveKind::GZip);
        assert_eq!(classify(b"BZh91AY"), ArchiveKind::BZip2);
        assert_eq!(
            classify(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]),
            ArchiveKind::Xz
        );
    }

    #[test]
    fn recognizes_tar_by_ustar_marker() {
        let mut header = vec![0u8; 512];
        header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5].copy_from_slice(b"ustar");
        assert_eq!(classify(&header), ArchiveKind::Tar);
        // The marker requires the full prefix to be present.
        assert_eq!(classify(&header[..256]), ArchiveKind::None);
    }

    #[test]
    fn unknown_bytes_classify_as_none() {
        assert_eq!(classify(&[0x12, 0x22, 0x32, 0x42]), ArchiveKind::None);
        assert_eq!(classify(&[]), ArchiveKind::None);
    }

    #[test]
    fn missing_path_classifies_as_none() {
        assert_eq!(
            classify_path(Path::new("no/such/file.bin")),
            ArchiveKind::None
        );
    }

    #[test]
    fn classifies_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, [0x50, 0x4B, 0x03, 0x04, 0x00]).unwrap();
        assert_eq!(classify_path(&path), ArchiveKind::Zip);

        let empty = dir.path().join("empty.bin");
        std::fs::write(&empty, b"").unwrap();
        assert_eq!(classify_path(&empty), ArchiveKind::None);
    }

    #[test]
    fn produced_extensions_round_trip() {
        assert_eq!(ArchiveKind::Huffman.extension(), ".huff");
        assert_eq!(ArchiveKind::SlidingWindow.extension(), ".swc");
        assert_eq!(ArchiveKind::Zip.extension(), "");
        assert_eq!(ArchiveKind::from_extension("huff"), ArchiveKind::Huffman);
        assert_eq!(ArchiveKind::from_extension("swc"), ArchiveKind::SlidingWindow);
        assert_eq!(ArchiveKind::from_extension("zip"), ArchiveKind::None);
    }
}
