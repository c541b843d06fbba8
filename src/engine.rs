//! Async orchestration of compress/decompress calls.
//!
//! Each call is a single cancellable unit of work: read the input off the
//! interactive thread, run the codec on a blocking task that polls the
//! cancel token, and write the result only on success, so a cancelled or
//! failed call never commits a partial output file. Calls are stateless and
//! independent of one another.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use tokio::task;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::huffman::HuffmanCodec;
use crate::io;
use crate::signature::{self, ArchiveKind};
use crate::sliding_window::SlidingWindowCodec;
use crate::ContainerCodec;

/// The compression algorithm chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Huffman,
    SlidingWindow,
}

impl Algorithm {
    /// The archive kind this algorithm produces.
    pub fn kind(self) -> ArchiveKind {
        match self {
            Algorithm::Huffman => ArchiveKind::Huffman,
            Algorithm::SlidingWindow => ArchiveKind::SlidingWindow,
        }
    }

    /// The file extension this algorithm produces, dot included.
    pub fn extension(self) -> &'static str {
        self.kind().extension()
    }

    /// Select the algorithm that produced a file, by its extension
    /// (without the dot).
    pub fn from_extension(extension: &str) -> Option<Algorithm> {
        match ArchiveKind::from_extension(extension) {
            ArchiveKind::Huffman => Some(Algorithm::Huffman),
            ArchiveKind::SlidingWindow => Some(Algorithm::SlidingWindow),
            _ => None,
        }
    }

    fn codec(self) -> Box<dyn ContainerCodec + Send> {
        match self {
            Algorithm::Huffman => Box::new(HuffmanCodec),
            Algorithm::SlidingWindow => Box::new(SlidingWindowCodec::default()),
        }
    }
}

/// Compress the file at `input` with `algorithm` and write the container to
/// `output`.
///
/// The input must not already be an archive: anything the signature sniffer
/// recognizes is rejected with `InvalidArgument`. Cancellation is checked
/// before the heavy work starts and polled inside the codec loops; it
/// surfaces as [`Error::Cancelled`] and leaves no output file behind.
pub async fn compress_file(
    algorithm: Algorithm,
    input: &Path,
    output: &Path,
    cancel: &CancelToken,
) -> Result<()> {
    cancel.check()?;
    let file_name = container_file_name(input)?;
    let data = io::read_bytes_async(input).await?;

    match signature::classify(&data) {
        ArchiveKind::None => {}
        kind => {
            return Err(Error::InvalidArgument(format!(
                "input is already a {kind:?} archive"
            )))
        }
    }

    let token = cancel.clone();
    let container = task::spawn_blocking(move || {
        algorithm.codec().compress(&data, &file_name, &token)
    })
    .await
    .map_err(join_error)??;

    cancel.check()?;
    io::write_bytes_async(output, &container).await?;
    debug!("compressed {} -> {}", input.display(), output.display());
    Ok(())
}

/// Decompress the container at `input` and write the original bytes next to
/// it, under the file name stored in the container header. Returns the path
/// written.
///
/// The codec is selected by the container's extension (`.huff` or `.swc`);
/// anything else is rejected with `InvalidArgument`.
pub async fn decompress_file(input: &Path, cancel: &CancelToken) -> Result<PathBuf> {
    cancel.check()?;
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let algorithm = Algorithm::from_extension(extension).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "not a compressed file produced by this crate: {}",
            input.display()
        ))
    })?;

    let data = io::read_bytes_async(input).await?;
    let token = cancel.clone();
    let (file_name, bytes) =
        task::spawn_blocking(move || algorithm.codec().decompress(&data, &token))
            .await
            .map_err(join_error)??;

    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
        return Err(Error::corrupted(format!(
            "container file name {file_name:?} escapes the output directory"
        )));
    }

    let out_path = input.parent().unwrap_or(Path::new("")).join(&file_name);
    cancel.check()?;
    io::write_bytes_async(&out_path, &bytes).await?;
    debug!("decompressed {} -> {}", input.display(), out_path.display());
    Ok(out_path)
}

fn container_file_name(input: &Path) -> Result<String> {
    input
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "input path has no usable file name: {}",
                input.display()
            ))
        })
}

fn join_error(err: task::JoinError) -> Error {
    Error::Io(std::io::Error::new(ErrorKind::Other, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn file_round_trip(algorithm: Algorithm) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.txt");
        let content = b"to be, or not to be, that is the question; to be, or not";
        std::fs::write(&input, content).unwrap();

        let out_dir = dir.path().join("out");
        let container = out_dir.join(format!("report.txt{}", algorithm.extension()));
        let cancel = CancelToken::new();

        compress_file(algorithm, &input, &container, &cancel)
            .await
            .unwrap();
        assert!(container.exists());

        let restored = decompress_file(&container, &cancel).await.unwrap();
        assert_eq!(restored, out_dir.join("report.txt"));
        assert_eq!(std::fs::read(&restored).unwrap(), content);
    }

    #[tokio::test]
    async fn huffman_file_round_trip() {
        file_round_trip(Algorithm::Huffman).await;
    }

    #[tokio::test]
    async fn sliding_window_file_round_trip() {
        file_round_trip(Algorithm::SlidingWindow).await;
    }

    #[tokio::test]
    async fn cancellation_commits_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.bin");
        std::fs::write(&input, vec![b'q'; 64 * 1024]).unwrap();
        let output = dir.path().join("big.bin.huff");

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = compress_file(Algorithm::Huffman, &input, &output, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn recognized_archives_are_rejected_for_compression() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("already.zip");
        std::fs::write(&input, [0x50, 0x4B, 0x03, 0x04, 0x00, 0x00]).unwrap();

        let err = compress_file(
            Algorithm::Huffman,
            &input,
            &dir.path().join("already.zip.huff"),
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn foreign_extension_is_rejected_for_decompression() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.gz");
        std::fs::write(&input, [0x1F, 0x8B, 0x08]).unwrap();

        let err = decompress_file(&input, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn missing_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = compress_file(
            Algorithm::SlidingWindow,
            &dir.path().join("absent.txt"),
            &dir.path().join("absent.txt.swc"),
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn hostile_container_name_is_corruption() {
        // Hand-build a sliding-window container whose stored name points
        // outside the output directory.
        let codec = SlidingWindowCodec::default();
        let cancel = CancelToken::new();
        let container = codec
            .compress(b"payload", "../escape.txt", &cancel)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evil.swc");
        std::fs::write(&path, &container).unwrap();

        let err = decompress_file(&path, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Corrupted(_)));
    }
}
