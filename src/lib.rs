//! Dual-codec file compression core.
//!
//! This library implements the two compression engines behind a simple
//! archiver: a Huffman entropy coder and a sliding-window (LZ77-style)
//! dictionary coder, each producing a self-describing binary container, plus
//! a magic-byte signature sniffer that decides which operation a file
//! permits.
//!
//! # Architecture
//!
//! - `priority_queue`: min-queue with a deterministic insertion-order
//!   tie-break, shared by Huffman tree construction
//! - `huffman`: frequency analysis, tree and code-table construction,
//!   bit-level packing, container (de)serialization
//! - `sliding_window`: windowed longest-match search (hash-accelerated),
//!   match-stream coding, container (de)serialization
//! - `signature`: archive-kind classification from magic bytes
//! - `io`: whole-file read/write collaborators, sync and async
//! - `engine`: async, cancellable compress/decompress orchestration
//!
//! # Example
//!
//! ```no_run
//! use filepress::{compress_file, decompress_file, Algorithm, CancelToken};
//!
//! # async fn demo() -> filepress::Result<()> {
//! let cancel = CancelToken::new();
//! compress_file(
//!     Algorithm::Huffman,
//!     "notes.txt".as_ref(),
//!     "notes.txt.huff".as_ref(),
//!     &cancel,
//! )
//! .await?;
//! let restored = decompress_file("notes.txt.huff".as_ref(), &cancel).await?;
//! println!("restored to {}", restored.display());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod engine;
pub mod error;
pub mod huffman;
pub mod io;
pub mod priority_queue;
pub mod signature;
pub mod sliding_window;

mod container;

pub use cancel::CancelToken;
pub use engine::{compress_file, decompress_file, Algorithm};
pub use error::{Error, Result};
pub use signature::{classify, classify_path, ArchiveKind};

/// A compression algorithm paired with its self-describing container format.
///
/// Both codecs are stateless: every call owns its intermediate structures
/// (trees, tables, match streams) for the duration of the call only, so one
/// codec value may serve any number of concurrent operations.
pub trait ContainerCodec {
    /// The archive kind this codec produces.
    fn kind(&self) -> ArchiveKind;

    /// Compress `input` into a container carrying `file_name` in its header.
    fn compress(&self, input: &[u8], file_name: &str, cancel: &CancelToken) -> Result<Vec<u8>>;

    /// Parse a container and reconstruct the original file name and bytes.
    fn decompress(&self, container: &[u8], cancel: &CancelToken) -> Result<(String, Vec<u8>)>;
}
