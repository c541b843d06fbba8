//! Huffman entropy coder with a self-describing container.
//!
//! The pipeline is frequency table -> tree -> code table -> packed bitstream.
//! The container stores the original file name and the frequency table so the
//! decoder can rebuild the identical tree with no external state:
//!
//! ```text
//! [u32 nameLen][nameBytes][u32 freqTableLen][freqTableBytes][bitstream]
//! ```
//!
//! All length fields are little-endian. The frequency table block is
//! `[u32 entryCount]` followed by `entryCount` pairs of `(symbol: u8,
//! frequency: u32)`, serialized in ascending symbol order so that two
//! compressions of the same input are byte-identical.
//!
//! The bit count of the payload is not stored; the final byte is zero-padded.
//! The decoder instead derives the original length from the frequency table
//! (the counts sum to the input length) and stops after emitting exactly that
//! many symbols, discarding any partial traversal left at end of stream.

use std::collections::HashMap;

use bitvec::prelude::*;
use log::{debug, warn};

use crate::cancel::CancelToken;
use crate::container::{self, ByteReader};
use crate::error::{Error, Result};
use crate::priority_queue::MinQueue;
use crate::signature::ArchiveKind;
use crate::ContainerCodec;

/// A variable-length prefix-free code, MSB-first.
pub type Code = BitVec<u8, Msb0>;

/// Mapping from byte value to its code.
pub type CodeTable = HashMap<u8, Code>;

/// How many loop iterations pass between cancellation polls.
const CANCEL_POLL_INTERVAL: usize = 4096;

/// Histogram of byte values in an input buffer.
///
/// Only symbols with a nonzero count are considered present; iteration and
/// serialization visit them in ascending symbol order.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u32; 256],
}

impl FrequencyTable {
    /// Count the occurrences of each byte value. An empty input yields an
    /// empty table.
    pub fn build(data: &[u8]) -> Self {
        let mut counts = [0u32; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Frequency of one symbol (zero if absent).
    pub fn count(&self, symbol: u8) -> u32 {
        self.counts[symbol as usize]
    }

    /// Number of distinct symbols present.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Sum of all counts, equal to the length of the source input.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Whether no symbol is present.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Present symbols and their counts, ascending by symbol value.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Wire form: `[u32 entryCount]` then `(symbol: u8, frequency: u32)`
    /// pairs in ascending symbol order.
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.distinct() * 5);
        container::put_u32(&mut buf, self.distinct() as u32);
        for (symbol, count) in self.iter() {
            buf.push(symbol);
            container::put_u32(&mut buf, count);
        }
        buf
    }

    fn deserialize(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let entries = reader.read_u32("frequency table entry count")?;
        let mut counts = [0u32; 256];
        for _ in 0..entries {
            let symbol = reader.read_u8("frequency table symbol")?;
            let count = reader.read_u32("frequency table count")?;
            counts[symbol as usize] = count;
        }
        if reader.remaining() != 0 {
            return Err(Error::corrupted("trailing bytes after frequency table"));
        }
        Ok(Self { counts })
    }
}

/// A node of the Huffman tree. Leaves carry a symbol; internal nodes own
/// exactly two children and weigh the sum of their weights.
#[derive(Debug, Clone)]
pub enum HuffmanNode {
    /// A leaf for one distinct symbol.
    Leaf { symbol: u8, weight: u64 },
    /// An internal node combining the two lightest subtrees.
    Internal {
        weight: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// The weight of this subtree.
    pub fn weight(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { weight, .. } => *weight,
            HuffmanNode::Internal { weight, .. } => *weight,
        }
    }
}

/// Build the Huffman tree for a frequency table.
///
/// Leaves enter the queue in table iteration order (ascending symbol value);
/// the two lowest-weight nodes are repeatedly combined until one remains.
/// Equal weights resolve to the earliest-inserted node, so the tree shape is
/// fully deterministic: the decoder repeats this construction from the
/// deserialized table and must arrive at the identical tree.
///
/// Returns `None` for an empty table.
pub fn build_tree(table: &FrequencyTable) -> Option<HuffmanNode> {
    let mut queue = MinQueue::new();
    for (symbol, count) in table.iter() {
        let weight = count as u64;
        queue.push(HuffmanNode::Leaf { symbol, weight }, weight);
    }
    if queue.is_empty() {
        return None;
    }
    while queue.len() > 1 {
        let left = queue.pop().unwrap();
        let right = queue.pop().unwrap();
        let weight = left.weight() + right.weight();
        queue.push(
            HuffmanNode::Internal {
                weight,
                left: Box::new(left),
                right: Box::new(right),
            },
            weight,
        );
    }
    queue.pop()
}

/// Derive the code table from a tree: a left edge appends `0`, a right edge
/// appends `1`. A tree that is a single leaf assigns the one-bit code `0`.
pub fn build_code_table(root: &HuffmanNode) -> CodeTable {
    let mut table = CodeTable::new();
    assign_codes(root, Code::new(), &mut table);
    table
}

fn assign_codes(node: &HuffmanNode, prefix: Code, table: &mut CodeTable) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            let code = if prefix.is_empty() {
                bitvec![u8, Msb0; 0]
            } else {
                prefix
            };
            table.insert(*symbol, code);
        }
        HuffmanNode::Internal { left, right, .. } => {
            let mut left_prefix = prefix.clone();
            left_prefix.push(false);
            assign_codes(left, left_prefix, table);
            let mut right_prefix = prefix;
            right_prefix.push(true);
            assign_codes(right, right_prefix, table);
        }
    }
}

/// Concatenate each input byte's code MSB-first and pack into bytes, zero-
/// padding the final byte. The pad length is not recorded anywhere.
fn encode_payload(input: &[u8], codes: &CodeTable, cancel: &CancelToken) -> Result<Vec<u8>> {
    let mut bits: Code = BitVec::with_capacity(input.len() * 4);
    for (i, byte) in input.iter().enumerate() {
        if i % CANCEL_POLL_INTERVAL == 0 {
            cancel.check()?;
        }
        bits.extend_from_bitslice(&codes[byte]);
    }
    bits.set_uninitialized(false);
    Ok(bits.into_vec())
}

/// The Huffman codec.
///
/// # Example
/// ```
/// use filepress::huffman::HuffmanCodec;
/// use filepress::{CancelToken, ContainerCodec};
///
/// let codec = HuffmanCodec;
/// let cancel = CancelToken::new();
/// let container = codec.compress(b"abracadabra", "demo.txt", &cancel)?;
/// let (name, data) = codec.decompress(&container, &cancel)?;
/// assert_eq!(name, "demo.txt");
/// assert_eq!(data, b"abracadabra");
/// # Ok::<(), filepress::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec;

impl ContainerCodec for HuffmanCodec {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Huffman
    }

    /// Compress `input` into a Huffman container.
    ///
    /// # Errors
    /// `Error::InvalidArgument` for an empty input: with no symbols there is
    /// no tree to build, so an empty buffer cannot produce a valid container.
    fn compress(&self, input: &[u8], file_name: &str, cancel: &CancelToken) -> Result<Vec<u8>> {
        cancel.check()?;
        if input.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot compress an empty input".into(),
            ));
        }

        let table = FrequencyTable::build(input);
        let root = build_tree(&table).expect("non-empty input yields a tree");
        let codes = build_code_table(&root);
        let payload = encode_payload(input, &codes, cancel)?;

        let mut out = Vec::with_capacity(payload.len() + file_name.len() + 16);
        container::put_file_name(&mut out, file_name);
        container::put_block(&mut out, &table.serialize());
        out.extend_from_slice(&payload);

        debug!(
            "huffman: compressed {} bytes to {} ({} distinct symbols)",
            input.len(),
            out.len(),
            table.distinct()
        );
        Ok(out)
    }

    /// Decompress a Huffman container back to its file name and bytes.
    ///
    /// Walks the rebuilt tree bit by bit, `0` to the left and `1` to the
    /// right, emitting a symbol at each leaf. Decoding stops once the number
    /// of symbols recorded in the frequency table has been produced, so the
    /// zero padding of the final byte never turns into spurious output; a
    /// traversal still in flight at end of stream is discarded.
    fn decompress(&self, data: &[u8], cancel: &CancelToken) -> Result<(String, Vec<u8>)> {
        cancel.check()?;
        let mut reader = ByteReader::new(data);
        let file_name = reader.read_file_name()?;
        let table_block = reader.read_block("frequency table")?;
        let payload = reader.rest();

        let table = FrequencyTable::deserialize(table_block)?;
        let expected = table.total() as usize;
        let root = build_tree(&table)
            .ok_or_else(|| Error::corrupted("frequency table has no symbols"))?;

        // One distinct symbol: every bit of the payload is the code `0`.
        if let HuffmanNode::Leaf { symbol, .. } = root {
            let available = payload.len() * 8;
            let produced = expected.min(available);
            if produced < expected {
                warn!(
                    "huffman: bitstream ended early, decoded {produced} of {expected} symbols"
                );
            }
            return Ok((file_name, vec![symbol; produced]));
        }

        // The table's counts are untrusted; the payload yields at most one
        // symbol per bit, so never allocate past that.
        let mut out = Vec::with_capacity(expected.min(payload.len().saturating_mul(8)));
        let mut node = &root;
        for (i, bit) in payload.view_bits::<Msb0>().iter().by_vals().enumerate() {
            if i % CANCEL_POLL_INTERVAL == 0 {
                cancel.check()?;
            }
            if let HuffmanNode::Internal { left, right, .. } = node {
                node = if bit { right } else { left };
                if let HuffmanNode::Leaf { symbol, .. } = node {
                    out.push(*symbol);
                    if out.len() == expected {
                        break;
                    }
                    node = &root;
                }
            }
        }

        if out.len() < expected {
            warn!(
                "huffman: bitstream ended early, decoded {} of {expected} symbols",
                out.len()
            );
        }
        Ok((file_name, out))
    }
}
