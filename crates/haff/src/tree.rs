//! Huffman tree over an index-based node arena.
//!
//! A tree is built either from data (count frequencies, merge the two
//! lightest nodes until one remains, then read each leaf's path back to the
//! root) or from an existing [`CodeTable`] (replay every code as a path from
//! the root). The first path serves compression, the second decompression.
//!
//! Nodes refer to each other by [`NodeId`], an index into the arena. Every
//! rebuild discards the arena and starts over.

use std::io::{Read, Write};

use haff_bits::{BitReader, BitWriter, BITS_IN_BYTE};
use haff_core::{Error, Result};
use tracing::debug;

use crate::frequency::FrequencyTable;
use crate::pqueue::PriorityQueue;
use crate::table::{Code, CodeTable};

/// Index of a node in a tree's arena.
pub type NodeId = usize;

/// One node of the arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanNode {
    /// Occurrences covered by this subtree; 0 in trees rebuilt from a table.
    pub weight: u64,
    /// Byte emitted when decoding reaches this node; meaningful on leaves.
    pub symbol: u8,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
}

impl HuffmanNode {
    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Huffman tree and the code table derived from it.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: Option<NodeId>,
    table: CodeTable,
}

impl HuffmanTree {
    /// Create an empty tree with no codes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from the symbol frequencies of `data`.
    pub fn from_data(data: &[u8]) -> Result<Self> {
        let mut tree = Self::new();
        tree.set_data(data)?;
        Ok(tree)
    }

    /// Build a tree from precomputed frequencies.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let mut tree = Self::new();
        tree.set_frequencies(frequencies)?;
        Ok(tree)
    }

    /// Rebuild a decoding tree from a code table.
    pub fn from_code_table(table: CodeTable) -> Result<Self> {
        let mut tree = Self::new();
        tree.set_code_table(table)?;
        Ok(tree)
    }

    /// Discard the current tree and rebuild it from `data`.
    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        self.set_frequencies(&FrequencyTable::from_bytes(data))
    }

    /// Discard the current tree and rebuild it from `frequencies`.
    ///
    /// Empty input yields an empty tree. A single distinct symbol becomes the
    /// left child of an internal root, so its code is `0`.
    pub fn set_frequencies(&mut self, frequencies: &FrequencyTable) -> Result<()> {
        self.reset();
        let leaves = self.fill_nodes(frequencies);
        self.build_tree(&leaves)?;
        self.build_code_table(&leaves)?;

        debug!(
            "Built Huffman tree: {} leaves, {} nodes, max code length {}, {:.3} bits/symbol (entropy {:.3})",
            leaves.len(),
            self.nodes.len(),
            self.table.max_len(),
            average_code_len(&self.table, frequencies),
            frequencies.entropy()
        );
        Ok(())
    }

    /// Discard the current tree and replay every code of `table` as a path.
    ///
    /// Fails with a malformed-input error when the table is not prefix-free:
    /// a code runs through another code's leaf, or ends on a node that
    /// already has children or a symbol.
    pub fn set_code_table(&mut self, table: CodeTable) -> Result<()> {
        self.reset();
        if table.is_empty() {
            self.table = table;
            return Ok(());
        }

        let root = self.push_node(HuffmanNode::default());
        self.root = Some(root);
        // marks nodes that terminate a code; symbol 0 is a valid symbol
        let mut terminal = vec![false];

        for (symbol, code) in table.iter_used() {
            let mut current = root;
            for bit in code {
                if terminal[current] {
                    return Err(Error::corrupted(format!(
                        "code {code} for symbol {symbol:#04x} extends another code"
                    )));
                }
                let child = if bit {
                    self.nodes[current].right
                } else {
                    self.nodes[current].left
                };
                current = match child {
                    Some(child) => child,
                    None => {
                        let child = self.push_node(HuffmanNode {
                            parent: Some(current),
                            ..HuffmanNode::default()
                        });
                        terminal.push(false);
                        if bit {
                            self.nodes[current].right = Some(child);
                        } else {
                            self.nodes[current].left = Some(child);
                        }
                        child
                    }
                };
            }
            if terminal[current] || !self.nodes[current].is_leaf() {
                return Err(Error::corrupted(format!(
                    "code {code} for symbol {symbol:#04x} is a prefix of another code"
                )));
            }
            terminal[current] = true;
            self.nodes[current].symbol = symbol;
        }

        debug!(
            "Rebuilt Huffman tree from code table: {} codes, {} nodes",
            table.used_count(),
            self.nodes.len()
        );
        self.table = table;
        Ok(())
    }

    /// Append the code of every byte in `input` to `writer`.
    ///
    /// Returns the number of bits written. A byte without a code is a
    /// malformed-input error.
    pub fn encode<I, W>(&self, input: I, writer: &mut BitWriter<W>) -> Result<u64>
    where
        I: IntoIterator<Item = u8>,
        W: Write,
    {
        let mut bits = 0u64;
        for symbol in input {
            let code = self.table.get(symbol);
            if code.is_empty() {
                return Err(Error::corrupted(format!(
                    "symbol {symbol:#04x} has no code in the table"
                )));
            }
            writer.write_code(code)?;
            bits += code.len() as u64;
        }
        Ok(bits)
    }

    /// Encode `input` into a fresh buffer.
    ///
    /// Returns the packed bytes and the number of zero bits padding the
    /// last byte.
    pub fn encode_to_vec(&self, input: &[u8]) -> Result<(Vec<u8>, u8)> {
        let mut writer = BitWriter::new(Vec::new());
        self.encode(input.iter().copied(), &mut writer)?;
        let padding = writer.flush()?;
        Ok((writer.into_inner(), padding))
    }

    /// Decode bits from `reader` into `output` until the significant bits
    /// run out.
    ///
    /// The last `padding_bits` bits of the final byte are ignored. Returns the
    /// number of bytes written. Running out of bits inside a code, or
    /// following a branch the tree does not have, is a malformed-input error.
    pub fn decode<R, W>(
        &self,
        reader: &mut BitReader<R>,
        padding_bits: u8,
        output: &mut W,
    ) -> Result<u64>
    where
        R: Read,
        W: Write,
    {
        if usize::from(padding_bits) >= BITS_IN_BYTE {
            return Err(Error::corrupted(format!(
                "payload padding of {padding_bits} bits exceeds a byte"
            )));
        }

        let Some(root) = self.root else {
            if payload_exhausted(reader, padding_bits)? {
                return Ok(0);
            }
            return Err(Error::corrupted("payload present but code table is empty"));
        };

        let mut decoded = 0u64;
        while !payload_exhausted(reader, padding_bits)? {
            let mut current = root;
            loop {
                let bit = reader.read_bit()?.ok_or_else(|| {
                    Error::corrupted_at("payload ends inside a code", reader.bytes_read())
                })?;
                let node = &self.nodes[current];
                let next = if bit { node.right } else { node.left };
                current = next.ok_or_else(|| {
                    Error::corrupted_at("payload bits match no code", reader.bytes_read())
                })?;
                if self.nodes[current].is_leaf() {
                    break;
                }
                if payload_exhausted(reader, padding_bits)? {
                    return Err(Error::corrupted_at(
                        "payload ends inside a code",
                        reader.bytes_read(),
                    ));
                }
            }
            output.write_all(&[self.nodes[current].symbol])?;
            decoded += 1;
        }
        Ok(decoded)
    }

    /// Decode a packed payload held in memory.
    pub fn decode_slice(&self, payload: &[u8], padding_bits: u8) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(payload)?;
        let mut output = Vec::new();
        self.decode(&mut reader, padding_bits, &mut output)?;
        Ok(output)
    }

    /// Root node, `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&HuffmanNode> {
        self.nodes.get(id)
    }

    /// The whole arena.
    pub fn nodes(&self) -> &[HuffmanNode] {
        &self.nodes
    }

    /// Number of leaves, i.e. symbols with a code.
    pub fn leaf_count(&self) -> usize {
        self.table.used_count()
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.table
    }

    /// Code for `symbol`, empty when the symbol is unused.
    pub fn code(&self, symbol: u8) -> &Code {
        self.table.get(symbol)
    }

    /// Whether the tree has no symbols.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.table = CodeTable::new();
    }

    fn push_node(&mut self, node: HuffmanNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// One leaf per symbol that occurs, in ascending symbol order.
    fn fill_nodes(&mut self, frequencies: &FrequencyTable) -> Vec<NodeId> {
        frequencies
            .iter_used()
            .map(|(symbol, weight)| {
                self.push_node(HuffmanNode {
                    weight,
                    symbol,
                    ..HuffmanNode::default()
                })
            })
            .collect()
    }

    /// Merge the two lightest nodes until a single root remains.
    ///
    /// Ties are broken by arena index, so the same input always yields the
    /// same tree.
    fn build_tree(&mut self, leaves: &[NodeId]) -> Result<()> {
        match leaves {
            [] => {}
            [leaf] => {
                let root = self.push_node(HuffmanNode {
                    weight: self.nodes[*leaf].weight,
                    left: Some(*leaf),
                    ..HuffmanNode::default()
                });
                self.nodes[*leaf].parent = Some(root);
                self.root = Some(root);
            }
            _ => {
                let mut queue: PriorityQueue<(u64, NodeId)> = leaves
                    .iter()
                    .map(|&id| (self.nodes[id].weight, id))
                    .collect();
                while queue.len() > 1 {
                    let (left_weight, left) = queue.pop()?;
                    let (right_weight, right) = queue.pop()?;
                    let weight = left_weight + right_weight;
                    let parent = self.push_node(HuffmanNode {
                        weight,
                        left: Some(left),
                        right: Some(right),
                        ..HuffmanNode::default()
                    });
                    self.nodes[left].parent = Some(parent);
                    self.nodes[right].parent = Some(parent);
                    queue.push((weight, parent));
                }
                self.root = Some(queue.pop()?.1);
            }
        }
        Ok(())
    }

    /// Walk every leaf up to the root, recording 1 for a right step.
    fn build_code_table(&mut self, leaves: &[NodeId]) -> Result<()> {
        for &leaf in leaves {
            let mut code = Code::new();
            let mut current = leaf;
            while let Some(parent) = self.nodes[current].parent {
                let is_right = self.nodes[parent].right == Some(current);
                code.insert(0, is_right)?;
                current = parent;
            }
            self.table.set(self.nodes[leaf].symbol, code);
        }
        Ok(())
    }
}

/// Whether the reader has no significant payload bits left.
fn payload_exhausted<R: Read>(reader: &mut BitReader<R>, padding_bits: u8) -> Result<bool> {
    if reader.is_exhausted() {
        return Ok(true);
    }
    Ok(reader.is_last_byte()?
        && reader.current_bit() >= BITS_IN_BYTE - usize::from(padding_bits))
}

fn average_code_len(table: &CodeTable, frequencies: &FrequencyTable) -> f64 {
    if frequencies.is_empty() {
        return 0.0;
    }
    table.encoded_bits(frequencies) as f64 / frequencies.total() as f64
}
