//! Data model of a parsed message template: messages, blocks and fields.
//!
//! The model is built once by [`crate::parser::parse`] and only read afterwards.

use crate::error::Error;
use crate::naming;
use crate::types::ProtocolType;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Largest repeat count a `Multiple` block may declare.
pub const MAX_REPEAT_COUNT: u32 = 255;

/// Largest byte count a `Fixed` field may declare.
pub const MAX_FIXED_SIZE: u32 = 0xFFFF;

/// Root of a parsed template: version tag and messages in declaration order.
#[derive(Debug, Clone)]
pub struct Template {
    pub version: String,
    pub messages: Vec<Message>,
}

/// Frequency class of a message. Fixes the width and layout of its wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    High,
    Medium,
    Low,
    Fixed,
}

impl Frequency {
    /// Largest id that can be declared for this class.
    ///
    /// High and Medium ids share their byte with the 0xFF escape marker, so 0xFF itself is unusable.
    pub fn max_id(self) -> u32 {
        match self {
            Frequency::High | Frequency::Medium => 0xFE,
            Frequency::Low => 0xFFFF,
            Frequency::Fixed => u32::MAX,
        }
    }

    /// Smallest id that can be declared for this class.
    ///
    /// A Fixed identifier is read back through two 0xFF markers, so its top two bytes must be 0xFFFF.
    pub fn min_id(self) -> u32 {
        match self {
            Frequency::Fixed => 0xFFFF_0000,
            _ => 0,
        }
    }

    /// Wire identifier bytes for `id`: High `[id]`, Medium `[ff, id]`,
    /// Low `[ff, ff, id_hi, id_lo]`, Fixed the four id bytes verbatim.
    pub fn id_bytes(self, id: u32) -> Vec<u8> {
        match self {
            Frequency::High => vec![id as u8],
            Frequency::Medium => vec![0xFF, id as u8],
            Frequency::Low => vec![0xFF, 0xFF, (id >> 8) as u8, id as u8],
            Frequency::Fixed => id.to_be_bytes().to_vec(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::High => "High",
            Frequency::Medium => "Medium",
            Frequency::Low => "Low",
            Frequency::Fixed => "Fixed",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Frequency::High),
            "medium" => Ok(Frequency::Medium),
            "low" => Ok(Frequency::Low),
            "fixed" => Ok(Frequency::Fixed),
            _ => Err(format!("unknown frequency class: {}", s)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One protocol message.
#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    pub frequency: Frequency,
    /// Declared id. For Fixed messages this is the full 32-bit literal (e.g. 0xFFFFFFFB).
    pub id: u32,
    pub trust: String,
    pub encoding: String,
    /// Optional sixth header token (e.g. `UDPDeprecated`), passed through untouched.
    pub deprecation: Option<String>,
    pub blocks: Vec<Block>,
    /// Source line of the message header.
    pub line: usize,
}

impl Message {
    pub fn id_bytes(&self) -> Vec<u8> {
        self.frequency.id_bytes(self.id)
    }

    /// Resolved message number: the identifier bytes read as a big-endian integer.
    ///
    /// High 1 is `1`, Medium 5 is `0xFF05`, Low 2 is `0xFFFF0002`, Fixed ids are unchanged.
    pub fn number(&self) -> u32 {
        self.id_bytes()
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
    }

    pub fn field_count(&self) -> usize {
        self.blocks.iter().map(|b| b.fields.len()).sum()
    }

    /// Lower bound of the encoded size in bytes (identifier, fixed-width fields, record counts).
    pub fn size_hint(&self) -> usize {
        let blocks: usize = self
            .blocks
            .iter()
            .map(|b| match b.quantity {
                Quantity::Single => b.fixed_size(),
                Quantity::Multiple(n) => b.fixed_size().saturating_mul(n as usize),
                Quantity::Variable => 1,
            })
            .fold(0usize, usize::saturating_add);
        blocks.saturating_add(self.id_bytes().len())
    }
}

/// Repetition discipline of a block. `Multiple` carries its (positive) repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Single,
    Multiple(u32),
    Variable,
}

/// A named group of fields inside a message.
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub quantity: Quantity,
    pub fields: Vec<Field>,
    /// Name of the owning message; only used to build a unique record type name.
    pub message: String,
    pub line: usize,
}

impl Block {
    pub fn repeat_count(&self) -> Option<u32> {
        match self.quantity {
            Quantity::Multiple(n) => Some(n),
            _ => None,
        }
    }

    /// Sum of the fixed wire sizes of the fields (variable fields count their length prefix only).
    pub fn fixed_size(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.ty.wire_size().unwrap_or_else(|| f.ty.prefix_size()))
            .fold(0usize, usize::saturating_add)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: ProtocolType,
    pub line: usize,
}

impl Template {
    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Reject duplicate message names and numbers, duplicate block names within a message,
    /// and fields that map to the same generated identifier within a block.
    pub fn check_unique(&self) -> Result<(), Error> {
        let mut names = HashSet::new();
        let mut numbers: HashMap<u32, &str> = HashMap::new();
        for m in &self.messages {
            if !names.insert(m.name.as_str()) {
                return Err(Error::Duplicate {
                    kind: "message name",
                    name: m.name.clone(),
                });
            }
            if let Some(other) = numbers.insert(m.number(), m.name.as_str()) {
                return Err(Error::Duplicate {
                    kind: "message number",
                    name: format!("{:#010x} ({} and {})", m.number(), other, m.name),
                });
            }
            let mut blocks = HashSet::new();
            for b in &m.blocks {
                if !blocks.insert(naming::field_name(&b.name)) {
                    return Err(Error::Duplicate {
                        kind: "block",
                        name: format!("{}.{}", m.name, b.name),
                    });
                }
                let mut fields = HashSet::new();
                for f in &b.fields {
                    if !fields.insert(naming::field_name(&f.name)) {
                        return Err(Error::Duplicate {
                            kind: "field",
                            name: format!("{}.{}.{}", m.name, b.name, f.name),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
