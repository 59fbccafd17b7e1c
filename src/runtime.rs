//! Support code linked by generated message modules.
//!
//! Generated code refers to this module through fully qualified paths (by default
//! `::msgtemplate::runtime`), so it never depends on what the including crate has in
//! scope. Everything on the wire is little-endian except message identifiers, which
//! are written and read byte by byte.

use std::io::{self, Read, Write};

use byteorder::ReadBytesExt;

pub use crate::ast::Frequency;
pub use byteorder;
pub use std::net::Ipv4Addr;
pub use uuid::Uuid;

/// `IPPORT` fields carry a plain port number.
pub type IpPort = u16;

/// Traits that generated method bodies call through method syntax.
pub mod prelude {
    pub use super::byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
    pub use super::{Block as _, Message as _};
    pub use std::io::{Read as _, Write as _};
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Vector3 { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector4<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

impl<T> Vector4<T> {
    pub fn new(x: T, y: T, z: T, w: T) -> Self {
        Vector4 { x, y, z, w }
    }
}

/// Quaternion with real part `w` and imaginary parts `i`, `j`, `k`.
///
/// Only the imaginary parts travel on the wire; a decoded value always has `w == 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion<T> {
    pub w: T,
    pub i: T,
    pub j: T,
    pub k: T,
}

impl<T> Quaternion<T> {
    pub fn from_parts(w: T, i: T, j: T, k: T) -> Self {
        Quaternion { w, i, j, k }
    }
}

impl Quaternion<f32> {
    pub fn identity() -> Self {
        Quaternion::from_parts(1.0, 0.0, 0.0, 0.0)
    }

    /// Euclidean norm, scaled by the largest component so large parts do not overflow.
    pub fn norm(&self) -> f32 {
        let scale = self.largest_part();
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }
        self.scaled(scale).sum_of_squares().sqrt() * scale
    }

    /// Unit quaternion pointing the same way, `None` if the norm is zero or not finite.
    pub fn normalize(&self) -> Option<Self> {
        let scale = self.largest_part();
        if scale == 0.0 || !scale.is_finite() {
            return None;
        }
        let q = self.scaled(scale);
        let n = q.sum_of_squares().sqrt();
        if !n.is_finite() {
            return None;
        }
        Some(Quaternion::from_parts(q.w / n, q.i / n, q.j / n, q.k / n))
    }

    fn largest_part(&self) -> f32 {
        self.w.abs().max(self.i.abs()).max(self.j.abs()).max(self.k.abs())
    }

    fn scaled(&self, scale: f32) -> Self {
        Quaternion::from_parts(self.w / scale, self.i / scale, self.j / scale, self.k / scale)
    }

    fn sum_of_squares(&self) -> f32 {
        self.w * self.w + self.i * self.i + self.j * self.j + self.k * self.k
    }
}

impl Default for Quaternion<f32> {
    fn default() -> Self {
        Quaternion::identity()
    }
}

/// Failure to encode a message. The sink is never written when encoding fails.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("IO: {0}")]
    Io(#[from] io::Error),
    #[error("variable block `{block}` has {count} records, at most 255 fit the count byte")]
    TooManyRecords { block: &'static str, count: usize },
    #[error("variable field `{field}` is {len} bytes long, the length prefix allows {max}")]
    VariableTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("quaternion field `{field}` has zero norm and cannot be normalized")]
    DegenerateQuaternion { field: &'static str },
    #[error("message `{message}` is not supported by this build")]
    Unsupported { message: &'static str },
}

/// Failure to decode a message.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Reading the named field (`Message.Block.Field`) failed, usually on a short input.
    #[error("reading `{field}`: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("IO: {0}")]
    Io(#[from] io::Error),
    #[error("unknown message number {0:#x}")]
    UnknownMessageNumber(u32),
    #[error("message `{message}` is not supported by this build")]
    Unsupported { message: &'static str },
}

impl ReadError {
    /// Path of the field being read when the error happened.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ReadError::Field { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// One block record: the fields of a block, encoded in declaration order.
pub trait Block: Sized {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), WriteError>;
    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self, ReadError>;
}

/// A complete message: identifier bytes followed by its blocks.
pub trait Message: Sized {
    const NAME: &'static str;
    /// Identifier bytes read as a big-endian integer.
    const NUMBER: u32;
    const FREQUENCY: Frequency;
    const ID_BYTES: &'static [u8];

    /// Append identifier and body to `buffer`.
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), WriteError>;

    /// Read the body. The identifier must already have been consumed.
    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self, ReadError>;

    fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
        let mut buffer = Vec::new();
        self.encode(&mut buffer)?;
        Ok(buffer)
    }

    /// Encode fully, then hand the bytes to `sink` in a single write.
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), WriteError> {
        let buffer = self.to_bytes()?;
        sink.write_all(&buffer)?;
        Ok(())
    }
}

/// Run `read` and tag an IO failure with the field path.
pub fn read_field<R, T, F>(source: &mut R, field: &'static str, read: F) -> Result<T, ReadError>
where
    R: Read + ?Sized,
    F: FnOnce(&mut R) -> io::Result<T>,
{
    read(source).map_err(|source| ReadError::Field { field, source })
}

/// Read the `N` records of a Multiple block.
pub fn read_records<R, T, const N: usize>(source: &mut R) -> Result<[T; N], ReadError>
where
    R: Read + ?Sized,
    T: Block,
{
    let mut records = Vec::with_capacity(N);
    for _ in 0..N {
        records.push(T::read_from(source)?);
    }
    records.try_into().map_err(|records: Vec<T>| {
        ReadError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("read {} records, expected {}", records.len(), N),
        ))
    })
}

/// Read a message identifier and return the message number.
///
/// A first byte other than 0xFF is a High id. After one 0xFF, a byte other than 0xFF
/// is a Medium id. After two, the next two bytes complete a Low or Fixed id.
pub fn read_message_number<R: Read + ?Sized>(source: &mut R) -> io::Result<u32> {
    let first = source.read_u8()?;
    if first != 0xFF {
        return Ok(u32::from(first));
    }
    let second = source.read_u8()?;
    if second != 0xFF {
        return Ok(0xFF00 | u32::from(second));
    }
    let mut rest = [0u8; 2];
    source.read_exact(&mut rest)?;
    Ok(u32::from_be_bytes([0xFF, 0xFF, rest[0], rest[1]]))
}
