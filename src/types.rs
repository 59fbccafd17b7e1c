//! Protocol primitive types and their Rust representation.
//!
//! Every primitive a template may name is one variant of [`ProtocolType`]; the
//! writer and reader emitters match on it exhaustively, so a new primitive is a
//! new variant here plus one arm in each emitter.

use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// Width of the little-endian length prefix in front of a `Variable` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthPrefix {
    U8,
    U16,
}

impl LengthPrefix {
    /// Template count `2` selects a 16-bit prefix; anything else (including none) an 8-bit one.
    pub fn from_count(count: u32) -> Self {
        if count == 2 {
            LengthPrefix::U16
        } else {
            LengthPrefix::U8
        }
    }

    pub fn size(self) -> usize {
        match self {
            LengthPrefix::U8 => 1,
            LengthPrefix::U16 => 2,
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            LengthPrefix::U8 => u8::MAX as usize,
            LengthPrefix::U16 => u16::MAX as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolType {
    U8,
    U16,
    U32,
    U64,
    S8,
    S16,
    S32,
    S64,
    F32,
    F64,
    /// `LLUUID`: 16 raw bytes.
    Uuid,
    /// `IPADDR`: 4 octets.
    IpAddr,
    /// `IPPORT`: little-endian u16.
    IpPort,
    /// `LLVector3`: three f32.
    Vector3,
    /// `LLVector3d`: three f64.
    Vector3d,
    /// `LLVector4`: four f32.
    Vector4,
    /// `LLQuaternion`: unit quaternion, imaginary parts only on the wire.
    Quaternion,
    Bool,
    /// `Variable`: length-prefixed opaque bytes.
    Variable(LengthPrefix),
    /// `Fixed`: byte array of the given length.
    Fixed(usize),
}

impl ProtocolType {
    /// Resolve a template type tag. `count` is the field's trailing count (0 when absent);
    /// it sizes `Fixed` arrays and selects the `Variable` prefix width.
    pub fn resolve(tag: &str, count: u32) -> Option<Self> {
        let ty = match tag {
            "U8" => ProtocolType::U8,
            "U16" => ProtocolType::U16,
            "U32" => ProtocolType::U32,
            "U64" => ProtocolType::U64,
            "S8" => ProtocolType::S8,
            "S16" => ProtocolType::S16,
            "S32" => ProtocolType::S32,
            "S64" => ProtocolType::S64,
            "F32" => ProtocolType::F32,
            "F64" => ProtocolType::F64,
            "LLUUID" => ProtocolType::Uuid,
            "IPADDR" => ProtocolType::IpAddr,
            "IPPORT" => ProtocolType::IpPort,
            "LLVector3" => ProtocolType::Vector3,
            "LLVector3d" => ProtocolType::Vector3d,
            "LLVector4" => ProtocolType::Vector4,
            "LLQuaternion" => ProtocolType::Quaternion,
            "BOOL" => ProtocolType::Bool,
            "Variable" => ProtocolType::Variable(LengthPrefix::from_count(count)),
            "Fixed" => ProtocolType::Fixed(count as usize),
            _ => return None,
        };
        Some(ty)
    }

    /// The template tag this type was declared with.
    pub fn tag(&self) -> &'static str {
        match self {
            ProtocolType::U8 => "U8",
            ProtocolType::U16 => "U16",
            ProtocolType::U32 => "U32",
            ProtocolType::U64 => "U64",
            ProtocolType::S8 => "S8",
            ProtocolType::S16 => "S16",
            ProtocolType::S32 => "S32",
            ProtocolType::S64 => "S64",
            ProtocolType::F32 => "F32",
            ProtocolType::F64 => "F64",
            ProtocolType::Uuid => "LLUUID",
            ProtocolType::IpAddr => "IPADDR",
            ProtocolType::IpPort => "IPPORT",
            ProtocolType::Vector3 => "LLVector3",
            ProtocolType::Vector3d => "LLVector3d",
            ProtocolType::Vector4 => "LLVector4",
            ProtocolType::Quaternion => "LLQuaternion",
            ProtocolType::Bool => "BOOL",
            ProtocolType::Variable(_) => "Variable",
            ProtocolType::Fixed(_) => "Fixed",
        }
    }

    /// Encoded size in bytes, `None` for `Variable`.
    pub fn wire_size(&self) -> Option<usize> {
        let n = match self {
            ProtocolType::U8 | ProtocolType::S8 | ProtocolType::Bool => 1,
            ProtocolType::U16 | ProtocolType::S16 | ProtocolType::IpPort => 2,
            ProtocolType::U32 | ProtocolType::S32 | ProtocolType::F32 | ProtocolType::IpAddr => 4,
            ProtocolType::U64 | ProtocolType::S64 | ProtocolType::F64 => 8,
            ProtocolType::Uuid => 16,
            ProtocolType::Vector3 | ProtocolType::Quaternion => 12,
            ProtocolType::Vector4 => 16,
            ProtocolType::Vector3d => 24,
            ProtocolType::Fixed(n) => *n,
            ProtocolType::Variable(_) => return None,
        };
        Some(n)
    }

    /// Size of the length prefix (0 for everything but `Variable`).
    pub fn prefix_size(&self) -> usize {
        match self {
            ProtocolType::Variable(prefix) => prefix.size(),
            _ => 0,
        }
    }

    /// Rust type of a field of this type. `rt` is the path of the runtime support module.
    pub fn rust_type(&self, rt: &TokenStream) -> TokenStream {
        match self {
            ProtocolType::U8 => quote!(u8),
            ProtocolType::U16 => quote!(u16),
            ProtocolType::U32 => quote!(u32),
            ProtocolType::U64 => quote!(u64),
            ProtocolType::S8 => quote!(i8),
            ProtocolType::S16 => quote!(i16),
            ProtocolType::S32 => quote!(i32),
            ProtocolType::S64 => quote!(i64),
            ProtocolType::F32 => quote!(f32),
            ProtocolType::F64 => quote!(f64),
            ProtocolType::Uuid => quote!(#rt::Uuid),
            ProtocolType::IpAddr => quote!(#rt::Ipv4Addr),
            ProtocolType::IpPort => quote!(#rt::IpPort),
            ProtocolType::Vector3 => quote!(#rt::Vector3<f32>),
            ProtocolType::Vector3d => quote!(#rt::Vector3<f64>),
            ProtocolType::Vector4 => quote!(#rt::Vector4<f32>),
            ProtocolType::Quaternion => quote!(#rt::Quaternion<f32>),
            ProtocolType::Bool => quote!(bool),
            ProtocolType::Variable(_) => quote!(Vec<u8>),
            ProtocolType::Fixed(n) => {
                let n = Literal::usize_unsuffixed(*n);
                quote!([u8; #n])
            }
        }
    }
}
