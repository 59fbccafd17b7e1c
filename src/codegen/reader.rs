//! `read_from` bodies, the inverse of the writer.
//!
//! Struct literal fields are evaluated in order, so each body reads straight into
//! `Self { .. }` without temporaries.

use super::{block_path, field_path, Generator};
use crate::ast::{Block, Field, Message, Quantity};
use crate::naming;
use crate::types::{LengthPrefix, ProtocolType};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

pub(super) fn block_read(gen: &Generator, block: &Block) -> TokenStream {
    let reads = block.fields.iter().map(|field| {
        let name = naming::field_ident(&field.name);
        let value = read_field(gen, block, field);
        quote!(#name: #value)
    });
    read_fn(gen, block.fields.is_empty(), reads)
}

pub(super) fn message_read(gen: &Generator, message: &Message) -> TokenStream {
    let reads = message.blocks.iter().map(|block| {
        let name = naming::field_ident(&block.name);
        let value = read_block(gen, block);
        quote!(#name: #value)
    });
    read_fn(gen, message.blocks.is_empty(), reads)
}

fn read_fn(gen: &Generator, empty: bool, reads: impl Iterator<Item = TokenStream>) -> TokenStream {
    let rt = gen.rt();
    let source = if empty { quote!(_source) } else { quote!(source) };
    quote! {
        fn read_from<R: ::std::io::Read + ?Sized>(#source: &mut R) -> Result<Self, #rt::ReadError> {
            Ok(Self {
                #(#reads,)*
            })
        }
    }
}

fn read_block(gen: &Generator, block: &Block) -> TokenStream {
    let rt = gen.rt();
    let ty = gen.block_ident(block);
    let read_one = quote!(<#ty as #rt::Block>::read_from(source)?);
    match block.quantity {
        Quantity::Single => read_one,
        Quantity::Multiple(n) => {
            let n = Literal::usize_unsuffixed(n as usize);
            quote!(#rt::read_records::<_, #ty, #n>(source)?)
        }
        Quantity::Variable => {
            let path = block_path(block);
            quote! {
                {
                    let count = #rt::read_field(source, #path, |source| source.read_u8())?;
                    let mut records = Vec::with_capacity(usize::from(count));
                    for _ in 0..count {
                        records.push(#read_one);
                    }
                    records
                }
            }
        }
    }
}

/// Expression evaluating to the field value, failing with the field path on short input.
fn read_field(gen: &Generator, block: &Block, field: &Field) -> TokenStream {
    let rt = gen.rt();
    let path = field_path(block, field);
    let read = match field.ty {
        ProtocolType::U8 => quote!(source.read_u8()),
        ProtocolType::U16 => quote!(source.read_u16::<LittleEndian>()),
        ProtocolType::U32 => quote!(source.read_u32::<LittleEndian>()),
        ProtocolType::U64 => quote!(source.read_u64::<LittleEndian>()),
        ProtocolType::S8 => quote!(source.read_i8()),
        ProtocolType::S16 => quote!(source.read_i16::<LittleEndian>()),
        ProtocolType::S32 => quote!(source.read_i32::<LittleEndian>()),
        ProtocolType::S64 => quote!(source.read_i64::<LittleEndian>()),
        ProtocolType::F32 => quote!(source.read_f32::<LittleEndian>()),
        ProtocolType::F64 => quote!(source.read_f64::<LittleEndian>()),
        ProtocolType::IpPort => quote!(source.read_u16::<LittleEndian>()),
        ProtocolType::Bool => quote!(Ok(source.read_u8()? == 1)),
        ProtocolType::Uuid => quote! {
            {
                let mut bytes = [0u8; 16];
                source.read_exact(&mut bytes)?;
                Ok(#rt::Uuid::from_bytes(bytes))
            }
        },
        ProtocolType::IpAddr => quote! {
            {
                let mut octets = [0u8; 4];
                source.read_exact(&mut octets)?;
                Ok(#rt::Ipv4Addr::from(octets))
            }
        },
        ProtocolType::Fixed(n) => {
            let n = Literal::usize_unsuffixed(n);
            quote! {
                {
                    let mut bytes = [0u8; #n];
                    source.read_exact(&mut bytes)?;
                    Ok(bytes)
                }
            }
        }
        ProtocolType::Vector3 => quote! {
            Ok(#rt::Vector3::new(
                source.read_f32::<LittleEndian>()?,
                source.read_f32::<LittleEndian>()?,
                source.read_f32::<LittleEndian>()?,
            ))
        },
        ProtocolType::Vector3d => quote! {
            Ok(#rt::Vector3::new(
                source.read_f64::<LittleEndian>()?,
                source.read_f64::<LittleEndian>()?,
                source.read_f64::<LittleEndian>()?,
            ))
        },
        ProtocolType::Vector4 => quote! {
            Ok(#rt::Vector4::new(
                source.read_f32::<LittleEndian>()?,
                source.read_f32::<LittleEndian>()?,
                source.read_f32::<LittleEndian>()?,
                source.read_f32::<LittleEndian>()?,
            ))
        },
        // Only i, j, k are on the wire; the real part is taken as 1.
        ProtocolType::Quaternion => quote! {
            {
                let i = source.read_f32::<LittleEndian>()?;
                let j = source.read_f32::<LittleEndian>()?;
                let k = source.read_f32::<LittleEndian>()?;
                Ok(#rt::Quaternion::from_parts(1.0, i, j, k))
            }
        },
        ProtocolType::Variable(prefix) => {
            let len = match prefix {
                LengthPrefix::U8 => quote!(usize::from(source.read_u8()?)),
                LengthPrefix::U16 => quote!(usize::from(source.read_u16::<LittleEndian>()?)),
            };
            quote! {
                {
                    let len = #len;
                    let mut bytes = vec![0u8; len];
                    source.read_exact(&mut bytes)?;
                    Ok(bytes)
                }
            }
        }
    };
    quote!(#rt::read_field(source, #path, |source| #read)?)
}
