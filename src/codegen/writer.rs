//! `encode` bodies: fields little-endian in declaration order, blocks by quantity.

use super::{block_path, field_path, Generator};
use crate::ast::{Block, Field, Message, Quantity};
use crate::naming;
use crate::types::{LengthPrefix, ProtocolType};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

pub(super) fn block_encode(gen: &Generator, block: &Block) -> TokenStream {
    let rt = gen.rt();
    let writes = block.fields.iter().map(|field| write_field(gen, block, field));
    let buffer = if block.fields.is_empty() {
        quote!(_buffer)
    } else {
        quote!(buffer)
    };
    quote! {
        fn encode(&self, #buffer: &mut Vec<u8>) -> Result<(), #rt::WriteError> {
            #(#writes)*
            Ok(())
        }
    }
}

pub(super) fn message_encode(gen: &Generator, message: &Message) -> TokenStream {
    let rt = gen.rt();
    let size_hint = Literal::usize_unsuffixed(message.size_hint());
    let writes = message.blocks.iter().map(|block| write_block(gen, block));
    quote! {
        fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), #rt::WriteError> {
            buffer.reserve(#size_hint);
            buffer.extend_from_slice(Self::ID_BYTES);
            #(#writes)*
            Ok(())
        }
    }
}

fn write_block(gen: &Generator, block: &Block) -> TokenStream {
    let rt = gen.rt();
    let name = naming::field_ident(&block.name);
    match block.quantity {
        Quantity::Single => quote! {
            #rt::Block::encode(&self.#name, buffer)?;
        },
        Quantity::Multiple(_) => quote! {
            for record in &self.#name {
                #rt::Block::encode(record, buffer)?;
            }
        },
        Quantity::Variable => {
            let path = block_path(block);
            quote! {
                let count = u8::try_from(self.#name.len()).map_err(|_| #rt::WriteError::TooManyRecords {
                    block: #path,
                    count: self.#name.len(),
                })?;
                buffer.push(count);
                for record in &self.#name {
                    #rt::Block::encode(record, buffer)?;
                }
            }
        }
    }
}

fn write_field(gen: &Generator, block: &Block, field: &Field) -> TokenStream {
    let rt = gen.rt();
    let name = naming::field_ident(&field.name);
    let v = quote!(self.#name);
    match field.ty {
        ProtocolType::U8 => quote!(buffer.write_u8(#v)?;),
        ProtocolType::U16 => quote!(buffer.write_u16::<LittleEndian>(#v)?;),
        ProtocolType::U32 => quote!(buffer.write_u32::<LittleEndian>(#v)?;),
        ProtocolType::U64 => quote!(buffer.write_u64::<LittleEndian>(#v)?;),
        ProtocolType::S8 => quote!(buffer.write_i8(#v)?;),
        ProtocolType::S16 => quote!(buffer.write_i16::<LittleEndian>(#v)?;),
        ProtocolType::S32 => quote!(buffer.write_i32::<LittleEndian>(#v)?;),
        ProtocolType::S64 => quote!(buffer.write_i64::<LittleEndian>(#v)?;),
        ProtocolType::F32 => quote!(buffer.write_f32::<LittleEndian>(#v)?;),
        ProtocolType::F64 => quote!(buffer.write_f64::<LittleEndian>(#v)?;),
        ProtocolType::IpPort => quote!(buffer.write_u16::<LittleEndian>(#v)?;),
        ProtocolType::Bool => quote!(buffer.write_u8(#v as u8)?;),
        ProtocolType::Uuid => quote!(buffer.extend_from_slice(#v.as_bytes());),
        ProtocolType::IpAddr => quote!(buffer.extend_from_slice(&#v.octets());),
        ProtocolType::Fixed(_) => quote!(buffer.extend_from_slice(&#v);),
        ProtocolType::Vector3 => quote! {
            buffer.write_f32::<LittleEndian>(#v.x)?;
            buffer.write_f32::<LittleEndian>(#v.y)?;
            buffer.write_f32::<LittleEndian>(#v.z)?;
        },
        ProtocolType::Vector3d => quote! {
            buffer.write_f64::<LittleEndian>(#v.x)?;
            buffer.write_f64::<LittleEndian>(#v.y)?;
            buffer.write_f64::<LittleEndian>(#v.z)?;
        },
        ProtocolType::Vector4 => quote! {
            buffer.write_f32::<LittleEndian>(#v.x)?;
            buffer.write_f32::<LittleEndian>(#v.y)?;
            buffer.write_f32::<LittleEndian>(#v.z)?;
            buffer.write_f32::<LittleEndian>(#v.w)?;
        },
        ProtocolType::Quaternion => {
            let path = field_path(block, field);
            quote! {
                {
                    let normed = #v
                        .normalize()
                        .ok_or(#rt::WriteError::DegenerateQuaternion { field: #path })?;
                    buffer.write_f32::<LittleEndian>(normed.i)?;
                    buffer.write_f32::<LittleEndian>(normed.j)?;
                    buffer.write_f32::<LittleEndian>(normed.k)?;
                }
            }
        }
        ProtocolType::Variable(prefix) => {
            let path = field_path(block, field);
            let max = Literal::usize_unsuffixed(prefix.max_len());
            let write_len = match prefix {
                LengthPrefix::U8 => quote!(buffer.write_u8(len as u8)?;),
                LengthPrefix::U16 => quote!(buffer.write_u16::<LittleEndian>(len as u16)?;),
            };
            quote! {
                {
                    let len = #v.len();
                    if len > #max {
                        return Err(#rt::WriteError::VariableTooLong {
                            field: #path,
                            len,
                            max: #max,
                        });
                    }
                    #write_len
                    buffer.extend_from_slice(&#v);
                }
            }
        }
    }
}
