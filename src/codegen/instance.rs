//! The tagged union over all messages and the number-keyed dispatch table.

use super::Generator;
use crate::ast::Template;
use crate::naming;
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use std::collections::BTreeSet;

/// `MessageType`, `MessageInstance` and `dispatch`. Messages in `skipped` have no
/// codec; their read and write arms fail with `Unsupported`.
pub(super) fn emit(gen: &Generator, template: &Template, skipped: &BTreeSet<&str>) -> TokenStream {
    let rt = gen.rt();
    let messages = &template.messages;
    let idents: Vec<_> = messages.iter().map(|m| naming::type_ident(&m.name)).collect();
    let names: Vec<_> = messages.iter().map(|m| m.name.as_str()).collect();
    let numbers: Vec<_> = messages
        .iter()
        .map(|m| Literal::u32_unsuffixed(m.number()))
        .collect();
    let frequencies: Vec<_> = messages
        .iter()
        .map(|m| format_ident!("{}", m.frequency.as_str()))
        .collect();
    let trusts: Vec<_> = messages.iter().map(|m| m.trust.as_str()).collect();
    let encodings: Vec<_> = messages.iter().map(|m| m.encoding.as_str()).collect();

    let write_arms = messages.iter().zip(&idents).map(|(m, ident)| {
        let name = &m.name;
        if skipped.contains(name.as_str()) {
            quote! {
                MessageInstance::#ident(_) => Err(#rt::WriteError::Unsupported { message: #name })
            }
        } else {
            quote! {
                MessageInstance::#ident(ref message) => #rt::Message::write_to(message, sink)
            }
        }
    });
    let dispatch_arms = messages.iter().zip(&idents).map(|(m, ident)| {
        let name = &m.name;
        let number = Literal::u32_unsuffixed(m.number());
        if skipped.contains(name.as_str()) {
            quote! {
                #number => Err(#rt::ReadError::Unsupported { message: #name })
            }
        } else {
            quote! {
                #number => Ok(MessageInstance::#ident(<#ident as #rt::Message>::read_from(source)?))
            }
        }
    });
    let sink = if messages.is_empty() { quote!(_sink) } else { quote!(sink) };
    let source = if messages.is_empty() { quote!(_source) } else { quote!(source) };

    quote! {
        /// Kind of a message, without its payload.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum MessageType {
            #(#idents,)*
        }

        impl MessageType {
            /// Every message type in template order.
            pub const ALL: &'static [MessageType] = &[#(MessageType::#idents),*];

            pub fn name(self) -> &'static str {
                match self {
                    #(MessageType::#idents => #names,)*
                }
            }

            /// Identifier bytes read as a big-endian integer; the key of [`dispatch`].
            pub fn number(self) -> u32 {
                match self {
                    #(MessageType::#idents => #numbers,)*
                }
            }

            pub fn frequency(self) -> #rt::Frequency {
                match self {
                    #(MessageType::#idents => #rt::Frequency::#frequencies,)*
                }
            }

            pub fn trust(self) -> &'static str {
                match self {
                    #(MessageType::#idents => #trusts,)*
                }
            }

            pub fn encoding(self) -> &'static str {
                match self {
                    #(MessageType::#idents => #encodings,)*
                }
            }

            pub fn from_number(number: u32) -> Option<MessageType> {
                match number {
                    #(#numbers => Some(MessageType::#idents),)*
                    _ => None,
                }
            }
        }

        /// Any one decoded message.
        #[derive(Clone, Debug, PartialEq)]
        pub enum MessageInstance {
            #(#idents(#idents),)*
        }

        impl MessageInstance {
            pub fn message_type(&self) -> MessageType {
                match *self {
                    #(MessageInstance::#idents(_) => MessageType::#idents,)*
                }
            }

            /// Write identifier and body to `sink` in a single write.
            pub fn write_to<W: ::std::io::Write + ?Sized>(&self, #sink: &mut W) -> Result<(), #rt::WriteError> {
                match *self {
                    #(#write_arms,)*
                }
            }

            /// Read an identifier from `source`, then the body of the message it names.
            pub fn read_from<R: ::std::io::Read + ?Sized>(source: &mut R) -> Result<MessageInstance, #rt::ReadError> {
                let number = #rt::read_message_number(source)?;
                dispatch(number, source)
            }
        }

        #(
            impl From<#idents> for MessageInstance {
                fn from(message: #idents) -> Self {
                    MessageInstance::#idents(message)
                }
            }
        )*

        /// Read the body of message `number` from `source`. The identifier must already
        /// have been consumed. Unknown numbers fail without reading anything.
        pub fn dispatch<R: ::std::io::Read + ?Sized>(number: u32, #source: &mut R) -> Result<MessageInstance, #rt::ReadError> {
            match number {
                #(#dispatch_arms,)*
                other => Err(#rt::ReadError::UnknownMessageNumber(other)),
            }
        }
    }
}
