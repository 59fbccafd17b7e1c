//! Record structs for blocks and messages, and the `Message` trait constants.

use super::Generator;
use crate::ast::{Block, Message, Quantity};
use crate::naming;
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

pub(super) fn block_struct(gen: &Generator, block: &Block) -> TokenStream {
    let rt = gen.rt();
    let ident = gen.block_ident(block);
    let doc = format!(" `{}` block of `{}`.", block.name, block.message);
    let fields = block.fields.iter().map(|field| {
        let name = naming::field_ident(&field.name);
        let ty = field.ty.rust_type(rt);
        let doc = format!(" `{}`: {}", field.name, field.ty.tag());
        quote! {
            #[doc = #doc]
            pub #name: #ty
        }
    });
    quote! {
        #[doc = #doc]
        #[allow(non_camel_case_types)]
        #[derive(Clone, Debug, PartialEq)]
        pub struct #ident {
            #(#fields,)*
        }
    }
}

/// Type of the message field holding `block`: one record, `[record; N]`, or `Vec<record>`.
pub(super) fn block_field_type(gen: &Generator, block: &Block) -> TokenStream {
    let ident = gen.block_ident(block);
    match block.quantity {
        Quantity::Single => quote!(#ident),
        Quantity::Multiple(n) => {
            let n = Literal::usize_unsuffixed(n as usize);
            quote!([#ident; #n])
        }
        Quantity::Variable => quote!(Vec<#ident>),
    }
}

pub(super) fn message_struct(gen: &Generator, message: &Message) -> TokenStream {
    let ident = naming::type_ident(&message.name);
    let mut doc = format!(
        " `{}`: {} frequency, id {:#x} (number {:#x}), {}, {}.",
        message.name,
        message.frequency,
        message.id,
        message.number(),
        message.trust,
        message.encoding
    );
    if let Some(tag) = &message.deprecation {
        doc.push_str(&format!(" Deprecation: {}.", tag));
    }
    let fields = message.blocks.iter().map(|block| {
        let name = naming::field_ident(&block.name);
        let ty = block_field_type(gen, block);
        quote!(pub #name: #ty)
    });
    quote! {
        #[doc = #doc]
        #[derive(Clone, Debug, PartialEq)]
        pub struct #ident {
            #(#fields,)*
        }
    }
}

pub(super) fn message_consts(gen: &Generator, message: &Message) -> TokenStream {
    let rt = gen.rt();
    let name = &message.name;
    let number = Literal::u32_unsuffixed(message.number());
    let frequency = format_ident!("{}", message.frequency.as_str());
    let bytes = message
        .id_bytes()
        .into_iter()
        .map(Literal::u8_unsuffixed);
    quote! {
        const NAME: &'static str = #name;
        const NUMBER: u32 = #number;
        const FREQUENCY: #rt::Frequency = #rt::Frequency::#frequency;
        const ID_BYTES: &'static [u8] = &[#(#bytes),*];
    }
}
