//! Code generator: turns a parsed [`Template`] into Rust source.
//!
//! The output is a single token stream meant to be `include!`d (or written to a module
//! file). It contains, in order: the runtime prelude import and template version, one
//! record struct per block and per message with their codec impls, and the
//! `MessageType` / `MessageInstance` / `dispatch` surface.

mod instance;
mod reader;
mod structs;
mod writer;

use crate::ast::{Block, Field, Message, Template};
use crate::error::Error;
use crate::naming;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// How generated code is shaped.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Path through which generated code reaches [`crate::runtime`].
    pub runtime_path: String,
    /// Joins message and block names into block record type names.
    pub block_separator: String,
    /// Type tags (`LLQuaternion`, `IPADDR`, ...) without a codec in the target build.
    /// Messages using any of them get record types but no reader or writer.
    pub disabled_types: BTreeSet<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            runtime_path: "::msgtemplate::runtime".to_string(),
            block_separator: "_".to_string(),
            disabled_types: BTreeSet::new(),
        }
    }
}

/// A message whose codec was not generated, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub tag: String,
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message `{}` skipped: {}", self.message, self.reason)
    }
}

/// Result of one generator run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub version: String,
    pub tokens: TokenStream,
    /// Number of messages in the template (skipped ones included).
    pub messages: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    /// Generated source with its header comment.
    pub fn to_source(&self) -> String {
        format!(
            "// Generated by msgtemplate from template version {}. Do not edit.\n{}\n",
            self.version, self.tokens
        )
    }
}

pub struct Generator {
    config: GeneratorConfig,
    rt: TokenStream,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, Error> {
        let path = config.runtime_path.trim();
        if path.is_empty() {
            return Err(Error::Config("runtime path is empty".to_string()));
        }
        let rt = TokenStream::from_str(path).map_err(|e| {
            Error::Config(format!("runtime path `{}` is not a Rust path: {}", path, e))
        })?;
        if !naming::is_ident_fragment(&config.block_separator) {
            return Err(Error::Config(format!(
                "block separator `{}` cannot appear in an identifier",
                config.block_separator
            )));
        }
        Ok(Generator { config, rt })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Tokens of the runtime module path.
    pub(crate) fn rt(&self) -> &TokenStream {
        &self.rt
    }

    pub(crate) fn block_ident(&self, block: &Block) -> Ident {
        naming::type_ident(&self.block_type_name(block))
    }

    fn block_type_name(&self, block: &Block) -> String {
        naming::block_type_name(&block.message, &block.name, &self.config.block_separator)
    }

    /// The first disabled type tag used by `message`, as a diagnostic.
    fn skip_reason(&self, message: &Message) -> Option<Diagnostic> {
        message
            .blocks
            .iter()
            .flat_map(|b| b.fields.iter())
            .map(|f: &Field| f.ty.tag())
            .find(|tag| self.config.disabled_types.contains(*tag))
            .map(|tag| Diagnostic {
                message: message.name.clone(),
                tag: tag.to_string(),
                reason: format!("no codec for field type `{}` in this build", tag),
            })
    }

    /// Every generated type name must be unique and must not shadow names the output relies on.
    fn check_type_names(&self, template: &Template) -> Result<(), Error> {
        let mut seen: HashMap<String, String> = HashMap::new();
        for m in &template.messages {
            let names = std::iter::once((m.name.clone(), m.name.clone(), m.line)).chain(
                m.blocks.iter().map(|b| {
                    (self.block_type_name(b), format!("{}.{}", m.name, b.name), b.line)
                }),
            );
            for (type_name, origin, line) in names {
                if naming::shadows_generated(&type_name) {
                    return Err(Error::structure(
                        line,
                        format!("type name `{}` of `{}` clashes with a generated name", type_name, origin),
                    ));
                }
                if let Some(other) = seen.insert(type_name.clone(), origin.clone()) {
                    return Err(Error::Duplicate {
                        kind: "generated type",
                        name: format!("{} ({} and {})", type_name, other, origin),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn generate(&self, template: &Template) -> Result<Generated, Error> {
        self.check_type_names(template)?;
        let rt = &self.rt;

        let mut diagnostics = Vec::new();
        let mut items = Vec::with_capacity(template.messages.len());
        for message in &template.messages {
            let skipped = self.skip_reason(message);
            match &skipped {
                Some(d) => {
                    warn!(name = %d.message, tag = %d.tag, "{}", d);
                }
                None => debug!(
                    name = %message.name,
                    number = message.number(),
                    blocks = message.blocks.len(),
                    fields = message.field_count(),
                    "generating message"
                ),
            }
            items.push(self.message_items(message, skipped.is_none()));
            diagnostics.extend(skipped);
        }

        let skipped: BTreeSet<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        let surface = instance::emit(self, template, &skipped);
        let version = &template.version;
        let tokens = quote! {
            #[allow(unused_imports)]
            use #rt::prelude::*;

            /// Version tag of the template this module was generated from.
            pub const TEMPLATE_VERSION: &str = #version;

            #(#items)*

            #surface
        };

        info!(
            version = %template.version,
            messages = template.messages.len(),
            skipped = diagnostics.len(),
            "generated message codecs"
        );
        Ok(Generated {
            version: template.version.clone(),
            tokens,
            messages: template.messages.len(),
            diagnostics,
        })
    }

    /// Record types of one message, plus their codec impls when `with_codec`.
    fn message_items(&self, message: &Message, with_codec: bool) -> TokenStream {
        let rt = &self.rt;
        let blocks = message.blocks.iter().map(|block| {
            let record = structs::block_struct(self, block);
            if !with_codec {
                return record;
            }
            let ident = self.block_ident(block);
            let encode = writer::block_encode(self, block);
            let read = reader::block_read(self, block);
            quote! {
                #record
                impl #rt::Block for #ident {
                    #encode
                    #read
                }
            }
        });
        let record = structs::message_struct(self, message);
        let codec = if with_codec {
            let ident = naming::type_ident(&message.name);
            let consts = structs::message_consts(self, message);
            let encode = writer::message_encode(self, message);
            let read = reader::message_read(self, message);
            quote! {
                impl #rt::Message for #ident {
                    #consts
                    #encode
                    #read
                }
            }
        } else {
            TokenStream::new()
        };
        quote! {
            #(#blocks)*
            #record
            #codec
        }
    }
}

/// `Message.Block.Field` path used in errors of generated code.
pub(crate) fn field_path(block: &Block, field: &Field) -> String {
    format!("{}.{}.{}", block.message, block.name, field.name)
}

/// `Message.Block` path used in errors about a block's records.
pub(crate) fn block_path(block: &Block) -> String {
    format!("{}.{}", block.message, block.name)
}
