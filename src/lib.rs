//! # msgtemplate: message template compiler
//!
//! Reads a message template (the textual catalog of a virtual-world network protocol)
//! and generates, for every message, a typed Rust record plus exact binary writer and
//! reader code. A PEST line grammar tokenizes the template; brace depth delimits
//! messages; [`codegen`] emits the Rust source with `quote`.
//!
//! ## Template structure
//!
//! ```text
//! version 2.0
//! {
//!     TestMsg High 1 NotTrusted Unencoded
//!     {
//!         TestBlock Single
//!         { Foo U32 }
//!     }
//! }
//! ```
//!
//! - The first significant line is the version tag. `//` starts a comment.
//! - A message header is `name frequency id trust encoding [deprecation]`.
//!   Frequency is `High`, `Medium`, `Low` or `Fixed` and fixes the identifier layout.
//! - A block header is `name quantity [count]` with quantity `Single`,
//!   `Multiple count` or `Variable`.
//! - A field line is `{ name type [count] }`.
//!
//! ## Generated code
//!
//! The TestMsg above becomes a `TestMsg_TestBlock { foo: u32 }` record, a
//! `TestMsg { test_block: TestMsg_TestBlock }` record implementing
//! [`runtime::Message`], and a `MessageInstance::TestMsg` variant. Writing it yields
//! the identifier byte `0x01` followed by `foo` little-endian. Generated code depends
//! only on [`runtime`].
//!
//! ## Usage
//!
//! From a build script:
//!
//! ```no_run
//! let out = std::path::Path::new(&std::env::var("OUT_DIR").unwrap()).join("messages.rs");
//! msgtemplate::driver::generate_file(
//!     std::path::Path::new("message_template.msg"),
//!     &out,
//!     &msgtemplate::GeneratorConfig::default(),
//! )
//! .unwrap();
//! ```
//!
//! then `include!(concat!(env!("OUT_DIR"), "/messages.rs"));` in the crate.

pub mod ast;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod naming;
pub mod normalize;
pub mod parser;
pub mod runtime;
pub mod types;

pub use ast::{Block, Field, Frequency, Message, Quantity, Template};
pub use codegen::{Diagnostic, Generated, Generator, GeneratorConfig};
pub use error::Error;
pub use parser::parse;
pub use types::{LengthPrefix, ProtocolType};

/// Parse `source` and generate code for it in one step.
pub fn generate(source: &str, config: &GeneratorConfig) -> Result<Generated, Error> {
    let generator = Generator::new(config.clone())?;
    let template = parse(source)?;
    generator.generate(&template)
}
