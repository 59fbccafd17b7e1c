//! Identifier rules for generated code.
//!
//! Field and block names are converted from the template's CamelCase to snake_case;
//! a trailing `_` is appended when the result is a Rust reserved word. Block record
//! types are named after their message and block to keep same-named blocks of
//! different messages apart.

use proc_macro2::Ident;
use quote::format_ident;

/// Rust keywords (strict, reserved, and weak ones that break field syntax).
const RESERVED: &[&str] = &[
    "_", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Names generated code uses unqualified; a generated type with one of these names would shadow it.
const GENERATED_SCOPE: &[&str] = &[
    "Vec", "Result", "Option", "Ok", "Err", "Some", "None", "From", "Self", "LittleEndian",
    "ReadBytesExt", "WriteBytesExt", "MessageType", "MessageInstance", "bool", "char", "str",
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
    "f32", "f64",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Whether a generated type named `name` would shadow a name the generated module relies on.
pub fn shadows_generated(name: &str) -> bool {
    GENERATED_SCOPE.contains(&name)
}

/// CamelCase to snake_case, splitting acronyms the way `AgentID` -> `agent_id`
/// and `IDBlock` -> `id_block`.
pub fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let after_word = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_acronym = prev.is_ascii_uppercase() && next_lower;
            if after_word || ends_acronym {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Generated field name for a template field or block name.
pub fn field_name(name: &str) -> String {
    let snake = underscore(name);
    if is_reserved(&snake) {
        format!("{}_", snake)
    } else {
        snake
    }
}

pub fn field_ident(name: &str) -> Ident {
    format_ident!("{}", field_name(name))
}

pub fn type_ident(name: &str) -> Ident {
    format_ident!("{}", name)
}

/// Record type name of a block: `{message}{separator}{block}`.
pub fn block_type_name(message: &str, block: &str, separator: &str) -> String {
    format!("{}{}{}", message, separator, block)
}

/// Whether `s` can be used where a Rust identifier fragment is expected.
pub fn is_ident_fragment(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_splits_words_and_acronyms() {
        assert_eq!(underscore("Foo"), "foo");
        assert_eq!(underscore("RegionHandle"), "region_handle");
        assert_eq!(underscore("AgentID"), "agent_id");
        assert_eq!(underscore("IDBlock"), "id_block");
        assert_eq!(underscore("Test1"), "test1");
        assert_eq!(underscore("GlobalX"), "global_x");
        assert_eq!(underscore("UUIDNameBlock"), "uuid_name_block");
        assert_eq!(underscore("already_snake"), "already_snake");
    }

    #[test]
    fn reserved_words_get_suffix() {
        assert_eq!(field_name("Type"), "type_");
        assert_eq!(field_name("Override"), "override_");
        assert_eq!(field_name("Final"), "final_");
        assert_eq!(field_name("Match"), "match_");
        assert_eq!(field_name("Types"), "types");
    }

    #[test]
    fn block_types_join_message_and_block() {
        assert_eq!(block_type_name("TestMsg", "TestBlock", "_"), "TestMsg_TestBlock");
        assert_eq!(block_type_name("TestMsg", "TestBlock", ""), "TestMsgTestBlock");
        assert!(shadows_generated("MessageInstance"));
        assert!(!shadows_generated("TestMsg"));
        assert!(shadows_generated("u8"));
        assert!(shadows_generated("usize"));
        assert!(shadows_generated("bool"));
        assert!(!shadows_generated("U8"));
        assert!(is_ident_fragment("_"));
        assert!(!is_ident_fragment("::"));
    }
}
