//! Parse message template source into the data model.
//!
//! Parsing runs in two passes over the normalized lines. The first tracks brace depth
//! and cuts the stream into depth-0 message regions; the second splits each region
//! into its header and blocks. Individual lines are tokenized with the PEST line
//! grammar in `grammar.pest`.

use crate::ast::*;
use crate::error::Error;
use crate::naming;
use crate::normalize::{self, Line};
use crate::types::ProtocolType;
use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser as PestParser;
use tracing::debug;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct TemplateParser;

/// Parse template source into a [`Template`].
pub fn parse(source: &str) -> Result<Template, Error> {
    let normalized = normalize::normalize(source)?;
    let version = parse_version(&normalized.version)?;
    let messages = parse_lines(&normalized.lines)?;
    let template = Template { version, messages };
    template.check_unique()?;
    debug!(
        version = %template.version,
        messages = template.messages.len(),
        "parsed template"
    );
    Ok(template)
}

/// Parse the structural lines that follow the version line.
pub fn parse_lines(lines: &[Line]) -> Result<Vec<Message>, Error> {
    segment_messages(lines)?
        .iter()
        .map(|region| extract_message(region))
        .collect()
}

/// Lines of one depth-0 brace region, without its outer braces.
#[derive(Debug)]
struct Region<'a> {
    open_line: usize,
    lines: Vec<&'a Line>,
}

/// Cut the line stream into message regions by brace depth.
///
/// Only lines consisting solely of `{` or `}` change the depth; field lines such as
/// `{ Foo U32 }` are ordinary content.
fn segment_messages(lines: &[Line]) -> Result<Vec<Region<'_>>, Error> {
    let mut regions = Vec::new();
    let mut current: Option<Region> = None;
    let mut depth = 0usize;

    for line in lines {
        match line.text.as_str() {
            "{" => {
                if depth == 0 {
                    current = Some(Region {
                        open_line: line.number,
                        lines: Vec::new(),
                    });
                } else if let Some(region) = current.as_mut() {
                    region.lines.push(line);
                }
                depth += 1;
            }
            "}" => {
                if depth == 0 {
                    return Err(Error::structure(
                        line.number,
                        "unbalanced `}`: no open region to close",
                    ));
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(region) = current.take() {
                        regions.push(region);
                    }
                } else if let Some(region) = current.as_mut() {
                    region.lines.push(line);
                }
            }
            text => match current.as_mut() {
                Some(region) => region.lines.push(line),
                None => {
                    return Err(Error::structure(
                        line.number,
                        format!("`{}` outside of a message region", text),
                    ))
                }
            },
        }
    }

    if let Some(region) = current {
        return Err(Error::structure(
            region.open_line,
            "unbalanced `{`: message region is never closed",
        ));
    }
    Ok(regions)
}

fn extract_message(region: &Region) -> Result<Message, Error> {
    let (header, rest) = region.lines.split_first().ok_or_else(|| {
        Error::structure(region.open_line, "empty message region: missing message header")
    })?;
    let mut message = parse_message_header(header)?;

    // Drop the braces enclosing the block list.
    let mut body: &[&Line] = rest;
    if let Some((first, tail)) = body.split_first() {
        if first.text == "{" {
            body = tail;
        }
    }
    if let Some((last, init)) = body.split_last() {
        if last.text == "}" {
            body = init;
        }
    }

    let mut block_header: Option<&Line> = None;
    let mut field_lines: Vec<&Line> = Vec::new();
    for line in body {
        let text = line.text.as_str();
        if text == "{" || text == "}" {
            continue;
        }
        if text.starts_with('{') {
            if block_header.is_none() {
                return Err(Error::structure(
                    line.number,
                    "field line before any block header",
                ));
            }
            field_lines.push(line);
        } else {
            if let Some(h) = block_header.take() {
                message
                    .blocks
                    .push(extract_block(h, &field_lines, &message.name)?);
                field_lines.clear();
            }
            block_header = Some(line);
        }
    }
    if let Some(h) = block_header {
        message
            .blocks
            .push(extract_block(h, &field_lines, &message.name)?);
    }
    Ok(message)
}

fn parse_message_header(line: &Line) -> Result<Message, Error> {
    let tokens = line_tokens(Rule::message_header, line, "message header")?;
    let mut it = tokens.into_iter();
    let mut next = |what: &str| {
        it.next()
            .ok_or_else(|| Error::structure(line.number, format!("message header: missing {}", what)))
    };
    let name = next("name")?;
    let frequency_tag = next("frequency")?;
    let id_tag = next("id")?;
    let trust = next("trust")?;
    let encoding = next("encoding")?;
    let deprecation = it.next().map(str::to_string);

    if naming::is_reserved(name) {
        return Err(Error::structure(
            line.number,
            format!("message name `{}` is a reserved word", name),
        ));
    }
    let frequency: Frequency = frequency_tag.parse().map_err(|_| Error::UnsupportedFrequency {
        line: line.number,
        message: name.to_string(),
        frequency: frequency_tag.to_string(),
    })?;
    let id = parse_number(id_tag).ok_or_else(|| {
        Error::structure(line.number, format!("message id `{}` is out of range", id_tag))
    })?;
    if id < frequency.min_id() {
        return Err(Error::structure(
            line.number,
            format!(
                "message id {} is below {:#x}, the smallest {} id",
                id_tag,
                frequency.min_id(),
                frequency
            ),
        ));
    }
    if id > frequency.max_id() {
        return Err(Error::structure(
            line.number,
            format!(
                "message id {} exceeds {:#x}, the largest {} id",
                id_tag,
                frequency.max_id(),
                frequency
            ),
        ));
    }

    Ok(Message {
        name: name.to_string(),
        frequency,
        id,
        trust: trust.to_string(),
        encoding: encoding.to_string(),
        deprecation,
        blocks: Vec::new(),
        line: line.number,
    })
}

fn extract_block(header: &Line, fields: &[&Line], message: &str) -> Result<Block, Error> {
    let tokens = line_tokens(Rule::block_header, header, "block header")?;
    let mut it = tokens.into_iter();
    let name = it
        .next()
        .ok_or_else(|| Error::structure(header.number, "block header: missing name"))?;
    let quantity_tag = it
        .next()
        .ok_or_else(|| Error::structure(header.number, "block header: missing quantity"))?;
    let count = match it.next() {
        Some(tag) => Some(parse_number(tag).ok_or_else(|| {
            Error::structure(header.number, format!("repeat count `{}` is out of range", tag))
        })?),
        None => None,
    };

    let quantity = match (quantity_tag.to_ascii_lowercase().as_str(), count) {
        ("single", None) => Quantity::Single,
        ("variable", None) => Quantity::Variable,
        ("multiple", Some(n)) if n > MAX_REPEAT_COUNT => {
            return Err(Error::structure(
                header.number,
                format!(
                    "Multiple block `{}` repeats {} times, at most {} are allowed",
                    name, n, MAX_REPEAT_COUNT
                ),
            ))
        }
        ("multiple", Some(n)) if n > 0 => Quantity::Multiple(n),
        ("multiple", _) => {
            return Err(Error::structure(
                header.number,
                format!("Multiple block `{}` needs a positive repeat count", name),
            ))
        }
        ("single" | "variable", Some(_)) => {
            return Err(Error::structure(
                header.number,
                format!("{} block `{}` must not carry a repeat count", quantity_tag, name),
            ))
        }
        _ => {
            return Err(Error::UnsupportedQuantity {
                line: header.number,
                block: name.to_string(),
                quantity: quantity_tag.to_string(),
            })
        }
    };

    let fields = fields
        .iter()
        .map(|line| parse_field(line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Block {
        name: name.to_string(),
        quantity,
        fields,
        message: message.to_string(),
        line: header.number,
    })
}

fn parse_field(line: &Line) -> Result<Field, Error> {
    let pairs = TemplateParser::parse(Rule::field_line, &line.text)
        .map_err(|e| syntax_error(line, "field line", e))?;
    let mut name = None;
    let mut tag = None;
    let mut count = 0u32;
    for pair in pairs.flat_map(|p| p.into_inner()) {
        match pair.as_rule() {
            Rule::ident if name.is_none() => name = Some(pair.as_str()),
            Rule::ident => tag = Some(pair.as_str()),
            Rule::number => {
                count = parse_number(pair.as_str()).ok_or_else(|| {
                    Error::structure(
                        line.number,
                        format!("field count `{}` is out of range", pair.as_str()),
                    )
                })?
            }
            // Trailing flag (the closing brace in practice) is not part of the model.
            _ => {}
        }
    }
    let name = name.ok_or_else(|| Error::structure(line.number, "field line: missing name"))?;
    let tag = tag.ok_or_else(|| Error::structure(line.number, "field line: missing type"))?;

    let ty = ProtocolType::resolve(tag, count).ok_or_else(|| Error::UnknownType {
        line: line.number,
        tag: tag.to_string(),
        field: name.to_string(),
    })?;
    match ty {
        ProtocolType::Fixed(0) => {
            return Err(Error::structure(
                line.number,
                format!("Fixed field `{}` needs a positive byte count", name),
            ))
        }
        ProtocolType::Fixed(n) if n > MAX_FIXED_SIZE as usize => {
            return Err(Error::structure(
                line.number,
                format!(
                    "Fixed field `{}` is {} bytes long, at most {} are allowed",
                    name, n, MAX_FIXED_SIZE
                ),
            ))
        }
        _ => {}
    }
    Ok(Field {
        name: name.to_string(),
        ty,
        line: line.number,
    })
}

fn parse_version(line: &Line) -> Result<String, Error> {
    let pairs = TemplateParser::parse(Rule::version_line, &line.text)
        .map_err(|e| syntax_error(line, "version line", e))?;
    pairs
        .flat_map(|p| p.into_inner())
        .find(|p| p.as_rule() == Rule::version_tag)
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| Error::structure(line.number, "version line: missing version tag"))
}

/// Match `line` against `rule` and return the matched token texts in order.
fn line_tokens<'a>(rule: Rule, line: &'a Line, what: &str) -> Result<Vec<&'a str>, Error> {
    let pairs = TemplateParser::parse(rule, &line.text).map_err(|e| syntax_error(line, what, e))?;
    Ok(pairs
        .flat_map(|p| p.into_inner())
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| p.as_str())
        .collect())
}

fn syntax_error(line: &Line, what: &str, e: pest::error::Error<Rule>) -> Error {
    let column = match e.line_col {
        LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
    };
    Error::structure(
        line.number,
        format!(
            "malformed {} `{}` at column {}: {}",
            what,
            line.text,
            column,
            e.variant.message()
        ),
    )
}

/// Decimal or `0x`-prefixed hexadecimal u32.
fn parse_number(s: &str) -> Option<u32> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(number: usize, text: &str) -> Line {
        Line {
            number,
            text: text.to_string(),
        }
    }

    #[test]
    fn segments_depth_zero_regions() {
        let lines: Vec<Line> = ["{", "A High 1 T E", "}", "{", "B High 2 T E", "{", "X Single", "}", "}"]
            .iter()
            .enumerate()
            .map(|(i, t)| line(i + 2, t))
            .collect();
        let regions = segment_messages(&lines).expect("segment");
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].lines.len(), 1);
        assert_eq!(regions[1].lines.len(), 4);
        assert_eq!(regions[1].open_line, 5);
    }

    #[test]
    fn extra_closing_brace_reports_its_line() {
        let lines = vec![line(2, "{"), line(3, "A High 1 T E"), line(4, "}"), line(5, "}")];
        match segment_messages(&lines) {
            Err(Error::Structure { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected structure error, got {:?}", other),
        }
    }

    #[test]
    fn unclosed_region_reports_opening_line() {
        let lines = vec![line(2, "{"), line(3, "A High 1 T E"), line(4, "{")];
        match segment_messages(&lines) {
            Err(Error::Structure { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected structure error, got {:?}", other),
        }
    }

    #[test]
    fn numbers_accept_hex_and_decimal() {
        assert_eq!(parse_number("17"), Some(17));
        assert_eq!(parse_number("0xFFFFFFFB"), Some(0xFFFF_FFFB));
        assert_eq!(parse_number("0x1_0"), None);
        assert_eq!(parse_number("4294967296"), None);
    }

    #[test]
    fn field_line_tokens() {
        let f = parse_field(&line(9, "{\tData\tFixed\t32\t}")).expect("field");
        assert_eq!(f.name, "Data");
        assert_eq!(f.ty, ProtocolType::Fixed(32));
        let f = parse_field(&line(9, "{ Foo U32 }")).expect("field");
        assert_eq!(f.ty, ProtocolType::U32);
    }

    #[test]
    fn version_keyword_is_optional() {
        assert_eq!(parse_version(&line(1, "version 2.0")).unwrap(), "2.0");
        assert_eq!(parse_version(&line(1, "3.1")).unwrap(), "3.1");
    }
}
