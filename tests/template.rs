//! Template parsing: structure, header and field rules, error reporting.

use msgtemplate::{parse, Error, Frequency, LengthPrefix, ProtocolType, Quantity};

const MINIMAL: &str = "version 2.0\n{\n\tTestMsg High 1 NotTrusted Unencoded\n\t{\n\t\tTestBlock Single\n\t\t{ Foo U32 }\n\t}\n}\n";

const CATALOG: &str = r#"
// Message template excerpt
version 2.0

{
	StartPingCheck High 1 NotTrusted Unencoded
	{
		PingID Single
		{ PingID U8 }
		{ OldestUnacked U32 }
	}
}

// Medium with a multiple block and a variable block
{
	ObjectUpdate Medium 12 Trusted Zerocoded
	{
		RegionData Single
		{ RegionHandle U64 }
		{ TimeDilation U16 }
	}
	{
		ObjectData Variable
		{ ID U32 }
		{ TextureEntry Variable 2 }
		{ Data Fixed 60 }
	}
	{
		Corners Multiple 4
		{ Position LLVector3 }
	}
}

{
	TestMessage Low 1 NotTrusted Zerocoded UDPDeprecated
	{
		TestBlock1 Single
		{ Test1 U32 }
	}
}

{
	PacketAck Fixed 0xFFFFFFFB NotTrusted Unencoded
	{
		Packets Variable
		{ ID U32 }
	}
}
"#;

fn structure_line(src: &str) -> usize {
    match parse(src) {
        Err(Error::Structure { line, .. }) => line,
        other => panic!("expected structural error, got {:?}", other),
    }
}

#[test]
fn test_parse_minimal_template() {
    let template = parse(MINIMAL).expect("parse");
    assert_eq!(template.version, "2.0");
    assert_eq!(template.messages.len(), 1);
    let m = &template.messages[0];
    assert_eq!(m.name, "TestMsg");
    assert_eq!(m.frequency, Frequency::High);
    assert_eq!(m.id, 1);
    assert_eq!(m.trust, "NotTrusted");
    assert_eq!(m.encoding, "Unencoded");
    assert_eq!(m.line, 3);
    assert_eq!(m.blocks.len(), 1);
    let b = &m.blocks[0];
    assert_eq!(b.name, "TestBlock");
    assert_eq!(b.quantity, Quantity::Single);
    assert_eq!(b.message, "TestMsg");
    assert_eq!(b.fields.len(), 1);
    assert_eq!(b.fields[0].name, "Foo");
    assert_eq!(b.fields[0].ty, ProtocolType::U32);
    assert_eq!(b.fields[0].line, 6);
}

#[test]
fn test_parse_catalog() {
    let template = parse(CATALOG).expect("parse");
    let names: Vec<_> = template.messages.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["StartPingCheck", "ObjectUpdate", "TestMessage", "PacketAck"]
    );

    let update = template.get_message("ObjectUpdate").expect("ObjectUpdate");
    assert_eq!(update.frequency, Frequency::Medium);
    assert_eq!(update.number(), 0xFF0C);
    let quantities: Vec<_> = update.blocks.iter().map(|b| b.quantity).collect();
    assert_eq!(
        quantities,
        vec![Quantity::Single, Quantity::Variable, Quantity::Multiple(4)]
    );
    let object_data = &update.blocks[1];
    let types: Vec<_> = object_data.fields.iter().map(|f| f.ty).collect();
    assert_eq!(
        types,
        vec![
            ProtocolType::U32,
            ProtocolType::Variable(LengthPrefix::U16),
            ProtocolType::Fixed(60),
        ]
    );

    let test = template.get_message("TestMessage").expect("TestMessage");
    assert_eq!(test.deprecation.as_deref(), Some("UDPDeprecated"));
    assert_eq!(test.id_bytes(), vec![0xFF, 0xFF, 0x00, 0x01]);

    let ack = template.get_message("PacketAck").expect("PacketAck");
    assert_eq!(ack.frequency, Frequency::Fixed);
    assert_eq!(ack.id, 0xFFFF_FFFB);
    assert_eq!(ack.number(), 0xFFFF_FFFB);
}

#[test]
fn test_message_count_matches_depth_zero_regions() {
    let mut src = String::from("version 1\n");
    for i in 1..=20 {
        src.push_str(&format!("{{\nM{} High {} T E\n{{\nB Single\n{{ X U8 }}\n}}\n}}\n", i, i));
    }
    assert_eq!(parse(&src).expect("parse").messages.len(), 20);
}

#[test]
fn test_empty_message_and_empty_block() {
    let src = "version 1\n{\nNothing Low 7 NotTrusted Unencoded\n}\n{\nHollow High 2 T E\n{\nInner Single\n}\n}\n";
    let template = parse(src).expect("parse");
    assert!(template.messages[0].blocks.is_empty());
    assert!(template.messages[1].blocks[0].fields.is_empty());
}

#[test]
fn test_keywords_are_case_insensitive() {
    let src = "VERSION 3\n{\nM hIgH 1 T E\n{\nB multiple 2\n{ X BOOL }\n}\n}\n";
    let template = parse(src).expect("parse");
    assert_eq!(template.version, "3");
    assert_eq!(template.messages[0].frequency, Frequency::High);
    assert_eq!(template.messages[0].blocks[0].quantity, Quantity::Multiple(2));
}

#[test]
fn test_comments_do_not_change_line_numbers() {
    let src = "// header\nversion 2.0\n// one\n// two\n{\n\tBroken Sometimes 1 T E\n}\n";
    match parse(src) {
        Err(Error::UnsupportedFrequency {
            line,
            message,
            frequency,
        }) => {
            assert_eq!(line, 6);
            assert_eq!(message, "Broken");
            assert_eq!(frequency, "Sometimes");
        }
        other => panic!("expected UnsupportedFrequency, got {:?}", other),
    }
}

#[test]
fn test_unbalanced_braces() {
    // Extra closing brace: reported where it appears.
    assert_eq!(structure_line("version 1\n{\nM High 1 T E\n}\n}\n"), 5);
    // Never closed: reported at the opening brace.
    assert_eq!(structure_line("version 1\n{\nM High 1 T E\n{\nB Single\n"), 2);
    // Content between regions.
    assert_eq!(structure_line("version 1\nM High 1 T E\n"), 2);
    // Empty region.
    assert_eq!(structure_line("version 1\n{\n}\n"), 2);
}

#[test]
fn test_malformed_headers() {
    // Too few header tokens.
    assert_eq!(structure_line("version 1\n{\nM High 1 T\n}\n"), 3);
    // Non-numeric id.
    assert_eq!(structure_line("version 1\n{\nM High one T E\n}\n"), 3);
    // Id out of range for the frequency class.
    assert_eq!(structure_line("version 1\n{\nM High 255 T E\n}\n"), 3);
    assert_eq!(structure_line("version 1\n{\nM Low 0x10000 T E\n}\n"), 3);
    // Reserved message name.
    assert_eq!(structure_line("version 1\n{\nimpl High 1 T E\n}\n"), 3);
    // Field before any block header.
    assert_eq!(structure_line("version 1\n{\nM High 1 T E\n{ X U8 }\n}\n"), 4);
}

#[test]
fn test_block_quantity_rules() {
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Multiple\n}\n}\n"),
        5
    );
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Multiple 0\n}\n}\n"),
        5
    );
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Single 3\n}\n}\n"),
        5
    );
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Multiple 4294967295\n}\n}\n"),
        5
    );
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Multiple 256\n}\n}\n"),
        5
    );
    let largest = parse("version 1\n{\nM High 1 T E\n{\nB Multiple 255\n}\n}\n").expect("parse");
    assert_eq!(largest.messages[0].blocks[0].quantity, Quantity::Multiple(255));
    match parse("version 1\n{\nM High 1 T E\n{\nB Sometimes\n}\n}\n") {
        Err(Error::UnsupportedQuantity {
            line,
            block,
            quantity,
        }) => {
            assert_eq!(line, 5);
            assert_eq!(block, "B");
            assert_eq!(quantity, "Sometimes");
        }
        other => panic!("expected UnsupportedQuantity, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_type() {
    let err = parse("version 1\n{\nM High 1 T E\n{\nB Single\n{ Pos LLVector5 }\n}\n}\n")
        .unwrap_err();
    match &err {
        Error::UnknownType { line, tag, field } => {
            assert_eq!(*line, 6);
            assert_eq!(tag, "LLVector5");
            assert_eq!(field, "Pos");
        }
        other => panic!("expected UnknownType, got {:?}", other),
    }
    assert_eq!(err.line(), Some(6));
    assert!(err.to_string().contains("LLVector5"));
}

#[test]
fn test_fixed_needs_size() {
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Single\n{ Data Fixed }\n}\n}\n"),
        6
    );
}

#[test]
fn test_oversized_fixed_field() {
    let src = "version 1\n{\nM High 1 T E\n{\nB Multiple 4\n{ A Fixed 4294967295 }\n{ C Fixed 4294967295 }\n}\n}\n";
    assert_eq!(structure_line(src), 6);
    assert_eq!(
        structure_line("version 1\n{\nM High 1 T E\n{\nB Single\n{ Data Fixed 65536 }\n}\n}\n"),
        6
    );
    let largest = parse("version 1\n{\nM High 1 T E\n{\nB Single\n{ Data Fixed 0xFFFF }\n}\n}\n")
        .expect("parse");
    assert_eq!(
        largest.messages[0].blocks[0].fields[0].ty,
        ProtocolType::Fixed(65535)
    );
}

#[test]
fn test_fixed_ids_keep_both_markers() {
    // The wire bytes [0, 0, 0, 5] would read back as High 0.
    assert_eq!(
        structure_line("version 1\n{\nZero High 0 T E\n}\n{\nOdd Fixed 0x00000005 T E\n}\n"),
        6
    );
    assert_eq!(structure_line("version 1\n{\nOdd Fixed 0xFFFEFFFF T E\n}\n"), 3);
    let lowest = parse("version 1\n{\nEdge Fixed 0xFFFF0000 T E\n}\n").expect("parse");
    assert_eq!(lowest.messages[0].number(), 0xFFFF_0000);
    assert_eq!(lowest.messages[0].id_bytes(), vec![0xFF, 0xFF, 0x00, 0x00]);
}

#[test]
fn test_duplicates_are_rejected() {
    let dup_number = "version 1\n{\nA High 1 T E\n}\n{\nB High 1 T E\n}\n";
    assert!(matches!(
        parse(dup_number),
        Err(Error::Duplicate {
            kind: "message number",
            ..
        })
    ));
    let dup_name = "version 1\n{\nA High 1 T E\n}\n{\nA High 2 T E\n}\n";
    assert!(matches!(
        parse(dup_name),
        Err(Error::Duplicate {
            kind: "message name",
            ..
        })
    ));
    // `AgentID` and `AgentId` both become `agent_id`.
    let dup_field = "version 1\n{\nA High 1 T E\n{\nB Single\n{ AgentID U8 }\n{ AgentId U8 }\n}\n}\n";
    assert!(matches!(
        parse(dup_field),
        Err(Error::Duplicate { kind: "field", .. })
    ));
}

#[test]
fn test_same_block_name_in_two_messages() {
    let src = "version 1\n{\nA High 1 T E\n{\nData Single\n{ X U8 }\n}\n}\n{\nB High 2 T E\n{\nData Single\n{ Y U16 }\n}\n}\n";
    let template = parse(src).expect("parse");
    assert_eq!(template.messages[0].blocks[0].name, "Data");
    assert_eq!(template.messages[1].blocks[0].name, "Data");
}

#[test]
fn test_empty_template() {
    assert!(matches!(parse(""), Err(Error::Structure { .. })));
    assert!(matches!(parse("// only a comment\n"), Err(Error::Structure { .. })));
    // A version line alone is a valid, empty catalog.
    assert!(parse("version 1\n").expect("parse").messages.is_empty());
}

#[test]
fn test_garbage_never_panics() {
    for src in [
        "version 1\n{{{{\n",
        "version 1\n}\n{\n",
        "version 1\n{\n{\n{\n}\n",
        "version 1\n{\n\u{0}\u{1} High 1\n}\n",
        "version 1\n{\nM High 0xFFFFFFFFFF T E\n}\n",
        "version 1\n{\nM High 1 T E\n{\nB Single\n{ }\n}\n}\n",
        "version 1\n{\nM High 1 T E\n{\nB Single\n{ X Fixed 99999999999 }\n}\n}\n",
    ] {
        assert!(parse(src).is_err(), "accepted {:?}", src);
    }
}
