use std::sync::{Arc, OnceLock};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tracing_test::traced_test;
use w3_schema::{
    decode, decode_select, decode_with, encode, encode_with, BitOrder, BitPack, Check,
    CodecOptions, Document, Endian, EnumDef, Error, FieldType, FlagsDef, IntKind, Key, Length,
    Ref, Result, Schema, Switch, Value, DEFAULT_MAX_DEPTH,
};

fn int() -> FieldType {
    FieldType::Int(IntKind::I32, Endian::Little)
}

fn variable_type() -> EnumDef {
    EnumDef::new("VariableType", int())
        .variant("INT", 0)
        .variant("REAL", 1)
        .variant("UNREAL", 2)
        .variant("STRING", 3)
}

fn modification() -> Schema {
    Schema::new("Modification")
        .field("modification_id", FieldType::Id)
        .field("variable_type", variable_type())
        .field(
            "value",
            Switch::new("variable_type")
                .case(Key::Name("INT".into()), int())
                .case(Key::Name("REAL".into()), FieldType::Float(Endian::Little))
                .case(Key::Name("UNREAL".into()), FieldType::Float(Endian::Little))
                .case(Key::Name("STRING".into()), FieldType::CString),
        )
        .field(
            "parent_object_id",
            FieldType::Select(vec![
                FieldType::constant(int(), 0),
                FieldType::validated(
                    FieldType::Id,
                    Check {
                        relation: "matches the enclosing object id",
                        predicate: |value, scope| {
                            ["_.new_object_id", "_.original_object_id"]
                                .iter()
                                .any(|path| scope.resolve(&Ref::new(path)).ok() == Some(value))
                        },
                    },
                ),
            ]),
        )
}

fn object() -> Schema {
    Schema::new("Object")
        .field("original_object_id", FieldType::Id)
        .field("new_object_id", FieldType::Id)
        .field("modifications_count", int())
        .field(
            "modifications",
            FieldType::array(Length::field("modifications_count"), modification()),
        )
}

fn object_bytes(parent: &[u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(b"hfoo");
    bytes.extend(b"h000");
    bytes.extend(2i32.to_le_bytes());
    bytes.extend(b"unam");
    bytes.extend(3i32.to_le_bytes());
    bytes.extend(b"Footman\0");
    bytes.extend(0i32.to_le_bytes());
    bytes.extend(b"umvs");
    bytes.extend(1i32.to_le_bytes());
    bytes.extend(320f32.to_le_bytes());
    bytes.extend(parent);
    bytes
}

#[traced_test]
#[test]
fn switch_and_select_round_trip() -> Result<()> {
    let bytes = object_bytes(b"h000");
    let document = decode(&object(), &bytes)?;

    let modifications = document
        .get("modifications")
        .and_then(Value::as_array)
        .unwrap();
    let name = modifications[0].as_struct().unwrap();
    assert_eq!(name.get("value"), Some(&Value::Str("Footman".into())));
    assert_eq!(name.get("parent_object_id"), Some(&Value::Int(0)));

    let speed = modifications[1].as_struct().unwrap();
    assert_eq!(speed.get("value"), Some(&Value::Float(320.0)));
    assert_eq!(speed.get("parent_object_id"), Some(&Value::Id(*b"h000")));

    assert_eq!(encode(&object(), &document)?, bytes);
    Ok(())
}

#[traced_test]
#[test]
fn validation_rejects_a_foreign_parent() {
    let err = decode(&object(), &object_bytes(b"hkni")).unwrap_err();
    assert!(matches!(err, Error::ValidationError { ref field, .. }
        if field == "modifications[1].parent_object_id"));
}

#[traced_test]
#[test]
fn unknown_enum_values_are_preserved() -> Result<()> {
    let mut bytes = object_bytes(b"h000");
    // Turn the first modification into variable type 9, which no switch case handles.
    bytes[16..20].copy_from_slice(&9i32.to_le_bytes());
    let err = decode(&object(), &bytes).unwrap_err();
    assert!(matches!(err, Error::UnknownVariant { ref discriminant, .. }
        if discriminant == "unrecognized(9)"));

    let schema = Schema::new("Typed").field("variable_type", variable_type());
    let document = decode(&schema, &9i32.to_le_bytes())?;
    assert_eq!(
        document.get("variable_type"),
        Some(&Value::Enum {
            name: None,
            raw: Box::new(Value::Int(9))
        })
    );
    assert_eq!(encode(&schema, &document)?, 9i32.to_le_bytes().to_vec());
    Ok(())
}

#[traced_test]
#[test]
fn enums_encode_by_name() -> Result<()> {
    let schema = Schema::new("Typed").field("variable_type", variable_type());
    let document = Document::new().with("variable_type", "STRING");
    assert_eq!(encode(&schema, &document)?, 3i32.to_le_bytes().to_vec());
    Ok(())
}

#[traced_test]
#[test]
fn signed_flags_keep_every_bit() -> Result<()> {
    let flags = FlagsDef::new("Players", IntKind::I32, Endian::Little)
        .flag("player_0", 1)
        .flag("player_1", 2);
    let schema = Schema::new("Mask").field("flags", flags);

    let bytes = (-1i32).to_le_bytes();
    let document = decode(&schema, &bytes)?;
    let Some(Value::Flags { bits, names }) = document.get("flags") else {
        panic!("expected flags");
    };
    assert_eq!(*bits, 0xFFFF_FFFF);
    assert_eq!(names, &vec!["player_0".to_string(), "player_1".to_string()]);
    assert_eq!(encode(&schema, &document)?, bytes.to_vec());
    Ok(())
}

#[traced_test]
#[test]
fn booleans_are_strict() {
    let schema = Schema::new("Shadow").field(
        "cells",
        FieldType::greedy(FieldType::Bool {
            repr: IntKind::U8,
            endian: Endian::Little,
            false_value: 0x00,
            true_value: 0xFF,
        }),
    );
    let document = decode(&schema, &[0x00, 0xFF]).unwrap();
    assert_eq!(
        document.get("cells"),
        Some(&Value::Array(vec![Value::Bool(false), Value::Bool(true)]))
    );

    assert!(matches!(
        decode(&schema, &[0x00, 0x01]),
        Err(Error::ValidationError { ref field, .. }) if field == "cells[1]"
    ));
}

#[traced_test]
#[test]
fn lookup_lengths() -> Result<()> {
    let schema = Schema::new("Call")
        .field("function_name", FieldType::CString)
        .field(
            "parameters",
            FieldType::array(Length::lookup("parameters", "function_name"), int()),
        );
    let bytes = b"Wait\0\x01\0\0\0\x02\0\0\0";

    assert!(matches!(
        decode(&schema, bytes),
        Err(Error::MissingLookup { ref key, .. }) if key == "Wait"
    ));

    let options = CodecOptions::default().with_lookup("parameters", "Wait", 2);
    let document = decode_with(&schema, bytes, &options)?;
    assert_eq!(
        document.get("parameters"),
        Some(&Value::Array(vec![Value::Int(1), Value::Int(2)]))
    );
    assert_eq!(encode_with(&schema, &document, &options)?, bytes.to_vec());
    Ok(())
}

fn node() -> &'static FieldType {
    static NODE: OnceLock<FieldType> = OnceLock::new();
    NODE.get_or_init(|| {
        FieldType::Struct(Arc::new(
            Schema::new("Node")
                .field("value", FieldType::Int(IntKind::U8, Endian::Little))
                .field("children_count", FieldType::Int(IntKind::U8, Endian::Little))
                .field(
                    "children",
                    FieldType::array(Length::field("children_count"), FieldType::Lazy(node)),
                ),
        ))
    })
}

#[traced_test]
#[test]
fn recursive_records() -> Result<()> {
    let schema = Schema::new("Tree").field("root", FieldType::Lazy(node));
    // root(1) -> [child(2) -> [leaf(3)], leaf(4)]
    let bytes = [1, 2, 2, 1, 3, 0, 4, 0];
    let document = decode(&schema, &bytes)?;
    assert_eq!(
        document
            .lookup("root")
            .and_then(Value::as_struct)
            .and_then(|root| root.get("children"))
            .and_then(Value::as_array)
            .map(<[Value]>::len),
        Some(2)
    );
    assert_eq!(encode(&schema, &document)?, bytes.to_vec());
    Ok(())
}

#[traced_test]
#[test]
fn reversed_ids() -> Result<()> {
    let schema = Schema::new("Unit")
        .field("stored", FieldType::ReversedId)
        .field("plain", FieldType::Id);
    let document = decode(&schema, b"oofhhfoo")?;
    assert_eq!(document.get("stored"), Some(&Value::Id(*b"hfoo")));
    assert_eq!(document.get("stored"), document.get("plain"));
    assert_eq!(encode(&schema, &document)?, b"oofhhfoo".to_vec());
    Ok(())
}

/// `levels` nodes, each holding the next as its only child
fn chain(levels: usize) -> Vec<u8> {
    let mut bytes = [0, 1].repeat(levels);
    bytes.extend([0, 0]);
    bytes
}

#[traced_test]
#[test]
fn nesting_is_bounded() -> Result<()> {
    let schema = Schema::new("Tree").field("root", FieldType::Lazy(node));
    let options = CodecOptions::builder().max_depth(8).build();

    // Each level enters a lazy reference and the record behind it
    let document = decode_with(&schema, &chain(3), &options)?;
    assert_eq!(encode_with(&schema, &document, &options)?, chain(3));

    assert!(matches!(
        decode_with(&schema, &chain(4), &options),
        Err(Error::Overflow { limit: 8, .. })
    ));

    let deep = decode(&schema, &chain(4))?;
    assert!(matches!(
        encode_with(&schema, &deep, &options),
        Err(Error::Overflow { limit: 8, .. })
    ));
    Ok(())
}

#[test]
fn hostile_nesting_is_an_error() {
    let bytes = chain(100_000);
    let result = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(move || {
            let schema = Schema::new("Tree").field("root", FieldType::Lazy(node));
            decode(&schema, &bytes).map(|_| ())
        })
        .unwrap()
        .join()
        .unwrap();
    assert!(matches!(
        result,
        Err(Error::Overflow { requested, limit, .. })
            if limit == DEFAULT_MAX_DEPTH && requested == i128::from(limit) + 1
    ));
}

#[traced_test]
#[test]
fn unchecked_bit_packs_are_rejected() {
    let wide = Schema::new("Wide").field(
        "packed",
        BitPack::new(1, BitOrder::MsbFirst).field("high", 6).field("low", 6),
    );
    assert!(matches!(decode(&wide, &[0xFF]), Err(Error::InvalidSchema(_))));

    let empty = Schema::new("Empty").field("packed", BitPack::new(0, BitOrder::LsbFirst));
    assert!(matches!(decode(&empty, &[]), Err(Error::InvalidSchema(_))));

    let document = Document::new().with(
        "packed",
        Value::Struct(Document::new().with("high", 1).with("low", 1)),
    );
    assert!(matches!(encode(&wide, &document), Err(Error::InvalidSchema(_))));
}

#[traced_test]
#[test]
fn packed_tiles() -> Result<()> {
    let schema = Schema::new("Tile").field("ground_height", FieldType::Int(IntKind::I16, Endian::Little)).field(
        "packed",
        BitPack::new(1, BitOrder::MsbFirst)
            .field("high", 4)
            .field("low", 4),
    );
    let document = decode(&schema, &[0x00, 0x20, 0x4A])?;
    assert_eq!(document.lookup("packed.high"), Some(&Value::Int(4)));
    assert_eq!(document.lookup("packed.low"), Some(&Value::Int(0xA)));

    let mut changed = document.clone();
    if let Some(Value::Struct(packed)) = changed.get_mut("packed") {
        packed.insert("low", 0x10);
    }
    assert!(matches!(
        encode(&schema, &changed),
        Err(Error::RoundTripViolation { ref field, .. }) if field == "packed.low"
    ));
    Ok(())
}

#[traced_test]
#[test]
fn select_between_layouts() -> Result<()> {
    let old = Schema::new("Old").field("version", FieldType::constant(int(), 1));
    let new = Schema::new("New")
        .field("version", FieldType::constant(int(), 2))
        .field("extra", int());

    let mut bytes = 2i32.to_le_bytes().to_vec();
    bytes.extend(7i32.to_le_bytes());
    let (index, document) = decode_select(&[&old, &new], &bytes, &CodecOptions::default())?;
    assert_eq!(index, 1);
    assert_eq!(document.get("extra"), Some(&Value::Int(7)));
    Ok(())
}

#[cfg(feature = "serde")]
#[traced_test]
#[test]
fn documents_serialize_to_json() -> Result<()> {
    let document = decode(&object(), &object_bytes(b"h000"))?;
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["new_object_id"], "h000");
    assert_eq!(json["modifications"][0]["variable_type"], "STRING");
    assert_eq!(json["modifications"][0]["value"], "Footman");
    Ok(())
}

fn list() -> Schema {
    Schema::new("List")
        .field("count", int())
        .field("items", FieldType::array(Length::field("count"), FieldType::CString))
        .field("scale", FieldType::Float(Endian::Little))
}

proptest! {
    #[test]
    fn decoded_documents_encode_to_the_same_bytes(
        items in proptest::collection::vec("[a-zA-Z0-9 _.\\\\]{0,12}", 0..8),
        scale in any::<f32>(),
    ) {
        let mut bytes = (items.len() as i32).to_le_bytes().to_vec();
        for item in &items {
            bytes.extend(item.as_bytes());
            bytes.push(0);
        }
        bytes.extend(scale.to_le_bytes());

        let document = decode(&list(), &bytes).unwrap();
        prop_assert_eq!(encode(&list(), &document).unwrap(), bytes);
    }

    #[test]
    fn arbitrary_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = decode(&object(), &bytes);
    }
}
