use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tracing_test::traced_test;
use w3_formats::error::{Error, Result};
use w3_formats::objects::ObjectsLayout;
use w3_formats::{
    doodads, map, metadata, objects, observer, path_map, regions, shadow_map, sounds, tile_map,
    triggers, unit_doodads, Format,
};
use w3_schema::{CodecOptions, Document, Value};

/// Little helper for laying out test files
#[derive(Default)]
struct Bytes(Vec<u8>);

impl Bytes {
    fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    fn int(self, value: i32) -> Self {
        self.raw(&value.to_le_bytes())
    }

    fn float(self, value: f32) -> Self {
        self.raw(&value.to_le_bytes())
    }

    fn string(self, value: &str) -> Self {
        self.raw(value.as_bytes()).raw(&[0])
    }

    /// A string in a zero filled block
    fn padded(self, value: &str, size: usize) -> Self {
        let mut block = value.as_bytes().to_vec();
        block.resize(size, 0);
        self.raw(&block)
    }

    fn floats(self, values: &[f32]) -> Self {
        values.iter().fold(self, |b, v| b.float(*v))
    }
}

fn schema_error(err: Error) -> w3_schema::Error {
    match err {
        Error::SchemaError(e) => e,
        other => panic!("expected a schema error, got {other:?}"),
    }
}

fn array<'a>(document: &'a Document, path: &str) -> &'a [Value] {
    document
        .lookup(path)
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("{path} is not an array"))
}

#[traced_test]
#[test]
fn empty_doodads() -> Result<()> {
    let bytes = Bytes::default()
        .raw(b"W3do")
        .int(8)
        .int(0)
        .int(0)
        .int(0)
        .int(0)
        .0;

    let document = doodads::decode(&bytes)?;
    assert_eq!(document.get("version"), Some(&Value::Int(8)));
    assert!(array(&document, "doodads").is_empty());
    assert!(array(&document, "terrain_doodads").is_empty());
    assert_eq!(doodads::encode(&document)?, bytes);
    Ok(())
}

#[traced_test]
#[test]
fn doodads_with_item_sets() -> Result<()> {
    let bytes = Bytes::default()
        .raw(b"W3do")
        .int(8)
        .int(11)
        .int(1)
        // doodad
        .raw(b"LTlt")
        .int(2)
        .floats(&[128.0, -256.0, 0.0, 4.71, 1.0, 1.0, 1.0])
        .raw(&[2, 100])
        .int(-1)
        .int(1)
        .int(2)
        .raw(b"ratc")
        .int(50)
        .raw(b"YiI2")
        .int(50)
        .int(0)
        // terrain doodads
        .int(0)
        .int(1)
        .raw(b"ZPsh")
        .int(0)
        .int(12)
        .int(7)
        .0;

    let document = doodads::decode(&bytes)?;
    let doodad = array(&document, "doodads")[0].as_struct().unwrap();
    assert_eq!(doodad.get("doodad_id"), Some(&Value::Id(*b"LTlt")));
    assert_eq!(
        doodad.get("visibility").and_then(Value::enum_name),
        Some("VISIBLE_SOLID")
    );
    assert_eq!(
        doodad.lookup("dropped_item_sets").and_then(Value::as_array).map(<[Value]>::len),
        Some(1)
    );
    assert_eq!(doodads::encode(&document)?, bytes);
    Ok(())
}

#[traced_test]
#[test]
fn magic_is_checked_first() {
    let cases: [(Format, &[u8]); 5] = [
        (Format::Doodads, b"W3dx\x08\0\0\0"),
        (Format::UnitDoodads, b"Wxdo\x08\0\0\0"),
        (Format::TileMap, b"W3E?\x0b\0\0\0"),
        (Format::Triggers, b"GTW!\x07\0\0\0"),
        (Format::PathMap, b"W3PM\0\0\0\0"),
    ];

    for (format, bytes) in cases {
        let err = format
            .decode_with(bytes, &CodecOptions::default())
            .unwrap_err();
        assert!(
            matches!(schema_error(err), w3_schema::Error::FormatMismatch { .. }),
            "{format}"
        );
    }

    let err = map::decode(b"MPQ\x1a").unwrap_err();
    assert!(matches!(
        schema_error(err),
        w3_schema::Error::FormatMismatch { .. } | w3_schema::Error::UnexpectedEof { .. }
    ));
}

fn tile_map_bytes(width: i32, height: i32, tiles: &[[u8; 7]]) -> Vec<u8> {
    let mut bytes = Bytes::default()
        .raw(b"W3E!")
        .int(11)
        .raw(b"L")
        .int(0)
        .int(2)
        .raw(b"Ldrt")
        .raw(b"Lgrs")
        .int(1)
        .raw(b"CLdi")
        .int(width)
        .int(height)
        .float(-1536.0)
        .float(-1536.0);
    for tile in tiles {
        bytes = bytes.raw(tile);
    }
    bytes.0
}

#[traced_test]
#[test]
fn zero_width_tile_map_is_empty() -> Result<()> {
    let bytes = tile_map_bytes(0, i32::MAX, &[]);
    let document = tile_map::decode(&bytes)?;
    assert!(array(&document, "tile_map").is_empty());
    assert_eq!(
        document.get("tileset_id").and_then(Value::enum_name),
        Some("LORDAERONSUMMER")
    );
    Ok(())
}

#[traced_test]
#[test]
fn oversized_tile_map_is_bounded() {
    let bytes = tile_map_bytes(i32::MAX, i32::MAX, &[]);
    let err = tile_map::decode(&bytes).unwrap_err();
    assert!(matches!(
        schema_error(err),
        w3_schema::Error::Overflow { ref field, .. } if field == "tile_map"
    ));
}

#[traced_test]
#[test]
fn tile_points_unpack() -> Result<()> {
    let tiles = [
        [0x00, 0x20, 0x00, 0x22, 0x4A, 0x13, 0x72],
        [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    ];
    let bytes = tile_map_bytes(2, 1, &tiles);
    let document = tile_map::decode(&bytes)?;

    let first = array(&document, "tile_map")[0].as_struct().unwrap();
    assert_eq!(first.lookup("ground_height"), Some(&Value::Int(0x2000)));
    assert_eq!(first.lookup("water_level"), Some(&Value::Int(0x2200)));
    assert_eq!(
        first.lookup("packed.flags"),
        Some(&Value::Flags {
            bits: 0x4,
            names: vec!["water_enabled".into()],
        })
    );
    assert_eq!(first.lookup("packed.ground_texture_type"), Some(&Value::Int(0xA)));
    assert_eq!(first.lookup("packed.texture_details"), Some(&Value::Int(0x13)));
    assert_eq!(first.lookup("packed.cliff_texture_type"), Some(&Value::Int(0x7)));
    assert_eq!(first.lookup("packed.layer_height"), Some(&Value::Int(0x2)));

    let second = array(&document, "tile_map")[1].as_struct().unwrap();
    assert_eq!(second.lookup("ground_height"), Some(&Value::Int(-1)));
    assert_eq!(second.lookup("packed.texture_details"), Some(&Value::Int(0xFF)));

    assert_eq!(tile_map::encode(&document)?, bytes);
    Ok(())
}

proptest! {
    #[test]
    fn tile_sub_fields_pack_exactly(
        flags in 0u64..16,
        ground in 0i64..16,
        details in 0i64..256,
        cliff in 0i64..16,
        layer in 0i64..16,
    ) {
        let tile = Document::new()
            .with("ground_height", 0x2000)
            .with("water_level", 0)
            .with(
                "packed",
                Document::new()
                    .with("flags", Value::Flags { bits: flags, names: Vec::new() })
                    .with("ground_texture_type", ground)
                    .with("texture_details", details)
                    .with("cliff_texture_type", cliff)
                    .with("layer_height", layer),
            );
        let mut document = tile_map::decode(&tile_map_bytes(1, 1, &[[0; 7]])).unwrap();
        document.insert("tile_map", vec![Value::Struct(tile)]);

        let decoded = tile_map::decode(&tile_map::encode(&document).unwrap()).unwrap();
        let packed = array(&decoded, "tile_map")[0]
            .as_struct()
            .and_then(|tile| tile.get("packed"))
            .and_then(Value::as_struct)
            .cloned()
            .unwrap();
        prop_assert_eq!(packed.get("flags").and_then(Value::as_int), Some(flags as i64));
        prop_assert_eq!(packed.get("ground_texture_type"), Some(&Value::Int(ground)));
        prop_assert_eq!(packed.get("texture_details"), Some(&Value::Int(details)));
        prop_assert_eq!(packed.get("cliff_texture_type"), Some(&Value::Int(cliff)));
        prop_assert_eq!(packed.get("layer_height"), Some(&Value::Int(layer)));
    }
}

fn unit_bytes(unit_id: &[u8; 4], random_unit: Bytes) -> Vec<u8> {
    Bytes::default()
        .raw(b"W3do")
        .int(8)
        .int(11)
        .int(1)
        .raw(unit_id)
        .int(0)
        .floats(&[64.0, 64.0, 0.0, 0.0, 1.0, 1.0, 1.0])
        .raw(&[2])
        .int(0)
        .raw(&[0, 0])
        .int(-1)
        .int(-1)
        .int(-1)
        .int(0)
        .int(12500)
        .float(-1.0)
        .int(1)
        .int(0)
        .int(0)
        .int(0)
        .int(1)
        .int(0)
        .raw(b"ratc")
        .int(1)
        .raw(b"AHbz")
        .int(0)
        .int(1)
        .raw(&random_unit.0)
        .int(-1)
        .int(-1)
        .int(0)
        .0
}

#[traced_test]
#[test]
fn units_without_random_data() -> Result<()> {
    let bytes = unit_bytes(b"hfoo", Bytes::default().int(0).int(1));
    let document = unit_doodads::decode(&bytes)?;
    let unit = array(&document, "units")[0].as_struct().unwrap();
    assert_eq!(
        unit.get("random_unit"),
        Some(&Value::Array(vec![Value::Int(0), Value::Int(1)]))
    );
    assert_eq!(unit_doodads::encode(&document)?, bytes);

    let broken = unit_bytes(b"hfoo", Bytes::default().int(0).int(2));
    let err = unit_doodads::decode(&broken).unwrap_err();
    assert!(matches!(
        schema_error(err),
        w3_schema::Error::FormatMismatch { ref field, .. } if field == "units[0].random_unit[1]"
    ));
    Ok(())
}

#[traced_test]
#[test]
fn random_units() -> Result<()> {
    let custom = Bytes::default()
        .int(2)
        .int(2)
        .raw(b"hfoo")
        .int(60)
        .raw(b"YYU/")
        .int(40);
    let bytes = unit_bytes(b"uDNR", custom);
    let document = unit_doodads::decode(&bytes)?;
    let unit = array(&document, "units")[0].as_struct().unwrap();
    assert_eq!(
        unit.lookup("random_unit.type").and_then(Value::enum_name),
        Some("FROM_CUSTOM_TABLE")
    );
    assert_eq!(
        unit.lookup("random_unit.properties.units_count"),
        Some(&Value::Int(2))
    );
    assert_eq!(unit_doodads::encode(&document)?, bytes);

    let any = Bytes::default().int(0).raw(&[0xFF, 0xFF, 0xFF, 3]);
    let bytes = unit_bytes(b"iDNR", any);
    let document = unit_doodads::decode(&bytes)?;
    let unit = array(&document, "units")[0].as_struct().unwrap();
    assert_eq!(
        unit.lookup("random_unit.properties.item_class")
            .and_then(Value::enum_name),
        Some("POWER_UP")
    );
    assert_eq!(unit_doodads::encode(&document)?, bytes);
    Ok(())
}

fn object_table(modification: impl Fn(Bytes) -> Bytes) -> Bytes {
    let table = Bytes::default().int(1).raw(b"hfoo").raw(b"h000").int(1).raw(b"unam");
    modification(table)
}

#[traced_test]
#[test]
fn object_layouts_are_detected() -> Result<()> {
    let plain = Bytes::default()
        .int(2)
        .int(0)
        .raw(&object_table(|b| b.int(3).string("Captain").raw(b"h000")).0)
        .0;
    let (layout, document) = objects::decode_any(&plain)?;
    assert_eq!(layout, ObjectsLayout::Plain);
    assert_eq!(
        array(&document, "custom_objects_table.objects")[0]
            .as_struct()
            .and_then(|o| o.get("modifications"))
            .and_then(Value::as_array)
            .and_then(|m| m[0].as_struct())
            .and_then(|m| m.get("value")),
        Some(&Value::Str("Captain".into()))
    );
    assert_eq!(objects::encode_any(layout, &document)?, plain);

    let with_variations = Bytes::default()
        .int(2)
        .int(0)
        .raw(&object_table(|b| b.int(1).int(2).int(3).float(12.5).int(0)).0)
        .0;
    let (layout, document) = objects::decode_any(&with_variations)?;
    assert_eq!(layout, ObjectsLayout::WithVariations);
    let modification = array(&document, "custom_objects_table.objects")[0]
        .as_struct()
        .and_then(|o| o.get("modifications"))
        .and_then(Value::as_array)
        .and_then(|m| m[0].as_struct())
        .cloned()
        .unwrap();
    assert_eq!(modification.get("variation"), Some(&Value::Int(2)));
    assert_eq!(
        modification.get("ability_data_column").and_then(Value::enum_name),
        Some("D")
    );
    assert_eq!(objects::encode_any(layout, &document)?, with_variations);
    Ok(())
}

#[traced_test]
#[test]
fn foreign_parent_ids_are_rejected() {
    let bytes = Bytes::default()
        .int(2)
        .int(0)
        .raw(&object_table(|b| b.int(0).int(5).raw(b"hkni")).0)
        .0;
    let err = objects::decode(&bytes).unwrap_err();
    assert!(matches!(
        schema_error(err),
        w3_schema::Error::ValidationError { ref field, .. }
            if field == "custom_objects_table.objects[0].modifications[0].parent_object_id"
    ));
}

fn trigger_bytes() -> Vec<u8> {
    Bytes::default()
        .raw(b"WTG!")
        .int(7)
        .int(1)
        .int(0)
        .string("Initialization")
        .int(0)
        .int(0)
        .int(1)
        .string("gg_done")
        .string("boolean")
        .int(1)
        .int(0)
        .int(1)
        .int(0)
        .string("")
        .int(1)
        .string("Melee Initialization")
        .string("")
        .int(0)
        .int(1)
        .int(0)
        .int(0)
        .int(0)
        .int(0)
        .int(2)
        // event with one parameter
        .int(0)
        .string("TriggerRegisterTimerEventSingle")
        .int(1)
        .int(3)
        .string("2.00")
        .int(0)
        .int(0)
        .int(0)
        // action holding one branch
        .int(2)
        .string("IfThenElseMultiple")
        .int(1)
        .int(1)
        // the THEN branch
        .int(2)
        .int(1)
        .string("DoNothing")
        .int(1)
        .int(0)
        .0
}

fn trigger_options() -> CodecOptions {
    CodecOptions::default()
        .with_lookup(triggers::PARAMETER_COUNTS, "TriggerRegisterTimerEventSingle", 1)
        .with_lookup(triggers::PARAMETER_COUNTS, "IfThenElseMultiple", 0)
        .with_lookup(triggers::PARAMETER_COUNTS, "DoNothing", 0)
}

#[traced_test]
#[test]
fn triggers_nest() -> Result<()> {
    let bytes = trigger_bytes();
    let options = trigger_options();
    let document = triggers::decode(&bytes, &options)?;

    let trigger = array(&document, "triggers")[0].as_struct().unwrap();
    let blocks = trigger.get("blocks").and_then(Value::as_array).unwrap();
    let event = blocks[0].as_struct().unwrap();
    assert_eq!(event.lookup("type").and_then(Value::enum_name), Some("EVENT"));
    let parameter = event
        .get("parameters")
        .and_then(Value::as_array)
        .and_then(|p| p[0].as_struct())
        .unwrap();
    assert_eq!(parameter.get("value"), Some(&Value::Str("2.00".into())));

    let branch = blocks[1]
        .as_struct()
        .and_then(|b| b.get("child_blocks"))
        .and_then(Value::as_array)
        .and_then(|c| c[0].as_struct())
        .unwrap();
    assert_eq!(
        branch.get("branch_type").and_then(Value::enum_name),
        Some("THEN")
    );

    assert_eq!(triggers::encode(&document, &options)?, bytes);
    Ok(())
}

#[traced_test]
#[test]
fn triggers_need_parameter_counts() {
    let err = triggers::decode(&trigger_bytes(), &CodecOptions::default()).unwrap_err();
    assert!(matches!(
        schema_error(err),
        w3_schema::Error::MissingLookup { ref key, .. } if key == "TriggerRegisterTimerEventSingle"
    ));
}

#[traced_test]
#[test]
fn metadata_tables() -> Result<()> {
    let bytes = Bytes::default()
        .int(25)
        .int(3)
        .int(6059)
        .string("TRIGSTR_001")
        .string("TRIGSTR_002")
        .string("TRIGSTR_003")
        .string("TRIGSTR_004")
        .floats(&[-2816.0, -3328.0, 2816.0, 2816.0, -2816.0, 2816.0, 2816.0, -3328.0])
        .int(6)
        .int(4)
        .int(6)
        .int(8)
        .int(84)
        .int(84)
        .int(0x8000 | 0x0004)
        .raw(b"L")
        .int(-1)
        .string("")
        .string("")
        .string("")
        .string("")
        .int(0)
        .string("")
        .string("")
        .string("")
        .string("")
        .int(0)
        .float(3000.0)
        .float(5000.0)
        .float(0.5)
        .raw(&[255, 255, 255, 255])
        .raw(b"\0\0\0\0")
        .string("")
        .raw(b"L")
        .raw(&[255, 255, 255, 255])
        // players
        .int(1)
        .int(0)
        .int(1)
        .int(1)
        .int(1)
        .string("TRIGSTR_005")
        .float(-1024.0)
        .float(512.0)
        .int(0)
        .int(0)
        // forces
        .int(1)
        .int(0x01 | 0x04)
        .int(-1)
        .string("TRIGSTR_006")
        .int(0)
        .int(0)
        // random unit tables
        .int(1)
        .int(0)
        .string("Creeps")
        .int(2)
        .int(0)
        .int(2)
        .int(1)
        .int(100)
        .raw(b"nfrlYYB/")
        .int(0)
        .0;

    let document = metadata::decode(&bytes)?;
    assert_eq!(
        document.lookup("flags"),
        Some(&Value::Flags {
            bits: 0x8004,
            names: vec![
                "is_melee_map".into(),
                "use_item_classification_system".into()
            ],
        })
    );
    let force = array(&document, "forces")[0].as_struct().unwrap();
    let Some(Value::Flags { bits, names }) = force.get("player_mask_flags") else {
        panic!("player mask is not a flag set");
    };
    assert_eq!(*bits, 0xFFFF_FFFF);
    assert_eq!(names.len(), 24);

    let table = array(&document, "random_unit_tables")[0].as_struct().unwrap();
    let row = table
        .get("units")
        .and_then(Value::as_array)
        .and_then(|u| u[0].as_struct())
        .unwrap();
    assert_eq!(row.get("unit_ids"), Some(&Value::Bytes(b"nfrlYYB/".to_vec())));

    assert_eq!(metadata::encode(&document)?, bytes);
    Ok(())
}

#[traced_test]
#[test]
fn sounds_keep_unknown_effects() -> Result<()> {
    let sound = |eax: &str| {
        Bytes::default()
            .int(1)
            .int(1)
            .string("gg_snd_Rain")
            .string("Sound\\Ambient\\Rain.wav")
            .string(eax)
            .int(0x01 | 0x08)
            .int(10)
            .int(10)
            .int(127)
            .float(1.0)
            .float(0.0)
            .int(-1)
            .int(-1)
            .floats(&[0.0, 10000.0, 3000.0, 0.0, 0.0])
            .int(-1)
            .floats(&[0.0, 0.0, 0.0])
            .0
    };

    let bytes = sound("DefaultEAXON");
    let document = sounds::decode(&bytes)?;
    let entry = array(&document, "sounds")[0].as_struct().unwrap();
    assert_eq!(entry.get("eax_effect").and_then(Value::enum_name), Some("DEFAULT"));
    assert_eq!(entry.get("channel").and_then(Value::enum_name), Some("UNSET"));
    assert_eq!(sounds::encode(&document)?, bytes);

    let bytes = sound("CustomEAX");
    let document = sounds::decode(&bytes)?;
    let entry = array(&document, "sounds")[0].as_struct().unwrap();
    assert_eq!(entry.get("eax_effect").and_then(Value::enum_name), None);
    assert_eq!(entry.get("eax_effect").and_then(Value::as_str), Some("CustomEAX"));
    assert_eq!(sounds::encode(&document)?, bytes);
    Ok(())
}

#[traced_test]
#[test]
fn path_and_shadow_maps() -> Result<()> {
    let bytes = Bytes::default()
        .raw(b"MP3W")
        .int(0)
        .int(2)
        .int(2)
        .raw(&[0x00, 0x02 | 0x08, 0x40, 0xC0])
        .0;
    let document = path_map::decode(&bytes)?;
    let data = array(&document, "data");
    assert_eq!(data.len(), 4);
    assert_eq!(
        data[1],
        Value::Flags {
            bits: 0x0A,
            names: vec!["can_walk".into(), "can_build".into()]
        }
    );
    assert_eq!(path_map::encode(&document)?, bytes);

    let document = shadow_map::decode(&[0x00, 0xFF, 0xFF])?;
    assert_eq!(array(&document, "shadow_map").len(), 3);
    assert!(shadow_map::decode(&[0x00, 0x7F]).is_err());
    Ok(())
}

#[traced_test]
#[test]
fn region_padding_is_zeroed() -> Result<()> {
    let region = |pad: u8| {
        Bytes::default()
            .int(5)
            .int(1)
            .floats(&[-512.0, 512.0, -256.0, 256.0])
            .string("Spawn")
            .int(0)
            .raw(b"RAhr")
            .string("")
            .raw(&[0x10, 0x20, 0x30, pad])
            .0
    };

    let document = regions::decode(&region(0xFF))?;
    let encoded = regions::encode(&document)?;
    assert_eq!(encoded, region(0x00));
    assert_eq!(regions::decode(&encoded)?, document);
    Ok(())
}

#[traced_test]
#[test]
fn map_container() -> Result<()> {
    let mut bytes = Bytes::default()
        .raw(b"HM3W")
        .int(0)
        .string("Just Another Map")
        .int(0x0004)
        .int(2)
        .0;
    bytes.resize(512, 0);
    bytes.extend(b"MPQ\x1a archive");
    bytes.extend(b"NGIS");
    bytes.extend([0x5A; 256]);

    let document = map::decode(&bytes)?;
    assert_eq!(
        document.lookup("header.name"),
        Some(&Value::Str("Just Another Map".into()))
    );
    assert_eq!(map::encode(&document)?, bytes);

    let footer = map::decode_footer(&bytes)?.unwrap();
    assert_eq!(footer.get("authentication"), Some(&Value::Bytes(vec![0x5A; 256])));
    assert!(map::decode_footer(&bytes[..600])?.is_none());
    Ok(())
}

#[traced_test]
#[test]
fn observer_players() -> Result<()> {
    // One orc player with a single hero, everything else left empty
    let mut player = Bytes::default()
        .padded("Grubby", 36)
        .raw(&[0x02, 2, 0, 1, 3, 1])
        .int(100)
        .0;
    player.resize(97, 0);
    let mut player = Bytes(player)
        .int(1)
        .raw(b"albO")
        .padded("Blademaster", 100)
        .int(3)
        .0;
    player.resize(observer::PLAYER_SIZE as usize, 0);

    let bytes = Bytes::default()
        .int(6)
        .int(100)
        .raw(&[1])
        .int(93_000)
        .raw(&[1])
        .padded("Ladder", 256)
        .padded("(2)TwistedMeadows.w3x", 256)
        .raw(&player)
        .0;

    let document = observer::decode(&bytes)?;
    assert_eq!(document.lookup("game.is_in_game"), Some(&Value::Bool(true)));
    assert_eq!(
        document.lookup("game.map_name"),
        Some(&Value::Str("(2)TwistedMeadows.w3x".into()))
    );

    let players = array(&document, "players");
    assert_eq!(players.len(), 1);
    let grubby = players[0].as_struct().unwrap();
    assert_eq!(grubby.get("name"), Some(&Value::Str("Grubby".into())));
    assert_eq!(
        grubby.get("race"),
        Some(&Value::Enum {
            name: Some("ORC".into()),
            raw: Box::new(Value::Int(2)),
        })
    );

    let hero = array(grubby, "heroes")[0].as_struct().unwrap();
    assert_eq!(hero.get("id"), Some(&Value::Id(*b"Obla")));
    assert_eq!(hero.get("class"), Some(&Value::Str("Blademaster".into())));
    assert_eq!(hero.get("level"), Some(&Value::Int(3)));
    assert!(array(hero, "abilities").is_empty());

    assert_eq!(observer::encode(&document)?, bytes);
    Ok(())
}
