use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tracing::info;
use tracing_test::traced_test;
use w3_jass::error::{Error, Result};
use w3_jass::{
    comments, Function, FunctionDefinition, GlobalVariable, Node, Script, SymbolKind, TokenKind,
    Type, Variable, MAX_NESTING,
};

fn sample() -> String {
    let path = PathBuf::from(format!(
        "{}/resources/war3map.j",
        env!("CARGO_MANIFEST_DIR")
    ));
    fs::read_to_string(path).unwrap()
}

#[traced_test]
#[test]
fn regenerated_source_parses_to_the_same_script() -> Result<()> {
    let script: Script = sample().parse()?;
    assert_eq!(script.types.len(), 4);
    assert_eq!(script.natives.len(), 4);
    assert_eq!(script.globals.len(), 6);
    assert_eq!(script.functions.len(), 3);

    let text = script.to_string();
    info!("regenerated:\n{text}");
    let reparsed: Script = text.parse()?;
    assert_eq!(reparsed, script);
    assert_eq!(reparsed.to_string(), text);

    Ok(())
}

#[traced_test]
#[test]
fn renaming_a_constant() -> Result<()> {
    let mut script: Script = "globals\n constant integer X = 5\nendglobals\n".parse()?;
    script.rename("X", "Y")?;
    assert_eq!(
        script.to_string(),
        "globals\n    constant integer Y = 5\nendglobals\n"
    );
    Ok(())
}

#[traced_test]
#[test]
fn renaming_types_and_values() -> Result<()> {
    let mut script: Script = sample().parse()?;

    script.rename("unit", "hero")?;
    assert_eq!(script.types[2].id, "hero");
    assert_eq!(script.natives[0].takes[0].ty, "hero");
    assert_eq!(script.natives[1].returns.as_deref(), Some("hero"));
    assert_eq!(script.globals[2].ty, "hero");

    script.rename("widget", "thing")?;
    assert_eq!(script.types[2].extends, "thing");

    script.rename("udg_footman", "udg_rifleman")?;
    script.rename("CreateUnit", "CreateUnitAtLoc")?;
    let text = script.to_string();
    assert!(text.contains("integer udg_rifleman = 'hfoo'"));
    assert!(text.contains("set udg_heroes[i] = CreateUnitAtLoc(p, udg_rifleman, x, -x, 270.0)"));
    assert!(!text.contains("udg_footman"));

    let spawn = &mut script.functions[1];
    spawn.rename_local("x", "offset");
    assert!(script
        .to_string()
        .contains("set offset = Half(I2R(i)*128.0)"));

    assert!(matches!(
        script.rename("udg_missing", "anything"),
        Err(Error::SymbolNotFound(_))
    ));
    Ok(())
}

#[traced_test]
#[test]
fn editing_symbols() -> Result<()> {
    let mut script: Script = sample().parse()?;

    let old = script.replace(
        "BJDebugMsg",
        Some(Function::new("BJDebugMsg").takes("string", "text").into()),
    )?;
    assert_eq!(old.kind(), SymbolKind::Native);
    assert_eq!(script.natives[3].takes[0].id, "text");

    assert!(matches!(
        script.replace("HALF", Some(Type::new("HALF", "handle").into())),
        Err(Error::SymbolKindMismatch {
            expected: SymbolKind::Global,
            found: SymbolKind::Type,
            ..
        })
    ));

    script.remove("main")?;
    assert!(!script.contains("main"));

    let mut main = FunctionDefinition::new(Function::new("main"));
    main.statements.push(Node::parse("call SpawnHeroes(Player(1))")?);
    assert!(script.set("main", main)?.is_none());

    script.add(GlobalVariable::constant(
        Variable::new("boolean", "DEBUG").initialized(Node::parse("false")?),
    ));

    let text = script.to_string();
    assert!(text.contains("    constant boolean DEBUG = false\nendglobals\n"));
    assert!(text.ends_with(
        "function main takes nothing returns nothing\n    call SpawnHeroes(Player(1))\nendfunction\n"
    ));
    assert_eq!(
        script.ids().last(),
        Some("main"),
        "replaced functions move to the end"
    );

    Ok(())
}

#[traced_test]
#[test]
fn comments_by_line() {
    let comments = comments(&sample());
    assert_eq!(
        comments.keys().copied().collect::<Vec<_>>(),
        vec![1, 2, 3, 15, 24, 25, 26, 51]
    );
    assert_eq!(comments[&2], "// Sample map script");
    assert_eq!(comments[&51], "// only the first player");
}

#[traced_test]
#[test]
fn syntax_errors_point_into_the_source() {
    let text = sample().replace("endloop", "endif");
    let Err(Error::SyntaxError { line, message, .. }) = text.parse::<Script>() else {
        panic!("expected a syntax error");
    };
    assert_eq!(line, 47);
    assert_eq!(message, "expected `endloop`, found `endif`");
}

/// `count` functions, each with a loop and a long concatenation
fn generated(count: usize) -> String {
    let mut text = String::from("globals\n    integer array totals\n    string log = \"\"\nendglobals\n");
    for index in 0..count {
        text.push_str(&format!(
            "function Count{index} takes nothing returns integer
    local integer i = 0
    loop
        exitwhen i >= {index}
        set totals[{index}] = totals[{index}] + i * 2
        set i = i + 1
    endloop
    set log = log + \"Count{index}\" + \", \" + I2S(i) + \"; \"
    return totals[{index}]
endfunction
"
        ));
    }
    text
}

#[traced_test]
#[test]
fn large_scripts_are_handled_quickly() -> Result<()> {
    let text = generated(500);
    assert!(text.lines().count() > 5_000);

    let start = Instant::now();
    let script: Script = text.parse()?;
    let regenerated = script.to_string();
    let elapsed = start.elapsed();
    info!(?elapsed, len = text.len(), "parsed and regenerated");

    assert_eq!(script.functions.len(), 500);
    assert_eq!(regenerated.parse::<Script>()?, script);
    assert!(elapsed < Duration::from_secs(20), "took {elapsed:?}");
    Ok(())
}

#[traced_test]
#[test]
fn long_operator_chains() -> Result<()> {
    let terms = " + 1".repeat(3_000);
    let mut script: Script = format!("globals\n    constant integer X = 1{terms}\nendglobals\n").parse()?;
    assert_eq!(
        script.globals[0].initializer.as_ref().map(|node| node.len()),
        Some(6_001)
    );

    script.rename("X", "Total")?;
    let text = script.to_string();
    assert!(text.starts_with("globals\n    constant integer Total = 1+1+1"));
    assert_eq!(text.parse::<Script>()?, script);
    Ok(())
}

#[traced_test]
#[test]
fn deep_nesting_is_a_syntax_error() {
    let text = format!(
        "globals\n    constant integer X = {}1\nendglobals\n",
        "(".repeat(3_000)
    );
    let Err(Error::SyntaxError { line, message, .. }) = text.parse::<Script>() else {
        panic!("expected a syntax error");
    };
    assert_eq!(line, 2);
    assert_eq!(message, format!("nested deeper than {MAX_NESTING} levels"));
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,8}".prop_filter("keywords are reserved", |name| {
        TokenKind::keyword(name).is_none()
    })
}

proptest! {
    #[test]
    fn generated_globals_survive_a_round_trip(
        globals in prop::collection::vec((identifier(), any::<u16>(), any::<bool>()), 0..8)
    ) {
        let mut script = Script::new();
        for (name, value, constant) in globals {
            let variable = Variable::new("integer", name)
                .initialized(Node::parse(&value.to_string()).unwrap());
            script.add(if constant {
                GlobalVariable::constant(variable)
            } else {
                GlobalVariable::new(variable)
            });
        }

        let reparsed: Script = script.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, script);
    }
}
