use std::fs;

use delve_defs::{DefError, Definitions, DefinitionsNamespace, Element};
use tempfile::TempDir;

/// Everything the handlers saw, as `type:name` plus any attribute names.
#[derive(Debug, Default)]
struct Seen {
    entries: Vec<String>,
}

fn describe(kind: &str, e: &Element) -> String {
    let mut out = format!("{kind}:{}", e.attribute("name").unwrap_or("?"));
    for a in &e.attributes {
        if a.name.local != "name" {
            out.push_str(&format!(" @{}", a.name));
        }
    }
    for c in &e.children {
        out.push_str(&format!(" <{}>", c.name));
    }
    out
}

fn install(defs: &mut Definitions<Seen>, seen: &mut Seen, kind: &'static str) {
    defs.register(seen, kind, move |seen: &mut Seen, e: &Element| {
        seen.entries.push(describe(kind, e));
        Ok(())
    })
    .unwrap();
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("creatures.xml"),
        r#"<?xml version="1.0" encoding="utf-8"?>
<!-- creatures -->
<entity name="rat" server:spawn="cellar">
    <client:Glyph><Symbol>r</Symbol></client:Glyph>
    <server:Brain><Aggression>2</Aggression></server:Brain>
    <Health>3</Health>
</entity>
<component name="Glyph"/>
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("readme.txt"),
        "<entity name=\"ignored\"/>",
    )
    .unwrap();
    fs::create_dir(dir.path().join("decor")).unwrap();
    fs::write(
        dir.path().join("decor").join("dust.xml"),
        r#"<entity name="dust"><Glyph><Symbol>,</Symbol></Glyph></entity>"#,
    )
    .unwrap();
    dir
}

#[test]
fn recursive_load_routes_files_then_subdirectories() {
    let dir = data_dir();
    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");

    let files = defs
        .load_directory(&mut seen, dir.path(), DefinitionsNamespace::Shared, true)
        .unwrap();
    assert_eq!(files, 2);
    assert_eq!(
        seen.entries,
        vec![
            "entity:rat @{/server}spawn <{/client}Glyph> <{/server}Brain> <Health>",
            "entity:dust <Glyph>",
        ]
    );
    assert_eq!(defs.pending_count("component"), 1);
}

#[test]
fn non_recursive_load_ignores_subdirectories() {
    let dir = data_dir();
    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");

    let files = defs
        .load_directory(&mut seen, dir.path(), DefinitionsNamespace::Shared, false)
        .unwrap();
    assert_eq!(files, 1);
    assert_eq!(seen.entries.len(), 1);
}

#[test]
fn client_load_never_shows_server_content() {
    let dir = data_dir();
    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");

    defs.load_directory(&mut seen, dir.path(), DefinitionsNamespace::Client, true)
        .unwrap();
    assert_eq!(seen.entries[0], "entity:rat <{/client}Glyph> <Health>");
}

#[test]
fn server_load_never_shows_client_content() {
    let dir = data_dir();
    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");

    defs.load_directory(&mut seen, dir.path(), DefinitionsNamespace::Server, true)
        .unwrap();
    assert_eq!(
        seen.entries[0],
        "entity:rat @{/server}spawn <{/server}Brain> <Health>"
    );
}

#[test]
fn handlers_registered_after_loading_see_buffered_definitions() {
    let dir = data_dir();
    let mut defs = Definitions::new();
    let mut seen = Seen::default();

    defs.load_directory(&mut seen, dir.path(), DefinitionsNamespace::Client, true)
        .unwrap();
    assert!(seen.entries.is_empty());
    assert_eq!(defs.pending_types(), vec!["component", "entity"]);

    install(&mut defs, &mut seen, "component");
    install(&mut defs, &mut seen, "entity");
    assert_eq!(
        seen.entries,
        vec![
            "component:Glyph",
            "entity:rat <{/client}Glyph> <Health>",
            "entity:dust <Glyph>",
        ]
    );
    assert!(defs.pending_types().is_empty());
}

#[test]
fn malformed_file_reports_markup_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xml");
    fs::write(&path, "<entity name=\"x\"><Glyph></entity>").unwrap();

    let mut defs: Definitions<Seen> = Definitions::new();
    let mut seen = Seen::default();
    let err = defs
        .load_file(&mut seen, &path, DefinitionsNamespace::Shared)
        .unwrap_err();
    match err {
        DefError::Markup {
            origin,
            diagnostics,
            report,
        } => {
            assert!(origin.ends_with("broken.xml"));
            assert!(diagnostics[0].message.contains("mismatched closing tag"));
            assert!(report.contains("broken.xml"));
            assert!(report.contains("does not close <Glyph>"));
        }
        other => panic!("expected markup error, got {other}"),
    }
}

#[test]
fn invalid_utf8_is_replaced_instead_of_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.xml");
    fs::write(&path, b"<entity name=\"caf\xe9\"><Health>3</Health></entity>").unwrap();

    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");
    defs.load_file(&mut seen, &path, DefinitionsNamespace::Shared)
        .unwrap();
    assert_eq!(seen.entries, vec!["entity:caf\u{fffd} <Health>"]);
}

#[test]
fn byte_order_mark_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bom.xml");
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(b"<entity name=\"rat\"/>");
    fs::write(&path, bytes).unwrap();

    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");
    defs.load_file(&mut seen, &path, DefinitionsNamespace::Shared)
        .unwrap();
    assert_eq!(seen.entries, vec!["entity:rat"]);
}

#[test]
fn unknown_references_do_not_fail_the_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("refs.xml");
    fs::write(&path, "<entity name=\"caf&eacute;\"/>").unwrap();

    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");
    defs.load_file(&mut seen, &path, DefinitionsNamespace::Shared)
        .unwrap();
    assert_eq!(seen.entries, vec!["entity:caf&eacute;"]);
}

#[test]
fn unicode_names_load() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("größe.xml"),
        "<entity name=\"käfer\"><Größe>3</Größe></entity>",
    )
    .unwrap();

    let mut defs = Definitions::new();
    let mut seen = Seen::default();
    install(&mut defs, &mut seen, "entity");
    defs.load_directory(&mut seen, dir.path(), DefinitionsNamespace::Shared, false)
        .unwrap();
    assert_eq!(seen.entries, vec!["entity:käfer <Größe>"]);
}

#[test]
fn missing_directory_reports_io_error() {
    let dir = TempDir::new().unwrap();
    let mut defs: Definitions<Seen> = Definitions::new();
    let mut seen = Seen::default();
    let err = defs
        .load_directory(&mut seen, &dir.path().join("nope"), DefinitionsNamespace::Shared, true)
        .unwrap_err();
    assert!(matches!(err, DefError::Io { .. }));
    assert!(err.to_string().contains("nope"));
}
