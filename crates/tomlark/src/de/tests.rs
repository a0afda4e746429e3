use indoc::indoc;
use serde::Deserialize;
use serde_json::json;

use crate::value::Value;
use crate::{Datetime, Decoder, NumberMode, Offset};

fn value(source: &str) -> Value {
    match crate::from_str(source) {
        Ok(v) => v,
        Err(e) => panic!("decode failed: {e}"),
    }
}

/// Compare a decoded document against a JSON literal. Datetimes surface
/// as their RFC 3339 strings.
fn assert_doc(source: &str, expected: serde_json::Value) {
    let decoded = serde_json::to_value(value(source)).expect("value is JSON-representable");
    assert_eq!(decoded, expected);
}

fn rejects(source: &str) {
    assert!(
        crate::from_str::<Value>(source).is_err(),
        "accepted invalid document: {source:?}"
    );
}

#[test]
fn scalar_assignment() {
    assert_doc(r#"A = "hello""#, json!({"A": "hello"}));
}

#[test]
fn array_of_strings() {
    assert_doc(r#"A = ["foo", "bar"]"#, json!({"A": ["foo", "bar"]}));
}

#[test]
fn inline_table() {
    assert_doc(
        r#"name = { first = "Tom", last = "Preston-Werner" }"#,
        json!({"name": {"first": "Tom", "last": "Preston-Werner"}}),
    );
}

#[test]
fn dotted_header_reaches_deep() {
    assert_doc(
        "[a.b.c]\nd = 42",
        json!({"a": {"b": {"c": {"d": 42}}}}),
    );
}

#[test]
fn array_tables_append_in_order() {
    let source = indoc! {r#"
        [[fruit]]
        name = "apple"
        [fruit.physical]
        color = "red"
        [[fruit]]
        name = "banana"
    "#};
    assert_doc(
        source,
        json!({"fruit": [
            {"name": "apple", "physical": {"color": "red"}},
            {"name": "banana"},
        ]}),
    );
}

#[test]
fn integer_bases() {
    assert_doc(
        "h = 0xDEAD_BEEF\no = 0o755\nb = 0b1010",
        json!({"h": 3735928559u64, "o": 493, "b": 10}),
    );
}

#[test]
fn line_continuation() {
    assert_doc("s = \"\"\"a\\\n   b\"\"\"", json!({"s": "ab"}));
}

#[test]
fn multiline_strings_trim_the_opening_newline() {
    assert_doc(
        "a = \"\"\"\nline\"\"\"\nb = '''\nraw\\n'''",
        json!({"a": "line", "b": "raw\\n"}),
    );
}

#[test]
fn offset_datetime_binds_utc() {
    #[derive(Deserialize)]
    struct Doc {
        t: Datetime,
    }

    let doc: Doc = crate::from_str("t = 1979-05-27T07:32:00Z").unwrap();
    let date = doc.t.date.unwrap();
    let time = doc.t.time.unwrap();
    assert_eq!((date.year, date.month, date.day), (1979, 5, 27));
    assert_eq!((time.hour, time.minute, time.second), (7, 32, 0));
    assert_eq!(doc.t.offset, Some(Offset::Z));
}

#[test]
fn datetimes_in_dynamic_mode() {
    let doc = value("t = 1979-05-27T00:32:00-07:00");
    assert_eq!(
        doc["t"].as_datetime().unwrap().to_string(),
        "1979-05-27T00:32:00-07:00"
    );
}

#[test]
fn dotted_keys_merge_under_one_table() {
    assert_doc(
        indoc! {r#"
            a.b = 1
            a.c = 2
            [t]
            x.y.z = "deep"
        "#},
        json!({"a": {"b": 1, "c": 2}, "t": {"x": {"y": {"z": "deep"}}}}),
    );
}

#[test]
fn scope_resets_on_each_header() {
    assert_doc(
        indoc! {r#"
            root = true
            [a.b]
            x = 1
            [c]
            y = 2
            [a.other]
            z = 3
        "#},
        json!({
            "root": true,
            "a": {"b": {"x": 1}, "other": {"z": 3}},
            "c": {"y": 2},
        }),
    );
}

#[test]
fn document_order_is_preserved() {
    let doc = value("b = 1\na = 2\n[z]\n[m]");
    let keys: Vec<&str> = doc.as_table().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["b", "a", "z", "m"]);
}

#[test]
fn typed_struct_binding() {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Config {
        title: String,
        port: u16,
        verbose: bool,
        threshold: f64,
        tags: Vec<String>,
        retry: Option<u32>,
        backup: Option<u32>,
        owner: Owner,
    }

    #[derive(Deserialize)]
    struct Owner {
        name: String,
    }

    let config: Config = crate::from_str(indoc! {r#"
        title = "srv"
        port = 8080
        verbose = false
        threshold = 0.9
        tags = ["a", "b"]
        retry = 3
        [owner]
        name = "ada"
    "#})
    .unwrap();

    assert_eq!(config.title, "srv");
    assert_eq!(config.port, 8080);
    assert!(!config.verbose);
    assert_eq!(config.threshold, 0.9);
    assert_eq!(config.tags, ["a", "b"]);
    assert_eq!(config.retry, Some(3));
    assert_eq!(config.backup, None);
    assert_eq!(config.owner.name, "ada");
}

#[test]
fn integers_fit_checks() {
    #[derive(Debug, Deserialize)]
    struct Narrow {
        x: u8,
    }

    let err = crate::from_str::<Narrow>("x = 300").unwrap_err();
    assert!(err.to_string().contains("300"));

    // negative into unsigned
    assert!(crate::from_str::<Narrow>("x = -1").is_err());

    #[derive(Debug, Deserialize)]
    struct Wide {
        x: i64,
    }
    let wide: Wide = crate::from_str("x = -9223372036854775808").unwrap();
    assert_eq!(wide.x, i64::MIN);
    let err = crate::from_str::<Wide>("x = 9223372036854775808").unwrap_err();
    assert!(err.to_string().contains("does not fit in 64 bits"));
}

#[test]
fn floats_accept_integer_leaves() {
    #[derive(Deserialize)]
    struct F {
        x: f64,
    }
    let f: F = crate::from_str("x = 3").unwrap();
    assert_eq!(f.x, 3.0);
}

#[test]
fn nan_keeps_no_sign_guarantee() {
    let doc = value("a = nan\nb = +nan\nc = -nan");
    for key in ["a", "b", "c"] {
        assert!(doc[key].as_float().unwrap().is_nan());
    }
}

#[test]
fn enums_bind_from_strings_and_single_key_tables() {
    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Info,
        Warn,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Shape {
        Circle(f64),
        Rect { w: f64, h: f64 },
    }

    #[derive(Deserialize)]
    struct Doc {
        level: Level,
        shape: Shape,
        boxy: Shape,
    }

    let doc: Doc = crate::from_str(indoc! {r#"
        level = "warn"
        shape = { circle = 2.5 }
        boxy = { rect = { w = 1.0, h = 2.0 } }
    "#})
    .unwrap();
    assert_eq!(doc.level, Level::Warn);
    assert_eq!(doc.shape, Shape::Circle(2.5));
    assert_eq!(doc.boxy, Shape::Rect { w: 1.0, h: 2.0 });

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum Only {
        This,
    }
    let err = crate::from_str::<std::collections::HashMap<String, Only>>("x = \"that\"")
        .unwrap_err();
    assert!(err.to_string().contains("unknown variant"));
}

#[test]
fn unknown_fields_are_still_validated() {
    #[derive(Deserialize)]
    struct Sparse {
        #[allow(dead_code)]
        keep: i64,
    }

    // the ignored value carries an invalid escape; it must still fail
    assert!(crate::from_str::<Sparse>("keep = 1\ndrop = \"\\q\"").is_err());
}

#[test]
fn missing_field_error() {
    #[derive(Debug, Deserialize)]
    struct Needs {
        #[allow(dead_code)]
        a: i64,
    }
    let err = crate::from_str::<Needs>("").unwrap_err();
    assert!(err.to_string().contains("missing field"));
}

#[test]
fn number_mode_promotes_only_dynamic_leaves() {
    let decoder = Decoder::new().number_mode(NumberMode::PromoteToFloat);

    let doc: Value = decoder.decode("x = 1").unwrap();
    assert_eq!(doc["x"], Value::Float(1.0));

    // typed integer destinations stay exact
    #[derive(Deserialize)]
    struct I {
        x: i64,
    }
    let typed: I = decoder.decode("x = 1").unwrap();
    assert_eq!(typed.x, 1);
}

#[test]
fn lenient_mode_lets_later_definitions_win() {
    let decoder = Decoder::new().strict_tables(false);

    let doc: Value = decoder.decode("a = 1\na = 2").unwrap();
    assert_eq!(doc["a"].as_integer(), Some(2));

    let doc: Value = decoder
        .decode("[t]\nx = 1\n[t]\ny = 2")
        .unwrap();
    assert_eq!(doc["t"]["x"].as_integer(), Some(1));
    assert_eq!(doc["t"]["y"].as_integer(), Some(2));
}

#[test]
fn from_slice_validates_utf8() {
    let doc: Value = crate::from_slice(b"a = 1").unwrap();
    assert_eq!(doc["a"].as_integer(), Some(1));

    let err = crate::from_slice::<Value>(b"a = \"\xFF\"").unwrap_err();
    assert!(matches!(err.kind(), crate::ErrorKind::InvalidUtf8));
}

#[test]
fn string_escape_coverage() {
    assert_doc(
        r#"s = "\u00E9 \U0001F600 \t \"q\" \\""#,
        json!({"s": "é 😀 \t \"q\" \\"}),
    );
    // literal strings take bytes as they are
    assert_doc(r#"s = 'C:\Users\node'"#, json!({"s": "C:\\Users\\node"}));
}

#[test]
fn rejects_deferred_scalar_errors() {
    // these pass the grammar and fail at scalar decode time
    rejects("a = \"\\q\"");
    rejects("a = \"\\uD800\"");
    rejects("a = \"\\x41\"");
    rejects("a = 9223372036854775808");
    rejects("a = -9223372036854775809");
    rejects("a = 0x8000000000000000");
    rejects("a = 2021-02-30");
    rejects("a = 2021-13-01");
    rejects("a = 24:00:00");
    rejects("a = 00:60:00");
    rejects("a = 1979-05-27T07:32:00+24:00");
    rejects("a = \"\"\"x\\  y\"\"\"");
}

#[test]
fn rejects_structural_and_syntactic_errors() {
    rejects("a = 1\na = 2");
    rejects("a.b = 1\n[a]\nb = 2");
    rejects("a = 01");
    rejects("a = 1__2");
    rejects("a = +0x1");
    rejects("a = truE");
    rejects("a = {x = 1,}");
    rejects("a = [1,,2]");
    rejects("a = 'b\nc'");
    rejects("[a]]");
    rejects("a = 1\rb = 2");
}

#[test]
fn accepts_awkward_but_valid_documents() {
    assert_doc(r#""" = "empty key""#, json!({"": "empty key"}));
    assert_doc("1979-05-27 = \"a bare key\"", json!({"1979-05-27": "a bare key"}));
    assert_doc(
        "a = \"\"\"\"quoted\" \"\"\"",
        json!({"a": "\"quoted\" "}),
    );
    assert_doc("a = '''two'': more'''", json!({"a": "two'': more"}));
    // serde_json maps a NaN to null; the point is that it decodes
    assert_doc("inf = nan", json!({"inf": null}));
}

#[test]
fn error_printer_renders_the_offending_line() {
    let err = crate::from_str::<Value>("ok = 1\nok = 2").unwrap_err();
    assert!(err.to_string().contains("duplicate key `ok`"));
    assert!(err.to_string().contains("line 2"));

    let rendered = err.printer().source("ok = 1\nok = 2").render();
    assert!(rendered.contains("duplicate key `ok`"));
    assert!(rendered.contains("ok = 2"));
}

#[test]
fn deep_document_end_to_end() {
    let source = indoc! {r#"
        title = "registry"

        [server]
        bind = "0.0.0.0"
        port = 4873
        upstreams = [
            "https://a.example",
            "https://b.example", # secondary
        ]

        [server.limits]
        max-body = 10_485_760
        timeout = 30.5

        [[package.rules]]
        pattern = "@internal/*"
        allow = true

        [[package.rules]]
        pattern = "*"
        allow = false
    "#};
    assert_doc(
        source,
        json!({
            "title": "registry",
            "server": {
                "bind": "0.0.0.0",
                "port": 4873,
                "upstreams": ["https://a.example", "https://b.example"],
                "limits": {"max-body": 10485760, "timeout": 30.5},
            },
            "package": {
                "rules": [
                    {"pattern": "@internal/*", "allow": true},
                    {"pattern": "*", "allow": false},
                ],
            },
        }),
    );
}
