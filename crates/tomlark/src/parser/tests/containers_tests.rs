use indoc::indoc;

use super::dump;

#[test]
fn arrays_nest_and_allow_trailing_commas() {
    insta::assert_snapshot!(dump(r#"v = [1, "two", [true], ]"#), @r#"
    KeyValue
      Array
        Integer "1"
        String "\"two\""
        Array
          Bool "true"
      Key "v"
    "#);
}

#[test]
fn arrays_span_lines_and_swallow_comments() {
    let source = indoc! {r#"
        v = [
            1, # one
            # alone on a line
            2,
        ]
    "#};
    insta::assert_snapshot!(dump(source), @r#"
    KeyValue
      Array
        Integer "1"
        Integer "2"
      Key "v"
    "#);
}

#[test]
fn empty_containers() {
    insta::assert_snapshot!(dump("a = []\nb = {}"), @r#"
    KeyValue
      Array
      Key "a"
    KeyValue
      InlineTable
      Key "b"
    "#);
}

#[test]
fn inline_tables_hold_keyvals_in_order() {
    insta::assert_snapshot!(dump(r#"p = { x = 1, y.z = "w" }"#), @r#"
    KeyValue
      InlineTable
        KeyValue
          Integer "1"
          Key "x"
        KeyValue
          String "\"w\""
          Key "y"
          Key "z"
      Key "p"
    "#);
}

#[test]
fn array_of_inline_tables() {
    insta::assert_snapshot!(dump("points = [{x = 1}, {x = 2}]"), @r#"
    KeyValue
      Array
        InlineTable
          KeyValue
            Integer "1"
            Key "x"
        InlineTable
          KeyValue
            Integer "2"
            Key "x"
      Key "points"
    "#);
}

#[test]
fn multiline_string_inside_inline_table() {
    // the single-line rule constrains the table syntax, not its strings
    insta::assert_snapshot!(dump("t = { s = \"\"\"a\nb\"\"\" }"), @r#"
    KeyValue
      InlineTable
        KeyValue
          String "\"\"\"a\nb\"\"\""
          Key "s"
      Key "t"
    "#);
}
