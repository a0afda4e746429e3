use indoc::indoc;

use super::{dump, parse_err};

#[test]
fn all_four_temporal_shapes() {
    let source = indoc! {r#"
        a = 1979-05-27T07:32:00Z
        b = 1979-05-27t00:32:00.999999-07:00
        c = 1979-05-27 07:32:00
        d = 1979-05-27
        e = 07:32:00
        f = 00:32:00.5
    "#};
    insta::assert_snapshot!(dump(source), @r#"
    KeyValue
      OffsetDateTime "1979-05-27T07:32:00Z"
      Key "a"
    KeyValue
      OffsetDateTime "1979-05-27t00:32:00.999999-07:00"
      Key "b"
    KeyValue
      LocalDateTime "1979-05-27 07:32:00"
      Key "c"
    KeyValue
      LocalDate "1979-05-27"
      Key "d"
    KeyValue
      LocalTime "07:32:00"
      Key "e"
    KeyValue
      LocalTime "00:32:00.5"
      Key "f"
    "#);
}

#[test]
fn date_followed_by_non_digit_stays_a_date() {
    // the space separator only continues into a time when a digit follows
    insta::assert_snapshot!(dump("d = 1979-05-27 # released"), @r##"
    KeyValue
      LocalDate "1979-05-27"
      Key "d"
    Comment "# released"
    "##);
}

#[test]
fn dates_inside_arrays_end_at_the_separator() {
    insta::assert_snapshot!(dump("v = [1979-05-27, 07:32:00]"), @r#"
    KeyValue
      Array
        LocalDate "1979-05-27"
        LocalTime "07:32:00"
      Key "v"
    "#);
}

#[test]
fn malformed_lexemes_are_rejected() {
    assert!(parse_err("a = 1979-05-27T").contains("malformed date-time"));
    assert!(parse_err("a = 1979-05-27T07:32").contains("malformed date-time"));
    assert!(parse_err("a = 07:32").contains("malformed date-time"));
    assert!(parse_err("a = 07:32:00.").contains("malformed date-time"));
    assert!(parse_err("a = 1979-05-2").contains("malformed date-time"));
    assert!(parse_err("a = 1979-05-27T07:32:00+07").contains("malformed date-time"));
}

#[test]
fn seconds_are_required() {
    // TOML 1.0 keeps RFC 3339's mandatory seconds
    assert!(parse_err("a = 1979-05-27T07:32Z").contains("malformed date-time"));
}
