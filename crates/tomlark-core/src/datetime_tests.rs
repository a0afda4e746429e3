use crate::datetime::{Date, Datetime, Offset, Time};

fn parse(s: &str) -> Datetime {
    s.parse().unwrap()
}

fn parse_err(s: &str) -> String {
    s.parse::<Datetime>().unwrap_err().to_string()
}

#[test]
fn offset_datetime() {
    let dt = parse("1979-05-27T07:32:00Z");
    assert_eq!(
        dt.date,
        Some(Date {
            year: 1979,
            month: 5,
            day: 27
        })
    );
    assert_eq!(
        dt.time,
        Some(Time {
            hour: 7,
            minute: 32,
            second: 0,
            nanosecond: 0
        })
    );
    assert_eq!(dt.offset, Some(Offset::Z));
}

#[test]
fn numeric_offsets() {
    assert_eq!(
        parse("1979-05-27T00:32:00-07:00").offset,
        Some(Offset::Custom { minutes: -420 })
    );
    assert_eq!(
        parse("1979-05-27T00:32:00+05:30").offset,
        Some(Offset::Custom { minutes: 330 })
    );
}

#[test]
fn lowercase_and_space_separators() {
    assert_eq!(parse("1979-05-27t07:32:00z"), parse("1979-05-27T07:32:00Z"));
    assert_eq!(parse("1979-05-27 07:32:00Z"), parse("1979-05-27T07:32:00Z"));
}

#[test]
fn local_shapes() {
    let d = parse("1979-05-27");
    assert!(d.time.is_none() && d.offset.is_none());

    let t = parse("07:32:00");
    assert!(t.date.is_none() && t.offset.is_none());

    let ldt = parse("1979-05-27T07:32:00");
    assert!(ldt.date.is_some() && ldt.time.is_some() && ldt.offset.is_none());
}

#[test]
fn fractional_seconds_truncate_after_nine_digits() {
    let t = parse("00:00:00.123456789999").time.unwrap();
    assert_eq!(t.nanosecond, 123_456_789);

    // short fractions scale up to nanoseconds
    let t = parse("00:00:00.25").time.unwrap();
    assert_eq!(t.nanosecond, 250_000_000);
}

#[test]
fn leap_second_is_accepted() {
    let t = parse("1990-12-31T15:59:60-08:00").time.unwrap();
    assert_eq!(t.second, 60);
}

#[test]
fn leap_years() {
    assert!("2000-02-29".parse::<Datetime>().is_ok());
    assert!("2024-02-29".parse::<Datetime>().is_ok());
    assert!(parse_err("1900-02-29").contains("out of range"));
    assert!(parse_err("2021-02-29").contains("out of range"));
}

#[test]
fn rejects_out_of_range_components() {
    assert!(parse_err("2021-13-01").contains("month 13"));
    assert!(parse_err("2021-04-31").contains("day 31"));
    assert!(parse_err("2021-01-00").contains("day 0"));
    assert!(parse_err("24:00:00").contains("hour 24"));
    assert!(parse_err("00:60:00").contains("minute 60"));
    assert!(parse_err("00:00:61").contains("second 61"));
    assert!(parse_err("2021-01-01T00:00:00+24:00").contains("offset hour"));
}

#[test]
fn rejects_malformed_text() {
    assert!("1979-05-27T".parse::<Datetime>().is_err());
    assert!("1979-05-27T07:32".parse::<Datetime>().is_err());
    assert!("07:32".parse::<Datetime>().is_err());
    assert!("00:00:00.".parse::<Datetime>().is_err());
    assert!("1979/05/27".parse::<Datetime>().is_err());
    assert!("1979-05-27Z".parse::<Datetime>().is_err());
}

#[test]
fn display_round_trips_canonical_forms() {
    for s in [
        "1979-05-27T07:32:00Z",
        "1979-05-27T00:32:00-07:00",
        "1979-05-27T00:32:00.999999",
        "1979-05-27",
        "07:32:00",
        "00:00:00.25",
    ] {
        assert_eq!(parse(s).to_string(), s);
    }
}

#[test]
fn display_normalizes_separators() {
    assert_eq!(
        parse("1979-05-27 07:32:00z").to_string(),
        "1979-05-27T07:32:00Z"
    );
}
