use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_display_and_parse() {
    let m = YearMonth::new(2021, 3).unwrap();
    assert_eq!(m.to_string(), "2021-03");
    assert_eq!("2021-03".parse::<YearMonth>().unwrap(), m);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("2021".parse::<YearMonth>().is_err());
    assert!("2021-13".parse::<YearMonth>().is_err());
    assert!("march 2021".parse::<YearMonth>().is_err());
}

#[test]
fn test_url_segment_uses_lowercase_month_name() {
    let m = YearMonth::new(2021, 3).unwrap();
    assert_eq!(m.url_segment(), "2021march");
    assert_eq!(YearMonth::epoch().url_segment(), "2015august");
}

#[test]
fn test_next_rolls_over_year() {
    let dec = YearMonth::new(2019, 12).unwrap();
    assert_eq!(dec.next(), YearMonth::new(2020, 1));
}

#[test]
fn test_containing_truncates_to_first_day() {
    let m = YearMonth::containing(date(2024, 2, 29));
    assert_eq!(m.first_day(), date(2024, 2, 1));
}

#[test]
fn test_crawl_range_ends_at_last_complete_month() {
    let months: Vec<_> = MonthRange::for_crawl(date(2015, 10, 18)).collect();
    assert_eq!(
        months,
        vec![YearMonth::new(2015, 8).unwrap(), YearMonth::new(2015, 9).unwrap()]
    );
}

#[test]
fn test_crawl_range_on_first_of_month() {
    // One month back lands exactly on the first day, which is excluded.
    let months: Vec<_> = MonthRange::for_crawl(date(2015, 10, 1)).collect();
    assert_eq!(months, vec![YearMonth::new(2015, 8).unwrap()]);
}

#[test]
fn test_crawl_range_empty_before_epoch() {
    assert_eq!(MonthRange::for_crawl(date(2015, 9, 1)).count(), 0);
}

#[test]
fn test_crawl_range_length() {
    // 2015-08 through 2026-09 inclusive
    let count = MonthRange::for_crawl(date(2026, 10, 19)).count();
    assert_eq!(count, 134);
}
