use chrono::NaiveDate;

/// One row of the monthly viewership fact table.
///
/// Uniqueness key is `(game_id, month)`; `month` is the first day of the
/// measured month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRecord {
    pub game_id: String,
    pub month: NaiveDate,
    pub viewer_count: i64,
    pub viewer_count_peak: i64,
    pub stream_count: i64,
}
