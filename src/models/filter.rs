//! Shared query filters for records and dashboards

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive date range parsed from `startDate` / `endDate` query parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
    /// A plain end date covers the whole day.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, String> {
        let start = start
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_bound(s, Bound::Start))
            .transpose()?;
        let end = end
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_bound(s, Bound::End))
            .transpose()?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err("startDate must not be after endDate".to_string());
            }
        }

        Ok(Self { start, end })
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD or RFC 3339", raw))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| "Invalid end of day".to_string())?,
    };
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Filter applied to the movement ledgers (transfers, purchases,
/// assignments, expenditures)
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// For transfers this matches either end of the movement
    pub base: Option<String>,
    pub asset_type: Option<String>,
    pub asset_id: Option<Uuid>,
    pub range: DateRange,
    pub limit: i64,
    pub offset: i64,
}

impl RecordFilter {
    pub fn recent(base: Option<String>, asset_type: Option<String>, range: DateRange, limit: i64) -> Self {
        Self {
            base,
            asset_type,
            asset_id: None,
            range,
            limit,
            offset: 0,
        }
    }

    pub fn for_asset(asset_id: Uuid, limit: i64) -> Self {
        Self {
            asset_id: Some(asset_id),
            limit,
            ..Default::default()
        }
    }
}

/// List query parameters shared by the ledger endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListQuery {
    pub base: Option<String>,
    pub asset_type: Option<String>,
    pub asset_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RecordListQuery {
    /// `base` is the already-scoped base, not the raw parameter
    pub fn into_filter(self, base: Option<String>) -> Result<RecordFilter, String> {
        let range = DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?;
        let page = Pagination {
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        }
        .normalized();

        Ok(RecordFilter {
            base,
            asset_type: self.asset_type.filter(|t| !t.trim().is_empty()),
            asset_id: self.asset_id,
            range,
            limit: page.limit,
            offset: page.offset,
        })
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// `limit` / `offset` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Clamps into `1..=MAX_PAGE_SIZE` and a non-negative offset
    pub fn normalized(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_dates_cover_whole_days() {
        let range = DateRange::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap();
        let start = range.start.unwrap();
        let end = range.end.unwrap();

        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(end >= "2024-03-31T23:59:59Z".parse::<DateTime<Utc>>().unwrap());
        assert!(end < "2024-04-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert!(end > start);
    }

    #[test]
    fn test_parse_rfc3339_and_empty_values() {
        let range = DateRange::parse(Some("2024-03-01T12:00:00+02:00"), Some("")).unwrap();
        assert_eq!(range.start.unwrap().to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert!(range.end.is_none());

        assert_eq!(DateRange::parse(None, None).unwrap(), DateRange::default());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(DateRange::parse(Some("03/01/2024"), None).is_err());
        assert!(DateRange::parse(Some("2024-04-01"), Some("2024-03-01")).is_err());
    }

    #[test]
    fn test_record_list_query_into_filter() {
        let query = RecordListQuery {
            base: Some("ignored".to_string()),
            asset_type: Some(" ".to_string()),
            start_date: Some("2024-01-01".to_string()),
            limit: Some(1_000),
            ..Default::default()
        };
        let filter = query.into_filter(Some("Base-A".to_string())).unwrap();

        assert_eq!(filter.base.as_deref(), Some("Base-A"));
        assert!(filter.asset_type.is_none());
        assert!(filter.range.start.is_some());
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn test_pagination_is_clamped() {
        let page = Pagination { limit: 10_000, offset: -5 }.normalized();
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.offset, 0);

        let page = Pagination { limit: 0, offset: 3 }.normalized();
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 3);
    }
}
