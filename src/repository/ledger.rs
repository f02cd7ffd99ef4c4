//! Shared query building for the movement ledgers

use crate::models::filter::RecordFilter;
use sqlx::{postgres::PgArguments, query::QueryAs, Postgres};

/// How a ledger table is filtered and ordered
pub(crate) struct Ledger {
    pub table: &'static str,
    /// Column the date range and "most recent" ordering apply to
    pub date_column: &'static str,
    /// Any of these matching the base filter selects the row
    pub base_columns: &'static [&'static str],
}

pub(crate) const TRANSFERS: Ledger = Ledger {
    table: "transfers",
    date_column: "created_at",
    base_columns: &["from_base", "to_base"],
};

pub(crate) const PURCHASES: Ledger = Ledger {
    table: "purchases",
    date_column: "purchase_date",
    base_columns: &["base"],
};

pub(crate) const ASSIGNMENTS: Ledger = Ledger {
    table: "assignments",
    date_column: "start_date",
    base_columns: &["base"],
};

pub(crate) const EXPENDITURES: Ledger = Ledger {
    table: "expenditures",
    date_column: "expenditure_date",
    base_columns: &["base"],
};

impl Ledger {
    /// 构建带过滤条件的查询语句，参数顺序与 `bind_filter` 一致
    pub fn select_sql(&self, filter: &RecordFilter) -> String {
        let mut query = format!(
            "SELECT r.* FROM {} r JOIN assets a ON a.id = r.asset_id WHERE 1=1",
            self.table
        );
        let mut index = 0;

        if filter.base.is_some() {
            index += 1;
            let clause = self
                .base_columns
                .iter()
                .map(|column| format!("r.{} = ${}", column, index))
                .collect::<Vec<_>>()
                .join(" OR ");
            query.push_str(&format!(" AND ({})", clause));
        }
        if filter.asset_type.is_some() {
            index += 1;
            query.push_str(&format!(" AND a.asset_type = ${}", index));
        }
        if filter.asset_id.is_some() {
            index += 1;
            query.push_str(&format!(" AND r.asset_id = ${}", index));
        }
        if filter.range.start.is_some() {
            index += 1;
            query.push_str(&format!(" AND r.{} >= ${}", self.date_column, index));
        }
        if filter.range.end.is_some() {
            index += 1;
            query.push_str(&format!(" AND r.{} <= ${}", self.date_column, index));
        }

        query.push_str(&format!(
            " ORDER BY r.{} DESC, r.id DESC LIMIT ${} OFFSET ${}",
            self.date_column,
            index + 1,
            index + 2
        ));
        query
    }
}

pub(crate) fn bind_filter<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    filter: &RecordFilter,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    if let Some(base) = &filter.base {
        query = query.bind(base.clone());
    }
    if let Some(asset_type) = &filter.asset_type {
        query = query.bind(asset_type.clone());
    }
    if let Some(asset_id) = filter.asset_id {
        query = query.bind(asset_id);
    }
    if let Some(start) = filter.range.start {
        query = query.bind(start);
    }
    if let Some(end) = filter.range.end {
        query = query.bind(end);
    }
    query.bind(filter.limit).bind(filter.offset)
}
