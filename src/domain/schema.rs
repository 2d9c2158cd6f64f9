/// 代理主鍵欄位，值由執行序號提供
pub const SURROGATE_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
}

const fn col(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef { name, sql_type }
}

pub const APPFIGURES_COLUMNS: &[ColumnDef] = &[
    col("product_id", "BIGINT"),
    col("name", "TEXT"),
    col("app_platform", "TEXT"),
    col("weekly_downloads", "INT"),
    col("net_downloads", "INT"),
    col("updates", "INT"),
    col("week_of", "DATE"),
    col("year_of", "INT"),
];

pub const ZENDESK_COLUMNS: &[ColumnDef] = &[
    col("ticket_id", "BIGINT"),
    col("created_at", "TEXT"),
    col("updated_at", "TEXT"),
    col("url", "TEXT"),
    col("group_stations", "INT"),
    col("reopens", "INT"),
    col("replies", "INT"),
    col("assignee_updated_at", "TEXT"),
    col("requester_updated_at", "TEXT"),
    col("status_updated_at", "TEXT"),
    col("initially_assigned_at", "TEXT"),
    col("assigned_at", "TEXT"),
    col("solved_at", "TEXT"),
    col("latest_comment_added_at", "TEXT"),
    col("first_resolution_time_in_minutes_calendar", "INT"),
    col("first_resolution_time_in_minutes_business", "INT"),
    col("reply_time_in_minutes_calendar", "INT"),
    col("reply_time_in_minutes_business", "INT"),
    col("full_resolution_time_in_minutes_calendar", "INT"),
    col("full_resolution_time_in_minutes_business", "INT"),
    col("agent_wait_time_in_minutes_calendar", "INT"),
    col("agent_wait_time_in_minutes_business", "INT"),
    col("requester_wait_time_in_minutes_calendar", "INT"),
    col("requester_wait_time_in_minutes_business", "INT"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    pub fn appfigures(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: APPFIGURES_COLUMNS,
        }
    }

    pub fn zendesk(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: ZENDESK_COLUMNS,
        }
    }

    pub fn create_sql(&self) -> String {
        let mut definitions = vec![format!("{} INTEGER NOT NULL PRIMARY KEY", SURROGATE_KEY)];
        definitions.extend(
            self.columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.sql_type)),
        );
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            definitions.join(", ")
        )
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}
