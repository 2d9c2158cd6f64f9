use crate::domain::model::{ProductCatalog, Row, SqlValue};
use crate::domain::schema::SURROGATE_KEY;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// 將 mapper 的欄位順序對應到目標表目前的欄位順序
#[derive(Debug, Clone)]
pub struct RowLayout {
    columns: Vec<String>,
    positions: Vec<usize>,
}

impl RowLayout {
    /// `columns` 來自表格 introspection；代理主鍵不在 Row 之中
    pub fn resolve(table: &str, columns: &[String], fields: &[&str]) -> Result<Self> {
        let mut data_columns = Vec::new();
        let mut positions = Vec::new();

        for column in columns {
            if column.eq_ignore_ascii_case(SURROGATE_KEY) {
                continue;
            }
            let position = fields
                .iter()
                .position(|f| f.eq_ignore_ascii_case(column))
                .ok_or_else(|| EtlError::SchemaError {
                    table: table.to_string(),
                    message: format!("column '{}' has no mapped field", column),
                })?;
            data_columns.push(column.clone());
            positions.push(position);
        }

        Ok(Self {
            columns: data_columns,
            positions,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn project(&self, values: &[SqlValue]) -> Row {
        Row {
            values: self.positions.iter().map(|&i| values[i].clone()).collect(),
        }
    }
}

/// product listing 回應：{ "<id>": { "product": { "id", "name", "store" } } }
pub fn build_product_catalog(body: &Value) -> Result<ProductCatalog> {
    let entries = body.as_object().ok_or_else(|| EtlError::DecodeError {
        message: "product listing is not a JSON object".to_string(),
    })?;

    let mut catalog = ProductCatalog::new();
    for (key, entry) in entries {
        let product = entry.get("product").unwrap_or(entry);
        let id = product
            .get("id")
            .and_then(json_i64)
            .or_else(|| key.parse().ok())
            .ok_or_else(|| EtlError::DecodeError {
                message: format!("product entry '{}' has no id", key),
            })?;
        catalog.insert(
            id,
            text_or_empty(product.get("name")),
            text_or_empty(product.get("store")),
        );
    }
    Ok(catalog)
}

pub const SALES_FIELDS: &[&str] = &[
    "product_id",
    "name",
    "app_platform",
    "weekly_downloads",
    "net_downloads",
    "updates",
    "week_of",
    "year_of",
];

/// 每週銷售資料：{ "<week>": { "<product>": { "product_id", "downloads", ... } } }
pub fn map_sales_page(body: &Value, catalog: &ProductCatalog, year: i32) -> Result<Vec<Vec<SqlValue>>> {
    let weeks = body.as_object().ok_or_else(|| EtlError::DecodeError {
        message: "sales report is not a JSON object".to_string(),
    })?;

    let mut records = Vec::new();
    for (week_of, products) in weeks {
        let Some(products) = products.as_object() else {
            return Err(EtlError::DecodeError {
                message: format!("week '{}' has no product map", week_of),
            });
        };

        for (key, details) in products {
            let product_id = details
                .get("product_id")
                .and_then(json_i64)
                .or_else(|| key.parse().ok())
                .ok_or_else(|| EtlError::DecodeError {
                    message: format!("week '{}' entry '{}' has no product_id", week_of, key),
                })?;
            let product = catalog
                .get(product_id)
                .ok_or(EtlError::CatalogError { product_id })?;

            records.push(vec![
                SqlValue::Integer(product_id),
                SqlValue::Text(product.name.clone()),
                SqlValue::Text(product.platform.clone()),
                SqlValue::integer_or_zero(details.get("downloads")),
                SqlValue::integer_or_zero(details.get("net_downloads")),
                SqlValue::integer_or_zero(details.get("updates")),
                SqlValue::Text(week_of.clone()),
                SqlValue::Integer(i64::from(year)),
            ]);
        }
    }
    Ok(records)
}

const TICKET_SCALARS: &[&str] = &[
    "ticket_id",
    "created_at",
    "updated_at",
    "url",
    "group_stations",
    "reopens",
    "replies",
    "assignee_updated_at",
    "requester_updated_at",
    "status_updated_at",
    "initially_assigned_at",
    "assigned_at",
    "solved_at",
    "latest_comment_added_at",
];

const TICKET_DURATIONS: &[&str] = &[
    "first_resolution_time_in_minutes",
    "reply_time_in_minutes",
    "full_resolution_time_in_minutes",
    "agent_wait_time_in_minutes",
    "requester_wait_time_in_minutes",
];

pub fn ticket_fields() -> Vec<String> {
    let mut fields: Vec<String> = TICKET_SCALARS.iter().map(|f| f.to_string()).collect();
    for duration in TICKET_DURATIONS {
        fields.push(format!("{}_calendar", duration));
        fields.push(format!("{}_business", duration));
    }
    fields
}

/// 攤平一筆 ticket metric；任何 null 或缺值都寫成 0
pub fn map_ticket(ticket: &Value) -> Vec<SqlValue> {
    let mut values: Vec<SqlValue> = TICKET_SCALARS
        .iter()
        .map(|field| SqlValue::from_json_or_zero(ticket.get(*field)))
        .collect();

    for duration in TICKET_DURATIONS {
        let nested = ticket.get(*duration);
        for part in ["calendar", "business"] {
            values.push(SqlValue::from_json_or_zero(nested.and_then(|d| d.get(part))));
        }
    }
    values
}

fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{APPFIGURES_COLUMNS, ZENDESK_COLUMNS};
    use serde_json::json;

    fn table_columns(defs: &[crate::domain::schema::ColumnDef]) -> Vec<String> {
        std::iter::once(SURROGATE_KEY.to_string())
            .chain(defs.iter().map(|c| c.name.to_string()))
            .collect()
    }

    #[test]
    fn test_catalog_enrichment() {
        let mut catalog = ProductCatalog::new();
        catalog.insert(42, "MyApp", "ios");
        let body = json!({
            "2017-01-02": {
                "42": {"product_id": 42, "downloads": 10, "net_downloads": 9, "updates": 3}
            }
        });

        let records = map_sales_page(&body, &catalog, 2017).unwrap();
        let columns = table_columns(APPFIGURES_COLUMNS);
        let layout = RowLayout::resolve("appfiguresdata", &columns, SALES_FIELDS).unwrap();
        let row = layout.project(&records[0]);

        assert_eq!(row.len(), columns.len() - 1);
        assert_eq!(row.values[1], SqlValue::Text("MyApp".to_string()));
        assert_eq!(row.values[2], SqlValue::Text("ios".to_string()));
        assert_eq!(row.values[6], SqlValue::Text("2017-01-02".to_string()));
        assert_eq!(row.values[7], SqlValue::Integer(2017));
    }

    #[test]
    fn test_unknown_product_is_fatal() {
        let catalog = ProductCatalog::new();
        let body = json!({"2017-01-02": {"7": {"product_id": 7, "downloads": 1}}});

        match map_sales_page(&body, &catalog, 2017) {
            Err(EtlError::CatalogError { product_id }) => assert_eq!(product_id, 7),
            other => panic!("expected catalog error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_product_catalog() {
        let body = json!({
            "42": {"product": {"id": 42, "name": "MyApp", "store": "apple"}, "downloads": 100},
            "77": {"product": {"id": 77, "name": "Other", "store": "google_play"}}
        });
        let catalog = build_product_catalog(&body).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(77).unwrap().platform, "google_play");
    }

    #[test]
    fn test_ticket_nulls_become_zero() {
        let ticket = json!({
            "id": 9,
            "ticket_id": 1001,
            "created_at": "2017-03-01T10:00:00Z",
            "url": null,
            "reopens": null,
            "replies": 2,
            "reply_time_in_minutes": {"calendar": 30, "business": null},
            "agent_wait_time_in_minutes": null
        });

        let values = map_ticket(&ticket);
        let fields = ticket_fields();
        assert_eq!(values.len(), fields.len());

        let value_of = |name: &str| values[fields.iter().position(|f| f == name).unwrap()].clone();
        assert_eq!(value_of("ticket_id"), SqlValue::Integer(1001));
        assert_eq!(value_of("url"), SqlValue::ZERO);
        assert_eq!(value_of("reopens"), SqlValue::ZERO);
        assert_eq!(value_of("solved_at"), SqlValue::ZERO);
        assert_eq!(value_of("reply_time_in_minutes_calendar"), SqlValue::Integer(30));
        assert_eq!(value_of("reply_time_in_minutes_business"), SqlValue::ZERO);
        assert_eq!(value_of("agent_wait_time_in_minutes_calendar"), SqlValue::ZERO);
    }

    #[test]
    fn test_ticket_row_width_matches_table() {
        let columns = table_columns(ZENDESK_COLUMNS);
        let fields = ticket_fields();
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        let layout = RowLayout::resolve("zendeskdata", &columns, &field_refs).unwrap();

        let row = layout.project(&map_ticket(&json!({})));
        assert_eq!(row.len(), columns.len() - 1);
        assert!(row.values.iter().all(|v| *v == SqlValue::ZERO));
    }

    #[test]
    fn test_layout_follows_live_column_order() {
        let columns: Vec<String> = ["ID", "Year_Of", "Name", "Product_ID"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let layout = RowLayout::resolve("t", &columns, SALES_FIELDS).unwrap();
        let values = vec![
            SqlValue::Integer(42),
            SqlValue::Text("MyApp".to_string()),
            SqlValue::Text("ios".to_string()),
            SqlValue::Integer(1),
            SqlValue::Integer(1),
            SqlValue::Integer(0),
            SqlValue::Text("2017-01-02".to_string()),
            SqlValue::Integer(2017),
        ];

        let row = layout.project(&values);
        assert_eq!(layout.columns(), &["Year_Of", "Name", "Product_ID"]);
        assert_eq!(
            row.values,
            vec![
                SqlValue::Integer(2017),
                SqlValue::Text("MyApp".to_string()),
                SqlValue::Integer(42)
            ]
        );
    }

    #[test]
    fn test_unmapped_column_is_schema_error() {
        let columns = vec!["id".to_string(), "mystery".to_string()];
        let err = RowLayout::resolve("t", &columns, SALES_FIELDS).unwrap_err();
        assert!(err.skips_report());
    }
}
