use httpmock::prelude::*;
use report_etl::core::driver::{ReportDriver, TicketReportJob};
use report_etl::{BasicAuthFetcher, EtlError, SqliteStore};
use serde_json::json;

fn ticket(id: i64) -> serde_json::Value {
    json!({
        "id": id * 10,
        "ticket_id": id,
        "created_at": "2017-03-01T10:00:00Z",
        "updated_at": "2017-03-02T10:00:00Z",
        "url": format!("https://acme.zendesk.com/api/v2/ticket_metrics/{}.json", id * 10),
        "group_stations": 1,
        "reopens": 0,
        "replies": 2,
        "assignee_updated_at": null,
        "requester_updated_at": "2017-03-01T11:00:00Z",
        "status_updated_at": "2017-03-02T10:00:00Z",
        "initially_assigned_at": "2017-03-01T10:05:00Z",
        "assigned_at": "2017-03-01T10:05:00Z",
        "solved_at": null,
        "latest_comment_added_at": "2017-03-02T09:00:00Z",
        "first_resolution_time_in_minutes": {"calendar": 120, "business": 60},
        "reply_time_in_minutes": {"calendar": 15, "business": null},
        "full_resolution_time_in_minutes": {"calendar": null, "business": null},
        "agent_wait_time_in_minutes": {"calendar": 0, "business": 0},
        "requester_wait_time_in_minutes": null
    })
}

fn fetcher() -> BasicAuthFetcher {
    BasicAuthFetcher::new(reqwest::Client::new(), "agent@acme.io", "secret")
}

#[tokio::test]
async fn test_follows_next_page_until_total_count() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/ticket_metrics.json")
            .query_param("page", "1");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(1), ticket(2), ticket(3)],
            "next_page": server.url("/api/v2/ticket_metrics.json?page=2"),
            "previous_page": null,
            "count": 5
        }));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/ticket_metrics.json")
            .query_param("page", "2");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(4), ticket(5)],
            "next_page": null,
            "previous_page": server.url("/api/v2/ticket_metrics.json?page=1"),
            "count": 5
        }));
    });
    let page3 = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/ticket_metrics.json")
            .query_param("page", "3");
        then.status(200).json_body(json!({"ticket_metrics": [], "next_page": null, "count": 5}));
    });

    let store = SqliteStore::in_memory().await.unwrap();
    let mut driver = ReportDriver::new(store);
    let job = TicketReportJob {
        table: "zendeskdata".to_string(),
        url: server.url("/api/v2/ticket_metrics.json?page=1"),
    };

    let summary = driver.generate_ticket_report(&fetcher(), &job).await.unwrap();

    page1.assert_hits(1);
    page2.assert_hits(1);
    page3.assert_hits(0);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.rows, 5);
    assert_eq!(driver.sink_mut().row_count("zendeskdata").await.unwrap(), 5);
}

#[tokio::test]
async fn test_never_runs_past_reported_total() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "1");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(1), ticket(2), ticket(3)],
            "next_page": server.url("/tickets?page=2"),
            "count": 4
        }));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "2");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(4), ticket(5), ticket(6)],
            "next_page": server.url("/tickets?page=3"),
            "count": 6
        }));
    });
    let page3 = server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "3");
        then.status(200).json_body(json!({"ticket_metrics": [ticket(7)], "count": 6}));
    });

    let mut driver = ReportDriver::new(SqliteStore::in_memory().await.unwrap());
    let job = TicketReportJob {
        table: "zendeskdata".to_string(),
        url: server.url("/tickets?page=1"),
    };
    let summary = driver.generate_ticket_report(&fetcher(), &job).await.unwrap();

    page1.assert_hits(1);
    page2.assert_hits(1);
    page3.assert_hits(0);
    assert_eq!(summary.rows, 4);

    let max_ticket: i64 = sqlx::query_scalar("SELECT MAX(ticket_id) FROM zendeskdata")
        .fetch_one(driver.sink_mut().connection_mut())
        .await
        .unwrap();
    assert_eq!(max_ticket, 4);
}

#[tokio::test]
async fn test_pages_without_count_follow_next_page_to_the_end() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "1");
        then.status(200).json_body(json!({
            "ticket_metrics": [],
            "next_page": server.url("/tickets?page=2")
        }));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "2");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(1), ticket(2)],
            "next_page": server.url("/tickets?page=3")
        }));
    });
    let page3 = server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "3");
        then.status(200).json_body(json!({"ticket_metrics": [ticket(3)], "next_page": null}));
    });

    let mut driver = ReportDriver::new(SqliteStore::in_memory().await.unwrap());
    let job = TicketReportJob {
        table: "zendeskdata".to_string(),
        url: server.url("/tickets?page=1"),
    };
    let summary = driver.generate_ticket_report(&fetcher(), &job).await.unwrap();

    page1.assert_hits(1);
    page2.assert_hits(1);
    page3.assert_hits(1);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.rows, 3);
    assert_eq!(driver.sink_mut().row_count("zendeskdata").await.unwrap(), 3);
}

#[tokio::test]
async fn test_nulls_are_stored_as_zero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tickets");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(1)],
            "next_page": null,
            "count": 1
        }));
    });

    let mut driver = ReportDriver::new(SqliteStore::in_memory().await.unwrap());
    let job = TicketReportJob {
        table: "zendeskdata".to_string(),
        url: server.url("/tickets"),
    };
    driver.generate_ticket_report(&fetcher(), &job).await.unwrap();

    let conn = driver.sink_mut().connection_mut();
    let nulls: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM zendeskdata WHERE solved_at IS NULL \
         OR reply_time_in_minutes_business IS NULL \
         OR requester_wait_time_in_minutes_calendar IS NULL",
    )
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(nulls, 0);

    let (id, reply_business, first_calendar): (i64, i64, i64) = sqlx::query_as(
        "SELECT id, reply_time_in_minutes_business, first_resolution_time_in_minutes_calendar \
         FROM zendeskdata",
    )
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(id, 1);
    assert_eq!(reply_business, 0);
    assert_eq!(first_calendar, 120);
}

#[tokio::test]
async fn test_http_failure_aborts_after_committed_pages() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "1");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(1), ticket(2)],
            "next_page": server.url("/tickets?page=2"),
            "count": 10
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/tickets").query_param("page", "2");
        then.status(500);
    });

    let mut driver = ReportDriver::new(SqliteStore::in_memory().await.unwrap());
    let job = TicketReportJob {
        table: "zendeskdata".to_string(),
        url: server.url("/tickets?page=1"),
    };
    let err = driver.generate_ticket_report(&fetcher(), &job).await.unwrap_err();

    assert!(matches!(err, EtlError::TransportError { status: 500, .. }));
    assert!(!err.skips_report());
    // 第一頁已經 commit
    assert_eq!(driver.sink_mut().row_count("zendeskdata").await.unwrap(), 2);
}

#[tokio::test]
async fn test_previous_run_is_replaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tickets");
        then.status(200).json_body(json!({
            "ticket_metrics": [ticket(1), ticket(2)],
            "next_page": null,
            "count": 2
        }));
    });

    let mut driver = ReportDriver::new(SqliteStore::in_memory().await.unwrap());
    let job = TicketReportJob {
        table: "zendeskdata".to_string(),
        url: server.url("/tickets"),
    };
    driver.generate_ticket_report(&fetcher(), &job).await.unwrap();
    driver.generate_ticket_report(&fetcher(), &job).await.unwrap();

    assert_eq!(driver.sink_mut().row_count("zendeskdata").await.unwrap(), 2);
}
