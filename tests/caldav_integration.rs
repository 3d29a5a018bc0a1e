use pdfcal::calendar::{CalDavCalendar, CalendarHandle, CalendarService};
use pdfcal::materializer::materialize_events;
use pdfcal::model::EventRequest;
use pdfcal::{PipelineError, extract_dates};
use mockito::Server;

#[tokio::test]
async fn test_unauthorized_access_check_creates_no_events() {
    // 1. Setup Mock Server
    let mut server = Server::new_async().await;
    let url = server.url();

    // 2. Mock: the access check is rejected
    let mock_access = server
        .mock("PROPFIND", "/cal/")
        .with_status(401)
        .create_async()
        .await;

    // 3. Mock: no PUT may ever reach the server
    let mock_put = server
        .mock("PUT", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = CalDavCalendar::new(&url, "user", "wrong", true)
        .unwrap()
        .with_calendar("/cal/");

    let dates = extract_dates("Exam on 6/12/2025 and retake 7/3/2025");
    let result = materialize_events(&client, &dates, "Exam").await;

    assert!(!result.success);
    assert_eq!(result.created, 0);
    assert!(matches!(
        result.error,
        Some(PipelineError::AuthorizationDenied { .. })
    ));

    mock_access.assert_async().await;
    mock_put.assert_async().await;
}

#[tokio::test]
async fn test_save_puts_new_vevent_resource() {
    let mut server = Server::new_async().await;
    let url = server.url();

    // CREATE semantics: must not overwrite an existing resource
    let mock_put = server
        .mock("PUT", mockito::Matcher::Regex(r"^/cal/.*\.ics$".to_string()))
        .match_header("If-None-Match", "*")
        .match_body(mockito::Matcher::Regex(r"SUMMARY:Exam".to_string()))
        .with_status(201)
        .create_async()
        .await;

    let client = CalDavCalendar::new(&url, "user", "pass", true)
        .unwrap()
        .with_calendar("/cal/");
    let handle = CalendarHandle {
        name: "cal".to_string(),
        href: "/cal/".to_string(),
    };

    let date = &extract_dates("6/12/2025")[0];
    let event = EventRequest::new("Exam", date);
    let result = client.save(&event, &handle).await;

    assert!(result.is_ok(), "Save should succeed: {:?}", result.err());
    mock_put.assert_async().await;
}

#[tokio::test]
async fn test_server_error_on_save_is_reported() {
    let mut server = Server::new_async().await;
    let url = server.url();

    let _mock_put = server
        .mock("PUT", mockito::Matcher::Regex(r"^/cal/.*\.ics$".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let client = CalDavCalendar::new(&url, "user", "pass", true).unwrap();
    let handle = CalendarHandle {
        name: "cal".to_string(),
        href: "/cal".to_string(),
    };

    let date = &extract_dates("6/12/2025")[0];
    let event = EventRequest::new("Exam", date);
    assert!(client.save(&event, &handle).await.is_err());
}

fn privilege_response(href: &str, privileges: &[&str]) -> String {
    let granted: String = privileges
        .iter()
        .map(|p| format!("<d:privilege><d:{}/></d:privilege>", p))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>{}</d:href>
    <d:propstat>
      <d:prop><d:current-user-privilege-set>{}</d:current-user-privilege-set></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#,
        href, granted
    )
}

#[tokio::test]
async fn test_read_only_calendar_is_refused_before_put() {
    let mut server = Server::new_async().await;
    let url = server.url();

    // A shared calendar the user may read but not write
    let mock_privileges = server
        .mock("PROPFIND", "/shared/")
        .match_header("Depth", "0")
        .match_body(mockito::Matcher::Regex("current-user-privilege-set".to_string()))
        .with_status(207)
        .with_header("Content-Type", "application/xml; charset=utf-8")
        .with_body(privilege_response("/shared/", &["read", "read-current-user-privilege-set"]))
        .create_async()
        .await;
    let mock_put = server
        .mock("PUT", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = CalDavCalendar::new(&url, "user", "pass", true)
        .unwrap()
        .with_calendar("/shared/");
    let dates = extract_dates("Review 5/1/2024 and 6/1/2024");
    let result = materialize_events(&client, &dates, "Review").await;

    assert!(!result.success);
    assert_eq!(result.created, 0);
    assert!(matches!(
        result.error,
        Some(PipelineError::AuthorizationDenied { .. })
    ));
    mock_privileges.assert_async().await;
    mock_put.assert_async().await;
}

#[tokio::test]
async fn test_writable_calendar_receives_every_event() {
    let mut server = Server::new_async().await;
    let url = server.url();

    let _mock_privileges = server
        .mock("PROPFIND", "/cal/")
        .with_status(207)
        .with_header("Content-Type", "application/xml; charset=utf-8")
        .with_body(privilege_response("/cal/", &["read", "write"]))
        .create_async()
        .await;
    let mock_put = server
        .mock("PUT", mockito::Matcher::Regex(r"^/cal/.*\.ics$".to_string()))
        .match_header("If-None-Match", "*")
        .with_status(201)
        .expect(2)
        .create_async()
        .await;

    let client = CalDavCalendar::new(&url, "user", "pass", true)
        .unwrap()
        .with_calendar("/cal/");
    let dates = extract_dates("Review 5/1/2024 and 6/1/2024");
    let result = materialize_events(&client, &dates, "Review").await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.created, 2);
    mock_put.assert_async().await;
}

#[tokio::test]
async fn test_calendar_discovery_runs_once_per_client() {
    let mut server = Server::new_async().await;
    let url = format!("{}/dav/", server.url());

    // Principal lookup fails, so the configured URL itself becomes the calendar
    let mock_principal = server
        .mock("PROPFIND", "/dav/")
        .match_body(mockito::Matcher::Regex("current-user-principal".to_string()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let mock_privileges = server
        .mock("PROPFIND", "/dav/")
        .match_body(mockito::Matcher::Regex("current-user-privilege-set".to_string()))
        .with_status(207)
        .with_header("Content-Type", "application/xml; charset=utf-8")
        .with_body(privilege_response("/dav/", &["all"]))
        .expect(1)
        .create_async()
        .await;
    let mock_put = server
        .mock("PUT", mockito::Matcher::Regex(r"^/dav/.*\.ics$".to_string()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let client = CalDavCalendar::new(&url, "user", "pass", true).unwrap();
    let dates = extract_dates("Standup 3/2/2026");
    let result = materialize_events(&client, &dates, "Standup").await;

    assert!(result.success, "{:?}", result.error);
    let handle = client.default_calendar().await.unwrap();
    assert_eq!(handle.href, "/dav/");

    mock_principal.assert_async().await;
    mock_privileges.assert_async().await;
    mock_put.assert_async().await;
}
