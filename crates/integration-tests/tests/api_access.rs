//! Role checks and request validation.
//!
//! Every case here is rejected before the handler reaches the database.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use mise_core::EmployeeRole;
use mise_integration_tests::TestContext;
use serde_json::{Value, json};

async fn send_as(
    ctx: &TestContext,
    role: EmployeeRole,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> mise_integration_tests::TestResponse {
    let token = ctx.token(7, role);
    ctx.send(method, uri, Some(&token), body.as_ref()).await
}

// =============================================================================
// Role checks
// =============================================================================

#[tokio::test]
async fn test_team_member_cannot_use_leader_routes() {
    let ctx = TestContext::new();
    let cases = [
        (
            Method::PUT,
            "/api/kitchen/checklists/opening/items",
            Some(json!({ "items": [{ "label": "Fryers on" }] })),
        ),
        (Method::GET, "/api/leadership/360", None),
        (Method::DELETE, "/api/leadership/360/3", None),
        (Method::GET, "/api/documentation", None),
        (Method::DELETE, "/api/documentation/3", None),
        (Method::POST, "/api/setup-sheets/templates", Some(json!({ "name": "Weekday" }))),
        (Method::DELETE, "/api/setup-sheets/4", None),
    ];

    for (method, uri, body) in cases {
        let response = send_as(&ctx, EmployeeRole::TeamMember, method.clone(), uri, body).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(
            response.error(),
            Some("Forbidden: leader access required"),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn test_leader_cannot_use_director_routes() {
    let ctx = TestContext::new();
    let cases = [
        (Method::PUT, "/api/settings", Some(json!({ "utcOffsetMinutes": -300 }))),
        (
            Method::POST,
            "/api/employees",
            Some(json!({ "email": "new@example.com", "name": "New", "password": "long enough" })),
        ),
        (Method::DELETE, "/api/employees/2", None),
    ];

    for (method, uri, body) in cases {
        let response = send_as(&ctx, EmployeeRole::Leader, method.clone(), uri, body).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_unknown_checklist_type_is_bad_request() {
    let ctx = TestContext::new();
    let response = send_as(
        &ctx,
        EmployeeRole::TeamMember,
        Method::GET,
        "/api/kitchen/checklists/brunch/items",
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_checklist_rejects_bad_lists() {
    let ctx = TestContext::new();
    let bodies = [
        json!({ "items": [] }),
        json!({ "items": [{ "label": "  " }] }),
        json!({ "items": [{ "label": "Mop" }, { "label": "mop " }] }),
    ];

    for body in bodies {
        let response = send_as(
            &ctx,
            EmployeeRole::Leader,
            Method::PUT,
            "/api/kitchen/checklists/closing/items",
            Some(body.clone()),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn test_waste_entry_rejects_bad_amounts() {
    let ctx = TestContext::new();
    let body = json!({
        "shiftDate": "2024-03-12",
        "itemName": "Fries",
        "quantity": "0",
        "cost": "1.25",
        "reason": "overproduction"
    });
    let response = send_as(
        &ctx,
        EmployeeRole::TeamMember,
        Method::POST,
        "/api/kitchen/waste",
        Some(body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().unwrap().contains("quantity"));
}

#[tokio::test]
async fn test_evaluation_rejects_duplicate_rater() {
    let ctx = TestContext::new();
    let body = json!({
        "subjectId": 3,
        "raters": [
            { "raterId": 4, "relationship": "peer" },
            { "raterId": 4, "relationship": "manager" }
        ]
    });
    let response = send_as(
        &ctx,
        EmployeeRole::Leader,
        Method::POST,
        "/api/leadership/360",
        Some(body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_evaluation_rejects_self_rating_by_someone_else() {
    let ctx = TestContext::new();
    let body = json!({
        "subjectId": 3,
        "raters": [{ "raterId": 4, "relationship": "self" }]
    });
    let response = send_as(
        &ctx,
        EmployeeRole::Leader,
        Method::POST,
        "/api/leadership/360",
        Some(body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reflection_requires_content() {
    let ctx = TestContext::new();
    let body = json!({ "title": "Friday", "answers": { "What went well?": " " } });
    let response = send_as(
        &ctx,
        EmployeeRole::TeamMember,
        Method::POST,
        "/api/leadership/reflections",
        Some(body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_documentation_requires_title() {
    let ctx = TestContext::new();
    let body = json!({
        "employeeId": 3,
        "kind": "coaching",
        "title": " ",
        "description": "Late twice this week"
    });
    let response = send_as(
        &ctx,
        EmployeeRole::Leader,
        Method::POST,
        "/api/documentation",
        Some(body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_reject_out_of_range_offset() {
    let ctx = TestContext::new();
    let response = send_as(
        &ctx,
        EmployeeRole::Director,
        Method::PUT,
        "/api/settings",
        Some(json!({ "utcOffsetMinutes": 2000 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_employee_create_rejects_bad_email() {
    let ctx = TestContext::new();
    let body = json!({ "email": "nope", "name": "Pat", "password": "long enough" });
    let response = send_as(
        &ctx,
        EmployeeRole::Director,
        Method::POST,
        "/api/employees",
        Some(body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_setup_sheet_range_must_be_ordered() {
    let ctx = TestContext::new();
    let response = send_as(
        &ctx,
        EmployeeRole::TeamMember,
        Method::GET,
        "/api/setup-sheets?from=2024-03-16&to=2024-03-10",
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let ctx = TestContext::new();
    let response = send_as(
        &ctx,
        EmployeeRole::Leader,
        Method::GET,
        "/api/leadership/360/abc",
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
