//! HTTP surface exercised through the router without a socket.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use planilha_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> (Router, common::TestStore) {
    let t = common::store().await;
    let router = build_router(
        AppState {
            store: t.store.clone(),
        },
        1024 * 1024,
    );
    (router, t)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (router, _t) = app().await;
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
    assert_eq!(body["tenants"], 8);
}

#[tokio::test]
async fn test_tenant_registry_listing() {
    let (router, _t) = app().await;
    let (status, body) = send(&router, Method::GET, "/api/tenants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);
    assert_eq!(body[0], "BARRINHA");
}

#[tokio::test]
async fn test_put_and_get_cell() {
    let (router, _t) = app().await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/tenants/barrinha/cells",
        Some(json!({ "row": 0, "col": 0, "value": "Escola A" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous"], Value::Null);
    assert_eq!(body["type"], "text");

    let (status, body) = send(&router, Method::GET, "/api/tenants/BARRINHA/cells/0/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "Escola A");
    assert_eq!(body["type"], "text");

    let (status, _) = send(&router, Method::GET, "/api/tenants/BARRINHA/cells/5/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let (router, _t) = app().await;
    let (status, body) = send(&router, Method::GET, "/api/tenants/RIBEIRAO/cells", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("RIBEIRAO"));
}

#[tokio::test]
async fn test_negative_index_is_bad_request() {
    let (router, _t) = app().await;
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/tenants/PONTAL/cells",
        Some(json!({ "row": -1, "col": 0, "value": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tabular_import_and_matrix() {
    let (router, _t) = app().await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/tenants/PONTAL/import/tabular",
        Some(json!([["A", "B"], ["C"]])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dimensions"], json!({ "rows": 2, "cols": 2 }));

    let (status, body) = send(&router, Method::GET, "/api/tenants/PONTAL/matrix", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([["A", "B"], ["C", ""]]));

    let (_, body) = send(&router, Method::GET, "/api/tenants/PONTAL/config", None).await;
    assert_eq!(body, json!({ "rows": 2, "cols": 2 }));
}

#[tokio::test]
async fn test_history_and_clear() {
    let (router, _t) = app().await;

    for value in ["X", "Y"] {
        send(
            &router,
            Method::POST,
            "/api/tenants/DUMONT/cells",
            Some(json!({ "row": 1, "column": 1, "value": value })),
        )
        .await;
    }

    let (status, body) = send(&router, Method::GET, "/api/tenants/DUMONT/history?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["previous_value"], "X");
    assert_eq!(body[0]["new_value"], "Y");
    assert_eq!(body[1]["previous_value"], "");

    let (status, _) = send(&router, Method::DELETE, "/api/tenants/DUMONT/cells", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&router, Method::GET, "/api/tenants/DUMONT/cells", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_config_bounds() {
    let (router, _t) = app().await;

    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/tenants/PONTAL/config",
        Some(json!({ "rows": 0, "cols": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/tenants/PONTAL/config",
        Some(json!({ "rows": 50, "cols": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "rows": 50, "cols": 10 }));
}

#[tokio::test]
async fn test_maintenance_routes() {
    let (router, _t) = app().await;
    send(
        &router,
        Method::POST,
        "/api/tenants/PONTAL/import/tabular",
        Some(json!([["a"], [""], ["Estadual"], ["b"]])),
    )
    .await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/tenants/PONTAL/maintenance/prune",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_removed"], 1);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/tenants/PONTAL/maintenance/remove-matching",
        Some(json!({ "terms": ["  "] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &router,
        Method::POST,
        "/api/tenants/PONTAL/maintenance/remove-matching",
        Some(json!({ "terms": ["estadual"] })),
    )
    .await;
    assert_eq!(body["rows_removed"], 1);

    let (_, body) = send(&router, Method::POST, "/api/maintenance/tidy", None).await;
    assert_eq!(body.as_array().unwrap().len(), 8);

    let (_, body) = send(&router, Method::GET, "/api/tenants/PONTAL/matrix", None).await;
    assert_eq!(body[0][0], "a");
    assert_eq!(body[1][0], "b");
}

#[tokio::test]
async fn test_csv_export_is_an_attachment() {
    let (router, t) = app().await;
    t.store
        .put_cell(common::tenant("PONTAL"), 0, 0, "a")
        .await
        .unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/tenants/PONTAL/export/csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("PONTAL.csv"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Linha,Coluna,Valor\n0,0,a\n");
}

#[tokio::test]
async fn test_records_import_from_csv_body() {
    let (router, t) = app().await;

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/tenants/VIRADOURO/import/records")
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from("linha,coluna,valor\n2,1,123\n,1,sem linha\n"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cell = t
        .store
        .get_cell(common::tenant("VIRADOURO"), 2, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cell.value, "123");
}
