//! HTTP tests for the document endpoints.
//!
//! Run with: `cargo test -p hrvault-api --test documents_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use chrono::{DateTime, Utc};
use helpers::{
    setup_test_app, upload_form, wasabi_config, Caller, LOCAL_BASE_URL, MAX_UPLOAD_SIZE_BYTES,
    WASABI_ENDPOINT,
};
use hrvault_core::ProviderKind;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_upload_without_location_falls_back_to_default() {
    let app = setup_test_app().await;
    let caller = Caller::organization();

    let body = app.upload(caller, "contract.pdf", b"%PDF-1.4").await;

    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["provider"], "local");
    assert_eq!(data["owner_type"], "staff");
    assert_eq!(data["display_name"], "contract.pdf");
    assert_eq!(data["file_size"], 8);
    assert_eq!(data["extension"], "pdf");
    assert_eq!(data["url_type"], "permanent");
    assert!(data["url"].as_str().unwrap().starts_with(LOCAL_BASE_URL));
    assert!(data.get("url_expires_at").is_none());
}

#[tokio::test]
async fn test_download_streams_local_bytes() {
    let app = setup_test_app().await;
    let caller = Caller::company();
    let body = app.upload(caller, "notes.txt", b"first day checklist").await;
    let id = body["data"]["id"].as_str().unwrap();

    let response = caller
        .apply(app.client().get(&format!("/api/v1/documents/{}/download", id)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), b"first day checklist");
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_object_store_download_returns_presigned_link() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    let location_id = app
        .add_location(caller, ProviderKind::Wasabi, wasabi_config("hr-documents"))
        .await;
    let id = app
        .seed_document(caller, location_id, ProviderKind::Wasabi, "contract.pdf")
        .await;
    let before = Utc::now();

    let response = caller
        .apply(app.client().get(&format!("/api/v1/documents/{}/download", id)))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["storage_type"], "wasabi");
    let url = data["download_url"].as_str().unwrap();
    assert!(url.starts_with(WASABI_ENDPOINT));
    assert!(url.contains("X-Amz-Expires=3600"));
    let expires_at: DateTime<Utc> = data["expires_at"].as_str().unwrap().parse().unwrap();
    assert!(expires_at - before >= chrono::Duration::minutes(59));
    assert!(expires_at - before <= chrono::Duration::minutes(61));
}

#[tokio::test]
async fn test_show_includes_file_info() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    let body = app.upload(caller, "payslip.PDF", &[7u8; 1536]).await;
    let id = body["data"]["id"].as_str().unwrap();

    let response = caller
        .apply(app.client().get(&format!("/api/v1/documents/{}", id)))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["file"]["size_human"], "1.50 KB");
    assert_eq!(body["data"]["file"]["extension"], "pdf");
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        app.upload(caller, name, b"x").await;
    }
    // Another tenant's documents never show up.
    app.upload(Caller::organization(), "other.pdf", b"x").await;

    let response = caller
        .apply(app.client().get("/api/v1/documents?page=1&per_page=2"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["total_pages"], 2);
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["items"][0]["original_name"], "c.pdf");

    let response = caller
        .apply(app.client().get("/api/v1/documents?page=2&per_page=2"))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["items"][0]["original_name"], "a.pdf");
}

#[tokio::test]
async fn test_list_rejects_unknown_owner_type() {
    let app = setup_test_app().await;

    let response = Caller::organization()
        .apply(app.client().get("/api/v1/documents?owner_type=robot"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    let body = app.upload(caller, "a.pdf", b"a").await;
    let id = body["data"]["id"].as_str().unwrap();
    let path = format!("/api/v1/documents/{}", id);

    let response = caller.apply(app.client().delete(&path)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let response = caller.apply(app.client().delete(&path)).await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "DOCUMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_other_tenant_cannot_read_or_delete() {
    let app = setup_test_app().await;
    let owner = Caller::organization();
    let body = app.upload(owner, "a.pdf", b"a").await;
    let id = body["data"]["id"].as_str().unwrap();
    let intruder = Caller::organization();

    for path in [
        format!("/api/v1/documents/{}", id),
        format!("/api/v1/documents/{}/download", id),
        format!("/api/v1/documents/{}/url", id),
    ] {
        let response = intruder.apply(app.client().get(&path)).await;
        assert_eq!(response.status_code(), 404, "{}", path);
    }

    let response = intruder
        .apply(app.client().delete(&format!("/api/v1/documents/{}", id)))
        .await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(app.db.document_count(), 1);
}

#[tokio::test]
async fn test_url_rejects_out_of_range_expiry() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    let body = app.upload(caller, "a.pdf", b"a").await;
    let id = body["data"]["id"].as_str().unwrap();

    for expires_in in ["0", "604801"] {
        let response = caller
            .apply(app.client().get(&format!(
                "/api/v1/documents/{}/url?expires_in={}",
                id, expires_in
            )))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    let response = caller
        .apply(app.client().get(&format!("/api/v1/documents/{}/url?expires_in=300", id)))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["url_type"], "permanent");
}

#[tokio::test]
async fn test_upload_requires_owner_fields() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .add_text("document_type_id", Uuid::new_v4().to_string())
        .add_text("owner_id", Uuid::new_v4().to_string())
        .add_part("file", Part::bytes(b"a".to_vec()).file_name("a.pdf"));

    let response = Caller::organization()
        .apply(app.client().post("/api/v1/documents"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["message"], "owner_type is required");
    assert_eq!(app.db.document_count(), 0);
}

#[tokio::test]
async fn test_upload_rejects_empty_file() {
    let app = setup_test_app().await;

    let response = Caller::organization()
        .apply(app.client().post("/api/v1/documents"))
        .multipart(upload_form("empty.pdf", b""))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = setup_test_app().await;
    let data = vec![0u8; MAX_UPLOAD_SIZE_BYTES + 1];

    let response = Caller::organization()
        .apply(app.client().post("/api/v1/documents"))
        .multipart(upload_form("big.pdf", &data))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_invalid_tenant_header_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/api/v1/documents")
        .add_header("X-Organization-Id", "not-a-uuid")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_conflicting_tenant_locations_are_ambiguous() {
    let app = setup_test_app().await;
    let org = Caller::organization();
    let company = Caller::company();
    app.add_local_location(org, "org").await;
    app.add_local_location(company, "company").await;

    let both = Caller {
        organization_id: org.organization_id,
        company_id: company.company_id,
    };
    let response = both
        .apply(app.client().post("/api/v1/documents"))
        .multipart(upload_form("a.pdf", b"a"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "AMBIGUOUS_TENANT_REFERENCE");
    assert_eq!(app.db.document_count(), 0);
}

#[tokio::test]
async fn test_upload_lands_on_tenant_location() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    let location_id = app.add_local_location(caller, "acme").await;

    let body = app.upload(caller, "a.pdf", b"a").await;

    assert_eq!(body["data"]["location_id"], location_id.to_string());
    let stored = std::fs::read_dir(app.root("acme")).unwrap().count();
    assert!(stored > 0);
}

#[tokio::test]
async fn test_update_metadata() {
    let app = setup_test_app().await;
    let caller = Caller::organization();
    let body = app.upload(caller, "a.pdf", b"a").await;
    let id = body["data"]["id"].as_str().unwrap();
    let path = format!("/api/v1/documents/{}", id);

    let response = caller
        .apply(app.client().patch(&path))
        .json(&json!({ "display_name": "Signed contract" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["display_name"], "Signed contract");
    assert_eq!(body["data"]["original_name"], "a.pdf");

    let response = caller.apply(app.client().patch(&path)).json(&json!({})).await;
    assert_eq!(response.status_code(), 400);

    let response = caller
        .apply(app.client().patch(&path))
        .json(&json!({ "storage_key": "elsewhere" }))
        .await;
    assert_eq!(response.status_code(), 400);
}
