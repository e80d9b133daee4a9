mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn check_without_header_is_unauthorized() -> Result<()> {
    let server = common::spawn_server(&[common::ROOT_ADMIN]).await?;

    let res = server.client.get(server.url("/api/admin/check")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Authorization header required");
    Ok(())
}

#[tokio::test]
async fn check_with_invalid_token_is_unauthorized() -> Result<()> {
    let server = common::spawn_server(&[common::ROOT_ADMIN]).await?;

    let res = server
        .client
        .get(server.url("/api/admin/check"))
        .bearer_auth("forged-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["message"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn check_reports_admin_status() -> Result<()> {
    let server = common::spawn_server(&[common::ROOT_ADMIN]).await?;

    let admin = server
        .client
        .get(server.url("/api/admin/check"))
        .bearer_auth(server.token_for(common::ROOT_ADMIN))
        .send()
        .await?;
    assert_eq!(admin.status(), StatusCode::OK);
    assert_eq!(admin.json::<Value>().await?, serde_json::json!({ "isAdmin": true }));

    let user = server
        .client
        .get(server.url("/api/admin/check"))
        .bearer_auth(server.token_for("user@example.com"))
        .send()
        .await?;
    assert_eq!(user.status(), StatusCode::OK);
    assert_eq!(user.json::<Value>().await?["isAdmin"], false);
    Ok(())
}

#[tokio::test]
async fn check_without_email_claim_is_false() -> Result<()> {
    let server = common::spawn_server(&[common::ROOT_ADMIN]).await?;

    let res = server
        .client
        .get(server.url("/api/admin/check"))
        .bearer_auth(server.provider.issue_token_without_email())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["isAdmin"], false);
    Ok(())
}

#[tokio::test]
async fn check_accepts_raw_token_without_bearer_prefix() -> Result<()> {
    let server = common::spawn_server(&[common::ROOT_ADMIN]).await?;

    let res = server
        .client
        .get(server.url("/api/admin/check"))
        .header("Authorization", server.token_for(common::ROOT_ADMIN))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["isAdmin"], true);
    Ok(())
}
