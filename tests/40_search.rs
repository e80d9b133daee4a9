mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn search_needs_no_authorization() -> Result<()> {
    let server = common::spawn_server(&[]).await?;

    let res = server
        .client
        .post(server.url("/api/search"))
        .json(&json!({ "query": "Michigan" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(
        body,
        json!({
            "schools": [{
                "name": "University of Michigan",
                "state": "CA",
                "ownership": "Public",
                "size": 25000
            }]
        })
    );
    Ok(())
}

#[tokio::test]
async fn search_without_query_uses_empty_string() -> Result<()> {
    let server = common::spawn_server(&[]).await?;

    let body = server
        .client
        .post(server.url("/api/search"))
        .json(&json!({}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(body["schools"][0]["name"], "University of ");
    Ok(())
}
