#![allow(clippy::expect_used)]

use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use dashboard_cli::{Cli, execute};
use serde_json::{Value, json};

// {"user_id":3,"role":"Employee","name":"Ada"}
const EMPLOYEE_TOKEN: &str = "h.eyJ1c2VyX2lkIjozLCJyb2xlIjoiRW1wbG95ZWUiLCJuYW1lIjoiQWRhIn0.s";

async fn run(session_file: &Path, args: &[&str]) -> Result<String> {
    let session_file = session_file.to_string_lossy().into_owned();
    let mut argv = vec!["dashboard", "--session-file", session_file.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv)?;
    let mut out = Vec::new();
    execute(cli, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn whoami_prints_stored_claims() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let session_file = dir.path().join("session");
    fs::write(&session_file, EMPLOYEE_TOKEN)?;

    let output = run(&session_file, &["whoami"]).await?;
    let claims: Value = serde_json::from_str(&output)?;
    assert_eq!(
        claims,
        json!({"user_id": 3, "role": "Employee", "name": "Ada"})
    );
    Ok(())
}

#[tokio::test]
async fn whoami_without_session_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let error = run(&dir.path().join("session"), &["whoami"])
        .await
        .expect_err("no token stored");
    assert!(error.to_string().contains("not signed in"), "{error}");
    Ok(())
}

#[tokio::test]
async fn home_reports_role_landing_page() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let session_file = dir.path().join("session");

    assert_eq!(run(&session_file, &["home"]).await?, "/login.html\n");

    fs::write(&session_file, EMPLOYEE_TOKEN)?;
    assert_eq!(
        run(&session_file, &["home"]).await?,
        "/employee_dashboard.html\n"
    );
    Ok(())
}

#[tokio::test]
async fn logout_removes_session_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let session_file = dir.path().join("session");
    fs::write(&session_file, EMPLOYEE_TOKEN)?;

    let output = run(&session_file, &["logout"]).await?;
    assert_eq!(output, "Signed out. Next: /login.html\n");
    assert!(!session_file.exists());

    // Signing out twice is harmless.
    run(&session_file, &["logout"]).await?;
    Ok(())
}

#[tokio::test]
async fn network_commands_need_absolute_base_url() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let error = run(&dir.path().join("session"), &["--base-url", "/api", "health"])
        .await
        .expect_err("relative base URL");
    assert!(error.to_string().contains("relative"), "{error}");
    Ok(())
}

#[tokio::test]
async fn request_body_must_be_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let error = run(
        &dir.path().join("session"),
        &[
            "--base-url",
            "http://127.0.0.1:9/api",
            "request",
            "/kpi/",
            "-X",
            "POST",
            "--body",
            "{not json",
        ],
    )
    .await
    .expect_err("invalid body");
    assert!(error.to_string().contains("valid JSON"), "{error}");
    Ok(())
}

#[tokio::test]
async fn summary_requires_role_claim() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let error = run(
        &dir.path().join("session"),
        &["--base-url", "http://127.0.0.1:9/api", "summary"],
    )
    .await
    .expect_err("no session");
    assert!(error.to_string().contains("dashboard login"), "{error}");
    Ok(())
}
