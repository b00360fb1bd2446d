#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();
static EMAILS: AtomicUsize = AtomicUsize::new(0);

pub const PASSWORD: &str = "secret123";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/api", port);

        // In-memory store keeps every test binary independent of Postgres.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_student-panel-api"));
        cmd.env("PORT", port.to_string())
            .env("API_PORT", port.to_string())
            .env_remove("SECURITY_CORS_ORIGINS")
            .env_remove("APP_ENV")
            .env("DATABASE_URL", "memory://")
            .env("JWT_SECRET", "integration-test-secret")
            .env("API_BASE_PATH", "/api")
            .env("BCRYPT_COST", "12")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// A fresh address per call; the server outlives individual tests.
pub fn unique_email(prefix: &str) -> String {
    let n = EMAILS.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}@example.com", prefix, std::process::id(), n)
}

/// Registers an account with `role` and returns its `{token, user}` session.
pub async fn register(server: &TestServer, role: &str) -> Result<Value> {
    let res = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .json(&json!({
            "name": format!("{} user", role),
            "email": unique_email(role),
            "password": PASSWORD,
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register returned {}", res.status());
    Ok(res.json().await?)
}

pub fn token_of(session: &Value) -> String {
    session["token"].as_str().unwrap_or_default().to_string()
}
