use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

/// A server process with its own in-memory database, killed on drop
pub struct TestServer {
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(extra_env: &[(&str, &str)]) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_message-board"));
        cmd.env("MESSAGE_BOARD_HOST", "127.0.0.1")
            .env("MESSAGE_BOARD_PORT", port.to_string())
            .env("DATABASE_URL", "sqlite::memory:")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
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

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    start_server_with(&[]).await
}

pub async fn start_server_with(extra_env: &[(&str, &str)]) -> Result<TestServer> {
    let server = TestServer::spawn(extra_env)?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub async fn list_contents(client: &reqwest::Client, server: &TestServer) -> Result<Vec<String>> {
    let res = client.get(server.url("/")).send().await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "list returned {}", res.status());
    Ok(res.json::<Vec<String>>().await?)
}
