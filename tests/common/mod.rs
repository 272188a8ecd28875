//! Shared helpers for the binary-level integration tests.

#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

pub const SECRET: &str = "integration-secret";

pub fn artmirror_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("artmirror");
    path
}

/// Sign an HS256 token for `user_id`, valid for an hour.
pub fn mint_token(secret: &str, user_id: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = chrono::Utc::now().timestamp() + 3600;
    let claims = URL_SAFE_NO_PAD.encode(
        serde_json::json!({"userId": user_id, "email": "writer@example.com", "exp": exp})
            .to_string(),
    );
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.{}", header, claims).as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{}.{}.{}", header, claims, signature)
}

/// Temp directory with a config pointing both databases inside it.
pub fn setup_env(port: u16) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/articles.sqlite"

[index]
path = "{root}/data/search.sqlite"
name = "articles"

[pagination]
default_limit = 10
max_limit = 50

[reindex]
batch_size = 2

[server]
bind = "127.0.0.1:{port}"

[auth]
secret_env = "JWT_SECRET"
"#,
        root = root.display(),
        port = port
    );

    let config_path = config_dir.join("articles.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

/// Run the CLI; returns (stdout, stderr, success).
pub fn run_cli(config_path: &Path, args: &[&str], envs: &[(&str, &str)]) -> (String, String, bool) {
    let binary = artmirror_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("ARTICLE_TOKEN")
        .env_remove("JWT_SECRET")
        .envs(envs.iter().copied())
        .output()
        .unwrap_or_else(|e| panic!("Failed to run artmirror binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Find an available port for the test server.
pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start the HTTP server in the background.
pub fn start_server(config_path: &Path) -> std::process::Child {
    Command::new(artmirror_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .env("JWT_SECRET", SECRET)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to start server: {}", e))
}

/// Wait for the server to be ready by polling the health endpoint.
pub fn wait_for_server(port: u16) {
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        std::thread::sleep(std::time::Duration::from_millis(100));
        if let Ok(resp) = reqwest::blocking::get(&url) {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}
