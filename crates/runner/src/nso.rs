use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};

use splitwarden_core::config::OrchestratorConfig;
use splitwarden_core::error::ExecutorFailure;
use splitwarden_core::types::CommandBatch;

use crate::command::{self, parse_reply, ExecRequest};
use crate::CommandExecutor;

const ACTION_PATH: [&str; 3] = ["live-status", "tailf-ned-cisco-asa-stats:exec", "any"];

/// Runs command batches through the orchestrator's RESTCONF live-status API.
pub struct NsoExecutor {
    client: Client,
    base_url: Url,
    username: String,
    password: Option<String>,
    failure_markers: Vec<String>,
}

impl NsoExecutor {
    pub fn from_config(config: &OrchestratorConfig, password: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .context("build orchestrator HTTP client")?;
        let raw_url = format!(
            "{}/restconf/operations/devices",
            config.url.trim().trim_end_matches('/')
        );
        let base_url = Url::parse(&raw_url)
            .with_context(|| format!("parse orchestrator url {}", config.url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!(
                "orchestrator url {} cannot carry a path",
                config.url
            ));
        }
        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password,
            failure_markers: config.failure_markers.clone(),
        })
    }

    /// Action URL for `device`; the device id is percent-encoded as one path
    /// segment.
    pub fn endpoint(&self, device: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&format!("device={device}"))
                .extend(ACTION_PATH);
        }
        url
    }
}

impl CommandExecutor for NsoExecutor {
    fn execute(&self, device: &str, batch: &CommandBatch) -> Result<String, ExecutorFailure> {
        let body = serde_json::to_string(&ExecRequest::from_batch(batch))
            .map_err(|err| ExecutorFailure::Transport(format!("serialize request: {err}")))?;

        let response = self
            .client
            .post(self.endpoint(device))
            .basic_auth(&self.username, self.password.as_deref())
            .header(CONTENT_TYPE, command::CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|err| ExecutorFailure::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ExecutorFailure::Auth(format!("orchestrator answered {status}")));
        }

        let text = response
            .text()
            .map_err(|err| ExecutorFailure::Transport(format!("read reply: {err}")))?;

        match parse_reply(&text, &self.failure_markers) {
            Err(ExecutorFailure::MalformedReply(_)) if !status.is_success() => Err(
                ExecutorFailure::Transport(format!("orchestrator answered {status}")),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    fn config(url: &str) -> OrchestratorConfig {
        OrchestratorConfig {
            url: url.to_string(),
            username: "user1".to_string(),
            password: None,
            accept_invalid_certs: false,
            timeout_secs: 5,
            failure_markers: vec!["ERROR:".to_string()],
        }
    }

    /// Serves one canned HTTP response and hands back the raw request.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/yang-data+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).unwrap();
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn run(status: &str, body: &str) -> (Result<String, ExecutorFailure>, String) {
        let (url, server) = serve_once(status, body);
        let executor = NsoExecutor::from_config(&config(&url), Some("pass1".to_string())).unwrap();
        let batch: CommandBatch = ["show run | include dynamic-split-exclude-domains"]
            .into_iter()
            .collect();
        let result = executor.execute("asa-1", &batch);
        (result, server.join().unwrap())
    }

    #[test]
    fn test_endpoint() {
        let executor = NsoExecutor::from_config(
            &config("https://nso-server:8888/"),
            Some("pass1".to_string()),
        )
        .unwrap();
        assert_eq!(
            executor.endpoint("vpn-device-1").as_str(),
            "https://nso-server:8888/restconf/operations/devices/device=vpn-device-1/live-status/tailf-ned-cisco-asa-stats:exec/any"
        );
    }

    #[test]
    fn test_endpoint_encodes_device_id() {
        let executor = NsoExecutor::from_config(&config("https://nso-server:8888"), None).unwrap();
        assert_eq!(
            executor.endpoint("dc1/asa 2?x").as_str(),
            "https://nso-server:8888/restconf/operations/devices/device=dc1%2Fasa%202%3Fx/live-status/tailf-ned-cisco-asa-stats:exec/any"
        );
    }

    #[test]
    fn test_rejects_unusable_url() {
        assert!(NsoExecutor::from_config(&config("not a url"), None).is_err());
    }

    #[test]
    fn test_success_returns_result_text() {
        let (result, request) = run(
            "200 OK",
            r#"{"tailf-ned-cisco-asa-stats:output":{"result":"\r\n anyconnect-custom-attr dynamic-split-exclude-domains\r\n"}}"#,
        );
        assert_eq!(
            result.unwrap(),
            "\r\n anyconnect-custom-attr dynamic-split-exclude-domains\r\n"
        );

        let lower = request.to_ascii_lowercase();
        assert!(lower.starts_with(
            "post /restconf/operations/devices/device=asa-1/live-status/tailf-ned-cisco-asa-stats:exec/any "
        ));
        assert!(lower.contains("authorization: basic "));
        assert!(lower.contains("content-type: application/yang-data+json"));
        assert!(request.ends_with(
            r#"{"input":{"args":"show run | include dynamic-split-exclude-domains"}}"#
        ));
    }

    #[test]
    fn test_unauthorized_and_forbidden_are_auth_failures() {
        for status in ["401 Unauthorized", "403 Forbidden"] {
            let (result, _) = run(status, "");
            let failure = result.unwrap_err();
            assert!(matches!(failure, ExecutorFailure::Auth(_)), "{status}: {failure:?}");
            assert!(failure.is_transport());
        }
    }

    #[test]
    fn test_server_error_page_is_transport_failure() {
        let (result, _) = run(
            "500 Internal Server Error",
            "<html><body>Internal Server Error</body></html>",
        );
        let failure = result.unwrap_err();
        assert!(matches!(failure, ExecutorFailure::Transport(_)), "{failure:?}");
    }

    #[test]
    fn test_error_body_is_envelope_failure() {
        let (result, _) = run(
            "400 Bad Request",
            r#"{"errors":{"error":[{"error-message":"device asa-1 is locked"}]}}"#,
        );
        let failure = result.unwrap_err();
        assert!(matches!(failure, ExecutorFailure::Envelope(_)), "{failure:?}");
        assert!(!failure.is_transport());
    }

    #[test]
    fn test_failure_marker_is_rejected() {
        let (result, _) = run(
            "200 OK",
            r#"{"tailf-ned-cisco-asa-stats:output":{"result":"ERROR: % Invalid input detected"}}"#,
        );
        assert_eq!(
            result.unwrap_err(),
            ExecutorFailure::Rejected("ERROR:".to_string())
        );
    }

    #[test]
    fn test_unreachable_orchestrator_is_transport_failure() {
        let mut config = config("http://127.0.0.1:9");
        config.timeout_secs = 2;
        let executor = NsoExecutor::from_config(&config, None).unwrap();
        let batch: CommandBatch = ["show run"].into_iter().collect();
        let failure = executor.execute("asa-1", &batch).unwrap_err();
        assert!(failure.is_transport());
    }
}
