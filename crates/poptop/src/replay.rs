//! Scripted request sequences.
//!
//! A replay script holds one request per line:
//!
//! ```text
//! # comment
//! GET /pets
//! POST /pets?source=script name=Rex
//! DELETE /pets/1
//! ```
//!
//! The method and target are separated by whitespace; anything after the
//! target is sent as the form body.

use crate::dispatcher::{Dispatcher, MockResponse, Outcome, UnhandledReason};
use http::StatusCode;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayLine {
    /// 1-based line number in the script.
    pub line_no: usize,
    pub method: String,
    pub target: String,
    pub body: Option<String>,
}

/// Parse a replay script, skipping blank lines and `#` comments.
pub fn parse_script(script: &str) -> Result<Vec<ReplayLine>, anyhow::Error> {
    let mut lines = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((method, rest)) = trimmed.split_once(char::is_whitespace) else {
            anyhow::bail!("Line {line_no}: expected '<METHOD> <TARGET> [BODY]', got '{trimmed}'");
        };
        let rest = rest.trim_start();
        let (target, body) = match rest.split_once(char::is_whitespace) {
            Some((target, body)) => (target, Some(body.trim().to_string())),
            None => (rest, None),
        };
        let body = body.filter(|b| !b.is_empty());

        lines.push(ReplayLine {
            line_no,
            method: method.to_string(),
            target: target.to_string(),
            body,
        });
    }
    Ok(lines)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayResult {
    Served(MockResponse),
    Unhandled(UnhandledReason),
    Failed { status: StatusCode, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRecord {
    pub line: ReplayLine,
    pub result: ReplayResult,
}

impl ReplayRecord {
    pub fn is_served(&self) -> bool {
        matches!(self.result, ReplayResult::Served(_))
    }
}

impl fmt::Display for ReplayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} {} {} -> ",
            self.line.line_no, self.line.method, self.line.target
        )?;
        match &self.result {
            ReplayResult::Served(response) => {
                write!(f, "{} {}", response.status.as_u16(), response.content_type)?;
                if !response.body.is_empty() {
                    write!(f, "\n     {}", response.text())?;
                }
                Ok(())
            }
            ReplayResult::Unhandled(reason) => write!(f, "unhandled ({reason})"),
            ReplayResult::Failed { status, message } => {
                write!(f, "{} {}", status.as_u16(), message)
            }
        }
    }
}

/// Run every line against `dispatcher`, in order.
pub fn run_script(dispatcher: &Dispatcher, lines: &[ReplayLine]) -> Vec<ReplayRecord> {
    lines
        .iter()
        .map(|line| {
            debug!("Replaying line {}: {} {}", line.line_no, line.method, line.target);
            let body = line.body.as_deref().map(str::as_bytes);
            let result = match dispatcher.handle_target(&line.method, &line.target, body) {
                Ok(Outcome::Handled(response)) => ReplayResult::Served(response),
                Ok(Outcome::Unhandled(reason)) => ReplayResult::Unhandled(reason),
                Err(e) => ReplayResult::Failed {
                    status: e.status(),
                    message: e.to_string(),
                },
            };
            ReplayRecord {
                line: line.clone(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::CachedJsonResource;
    use serde_json::json;

    #[test]
    fn test_parse_script() {
        let script = "\n# warm up\nGET /pets\n  POST /pets?x=1 name=Rex II  \nDELETE /pets/1\n";
        let lines = parse_script(script).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].line_no, 3);
        assert_eq!(lines[1].method, "POST");
        assert_eq!(lines[1].target, "/pets?x=1");
        assert_eq!(lines[1].body.as_deref(), Some("name=Rex II"));
        assert_eq!(lines[2].body, None);
    }

    #[test]
    fn test_parse_script_missing_target() {
        let err = parse_script("GET /ok\nGET\n").unwrap_err();
        assert!(err.to_string().starts_with("Line 2:"));
    }

    #[test]
    fn test_run_script() {
        let dispatcher = Dispatcher::default();
        dispatcher.registry().add(CachedJsonResource::new(
            "/pets",
            &json!([{"id": 1, "name": "Rex"}]),
        ));
        let lines =
            parse_script("GET /pets/1\nDELETE /pets/1\nGET /pets/1\nPUT /pets/1\nGET /nope\n")
                .unwrap();

        let records = run_script(&dispatcher, &lines);
        assert!(records[0].is_served());
        assert!(matches!(
            &records[1].result,
            ReplayResult::Served(r) if r.status == StatusCode::NO_CONTENT
        ));
        assert!(matches!(
            &records[2].result,
            ReplayResult::Failed { status, .. } if *status == StatusCode::NOT_FOUND
        ));
        assert_eq!(
            records[3].result,
            ReplayResult::Unhandled(UnhandledReason::UnsupportedMethod)
        );
        assert_eq!(records[4].result, ReplayResult::Unhandled(UnhandledReason::NoRoute));
        assert!(records[0].to_string().contains(r#"{"id":1,"name":"Rex"}"#));
    }
}
