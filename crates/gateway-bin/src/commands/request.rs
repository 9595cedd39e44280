//! Request command.

use super::Context;
use crate::output;
use anyhow::{anyhow, bail, Context as _, Result};
use gateway_auth::{ApiRequest, ApiResponse, SessionEvent};
use reqwest::Method;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
struct RequestOutput {
    status: u16,
    body: serde_json::Value,
}

impl RequestOutput {
    fn from_response(response: &ApiResponse) -> Self {
        let body = if response.body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&response.body)
                .unwrap_or_else(|_| serde_json::Value::String(response.text()))
        };
        Self {
            status: response.status.as_u16(),
            body,
        }
    }
}

impl fmt::Display for RequestOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        match &self.body {
            serde_json::Value::Null => Ok(()),
            serde_json::Value::String(text) => write!(f, "\n\n{}", text),
            json => match serde_json::to_string_pretty(json) {
                Ok(pretty) => write!(f, "\n\n{}", pretty),
                Err(_) => write!(f, "\n\n{}", json),
            },
        }
    }
}

fn build_request(method: &str, path: &str, data: Option<&str>) -> Result<ApiRequest> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("Invalid HTTP method: {}", method))?;
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let request = ApiRequest::new(method, path);
    match data {
        Some(raw) => {
            let body: serde_json::Value =
                serde_json::from_str(raw).context("--data must be valid JSON")?;
            Ok(request.with_json(&body)?)
        }
        None => Ok(request),
    }
}

/// Send one request through the authenticated client.
pub async fn request(ctx: &Context, method: &str, path: &str, data: Option<&str>) -> Result<()> {
    let request = build_request(method, path, data)?;
    let client = ctx.client()?;
    client.set_session_callback(Box::new(|event| {
        if let SessionEvent::Ended { reason } = event {
            eprintln!("Session ended ({}). Run 'authgate login' to sign in again.", reason);
        }
    }));

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) if e.is_authorization_error() => {
            bail!("{}. Run 'authgate login' to sign in again", e)
        }
        Err(e) => return Err(e.into()),
    };

    let view = RequestOutput::from_response(&response);
    output::print(&view, ctx.format);
    if !response.is_success() {
        bail!("Server responded with {}", response.status);
    }
    Ok(())
}
