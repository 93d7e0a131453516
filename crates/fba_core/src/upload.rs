//! File upload helper.
//!
//! With a gateway connected, files go to object storage under a timestamped
//! path and the public URL comes back. Without one, upload degrades to a
//! self-contained `data:` URL so locally picked media still renders.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::Result;
use crate::gateway::ContentGateway;

/// Upload a file and return a URL for it.
///
/// The returned URL is either the object's public URL (gateway connected) or
/// an inline base64 `data:` URL (disconnected fallback).
pub async fn upload_file(
    gateway: Option<&dyn ContentGateway>,
    bucket: &str,
    file_name: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<String> {
    match gateway {
        None => Ok(inline_data_url(content_type, &bytes)),
        Some(gateway) => {
            let path = object_path(file_name);
            gateway
                .upload_object(bucket, &path, content_type, bytes)
                .await
        }
    }
}

/// Encode a file as a self-contained `data:` URL.
pub fn inline_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Build the storage path for a file: a timestamped prefix plus the
/// sanitized file name, so repeated uploads of the same file never collide.
fn object_path(file_name: &str) -> String {
    format!(
        "uploads/{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Replace every run of characters outside `[A-Za-z0-9_.-]` with a single
/// underscore.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            sanitized.push(ch);
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }
    sanitized
}
