//! Request/response surface shared by the desktop-shell bridge and the HTTP
//! API. A configuration object comes in, an outcome object goes out, and
//! nothing ever propagates as an `Err` or a panic across this boundary: all
//! failures are captured into `{success: false, message}` and the session is
//! disconnected on every path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::SessionError;
use crate::config::SessionConfig;
use crate::paths;
use crate::session::{DirectoryEntry, SessionClient};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(flatten)]
    pub session: SessionConfig,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    #[serde(default)]
    pub remote_path: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<RemoteFileInfo>>,
}

/// One listing row as the front ends render it; `permissions` carries the
/// long listing verbatim.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileInfo {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    pub permissions: String,
}

impl OperationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), files: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), files: None }
    }
}

/// Upload the staged local file to the requested remote destination,
/// applying the basename normalization rule.
pub fn upload(req: &OperationRequest) -> OperationOutcome {
    let Some(local) = &req.local_path else {
        return OperationOutcome::failure("Missing required fields: localPath is required");
    };
    let Some(remote) = &req.remote_path else {
        return OperationOutcome::failure("Missing required fields: remotePath is required");
    };
    if let Some(out) = validate_session_fields(&req.session) {
        return out;
    }
    let mut client = SessionClient::new();
    let outcome = match client.connect(&req.session) {
        Ok(()) => upload_with(&mut client, local, remote),
        Err(e) => OperationOutcome::failure(e.to_string()),
    };
    client.disconnect();
    outcome
}

/// Download the requested remote file to the local destination.
pub fn download(req: &OperationRequest) -> OperationOutcome {
    let Some(remote) = &req.remote_path else {
        return OperationOutcome::failure("Missing required fields: remotePath is required");
    };
    let Some(local) = &req.local_path else {
        return OperationOutcome::failure("Missing required fields: localPath is required");
    };
    if let Some(out) = validate_session_fields(&req.session) {
        return out;
    }
    let mut client = SessionClient::new();
    let outcome = match client.connect(&req.session) {
        Ok(()) => download_with(&mut client, remote, local),
        Err(e) => OperationOutcome::failure(e.to_string()),
    };
    client.disconnect();
    outcome
}

/// List the requested remote directory.
pub fn list(req: &OperationRequest) -> OperationOutcome {
    let Some(remote) = &req.remote_path else {
        return OperationOutcome::failure("Missing required fields: remotePath is required");
    };
    if let Some(out) = validate_session_fields(&req.session) {
        return out;
    }
    let mut client = SessionClient::new();
    let outcome = match client.connect(&req.session) {
        Ok(()) => list_with(&mut client, remote),
        Err(e) => OperationOutcome::failure(e.to_string()),
    };
    client.disconnect();
    outcome
}

/// Operation half of `upload`, on an already-connected client. Split out so
/// tests can drive it through a mock channel.
pub fn upload_with(client: &mut SessionClient, local: &Path, remote: &str) -> OperationOutcome {
    let destination = paths::resolve_upload_destination(local, remote);
    match client.upload(local, &destination, None) {
        Ok(()) => {
            OperationOutcome::ok(format!("File uploaded successfully to {}", destination))
        }
        Err(e) => OperationOutcome::failure(e.to_string()),
    }
}

/// Operation half of `download`. A transfer that fails mid-flight may have
/// left a partial local file; the server-mediated flow removes it before
/// responding.
pub fn download_with(client: &mut SessionClient, remote: &str, local: &Path) -> OperationOutcome {
    match client.download(remote, local, None) {
        Ok(()) => OperationOutcome::ok("File downloaded successfully!"),
        Err(e) => {
            if matches!(e, SessionError::Transfer(_)) && local.exists() {
                let _ = std::fs::remove_file(local);
            }
            OperationOutcome::failure(e.to_string())
        }
    }
}

/// Operation half of `list`.
pub fn list_with(client: &mut SessionClient, remote: &str) -> OperationOutcome {
    match client.list(remote) {
        Ok(entries) => OperationOutcome {
            success: true,
            message: format!("Listed {}", remote),
            files: Some(entries.iter().map(file_info).collect()),
        },
        Err(e) => OperationOutcome::failure(e.to_string()),
    }
}

fn file_info(entry: &DirectoryEntry) -> RemoteFileInfo {
    RemoteFileInfo {
        name: entry.filename.clone(),
        size: entry.size,
        is_directory: entry.is_directory,
        permissions: entry.long_listing.clone(),
    }
}

fn validate_session_fields(cfg: &SessionConfig) -> Option<OperationOutcome> {
    if cfg.host.trim().is_empty() || cfg.username.trim().is_empty() {
        return Some(OperationOutcome::failure(
            "Missing required fields: host and username are required",
        ));
    }
    if cfg.password.is_none() && cfg.private_key_path.is_none() {
        return Some(OperationOutcome::failure(
            "Either password or private key path must be provided",
        ));
    }
    None
}
