// session module: one transport connection, one SFTP sub-channel, and the
// operation contract every front end drives.
pub mod channel;
mod connect;
pub mod mock;

use std::path::Path;

pub use self::channel::{DirectoryEntry, RemoteStat, SftpChannel, TransferProgress};

use self::connect::ConnectOutcome;
use crate::SessionError;
use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Ready,
    Failed,
}

/// One SFTP client session.
///
/// Owns exactly one transport connection and one sub-channel; operations are
/// legal only in `Ready` and run one at a time (`&mut self`). A client is
/// single-use: after any connect-time failure or a `disconnect()`, callers
/// construct a fresh client rather than reconnecting this one. `disconnect`
/// is idempotent and callable from any state, so callers can release the
/// transport with one unconditional call on every exit path.
pub struct SessionClient {
    state: SessionState,
    transport: Option<ssh2::Session>,
    channel: Option<Box<dyn SftpChannel>>,
}

impl Default for SessionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClient {
    pub fn new() -> Self {
        Self { state: SessionState::Disconnected, transport: None, channel: None }
    }

    /// Build a `Ready` session around an arbitrary channel, bypassing the
    /// network entirely. Exists so tests can inject the mock channel.
    pub fn with_channel(channel: Box<dyn SftpChannel>) -> Self {
        Self { state: SessionState::Ready, transport: None, channel: Some(channel) }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Establish the transport connection and open the SFTP sub-channel.
    ///
    /// Credential resolution happens first and entirely locally: a missing
    /// credential or an unreadable key file fails here without any network
    /// I/O. The network attempt itself is bounded by a 30 second readiness
    /// timeout with first-terminal-event-wins semantics (see `connect`
    /// submodule). On a sub-channel failure after a successful handshake the
    /// transport is retained in `Failed` state so `disconnect()` releases it.
    pub fn connect(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::Connection(
                "session already used; construct a fresh client".to_string(),
            ));
        }
        if config.host.trim().is_empty() {
            return Err(SessionError::Connection("host must not be empty".to_string()));
        }
        if config.username.trim().is_empty() {
            return Err(SessionError::Connection("username must not be empty".to_string()));
        }
        let auth = config.resolve_auth()?;
        self.state = SessionState::Connecting;
        tracing::debug!("[connect] dialing {}", config.addr());
        match connect::connect_with_timeout(config, auth) {
            ConnectOutcome::Ready(sess, channel) => {
                self.transport = Some(sess);
                self.channel = Some(channel);
                self.state = SessionState::Ready;
                Ok(())
            }
            ConnectOutcome::ChannelFailed(sess, msg) => {
                self.transport = Some(sess);
                self.state = SessionState::Failed;
                Err(SessionError::ChannelInit(msg))
            }
            ConnectOutcome::Failed(e) => {
                self.state = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Terminate the session. Safe to call any number of times from any
    /// state, including after a failed or partial `connect`.
    pub fn disconnect(&mut self) {
        self.channel = None;
        if let Some(sess) = self.transport.take() {
            let _ = sess.disconnect(None, "session closed", None);
            tracing::debug!("[disconnect] transport released");
        }
        self.state = SessionState::Disconnected;
    }

    fn require_ready(&self, op: &'static str) -> Result<&dyn SftpChannel, SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotConnected(op));
        }
        self.channel.as_deref().ok_or(SessionError::NotConnected(op))
    }

    /// Whole-file upload. The observer, when supplied, receives an advisory
    /// snapshot per chunk; it has no effect on completion or errors. A
    /// failed transfer may leave a partial file at the destination; cleanup
    /// belongs to the caller.
    pub fn upload(
        &mut self,
        local: &Path,
        remote: &str,
        progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), SessionError> {
        let ch = self.require_ready("upload")?;
        tracing::debug!("[upload] {} -> {}", local.display(), remote);
        ch.put(local, remote, progress).map_err(SessionError::Transfer)
    }

    /// Whole-file download. Same progress and partial-file semantics as
    /// `upload`.
    pub fn download(
        &mut self,
        remote: &str,
        local: &Path,
        progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), SessionError> {
        let ch = self.require_ready("download")?;
        tracing::debug!("[download] {} -> {}", remote, local.display());
        ch.get(remote, local, progress).map_err(SessionError::Transfer)
    }

    /// List a remote directory. Entries come back fully materialized, in
    /// whatever order the server returned them; callers sort if they care.
    pub fn list(&mut self, remote: &str) -> Result<Vec<DirectoryEntry>, SessionError> {
        let ch = self.require_ready("list")?;
        ch.read_dir(remote).map_err(|m| SessionError::RemoteOp("list", remote.to_string(), m))
    }

    pub fn mkdir(&mut self, remote: &str) -> Result<(), SessionError> {
        let ch = self.require_ready("mkdir")?;
        ch.mkdir(remote).map_err(|m| SessionError::RemoteOp("mkdir", remote.to_string(), m))
    }

    /// Remove a remote file.
    pub fn remove_file(&mut self, remote: &str) -> Result<(), SessionError> {
        let ch = self.require_ready("delete")?;
        ch.remove_file(remote).map_err(|m| SessionError::RemoteOp("delete", remote.to_string(), m))
    }

    /// Remove a remote directory.
    pub fn remove_dir(&mut self, remote: &str) -> Result<(), SessionError> {
        let ch = self.require_ready("rmdir")?;
        ch.remove_dir(remote).map_err(|m| SessionError::RemoteOp("rmdir", remote.to_string(), m))
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), SessionError> {
        let ch = self.require_ready("rename")?;
        ch.rename(from, to)
            .map_err(|m| SessionError::RemoteOp("rename", format!("{} -> {}", from, to), m))
    }

    pub fn stat(&mut self, remote: &str) -> Result<RemoteStat, SessionError> {
        let ch = self.require_ready("stat")?;
        ch.stat(remote).map_err(|m| SessionError::RemoteOp("stat", remote.to_string(), m))
    }
}
