/// Structured errors surfaced by `SessionClient` and its front ends.
///
/// Front ends never inspect transport-library errors directly; every failure
/// inside the session layer is re-expressed as exactly one of these kinds
/// carrying a human-readable message.
#[derive(Debug, Clone)]
pub enum SessionError {
    /// Neither a password nor a private key path was supplied
    MissingCredentials,
    /// Local private key file unreadable or not a recognizable key
    KeyRead(std::path::PathBuf, String),
    /// Handshake rejected, host unreachable, or authentication refused
    Connection(String),
    /// No handshake response within the readiness bound
    ConnectionTimeout,
    /// Transport handshake succeeded but the SFTP sub-channel could not be opened
    ChannelInit(String),
    /// An operation was attempted outside the `Ready` state
    NotConnected(&'static str),
    /// Upload or download failed at open or mid-flight
    Transfer(String),
    /// A directory/path operation was rejected by the server
    RemoteOp(&'static str, String, String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SessionError::*;
        match self {
            MissingCredentials => {
                write!(f, "either password or private key must be provided")
            }
            KeyRead(p, msg) => {
                write!(f, "failed to read private key {}: {}", p.display(), msg)
            }
            Connection(msg) => write!(f, "connection error: {}", msg),
            ConnectionTimeout => {
                write!(f, "connection timeout: server did not respond")
            }
            ChannelInit(msg) => write!(f, "SFTP initialization failed: {}", msg),
            NotConnected(op) => {
                write!(f, "not connected to SFTP server (attempted {})", op)
            }
            Transfer(msg) => write!(f, "transfer failed: {}", msg),
            RemoteOp(op, path, msg) => {
                write!(f, "remote {} failed for {}: {}", op, path, msg)
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl SessionError {
    /// Whether a caller that owns retry policy may reasonably retry after
    /// this error with a fresh client. Conservative: configuration and
    /// programming errors are never retriable; transient network failures
    /// and mid-flight transfer errors are. No retries happen inside the
    /// session layer itself.
    pub fn is_retriable(&self) -> bool {
        use SessionError::*;
        match self {
            Connection(_) | ConnectionTimeout | ChannelInit(_) | Transfer(_) => true,
            MissingCredentials | KeyRead(_, _) | NotConnected(_) | RemoteOp(_, _, _) => false,
        }
    }

    /// Short stable tag for logs and structured output.
    pub fn kind(&self) -> &'static str {
        use SessionError::*;
        match self {
            MissingCredentials => "missing_credentials",
            KeyRead(_, _) => "key_read",
            Connection(_) => "connection",
            ConnectionTimeout => "connection_timeout",
            ChannelInit(_) => "channel_init",
            NotConnected(_) => "not_connected",
            Transfer(_) => "transfer",
            RemoteOp(_, _, _) => "remote_op",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retriability_split() {
        assert!(SessionError::ConnectionTimeout.is_retriable());
        assert!(SessionError::Connection("refused".into()).is_retriable());
        assert!(SessionError::Transfer("broken pipe".into()).is_retriable());
        assert!(!SessionError::MissingCredentials.is_retriable());
        assert!(!SessionError::NotConnected("upload").is_retriable());
        assert!(!SessionError::RemoteOp("mkdir", "/tmp/x".into(), "denied".into()).is_retriable());
    }

    #[test]
    fn display_names_operation_and_path() {
        let e = SessionError::RemoteOp("rename", "/srv/a".into(), "permission denied".into());
        let s = e.to_string();
        assert!(s.contains("rename"));
        assert!(s.contains("/srv/a"));
        assert!(s.contains("permission denied"));
    }
}
