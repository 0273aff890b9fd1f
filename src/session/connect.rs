use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crossbeam_channel::bounded;

use super::channel::{SftpChannel, Ssh2Channel};
use crate::SessionError;
use crate::config::{AuthMethod, SessionConfig};

/// Readiness bound for one connection attempt: TCP connect, handshake,
/// authentication and sub-channel open must all land within this window.
pub(super) const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Terminal outcome of one connection attempt.
pub(super) enum ConnectOutcome {
    Ready(ssh2::Session, Box<dyn SftpChannel>),
    /// Handshake and auth succeeded but the sub-channel did not come up.
    /// The transport is handed back so `disconnect()` can release it.
    ChannelFailed(ssh2::Session, String),
    Failed(SessionError),
}

/// Run one attempt on a connector thread and wait for the first terminal
/// event: the attempt's own outcome or the readiness timeout. The bounded(1)
/// channel is the single-resolution latch; once `recv_timeout` gives up, the
/// receiver is dropped and a late outcome from the thread is discarded.
pub(super) fn connect_with_timeout(config: &SessionConfig, auth: AuthMethod) -> ConnectOutcome {
    let (tx, rx) = bounded::<ConnectOutcome>(1);
    let cfg = config.clone();
    std::thread::spawn(move || {
        let outcome = run_attempt(&cfg, auth);
        let _ = tx.send(outcome);
    });
    match rx.recv_timeout(READY_TIMEOUT) {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::debug!("[connect] no terminal event within {:?}", READY_TIMEOUT);
            ConnectOutcome::Failed(SessionError::ConnectionTimeout)
        }
    }
}

fn run_attempt(cfg: &SessionConfig, auth: AuthMethod) -> ConnectOutcome {
    use ConnectOutcome::*;
    let addr = cfg.addr();
    let (tcp, deadline_guard) = match open_tcp(&addr) {
        Ok(pair) => pair,
        Err(e) => return Failed(e),
    };
    let mut sess = match ssh2::Session::new() {
        Ok(s) => s,
        Err(e) => {
            return Failed(SessionError::Connection(format!(
                "cannot create transport session: {}",
                e
            )));
        }
    };
    sess.set_tcp_stream(tcp);
    if let Err(e) = sess.handshake() {
        tracing::debug!("[connect] handshake with {} failed: {}", addr, e);
        return Failed(SessionError::Connection(format!("handshake with {} failed: {}", addr, e)));
    }
    let auth_res = match &auth {
        AuthMethod::Password(password) => sess.userauth_password(&cfg.username, password),
        AuthMethod::Key(path) => sess.userauth_pubkey_file(&cfg.username, None, path, None),
    };
    if let Err(e) = auth_res {
        tracing::debug!("[connect] auth for {}@{} failed: {}", cfg.username, addr, e);
        return Failed(SessionError::Connection(format!(
            "authentication failed for {}@{}: {}",
            cfg.username, addr, e
        )));
    }
    if !sess.authenticated() {
        return Failed(SessionError::Connection(format!(
            "authentication rejected for {}@{}",
            cfg.username, addr
        )));
    }
    // Handshake and auth ran under the socket deadline; lift it so transfers
    // and directory operations are bounded only by transport liveness.
    if let Some(guard) = deadline_guard {
        let _ = guard.set_read_timeout(None);
        let _ = guard.set_write_timeout(None);
    }
    match sess.sftp() {
        Ok(sftp) => {
            tracing::debug!("[connect] session ready for {}@{}", cfg.username, addr);
            Ready(sess, Box::new(Ssh2Channel(sftp)))
        }
        Err(e) => ChannelFailed(sess, e.to_string()),
    }
}

// TCP connect with the readiness deadline applied to the socket. Returns a
// cloned handle so the deadline can be lifted after auth; the clone shares
// the open socket, so timeout changes through it take effect on the stream
// already handed to the transport.
fn open_tcp(addr: &str) -> Result<(TcpStream, Option<TcpStream>), SessionError> {
    let mut addrs = addr
        .to_socket_addrs()
        .map_err(|e| SessionError::Connection(format!("cannot resolve {}: {}", addr, e)))?;
    let sock = addrs
        .next()
        .ok_or_else(|| SessionError::Connection(format!("cannot resolve {}", addr)))?;
    let tcp = TcpStream::connect_timeout(&sock, READY_TIMEOUT)
        .map_err(|e| SessionError::Connection(format!("cannot reach {}: {}", addr, e)))?;
    let _ = tcp.set_read_timeout(Some(READY_TIMEOUT));
    let _ = tcp.set_write_timeout(Some(READY_TIMEOUT));
    let guard = tcp.try_clone().ok();
    Ok((tcp, guard))
}
