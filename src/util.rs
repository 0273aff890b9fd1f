use indicatif::{ProgressBar, ProgressStyle};

use crate::session::TransferProgress;

/// Style for the single-file transfer bar.
pub fn transfer_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    )
    .expect("valid progress template")
    .progress_chars("=> ")
}

/// Transfer bar with unknown length; the observer sets the real total once
/// the first snapshot arrives.
pub fn transfer_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(transfer_style());
    pb
}

/// Observer that mirrors transfer snapshots into an indicatif bar. Advisory
/// only: dropping updates would not affect the transfer.
pub fn progress_observer(pb: &ProgressBar) -> impl FnMut(TransferProgress) + '_ {
    move |p: TransferProgress| {
        if pb.length().unwrap_or(0) != p.total_bytes {
            pb.set_length(p.total_bytes);
        }
        pb.set_position(p.bytes_transferred);
    }
}

/// Convert a byte count into a human readable string using IEC units.
pub fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GiB", b / GB)
    } else if b >= MB {
        format!("{:.2} MiB", b / MB)
    } else if b >= KB {
        format!("{:.2} KiB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// File logging under `~/.skiff/logs` plus env-filtered formatting; only
/// installed when the CLI runs with `--verbose`. The returned guard must
/// stay alive for the duration of the process so buffered lines flush.
pub fn init_verbose_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let home = dirs::home_dir()?;
    let log_dir = home.join(".skiff").join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let appender = tracing_appender::rolling::daily(log_dir, "skiff.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skiff=debug"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.00 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.00 MiB");
    }
}
