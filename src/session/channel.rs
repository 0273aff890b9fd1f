use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Advisory snapshot delivered to a transfer's progress observer after each
/// chunk. Not persisted; exists only for the duration of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        ((self.bytes_transferred as f64 / self.total_bytes as f64) * 100.0).round() as u8
    }
}

/// One row of a remote directory listing, in server-supplied order.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub filename: String,
    pub long_listing: String,
    pub size: u64,
    pub is_directory: bool,
}

impl DirectoryEntry {
    /// The directory flag is derived from the long-listing's leading
    /// character, as the remote listing format defines it; it is not
    /// verified against a separate stat.
    pub fn from_listing(filename: String, long_listing: String, size: u64) -> Self {
        let is_directory = long_listing.starts_with('d');
        Self { filename, long_listing, size, is_directory }
    }
}

/// Attribute bag returned by `stat`.
#[derive(Debug, Clone, Copy)]
pub struct RemoteStat {
    pub size: u64,
    pub is_directory: bool,
    pub permissions: Option<u32>,
    pub modified: Option<u64>,
}

/// Trait abstracting the SFTP sub-channel the session drives. Whole-file
/// `put`/`get` are bulk primitives: the implementor owns chunking and steps
/// the optional observer as each chunk lands. Implementors must be Send so
/// a boxed channel can move with its session. Tests inject a mock channel
/// through this seam.
pub trait SftpChannel: Send {
    fn stat(&self, path: &str) -> Result<RemoteStat, String>;
    fn mkdir(&self, path: &str) -> Result<(), String>;
    fn remove_file(&self, path: &str) -> Result<(), String>;
    fn remove_dir(&self, path: &str) -> Result<(), String>;
    fn rename(&self, from: &str, to: &str) -> Result<(), String>;
    fn read_dir(&self, path: &str) -> Result<Vec<DirectoryEntry>, String>;
    fn put(
        &self,
        local: &Path,
        remote: &str,
        progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), String>;
    fn get(
        &self,
        remote: &str,
        local: &Path,
        progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), String>;
}

/// Adapter that owns an `ssh2::Sftp` and implements `SftpChannel` so it can
/// be boxed into a trait object held by the session.
pub struct Ssh2Channel(pub ssh2::Sftp);

const CHUNK_SIZE: usize = 1024 * 1024;

impl SftpChannel for Ssh2Channel {
    fn stat(&self, path: &str) -> Result<RemoteStat, String> {
        let st = self.0.stat(Path::new(path)).map_err(|e| e.to_string())?;
        Ok(RemoteStat {
            size: st.size.unwrap_or(0),
            is_directory: st.is_dir(),
            permissions: st.perm,
            modified: st.mtime,
        })
    }

    fn mkdir(&self, path: &str) -> Result<(), String> {
        self.0.mkdir(Path::new(path), 0o755).map_err(|e| e.to_string())
    }

    fn remove_file(&self, path: &str) -> Result<(), String> {
        self.0.unlink(Path::new(path)).map_err(|e| e.to_string())
    }

    fn remove_dir(&self, path: &str) -> Result<(), String> {
        self.0.rmdir(Path::new(path)).map_err(|e| e.to_string())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), String> {
        self.0.rename(Path::new(from), Path::new(to), None).map_err(|e| e.to_string())
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirectoryEntry>, String> {
        let rows = self.0.readdir(Path::new(path)).map_err(|e| e.to_string())?;
        let mut entries = Vec::with_capacity(rows.len());
        for (p, st) in rows {
            let filename = p
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.to_string_lossy().into_owned());
            let size = st.size.unwrap_or(0);
            let long = render_long_listing(st.perm, size, &filename);
            entries.push(DirectoryEntry::from_listing(filename, long, size));
        }
        Ok(entries)
    }

    fn put(
        &self,
        local: &Path,
        remote: &str,
        progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), String> {
        let mut src = File::open(local)
            .map_err(|e| format!("local open failed: {}: {}", local.display(), e))?;
        let total = src
            .metadata()
            .map_err(|e| format!("local stat failed: {}: {}", local.display(), e))?
            .len();
        let mut dst = self
            .0
            .create(Path::new(remote))
            .map_err(|e| format!("remote create failed: {}: {}", remote, e))?;
        copy_chunked(
            &mut src,
            &mut dst,
            total,
            progress,
            &format!("local read failed: {}", local.display()),
            &format!("remote write failed: {}", remote),
        )
    }

    fn get(
        &self,
        remote: &str,
        local: &Path,
        progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), String> {
        let total = self
            .0
            .stat(Path::new(remote))
            .map_err(|e| format!("remote stat failed: {}: {}", remote, e))?
            .size
            .unwrap_or(0);
        let mut src = self
            .0
            .open(Path::new(remote))
            .map_err(|e| format!("remote open failed: {}: {}", remote, e))?;
        let mut dst = File::create(local)
            .map_err(|e| format!("local create failed: {}: {}", local.display(), e))?;
        copy_chunked(
            &mut src,
            &mut dst,
            total,
            progress,
            &format!("remote read failed: {}", remote),
            &format!("local write failed: {}", local.display()),
        )
    }
}

// Chunked copy with per-chunk progress stepping. The observer is advisory:
// it is called after each chunk is written and has no say in completion.
pub(crate) fn copy_chunked<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    total: u64,
    mut progress: Option<&mut dyn FnMut(TransferProgress)>,
    read_ctx: &str,
    write_ctx: &str,
) -> Result<(), String> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut transferred = 0u64;
    loop {
        match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                dst.write_all(&buf[..n]).map_err(|e| format!("{}: {}", write_ctx, e))?;
                transferred += n as u64;
                if let Some(cb) = progress.as_mut() {
                    cb(TransferProgress { bytes_transferred: transferred, total_bytes: total });
                }
            }
            Err(e) => return Err(format!("{}: {}", read_ctx, e)),
        }
    }
    dst.flush().map_err(|e| format!("{}: {}", write_ctx, e))?;
    Ok(())
}

// Synthesize an `ls -l` style row from SFTP mode bits. libssh2's readdir
// surfaces stat attributes rather than the server's longname, so the
// leading type character carries the directory marker callers key on.
pub(crate) fn render_long_listing(perm: Option<u32>, size: u64, filename: &str) -> String {
    const S_IFMT: u32 = 0o170000;
    const S_IFDIR: u32 = 0o040000;
    const S_IFLNK: u32 = 0o120000;
    let mode = perm.unwrap_or(0);
    let type_char = match mode & S_IFMT {
        S_IFDIR => 'd',
        S_IFLNK => 'l',
        _ => '-',
    };
    let mut bits = String::with_capacity(9);
    for shift in [6u32, 3, 0] {
        let triplet = (mode >> shift) & 0o7;
        bits.push(if triplet & 0o4 != 0 { 'r' } else { '-' });
        bits.push(if triplet & 0o2 != 0 { 'w' } else { '-' });
        bits.push(if triplet & 0o1 != 0 { 'x' } else { '-' });
    }
    format!("{}{} {:>12} {}", type_char, bits, size, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn percent_rounds() {
        let p = TransferProgress { bytes_transferred: 1, total_bytes: 3 };
        assert_eq!(p.percent(), 33);
        let p = TransferProgress { bytes_transferred: 2, total_bytes: 3 };
        assert_eq!(p.percent(), 67);
        let p = TransferProgress { bytes_transferred: 0, total_bytes: 0 };
        assert_eq!(p.percent(), 100);
    }

    #[test]
    fn long_listing_marks_directories() {
        let row = render_long_listing(Some(0o040755), 4096, "d1");
        assert!(row.starts_with("drwxr-xr-x"));
        let row = render_long_listing(Some(0o100644), 42, "f1");
        assert!(row.starts_with("-rw-r--r--"));
        let row = render_long_listing(Some(0o120777), 11, "ln");
        assert!(row.starts_with("lrwxrwxrwx"));
    }

    #[test]
    fn entry_directory_flag_comes_from_listing() {
        let e = DirectoryEntry::from_listing("d1".into(), "drwxr-xr-x 4096 d1".into(), 4096);
        assert!(e.is_directory);
        let e = DirectoryEntry::from_listing("f1".into(), "-rw-r--r-- 42 f1".into(), 42);
        assert!(!e.is_directory);
    }

    #[test]
    fn copy_reports_monotonic_progress_ending_at_total() {
        let data = vec![7u8; 3 * CHUNK_SIZE + 123];
        let mut src = Cursor::new(data.clone());
        let mut dst = Vec::new();
        let mut seen: Vec<TransferProgress> = Vec::new();
        let mut cb = |p: TransferProgress| seen.push(p);
        copy_chunked(&mut src, &mut dst, data.len() as u64, Some(&mut cb), "read", "write")
            .unwrap();
        assert_eq!(dst, data);
        assert!(!seen.is_empty());
        for pair in seen.windows(2) {
            assert!(pair[0].bytes_transferred <= pair[1].bytes_transferred);
        }
        let last = seen.last().unwrap();
        assert_eq!(last.bytes_transferred, last.total_bytes);
        assert_eq!(last.percent(), 100);
    }

    #[test]
    fn copy_without_observer_still_completes() {
        let data = b"tiny".to_vec();
        let mut src = Cursor::new(data.clone());
        let mut dst = Vec::new();
        copy_chunked(&mut src, &mut dst, data.len() as u64, None, "read", "write").unwrap();
        assert_eq!(dst, data);
    }
}
