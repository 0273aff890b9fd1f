#![allow(dead_code)]
//! In-memory `SftpChannel` used by the integration tests. Keeps a flat
//! entry list so directory listings preserve insertion order, and supports
//! scripted mid-flight failures to simulate broken transfers.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::channel::{
    DirectoryEntry, RemoteStat, SftpChannel, TransferProgress, render_long_listing,
};

const MOCK_CHUNK: usize = 4096;

/// One remote entry; `data: None` marks a directory.
#[derive(Debug, Clone)]
pub struct MockEntry {
    pub path: String,
    pub data: Option<Vec<u8>>,
}

/// Flat in-memory remote filesystem.
#[derive(Debug, Default)]
pub struct RemoteFs {
    pub entries: Vec<MockEntry>,
}

impl RemoteFs {
    pub fn add_dir(&mut self, path: &str) {
        self.entries.push(MockEntry { path: norm(path), data: None });
    }

    pub fn add_file(&mut self, path: &str, data: &[u8]) {
        self.entries.push(MockEntry { path: norm(path), data: Some(data.to_vec()) });
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        let p = norm(path);
        self.entries.iter().find(|e| e.path == p).and_then(|e| e.data.as_deref())
    }

    pub fn contains(&self, path: &str) -> bool {
        let p = norm(path);
        self.entries.iter().any(|e| e.path == p)
    }

    fn position(&self, path: &str) -> Option<usize> {
        let p = norm(path);
        self.entries.iter().position(|e| e.path == p)
    }
}

fn norm(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "",
    }
}

pub struct MockChannel {
    fs: Arc<Mutex<RemoteFs>>,
    /// Fail `put` with a write error after this many chunks have landed.
    pub fail_put_after_chunks: Option<usize>,
    /// Fail `get` with a read error after this many chunks have been
    /// written locally, leaving a partial local file behind.
    pub fail_get_after_chunks: Option<usize>,
    /// Per-operation refusals: (operation, message).
    pub denied: Vec<(String, String)>,
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            fs: Arc::new(Mutex::new(RemoteFs::default())),
            fail_put_after_chunks: None,
            fail_get_after_chunks: None,
            denied: Vec::new(),
        }
    }

    /// Handle to the shared remote filesystem, for seeding and inspection
    /// after the channel has been boxed into a session.
    pub fn fs(&self) -> Arc<Mutex<RemoteFs>> {
        self.fs.clone()
    }

    pub fn deny(mut self, op: &str, msg: &str) -> Self {
        self.denied.push((op.to_string(), msg.to_string()));
        self
    }

    fn refusal(&self, op: &str) -> Option<String> {
        self.denied.iter().find(|(o, _)| o == op).map(|(_, m)| m.clone())
    }
}

impl SftpChannel for MockChannel {
    fn stat(&self, path: &str) -> Result<RemoteStat, String> {
        if let Some(msg) = self.refusal("stat") {
            return Err(msg);
        }
        let fs = self.fs.lock().unwrap();
        let p = norm(path);
        let entry = fs
            .entries
            .iter()
            .find(|e| e.path == p)
            .ok_or_else(|| format!("no such file: {}", path))?;
        Ok(match &entry.data {
            Some(data) => RemoteStat {
                size: data.len() as u64,
                is_directory: false,
                permissions: Some(0o100644),
                modified: None,
            },
            None => RemoteStat {
                size: 0,
                is_directory: true,
                permissions: Some(0o040755),
                modified: None,
            },
        })
    }

    fn mkdir(&self, path: &str) -> Result<(), String> {
        if let Some(msg) = self.refusal("mkdir") {
            return Err(msg);
        }
        let mut fs = self.fs.lock().unwrap();
        if fs.contains(path) {
            return Err(format!("file exists: {}", path));
        }
        fs.add_dir(path);
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<(), String> {
        if let Some(msg) = self.refusal("delete") {
            return Err(msg);
        }
        let mut fs = self.fs.lock().unwrap();
        let idx = fs.position(path).ok_or_else(|| format!("no such file: {}", path))?;
        if fs.entries[idx].data.is_none() {
            return Err(format!("is a directory: {}", path));
        }
        fs.entries.remove(idx);
        Ok(())
    }

    fn remove_dir(&self, path: &str) -> Result<(), String> {
        if let Some(msg) = self.refusal("rmdir") {
            return Err(msg);
        }
        let mut fs = self.fs.lock().unwrap();
        let idx = fs.position(path).ok_or_else(|| format!("no such file: {}", path))?;
        if fs.entries[idx].data.is_some() {
            return Err(format!("not a directory: {}", path));
        }
        fs.entries.remove(idx);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), String> {
        if let Some(msg) = self.refusal("rename") {
            return Err(msg);
        }
        let mut fs = self.fs.lock().unwrap();
        let idx = fs.position(from).ok_or_else(|| format!("no such file: {}", from))?;
        fs.entries[idx].path = norm(to);
        Ok(())
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirectoryEntry>, String> {
        if let Some(msg) = self.refusal("list") {
            return Err(msg);
        }
        let fs = self.fs.lock().unwrap();
        let dir = norm(path);
        if dir != "/" && !fs.contains(&dir) {
            return Err(format!("no such directory: {}", path));
        }
        let mut out = Vec::new();
        for entry in &fs.entries {
            if parent_of(&entry.path) != dir {
                continue;
            }
            let name = entry.path.rsplit('/').next().unwrap_or(&entry.path).to_string();
            let (size, perm) = match &entry.data {
                Some(data) => (data.len() as u64, 0o100644),
                None => (4096, 0o040755),
            };
            let long = render_long_listing(Some(perm), size, &name);
            out.push(DirectoryEntry::from_listing(name, long, size));
        }
        Ok(out)
    }

    fn put(
        &self,
        local: &Path,
        remote: &str,
        mut progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), String> {
        let data = std::fs::read(local)
            .map_err(|e| format!("local open failed: {}: {}", local.display(), e))?;
        let total = data.len() as u64;
        let mut stored: Vec<u8> = Vec::with_capacity(data.len());
        for (i, chunk) in data.chunks(MOCK_CHUNK).enumerate() {
            if let Some(limit) = self.fail_put_after_chunks {
                if i >= limit {
                    return Err("simulated remote write failure".to_string());
                }
            }
            stored.extend_from_slice(chunk);
            if let Some(cb) = progress.as_mut() {
                cb(TransferProgress {
                    bytes_transferred: stored.len() as u64,
                    total_bytes: total,
                });
            }
        }
        let mut fs = self.fs.lock().unwrap();
        let p = norm(remote);
        match fs.position(&p) {
            Some(idx) => fs.entries[idx].data = Some(stored),
            None => fs.entries.push(MockEntry { path: p, data: Some(stored) }),
        }
        Ok(())
    }

    fn get(
        &self,
        remote: &str,
        local: &Path,
        mut progress: Option<&mut dyn FnMut(TransferProgress)>,
    ) -> Result<(), String> {
        let data = {
            let fs = self.fs.lock().unwrap();
            fs.file(remote).map(<[u8]>::to_vec)
        }
        .ok_or_else(|| format!("no such file: {}", remote))?;
        let total = data.len() as u64;
        let mut dst = std::fs::File::create(local)
            .map_err(|e| format!("local create failed: {}: {}", local.display(), e))?;
        let mut written = 0u64;
        for (i, chunk) in data.chunks(MOCK_CHUNK).enumerate() {
            if let Some(limit) = self.fail_get_after_chunks {
                if i >= limit {
                    return Err("simulated remote read failure".to_string());
                }
            }
            dst.write_all(chunk).map_err(|e| {
                format!("local write failed: {}: {}", local.display(), e)
            })?;
            written += chunk.len() as u64;
            if let Some(cb) = progress.as_mut() {
                cb(TransferProgress { bytes_transferred: written, total_bytes: total });
            }
        }
        Ok(())
    }
}
