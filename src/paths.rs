use std::path::Path;

/// Final remote destination for an upload.
///
/// Callers may pass a bare directory as the destination: when the remote
/// path does not already contain the local file's base name, the base name
/// is appended, adding a `/` separator only if the destination doesn't end
/// with one. A destination that already names the file is left unchanged.
pub fn resolve_upload_destination(local: &Path, remote: &str) -> String {
    let base = match local.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return remote.to_string(),
    };
    if remote.contains(&base) {
        return remote.to_string();
    }
    if remote.ends_with('/') {
        format!("{}{}", remote, base)
    } else {
        format!("{}/{}", remote, base)
    }
}
