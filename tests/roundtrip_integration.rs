use std::io::Write;
use std::path::PathBuf;

use skiff::SessionError;
use skiff::session::mock::MockChannel;
use skiff::session::{SessionClient, TransferProgress};

fn write_local(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> PathBuf {
    let p = dir.path().join(name);
    let mut f = std::fs::File::create(&p).unwrap();
    f.write_all(data).unwrap();
    p
}

#[test]
fn upload_then_download_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    // three full mock chunks plus a ragged tail
    let payload: Vec<u8> = (0..13000u32).flat_map(|i| i.to_le_bytes()).collect();
    let local = write_local(&dir, "payload.bin", &payload);

    let channel = MockChannel::new();
    let fs = channel.fs();
    let mut client = SessionClient::with_channel(Box::new(channel));

    client.upload(&local, "/srv/payload.bin", None).unwrap();
    assert_eq!(fs.lock().unwrap().file("/srv/payload.bin").unwrap(), &payload[..]);

    let back = dir.path().join("payload.back");
    client.download("/srv/payload.bin", &back, None).unwrap();
    assert_eq!(std::fs::read(&back).unwrap(), payload);
    client.disconnect();
}

#[test]
fn progress_is_monotonic_and_ends_at_total() {
    let dir = tempfile::tempdir().unwrap();
    let payload = vec![0xabu8; 10_000];
    let local = write_local(&dir, "big.bin", &payload);

    let mut client = SessionClient::with_channel(Box::new(MockChannel::new()));
    let mut seen: Vec<TransferProgress> = Vec::new();
    let mut observer = |p: TransferProgress| seen.push(p);
    client.upload(&local, "/big.bin", Some(&mut observer)).unwrap();

    assert!(seen.len() > 1, "expected one snapshot per chunk");
    for pair in seen.windows(2) {
        assert!(pair[0].bytes_transferred <= pair[1].bytes_transferred);
    }
    let last = seen.last().unwrap();
    assert_eq!(last.total_bytes, payload.len() as u64);
    assert_eq!(last.bytes_transferred, last.total_bytes);
    assert_eq!(last.percent(), 100);
}

#[test]
fn upload_of_missing_local_file_is_a_transfer_error() {
    let mut client = SessionClient::with_channel(Box::new(MockChannel::new()));
    let res = client.upload(std::path::Path::new("/no/such/file"), "/dst", None);
    assert!(matches!(res, Err(SessionError::Transfer(_))));
}

#[test]
fn download_of_missing_remote_file_is_a_transfer_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut client = SessionClient::with_channel(Box::new(MockChannel::new()));
    let res = client.download("/no/such/file", &dir.path().join("out"), None);
    assert!(matches!(res, Err(SessionError::Transfer(_))));
}

#[test]
fn mid_flight_failure_surfaces_as_transfer_error() {
    let dir = tempfile::tempdir().unwrap();
    let payload = vec![1u8; 20_000];
    let local = write_local(&dir, "doomed.bin", &payload);

    let mut channel = MockChannel::new();
    channel.fail_put_after_chunks = Some(2);
    let mut client = SessionClient::with_channel(Box::new(channel));
    match client.upload(&local, "/doomed.bin", None) {
        Err(SessionError::Transfer(msg)) => assert!(msg.contains("simulated")),
        other => panic!("expected Transfer, got {:?}", other),
    }
}

#[test]
fn failed_download_leaves_a_partial_file_for_the_caller() {
    // Partial results are not rolled back at this layer; detecting and
    // removing them belongs to the caller.
    let dir = tempfile::tempdir().unwrap();
    let mut channel = MockChannel::new();
    channel.fail_get_after_chunks = Some(1);
    channel.fs().lock().unwrap().add_file("/srv/data.bin", &vec![9u8; 20_000]);
    let mut client = SessionClient::with_channel(Box::new(channel));

    let out = dir.path().join("data.partial");
    assert!(matches!(
        client.download("/srv/data.bin", &out, None),
        Err(SessionError::Transfer(_))
    ));
    let partial = std::fs::read(&out).unwrap();
    assert!(!partial.is_empty());
    assert!(partial.len() < 20_000);
}

#[test]
fn list_returns_entries_in_server_order_without_sorting() {
    let channel = MockChannel::new();
    {
        let fs = channel.fs();
        let mut fs = fs.lock().unwrap();
        fs.add_dir("/home");
        // deliberately not alphabetical
        fs.add_dir("/home/zz");
        fs.add_file("/home/aa", b"x");
        fs.add_dir("/home/d1");
        fs.add_file("/home/f1", &[0u8; 42]);
    }
    let mut client = SessionClient::with_channel(Box::new(channel));
    let entries = client.list("/home").unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(names, ["zz", "aa", "d1", "f1"]);

    let d1 = &entries[2];
    assert!(d1.is_directory);
    assert!(d1.long_listing.starts_with('d'));
    let f1 = &entries[3];
    assert!(!f1.is_directory);
    assert_eq!(f1.size, 42);
}

#[test]
fn directory_and_path_operations_round_trip() {
    let channel = MockChannel::new();
    let fs = channel.fs();
    let mut client = SessionClient::with_channel(Box::new(channel));

    client.mkdir("/work").unwrap();
    assert!(fs.lock().unwrap().contains("/work"));

    // duplicate mkdir is refused by the server
    assert!(matches!(
        client.mkdir("/work"),
        Err(SessionError::RemoteOp("mkdir", _, _))
    ));

    fs.lock().unwrap().add_file("/work/a.txt", b"abc");
    let st = client.stat("/work/a.txt").unwrap();
    assert_eq!(st.size, 3);
    assert!(!st.is_directory);
    assert!(client.stat("/work").unwrap().is_directory);

    client.rename("/work/a.txt", "/work/b.txt").unwrap();
    assert!(!fs.lock().unwrap().contains("/work/a.txt"));
    assert!(fs.lock().unwrap().contains("/work/b.txt"));

    client.remove_file("/work/b.txt").unwrap();
    assert!(!fs.lock().unwrap().contains("/work/b.txt"));

    client.remove_dir("/work").unwrap();
    assert!(!fs.lock().unwrap().contains("/work"));

    // operations on paths that are gone come back as RemoteOp
    assert!(matches!(
        client.remove_file("/work/b.txt"),
        Err(SessionError::RemoteOp("delete", _, _))
    ));
    assert!(matches!(
        client.remove_dir("/work"),
        Err(SessionError::RemoteOp("rmdir", _, _))
    ));
}

#[test]
fn server_refusals_carry_operation_path_and_reason() {
    let channel = MockChannel::new().deny("mkdir", "permission denied");
    let mut client = SessionClient::with_channel(Box::new(channel));
    match client.mkdir("/restricted") {
        Err(SessionError::RemoteOp(op, path, msg)) => {
            assert_eq!(op, "mkdir");
            assert_eq!(path, "/restricted");
            assert!(msg.contains("permission denied"));
        }
        other => panic!("expected RemoteOp, got {:?}", other),
    }
}
