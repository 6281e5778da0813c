use crate::errors::FerriteResult;
use crate::store::Snapshot;
use std::fs;
use std::path::Path;

/// A pluggable snapshot (de)serializer.
///
/// A codec turns a [Snapshot] into bytes on disk and back. The two shipped
/// implementations are interchangeable: a database written with one codec can
/// be reopened with the same codec regardless of platform.
///
/// Persistence is an all-or-nothing synchronous serialize-and-overwrite; a
/// crash mid-write can leave a corrupt or partial file behind, so loading
/// treats every failure as "start empty" rather than an open error.
pub trait SnapshotCodec: Send + Sync {
    /// Reads and decodes a snapshot from `path`.
    fn load(&self, path: &Path) -> FerriteResult<Snapshot>;

    /// Encodes `snapshot` and overwrites `path`.
    fn dump(&self, snapshot: &Snapshot, path: &Path) -> FerriteResult<()>;
}

/// Binary object-graph codec backed by MessagePack.
///
/// Structs are encoded with named fields, so the loader's shape detection
/// (current vs legacy snapshot layout) works the same way as with JSON.
#[derive(Clone, Copy, Default)]
pub struct MessagePackCodec;

impl SnapshotCodec for MessagePackCodec {
    fn load(&self, path: &Path) -> FerriteResult<Snapshot> {
        let bytes = fs::read(path)?;
        let snapshot = rmp_serde::from_slice(&bytes)?;
        Ok(snapshot)
    }

    fn dump(&self, snapshot: &Snapshot, path: &Path) -> FerriteResult<()> {
        let bytes = rmp_serde::to_vec_named(snapshot)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// UTF-8 JSON codec.
#[derive(Clone, Copy, Default)]
pub struct JsonCodec;

impl SnapshotCodec for JsonCodec {
    fn load(&self, path: &Path) -> FerriteResult<Snapshot> {
        let bytes = fs::read(path)?;
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(snapshot)
    }

    fn dump(&self, snapshot: &Snapshot, path: &Path) -> FerriteResult<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::errors::ErrorKind;
    use std::collections::HashMap;

    fn sample_snapshot() -> Snapshot {
        let mut docs = HashMap::new();
        docs.insert("1".to_string(), doc! { "_id": "1", "x": 5, "name": "bob" });
        docs.insert("2".to_string(), doc! { "_id": "2", "x": 10 });
        let mut collections = HashMap::new();
        collections.insert("default".to_string(), docs);
        Snapshot::new(collections)
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ferrite-codec-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_messagepack_round_trip() {
        let path = temp_path("mp.db");
        let snapshot = sample_snapshot();

        MessagePackCodec.dump(&snapshot, &path).unwrap();
        let loaded = MessagePackCodec.load(&path).unwrap();
        assert_eq!(snapshot, loaded);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_round_trip() {
        let path = temp_path("json.db");
        let snapshot = sample_snapshot();

        JsonCodec.dump(&snapshot, &path).unwrap();
        let loaded = JsonCodec.load(&path).unwrap();
        assert_eq!(snapshot, loaded);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_fails_with_not_found() {
        let err = JsonCodec
            .load(Path::new("/nonexistent/ferrite.db"))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FileNotFound);
    }

    #[test]
    fn test_load_corrupt_bytes_fails_with_encoding_error() {
        let path = temp_path("corrupt.db");
        fs::write(&path, b"not a snapshot").unwrap();

        let err = JsonCodec.load(&path).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_codec_mismatch_fails_cleanly() {
        let path = temp_path("mismatch.db");
        MessagePackCodec.dump(&sample_snapshot(), &path).unwrap();

        // reading a MessagePack file through the JSON codec must fail, not panic
        assert!(JsonCodec.load(&path).is_err());

        let _ = fs::remove_file(&path);
    }
}
