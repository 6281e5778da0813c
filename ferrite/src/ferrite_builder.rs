use crate::ferrite::Ferrite;
use crate::store::{MessagePackCodec, SnapshotCodec};
use std::path::PathBuf;

/// Builder for configuring and opening a [Ferrite] database.
///
/// # Examples
///
/// ```rust,ignore
/// use ferrite::ferrite::Ferrite;
/// use ferrite::store::JsonCodec;
///
/// // in-memory database
/// let db = Ferrite::builder().open();
///
/// // file-backed database with autosync and a JSON snapshot
/// let db = Ferrite::builder()
///     .path("authors.db")
///     .codec(JsonCodec)
///     .autosync(true)
///     .open();
/// ```
pub struct FerriteBuilder {
    path: Option<PathBuf>,
    codec: Box<dyn SnapshotCodec>,
    autosync: bool,
}

impl FerriteBuilder {
    pub(crate) fn new() -> Self {
        FerriteBuilder {
            path: None,
            codec: Box::new(MessagePackCodec),
            autosync: false,
        }
    }

    /// Sets the snapshot file path. Without a path the database lives purely
    /// in memory and `sync` fails.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the snapshot codec. Defaults to the binary
    /// [MessagePackCodec]; [crate::store::JsonCodec] is the interchangeable
    /// UTF-8 alternative.
    pub fn codec<C: SnapshotCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Enables synchronous persistence after every mutation.
    pub fn autosync(mut self, autosync: bool) -> Self {
        self.autosync = autosync;
        self
    }

    /// Opens the database.
    ///
    /// When a path is configured its snapshot is loaded through the codec; a
    /// missing file, a codec mismatch, or corrupt bytes are logged and
    /// degrade to an empty database - opening never fails.
    pub fn open(self) -> Ferrite {
        Ferrite::open(self.path, self.codec, self.autosync)
    }
}

impl Default for FerriteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
