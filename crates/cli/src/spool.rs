//! A file-backed stand-in for the recording service.
//!
//! Each submitted buffer lands in the spool directory as `item-NNNNNN.bin`.
//! Files are written to a `.tmp` sibling, synced, then renamed, so a reader
//! never observes a half-written item.

use service::{MetricsService, ServiceError, ServiceLocator};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub const SPOOL_PREFIX: &str = "item-";
pub const SPOOL_EXTENSION: &str = "bin";

/// Writes every submitted buffer to its own file under `dir`.
#[derive(Debug)]
pub struct SpoolService {
    dir: PathBuf,
    next_seq: AtomicU64,
}

impl SpoolService {
    /// Opens `dir`, creating it if needed. Numbering continues after the
    /// highest sequence already present.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut next = 0;
        for entry in fs::read_dir(dir)? {
            let name = entry?.file_name();
            if let Some(seq) = parse_seq(&name.to_string_lossy()) {
                next = next.max(seq + 1);
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            next_seq: AtomicU64::new(next),
        })
    }
}

fn parse_seq(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix(SPOOL_PREFIX)?
        .strip_suffix(SPOOL_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

impl MetricsService for SpoolService {
    fn submit_buffer(&self, buf: &[u8]) -> Result<(), ServiceError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let path = self
            .dir
            .join(format!("{}{:06}.{}", SPOOL_PREFIX, seq, SPOOL_EXTENSION));
        let tmp_path = path.with_extension("bin.tmp");

        let written = File::create(&tmp_path).and_then(|mut f| {
            f.write_all(buf)?;
            f.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), len = buf.len(), "spooled item");
        Ok(())
    }
}

/// Resolves the service to a [`SpoolService`] when a spool directory is
/// configured. Without one, every lookup misses.
#[derive(Debug, Default)]
pub struct SpoolLocator {
    dir: Option<PathBuf>,
}

impl SpoolLocator {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }
}

impl ServiceLocator for SpoolLocator {
    fn locate(&self, name: &str) -> Option<Arc<dyn MetricsService>> {
        let dir = self.dir.as_ref()?;
        match SpoolService::open(dir) {
            Ok(svc) => {
                debug!(name, dir = %dir.display(), "located spool service");
                Some(Arc::new(svc) as Arc<dyn MetricsService>)
            }
            Err(e) => {
                warn!(name, dir = %dir.display(), "cannot open spool directory: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item::Item;
    use tempfile::tempdir;

    fn spooled(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn parses_spool_names() {
        assert_eq!(parse_seq("item-000042.bin"), Some(42));
        assert_eq!(parse_seq("item-000042.bin.tmp"), None);
        assert_eq!(parse_seq("other-1.bin"), None);
        assert_eq!(parse_seq("item-x.bin"), None);
    }

    #[test]
    fn writes_one_file_per_submission() {
        let dir = tempdir().unwrap();
        let svc = SpoolService::open(dir.path()).unwrap();

        let mut it = Item::new("spool.test");
        it.set_int32("n", 1).unwrap();
        svc.submit(&it).unwrap();
        svc.submit_buffer(b"raw").unwrap();

        assert_eq!(spooled(dir.path()), ["item-000000.bin", "item-000001.bin"]);
        let bytes = fs::read(dir.path().join("item-000000.bin")).unwrap();
        assert_eq!(bytestring::read_from_byte_string(&bytes).unwrap(), it);
    }

    #[test]
    fn numbering_continues_after_reopen() {
        let dir = tempdir().unwrap();
        SpoolService::open(dir.path())
            .unwrap()
            .submit_buffer(b"a")
            .unwrap();
        SpoolService::open(dir.path())
            .unwrap()
            .submit_buffer(b"b")
            .unwrap();
        assert_eq!(spooled(dir.path()), ["item-000000.bin", "item-000001.bin"]);
    }

    #[test]
    fn locator_without_dir_misses() {
        assert!(SpoolLocator::new(None).locate("media.metrics").is_none());
    }

    #[test]
    fn locator_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let spool = dir.path().join("nested").join("spool");
        let loc = SpoolLocator::new(Some(spool.clone()));
        assert!(loc.locate("media.metrics").is_some());
        assert!(spool.is_dir());
    }
}
