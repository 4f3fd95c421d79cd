use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

/// Key under which the raw session token is stored.
pub const KEY_USER_TOKEN: &str = "userToken";
/// Key under which the serialized public user is stored.
pub const KEY_USER_DATA: &str = "userData";
/// Key under which the saved-recipe collection is stored.
pub const KEY_SAVED_RECIPES: &str = "savedRecipes";
/// Key under which the planner collection is stored.
pub const KEY_PLANNER_ITEMS: &str = "plannerItems";

/// Durable key/value pairs, one file per key under a directory.
///
/// A write lands in a sibling temp file first and is renamed into place, so
/// a stored value is replaced whole or not at all.
pub struct DiskKv {
    dir: PathBuf,
}

impl DiskKv {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the stored value, or `None` when the key was never written or
    /// its file cannot be read.
    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let target = self.path(key);
        let tmp = self.dir.join(format!(".{key}.tmp"));
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("create {}", tmp.display()))?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &target)
            .with_context(|| format!("replace {}", target.display()))?;
        debug!(key, bytes = value.len(), "kv write");
        Ok(())
    }

    /// Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kv = DiskKv::open(dir.path()).expect("open");
        assert_eq!(kv.get("userToken"), None);

        kv.set("userToken", "abc").expect("set");
        assert_eq!(kv.get("userToken").as_deref(), Some("abc"));

        kv.set("userToken", "def").expect("overwrite");
        assert_eq!(kv.get("userToken").as_deref(), Some("def"));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kv = DiskKv::open(dir.path()).expect("open");
        kv.remove("never-written").expect("remove absent");
        kv.set("k", "v").expect("set");
        kv.remove("k").expect("remove");
        kv.remove("k").expect("remove again");
        assert_eq!(kv.get("k"), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let kv = DiskKv::open(dir.path()).expect("open");
            kv.set("savedRecipes", "[]").expect("set");
        }
        let kv = DiskKv::open(dir.path()).expect("reopen");
        assert_eq!(kv.get("savedRecipes").as_deref(), Some("[]"));
    }
}
