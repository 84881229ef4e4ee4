//! Durable block cursors, one flat file per domain.

use std::path::PathBuf;

use async_trait::async_trait;
use eyre::{Context, Result};

use relayer_core::{BlockStorer, DomainId, U256};

/// File-backed [`BlockStorer`].
///
/// Each domain's cursor lives in its own file holding the decimal block
/// height. Writes land in a scratch file first and are renamed into place,
/// so a crash mid-write leaves the previous cursor readable and at worst one
/// window is replayed on restart.
#[derive(Debug, Clone)]
pub struct BlockStore {
    path: PathBuf,
}

impl BlockStore {
    /// Open a block store rooted at `path`, creating the directory if
    /// needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Creating block store directory {path:?}"))?;
        Ok(Self { path })
    }

    fn block_file_path(&self, domain: DomainId) -> PathBuf {
        self.path.join(format!("{domain}.block"))
    }

    /// The last stored cursor for a domain, or `None` if nothing was ever
    /// persisted for it.
    pub async fn latest_block(&self, domain: DomainId) -> Result<Option<U256>> {
        let path = self.block_file_path(domain);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(_) => return Ok(None),
        };
        let block = U256::from_dec_str(data.trim())
            .with_context(|| format!("Parsing stored block in {path:?}"))?;
        Ok(Some(block))
    }
}

#[async_trait]
impl BlockStorer for BlockStore {
    async fn store_block(&self, block: U256, domain: DomainId) -> Result<()> {
        let path = self.block_file_path(domain);
        let scratch = path.with_extension("tmp");
        tokio::fs::write(&scratch, block.to_string())
            .await
            .with_context(|| format!("Writing block to {scratch:?}"))?;
        tokio::fs::rename(&scratch, &path)
            .await
            .with_context(|| format!("Committing block to {path:?}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn returns_none_when_nothing_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(dir.path()).unwrap();

        assert_eq!(store.latest_block(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stores_and_reads_back_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(dir.path()).unwrap();

        store.store_block(U256::from(105), 1).await.unwrap();

        assert_eq!(
            store.latest_block(1).await.unwrap(),
            Some(U256::from(105))
        );
    }

    #[tokio::test]
    async fn overwrites_previous_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(dir.path()).unwrap();

        store.store_block(U256::from(105), 1).await.unwrap();
        store.store_block(U256::from(110), 1).await.unwrap();

        assert_eq!(
            store.latest_block(1).await.unwrap(),
            Some(U256::from(110))
        );
    }

    #[tokio::test]
    async fn cursors_are_isolated_per_domain() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(dir.path()).unwrap();

        store.store_block(U256::from(105), 1).await.unwrap();
        store.store_block(U256::from(42), 2).await.unwrap();

        assert_eq!(
            store.latest_block(1).await.unwrap(),
            Some(U256::from(105))
        );
        assert_eq!(store.latest_block(2).await.unwrap(), Some(U256::from(42)));
    }

    #[tokio::test]
    async fn leaves_no_scratch_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(dir.path()).unwrap();

        store.store_block(U256::from(105), 1).await.unwrap();

        assert!(!dir.path().join("1.tmp").exists());
        assert!(dir.path().join("1.block").exists());
    }

    #[tokio::test]
    async fn stores_heights_beyond_u64() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(dir.path()).unwrap();
        let height = U256::from(u64::MAX) + U256::from(7);

        store.store_block(height, 3).await.unwrap();

        assert_eq!(store.latest_block(3).await.unwrap(), Some(height));
    }
}
