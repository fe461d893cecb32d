//! 根据配置组装存储后端（TUI 和 CLI 共用）
use anyhow::Result;
use std::path::Path;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::remote::{AuthProvider, DutyTable, RestClient};
use crate::storage::{FileStore, LocalPersistence};
use crate::store::DutyStore;

pub struct Services {
    pub store: DutyStore,
    /// 未配置远端时为 None，此时只能本地使用
    pub auth: Option<Box<dyn AuthProvider>>,
}

impl Services {
    pub fn open(config: &Config, data_dir: &Path) -> Result<Self> {
        let local = LocalPersistence::new(Box::new(FileStore::new(data_dir)));

        let (table, auth): (Option<Box<dyn DutyTable>>, Option<Box<dyn AuthProvider>>) =
            match &config.remote {
                Some(remote) => {
                    let client = RestClient::new(remote)?;
                    (Some(Box::new(client.clone())), Some(Box::new(client)))
                }
                None => (None, None),
            };

        let mut store = DutyStore::new(local, table, Box::new(SystemClock));
        store.load();

        Ok(Self { store, auth })
    }
}
