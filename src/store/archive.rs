use crate::models::Duty;

/// Duties removed from the active list, kept for restore or permanent delete.
#[derive(Debug, Default, Clone)]
pub struct ArchiveStore {
    items: Vec<Duty>,
}

impl ArchiveStore {
    pub fn new(items: Vec<Duty>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Duty] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: i64) -> Option<&Duty> {
        self.items.iter().find(|d| d.id == id)
    }

    pub fn push(&mut self, duty: Duty) {
        self.items.push(duty);
    }

    /// 移出归档（重新启用时使用）
    pub fn take(&mut self, id: i64) -> Option<Duty> {
        let pos = self.items.iter().position(|d| d.id == id)?;
        Some(self.items.remove(pos))
    }

    /// 永久删除
    pub fn remove(&mut self, id: i64) -> bool {
        self.take(id).is_some()
    }
}
