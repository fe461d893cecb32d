/// 当前 duty 列表
pub const DUTIES: &str = "duties";
/// 已归档的 duty 列表
pub const ARCHIVED_DUTIES: &str = "archivedDuties";
/// 编辑旧日期时不再提示
pub const DONT_WARN_OLD_DATE: &str = "dontShowOldDateWarning";
/// 本地数据已迁移（或用户已拒绝迁移）
pub const HAS_MIGRATED: &str = "hasMigratedLocalData";
/// 旧版本的清单数据
pub const LEGACY_CHECKLIST: &str = "checklistData";
/// 登录会话
pub const SESSION: &str = "session";
