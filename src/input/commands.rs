/// 正常模式下的应用命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // ===== 退出 =====
    Quit,

    // ===== duty 选择 =====
    /// 选择下一个 duty
    DutyDown,
    /// 选择上一个 duty
    DutyUp,

    // ===== 日历 =====
    /// 光标移动到前一天
    DayLeft,
    /// 光标移动到后一天
    DayRight,
    /// 上一周
    WeekUp,
    /// 下一周
    WeekDown,
    PrevMonth,
    NextMonth,
    /// 回到今天
    Today,
    /// 切换光标所在日期的完成状态
    ToggleDay,

    // ===== duty 操作 =====
    /// 打开新建面板
    NewDuty,
    /// 打开归档面板
    OpenArchive,
    /// 删除（移到归档）
    DeleteDuty,
    /// 从当前后端重新加载
    Reload,

    // ===== 账户 =====
    /// 登录，已登录时为退出登录
    Account,
    /// 重新打开本地数据迁移提示
    Migrate,

    // ===== 视图 =====
    SwitchView,
    ShowHelp,
}
