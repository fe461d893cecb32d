use anyhow::Result;
use chrono::NaiveDate;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::migration::{Migration, MigrationState};
use crate::models::duty::{parse_date, ICONS};
use crate::models::{Duty, DutyDraft};
use crate::services::Services;
use crate::stats::{self, WINDOW_DAYS};

/// 处理 CLI 命令
/// 返回 true 表示应该继续进入 TUI，false 表示已处理完毕应该退出
pub fn handle_cli(config: &Config, data_dir: &Path) -> Result<bool> {
    let args: Vec<String> = env::args().collect();

    // 如果没有参数，进入 TUI 模式
    if args.len() < 2 {
        return Ok(true);
    }

    let result = match args[1].as_str() {
        "duty" => handle_duty_command(&args[1..], config, data_dir),
        "archive" => handle_archive_command(&args[1..], config, data_dir),
        "stats" => cli_stats(&args[2..], config, data_dir),
        "login" => cli_login(&args[2..], config, data_dir, false),
        "signup" => cli_login(&args[2..], config, data_dir, true),
        "logout" => cli_logout(config, data_dir),
        "whoami" => cli_whoami(config, data_dir),
        "migrate" => cli_migrate(&args[2..], config, data_dir),
        "config" => {
            handle_config_command(&args[1..])?;
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "-v" => {
            print_version();
            Ok(())
        }
        _ => {
            eprintln!("未知命令: {}", args[1]);
            eprintln!("使用 'dtk --help' 查看帮助");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(false)
}

fn open(config: &Config, data_dir: &Path) -> Result<Services, String> {
    Services::open(config, data_dir).map_err(|e| e.to_string())
}

// ============================================================================
// Duty Commands
// ============================================================================

fn handle_duty_command(args: &[String], config: &Config, data_dir: &Path) -> Result<(), String> {
    if args.len() < 2 {
        print_duty_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "list" => duty_list(config, data_dir),
        "show" => {
            let id = parse_id(args.get(2), "Usage: dtk duty show <id>")?;
            duty_show(config, data_dir, id)
        }
        "add" => {
            let name = args
                .get(2)
                .filter(|s| !s.starts_with("--"))
                .ok_or("Missing duty name\nUsage: dtk duty add <name> [--duration <days>]")?;
            let draft = build_draft(name, &args[3..])?;
            duty_add(config, data_dir, draft)
        }
        "toggle" => {
            let id = parse_id(
                args.get(2),
                "Usage: dtk duty toggle <id> [--date YYYY-MM-DD]",
            )?;
            let date = match parse_flag(&args[3..], "--date") {
                Some(s) => Some(parse_date(&s).ok_or_else(|| format!("Invalid date: {}", s))?),
                None => None,
            };
            duty_toggle(config, data_dir, id, date)
        }
        "delete" => {
            let id = parse_id(args.get(2), "Usage: dtk duty delete <id>")?;
            duty_delete(config, data_dir, id)
        }
        "help" | "--help" | "-h" => {
            print_duty_usage();
            Ok(())
        }
        cmd => Err(format!(
            "Unknown duty command: {}\nRun 'dtk duty help' for usage",
            cmd
        )),
    }
}

fn print_duty_usage() {
    println!("Duty Commands

USAGE:
    dtk duty <SUBCOMMAND>

SUBCOMMANDS:
    list                          List active duties
    show <id>                     Show a duty with its completed days
    add <name> [OPTIONS]          Create a duty
        --description <text>
        --icon <emoji>            One of the built-in icons (see below)
        --color <blue|green|purple|red|yellow|pink|indigo|teal>
        --duration <1-365>        Target days (default 66)
    toggle <id> [--date <date>]   Flip completion for a day (default today)
    delete <id>                   Move a duty to the archive

EXAMPLES:
    dtk duty add Meditate --icon 🧘‍♀️ --color purple
    dtk duty toggle 1700000000000 --date 2024-01-15");
    println!("\nICONS:\n    {}", ICONS.join(" "));
}

/// 根据命令行参数构造表单
fn build_draft(name: &str, args: &[String]) -> Result<DutyDraft, String> {
    let mut draft = DutyDraft::named(name);
    if let Some(description) = parse_flag(args, "--description") {
        draft.description = description;
    }
    if let Some(icon) = parse_flag(args, "--icon") {
        draft.icon = icon;
    }
    if let Some(color) = parse_flag(args, "--color") {
        draft.color = color.parse()?;
    }
    if let Some(duration) = parse_flag(args, "--duration") {
        draft.duration = duration
            .parse()
            .map_err(|_| format!("Invalid duration: {}", duration))?;
    }
    draft.validate()?;
    Ok(draft)
}

fn duty_list(config: &Config, data_dir: &Path) -> Result<(), String> {
    let services = open(config, data_dir)?;
    let store = &services.store;
    let today = store.today();

    if store.duties().is_empty() {
        println!("No duties found.");
        return Ok(());
    }

    println!("ID              TODAY  PROGRESS  NAME");
    println!("--------------  -----  --------  ------------------------------");

    for duty in store.duties() {
        let mark = if duty.is_completed(today) { "[x]" } else { "[ ]" };
        println!(
            "{:<14}  {:<5}  {:>8}  {} {}",
            duty.id,
            mark,
            format!("{}/{}", duty.completed_days.len(), duty.duration),
            duty.icon,
            truncate(&duty.name, 40)
        );
    }

    Ok(())
}

fn duty_show(config: &Config, data_dir: &Path, id: i64) -> Result<(), String> {
    let services = open(config, data_dir)?;
    let store = &services.store;
    let duty = store
        .find(id)
        .ok_or_else(|| format!("Duty {} not found", id))?;

    print_duty(duty, store.today());
    Ok(())
}

fn print_duty(duty: &Duty, today: NaiveDate) {
    println!("{} {}", duty.icon, duty.name);
    if !duty.description.is_empty() {
        println!("{}", duty.description);
    }
    println!();
    println!("ID:        {}", duty.id);
    println!("Color:     {}", duty.color);
    println!("Started:   {}", duty.start_date().format("%Y-%m-%d"));
    println!(
        "Progress:  {}/{} ({:.0}%)",
        duty.completed_days.len(),
        duty.duration,
        duty.progress() * 100.0
    );
    println!("Streak:    {} days", duty.current_streak(today));

    if !duty.completed_days.is_empty() {
        println!("\nCompleted days:");
        for day in &duty.completed_days {
            println!("  {}", day.format("%Y-%m-%d"));
        }
    }
}

fn duty_add(config: &Config, data_dir: &Path, draft: DutyDraft) -> Result<(), String> {
    let mut services = open(config, data_dir)?;
    let id = services.store.create(draft).map_err(|e| e.to_string())?;
    println!("Created duty {}", id);
    Ok(())
}

fn duty_toggle(
    config: &Config,
    data_dir: &Path,
    id: i64,
    date: Option<NaiveDate>,
) -> Result<(), String> {
    let mut services = open(config, data_dir)?;
    let date = date.unwrap_or_else(|| services.store.today());

    let completed = services
        .store
        .toggle_day(id, date)
        .ok_or_else(|| format!("Duty {} not found", id))?;

    let state = if completed { "done" } else { "not done" };
    println!("{} marked {}", date.format("%Y-%m-%d"), state);
    Ok(())
}

fn duty_delete(config: &Config, data_dir: &Path, id: i64) -> Result<(), String> {
    let mut services = open(config, data_dir)?;
    if !services.store.delete(id) {
        return Err(format!("Duty {} not found", id));
    }
    println!("Archived duty {}", id);
    Ok(())
}

// ============================================================================
// Archive Commands
// ============================================================================

fn handle_archive_command(
    args: &[String],
    config: &Config,
    data_dir: &Path,
) -> Result<(), String> {
    if args.len() < 2 {
        print_archive_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "list" => archive_list(config, data_dir),
        "restore" => {
            let id = parse_id(args.get(2), "Usage: dtk archive restore <id>")?;
            let mut services = open(config, data_dir)?;
            let new_id = services
                .store
                .re_add(id)
                .ok_or_else(|| format!("Could not restore duty {} (not archived, or the remote insert failed)", id))?;
            println!("Restored duty {}", new_id);
            Ok(())
        }
        "delete" => {
            let id = parse_id(args.get(2), "Usage: dtk archive delete <id>")?;
            let mut services = open(config, data_dir)?;
            if !services.store.delete_archived(id) {
                return Err(format!("Archived duty {} not found", id));
            }
            println!("Permanently deleted duty {}", id);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_archive_usage();
            Ok(())
        }
        cmd => Err(format!(
            "Unknown archive command: {}\nRun 'dtk archive help' for usage",
            cmd
        )),
    }
}

fn print_archive_usage() {
    println!("Archive Commands

USAGE:
    dtk archive <SUBCOMMAND>

SUBCOMMANDS:
    list              List archived duties
    restore <id>      Move an archived duty back to the active list
    delete <id>       Permanently delete an archived duty");
}

fn archive_list(config: &Config, data_dir: &Path) -> Result<(), String> {
    let services = open(config, data_dir)?;
    let archive = services.store.archive();

    if archive.is_empty() {
        println!("Archive is empty.");
        return Ok(());
    }

    println!("ID              PROGRESS  NAME");
    println!("--------------  --------  ------------------------------");
    for duty in archive.items() {
        println!(
            "{:<14}  {:>8}  {} {}",
            duty.id,
            format!("{}/{}", duty.completed_days.len(), duty.duration),
            duty.icon,
            truncate(&duty.name, 40)
        );
    }
    Ok(())
}

// ============================================================================
// Stats
// ============================================================================

fn cli_stats(args: &[String], config: &Config, data_dir: &Path) -> Result<(), String> {
    let days = match parse_flag(args, "--days") {
        Some(s) => s
            .parse::<usize>()
            .ok()
            .filter(|d| (1..=365).contains(d))
            .ok_or_else(|| format!("Invalid --days: {}", s))?,
        None => WINDOW_DAYS,
    };

    let services = open(config, data_dir)?;
    let store = &services.store;
    let today = store.today();
    let daily = stats::daily_completion(store.duties(), today, days);
    let summary = stats::summarize(&daily);

    println!("DATE        DONE  TOTAL   RATE");
    println!("----------  ----  -----  -----");
    for day in &daily {
        let bar = "█".repeat(day.percentage as usize / 10);
        println!(
            "{}  {:>4}  {:>5}  {:>4}%  {}",
            day.date.format("%Y-%m-%d"),
            day.completed,
            day.total,
            day.percentage,
            bar
        );
    }

    println!();
    println!(
        "Perfect days: {}/{}   Average: {}%",
        summary.perfect_days, summary.days, summary.average_percentage
    );

    let per_duty = stats::per_duty(store.duties(), today);
    if !per_duty.is_empty() {
        println!();
        println!("NAME                            PROGRESS  STREAK");
        println!("------------------------------  --------  ------");
        for stat in per_duty {
            println!(
                "{:<30}  {:>7.0}%  {:>6}",
                truncate(&format!("{} {}", stat.icon, stat.name), 30),
                stat.progress * 100.0,
                stat.streak
            );
        }
    }
    Ok(())
}

// ============================================================================
// Account Commands
// ============================================================================

/// 密码优先取 --password，其次从标准输入读取一行
fn read_password(args: &[String]) -> Result<String, String> {
    if let Some(password) = parse_flag(args, "--password") {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush().map_err(|e| e.to_string())?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| e.to_string())?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn cli_login(args: &[String], config: &Config, data_dir: &Path, sign_up: bool) -> Result<(), String> {
    let usage = if sign_up {
        "Usage: dtk signup <email> [--password <password>]"
    } else {
        "Usage: dtk login <email> [--password <password>]"
    };
    let email = args
        .first()
        .filter(|s| !s.starts_with("--"))
        .ok_or_else(|| format!("Missing email\n{}", usage))?;

    let mut services = open(config, data_dir)?;
    let auth = services
        .auth
        .as_ref()
        .ok_or("Remote backend is not configured (run `dtk config remote <url> <anon-key>`)")?;

    let password = read_password(&args[1..])?;
    let session = if sign_up {
        auth.sign_up(email, &password).map_err(|e| e.to_string())?
    } else {
        Some(auth.sign_in(email, &password).map_err(|e| e.to_string())?)
    };

    let Some(session) = session else {
        println!("Signed up. Check your inbox to confirm the address, then run `dtk login`.");
        return Ok(());
    };

    println!("Signed in as {}", session.display_name());
    services.store.set_session(Some(session));

    let mut migration = Migration::new();
    if migration.evaluate(&services.store) == MigrationState::Prompting {
        let count = services.store.local().raw_duties().len();
        println!();
        println!(
            "{} local duties can be moved to your account. Run `dtk migrate --accept` or `dtk migrate --decline`.",
            count
        );
    }
    Ok(())
}

fn cli_logout(config: &Config, data_dir: &Path) -> Result<(), String> {
    let mut services = open(config, data_dir)?;
    let Some(session) = services.store.session().cloned() else {
        println!("Not signed in.");
        return Ok(());
    };

    if let Some(auth) = &services.auth {
        if let Err(e) = auth.sign_out(&session) {
            tracing::warn!(error = %e, "remote sign-out failed");
        }
    }
    services.store.set_session(None);
    println!("Signed out {}", session.display_name());
    Ok(())
}

fn cli_whoami(config: &Config, data_dir: &Path) -> Result<(), String> {
    let services = open(config, data_dir)?;
    match services.store.session() {
        Some(session) => {
            println!("{} ({})", session.display_name(), session.user_id());
            if config.remote.is_none() {
                println!("Remote backend is not configured; using local storage.");
            }
        }
        None => println!("Not signed in (local storage)."),
    }
    Ok(())
}

fn cli_migrate(args: &[String], config: &Config, data_dir: &Path) -> Result<(), String> {
    let mut services = open(config, data_dir)?;
    let mut migration = Migration::new();

    match migration.evaluate(&services.store) {
        MigrationState::Done => {
            println!("Migration already handled.");
            return Ok(());
        }
        MigrationState::Idle | MigrationState::Migrating => {
            println!("Nothing to migrate (sign in first, and keep at least one local duty).");
            return Ok(());
        }
        MigrationState::Prompting => {}
    }

    let accept = args.iter().any(|a| a == "--accept");
    let decline = args.iter().any(|a| a == "--decline");
    match (accept, decline) {
        (true, false) => {
            let count = migration
                .accept(&mut services.store)
                .map_err(|e| e.to_string())?;
            println!("Migrated {} duties.", count);
        }
        (false, true) => {
            migration.decline(&mut services.store);
            println!("Local duties kept; you will not be asked again.");
        }
        _ => {
            let count = services.store.local().raw_duties().len();
            println!(
                "{} local duties are waiting. Usage: dtk migrate --accept | --decline",
                count
            );
        }
    }
    Ok(())
}

// ============================================================================
// Config Commands
// ============================================================================

fn handle_config_command(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        return crate::config::show_config();
    }

    match args[1].as_str() {
        "show" => crate::config::show_config()?,
        "remote" => {
            if args.len() < 4 {
                eprintln!("用法: dtk config remote <url> <anon-key>");
                std::process::exit(1);
            }
            crate::config::set_remote(args[2].clone(), args[3].clone())?;
        }
        "log-level" => {
            if args.len() < 3 {
                eprintln!("用法: dtk config log-level <level>");
                std::process::exit(1);
            }
            crate::config::set_log_level(args[2].clone())?;
        }
        _ => {
            eprintln!("未知的配置选项: {}", args[1]);
            eprintln!("可用选项: show, remote, log-level");
            std::process::exit(1);
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|s| s == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_id(arg: Option<&String>, usage: &str) -> Result<i64, String> {
    let arg = arg.ok_or_else(|| format!("Missing duty id\n{}", usage))?;
    arg.parse()
        .map_err(|_| format!("Invalid duty id: {}\n{}", arg, usage))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// 打印帮助信息
fn print_help() {
    println!("Duty Tracker (dtk) - 终端习惯打卡工具\n");
    println!("用法:");
    println!("  dtk                     启动 TUI 界面");
    println!("  dtk <命令> [参数]         运行 CLI 命令");
    println!("  dtk --help              显示此帮助信息");
    println!("  dtk --version           显示版本信息\n");

    println!("命令:");
    println!("  duty                   duty 管理命令");
    println!("  archive                归档管理命令");
    println!("  stats [--days N]       最近 N 天的完成率（默认 14）");
    println!("  login <邮箱>            登录云端账户");
    println!("  signup <邮箱>           注册云端账户");
    println!("  logout                 退出登录");
    println!("  whoami                 显示当前账户");
    println!("  migrate --accept|--decline  处理本地数据迁移");
    println!("  config [选项]           配置远端服务和日志级别\n");

    println!("详细用法:");
    println!("  dtk duty --help        查看 duty 命令");
    println!("  dtk archive --help     查看归档命令\n");

    println!("存储:");
    println!("  未登录时数据保存在 ~/.duty-tracker/");
    println!("  登录后数据保存在云端 duties 表\n");

    println!("示例:");
    println!("  dtk duty add Meditate --duration 30");
    println!("  dtk duty toggle <id>");
    println!("  dtk config remote https://xyz.supabase.co <anon-key>");
    println!("  DTK_LOG=debug dtk");
}

/// 打印版本信息
fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");
    println!("{} {}", NAME, VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DutyColor;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flag() {
        let a = args(&["--date", "2024-01-15", "--x"]);
        assert_eq!(parse_flag(&a, "--date"), Some("2024-01-15".to_string()));
        assert_eq!(parse_flag(&a, "--x"), None);
        assert_eq!(parse_flag(&a, "--missing"), None);
    }

    #[test]
    fn test_parse_id() {
        let id = "1700000000000".to_string();
        assert_eq!(parse_id(Some(&id), "usage").unwrap(), 1_700_000_000_000);
        assert!(parse_id(None, "usage").is_err());
        assert!(parse_id(Some(&"abc".to_string()), "usage").is_err());
    }

    #[test]
    fn test_build_draft() {
        let draft = build_draft(
            "Meditate",
            &args(&["--color", "Purple", "--duration", "30", "--icon", "🧘‍♀️"]),
        )
        .unwrap();
        assert_eq!(draft.color, DutyColor::Purple);
        assert_eq!(draft.duration, 30);
        assert_eq!(draft.icon, "🧘‍♀️");

        assert!(build_draft("x", &args(&["--duration", "0"])).is_err());
        assert!(build_draft("x", &args(&["--color", "black"])).is_err());
        assert!(build_draft("x", &args(&["--icon", "🦄"])).is_err());
        assert!(build_draft("  ", &[]).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long duty name", 10), "a very ...");
    }
}
