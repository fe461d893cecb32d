use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

mod app;
mod calendar;
mod cli;
mod clock;
mod config;
mod error;
mod input;
mod logging;
mod migration;
mod models;
mod remote;
mod services;
mod stats;
mod storage;
mod store;
mod ui;

use app::App;
use services::Services;

fn main() -> Result<()> {
    let config = config::load_config()?;
    let data_dir = config::get_data_dir();

    // 日志写文件失败不影响使用
    if let Err(e) = logging::init(&data_dir, config.log_level()) {
        eprintln!("日志初始化失败: {}", e);
    }

    // 处理 CLI 命令
    let should_run_tui = cli::handle_cli(&config, &data_dir)?;

    // 如果 CLI 命令已处理，直接退出
    if !should_run_tui {
        return Ok(());
    }

    // 先加载数据，失败时还没有进入备用屏幕
    let services = Services::open(&config, &data_dir)?;
    let mut app = App::new(services);
    tracing::info!(backend = ?app.store.backend(), "starting tui");

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 运行应用
    let res = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "tui exited with error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.clear_expired_notification();
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Windows 上会同时收到按下和松开事件
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !input::handle_key_input(app, key) {
                    return Ok(()); // 退出应用
                }
            }
        }
    }
}
