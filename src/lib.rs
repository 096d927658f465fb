mod commands;
pub mod core;
mod interrupt;
mod ui;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Launcher;
use crate::core::auth::MicrosoftDeviceAuth;
use crate::core::error::LauncherResult;
use crate::core::installer::LocalInstaller;
use crate::core::launch::LaunchOrchestrator;
use crate::core::state::preferences::DEFAULT_THEME;
use crate::core::state::{AppState, LauncherPaths};
use crate::interrupt::Interrupts;
use crate::ui::Ui;

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,blocklaunch_lib=info")),
        )
        .without_time()
        .with_target(false)
        .init();

    info!("Blocklaunch {} starting...", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Cannot start the async runtime: {}", err);
            return;
        }
    };

    let interrupts = Interrupts::new();
    runtime.spawn(interrupts.forward_ctrl_c());

    match runtime.block_on(start(interrupts)) {
        Ok(()) => {}
        Err(err) if err.is_interrupt() => warn!("Interrupted"),
        Err(err) => error!("Critical error: {}", err),
    }

    let ui = Ui::new(DEFAULT_THEME);
    ui.footer();
    let _ = ui.pause("Press Enter to close...");
}

async fn start(interrupts: Interrupts) -> LauncherResult<()> {
    let paths = LauncherPaths::resolve()?;
    let state = AppState::new(paths);
    let orchestrator = LaunchOrchestrator::new(
        Box::new(LocalInstaller::new()),
        state.paths.game_dir().to_path_buf(),
    );
    let gateway = MicrosoftDeviceAuth::new()?;

    let mut launcher = Launcher::new(state, orchestrator, gateway, interrupts);
    launcher.run().await
}
