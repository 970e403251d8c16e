//! Command dispatch: bridges CLI args -> core stores -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod courses;
pub mod save;

use coursedeck_config::Config;
use coursedeck_core::AppContext;
use futures_util::StreamExt;
use tracing::debug;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Load the config file and layer the global flag overrides on top.
pub fn resolve_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = coursedeck_config::load_config()?;
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(cfg)
}

/// Dispatch a backend-bound command to the appropriate handler.
///
/// Notifications reported while the command runs are printed to stderr
/// once it finishes, whatever its outcome.
pub async fn dispatch(cmd: Command, ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let mut notices = ctx.messages.observe();

    let mut busy = ctx.busy.stream();
    let busy_log = tokio::spawn(async move {
        while let Some(busy) = busy.next().await {
            debug!(busy, "busy state");
        }
    });

    let result = match cmd {
        Command::Courses(args) => courses::handle(ctx, args, global).await,
        Command::Save(args) => save::handle(ctx, args, global).await,
        Command::Login(args) => auth::login(ctx, args, global).await,
        Command::Logout => auth::logout(ctx, global),
        Command::Whoami => auth::whoami(ctx, global),
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    };

    busy_log.abort();

    let color = output::should_color(&global.color);
    while let Some(batch) = notices.try_recv() {
        output::print_notice(&batch.to_string(), color);
    }

    result
}
