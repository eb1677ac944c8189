use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    infra::{self, contracts::ConfigAdapter, error::AppError},
    usecases::context::AppContext,
};

const BOOTSTRAP_CONFIG_LOADED: &str = "BOOTSTRAP_CONFIG_LOADED";

/// Loads config and installs logging. The returned guard flushes the log
/// writer when dropped.
pub fn bootstrap(config_adapter: &dyn ConfigAdapter) -> Result<(AppContext, WorkerGuard), AppError> {
    let context = build_context(config_adapter)?;
    let guard = infra::logging::init(&context.config.logging)?;

    tracing::info!(
        code = BOOTSTRAP_CONFIG_LOADED,
        server = %context.config.server.base_url,
        username = %context.config.session.username,
        "configuration loaded"
    );

    Ok((context, guard))
}

fn build_context(config_adapter: &dyn ConfigAdapter) -> Result<AppContext, AppError> {
    let config = config_adapter.load().map_err(AppError::Other)?;

    Ok(AppContext::new(config))
}
