use std::{sync::mpsc, time::Duration};

use anyhow::Result;

use crate::{
    cli::{Cli, Command},
    domain::{self, session::SessionConfig},
    infra::{
        self,
        config::{FileConfigAdapter, ServerConfig},
        error::AppError,
    },
    server::{
        self,
        http_api::HttpServerApi,
        push_transport::{SsePushTransport, TokioReconnectTimer},
    },
    ui::{self, TerminalEventSource},
    usecases::{self, bootstrap, shell::ChatOrchestrator},
};

const NETWORK_THREAD_NAME: &str = "roomchat-net";
const PUSH_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn run(cli: Cli) -> Result<()> {
    match cli.command_or_default() {
        Command::Run => {
            let adapter = FileConfigAdapter::new(cli.config.as_deref(), cli.overrides());
            let (context, _log_guard) = bootstrap::bootstrap(&adapter)?;

            tracing::debug!(
                ui = ui::module_name(),
                domain = domain::module_name(),
                server = server::module_name(),
                usecases = usecases::module_name(),
                infra = infra::module_name(),
                "module boundaries loaded"
            );

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name(NETWORK_THREAD_NAME)
                .build()
                .map_err(AppError::Runtime)?;
            let clients = HttpClients::build(&context.config.server)?;
            let (events_tx, events_rx) = mpsc::channel();

            let server_config = &context.config.server;
            let session = &context.config.session;
            let mut orchestrator = ChatOrchestrator::new(
                &session.initial_room,
                &server_config.events_uri(),
                SessionConfig::new(&session.username),
                HttpServerApi::new(
                    runtime.handle().clone(),
                    clients.api,
                    server_config.clone(),
                    events_tx.clone(),
                ),
                SsePushTransport::new(runtime.handle().clone(), clients.push, events_tx.clone()),
                TokioReconnectTimer::new(runtime.handle().clone(), events_tx),
            );
            orchestrator.start();

            let mut event_source = TerminalEventSource::new(events_rx);
            let outcome = ui::shell::start(&context, &mut event_source, &mut orchestrator);

            drop(orchestrator);
            // In-flight requests are abandoned on exit.
            runtime.shutdown_background();
            outcome?;
        }
    }

    Ok(())
}

/// The push stream stays open indefinitely, so only its connect phase is
/// bounded; plain requests get the configured total timeout.
struct HttpClients {
    api: reqwest::Client,
    push: reqwest::Client,
}

impl HttpClients {
    fn build(server: &ServerConfig) -> Result<Self, AppError> {
        let api = reqwest::Client::builder()
            .timeout(Duration::from_millis(server.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;
        let push = reqwest::Client::builder()
            .connect_timeout(PUSH_CONNECT_TIMEOUT)
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self { api, push })
    }
}
