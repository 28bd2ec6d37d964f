//! `dispatch-core` server binary.
//!
//! Registers the given module directories, installs a `pages` controller
//! that renders `views/pages/<action>.html`, and serves over HTTP until
//! Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use dispatch_core::config::validation::{into_error, validate_server};
use dispatch_core::config::ServerConfig;
use dispatch_core::http::HttpServer;
use dispatch_core::observability::init_logging;
use dispatch_core::{ActionContext, Actions, Controller, Error, ErrorKind, Framework, View};

#[derive(Parser, Debug)]
#[command(name = "dispatch-core", version, about = "Serve framework modules over HTTP")]
struct Cli {
    /// Module directory; repeat for more, earlier ones take precedence.
    #[arg(short, long = "module", value_name = "DIR")]
    modules: Vec<PathBuf>,

    /// Bind address, overriding server.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level for this crate (RUST_LOG takes precedence).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

/// Renders `/pages/<action>`; a missing view is a 404.
#[derive(Default)]
struct PagesController;

impl Controller for PagesController {
    fn actions() -> Actions<Self> {
        Actions::new()
    }

    fn invoke_action(
        &mut self,
        cx: &mut ActionContext<'_>,
        action: &str,
        _params: &[String],
    ) -> dispatch_core::Result<()> {
        let mut view = View::new(format!("/pages/{}", action).as_str())?;
        match view.render(cx.framework()) {
            Ok(output) => {
                cx.write(&output);
                Ok(())
            }
            Err(err) if err.is(ErrorKind::NotFound) => {
                Err(Error::page_not_found(format!("No page named '{}'", action)).caused_by(err))
            }
            Err(err) => Err(err),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dispatch-core starting");

    let mut builder = Framework::builder().controller::<PagesController>("controller/pages");
    for module in &cli.modules {
        builder = builder.module(module);
    }
    let framework = Arc::new(builder.build()?);

    let mut server_config = ServerConfig::from_config(&framework.config())?;
    if let Some(bind) = cli.bind {
        server_config.bind_address = bind;
    }
    validate_server(&server_config).map_err(into_error)?;

    tracing::info!(
        bind_address = %server_config.bind_address,
        request_timeout_secs = server_config.request_timeout_secs,
        mode = %framework.mode(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&server_config.bind_address).await?;
    let server = HttpServer::new(framework, server_config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
