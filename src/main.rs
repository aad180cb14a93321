use actix_files::Files;
use actix_server::ServerHandle;
use actix_web::{App, HttpServer, web::Data};
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{debug, error, info, warn};
use ros3d_ui::{
    api::Api,
    config::AppConfig,
    network_provider::IprouteNetworkProvider,
    services::{
        config_store::ConfigStore,
        service_reload::ServiceReloader,
        system_info::{DEFAULT_HOSTNAME_PATH, SystemInfoService},
    },
};
use std::io::Write;
use tokio::signal::unix::{SignalKind, signal};

type UiApi = Api<IprouteNetworkProvider>;

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize();

    let config = AppConfig::load().context("failed to load configuration")?;
    debug!("configuration: {config:?}");

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    let (server_handle, server_task) = run_server(&config)?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            debug!("ctrl-c received");
        },
        _ = sigterm.recv() => {
            debug!("SIGTERM received");
        },
        result = server_task => {
            match result {
                Ok(Ok(())) => debug!("server stopped normally"),
                Ok(Err(e)) => error!("server stopped with error: {e}"),
                Err(e) => error!("server task panicked: {e}"),
            }
        },
    }

    info!("shutting down");
    server_handle.stop(true).await;
    info!("shutdown complete");

    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));
}

fn run_server(
    config: &AppConfig,
) -> Result<(
    ServerHandle,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
)> {
    let api = UiApi::new(
        IprouteNetworkProvider::new(&config.host.ip_binary, &config.host.sysfs_net),
        ConfigStore::open(&config.ros3d.config_path),
        SystemInfoService::new(&config.host.uptime_path, DEFAULT_HOSTNAME_PATH),
        ServiceReloader::from_config(&config.ros3d),
    )
    .context("failed to create api")?;

    let static_dir = config.ui.document_root.join("static");
    if !static_dir.is_dir() {
        warn!("static dir {static_dir:?} not found, /static is not served");
    }

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(Data::new(api.clone()))
            .configure(UiApi::routes);

        if static_dir.is_dir() {
            app.service(Files::new("/static", &static_dir))
        } else {
            app
        }
    })
    .bind((config.ui.bind_address.as_str(), config.ui.port))
    .context(format!(
        "failed to bind {}:{}",
        config.ui.bind_address, config.ui.port
    ))?
    .disable_signals()
    .run();

    info!(
        "listening on {}:{}",
        config.ui.bind_address, config.ui.port
    );

    Ok((server.handle(), tokio::spawn(server)))
}
