use crate::{
    http_response::{Html, handle_service_result},
    network_provider::NetworkProvider,
    services::{
        config_store::ConfigStore, interface_status::InterfaceStatusService, pages::PageService,
        service_reload::ServiceReloader, system_info::SystemInfoService,
    },
    templates::{Page, Templates},
};
use actix_web::{HttpResponse, Responder, web};
use anyhow::Result;
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct Api<Provider>
where
    Provider: NetworkProvider,
{
    pub network_provider: Provider,
    /// Serializes load/set/write of the shared settings
    pub config_store: Arc<Mutex<ConfigStore>>,
    pub system_info: SystemInfoService,
    /// Restarts platform services after settings changes
    pub service_reloader: Arc<ServiceReloader>,
    pub templates: Arc<Templates>,
}

impl<Provider> Api<Provider>
where
    Provider: NetworkProvider + 'static,
{
    pub fn new(
        network_provider: Provider,
        config_store: ConfigStore,
        system_info: SystemInfoService,
        service_reloader: ServiceReloader,
    ) -> Result<Self> {
        Ok(Api {
            network_provider,
            config_store: Arc::new(Mutex::new(config_store)),
            system_info,
            service_reloader: Arc::new(service_reloader),
            templates: Arc::new(Templates::new()?),
        })
    }

    /// Register the UI routes; `Api<Provider>` must be available as app data
    pub fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/", web::get().to(Self::status))
            .route("/status", web::get().to(Self::status))
            .route("/settings", web::get().to(Self::settings))
            .route("/settings", web::post().to(Self::save_settings))
            .route("/version", web::get().to(Self::version));
    }

    pub async fn status(api: web::Data<Self>) -> impl Responder {
        debug!("status() called");
        handle_service_result(api.status_page().await, "status")
    }

    pub async fn settings(api: web::Data<Self>) -> impl Responder {
        debug!("settings() called");
        handle_service_result(api.settings_page().await, "settings")
    }

    /// Submitted settings are logged only, nothing is persisted yet
    pub async fn save_settings(body: String) -> impl Responder {
        debug!("save_settings() called");
        debug!("body: {body}");
        HttpResponse::Ok().finish()
    }

    pub async fn version() -> impl Responder {
        HttpResponse::Ok().body(env!("CARGO_PKG_VERSION"))
    }

    async fn status_page(&self) -> Result<Html> {
        let listing = self.network_provider.list_interfaces().await?;
        let network_entries = InterfaceStatusService::normalize(&listing);

        let system_entries = PageService::status_system_entries(
            self.system_info.hostname().await,
            &self.assigned_rig().await,
            self.system_info.uptime().await,
        );

        self.templates
            .render(Page::Status, &system_entries, &network_entries)
            .map(Html)
    }

    async fn settings_page(&self) -> Result<Html> {
        let listing = self.network_provider.list_interfaces().await?;
        let network_entries = PageService::settings_network_entries(&listing);
        let system_entries = PageService::settings_system_entries(&self.assigned_rig().await);

        self.templates
            .render(Page::Settings, &system_entries, &network_entries)
            .map(Html)
    }

    async fn assigned_rig(&self) -> String {
        let mut store = self.config_store.lock().await;

        // another process may have edited the file since the last request
        if let Err(e) = store.reload().await {
            debug!("using cached configuration: {e:#}");
        }

        store.system()
    }
}
