use actix_web::{App, body::to_bytes, http::StatusCode, test, web::Data};
use anyhow::{Result, bail};
use ros3d_ui::{
    api::Api,
    network_provider::{
        InterfaceClass, InterfaceRecord, Ipv4Info, Ipv4Method, NetworkListing, NetworkProvider,
    },
    services::{
        config_store::ConfigStore,
        service_reload::{DEFAULT_RELOAD_TIMEOUT, ServiceReloader},
        system_info::SystemInfoService,
    },
};
use tempfile::TempDir;

// Provider returning a fixed listing, or failing when none is set
struct FixedProvider(Option<NetworkListing>);

impl NetworkProvider for FixedProvider {
    async fn list_interfaces(&self) -> Result<NetworkListing> {
        match &self.0 {
            Some(listing) => Ok(listing.clone()),
            None => bail!("failed to run ip: no such file or directory"),
        }
    }
}

fn static_wired() -> NetworkListing {
    NetworkListing::from([(
        InterfaceClass::Wired,
        vec![InterfaceRecord {
            name: "eth0".to_string(),
            mac: "aa:bb:cc:dd:ee:ff".to_string(),
            online: true,
            ipv4: Some(Ipv4Info {
                address: "192.168.1.10".to_string(),
                netmask: "255.255.255.0".to_string(),
                gateway: Some("192.168.1.1".to_string()),
                method: Ipv4Method::Static,
            }),
        }],
    )])
}

async fn get(listing: Option<NetworkListing>, uri: &str) -> (StatusCode, String) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config_path = dir.path().join("ros3d.conf");
    std::fs::write(&config_path, "[common]\nsystem=rig-1\n").expect("failed to write config");

    let api = Api::new(
        FixedProvider(listing),
        ConfigStore::open(config_path),
        SystemInfoService::new(dir.path().join("uptime"), dir.path().join("hostname")),
        ServiceReloader::new(None, DEFAULT_RELOAD_TIMEOUT),
    )
    .expect("should create api");

    let app = test::init_service(
        App::new()
            .app_data(Data::new(api))
            .configure(Api::<FixedProvider>::routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body = to_bytes(resp.into_body()).await.expect("should read body");

    (status, String::from_utf8_lossy(&body).to_string())
}

fn assert_in_order(html: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match html[from..].find(needle) {
            Some(pos) => from += pos + needle.len(),
            None => panic!("{needle:?} not found after offset {from} in:\n{html}"),
        }
    }
}

#[tokio::test]
async fn status_page_renders_wired_rows_in_order() {
    let (status, body) = get(Some(static_wired()), "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_in_order(
        &body,
        &[
            "Wired Network",
            "<th>Interface</th><td>eth0</td>",
            "<th>MAC Address</th><td>aa:bb:cc:dd:ee:ff</td>",
            "<th>State</th><td>Up</td>",
            "<th>IPv4 Address</th><td>192.168.1.10</td>",
            "<th>IPv4 Mask</th><td>255.255.255.0</td>",
            "<th>IPv4 Gateway</th><td>192.168.1.1</td>",
            "<th>Address Source</th><td>Static</td>",
            "Wireless Network",
            "No interface available",
        ],
    );
}

#[tokio::test]
async fn status_page_shows_system_rows() {
    let (status, body) = get(Some(NetworkListing::new()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_in_order(
        &body,
        &[
            "<th>Hostname</th>",
            "<th>Assigned Rig</th><td>rig-1</td>",
            "<th>Uptime</th><td>Unknown</td>",
        ],
    );
}

#[tokio::test]
async fn provider_failure_answers_500() {
    let (status, body) = get(None, "/status").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("failed to run ip"));
}

#[tokio::test]
async fn settings_page_degrades_without_wired_interface() {
    let (status, body) = get(Some(NetworkListing::new()), "/settings").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"name="assigned_rig" value="rig-1""#));
    assert!(body.contains(r#"name="eth_ipv4_address" value="""#));
    assert!(body.contains(r#"<option value="DHCP" selected>"#));
}
