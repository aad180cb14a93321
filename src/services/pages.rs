//! Row assembly for the status and settings pages

use crate::{
    display::{DisplayReport, DisplayRow},
    network_provider::{InterfaceClass, Ipv4Method, NetworkListing},
    services::interface_status::{InterfaceStatusService, NOT_SET},
};
use anyhow::Result;
use log::{debug, error};

pub const METHOD_OPTIONS: [&str; 2] = ["DHCP", "Static"];

pub struct PageService;

impl PageService {
    /// System rows of the status page: hostname, assigned rig, uptime
    pub fn status_system_entries(
        hostname: Option<String>,
        assigned_rig: &str,
        uptime: Result<String>,
    ) -> Vec<DisplayRow> {
        let uptime = uptime.unwrap_or_else(|e| {
            error!("failed to get uptime: {e:#}");
            "Unknown".to_string()
        });

        let assigned_rig = if assigned_rig.is_empty() {
            "None"
        } else {
            assigned_rig
        };

        vec![
            DisplayRow::new("Hostname", hostname.as_deref().unwrap_or(NOT_SET)),
            DisplayRow::new("Assigned Rig", assigned_rig),
            DisplayRow::new("Uptime", uptime),
        ]
    }

    pub fn settings_system_entries(assigned_rig: &str) -> Vec<DisplayRow> {
        vec![DisplayRow::input("Assigned Rig", assigned_rig, "assigned_rig")]
    }

    /// Editable IPv4 rows for the first wired interface
    pub fn settings_network_entries(listing: &NetworkListing) -> DisplayReport {
        let ipv4 = InterfaceStatusService::primary_record(listing, InterfaceClass::Wired)
            .and_then(|record| {
                debug!("first wired interface: {record:?}");
                record.ipv4.as_ref()
            });

        let (address, netmask, gateway, method) = match ipv4 {
            Some(ipv4) => (
                ipv4.address.as_str(),
                ipv4.netmask.as_str(),
                ipv4.gateway.as_deref().unwrap_or_default(),
                ipv4.method,
            ),
            None => ("", "", "", Ipv4Method::Dhcp),
        };

        let method = match method {
            Ipv4Method::Dhcp => METHOD_OPTIONS[0],
            Ipv4Method::Static => METHOD_OPTIONS[1],
        };

        DisplayReport::from([(
            InterfaceClass::Wired,
            vec![
                DisplayRow::input("IPv4 Address", address, "eth_ipv4_address"),
                DisplayRow::input("IPv4 Mask", netmask, "eth_ipv4_netmask"),
                DisplayRow::input("IPv4 Gateway", gateway, "eth_ipv4_gateway"),
                DisplayRow::dropdown("IPv4 Method", method, "eth_ipv4_method", METHOD_OPTIONS),
            ],
        )])
    }
}
