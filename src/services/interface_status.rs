//! Interface status normalization
//!
//! Turns the raw provider listing into display rows for the status page.
//! Pure transform: no I/O, no errors. Missing or odd upstream data degrades
//! to empty or default rows.

use crate::{
    display::{AddressSource, DisplayReport, DisplayRow, LinkState},
    network_provider::{InterfaceClass, InterfaceRecord, Ipv4Info, Ipv4Method, NetworkListing},
};
use log::{debug, error};

/// Dotted-decimal prefix of the IPv4 link-local range, matched as plain text.
pub const LINK_LOCAL_PREFIX: &str = "169.254";

pub const NOT_SET: &str = "Not set";

pub struct InterfaceStatusService;

impl InterfaceStatusService {
    /// Build the display report covering exactly the wired and wireless classes
    pub fn normalize(listing: &NetworkListing) -> DisplayReport {
        let report: DisplayReport = InterfaceClass::DISPLAYED
            .into_iter()
            .map(|class| (class, Self::class_rows(listing, class)))
            .collect();

        debug!("network entries: {report:?}");
        report
    }

    /// First record of a class, logging when the class holds more than one
    pub fn primary_record(listing: &NetworkListing, class: InterfaceClass) -> Option<&InterfaceRecord> {
        let Some(records) = listing.get(&class) else {
            debug!("interface class {class:?} not in available interfaces");
            return None;
        };

        if records.len() > 1 {
            error!("more than 1 interface of class {class:?}, using first");
        }

        records.first()
    }

    pub fn link_state(record: &InterfaceRecord) -> LinkState {
        if record.online {
            LinkState::Up
        } else if record
            .ipv4
            .as_ref()
            .is_some_and(|ipv4| is_link_local(&ipv4.address))
        {
            // carrier not reported, but a self-assigned address still works
            LinkState::UpLocal
        } else {
            LinkState::Down
        }
    }

    pub fn address_source(ipv4: &Ipv4Info) -> AddressSource {
        match ipv4.method {
            Ipv4Method::Static => AddressSource::Static,
            // the network manager reports dhcp for self-assigned fallbacks as well
            Ipv4Method::Dhcp if is_link_local(&ipv4.address) => {
                debug!("IP {} looks like a link local address", ipv4.address);
                AddressSource::LinkLocal
            }
            Ipv4Method::Dhcp => AddressSource::Dhcp,
        }
    }

    fn class_rows(listing: &NetworkListing, class: InterfaceClass) -> Vec<DisplayRow> {
        let Some(record) = Self::primary_record(listing, class) else {
            return vec![];
        };

        debug!("interface data: {record:?}");

        let mut rows = vec![
            DisplayRow::new("Interface", &record.name),
            DisplayRow::new("MAC Address", &record.mac),
            DisplayRow::new("State", Self::link_state(record)),
        ];

        if let Some(ipv4) = &record.ipv4 {
            rows.extend([
                DisplayRow::new("IPv4 Address", &ipv4.address),
                DisplayRow::new("IPv4 Mask", &ipv4.netmask),
                DisplayRow::new("IPv4 Gateway", ipv4.gateway.as_deref().unwrap_or(NOT_SET)),
                DisplayRow::new("Address Source", Self::address_source(ipv4)),
            ]);
        }

        rows
    }
}

fn is_link_local(address: &str) -> bool {
    address.starts_with(LINK_LOCAL_PREFIX)
}
