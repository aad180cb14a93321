#![cfg_attr(feature = "mock", allow(dead_code, unused_imports))]

use anyhow::{Context, Result, ensure};
use log::debug;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, net::Ipv4Addr, path::PathBuf};
use tokio::process::Command;
use trait_variant::make;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceClass {
    Wired,
    Wireless,
    Loopback,
    Other,
}

impl InterfaceClass {
    /// Classes surfaced on the status pages, in display order.
    pub const DISPLAYED: [InterfaceClass; 2] = [InterfaceClass::Wired, InterfaceClass::Wireless];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ipv4Method {
    Dhcp,
    Static,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Info {
    pub address: String,
    pub netmask: String,
    pub gateway: Option<String>,
    pub method: Ipv4Method,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub mac: String,
    pub online: bool,
    pub ipv4: Option<Ipv4Info>,
}

/// Raw interface listing as reported by the OS, grouped by class.
pub type NetworkListing = BTreeMap<InterfaceClass, Vec<InterfaceRecord>>;

#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait NetworkProvider {
    async fn list_interfaces(&self) -> Result<NetworkListing>;
}

#[derive(Deserialize, Debug)]
struct IpLink {
    ifname: String,
    #[serde(default)]
    operstate: String,
    #[serde(default)]
    link_type: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    addr_info: Vec<IpAddrInfo>,
}

#[derive(Deserialize, Debug)]
struct IpAddrInfo {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    local: Option<String>,
    #[serde(default)]
    prefixlen: Option<u8>,
    /// Set by iproute2 for addresses with a finite lifetime, i.e. leased ones.
    #[serde(default)]
    dynamic: bool,
}

#[derive(Deserialize, Debug)]
struct IpRoute {
    #[serde(default)]
    gateway: Option<String>,
    #[serde(default)]
    dev: Option<String>,
}

/// Queries the kernel through iproute2's JSON output and sysfs.
#[derive(Clone, Debug)]
pub struct IprouteNetworkProvider {
    ip_binary: PathBuf,
    sysfs_net: PathBuf,
}

impl IprouteNetworkProvider {
    pub fn new(ip_binary: impl Into<PathBuf>, sysfs_net: impl Into<PathBuf>) -> Self {
        Self {
            ip_binary: ip_binary.into(),
            sysfs_net: sysfs_net.into(),
        }
    }

    async fn ip_json(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.ip_binary)
            .args(args)
            .output()
            .await
            .context(format!("failed to run {:?}", self.ip_binary))?;

        ensure!(
            output.status.success(),
            "{:?} {} failed with {}: {}",
            self.ip_binary,
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );

        String::from_utf8(output.stdout).context("failed to decode ip output")
    }

    fn classify(&self, name: &str, link_type: &str) -> InterfaceClass {
        match link_type {
            "loopback" => InterfaceClass::Loopback,
            "ether" => {
                let iface = self.sysfs_net.join(name);
                if iface.join("wireless").exists() || iface.join("phy80211").exists() {
                    InterfaceClass::Wireless
                } else if iface.join("device").exists() {
                    InterfaceClass::Wired
                } else {
                    // bridges, veth pairs and other software links
                    InterfaceClass::Other
                }
            }
            _ => InterfaceClass::Other,
        }
    }
}

impl NetworkProvider for IprouteNetworkProvider {
    async fn list_interfaces(&self) -> Result<NetworkListing> {
        let links = self.ip_json(&["-j", "addr", "show"]).await?;
        let routes = self.ip_json(&["-j", "-4", "route", "show", "default"]).await?;

        parse_listing(&links, &routes, |name, link_type| {
            self.classify(name, link_type)
        })
    }
}

fn prefix_to_netmask(prefixlen: u8) -> Ipv4Addr {
    let host_bits = 32u32.saturating_sub(u32::from(prefixlen));
    Ipv4Addr::from(u32::MAX.checked_shl(host_bits).unwrap_or(0))
}

/// Build a listing from `ip -j addr show` and `ip -j -4 route show default` output.
pub fn parse_listing<F>(links_json: &str, routes_json: &str, classify: F) -> Result<NetworkListing>
where
    F: Fn(&str, &str) -> InterfaceClass,
{
    let links: Vec<IpLink> =
        serde_json::from_str(links_json).context("failed to parse interface listing")?;

    // older iproute2 prints nothing at all for an empty route table
    let routes: Vec<IpRoute> = if routes_json.trim().is_empty() {
        vec![]
    } else {
        serde_json::from_str(routes_json).context("failed to parse route listing")?
    };

    let mut listing = NetworkListing::new();

    for link in links {
        let class = classify(&link.ifname, &link.link_type);

        let gateway = routes
            .iter()
            .find(|route| route.dev.as_deref() == Some(link.ifname.as_str()))
            .and_then(|route| route.gateway.clone());

        let ipv4 = link
            .addr_info
            .iter()
            .find(|info| info.family.as_deref() == Some("inet"))
            .and_then(|info| {
                Some(Ipv4Info {
                    address: info.local.clone()?,
                    netmask: prefix_to_netmask(info.prefixlen.unwrap_or(32)).to_string(),
                    gateway,
                    method: if info.dynamic {
                        Ipv4Method::Dhcp
                    } else {
                        Ipv4Method::Static
                    },
                })
            });

        let record = InterfaceRecord {
            name: link.ifname,
            mac: link.address.unwrap_or_default(),
            online: link.operstate == "UP",
            ipv4,
        };

        debug!("{class:?} interface: {record:?}");
        listing.entry(class).or_default().push(record);
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKS: &str = r#"[
        {"ifindex":1,"ifname":"lo","flags":["LOOPBACK","UP","LOWER_UP"],"operstate":"UNKNOWN",
         "link_type":"loopback","address":"00:00:00:00:00:00",
         "addr_info":[{"family":"inet","local":"127.0.0.1","prefixlen":8,"scope":"host"}]},
        {"ifindex":2,"ifname":"eth0","flags":["BROADCAST","MULTICAST","UP","LOWER_UP"],"operstate":"UP",
         "link_type":"ether","address":"aa:bb:cc:dd:ee:ff",
         "addr_info":[{"family":"inet","local":"192.168.1.10","prefixlen":24,"dynamic":true},
                      {"family":"inet6","local":"fe80::1","prefixlen":64}]},
        {"ifindex":3,"ifname":"wlan0","flags":["BROADCAST","MULTICAST"],"operstate":"DOWN",
         "link_type":"ether","address":"11:22:33:44:55:66","addr_info":[]},
        {"ifindex":4,"ifname":"eth1","operstate":"DOWN","link_type":"ether","address":"aa:aa:aa:aa:aa:aa",
         "addr_info":[{"family":"inet","local":"169.254.7.7","prefixlen":16}]}
    ]"#;

    const ROUTES: &str = r#"[{"dst":"default","gateway":"192.168.1.1","dev":"eth0","protocol":"dhcp"}]"#;

    fn classify(name: &str, link_type: &str) -> InterfaceClass {
        match (name, link_type) {
            (_, "loopback") => InterfaceClass::Loopback,
            ("wlan0", _) => InterfaceClass::Wireless,
            _ => InterfaceClass::Wired,
        }
    }

    mod parse_listing {
        use super::*;

        #[test]
        fn groups_links_by_class_in_kernel_order() {
            let listing = parse_listing(LINKS, ROUTES, classify).unwrap();

            let wired: Vec<_> = listing[&InterfaceClass::Wired]
                .iter()
                .map(|r| r.name.as_str())
                .collect();
            assert_eq!(wired, ["eth0", "eth1"]);
            assert_eq!(listing[&InterfaceClass::Wireless][0].name, "wlan0");
            assert_eq!(listing[&InterfaceClass::Loopback][0].name, "lo");
        }

        #[test]
        fn dynamic_address_with_default_route() {
            let listing = parse_listing(LINKS, ROUTES, classify).unwrap();
            let eth0 = &listing[&InterfaceClass::Wired][0];

            assert!(eth0.online);
            assert_eq!(eth0.mac, "aa:bb:cc:dd:ee:ff");
            assert_eq!(
                eth0.ipv4,
                Some(Ipv4Info {
                    address: "192.168.1.10".to_string(),
                    netmask: "255.255.255.0".to_string(),
                    gateway: Some("192.168.1.1".to_string()),
                    method: Ipv4Method::Dhcp,
                })
            );
        }

        #[test]
        fn permanent_address_is_static_without_gateway() {
            let listing = parse_listing(LINKS, ROUTES, classify).unwrap();
            let eth1 = &listing[&InterfaceClass::Wired][1];

            assert!(!eth1.online);
            let ipv4 = eth1.ipv4.as_ref().unwrap();
            assert_eq!(ipv4.method, Ipv4Method::Static);
            assert_eq!(ipv4.netmask, "255.255.0.0");
            assert_eq!(ipv4.gateway, None);
        }

        #[test]
        fn link_without_addresses_has_no_ipv4() {
            let listing = parse_listing(LINKS, ROUTES, classify).unwrap();
            assert_eq!(listing[&InterfaceClass::Wireless][0].ipv4, None);
        }

        #[test]
        fn empty_route_output_is_accepted() {
            let listing = parse_listing(LINKS, "\n", classify).unwrap();
            let eth0 = &listing[&InterfaceClass::Wired][0];
            assert_eq!(eth0.ipv4.as_ref().unwrap().gateway, None);
        }

        #[test]
        fn malformed_output_is_an_error() {
            let result = parse_listing("not json", ROUTES, classify);
            assert!(
                result
                    .unwrap_err()
                    .to_string()
                    .contains("failed to parse interface listing")
            );
        }
    }

    mod netmask {
        use super::*;

        #[test]
        fn converts_prefix_lengths() {
            assert_eq!(prefix_to_netmask(0), Ipv4Addr::new(0, 0, 0, 0));
            assert_eq!(prefix_to_netmask(8), Ipv4Addr::new(255, 0, 0, 0));
            assert_eq!(prefix_to_netmask(20), Ipv4Addr::new(255, 255, 240, 0));
            assert_eq!(prefix_to_netmask(32), Ipv4Addr::new(255, 255, 255, 255));
        }
    }

    mod classify {
        use super::*;
        use tempfile::TempDir;

        fn sysfs_with(entries: &[&str]) -> TempDir {
            let dir = TempDir::new().expect("failed to create temp dir");
            for entry in entries {
                std::fs::create_dir_all(dir.path().join(entry)).expect("failed to create entry");
            }
            dir
        }

        #[test]
        fn uses_sysfs_to_tell_wired_from_wireless() {
            let sysfs = sysfs_with(&["eth0/device", "wlan0/device", "wlan0/wireless", "br0"]);
            let provider = IprouteNetworkProvider::new("ip", sysfs.path());

            assert_eq!(provider.classify("eth0", "ether"), InterfaceClass::Wired);
            assert_eq!(provider.classify("wlan0", "ether"), InterfaceClass::Wireless);
            assert_eq!(provider.classify("br0", "ether"), InterfaceClass::Other);
            assert_eq!(provider.classify("lo", "loopback"), InterfaceClass::Loopback);
            assert_eq!(provider.classify("can0", "can"), InterfaceClass::Other);
        }
    }

    #[tokio::test]
    async fn missing_ip_binary_is_an_error() {
        let provider = IprouteNetworkProvider::new("/nonexistent/ip", "/sys/class/net");
        let result = provider.list_interfaces().await;

        assert!(result.unwrap_err().to_string().contains("failed to run"));
    }
}
