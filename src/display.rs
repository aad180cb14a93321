//! Display rows handed to the page templates.

use crate::network_provider::InterfaceClass;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Interface class -> ordered rows. Built per request, never cached.
pub type DisplayReport = BTreeMap<InterfaceClass, Vec<DisplayRow>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Input,
    Dropdown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputField {
    pub kind: InputKind,
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// A single `label -> value` line. Row order within a sequence is the on-screen order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<InputField>,
}

impl DisplayRow {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
            input: None,
        }
    }

    pub fn input(label: impl Into<String>, value: impl ToString, id: impl Into<String>) -> Self {
        Self {
            input: Some(InputField {
                kind: InputKind::Input,
                id: id.into(),
                options: vec![],
            }),
            ..Self::new(label, value)
        }
    }

    pub fn dropdown<I, S>(label: impl Into<String>, value: impl ToString, id: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: Some(InputField {
                kind: InputKind::Dropdown,
                id: id.into(),
                options: options.into_iter().map(Into::into).collect(),
            }),
            ..Self::new(label, value)
        }
    }
}

/// Interface state as shown to the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Up,
    /// Carrier not reported but a link-local address is configured.
    UpLocal,
    Down,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Up => write!(f, "Up"),
            LinkState::UpLocal => write!(f, "Up/Local"),
            LinkState::Down => write!(f, "Down"),
        }
    }
}

/// How an interface obtained its IPv4 address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressSource {
    Dhcp,
    Static,
    LinkLocal,
}

impl fmt::Display for AddressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSource::Dhcp => write!(f, "DHCP"),
            AddressSource::Static => write!(f, "Static"),
            AddressSource::LinkLocal => write!(f, "Link Local"),
        }
    }
}
