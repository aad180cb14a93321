use crate::display::{DisplayReport, DisplayRow};
use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("status.html", include_str!("../templates/status.html")),
    ("settings.html", include_str!("../templates/settings.html")),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Status,
    Settings,
}

impl Page {
    fn template(self) -> &'static str {
        match self {
            Page::Status => "status.html",
            Page::Settings => "settings.html",
        }
    }
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    system_entries: &'a [DisplayRow],
    network_entries: &'a DisplayReport,
    system_active: bool,
    configuration_active: bool,
}

/// Page templates compiled into the binary
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .context("failed to parse page templates")?;

        Ok(Self { tera })
    }

    pub fn render(
        &self,
        page: Page,
        system_entries: &[DisplayRow],
        network_entries: &DisplayReport,
    ) -> Result<String> {
        let context = tera::Context::from_serialize(PageContext {
            system_entries,
            network_entries,
            system_active: page == Page::Status,
            configuration_active: page == Page::Settings,
        })
        .context("failed to build template context")?;

        self.tera
            .render(page.template(), &context)
            .context(format!("failed to render {}", page.template()))
    }
}
