//! "open {app}" handling

use std::process::{Command, Stdio};
use std::sync::Arc;

use url::Url;

use crate::{Error, Result};

/// Reply when no known application is named
pub const APP_NOT_FOUND: &str =
    "I couldn't find the application you mentioned. Please try again with a supported application.";

/// Built-in applications, in lookup order
pub const DEFAULT_APPS: [(&str, &str); 9] = [
    ("chrome", "https://www.google.com"),
    ("youtube", "https://www.youtube.com"),
    ("gmail", "https://mail.google.com"),
    ("maps", "https://maps.google.com"),
    ("calendar", "https://calendar.google.com"),
    ("drive", "https://drive.google.com"),
    ("spotify", "https://open.spotify.com"),
    ("netflix", "https://www.netflix.com"),
    ("amazon", "https://www.amazon.com"),
];

/// Opens a URL in a new browsing context
pub trait UrlOpener: Send + Sync {
    /// Launch `url`; the caller does not wait for the browser
    ///
    /// # Errors
    ///
    /// Returns error if the launcher cannot be started
    fn open(&self, url: &Url) -> Result<()>;
}

/// Hands URLs to the platform's default opener
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUrlOpener;

impl UrlOpener for SystemUrlOpener {
    fn open(&self, url: &Url) -> Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(url.as_str());
            c
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", url.as_str()]);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(url.as_str());
            c
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::OpenUrl(format!("{url}: {e}")))?;

        Ok(())
    }
}

/// A named application and where it lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub url: Url,
}

/// Maps application names in a command to URLs
pub struct OpenAppHandler {
    apps: Vec<AppEntry>,
    opener: Arc<dyn UrlOpener>,
}

impl OpenAppHandler {
    /// Handler over the built-in applications
    #[must_use]
    pub fn new(opener: Arc<dyn UrlOpener>) -> Self {
        let apps = DEFAULT_APPS
            .iter()
            .filter_map(|(name, url)| {
                Url::parse(url).ok().map(|url| AppEntry {
                    name: (*name).to_string(),
                    url,
                })
            })
            .collect();

        Self { apps, opener }
    }

    /// Add applications after the built-ins
    ///
    /// A name that is already known keeps its position but takes the new URL.
    ///
    /// # Errors
    ///
    /// Returns error if a URL does not parse
    pub fn with_extra_apps<I, N, U>(mut self, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, U)>,
        N: AsRef<str>,
        U: AsRef<str>,
    {
        for (name, url) in extra {
            let name = name.as_ref().trim().to_lowercase();
            let url = Url::parse(url.as_ref())
                .map_err(|e| Error::Config(format!("app '{name}' has invalid url: {e}")))?;

            match self.apps.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.url = url,
                None => self.apps.push(AppEntry { name, url }),
            }
        }
        Ok(self)
    }

    /// Known applications, in lookup order
    #[must_use]
    pub fn apps(&self) -> &[AppEntry] {
        &self.apps
    }

    /// Open the first listed application named in `command`
    #[must_use]
    pub fn handle(&self, command: &str) -> String {
        let Some(app) = self.apps.iter().find(|a| command.contains(a.name.as_str())) else {
            tracing::debug!(command, "no known application in command");
            return APP_NOT_FOUND.to_string();
        };

        tracing::info!(app = %app.name, url = %app.url, "opening application");
        if let Err(e) = self.opener.open(&app.url) {
            tracing::warn!(app = %app.name, error = %e, "failed to launch url");
        }

        format!("Opening {}", app.name)
    }
}
