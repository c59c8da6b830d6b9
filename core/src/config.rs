//! Client configuration: application identity and default headers.
//!
//! # Design
//! `ClientConfig` is owned by a `RequestClient` rather than living in global
//! storage. The client reads it once per request build and copies what it
//! needs, so a header change made while a request is in flight only affects
//! requests built afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::InvalidHeader;

/// Form factor reported in the User-Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Phone,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn token(self) -> &'static str {
        match self {
            DeviceClass::Phone => "Phone",
            DeviceClass::Tablet => "Tablet",
            DeviceClass::Desktop => "Desktop",
        }
    }
}

/// The application the client is acting for. Only used to compose the
/// User-Agent header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: String,
    pub version: String,
    pub build: String,
    pub platform: String,
    pub device: DeviceClass,
}

impl AppIdentity {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        build: impl Into<String>,
        platform: impl Into<String>,
        device: DeviceClass,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            build: build.into(),
            platform: platform.into(),
            device,
        }
    }

    /// Identity named after the running executable, on the current OS.
    ///
    /// The executable's last extension is dropped (`tool.exe` becomes
    /// `tool`). Falls back to `"unknown"` if the path cannot be determined.
    pub fn from_executable(
        version: impl Into<String>,
        build: impl Into<String>,
        device: DeviceClass,
    ) -> Self {
        let name = std::env::current_exe()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .map(strip_file_extension)
            .unwrap_or_else(|| "unknown".to_string());
        Self::new(name, version, build, std::env::consts::OS, device)
    }

    /// `{name}/{version}({build}) {platform} {device}`
    pub fn user_agent(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}({}) {} {}",
            self.name,
            self.version,
            self.build,
            self.platform,
            self.device.token()
        )
    }
}

fn strip_file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => filename.to_string(),
    }
}

/// Settings shared by every request a client builds.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub identity: AppIdentity,
    default_headers: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(identity: AppIdentity) -> Self {
        Self {
            identity,
            default_headers: BTreeMap::new(),
        }
    }

    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, InvalidHeader> {
        self.set_default_header(name, value)?;
        Ok(self)
    }

    /// Set a default header, replacing any earlier default of the same name.
    ///
    /// A name or value that could never be sent is rejected and the headers
    /// are left unchanged.
    pub fn set_default_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), InvalidHeader> {
        let (name, value) = (name.into(), value.into());
        InvalidHeader::check(&name, &value)?;
        self.default_headers.insert(name, value);
        Ok(())
    }

    /// Remove a default header. Returns the previous value, if any.
    pub fn remove_default_header(&mut self, name: &str) -> Option<String> {
        self.default_headers.remove(name)
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> AppIdentity {
        AppIdentity::new("Acme", "1.4.0", "212", "iOS", DeviceClass::Tablet)
    }

    #[test]
    fn user_agent_is_deterministic() {
        assert_eq!(identity().user_agent(), "Acme/1.4.0(212) iOS Tablet");
        assert_eq!(identity().user_agent(), identity().user_agent());
    }

    #[test]
    fn strip_file_extension_drops_last_extension_only() {
        assert_eq!(strip_file_extension("Acme.app"), "Acme");
        assert_eq!(strip_file_extension("acme.tar.gz"), "acme.tar");
        assert_eq!(strip_file_extension("acme"), "acme");
    }

    #[test]
    fn from_executable_uses_current_os() {
        let id = AppIdentity::from_executable("0.1.0", "1", DeviceClass::Desktop);
        assert_eq!(id.platform, std::env::consts::OS);
        assert!(!id.name.is_empty());
        assert!(id.user_agent().ends_with("Desktop"));
    }

    #[test]
    fn default_header_replaces_same_name() {
        let mut config = ClientConfig::new(identity())
            .with_default_header("Authorization", "Bearer one")
            .unwrap()
            .with_default_header("X-Trace", "on")
            .unwrap();
        config.set_default_header("Authorization", "Bearer two").unwrap();
        assert_eq!(config.default_headers().len(), 2);
        assert_eq!(config.default_headers()["Authorization"], "Bearer two");
        assert_eq!(config.remove_default_header("X-Trace").as_deref(), Some("on"));
        assert!(config.remove_default_header("X-Trace").is_none());
    }

    #[test]
    fn invalid_default_header_is_rejected() {
        let mut config = ClientConfig::new(identity())
            .with_default_header("X-Trace", "on")
            .unwrap();

        let err = config.set_default_header("bad header", "x").unwrap_err();
        assert_eq!(err.name, "bad header");
        assert!(config.set_default_header("X-Trace", "a\r\nb").is_err());
        assert!(ClientConfig::new(identity()).with_default_header("", "x").is_err());

        assert_eq!(config.default_headers().len(), 1);
        assert_eq!(config.default_headers()["X-Trace"], "on");
    }
}
