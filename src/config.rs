// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Waiter and pagination configuration.
//!
//! The configuration is a YAML file like:
//!
//! ```yaml
//! page_size: 100
//! defaults:
//!   poll_interval: 2
//!   timeout: 600
//! resources:
//!   server:
//!     poll_interval: 5
//!     timeout: 1800
//! ```
//!
//! All values are in seconds. Settings missing for a resource kind are taken
//! from `defaults`, then from the built-in values for this kind.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, ErrorKind, Result};

/// Environment variable with the path to the configuration file.
pub const CONFIG_ENV: &str = "RACKSTACK_CONFIG";

protocol_enum! {
    #[doc = "Kind of a resource that can be waited for."]
    enum ResourceKind {
        Server = "server",
        Volume = "volume",
        Snapshot = "snapshot",
        Image = "image",
        DatabaseInstance = "database_instance",
        LoadBalancer = "load_balancer",
        Network = "network",
        DnsJob = "dns_job"
    }
}

/// Poll interval and timeout for a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// Delay between two fetches.
    pub poll_interval: Duration,
    /// Total time to wait (`None` to wait forever).
    pub timeout: Option<Duration>,
}

impl Default for WaitSettings {
    fn default() -> WaitSettings {
        WaitSettings {
            poll_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl ResourceKind {
    /// Built-in settings for this resource kind.
    pub fn default_settings(&self) -> WaitSettings {
        let (poll_interval, timeout) = match self {
            // Builds and resizes of large flavors are slow.
            ResourceKind::Server => (5, 1800),
            ResourceKind::Volume => (2, 600),
            ResourceKind::Snapshot => (5, 1800),
            ResourceKind::Image => (5, 1800),
            ResourceKind::DatabaseInstance => (5, 1800),
            ResourceKind::LoadBalancer => (2, 600),
            ResourceKind::Network => (1, 300),
            ResourceKind::DnsJob => (1, 300),
        };
        WaitSettings {
            poll_interval: Duration::from_secs(poll_interval),
            timeout: Some(Duration::from_secs(timeout)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct SettingsOverride {
    #[serde(default)]
    poll_interval: Option<u64>,
    #[serde(default)]
    timeout: Option<u64>,
}

impl SettingsOverride {
    fn apply(&self, mut settings: WaitSettings) -> WaitSettings {
        if let Some(poll_interval) = self.poll_interval {
            settings.poll_interval = Duration::from_secs(poll_interval);
        }
        if let Some(timeout) = self.timeout {
            settings.timeout = Some(Duration::from_secs(timeout));
        }
        settings
    }
}

/// Waiter and pagination configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    page_size: Option<usize>,
    #[serde(default)]
    defaults: SettingsOverride,
    #[serde(default)]
    resources: HashMap<ResourceKind, SettingsOverride>,
}

fn find_config() -> Option<PathBuf> {
    let current = Path::new("./rackstack.yaml");
    if current.is_file() {
        match current.canonicalize() {
            Ok(val) => return Some(val),
            Err(e) => warn!("Cannot canonicalize {:?}: {}", current, e),
        }
    }

    let abs = PathBuf::from("/etc/rackstack/rackstack.yaml");
    if abs.is_file() {
        Some(abs)
    } else {
        None
    }
}

impl Config {
    /// Load the configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read {}: {}", path.display(), e),
            )
        })?;
        let config: Config = serde_yaml::from_reader(file).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse {}: {}", path.display(), e),
            )
        })?;
        debug!("Loaded configuration from {}", path.display());
        config.validated()
    }

    /// Load the configuration from the environment.
    ///
    /// Uses the file from the `RACKSTACK_CONFIG` variable if set. Otherwise
    /// looks for `./rackstack.yaml` and `/etc/rackstack/rackstack.yaml`,
    /// falling back to the built-in defaults if none is found.
    pub fn from_env() -> Result<Config> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Config::from_file(path);
        }

        if let Some(path) = find_config() {
            Config::from_file(path)
        } else {
            warn!("No configuration file found, using built-in defaults");
            Ok(Config::default())
        }
    }

    /// Page size for listings (if set).
    #[inline]
    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    /// Set the page size for listings.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Config> {
        self.page_size = Some(page_size);
        self.validated()
    }

    /// Settings for the given kind of resources.
    pub fn settings(&self, kind: ResourceKind) -> WaitSettings {
        let settings = self.defaults.apply(kind.default_settings());
        match self.resources.get(&kind) {
            Some(value) => value.apply(settings),
            None => settings,
        }
    }

    fn validated(self) -> Result<Config> {
        if self.page_size == Some(0) {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "page_size must be positive",
            ));
        }

        let intervals = self
            .resources
            .values()
            .chain(Some(&self.defaults))
            .filter_map(|value| value.poll_interval);
        for interval in intervals {
            if interval == 0 {
                return Err(Error::new(
                    ErrorKind::InvalidConfig,
                    "poll_interval must be positive",
                ));
            }
        }

        Ok(self)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(s)?;
        config.validated()
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::time::Duration;

    use super::{Config, ResourceKind, WaitSettings};
    use crate::ErrorKind;

    const CONFIG: &str = r#"
page_size: 100
defaults:
  poll_interval: 3
resources:
  server:
    timeout: 3600
  dns_job:
    poll_interval: 10
    timeout: 60
"#;

    #[test]
    fn test_builtin_defaults() {
        let config = Config::default();
        assert_eq!(config.page_size(), None);
        assert_eq!(
            config.settings(ResourceKind::Server),
            ResourceKind::Server.default_settings()
        );
        assert_eq!(
            config.settings(ResourceKind::Server).timeout,
            Some(Duration::from_secs(1800))
        );
    }

    #[test]
    fn test_layering() {
        let config: Config = CONFIG.parse().unwrap();
        assert_eq!(config.page_size(), Some(100));
        assert_eq!(
            config.settings(ResourceKind::Server),
            WaitSettings {
                poll_interval: Duration::from_secs(3),
                timeout: Some(Duration::from_secs(3600)),
            }
        );
        assert_eq!(
            config.settings(ResourceKind::DnsJob),
            WaitSettings {
                poll_interval: Duration::from_secs(10),
                timeout: Some(Duration::from_secs(60)),
            }
        );
        assert_eq!(
            config.settings(ResourceKind::Volume),
            WaitSettings {
                poll_interval: Duration::from_secs(3),
                timeout: Some(Duration::from_secs(600)),
            }
        );
    }

    #[test]
    fn test_network_settings() {
        let config: Config = "defaults: {poll_interval: 7, timeout: 30}".parse().unwrap();
        assert_eq!(
            config.settings(ResourceKind::Network),
            WaitSettings {
                poll_interval: Duration::from_secs(7),
                timeout: Some(Duration::from_secs(30)),
            }
        );
        let config: Config = "resources: {network: {timeout: 60}}".parse().unwrap();
        assert_eq!(
            config.settings(ResourceKind::Network),
            WaitSettings {
                poll_interval: Duration::from_secs(1),
                timeout: Some(Duration::from_secs(60)),
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = "page_size: 0".parse::<Config>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        let err = "defaults: {poll_interval: 0}".parse::<Config>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        let err = "resources: {spaceship: {timeout: 1}}"
            .parse::<Config>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        let err = Config::default().with_page_size(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("rackstack-{}.yaml", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            file.write_all(CONFIG.as_bytes()).unwrap();
        }
        let config = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.page_size(), Some(100));

        let err = Config::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
