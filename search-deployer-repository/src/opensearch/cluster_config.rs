//! Connection parameters of a single OpenSearch cluster.

use std::fmt;
use std::time::Duration;

use search_deployer_shared::{ConfigError, HierarchicalConfig};
use url::Url;

const URLS_KEY: &str = "urls";
const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";
const CONNECT_TIMEOUT_KEY: &str = "timeout.connect";
const SOCKET_TIMEOUT_KEY: &str = "timeout.socket";
const THREADS_KEY: &str = "threads";
const KEEP_ALIVE_KEY: &str = "keepAlive";

/// Connection parameters of one cluster.
///
/// A cluster with no URLs is *inactive*: it exists so that topology
/// resolution can tell an unconfigured read or write side apart from a
/// configured one. Every other field can be inherited from a parent cluster,
/// which is how the read and write clusters pick up the global credentials and
/// timeouts.
///
/// The OpenSearch transport only takes a per-request timeout, see
/// [`request_timeout`](Self::request_timeout). `thread_count` and
/// `keep_alive` are parsed and inherited but carried only: the transport's
/// HTTP client manages its own connection pool and keep-alive.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ClusterConfig {
    /// Node endpoints, in configuration order.
    pub urls: Vec<Url>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Only used as the request timeout when no socket timeout is set.
    pub connect_timeout: Option<Duration>,
    /// `None` leaves the client default in place.
    pub socket_timeout: Option<Duration>,
    /// Number of worker threads. Carried only.
    pub thread_count: Option<usize>,
    /// Carried only.
    pub keep_alive: bool,
}

impl ClusterConfig {
    /// A cluster with no URLs and default connection parameters.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Build a cluster from its configuration section.
    ///
    /// Fields missing from `section` are inherited one by one from `parent`
    /// (or left at their defaults without a parent). An absent section yields
    /// an inactive cluster.
    ///
    /// # Arguments
    ///
    /// * `section` - The cluster's configuration sub-tree, if configured
    /// * `parent` - The cluster to inherit unset fields from
    ///
    /// # Returns
    ///
    /// * `Ok(ClusterConfig)` - The resolved cluster
    /// * `Err(ConfigError)` - If a URL or a numeric/boolean field is malformed
    pub fn from_config(
        section: Option<&HierarchicalConfig>,
        parent: Option<&ClusterConfig>,
    ) -> Result<Self, ConfigError> {
        let Some(section) = section else {
            return Ok(Self::inactive());
        };
        let defaults = Self::default();
        let parent = parent.unwrap_or(&defaults);

        let urls = section
            .get_string_list(URLS_KEY)
            .iter()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| ConfigError::invalid(URLS_KEY, format!("'{}': {}", raw, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let username = section
            .get_string(USERNAME_KEY)
            .filter(|value| !value.is_empty())
            .or_else(|| parent.username.clone());
        let password = section
            .get_string(PASSWORD_KEY)
            .filter(|value| !value.is_empty())
            .or_else(|| parent.password.clone());

        let connect_timeout = match section.get_i64(CONNECT_TIMEOUT_KEY)? {
            Some(millis) => positive_millis(millis),
            None => parent.connect_timeout,
        };
        let socket_timeout = match section.get_i64(SOCKET_TIMEOUT_KEY)? {
            Some(millis) => positive_millis(millis),
            None => parent.socket_timeout,
        };
        let thread_count = match section.get_i64(THREADS_KEY)? {
            Some(threads) => usize::try_from(threads).ok().filter(|&t| t > 0),
            None => parent.thread_count,
        };
        let keep_alive = section
            .get_bool(KEEP_ALIVE_KEY)?
            .unwrap_or(parent.keep_alive);

        Ok(Self {
            urls,
            username,
            password,
            connect_timeout,
            socket_timeout,
            thread_count,
            keep_alive,
        })
    }

    /// Whether at least one endpoint is configured.
    pub fn is_active(&self) -> bool {
        !self.urls.is_empty()
    }

    /// The timeout applied to every request sent to this cluster: the socket
    /// timeout, falling back to the connect timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.socket_timeout.or(self.connect_timeout)
    }

    /// Username and password for basic authentication, when a username is set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref()?;
        Some((username, self.password.as_deref().unwrap_or_default()))
    }
}

/// Negative or zero values mean "use the client default".
fn positive_millis(millis: i64) -> Option<Duration> {
    u64::try_from(millis)
        .ok()
        .filter(|&m| m > 0)
        .map(Duration::from_millis)
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let urls: Vec<&str> = self.urls.iter().map(Url::as_str).collect();
        f.debug_struct("ClusterConfig")
            .field("urls", &urls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connect_timeout", &self.connect_timeout)
            .field("socket_timeout", &self.socket_timeout)
            .field("thread_count", &self.thread_count)
            .field("keep_alive", &self.keep_alive)
            .finish()
    }
}
