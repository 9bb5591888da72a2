use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ProxyError {
    #[error("proxy list is empty")]
    NoProxies,

    #[error("invalid proxy {proxy}: {reason}")]
    InvalidProxy { proxy: String, reason: String },

    #[error("no HTTP client available for account {0}")]
    NoClient(usize),
}

/// Per-account HTTP routing
pub trait ProxyLookup: Send + Sync {
    fn client(&self, account_index: usize) -> Result<reqwest::Client, ProxyError>;

    /// Proxy URL serving the account, `None` for direct connections
    fn proxy_url(&self, account_index: usize) -> Option<String>;
}

/// Assigns proxies to accounts in contiguous blocks.
///
/// With `n` proxies and `m` accounts each proxy serves `ceil(m / n)`
/// consecutive accounts; indices past the end stay on the last proxy.
#[derive(Debug, Clone)]
pub struct ProxyManager {
    proxies: Vec<String>,
    clients: Vec<reqwest::Client>,
    accounts_per_proxy: usize,
}

impl ProxyManager {
    /// Build one client per proxy entry (`host:port` or `user:pass@host:port`)
    pub fn new(proxies: Vec<String>, account_count: usize) -> Result<Self, ProxyError> {
        if proxies.is_empty() {
            return Err(ProxyError::NoProxies);
        }

        let clients = proxies
            .iter()
            .map(|proxy| build_client(proxy))
            .collect::<Result<Vec<_>, _>>()?;

        let accounts_per_proxy = account_count.div_ceil(proxies.len()).max(1);
        debug!(proxies = proxies.len(), accounts_per_proxy, "Proxy manager ready");

        Ok(Self {
            proxies,
            clients,
            accounts_per_proxy,
        })
    }

    /// Every account shares one client without a proxy
    pub fn direct() -> Self {
        Self {
            proxies: Vec::new(),
            clients: vec![reqwest::Client::new()],
            accounts_per_proxy: usize::MAX,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Slot serving the account, clamped to the last one
    pub fn slot(&self, account_index: usize) -> usize {
        let last = self.clients.len().saturating_sub(1);
        (account_index / self.accounts_per_proxy).min(last)
    }
}

impl ProxyLookup for ProxyManager {
    fn client(&self, account_index: usize) -> Result<reqwest::Client, ProxyError> {
        self.clients
            .get(self.slot(account_index))
            .cloned()
            .ok_or(ProxyError::NoClient(account_index))
    }

    fn proxy_url(&self, account_index: usize) -> Option<String> {
        self.proxies
            .get(self.slot(account_index))
            .map(|proxy| proxy_url(proxy))
    }
}

fn proxy_url(proxy: &str) -> String {
    format!("http://{proxy}")
}

fn build_client(proxy: &str) -> Result<reqwest::Client, ProxyError> {
    let invalid = |e: reqwest::Error| ProxyError::InvalidProxy {
        proxy: proxy.to_string(),
        reason: e.to_string(),
    };

    let proxy = reqwest::Proxy::all(proxy_url(proxy)).map_err(invalid)?;
    reqwest::Client::builder().proxy(proxy).build().map_err(invalid)
}
