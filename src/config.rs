use std::time::Duration;

/// Signing material for web push. Present only when all three variables are set.
#[derive(Debug, Clone)]
pub struct VapidCredentials {
    pub public_key: String,
    pub private_key: String,
    pub subject: String,
}

/// Server configuration.
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 5000 | HTTP / WebSocket port |
/// | VAPID_PUBLIC_KEY | - | base64url public key |
/// | VAPID_PRIVATE_KEY | - | base64url private key |
/// | VAPID_SUBJECT | - | contact, e.g. `mailto:ops@cafe.example` |
/// | SUPER_ADMIN_EMAIL | - | identity that receives staff push alerts |
/// | CURRENCY_SYMBOL | ₹ | prefix of amounts in notifications |
/// | CAFE_NAME | AuraCafe | brand used in notification titles |
/// | PUSH_TIMEOUT_MS | 10000 | per-request timeout against push services |
/// | PUSH_TTL_SECS | 86400 | how long a push service keeps an undelivered message |
/// | LIVE_CHANNEL_CAPACITY | 64 | queued live events per connection |
/// | STORE_BUFFER | 32 | request queue of each store actor |
///
/// Push is disabled unless all three `VAPID_*` variables are present.
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub vapid: Option<VapidCredentials>,
    pub admin_identity: Option<String>,
    pub currency_symbol: String,
    pub cafe_name: String,
    pub push_timeout: Duration,
    pub push_ttl_secs: u64,
    pub live_channel_capacity: usize,
    pub store_buffer: usize,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    var(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 5000,
            vapid: None,
            admin_identity: None,
            currency_symbol: "₹".into(),
            cafe_name: "AuraCafe".into(),
            push_timeout: Duration::from_millis(10_000),
            push_ttl_secs: 86_400,
            live_channel_capacity: 64,
            store_buffer: 32,
        }
    }
}

impl Config {
    /// Loads configuration from the environment; unset or unparsable values fall back
    /// to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let vapid = match (
            var("VAPID_PUBLIC_KEY"),
            var("VAPID_PRIVATE_KEY"),
            var("VAPID_SUBJECT"),
        ) {
            (Some(public_key), Some(private_key), Some(subject)) => Some(VapidCredentials {
                public_key,
                private_key,
                subject,
            }),
            _ => None,
        };

        Self {
            http_port: parsed("HTTP_PORT", defaults.http_port),
            vapid,
            admin_identity: crate::model::normalize_identity(var("SUPER_ADMIN_EMAIL").as_deref()),
            currency_symbol: var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            cafe_name: var("CAFE_NAME").unwrap_or(defaults.cafe_name),
            push_timeout: Duration::from_millis(parsed("PUSH_TIMEOUT_MS", 10_000)),
            push_ttl_secs: parsed("PUSH_TTL_SECS", defaults.push_ttl_secs),
            live_channel_capacity: parsed("LIVE_CHANNEL_CAPACITY", defaults.live_channel_capacity).max(1),
            store_buffer: parsed("STORE_BUFFER", defaults.store_buffer).max(1),
        }
    }

    /// Public key handed to browsers for `PushManager.subscribe()`; empty when push is off.
    pub fn vapid_public_key(&self) -> &str {
        self.vapid.as_ref().map(|v| v.public_key.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_push() {
        let config = Config::default();
        assert!(config.vapid.is_none());
        assert_eq!(config.vapid_public_key(), "");
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.currency_symbol, "₹");
    }
}
