/// Salt used when none is configured. Hashes made with it are still one-way
/// but trivially comparable across deployments.
pub const DEFAULT_IP_HASH_SALT: &str = "default-salt";

/// Moderation settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Shared secret admin callers must present. `None` means admin routes
    /// are unusable and answer with a misconfiguration error.
    pub admin_key: Option<String>,
    pub ip_hash_salt: String,
    /// Whether one reverse proxy sits in front of the server. When set, the
    /// last `X-Forwarded-For` hop is the caller's rate-limit key; otherwise
    /// the TCP peer is.
    pub trust_proxy: bool,
}

impl ModerationConfig {
    /// Blank values count as unset.
    pub fn new(admin_key: Option<String>, ip_hash_salt: Option<String>) -> Self {
        let admin_key = admin_key.filter(|k| !k.trim().is_empty());
        let ip_hash_salt = ip_hash_salt
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_IP_HASH_SALT.to_string());

        Self {
            admin_key,
            ip_hash_salt,
            trust_proxy: true,
        }
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn uses_default_salt(&self) -> bool {
        self.ip_hash_salt == DEFAULT_IP_HASH_SALT
    }
}
