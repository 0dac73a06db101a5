use url::Url;

/// Domain the embedded player is served from.
///
/// An origin is trusted when it is an `http`/`https` origin whose host is the
/// domain itself or one of its subdomains. Hosts are compared label-wise, so
/// `https://youtube.com.attacker.example` is not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedOrigin {
    domain: String,
}

impl TrustedOrigin {
    pub const DEFAULT_DOMAIN: &'static str = "youtube.com";

    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        Self { domain }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn matches(&self, origin: &str) -> bool {
        if self.domain.is_empty() {
            return false;
        }

        let Ok(url) = Url::parse(origin.trim()) else {
            return false;
        };
        if !matches!(url.scheme(), "https" | "http") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };

        let host = host.to_ascii_lowercase();
        host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl Default for TrustedOrigin {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_domain_and_subdomains() {
        let trusted = TrustedOrigin::default();
        assert!(trusted.matches("https://www.youtube.com"));
        assert!(trusted.matches("https://youtube.com"));
        assert!(trusted.matches("https://WWW.YouTube.com:443"));
    }

    #[test]
    fn rejects_lookalikes_and_garbage() {
        let trusted = TrustedOrigin::default();
        assert!(!trusted.matches("https://youtube.com.attacker.example"));
        assert!(!trusted.matches("https://notyoutube.com"));
        assert!(!trusted.matches("javascript:alert(1)"));
        assert!(!trusted.matches("null"));
        assert!(!trusted.matches(""));
        assert!(!trusted.matches("file:///youtube.com"));
    }

    #[test]
    fn empty_domain_trusts_nothing() {
        let trusted = TrustedOrigin::new("  ");
        assert!(!trusted.matches("https://www.youtube.com"));
    }
}
