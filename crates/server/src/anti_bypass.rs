use std::net::IpAddr;

use crate::config::GatewayConfig;
use crate::error::ServerError;

/// Classification of a downstream URL's reachability (spec.md §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Loopback,
    Private,
    Public,
    Unknown,
}

impl Reachability {
    #[must_use]
    pub fn bypass_risk(self) -> &'static str {
        match self {
            Self::Loopback | Self::Private => "low",
            Self::Public | Self::Unknown => "high",
        }
    }
}

/// Classify a downstream bot-gateway URL's host (spec.md §4.11: "RFC1918,
/// link-local, loopback literals are private/loopback").
#[must_use]
pub fn classify_url(raw: &str) -> Reachability {
    let Ok(url) = url::Url::parse(raw) else {
        return Reachability::Unknown;
    };
    let Some(host) = url.host_str() else {
        return Reachability::Unknown;
    };

    if host.eq_ignore_ascii_case("localhost") {
        return Reachability::Loopback;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            if ip.is_loopback() {
                Reachability::Loopback
            } else if ip.is_private() || ip.is_link_local() {
                Reachability::Private
            } else {
                Reachability::Public
            }
        }
        Ok(IpAddr::V6(ip)) => {
            if ip.is_loopback() {
                Reachability::Loopback
            } else if is_unique_local_v6(&ip) || ip.is_unicast_link_local() {
                Reachability::Private
            } else {
                Reachability::Public
            }
        }
        Err(_) => Reachability::Unknown,
    }
}

fn is_unique_local_v6(ip: &std::net::Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

/// Monotone function of the three anti-bypass flags (spec.md §4.12:
/// "`bypass_resistance_score` is a monotone function of
/// `{network_gating_on, token_hardening_on, credentials_strict_on}`").
#[must_use]
pub fn bypass_resistance_score(network_gating_on: bool, token_hardening_on: bool, credentials_strict_on: bool) -> u8 {
    let mut score = 0u8;
    if network_gating_on {
        score += 34;
    }
    if token_hardening_on {
        score += 33;
    }
    if credentials_strict_on {
        score += 33;
    }
    score
}

/// Startup-time checks run when their flags are enabled (spec.md §4.11).
/// Any failure here aborts startup per §5 "Startup ordering".
pub fn run_startup_checks(config: &GatewayConfig) -> Result<(), ServerError> {
    if config.network_gating {
        let Some(url) = config.clawdbot_base_url.as_deref() else {
            return Ok(());
        };
        let reachability = classify_url(url);
        if matches!(reachability, Reachability::Public | Reachability::Unknown) {
            return Err(ServerError::Config(format!(
                "downstream bot-gateway URL {url} classifies as {reachability:?} with NETWORK_GATING on; \
                 isolate the downstream on a loopback or private address before starting"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_literal_classifies_loopback() {
        assert_eq!(classify_url("http://127.0.0.1:8080"), Reachability::Loopback);
        assert_eq!(classify_url("http://localhost:8080"), Reachability::Loopback);
    }

    #[test]
    fn rfc1918_classifies_private() {
        assert_eq!(classify_url("http://10.0.0.5"), Reachability::Private);
        assert_eq!(classify_url("http://192.168.1.1"), Reachability::Private);
    }

    #[test]
    fn public_ip_classifies_public() {
        assert_eq!(classify_url("http://8.8.8.8"), Reachability::Public);
    }

    #[test]
    fn dns_name_classifies_unknown() {
        assert_eq!(classify_url("https://bots.example.com"), Reachability::Unknown);
    }

    #[test]
    fn score_is_monotone_in_flags() {
        assert_eq!(bypass_resistance_score(false, false, false), 0);
        assert_eq!(bypass_resistance_score(true, true, true), 100);
        assert!(bypass_resistance_score(true, false, false) < bypass_resistance_score(true, true, false));
    }

    #[test]
    fn startup_check_refuses_public_downstream() {
        let config = GatewayConfig {
            network_gating: true,
            clawdbot_base_url: Some("https://bots.example.com".into()),
            ..GatewayConfig::default()
        };
        assert!(run_startup_checks(&config).is_err());
    }

    #[test]
    fn startup_check_allows_loopback_downstream() {
        let config = GatewayConfig {
            network_gating: true,
            clawdbot_base_url: Some("http://127.0.0.1:9000".into()),
            ..GatewayConfig::default()
        };
        assert!(run_startup_checks(&config).is_ok());
    }
}
