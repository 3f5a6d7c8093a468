//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::rate_limit::RateLimitConfig;

/// Contact form and admin message listing service.
#[derive(Parser, Debug, Clone)]
#[command(name = "contact-api")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to listen on.
    #[arg(long, env = "CONTACT_API_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Log filter (e.g. "info", "contact_api=debug").
    #[arg(long, env = "CONTACT_API_LOG", default_value = "info")]
    pub log_level: String,

    /// Bearer tokens accepted by `GET /api/messages`, comma separated.
    #[arg(
        long = "admin-token",
        env = "CONTACT_API_ADMIN_TOKENS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    pub admin_tokens: Vec<String>,

    /// Listing requests allowed per identity per window.
    #[arg(long, default_value_t = 30)]
    pub rate_limit_max: u32,

    #[arg(long, default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Capacity of the in-memory message store.
    #[arg(long, default_value_t = 10_000)]
    pub max_messages: usize,
}

impl Args {
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max,
            window: Duration::from_secs(self.rate_limit_window_secs),
            ..RateLimitConfig::default()
        }
    }
}
