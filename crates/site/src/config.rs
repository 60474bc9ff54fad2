use std::path::PathBuf;

use clap::Parser;

/// Y-Link site backend: DMX calculators, locale routing and the pilot download.
#[derive(Parser, Debug, Clone)]
#[command(name = "ylink-site")]
#[command(about = "Y-Link DMX tools and site API")]
pub struct Args {
    /// Bind address
    #[arg(long, env = "YLINK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port
    #[arg(long, env = "YLINK_PORT", default_value = "3000")]
    pub port: u16,

    /// Key for verifying pilot session cookies
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    /// JSON snapshot with blog posts, guide series and pilot users
    #[arg(long, env = "YLINK_CONTENT")]
    pub content: Option<PathBuf>,

    /// Calculator settings file, created with defaults when missing
    #[arg(long, env = "YLINK_TOOL_CONFIG", default_value = "tools.json")]
    pub tool_config: PathBuf,

    /// Request timeout in seconds
    #[arg(long, env = "YLINK_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,
}

/// Server configuration, built from [`Args`] in the binary and directly in tests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub request_timeout_secs: u64,
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            session_secret: args.session_secret.clone(),
            request_timeout_secs: args.request_timeout_secs,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_flags() {
        let args = Args::try_parse_from([
            "ylink-site",
            "--session-secret",
            "s3cret",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
        ])
        .unwrap();
        let config = ServerConfig::from(&args);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.session_secret, "s3cret");
        assert_eq!(args.tool_config, PathBuf::from("tools.json"));
        assert!(args.content.is_none());
    }
}
