use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

use gemchat_api::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Placeholder signing secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl_secs: Option<i64>,
    pub static_dir: Option<PathBuf>,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("GEMCHAT_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("GEMCHAT_JWT_SECRET is unset or still a placeholder");
        }

        let gemini_api_key =
            var("GEMINI_API_KEY").ok_or_else(|| anyhow!("GEMINI_API_KEY is unset"))?;

        let host = var("GEMCHAT_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("GEMCHAT_PORT")
            .unwrap_or_else(|| "8787".into())
            .parse()
            .context("GEMCHAT_PORT")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("GEMCHAT_HOST")?;

        let token_ttl_secs = match var("GEMCHAT_TOKEN_TTL_SECS") {
            Some(v) => {
                let ttl: i64 = v.parse().context("GEMCHAT_TOKEN_TTL_SECS")?;
                if ttl <= 0 {
                    bail!("GEMCHAT_TOKEN_TTL_SECS must be positive");
                }
                Some(ttl)
            }
            None => None,
        };

        let gemini_timeout_secs: u64 = var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".into())
            .parse()
            .context("GEMINI_TIMEOUT_SECS")?;

        Ok(Self {
            jwt_secret,
            db_path: var("GEMCHAT_DB_PATH")
                .unwrap_or_else(|| "gemchat.db".into())
                .into(),
            addr,
            token_ttl_secs,
            static_dir: var("GEMCHAT_STATIC_DIR").map(PathBuf::from),
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            gemini_base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            gemini_timeout: Duration::from_secs(gemini_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("GEMCHAT_JWT_SECRET", "s3cret"), ("GEMINI_API_KEY", "k")];

    #[test]
    fn defaults() {
        let cfg = config(&REQUIRED).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:8787".parse().unwrap());
        assert_eq!(cfg.db_path, PathBuf::from("gemchat.db"));
        assert_eq!(cfg.token_ttl_secs, None);
        assert_eq!(cfg.static_dir, None);
        assert_eq!(cfg.gemini_model, DEFAULT_MODEL);
        assert_eq!(cfg.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.gemini_timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("GEMCHAT_HOST", "127.0.0.1"),
            ("GEMCHAT_PORT", "9000"),
            ("GEMCHAT_TOKEN_TTL_SECS", "86400"),
            ("GEMCHAT_STATIC_DIR", "public"),
            ("GEMINI_MODEL", "gemini-pro"),
        ]);
        let cfg = config(&vars).unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.token_ttl_secs, Some(86400));
        assert_eq!(cfg.static_dir, Some(PathBuf::from("public")));
        assert_eq!(cfg.gemini_model, "gemini-pro");
    }

    #[test]
    fn rejects_missing_or_placeholder_secret() {
        assert!(config(&[("GEMINI_API_KEY", "k")]).is_err());
        assert!(
            config(&[
                ("GEMCHAT_JWT_SECRET", "dev-secret-change-me"),
                ("GEMINI_API_KEY", "k")
            ])
            .is_err()
        );
    }

    #[test]
    fn rejects_missing_api_key() {
        assert!(config(&[("GEMCHAT_JWT_SECRET", "s3cret")]).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("GEMCHAT_PORT", "http"));
        assert!(config(&vars).is_err());

        let mut vars = REQUIRED.to_vec();
        vars.push(("GEMCHAT_TOKEN_TTL_SECS", "0"));
        assert!(config(&vars).is_err());
    }
}
