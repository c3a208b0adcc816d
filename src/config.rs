// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PORT_SEARCH_SPAN: u16 = 100;
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 45;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// First port to try when binding the HTTP server.
    pub port: u16,
    /// How many consecutive ports are tried, starting at `port`.
    pub port_search_span: u16,
    /// Directory containing the game's static files.
    /// When set, every unmatched GET is served from this path.
    pub static_dir: Option<PathBuf>,
    /// Settings for the upstream text-generation API.
    pub gemini: GeminiConfig,
}

/// Where and how to reach the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    /// Upper bound on one upstream exchange (send + body read).
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Full `generateContent` URL, without the key query parameter.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_GEMINI_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - first port to try (default: 8000)
    /// - `PORT_SEARCH_SPAN` - number of ports scanned from `PORT` (default: 100)
    /// - `STATIC_DIR` - game asset directory for static file serving
    /// - `GEMINI_API_KEY` - key passed to the Gemini API
    /// - `GEMINI_API_BASE` - API base URL (default: the public v1beta endpoint)
    /// - `GEMINI_MODEL` - model name (default: `gemini-2.0-flash`)
    /// - `GEMINI_TIMEOUT_SECS` - upstream wait bound (default: 45)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--static-dir <DIR>` - Override the static directory
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from explicit argument and variable sources.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let port_search_span = env("PORT_SEARCH_SPAN")
            .and_then(|v| v.parse().ok())
            .filter(|span: &u16| *span > 0)
            .unwrap_or(DEFAULT_PORT_SEARCH_SPAN);

        let static_dir = Self::parse_cli_value(args, "--static-dir")
            .or_else(|| env("STATIC_DIR"))
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_base: env("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            model: env("GEMINI_MODEL").unwrap_or(defaults.model),
            api_key: env("GEMINI_API_KEY").unwrap_or_default(),
            timeout: env("GEMINI_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Config {
            port,
            port_search_span,
            static_dir,
            gemini,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
