use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const MISSING_API_KEY: &str = "missing-groq-api-key";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AppConfig {
    pub fn new(api_base_url: &str, api_key: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// True when `GROQ_API_KEY` was not set and the placeholder is in
    /// use. Upstream calls will be rejected.
    pub fn is_missing_api_key(&self) -> bool {
        self.api_key == MISSING_API_KEY
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_base_url =
            env::var("GROQ_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_key = env::var("GROQ_API_KEY").unwrap_or_else(|_| MISSING_API_KEY.to_string());

        Self::new(&api_base_url, &api_key)
    }
}
