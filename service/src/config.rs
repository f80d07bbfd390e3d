use clap::builder::TypedValueParser as _;
use clap::Parser;
use log::LevelFilter;
use oauth_connect::error::{config_error, Error};
use oauth_connect::{ProviderCredentials, ProviderKind};
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_SESSION_FILE: &str = ".past_connect_session.json";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Douban application key
    #[arg(long, env)]
    douban_api_key: Option<String>,
    /// Douban application secret
    #[arg(long, env, hide_env_values = true)]
    douban_api_secret: Option<String>,
    /// Douban callback URL registered for the application
    #[arg(long, env)]
    douban_redirect_uri: Option<String>,
    /// Scope requested from Douban, replacing the built-in default
    #[arg(long, env)]
    douban_scope: Option<String>,
    /// Authorization page layout requested from Douban (e.g. `mobile`)
    #[arg(long, env)]
    douban_display: Option<String>,

    /// Sina Weibo application key
    #[arg(long, env)]
    sina_api_key: Option<String>,
    /// Sina Weibo application secret
    #[arg(long, env, hide_env_values = true)]
    sina_api_secret: Option<String>,
    /// Sina Weibo callback URL registered for the application
    #[arg(long, env)]
    sina_redirect_uri: Option<String>,
    /// Scope requested from Sina Weibo, replacing the built-in default
    #[arg(long, env)]
    sina_scope: Option<String>,
    /// Authorization page layout requested from Sina Weibo (e.g. `mobile`)
    #[arg(long, env)]
    sina_display: Option<String>,

    /// Renren application key
    #[arg(long, env)]
    renren_api_key: Option<String>,
    /// Renren application secret, also used to sign REST calls
    #[arg(long, env, hide_env_values = true)]
    renren_api_secret: Option<String>,
    /// Renren callback URL registered for the application
    #[arg(long, env)]
    renren_redirect_uri: Option<String>,
    /// Scope requested from Renren, replacing the built-in default
    #[arg(long, env)]
    renren_scope: Option<String>,
    /// Authorization page layout requested from Renren (e.g. `mobile`)
    #[arg(long, env)]
    renren_display: Option<String>,

    /// Instagram client id
    #[arg(long, env)]
    instagram_api_key: Option<String>,
    /// Instagram client secret
    #[arg(long, env, hide_env_values = true)]
    instagram_api_secret: Option<String>,
    /// Instagram callback URL registered for the application
    #[arg(long, env)]
    instagram_redirect_uri: Option<String>,
    /// Scope requested from Instagram, replacing the built-in default
    #[arg(long, env)]
    instagram_scope: Option<String>,
    /// Authorization page layout requested from Instagram (e.g. `mobile`)
    #[arg(long, env)]
    instagram_display: Option<String>,

    /// QQ Weibo consumer key
    #[arg(long, env)]
    qq_api_key: Option<String>,
    /// QQ Weibo consumer secret
    #[arg(long, env, hide_env_values = true)]
    qq_api_secret: Option<String>,
    /// QQ Weibo callback URL, sent as `oauth_callback`
    #[arg(long, env)]
    qq_redirect_uri: Option<String>,

    /// Twitter consumer key
    #[arg(long, env)]
    twitter_api_key: Option<String>,
    /// Twitter consumer secret
    #[arg(long, env, hide_env_values = true)]
    twitter_api_secret: Option<String>,
    /// Twitter callback URL, sent as `oauth_callback`
    #[arg(long, env)]
    twitter_redirect_uri: Option<String>,

    /// Opaque `state` value echoed back on OAuth 2.0 callbacks
    #[arg(long = "state", env = "OAUTH_STATE")]
    pub oauth_state: Option<String>,

    /// Timeout in seconds for a single request to a provider
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// User agent sent to providers
    #[arg(long, env, default_value = concat!("past_connect/", env!("CARGO_PKG_VERSION")))]
    pub http_user_agent: String,

    /// File holding the pending OAuth 1.0a request token between "begin" and "complete"
    #[arg(long, env, default_value = DEFAULT_SESSION_FILE)]
    pub session_file: String,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Application credentials for `kind`.
    ///
    /// Fails with a configuration error naming the first missing setting.
    pub fn provider_credentials(&self, kind: ProviderKind) -> Result<ProviderCredentials, Error> {
        let (api_key, api_secret, redirect_uri) = match kind {
            ProviderKind::Douban => (
                &self.douban_api_key,
                &self.douban_api_secret,
                &self.douban_redirect_uri,
            ),
            ProviderKind::Sina => (
                &self.sina_api_key,
                &self.sina_api_secret,
                &self.sina_redirect_uri,
            ),
            ProviderKind::Renren => (
                &self.renren_api_key,
                &self.renren_api_secret,
                &self.renren_redirect_uri,
            ),
            ProviderKind::Instagram => (
                &self.instagram_api_key,
                &self.instagram_api_secret,
                &self.instagram_redirect_uri,
            ),
            ProviderKind::Qq => (&self.qq_api_key, &self.qq_api_secret, &self.qq_redirect_uri),
            ProviderKind::Twitter => (
                &self.twitter_api_key,
                &self.twitter_api_secret,
                &self.twitter_redirect_uri,
            ),
        };

        let setting = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| config_error(&format!("{}_{} is not configured", kind, name)))
        };

        let mut credentials = ProviderCredentials::new(
            setting(api_key, "api_key")?,
            SecretString::new(setting(api_secret, "api_secret")?),
            setting(redirect_uri, "redirect_uri")?,
        );

        let (scope, display) = self.authorize_hints(kind);
        if let Some(scope) = non_empty(scope) {
            credentials = credentials.with_scope(scope);
        }
        if let Some(display) = non_empty(display) {
            credentials = credentials.with_display(display);
        }
        if let Some(state) = non_empty(&self.oauth_state) {
            credentials = credentials.with_state(state);
        }

        Ok(credentials)
    }

    /// Scope and display overrides; OAuth 1.0a providers take neither.
    fn authorize_hints(&self, kind: ProviderKind) -> (&Option<String>, &Option<String>) {
        const NONE: &Option<String> = &None;
        match kind {
            ProviderKind::Douban => (&self.douban_scope, &self.douban_display),
            ProviderKind::Sina => (&self.sina_scope, &self.sina_display),
            ProviderKind::Renren => (&self.renren_scope, &self.renren_display),
            ProviderKind::Instagram => (&self.instagram_scope, &self.instagram_display),
            ProviderKind::Qq | ProviderKind::Twitter => (NONE, NONE),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
