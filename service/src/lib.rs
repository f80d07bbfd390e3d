use config::Config;
use log::info;
use oauth_connect::error::Error;
use oauth_connect::http::{ReqwestTransport, Transport, TransportBuilder};
use oauth_connect::session::FileSession;
use oauth_connect::{Connector, ProviderKind};
use std::sync::Arc;

pub mod config;
pub mod logging;

pub fn init_transport(config: &Config) -> Result<ReqwestTransport, Error> {
    info!(
        "HTTP transport config: timeout={}s, user_agent={}",
        config.http_timeout_secs, config.http_user_agent,
    );

    TransportBuilder::new()
        .with_timeout(config.http_timeout())
        .with_user_agent(config.http_user_agent.clone())
        .build()
}

// Service-level state containing only infrastructure concerns
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<dyn Transport>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: app_config,
        }
    }

    /// Connector for `kind` using the configured application credentials.
    pub fn connector(&self, kind: ProviderKind) -> Result<Connector, Error> {
        let credentials = self.config.provider_credentials(kind)?;
        Ok(Connector::new(kind, credentials, Arc::clone(&self.transport)))
    }

    /// Session carrier backed by the configured session file.
    pub fn session(&self) -> FileSession {
        FileSession::new(&self.config.session_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use oauth_connect::ErrorKind;

    fn state(args: &[&str]) -> AppState {
        let config = Config::try_parse_from(args).unwrap();
        let transport = init_transport(&config).unwrap();
        AppState::new(config, Arc::new(transport))
    }

    #[test]
    fn test_connector_for_configured_provider() {
        let state = state(&[
            "past_connect",
            "--douban-api-key",
            "key",
            "--douban-api-secret",
            "secret",
            "--douban-redirect-uri",
            "http://localhost/connect/douban/callback",
        ]);

        let connector = state.connector(ProviderKind::Douban).unwrap();
        assert_eq!(connector.kind(), ProviderKind::Douban);
    }

    #[test]
    fn test_connector_for_unconfigured_provider() {
        let state = state(&["past_connect"]);
        let err = state.connector(ProviderKind::Twitter).err().unwrap();
        assert_eq!(err.error_kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_session_uses_configured_file() {
        let state = state(&["past_connect", "--session-file", "/tmp/login.json"]);
        assert_eq!(
            state.session().path(),
            std::path::Path::new("/tmp/login.json")
        );
    }
}
