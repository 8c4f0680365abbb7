use crate::{
    admin::{start_admin_server, AdminState},
    ca::CertificateAuthority,
    capabilities::Capabilities,
    config::CatcherConfig,
    controller::InterceptController,
    error::CatcherError,
    handlers::CatchHandler,
    player::PlayerClient,
    service::{CaptureService, CatcherHandle},
    Result,
};
use hudsucker::{certificate_authority::RcgenAuthority, rustls, ProxyBuilder};
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};

const CERT_CACHE_SIZE: u64 = 1000;

pub struct ProxyServer {
    config: CatcherConfig,
    ca: CertificateAuthority,
    catcher: CatcherHandle,
}

impl ProxyServer {
    /// Build the server and start the capture service that backs it.
    pub fn new(config: CatcherConfig, ca: CertificateAuthority) -> Self {
        let capabilities = Capabilities::for_platform(config.platform);
        let controller = InterceptController::new(config.initial_settings(), capabilities);
        let catcher = CaptureService::spawn(controller);
        Self { config, ca, catcher }
    }

    /// Handle to the capture service, for callers that run beside the proxy.
    pub fn handle(&self) -> CatcherHandle {
        self.catcher.clone()
    }

    pub async fn run(self) -> Result<()> {
        let ip: IpAddr = self.config.listen_address.parse().map_err(|e| {
            CatcherError::Configuration(format!(
                "Invalid listen address {}: {}",
                self.config.listen_address, e
            ))
        })?;
        let addr = SocketAddr::new(ip, self.config.listen_port);
        info!("Starting proxy server on {}", addr);

        let capabilities = Capabilities::for_platform(self.config.platform);
        info!(
            "Platform {:?}: badge text colour {}, extra headers flag {}",
            self.config.platform,
            capabilities.supports_badge_text_color,
            capabilities.requires_extra_headers_flag
        );

        let admin_addr = SocketAddr::new(ip, self.config.admin_port);
        let admin_state = AdminState::new(self.catcher.clone(), PlayerClient::new());
        tokio::spawn(async move {
            if let Err(e) = start_admin_server(admin_addr, admin_state).await {
                error!("Admin server failed: {}", e);
            }
        });

        let private_key = rustls::PrivateKey(self.ca.key_der());
        let ca_cert = rustls::Certificate(self.ca.cert_der()?);
        let authority = RcgenAuthority::new(private_key, ca_cert, CERT_CACHE_SIZE).map_err(|e| {
            CatcherError::Certificate(format!("Failed to create CA authority: {}", e))
        })?;

        let proxy = ProxyBuilder::new()
            .with_addr(addr)
            .with_rustls_client()
            .with_ca(authority)
            .with_http_handler(CatchHandler::new(self.catcher))
            .build();

        proxy
            .start(std::future::pending::<()>())
            .await
            .map_err(|e| CatcherError::Network(format!("Proxy failed: {}", e)))?;

        Ok(())
    }
}
