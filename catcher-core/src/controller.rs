//! The capture state and the allow/cancel decision made for every subscribed
//! request.

use serde::Serialize;
use tracing::{debug, info};

use crate::badge::Badge;
use crate::capabilities::Capabilities;
use crate::classifier::{classify, RequestDescriptor};
use crate::protocol::{Message, Snapshot};
use crate::registry::{CaptureRegistry, CapturedRequest};
use crate::session::NavigationEvent;
use crate::settings::Settings;

/// What the network layer should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Let the request through unmodified
    Allow,
    /// Abort the request before it is sent
    Cancel,
}

impl Decision {
    fn for_capture(use_blocking: bool) -> Self {
        if use_blocking {
            Decision::Cancel
        } else {
            Decision::Allow
        }
    }
}

/// Counters describing what the controller has seen this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InterceptStats {
    pub inspected: u64,
    pub classified: u64,
    pub captured: u64,
    pub repeats: u64,
    pub cancelled: u64,
    pub resets: u64,
}

/// Owner of the capture registry, settings and badge.
///
/// Every mutation goes through one of the methods here; nothing hands out
/// mutable access to the underlying collections.
#[derive(Debug)]
pub struct InterceptController {
    registry: CaptureRegistry,
    settings: Settings,
    badge: Badge,
    stats: InterceptStats,
}

impl InterceptController {
    pub fn new(settings: Settings, capabilities: Capabilities) -> Self {
        Self {
            registry: CaptureRegistry::new(),
            settings,
            badge: Badge::new(&capabilities),
            stats: InterceptStats::default(),
        }
    }

    /// Decide a subscribed request.
    ///
    /// A URL already captured returns straight away without being classified
    /// again. A new media URL is recorded with its headers and bumps the badge.
    pub fn intercept(&mut self, request: &RequestDescriptor) -> Decision {
        self.stats.inspected += 1;

        if self.registry.has(&request.url) {
            self.stats.repeats += 1;
            debug!("Repeat of captured request {}", request.url);
            return self.record(Decision::for_capture(self.settings.use_blocking));
        }

        self.stats.classified += 1;
        let Some(mime_type) = classify(request) else {
            return Decision::Allow;
        };

        let captured = CapturedRequest::new(request.url.clone(), mime_type, &request.headers);
        self.registry.insert(request.url.clone(), captured);
        self.badge.set_count(self.registry.count());
        self.stats.captured += 1;
        info!(
            "Captured [{}] {} ({} total)",
            request.resource_type,
            request.url,
            self.registry.count()
        );

        self.record(Decision::for_capture(self.settings.use_blocking))
    }

    fn record(&mut self, decision: Decision) -> Decision {
        if decision == Decision::Cancel {
            self.stats.cancelled += 1;
        }
        decision
    }

    /// Reset captures on a real page navigation. Returns whether a reset
    /// happened.
    pub fn navigate(&mut self, event: &NavigationEvent) -> bool {
        if !event.is_page_navigation() {
            debug!("Ignoring navigation event {:?}", event.url);
            return false;
        }
        info!(
            "Navigation to {} clears {} captures",
            event.url.as_deref().unwrap_or_default(),
            self.registry.count()
        );
        self.clear();
        self.stats.resets += 1;
        true
    }

    /// Handle a cross-context message. Only `get.everything` has a reply.
    pub fn handle_message(&mut self, message: Message) -> Option<Snapshot> {
        match message {
            Message::GetEverything => Some(self.snapshot()),
            Message::ClearRequests => {
                info!("Clearing {} captures on request", self.registry.count());
                self.clear();
                None
            }
            Message::SetSettings(data) => {
                let applied = self.settings.apply_update(&data);
                if !applied.is_empty() {
                    info!("Settings updated: {}", applied.join(", "));
                }
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.badge.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            captured_requests: self.registry.clone(),
            settings: self.settings.clone(),
        }
    }

    pub fn lookup(&self, url: &str) -> Option<CapturedRequest> {
        self.registry.get(url).cloned()
    }

    pub fn registry(&self) -> &CaptureRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn badge(&self) -> &Badge {
        &self.badge
    }

    pub fn stats(&self) -> InterceptStats {
        self.stats
    }
}
