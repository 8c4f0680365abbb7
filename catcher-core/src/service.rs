//! Single task that owns the capture state.
//!
//! The proxy handler and the admin API never share the controller. They send
//! commands through a [`CatcherHandle`] and wait for the reply on a oneshot
//! channel. Commands are handled one at a time, in the order received, so no
//! state transition can interleave with another.

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::badge::Badge;
use crate::classifier::RequestDescriptor;
use crate::controller::{Decision, InterceptController, InterceptStats};
use crate::error::CatcherError;
use crate::protocol::{Message, Snapshot};
use crate::registry::CapturedRequest;
use crate::session::NavigationEvent;
use crate::settings::Settings;
use crate::Result;

const COMMAND_BUFFER: usize = 1024;

#[derive(Debug)]
enum Command {
    Intercept {
        request: RequestDescriptor,
        reply: oneshot::Sender<Decision>,
    },
    Navigate {
        event: NavigationEvent,
        reply: oneshot::Sender<bool>,
    },
    Message {
        message: Message,
        reply: oneshot::Sender<Option<Snapshot>>,
    },
    Lookup {
        url: String,
        reply: oneshot::Sender<Option<CapturedRequest>>,
    },
    Settings {
        reply: oneshot::Sender<Settings>,
    },
    Badge {
        reply: oneshot::Sender<Badge>,
    },
    Stats {
        reply: oneshot::Sender<InterceptStats>,
    },
}

pub struct CaptureService {
    controller: InterceptController,
    receiver: mpsc::Receiver<Command>,
}

impl CaptureService {
    pub fn new(controller: InterceptController) -> (Self, CatcherHandle) {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        (Self { controller, receiver }, CatcherHandle { sender })
    }

    /// Start the service on the current runtime and return a handle to it.
    pub fn spawn(controller: InterceptController) -> CatcherHandle {
        let (service, handle) = Self::new(controller);
        tokio::spawn(service.run());
        handle
    }

    /// Process commands until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            self.dispatch(command);
        }
        info!("Capture service stopped");
    }

    fn dispatch(&mut self, command: Command) {
        // A dropped receiver only means the caller stopped waiting.
        match command {
            Command::Intercept { request, reply } => {
                let _ = reply.send(self.controller.intercept(&request));
            }
            Command::Navigate { event, reply } => {
                let _ = reply.send(self.controller.navigate(&event));
            }
            Command::Message { message, reply } => {
                let _ = reply.send(self.controller.handle_message(message));
            }
            Command::Lookup { url, reply } => {
                let _ = reply.send(self.controller.lookup(&url));
            }
            Command::Settings { reply } => {
                let _ = reply.send(self.controller.settings().clone());
            }
            Command::Badge { reply } => {
                let _ = reply.send(self.controller.badge().clone());
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.controller.stats());
            }
        }
    }
}

/// Cloneable access point to the capture service.
#[derive(Debug, Clone)]
pub struct CatcherHandle {
    sender: mpsc::Sender<Command>,
}

impl CatcherHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| CatcherError::ServiceUnavailable)?;
        rx.await.map_err(|_| CatcherError::ServiceUnavailable)
    }

    /// Decide a subscribed request. Falls back to `Allow` if the service is
    /// gone so live traffic is never held up.
    pub async fn intercept(&self, request: RequestDescriptor) -> Decision {
        match self
            .request(|reply| Command::Intercept { request, reply })
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Interception unavailable, allowing request: {}", e);
                Decision::Allow
            }
        }
    }

    pub async fn navigate(&self, event: NavigationEvent) -> Result<bool> {
        self.request(|reply| Command::Navigate { event, reply }).await
    }

    pub async fn send_message(&self, message: Message) -> Result<Option<Snapshot>> {
        self.request(|reply| Command::Message { message, reply }).await
    }

    pub async fn get_everything(&self) -> Result<Snapshot> {
        self.send_message(Message::GetEverything)
            .await?
            .ok_or(CatcherError::ServiceUnavailable)
    }

    pub async fn lookup(&self, url: impl Into<String>) -> Result<Option<CapturedRequest>> {
        let url = url.into();
        self.request(|reply| Command::Lookup { url, reply }).await
    }

    pub async fn settings(&self) -> Result<Settings> {
        self.request(|reply| Command::Settings { reply }).await
    }

    pub async fn badge(&self) -> Result<Badge> {
        self.request(|reply| Command::Badge { reply }).await
    }

    pub async fn stats(&self) -> Result<InterceptStats> {
        self.request(|reply| Command::Stats { reply }).await
    }
}
