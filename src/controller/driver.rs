//! Controller driver.
//!
//! Attaches an `InjectionController` to a surface and a selection topic. One
//! tokio task consumes both selection messages and surface navigation events
//! and feeds them to the controller one at a time.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::channel::{SelectionBus, SelectionMessage, Subscription};
use crate::surface::{Surface, SurfaceEvent};

use super::InjectionController;

/// A live controller attachment.
///
/// Dropping it unsubscribes from the selection topic; the driver task then
/// detaches the controller and exits. `detach` does the same and waits for
/// the task.
#[derive(Debug)]
pub struct Attachment {
    controller: Arc<InjectionController>,
    subscription: Subscription<SelectionMessage>,
    task: JoinHandle<()>,
}

/// Bind `surface` to `controller` and route selections published on `topic`
/// to it. Must be called from within a tokio runtime.
pub async fn attach(
    controller: Arc<InjectionController>,
    bus: &SelectionBus,
    topic: &str,
    surface: Arc<dyn Surface>,
) -> Attachment {
    let events = surface.subscribe_events();
    controller.bind(surface).await;

    let (tx, rx) = mpsc::unbounded_channel::<SelectionMessage>();
    let subscription = bus.subscribe(topic, move |msg: &SelectionMessage| {
        // Fails only after the driver has exited.
        let _ = tx.send(msg.clone());
    });
    debug!(topic, subscription = %subscription.id(), "controller attached");

    let task = tokio::spawn(drive(Arc::clone(&controller), rx, events));

    Attachment {
        controller,
        subscription,
        task,
    }
}

impl Attachment {
    /// The attached controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<InjectionController> {
        &self.controller
    }

    /// The selection-topic subscription feeding the driver.
    #[must_use]
    pub fn subscription(&self) -> &Subscription<SelectionMessage> {
        &self.subscription
    }

    /// Unsubscribe and wait until the driver has detached the controller.
    pub async fn detach(self) {
        let Self {
            controller,
            subscription,
            task,
        } = self;
        drop(subscription);
        if let Err(err) = task.await {
            warn!(error = %err, "controller driver ended abnormally");
            controller.detach().await;
        }
    }
}

async fn drive(
    controller: Arc<InjectionController>,
    mut selections: mpsc::UnboundedReceiver<SelectionMessage>,
    events: broadcast::Receiver<SurfaceEvent>,
) {
    let mut events = Some(events);

    loop {
        tokio::select! {
            msg = selections.recv() => {
                let Some(msg) = msg else { break };
                controller.select(msg.simulation.as_deref()).await;
            }
            event = next_event(&mut events), if events.is_some() => {
                match event {
                    Ok(SurfaceEvent::DidNavigate { url, .. }) => {
                        debug!(url = %url, "surface navigated");
                        controller.on_navigate().await;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "navigation events lagged; resyncing");
                        controller.resync().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("surface event stream closed; detaching");
                        events = None;
                        controller.detach().await;
                    }
                }
            }
        }
    }

    controller.detach().await;
    debug!("controller driver stopped");
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<SurfaceEvent>>,
) -> Result<SurfaceEvent, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
