use crate::intent::encode_inform;
use crate::surface::{ItemId, SidebarSurface, canonical_label};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport rejected message: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Outbound capability used by the relay to reach the backend.
///
/// `send` must hand the text over before returning. The relay never inspects
/// what happens afterwards; an `Err` is propagated to the relay's caller.
pub trait Transport {
    fn send(&mut self, text: &str) -> Result<(), TransportError>;
}

/// Transport that records notifications in send order so they can be
/// forwarded asynchronously once the relay call has returned.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pending: Vec<String>,
}

impl Outbox {
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl Transport for Outbox {
    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.pending.push(text.to_string());
        Ok(())
    }
}

/// The certificate currently selected in a relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected_certificate: Option<String>,
}

/// Turns sidebar activations into inform notifications and lets preset
/// messages re-assert the last selection before they go out.
#[derive(Debug)]
pub struct SelectionRelay<T> {
    state: SelectionState,
    bindings: Vec<ItemId>,
    transport: T,
}

impl<T: Transport> SelectionRelay<T> {
    pub fn new(transport: T) -> Self {
        Self {
            state: SelectionState::default(),
            bindings: Vec::new(),
            transport,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.state.selected_certificate.as_deref()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Items with at least one handler attached, sorted by position.
    pub fn registered_items(&self) -> Vec<ItemId> {
        let mut items = self.bindings.clone();
        items.sort_unstable();
        items.dedup();
        items
    }

    /// Attach one activation handler to every item currently on `surface`.
    ///
    /// Items added to the surface afterwards are not covered. Registering the
    /// same surface again attaches a second handler per item.
    pub fn register_sidebar<S: SidebarSurface + ?Sized>(&mut self, surface: &S) {
        let items = surface.sidebar_items();
        debug!(count = items.len(), "registering sidebar handlers");
        self.bindings.extend(items);
    }

    /// Deliver an activation of `item`. Every handler bound to the item fires
    /// in registration order; returns how many fired.
    pub fn activate<S: SidebarSurface + ?Sized>(
        &mut self,
        surface: &S,
        item: ItemId,
    ) -> Result<usize, RelayError> {
        let handlers = self.bindings.iter().filter(|bound| **bound == item).count();
        for _ in 0..handlers {
            let text = surface.item_text(item).unwrap_or_default();
            let label = canonical_label(&text).to_string();
            debug!(%item, %label, "sidebar item activated");
            self.select_certificate(label)?;
        }
        Ok(handlers)
    }

    /// Record `name` as the selection and send its inform notification.
    pub fn select_certificate(&mut self, name: impl Into<String>) -> Result<(), RelayError> {
        let name = name.into();
        let notification = encode_inform(&name);
        self.state.selected_certificate = Some(name);
        self.transport.send(&notification)?;
        Ok(())
    }

    /// Send `message`, preceded by the inform for the current selection if any.
    pub fn send_preset(&mut self, message: &str) -> Result<(), RelayError> {
        if let Some(selected) = &self.state.selected_certificate {
            let notification = encode_inform(selected);
            self.transport.send(&notification)?;
        }
        self.transport.send(message)?;
        Ok(())
    }
}
