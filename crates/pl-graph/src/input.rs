//! Typed single input.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use pl_core::{Data, SharedData, downcast_shared};
use tracing::{debug, trace};

use crate::port::{Binding, BindingEvent, InputPort, Listeners, OutputLink, Source};

/// Input accepting payloads of type `T`.
///
/// Compatibility is decided by the payload's concrete type: an output or
/// payload is accepted iff it holds a `T`.
pub struct Input<T: Data> {
    binding: Binding,
    data: Option<Arc<T>>,
    listeners: Listeners,
}

impl<T: Data> Input<T> {
    pub fn new() -> Self {
        Self {
            binding: Binding::Unbound,
            data: None,
            listeners: Listeners::default(),
        }
    }

    /// Typed handle to the payload this input currently sees.
    pub fn get(&self) -> Option<Arc<T>> {
        self.data.clone()
    }

    /// Borrow the payload this input currently sees.
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Register a callback run after every change of this input's binding.
    pub fn on_binding(&mut self, listener: impl FnMut(&BindingEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn rejected(&self, offered: &'static str) -> bool {
        debug!(
            expected = std::any::type_name::<T>(),
            offered, "input rejected incompatible data"
        );
        false
    }
}

impl<T: Data> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Data> InputPort for Input<T> {
    fn accept_output(&mut self, output: &OutputLink) -> bool {
        trace!(port = %output.port(), "input trying to accept output");

        let Some(data) = downcast_shared::<T>(output.data()) else {
            return self.rejected(output.data().type_name());
        };

        self.data = Some(data);
        self.binding = Binding::Output(output.clone());
        self.listeners.notify(&BindingEvent::InputSet {
            output: output.port(),
        });
        true
    }

    fn accept_payload(&mut self, data: SharedData) -> bool {
        trace!(data_type = data.type_name(), "input trying to accept payload");

        let Some(typed) = downcast_shared::<T>(&data) else {
            return self.rejected(data.type_name());
        };

        let data_type = data.type_name();
        self.data = Some(typed);
        self.binding = Binding::Payload(data);
        self.listeners
            .notify(&BindingEvent::InputSetToPayload { data_type });
        true
    }

    fn unset(&mut self) {
        let was_bound = self.binding.is_bound();
        self.data = None;
        self.binding = Binding::Unbound;
        trace!(was_bound, "input unset");
        self.listeners.notify(&BindingEvent::InputUnset { was_bound });
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn data_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: Data> fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("data_type", &std::any::type_name::<T>())
            .field("binding", &self.binding)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<T: Data> From<&Input<T>> for Source {
    fn from(input: &Input<T>) -> Self {
        Source::Input(input.binding().clone())
    }
}
