//! Port contracts.
//!
//! A node never decides whether a binding is valid; it resolves the target
//! port and hands the source to that port's `accept_*` method. The traits in
//! this module are the contract every port implementation honors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use pl_core::{Data, NodeId, PortId, SharedData};

/// Selects a port of one kind on a node, by registration index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortKey {
    Index(usize),
    Name(String),
}

impl Default for PortKey {
    /// The default port is always the first one registered.
    fn default() -> Self {
        PortKey::Index(0)
    }
}

impl From<usize> for PortKey {
    fn from(index: usize) -> Self {
        PortKey::Index(index)
    }
}

impl From<&str> for PortKey {
    fn from(name: &str) -> Self {
        PortKey::Name(name.to_string())
    }
}

impl From<String> for PortKey {
    fn from(name: String) -> Self {
        PortKey::Name(name)
    }
}

impl From<&String> for PortKey {
    fn from(name: &String) -> Self {
        PortKey::Name(name.clone())
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKey::Index(i) => write!(f, "#{i}"),
            PortKey::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// What an output hands to an input that binds to it.
///
/// Identifies the output (and the node that owns it) and shares ownership
/// of the output's payload.
#[derive(Clone)]
pub struct OutputLink {
    port: PortId,
    owner: Option<NodeId>,
    data: SharedData,
}

impl OutputLink {
    pub fn new(port: PortId, owner: Option<NodeId>, data: SharedData) -> Self {
        Self { port, owner, data }
    }

    /// Identity of the linked output.
    pub fn port(&self) -> PortId {
        self.port
    }

    /// Node that owns the linked output, once it has been registered.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn data(&self) -> &SharedData {
        &self.data
    }

    /// Returns true if this link was obtained from `output`.
    pub fn points_to(&self, output: &dyn OutputPort) -> bool {
        self.port == output.id()
    }
}

impl PartialEq for OutputLink {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port
            && self.owner == other.owner
            && std::ptr::addr_eq(Arc::as_ptr(&self.data), Arc::as_ptr(&other.data))
    }
}

impl fmt::Debug for OutputLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputLink")
            .field("port", &self.port)
            .field("owner", &self.owner)
            .field("data", &self.data.type_name())
            .finish()
    }
}

/// Binding state of a single input.
#[derive(Debug, Clone, Default)]
pub enum Binding {
    #[default]
    Unbound,
    /// Bound to another node's output.
    Output(OutputLink),
    /// Bound directly to a payload.
    Payload(SharedData),
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        !matches!(self, Binding::Unbound)
    }

    pub fn has_output(&self) -> bool {
        matches!(self, Binding::Output(_))
    }

    pub fn output(&self) -> Option<&OutputLink> {
        match self {
            Binding::Output(link) => Some(link),
            _ => None,
        }
    }

    /// The payload the input currently sees, whichever way it was bound.
    pub fn data(&self) -> Option<&SharedData> {
        match self {
            Binding::Unbound => None,
            Binding::Output(link) => Some(link.data()),
            Binding::Payload(data) => Some(data),
        }
    }
}

/// One of the three things a node input can be bound from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Another node's output.
    Output(OutputLink),
    /// A payload handed in directly.
    Payload(SharedData),
    /// Whatever another input is currently bound to.
    Input(Binding),
}

impl Source {
    /// Bind from a typed payload.
    pub fn payload<T: Data>(data: Arc<T>) -> Self {
        Source::Payload(data)
    }
}

impl From<OutputLink> for Source {
    fn from(link: OutputLink) -> Self {
        Source::Output(link)
    }
}

impl From<&dyn OutputPort> for Source {
    fn from(output: &dyn OutputPort) -> Self {
        Source::Output(output.link())
    }
}

impl From<SharedData> for Source {
    fn from(data: SharedData) -> Self {
        Source::Payload(data)
    }
}

impl From<&dyn InputPort> for Source {
    fn from(input: &dyn InputPort) -> Self {
        Source::Input(input.binding().clone())
    }
}

impl From<Binding> for Source {
    fn from(binding: Binding) -> Self {
        Source::Input(binding)
    }
}

/// Notification sent by a port after its binding state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingEvent {
    /// An input was bound to an output.
    InputSet { output: PortId },
    /// An input was bound directly to a payload.
    InputSetToPayload { data_type: &'static str },
    /// An input was unset.
    InputUnset { was_bound: bool },
    /// A multi-input gained a binding at `position`.
    InputAdded { output: PortId, position: usize },
    /// A multi-input dropped all of its bindings.
    InputsCleared { removed: usize },
}

pub type BindingListener = Box<dyn FnMut(&BindingEvent) + Send>;

#[derive(Default)]
pub(crate) struct Listeners(Vec<BindingListener>);

impl Listeners {
    pub(crate) fn push(&mut self, listener: BindingListener) {
        self.0.push(listener);
    }

    pub(crate) fn notify(&mut self, event: &BindingEvent) {
        for listener in &mut self.0 {
            listener(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener(s)", self.0.len())
    }
}

/// An output port: a query target for any number of inputs.
pub trait OutputPort: Any + fmt::Debug + Send {
    fn id(&self) -> PortId;

    /// Node that owns this output, set once at registration.
    fn owner(&self) -> Option<NodeId>;

    /// Record the owning node. Only the first call has an effect.
    fn set_owning_node(&mut self, node: NodeId);

    /// The output's payload, created on first request.
    fn data(&self) -> SharedData;

    fn data_type_name(&self) -> &'static str;

    fn link(&self) -> OutputLink {
        OutputLink::new(self.id(), self.owner(), self.data())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A single binding slot: unbound, bound to one output, or bound to one
/// payload.
pub trait InputPort: Any + fmt::Debug + Send {
    /// Try to bind to `output`, replacing any prior binding.
    ///
    /// Returns false, leaving the prior binding in place, if the output's
    /// payload is not compatible with this input.
    fn accept_output(&mut self, output: &OutputLink) -> bool;

    /// Try to bind directly to a payload, replacing any prior binding.
    fn accept_payload(&mut self, data: SharedData) -> bool;

    /// Clear any binding. Calling this on an unbound input is a no-op.
    fn unset(&mut self);

    fn binding(&self) -> &Binding;

    fn data_type_name(&self) -> &'static str;

    fn is_bound(&self) -> bool {
        self.binding().is_bound()
    }

    fn has_assigned_output(&self) -> bool {
        self.binding().has_output()
    }

    /// The bound output, if this input is bound to one.
    fn assigned_output(&self) -> Option<&OutputLink> {
        self.binding().output()
    }

    /// Shared handle to the payload this input sees.
    ///
    /// Set both when bound to a payload and when bound to an output.
    fn assigned_payload(&self) -> Option<SharedData> {
        self.binding().data().cloned()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A growable, ordered set of output bindings under one port.
pub trait MultiInputPort: Any + fmt::Debug + Send {
    /// Append a binding to `output`. Existing bindings are never replaced.
    fn accept_output(&mut self, output: &OutputLink) -> bool;

    /// Drop every binding of this multi-input.
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn links(&self) -> Vec<&OutputLink>;

    fn data_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
