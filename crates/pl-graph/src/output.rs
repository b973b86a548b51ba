//! Typed output port.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use pl_core::{Data, NodeId, PortId, SharedData};
use tracing::{debug, trace};

use crate::port::{OutputPort, Source};

/// Output producing payloads of type `T`.
///
/// The payload is created on first request (typically when the first input
/// binds) and then shared with every bound input.
pub struct Output<T: Data> {
    id: PortId,
    owner: Option<NodeId>,
    data: OnceLock<Arc<T>>,
    factory: Option<fn() -> T>,
}

impl<T: Data + Default> Output<T> {
    /// Output whose payload is `T::default()`, created lazily.
    pub fn new() -> Self {
        Self::with_factory(T::default)
    }
}

impl<T: Data + Default> Default for Output<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Data> Output<T> {
    /// Output whose payload is produced by `factory` on first request.
    pub fn with_factory(factory: fn() -> T) -> Self {
        Self {
            id: PortId::new(),
            owner: None,
            data: OnceLock::new(),
            factory: Some(factory),
        }
    }

    /// Output holding `value` from the start.
    pub fn with_data(value: T) -> Self {
        Self {
            id: PortId::new(),
            owner: None,
            data: OnceLock::from(Arc::new(value)),
            factory: None,
        }
    }

    /// Returns true once the payload exists.
    pub fn is_created(&self) -> bool {
        self.data.get().is_some()
    }

    /// Typed handle to the payload, creating it if needed.
    pub fn get(&self) -> Arc<T> {
        let data = self.data.get_or_init(|| {
            let factory = self
                .factory
                .expect("an output without initial data always has a factory");
            trace!(port = %self.id, data_type = std::any::type_name::<T>(), "creating output data");
            Arc::new(factory())
        });
        Arc::clone(data)
    }

    /// Mutable access to the payload while no input shares it.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.get();
        self.data.get_mut().and_then(Arc::get_mut)
    }
}

impl<T: Data> OutputPort for Output<T> {
    fn id(&self) -> PortId {
        self.id
    }

    fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    fn set_owning_node(&mut self, node: NodeId) {
        match self.owner {
            None => self.owner = Some(node),
            Some(owner) => {
                debug!(port = %self.id, %owner, rejected = %node, "output already owned; keeping first owner");
            }
        }
    }

    fn data(&self) -> SharedData {
        self.get()
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

impl<T: Data> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("data_type", &std::any::type_name::<T>())
            .field("created", &self.is_created())
            .finish()
    }
}

impl<T: Data> From<&Output<T>> for Source {
    fn from(output: &Output<T>) -> Self {
        Source::Output(output.link())
    }
}
