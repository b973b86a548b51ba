//! Incremental node builder.

use pl_core::{NodeId, PlResult, PortKind};
use tracing::trace;

use crate::config::RegistryConfig;
use crate::node::ProcessNode;
use crate::port::{InputPort, MultiInputPort, OutputPort};
use crate::registry::PortTable;
use crate::validate;

/// Builder for a [`ProcessNode`].
///
/// Register ports with `register_*`, then call `build()` to validate the
/// registrations and freeze them into a node. A built node has no
/// registration API.
#[derive(Debug)]
pub struct NodeBuilder {
    name: String,
    config: RegistryConfig,
    inputs: Vec<(String, Box<dyn InputPort>)>,
    multi_inputs: Vec<(String, Box<dyn MultiInputPort>)>,
    outputs: Vec<(String, Box<dyn OutputPort>)>,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: RegistryConfig::default(),
            inputs: Vec::new(),
            multi_inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a single input under `name` and return its index.
    pub fn register_input(&mut self, name: impl Into<String>, port: impl InputPort) -> usize {
        let port: Box<dyn InputPort> = Box::new(port);
        Self::push(&mut self.inputs, name.into(), port, PortKind::Input)
    }

    /// Register a multi-input under `name` and return its index.
    pub fn register_inputs(
        &mut self,
        name: impl Into<String>,
        port: impl MultiInputPort,
    ) -> usize {
        let port: Box<dyn MultiInputPort> = Box::new(port);
        Self::push(&mut self.multi_inputs, name.into(), port, PortKind::MultiInput)
    }

    /// Register an output under `name` and return its index.
    ///
    /// The output's owning node is set when the node is built.
    pub fn register_output(&mut self, name: impl Into<String>, port: impl OutputPort) -> usize {
        let port: Box<dyn OutputPort> = Box::new(port);
        Self::push(&mut self.outputs, name.into(), port, PortKind::Output)
    }

    fn push<P: ?Sized>(
        ports: &mut Vec<(String, Box<P>)>,
        name: String,
        port: Box<P>,
        kind: PortKind,
    ) -> usize {
        let index = ports.len();
        trace!(%kind, name = %name, index, "registering port");
        ports.push((name, port));
        index
    }

    /// Validate the registrations and freeze them into a node with id `id`.
    pub fn build(self, id: NodeId) -> PlResult<ProcessNode> {
        let policy = self.config.duplicate_names;
        validate::validate_names(
            PortKind::Input,
            self.inputs.iter().map(|(n, _)| n.as_str()),
            policy,
        )?;
        validate::validate_names(
            PortKind::MultiInput,
            self.multi_inputs.iter().map(|(n, _)| n.as_str()),
            policy,
        )?;
        validate::validate_names(
            PortKind::Output,
            self.outputs.iter().map(|(n, _)| n.as_str()),
            policy,
        )?;

        let mut inputs = PortTable::new(PortKind::Input);
        for (name, port) in self.inputs {
            inputs.insert(name, port, policy)?;
        }

        let mut multi_inputs = PortTable::new(PortKind::MultiInput);
        for (name, port) in self.multi_inputs {
            multi_inputs.insert(name, port, policy)?;
        }

        let mut outputs = PortTable::new(PortKind::Output);
        for (name, mut port) in self.outputs {
            port.set_owning_node(id);
            outputs.insert(name, port, policy)?;
        }

        trace!(
            node = %id,
            name = %self.name,
            inputs = inputs.len(),
            multi_inputs = multi_inputs.len(),
            outputs = outputs.len(),
            "node built"
        );
        Ok(ProcessNode::from_parts(
            id,
            self.name,
            inputs,
            multi_inputs,
            outputs,
        ))
    }
}
