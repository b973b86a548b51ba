//! Node arena.
//!
//! Nodes live in a `Pipeline` and are addressed by their [`NodeId`]. Output
//! links record the id of the node that owns the output, so "which node
//! produced this" is answered by an arena lookup instead of a back pointer.

use pl_core::{NodeId, SharedData};
use tracing::debug;

use crate::builder::NodeBuilder;
use crate::config::RegistryConfig;
use crate::error::{GraphError, GraphResult};
use crate::node::ProcessNode;
use crate::port::{OutputLink, OutputPort, PortKey, Source};

#[derive(Debug, Default)]
pub struct Pipeline {
    config: RegistryConfig,
    nodes: Vec<ProcessNode>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline whose nodes are all built with `config`.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Build `builder` under this pipeline's configuration and store the
    /// node. Returns the id of the new node.
    pub fn add_node(&mut self, builder: NodeBuilder) -> GraphResult<NodeId> {
        let id = NodeId::from_index(self.nodes.len() as u32);
        let node = builder.with_config(self.config.clone()).build(id)?;
        debug!(node = %id, name = node.name(), "node added");
        self.nodes.push(node);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&ProcessNode> {
        self.nodes
            .get(id.index() as usize)
            .ok_or(GraphError::NoSuchNode { node: id })
    }

    pub fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut ProcessNode> {
        self.nodes
            .get_mut(id.index() as usize)
            .ok_or(GraphError::NoSuchNode { node: id })
    }

    pub fn nodes(&self) -> &[ProcessNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bind input `input` of `to` to output `output` of `from`.
    pub fn connect(
        &mut self,
        from: NodeId,
        output: impl Into<PortKey>,
        to: NodeId,
        input: impl Into<PortKey>,
    ) -> GraphResult<bool> {
        let link = self.node(from)?.output(output)?.link();
        Ok(self.node_mut(to)?.set_input(input, link)?)
    }

    /// Append output `output` of `from` to multi-input `multi_input` of `to`.
    pub fn attach(
        &mut self,
        from: NodeId,
        output: impl Into<PortKey>,
        to: NodeId,
        multi_input: impl Into<PortKey>,
    ) -> GraphResult<bool> {
        let link = self.node(from)?.output(output)?.link();
        Ok(self.node_mut(to)?.add_input(multi_input, link)?)
    }

    /// Bind input `input` of `to` to whatever input `source` of `from` is
    /// currently bound to. `from` and `to` may be the same node.
    pub fn forward(
        &mut self,
        from: NodeId,
        source: impl Into<PortKey>,
        to: NodeId,
        input: impl Into<PortKey>,
    ) -> GraphResult<bool> {
        let snapshot = Source::from(self.node(from)?.input(source)?);
        Ok(self.node_mut(to)?.set_input(input, snapshot)?)
    }

    pub fn set_payload(
        &mut self,
        to: NodeId,
        input: impl Into<PortKey>,
        data: SharedData,
    ) -> GraphResult<bool> {
        Ok(self.node_mut(to)?.set_input(input, data)?)
    }

    pub fn disconnect(&mut self, to: NodeId, input: impl Into<PortKey>) -> GraphResult<()> {
        Ok(self.node_mut(to)?.unset_input(input)?)
    }

    pub fn clear_inputs(&mut self, to: NodeId, multi_input: impl Into<PortKey>) -> GraphResult<()> {
        Ok(self.node_mut(to)?.clear_inputs(multi_input)?)
    }

    /// The node owning the output `link` points to.
    ///
    /// `None` if the output was never registered with a node, or belongs to
    /// a node of some other pipeline.
    pub fn producer(&self, link: &OutputLink) -> Option<&ProcessNode> {
        let node = self.nodes.get(link.owner()?.index() as usize)?;
        node.outputs()
            .any(|(_, output)| output.id() == link.port())
            .then_some(node)
    }
}
