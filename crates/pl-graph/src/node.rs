//! Process node: a frozen port registry plus the binding operations.
//!
//! Every binding operation resolves its target port through the registry and
//! hands the source to the port. Whether the binding is valid is decided by
//! the port; the node only reports the outcome.

use std::any::type_name;

use pl_core::{NodeId, PlError, PlResult, PortKind};
use tracing::{debug, trace};

use crate::port::{Binding, InputPort, MultiInputPort, OutputPort, PortKey, Source};
use crate::registry::PortTable;

#[derive(Debug)]
pub struct ProcessNode {
    id: NodeId,
    name: String,
    inputs: PortTable<dyn InputPort>,
    multi_inputs: PortTable<dyn MultiInputPort>,
    outputs: PortTable<dyn OutputPort>,
}

fn mismatch<P>(kind: PortKind, index: usize) -> PlError {
    PlError::PortTypeMismatch {
        kind,
        index,
        expected: type_name::<P>(),
    }
}

impl ProcessNode {
    pub(crate) fn from_parts(
        id: NodeId,
        name: String,
        inputs: PortTable<dyn InputPort>,
        multi_inputs: PortTable<dyn MultiInputPort>,
        outputs: PortTable<dyn OutputPort>,
    ) -> Self {
        Self {
            id,
            name,
            inputs,
            multi_inputs,
            outputs,
        }
    }

    /// Slot of this node in its pipeline.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self, key: impl Into<PortKey>) -> PlResult<&dyn InputPort> {
        self.inputs.get(&key.into())
    }

    pub fn first_input(&self) -> PlResult<&dyn InputPort> {
        self.inputs.get(&PortKey::default())
    }

    pub fn input_mut(
        &mut self,
        key: impl Into<PortKey>,
    ) -> PlResult<&mut (dyn InputPort + 'static)> {
        self.inputs.get_mut(&key.into())
    }

    pub fn multi_input(&self, key: impl Into<PortKey>) -> PlResult<&dyn MultiInputPort> {
        self.multi_inputs.get(&key.into())
    }

    pub fn first_multi_input(&self) -> PlResult<&dyn MultiInputPort> {
        self.multi_inputs.get(&PortKey::default())
    }

    pub fn multi_input_mut(
        &mut self,
        key: impl Into<PortKey>,
    ) -> PlResult<&mut (dyn MultiInputPort + 'static)> {
        self.multi_inputs.get_mut(&key.into())
    }

    pub fn output(&self, key: impl Into<PortKey>) -> PlResult<&dyn OutputPort> {
        self.outputs.get(&key.into())
    }

    pub fn first_output(&self) -> PlResult<&dyn OutputPort> {
        self.outputs.get(&PortKey::default())
    }

    pub fn output_mut(
        &mut self,
        key: impl Into<PortKey>,
    ) -> PlResult<&mut (dyn OutputPort + 'static)> {
        self.outputs.get_mut(&key.into())
    }

    /// Look up an input and downcast it to its concrete port type.
    ///
    /// ```
    /// use pl_core::{Id, Wrap};
    /// use pl_graph::{Input, NodeBuilder};
    ///
    /// let mut builder = NodeBuilder::new("threshold");
    /// builder.register_input("level", Input::<Wrap<f32>>::new());
    /// let node = builder.build(Id::from_index(0)).unwrap();
    ///
    /// assert!(node.input_as::<Input<Wrap<f32>>>("level").is_ok());
    /// assert!(node.input_as::<Input<Wrap<u8>>>("level").is_err());
    /// ```
    pub fn input_as<P: InputPort>(&self, key: impl Into<PortKey>) -> PlResult<&P> {
        let index = self.inputs.position(&key.into())?;
        self.inputs
            .get(&PortKey::Index(index))?
            .as_any()
            .downcast_ref::<P>()
            .ok_or_else(|| mismatch::<P>(PortKind::Input, index))
    }

    pub fn input_as_mut<P: InputPort>(&mut self, key: impl Into<PortKey>) -> PlResult<&mut P> {
        let index = self.inputs.position(&key.into())?;
        self.inputs
            .get_mut(&PortKey::Index(index))?
            .as_any_mut()
            .downcast_mut::<P>()
            .ok_or_else(|| mismatch::<P>(PortKind::Input, index))
    }

    pub fn multi_input_as<P: MultiInputPort>(&self, key: impl Into<PortKey>) -> PlResult<&P> {
        let index = self.multi_inputs.position(&key.into())?;
        self.multi_inputs
            .get(&PortKey::Index(index))?
            .as_any()
            .downcast_ref::<P>()
            .ok_or_else(|| mismatch::<P>(PortKind::MultiInput, index))
    }

    pub fn multi_input_as_mut<P: MultiInputPort>(
        &mut self,
        key: impl Into<PortKey>,
    ) -> PlResult<&mut P> {
        let index = self.multi_inputs.position(&key.into())?;
        self.multi_inputs
            .get_mut(&PortKey::Index(index))?
            .as_any_mut()
            .downcast_mut::<P>()
            .ok_or_else(|| mismatch::<P>(PortKind::MultiInput, index))
    }

    pub fn output_as<P: OutputPort>(&self, key: impl Into<PortKey>) -> PlResult<&P> {
        let index = self.outputs.position(&key.into())?;
        self.outputs
            .get(&PortKey::Index(index))?
            .as_any()
            .downcast_ref::<P>()
            .ok_or_else(|| mismatch::<P>(PortKind::Output, index))
    }

    pub fn output_as_mut<P: OutputPort>(&mut self, key: impl Into<PortKey>) -> PlResult<&mut P> {
        let index = self.outputs.position(&key.into())?;
        self.outputs
            .get_mut(&PortKey::Index(index))?
            .as_any_mut()
            .downcast_mut::<P>()
            .ok_or_else(|| mismatch::<P>(PortKind::Output, index))
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn multi_input_count(&self) -> usize {
        self.multi_inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.names()
    }

    pub fn multi_input_names(&self) -> impl Iterator<Item = &str> {
        self.multi_inputs.names()
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.names()
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &(dyn OutputPort + 'static))> {
        self.outputs.iter()
    }

    /// Bind a single input from `source`.
    ///
    /// A `Source::Input` forwards whatever the foreign input was bound to: its
    /// output if it had one, its payload otherwise. Returns `Ok(false)` if the
    /// port refused the source or the foreign input was unbound.
    pub fn set_input(
        &mut self,
        key: impl Into<PortKey>,
        source: impl Into<Source>,
    ) -> PlResult<bool> {
        let key = key.into();
        let node = self.id;
        let input = self.inputs.get_mut(&key)?;

        let accepted = match source.into() {
            Source::Output(link) | Source::Input(Binding::Output(link)) => {
                input.accept_output(&link)
            }
            Source::Payload(data) | Source::Input(Binding::Payload(data)) => {
                input.accept_payload(data)
            }
            Source::Input(Binding::Unbound) => {
                debug!(%node, input = %key, "cannot forward from an unbound input");
                false
            }
        };

        trace!(%node, input = %key, accepted, "set input");
        Ok(accepted)
    }

    /// Same as `set_input(0, source)`.
    pub fn set_first_input(&mut self, source: impl Into<Source>) -> PlResult<bool> {
        self.set_input(PortKey::default(), source)
    }

    pub fn unset_input(&mut self, key: impl Into<PortKey>) -> PlResult<()> {
        let key = key.into();
        self.inputs.get_mut(&key)?.unset();
        trace!(node = %self.id, input = %key, "unset input");
        Ok(())
    }

    pub fn unset_first_input(&mut self) -> PlResult<()> {
        self.unset_input(PortKey::default())
    }

    /// Append a binding to a multi-input.
    ///
    /// Multi-inputs bind to outputs only. A payload, or a foreign input that
    /// is not bound to an output, yields `Ok(false)` before the target is
    /// resolved and changes nothing.
    pub fn add_input(
        &mut self,
        key: impl Into<PortKey>,
        source: impl Into<Source>,
    ) -> PlResult<bool> {
        let key = key.into();
        let node = self.id;

        let link = match source.into() {
            Source::Output(link) | Source::Input(Binding::Output(link)) => link,
            Source::Payload(_) | Source::Input(_) => {
                debug!(%node, multi_input = %key, "multi-inputs only bind to outputs");
                return Ok(false);
            }
        };

        let accepted = self.multi_inputs.get_mut(&key)?.accept_output(&link);
        trace!(%node, multi_input = %key, accepted, "add input");
        Ok(accepted)
    }

    /// Same as `add_input(0, source)`.
    pub fn add_first_input(&mut self, source: impl Into<Source>) -> PlResult<bool> {
        self.add_input(PortKey::default(), source)
    }

    /// Drop every binding of one multi-input. Other ports are untouched.
    pub fn clear_inputs(&mut self, key: impl Into<PortKey>) -> PlResult<()> {
        let key = key.into();
        self.multi_inputs.get_mut(&key)?.clear();
        trace!(node = %self.id, multi_input = %key, "cleared inputs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NodeBuilder;
    use crate::input::Input;
    use crate::inputs::Inputs;
    use crate::output::Output;
    use pl_core::{Id, SharedData, Wrap};
    use std::sync::Arc;

    type Int = Wrap<i32>;

    fn sink() -> ProcessNode {
        let mut b = NodeBuilder::new("sink");
        b.register_input("in", Input::<Int>::new());
        b.register_input("other", Input::<Int>::new());
        b.register_inputs("many", Inputs::<Int>::new());
        b.register_output("out", Output::<Int>::new());
        b.build(Id::from_index(1)).unwrap()
    }

    #[test]
    fn lookups_by_index_name_and_default() {
        let node = sink();
        assert!(std::ptr::addr_eq(
            node.input(1_usize).unwrap(),
            node.input("other").unwrap()
        ));

        let first = node.first_output().unwrap().id();
        assert_eq!(node.output(0_usize).unwrap().id(), first);
        assert_eq!(node.output("out").unwrap().id(), first);
        assert!(node.first_multi_input().is_ok());
    }

    #[test]
    fn lookup_failures_are_typed() {
        let node = sink();
        assert_eq!(
            node.input(2_usize).unwrap_err(),
            PlError::NotEnoughInputs { count: 2, index: 2 }
        );
        assert_eq!(
            node.input("nope").unwrap_err(),
            PlError::NoSuchInput { name: "nope".into() }
        );
        assert_eq!(
            node.multi_input(1_usize).unwrap_err(),
            PlError::NotEnoughInputs { count: 1, index: 1 }
        );
        assert_eq!(
            node.output(3_usize).unwrap_err(),
            PlError::NotEnoughOutputs { count: 1, index: 3 }
        );
        assert_eq!(
            node.output("in").unwrap_err(),
            PlError::NoSuchOutput { name: "in".into() }
        );
    }

    #[test]
    fn empty_node_has_no_default_port() {
        let node = NodeBuilder::new("empty").build(Id::from_index(0)).unwrap();
        assert_eq!(
            node.first_input().unwrap_err(),
            PlError::NotEnoughInputs { count: 0, index: 0 }
        );
        assert_eq!(
            node.first_output().unwrap_err(),
            PlError::NotEnoughOutputs { count: 0, index: 0 }
        );
    }

    #[test]
    fn typed_accessors_check_concrete_type() {
        let mut node = sink();
        assert!(node.output_as::<Output<Int>>("out").is_ok());
        assert!(node.multi_input_as::<Inputs<Int>>("many").is_ok());
        assert!(node.input_as_mut::<Input<Int>>("in").is_ok());

        let err = node.output_as::<Output<Wrap<u8>>>(0_usize).unwrap_err();
        assert!(matches!(
            err,
            PlError::PortTypeMismatch {
                kind: PortKind::Output,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn set_input_from_output_and_payload() {
        let producer = Output::with_data(Wrap::new(5_i32));
        let mut node = sink();

        assert!(node.set_first_input(&producer).unwrap());
        assert!(node.input("in").unwrap().assigned_output().unwrap().points_to(&producer));

        let data: SharedData = Arc::new(Wrap::new(6_i32));
        assert!(node.set_input("other", Arc::clone(&data)).unwrap());
        assert!(!node.input("other").unwrap().has_assigned_output());

        assert!(!node.set_input(0_usize, Output::<Wrap<u8>>::new().link()).unwrap());
        assert!(node.input(0_usize).unwrap().has_assigned_output());
    }

    #[test]
    fn set_input_forwards_foreign_binding() {
        let producer = Output::<Int>::new();
        let mut from = sink();
        from.set_input(0_usize, &producer).unwrap();
        from.set_input(1_usize, Source::payload(Arc::new(Wrap::new(1_i32))))
            .unwrap();

        let mut to = sink();
        assert!(to.set_input(0_usize, from.input(0_usize).unwrap()).unwrap());
        assert_eq!(
            to.input(0_usize).unwrap().assigned_output(),
            from.input(0_usize).unwrap().assigned_output()
        );

        assert!(to.set_input(1_usize, from.input(1_usize).unwrap()).unwrap());
        assert!(!to.input(1_usize).unwrap().has_assigned_output());
        assert!(to.input(1_usize).unwrap().is_bound());
    }

    #[test]
    fn forwarding_unbound_input_fails_quietly() {
        let from = sink();
        let mut to = sink();
        assert!(!to.set_input(0_usize, from.input(0_usize).unwrap()).unwrap());
        assert!(!to.input(0_usize).unwrap().is_bound());
    }

    #[test]
    fn self_forward_through_snapshot() {
        let producer = Output::<Int>::new();
        let mut node = sink();
        node.set_first_input(&producer).unwrap();

        let src = Source::from(node.input(0_usize).unwrap());
        assert!(node.set_input(1_usize, src).unwrap());
        assert!(node.input(1_usize).unwrap().assigned_output().unwrap().points_to(&producer));
    }

    #[test]
    fn unset_input_is_idempotent() {
        let producer = Output::<Int>::new();
        let mut node = sink();
        node.set_first_input(&producer).unwrap();

        node.unset_first_input().unwrap();
        node.unset_input("in").unwrap();
        assert!(!node.first_input().unwrap().is_bound());
        assert!(node.unset_input(9_usize).is_err());
    }

    #[test]
    fn add_and_clear_multi_input() {
        let a = Output::<Int>::new();
        let b = Output::<Int>::new();
        let mut node = sink();

        assert!(node.add_first_input(&a).unwrap());
        assert!(node.add_input("many", &b).unwrap());
        assert_eq!(node.first_multi_input().unwrap().len(), 2);

        node.clear_inputs(0_usize).unwrap();
        assert!(node.first_multi_input().unwrap().is_empty());
    }

    #[test]
    fn add_input_refuses_payloads() {
        let mut node = sink();
        let data: SharedData = Arc::new(Wrap::new(1_i32));
        assert!(!node.add_first_input(data).unwrap());

        let unbound = sink();
        assert!(!node.add_first_input(unbound.input(0_usize).unwrap()).unwrap());
        assert_eq!(node.multi_input_count(), 1);
        assert!(node.first_multi_input().unwrap().is_empty());
    }

    #[test]
    fn counts_and_names() {
        let node = sink();
        assert_eq!(node.input_count(), 2);
        assert_eq!(node.multi_input_count(), 1);
        assert_eq!(node.output_count(), 1);
        assert_eq!(node.multi_input_names().collect::<Vec<_>>(), vec!["many"]);
        assert_eq!(node.output_names().collect::<Vec<_>>(), vec!["out"]);
        assert_eq!(node.outputs().count(), 1);
        assert_eq!(node.name(), "sink");
    }
}
