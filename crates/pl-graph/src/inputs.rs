//! Typed multi-input.

use std::any::Any;
use std::fmt;

use pl_core::Data;
use tracing::trace;

use crate::input::Input;
use crate::port::{BindingEvent, InputPort, Listeners, MultiInputPort, OutputLink};

/// Variable-arity input: an ordered list of `Input<T>` bindings, one per
/// accepted output.
pub struct Inputs<T: Data> {
    inputs: Vec<Input<T>>,
    listeners: Listeners,
}

impl<T: Data> Inputs<T> {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn get(&self, i: usize) -> Option<&Input<T>> {
        self.inputs.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Input<T>> {
        self.inputs.iter()
    }

    /// Register a callback run after every change of this multi-input.
    pub fn on_binding(&mut self, listener: impl FnMut(&BindingEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }
}

impl<T: Data> Default for Inputs<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Data> IntoIterator for &'a Inputs<T> {
    type Item = &'a Input<T>;
    type IntoIter = std::slice::Iter<'a, Input<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Data> MultiInputPort for Inputs<T> {
    fn accept_output(&mut self, output: &OutputLink) -> bool {
        let mut input = Input::<T>::new();
        if !input.accept_output(output) {
            return false;
        }

        let position = self.inputs.len();
        self.inputs.push(input);
        trace!(port = %output.port(), position, "multi-input added output");
        self.listeners.notify(&BindingEvent::InputAdded {
            output: output.port(),
            position,
        });
        true
    }

    fn clear(&mut self) {
        let removed = self.inputs.len();
        self.inputs.clear();
        trace!(removed, "multi-input cleared");
        self.listeners.notify(&BindingEvent::InputsCleared { removed });
    }

    fn len(&self) -> usize {
        self.inputs.len()
    }

    fn links(&self) -> Vec<&OutputLink> {
        self.inputs
            .iter()
            .filter_map(|input| input.assigned_output())
            .collect()
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

impl<T: Data> fmt::Debug for Inputs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inputs")
            .field("data_type", &std::any::type_name::<T>())
            .field("inputs", &self.inputs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Output;
    use crate::port::OutputPort;
    use pl_core::Wrap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn accept_is_additive() {
        let a = Output::with_data(Wrap::new(1_i32));
        let b = Output::with_data(Wrap::new(2_i32));
        let mut inputs = Inputs::<Wrap<i32>>::new();

        assert!(inputs.accept_output(&a.link()));
        assert!(inputs.accept_output(&b.link()));
        assert!(inputs.accept_output(&a.link()));
        assert_eq!(inputs.len(), 3);

        let values: Vec<i32> = inputs.iter().map(|i| *i.data().unwrap().get()).collect();
        assert_eq!(values, vec![1, 2, 1]);
        assert!(inputs.links()[1].points_to(&b));
    }

    #[test]
    fn mismatched_output_is_not_added() {
        let wrong = Output::<Wrap<String>>::new();
        let mut inputs = Inputs::<Wrap<i32>>::new();

        assert!(!inputs.accept_output(&wrong.link()));
        assert!(inputs.is_empty());
    }

    #[test]
    fn clear_drops_all_bindings() {
        let a = Output::<Wrap<i32>>::new();
        let mut inputs = Inputs::<Wrap<i32>>::new();
        inputs.accept_output(&a.link());
        inputs.accept_output(&a.link());

        inputs.clear();
        assert_eq!(inputs.len(), 0);
        assert!(inputs.links().is_empty());
    }

    #[test]
    fn listeners_report_positions() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let a = Output::<Wrap<i32>>::new();
        let mut inputs = Inputs::<Wrap<i32>>::new();
        inputs.on_binding(move |e| sink.lock().unwrap().push(e.clone()));

        inputs.accept_output(&a.link());
        inputs.accept_output(&a.link());
        inputs.clear();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                BindingEvent::InputAdded { output: a.id(), position: 0 },
                BindingEvent::InputAdded { output: a.id(), position: 1 },
                BindingEvent::InputsCleared { removed: 2 },
            ]
        );
    }
}
