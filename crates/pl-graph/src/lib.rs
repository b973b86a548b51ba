//! pl-graph: port binding layer for processing pipelines.
//!
//! Provides:
//! - Port contracts (outputs, single inputs, multi-inputs) and typed ports
//! - Per-node port registry with index and name lookup
//! - Process nodes with binding operations, built through a validating builder
//! - A node arena that resolves cross-node bindings
//!
//! # Example
//!
//! ```
//! use pl_core::Wrap;
//! use pl_graph::{Input, NodeBuilder, Output, Pipeline};
//!
//! let mut pipeline = Pipeline::new();
//!
//! let mut reader = NodeBuilder::new("reader");
//! reader.register_output("samples", Output::with_data(Wrap::new(vec![1.0_f32, 2.0])));
//! let reader = pipeline.add_node(reader).unwrap();
//!
//! let mut mean = NodeBuilder::new("mean");
//! mean.register_input("samples", Input::<Wrap<Vec<f32>>>::new());
//! let mean = pipeline.add_node(mean).unwrap();
//!
//! assert!(pipeline.connect(reader, "samples", mean, "samples").unwrap());
//!
//! let input = pipeline.node(mean).unwrap().input_as::<Input<Wrap<Vec<f32>>>>(0_usize).unwrap();
//! assert_eq!(input.data().unwrap().len(), 2);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod input;
pub mod inputs;
pub mod node;
pub mod output;
pub mod pipeline;
pub mod port;
pub mod registry;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::NodeBuilder;
pub use config::{DuplicateNamePolicy, RegistryConfig};
pub use error::{GraphError, GraphResult};
pub use input::Input;
pub use inputs::Inputs;
pub use node::ProcessNode;
pub use output::Output;
pub use pipeline::Pipeline;
pub use port::{
    Binding, BindingEvent, BindingListener, InputPort, MultiInputPort, OutputLink, OutputPort,
    PortKey, Source,
};
pub use registry::PortTable;
