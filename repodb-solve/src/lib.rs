#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod clauses;

mod error;
pub use error::Error;

mod graph;
pub use graph::Graph;
pub use graph::Node;
pub use graph::Overlay;
pub use graph::PackageEntry;

mod intern;
pub use intern::Interner;
pub use intern::Symbol;

mod solve;
pub use solve::Promotion;
pub use solve::promote;

mod vars;
pub use vars::VariablePool;

mod verify;
pub use verify::Finding;
pub use verify::verify;

mod writer;
pub use writer::output_indexes;
