pub mod core;
pub mod executor;
pub mod impls;

pub use self::core::{DynTool, Tool, ToolRegistry, ToolSpec};
pub use executor::{BatchOutcome, ExecutionError, ToolExecutor};
