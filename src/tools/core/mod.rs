// Core tools implementation
pub mod dyn_tool;
pub mod registry;
pub mod spec;
pub mod tool;

// Re-export all core components for easier imports
pub use dyn_tool::DynTool;
pub use registry::ToolRegistry;
pub use spec::ToolSpec;
pub use tool::{Tool, ToolError};
