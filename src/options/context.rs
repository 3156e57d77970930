use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GPU context behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Context", inline)]
#[serde(default)]
pub struct ContextOptions {
    /// Use vertex array objects when the device supports them. When off,
    /// the context behaves as if the extension were missing.
    #[schemars(title = "Use Vertex Array Objects")]
    pub use_vertex_array_objects: bool,
    /// Skip binding calls whose target is already bound. Turning this off
    /// is a debugging aid for suspected cache desync.
    #[schemars(title = "Elide Redundant Bindings")]
    pub elide_redundant_bindings: bool,
    /// Label attached to device objects where the backend supports it.
    #[schemars(skip)]
    pub label: String,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            use_vertex_array_objects: true,
            elide_redundant_bindings: true,
            label: "tilegpu".to_owned(),
        }
    }
}
