use serde::Deserialize;

/// Chainbase configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ChainbaseConfig {
    /// Maximum number of in-memory snapshot layers. Pushing past this bound
    /// flushes the oldest committed layer into the durable backend first.
    /// Zero disables the bound.
    pub max_layers: usize,
    /// How many layers behind the tip the solidified cursor observes.
    pub solid_offset: usize,
}

impl Default for ChainbaseConfig {
    fn default() -> Self {
        Self {
            max_layers: 256,
            solid_offset: 27,
        }
    }
}
