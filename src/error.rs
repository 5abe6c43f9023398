use thiserror::Error;

/// Failures surfaced by the simulation core.
///
/// Out-of-range physical values are clamped inside each entity and never
/// reach this type; a `SimError` always means a broken invariant.
#[derive(Debug, Error)]
pub enum SimError {
    /// A non-finite value appeared in an entity's temperature state after
    /// clamping. Carries the full component state at the moment of failure
    /// (non-finite numbers render as `null`).
    #[error("[{component}] non-finite value detected in {field}! state: {state}")]
    IntegrityViolation {
        component: String,
        field: String,
        state: serde_json::Value,
    },

    /// The aggregated system snapshot failed validation. The simulation is
    /// stopped before this is returned; `diagnostics` enumerates the raw
    /// state of every component.
    #[error("system state validation failed, non-finite fields: {fields:?} diagnostics: {diagnostics}")]
    CorruptSystemState {
        fields: Vec<String>,
        diagnostics: serde_json::Value,
    },
}

impl SimError {
    pub fn integrity(component: &str, field: &str, state: serde_json::Value) -> Self {
        SimError::IntegrityViolation {
            component: component.to_string(),
            field: field.to_string(),
            state,
        }
    }
}
