use thiserror::Error;

/// Errors surfaced by the invalidation/draw machinery.
///
/// None of these abort a drain pass or the process: configuration errors leave
/// the object in its last valid state, render errors are caught per object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// An invalid property value was supplied (wrong type, non-finite
    /// coordinate). Reported through an `Error` event on the target drawable.
    #[error("invalid value for property `{property}`: {reason}")]
    Configuration { property: &'static str, reason: String },

    /// The drawing backend rejected an operation during `draw()`.
    #[error("backend rejected draw of element {element}: {reason}")]
    Render { element: u64, reason: String },

    /// A property name that is not in the drawable's descriptor table.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),
}

impl ChartError {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
