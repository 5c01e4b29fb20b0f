//! Error taxonomy for grid generation.
//!
//! Three kinds of failure exist in this pipeline:
//!
//! - `Configuration`: an unresolved region/chain/secondary reference or an
//!   invalid parameter. Always detected before any field work starts and
//!   fatal for the whole run.
//! - `DegenerateGeometry`: geometry the physics cannot support (coincident
//!   master/secondary, zero-area region). Pair-scoped: the orchestrator
//!   skips the affected pair and continues with its siblings.
//! - `Io`: filesystem/serialization failures in the binary's front-end.
//!
//! Anything softer than these (a TD value with no contour, a line clipped to
//! nothing) is not an error at all; it is counted in `RunStats` and omitted.

#[derive(Clone, PartialEq)]
pub enum GridError {
    Configuration(String),
    DegenerateGeometry(String),
    Io(String),
}

impl GridError {
    pub fn config(message: impl Into<String>) -> Self {
        GridError::Configuration(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        GridError::DegenerateGeometry(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        GridError::Io(message.into())
    }

    /// Process exit code for the binary front-end.
    pub fn exit_code(&self) -> u8 {
        match self {
            GridError::Configuration(_) => 2,
            GridError::DegenerateGeometry(_) => 2,
            GridError::Io(_) => 3,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            GridError::Configuration(_) => "configuration error",
            GridError::DegenerateGeometry(_) => "degenerate geometry",
            GridError::Io(_) => "i/o error",
        }
    }

    fn message(&self) -> &str {
        match self {
            GridError::Configuration(m) | GridError::DegenerateGeometry(m) | GridError::Io(m) => m,
        }
    }
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::fmt::Debug for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridError")
            .field("kind", &self.kind())
            .field("message", &self.message())
            .finish()
    }
}

impl std::error::Error for GridError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_io_from_config() {
        assert_eq!(GridError::config("x").exit_code(), 2);
        assert_eq!(GridError::degenerate("x").exit_code(), 2);
        assert_eq!(GridError::io("x").exit_code(), 3);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = GridError::config("region 'gulf' not found");
        assert_eq!(
            format!("{err}"),
            "configuration error: region 'gulf' not found"
        );
    }
}
