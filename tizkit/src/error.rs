pub type Result<T> = std::result::Result<T, DiagramError>;

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("invalid {kind} id {id}")]
    InvalidId { kind: &'static str, id: u32 },

    #[error("connection endpoints cannot be the same node ({node})")]
    SelfConnection { node: u32 },

    #[error("parameter '{param}' must be finite")]
    NonFinite { param: &'static str },

    #[error("parameter '{param}' out of range: {got} not in [{min}, {max}]")]
    OutOfRange {
        param: &'static str,
        min: f32,
        max: f32,
        got: f32,
    },

    #[error("{what} exceeds cap of {max}")]
    CapsExceeded { what: &'static str, max: usize },

    #[error("connection {connection} references missing node {node}")]
    DanglingConnection { connection: u32, node: u32 },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("invalid diagram document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("no tikzpicture environment found")]
    NoTikzPicture,

    #[error("tikzpicture contains no positioned nodes")]
    EmptyTikz,
}

impl DiagramError {
    pub(crate) fn node(id: u32) -> Self {
        DiagramError::InvalidId { kind: "node", id }
    }

    pub(crate) fn connection(id: u32) -> Self {
        DiagramError::InvalidId { kind: "connection", id }
    }

    /// Stable machine-readable code, surfaced to the browser as `error.code`.
    pub fn code(&self) -> &'static str {
        match self {
            DiagramError::InvalidId { .. } => "invalid_id",
            DiagramError::SelfConnection { .. } => "self_connection",
            DiagramError::NonFinite { .. } => "non_finite",
            DiagramError::OutOfRange { .. } => "out_of_range",
            DiagramError::CapsExceeded { .. } => "caps_exceeded",
            DiagramError::DanglingConnection { .. } => "dangling_connection",
            DiagramError::DuplicateId { .. } => "duplicate_id",
            DiagramError::Json(_) => "json_parse",
            DiagramError::InvalidPayload { .. } => "invalid_payload",
            DiagramError::NoTikzPicture => "no_tikzpicture",
            DiagramError::EmptyTikz => "empty_tikz",
        }
    }
}

pub(crate) fn check_finite(param: &'static str, v: f32) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(DiagramError::NonFinite { param })
    }
}

pub(crate) fn check_range(param: &'static str, v: f32, min: f32, max: f32) -> Result<()> {
    check_finite(param, v)?;
    if v < min || v > max {
        return Err(DiagramError::OutOfRange { param, min, max, got: v });
    }
    Ok(())
}
