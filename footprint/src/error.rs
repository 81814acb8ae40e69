use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("io error, {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },

    #[error("malformed centerline, {0}")]
    Centerline(&'static str),

    #[error("drape failed, {0}")]
    Drape(String),

    #[error("malformed raster, {0}")]
    Raster(String),

    #[error("store error, {0}")]
    Store(String),

    #[error("layer '{layer}' field '{field}' expects {expected}")]
    FieldType {
        layer: String,
        field: String,
        expected: &'static str,
    },

    #[error("layer '{layer}' holds {expected} geometries")]
    GeometryKind {
        layer: String,
        expected: &'static str,
    },

    #[error("no such layer '{0}'")]
    UnknownLayer(String),

    #[error("layer '{0}' already exists")]
    DuplicateLayer(String),
}

/// A step so small it would produce more than
/// [`MAX_STATIONS`](crate::math::MAX_STATIONS) samples.
pub(crate) fn too_many_samples(name: &'static str) -> FootprintError {
    FootprintError::InvalidParameter {
        name,
        reason: "yields too many samples",
    }
}

/// Rejects values that are not finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, FootprintError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FootprintError::InvalidParameter {
            name,
            reason: "must be finite and greater than zero",
        })
    }
}
