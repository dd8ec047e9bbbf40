use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrographyError {
    #[error("coordinate projection is unavailable")]
    ProjectionUnavailable,

    #[error("unknown coordinate reference system '{0}'")]
    UnknownCrs(String),

    #[error("invalid CRS table: {0}")]
    CrsTable(#[from] serde_json::Error),

    #[error("invalid CRS definition '{id}': {reason}")]
    CrsDefinition { id: String, reason: String },

    #[error("invalid number for {0}")]
    InvalidNumber(&'static str),

    #[error("coordinates out of range; lat: {lat}, lon: {lon}")]
    InvalidRange { lat: f64, lon: f64 },

    #[error("address not found '{0}'")]
    AddressNotFound(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("elevation samples are incomplete")]
    IncompleteSamples,

    #[error("assessment {0} was superseded")]
    Superseded(u64),

    #[error("elevation aggregator has shut down")]
    AggregatorClosed,
}

impl OrographyError {
    /// Returns true for errors caused by the user's numeric entry.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidNumber(_) | Self::InvalidRange { .. })
    }
}
