//! Result type alias for geoindex

use super::errors::IndexerError;

/// Result type alias for geoindex operations
///
/// # Examples
///
/// ```
/// use geoindex::domain::result::Result;
/// use geoindex::domain::errors::IndexerError;
///
/// fn failing_function() -> Result<()> {
///     Err(IndexerError::Configuration("workers must be > 0".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, IndexerError>;
