//! Geocoder trait consumed by the resolver.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{AddressResult, GeocodeError};

/// Resolve free-text address queries to candidate matches.
///
/// Implementations perform exactly one attempt per call; the resolver never
/// retries on their behalf either.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use pinpoint_core::{AddressResult, GeocodeError, Geocoder};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Geocoder for Fixed {
///     async fn search(&self, query: &str) -> Result<Vec<AddressResult>, GeocodeError> {
///         Ok(vec![AddressResult::new(query, 0.0, 0.0)])
///     }
/// }
/// ```
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return matches for `query`, best first.
    async fn search(&self, query: &str) -> Result<Vec<AddressResult>, GeocodeError>;
}

#[async_trait]
impl<G> Geocoder for Arc<G>
where
    G: Geocoder + ?Sized,
{
    async fn search(&self, query: &str) -> Result<Vec<AddressResult>, GeocodeError> {
        (**self).search(query).await
    }
}
