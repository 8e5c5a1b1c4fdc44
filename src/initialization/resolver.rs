//! DNS resolver initialization.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_RESOLVERS;
use crate::dns::{DnsResolver, HickoryTransport, Resolve};
use crate::error_handling::InitializationError;

/// Resolver settings taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Servers to query. Only the first one is used; empty means the defaults.
    pub servers: Vec<String>,
    /// Cancels queries in flight.
    pub cancel: CancellationToken,
}

impl ResolverOptions {
    /// The configured servers, or [`DEFAULT_RESOLVERS`] when none were given.
    pub fn servers(&self) -> Vec<String> {
        if self.servers.is_empty() {
            DEFAULT_RESOLVERS.iter().map(|s| s.to_string()).collect()
        } else {
            self.servers.clone()
        }
    }
}

/// Initializes the bounded-retry resolver over a UDP transport.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if the first server is not
/// an IP address.
pub fn init_resolver(options: &ResolverOptions) -> Result<Arc<dyn Resolve>, InitializationError> {
    let transport = HickoryTransport::new(&options.servers())?;
    Ok(Arc::new(DnsResolver::new(
        Arc::new(transport),
        options.cancel.clone(),
    )))
}
