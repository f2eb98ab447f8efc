//! Endpoint registry.
//!
//! Holds the result of the last enumeration pass. Ids are positions in that
//! pass, so an id from an older pass may name a different port or none.

use siac_hardware::{DeviceEndpoint, PortEnumerator};
use tracing::debug;

/// Endpoints found by the last enumeration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointRegistry {
    endpoints: Vec<DeviceEndpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry with a fresh enumeration pass.
    ///
    /// Ids are reassigned `0..n` in enumeration order.
    pub fn refresh<E>(&mut self, enumerator: &E) -> &[DeviceEndpoint]
    where
        E: PortEnumerator + ?Sized,
    {
        self.endpoints = enumerator
            .list_endpoints()
            .into_iter()
            .enumerate()
            .map(|(id, endpoint)| endpoint.with_id(id))
            .collect();
        debug!("Endpoint registry holds {} endpoint(s)", self.endpoints.len());
        &self.endpoints
    }

    pub fn get(&self, id: usize) -> Option<&DeviceEndpoint> {
        self.endpoints.get(id)
    }

    /// The endpoint selected when the list is shown: the first one.
    pub fn default_selection(&self) -> Option<&DeviceEndpoint> {
        self.endpoints.first()
    }

    pub fn endpoints(&self) -> &[DeviceEndpoint] {
        &self.endpoints
    }

    /// `(id, display name)` pairs for the selection list.
    pub fn entries(&self) -> Vec<(usize, String)> {
        self.endpoints
            .iter()
            .map(|endpoint| (endpoint.id, endpoint.display_name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
