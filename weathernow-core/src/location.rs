//! Device location boundary.
//!
//! A front end supplies whatever it has for a position source; the flow only
//! asks for permission and then for one fix per resolution cycle.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Permission {
    Granted,
    Denied,
}

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_permission(&self) -> Permission;

    async fn current_coordinates(&self) -> Result<Coordinates, LocationError>;
}

/// A fixed position, e.g. from configuration or command-line flags.
///
/// Without a position there is nothing to grant access to, so permission is
/// reported as denied.
#[derive(Debug, Clone, Default)]
pub struct StaticLocation {
    coordinates: Option<Coordinates>,
}

impl StaticLocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn request_permission(&self) -> Permission {
        match self.coordinates {
            Some(_) => Permission::Granted,
            None => Permission::Denied,
        }
    }

    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        let coords = self
            .coordinates
            .ok_or_else(|| LocationError::PositionUnavailable("no position configured".into()))?;

        coords
            .validate()
            .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?;

        Ok(coords)
    }
}
