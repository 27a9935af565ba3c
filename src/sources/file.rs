//! JSON exports on disk

use std::fs;
use std::path::Path;

use super::facts::TrafficDump;
use crate::types::{Order, Result, StorePulseError};

/// Load an order export: a JSON array of orders
pub fn load_orders(path: &Path) -> Result<Vec<Order>> {
    let mut content = fs::read(path)?;
    simd_json::from_slice(&mut content)
        .map_err(|e| StorePulseError::Parse(format!("{}: {}", path.display(), e)))
}

/// Load a traffic export: `{ "facts": [...], "active": [...] }`
pub fn load_traffic(path: &Path) -> Result<TrafficDump> {
    let mut content = fs::read(path)?;
    simd_json::from_slice(&mut content)
        .map_err(|e| StorePulseError::Parse(format!("{}: {}", path.display(), e)))
}
