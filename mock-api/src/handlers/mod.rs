pub mod collections;
pub mod health;
pub mod orders;

use serde::Serialize;

/// `{success: true, data}` wrapper the real API puts around most bodies.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    pub items: Vec<T>,
    pub skip: u64,
    pub limit: u64,
    pub total: u64,
}
