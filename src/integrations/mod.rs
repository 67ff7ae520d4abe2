//! External service integrations.

pub mod whatsapp_client {
    pub use crate::whatsapp_client::*;
}

pub mod webhook_models {
    pub use crate::webhook_models::*;
}

pub mod lead_store {
    pub use crate::lead_store::*;
}
