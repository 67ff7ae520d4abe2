// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod webhook_handler {
    pub use crate::webhook_handler::*;
}

pub mod privacy {
    pub use crate::privacy::*;
}

pub mod routes {
    pub use crate::routes::*;
}
