// Domain-layer modules and shared errors/models
pub mod intake {
    pub use crate::intake::*;
}

pub mod lead_scoring {
    pub use crate::lead_scoring::*;
}

pub mod dispatcher {
    pub use crate::dispatcher::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
