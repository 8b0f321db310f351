//! External service integrations.

pub mod remote_client {
    pub use crate::remote_client::*;
}

pub mod history {
    pub use crate::history::*;
}
