//! Domain layer: entities, IDs, geometry, error taxonomy, and the two
//! trait seams (tool executors, decision-mode strategies). No subsystem
//! (CTX/MSG/DEC/FORM/ORCH) wiring lives here — only the shapes they share.

pub mod error;
pub mod geometry;
pub mod ids;
pub mod models;
pub mod ports;

pub use error::{CtxError, DecError, FormError, MsgError, OrchError};
