//! Redirect-resolution engine.
//!
//! - `status`: closed outcome taxonomy
//! - `model`: request/result types
//! - `url`: `Location` resolution
//! - `classify`: transport outcome to status mapping
//! - `protocol`: manual redirect walk over a `HopTransport`
//! - `orchestrator`: prioritized fallback across strategies

mod classify;
mod model;
mod orchestrator;
mod protocol;
mod status;
mod url;

pub use classify::{
    classify, describe_reqwest_error, detect_block_signature, is_redirect_status, FailureKind,
    TransportOutcome, BLOCKED_STATUSES, BLOCK_SIGNATURES, REDIRECT_STATUSES,
};
pub use model::{ResolutionRequest, ResolutionResult, RowContext, NO_STRATEGY};
pub use orchestrator::{Orchestrator, ProgressHint};
pub use protocol::{follow_redirects, HopFailure, HopResponse, HopTransport, WalkOptions};
pub use status::ResolutionStatus;
pub use url::resolve_location;
