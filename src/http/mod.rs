//! HTTP API for driving cockpit sessions from an external front end
//!
//! - POST /cockpit/sessions - Start a session for a lead
//! - GET /cockpit/sessions/:id - Session snapshot
//! - DELETE /cockpit/sessions/:id - Leave without logging the call
//! - POST /cockpit/sessions/:id/utterances - Submit a customer utterance
//! - POST /cockpit/sessions/:id/end - End the call
//! - GET /cockpit/sessions/:id/transcript - Transcript so far
//! - GET /cockpit/sessions/:id/interventions - Guidance cards so far
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
