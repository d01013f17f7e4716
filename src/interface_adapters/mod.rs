// Interface adapters: HTTP routes, handlers and JSON envelopes.

pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
