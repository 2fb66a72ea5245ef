//! API middleware. Only caller identity resolution lives here; access
//! logging is `tower_http`'s trace layer, applied in the router.

pub mod identity;
