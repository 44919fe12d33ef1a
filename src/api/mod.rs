// =============================================================================
// HTTP Surface
// =============================================================================
//
// `rest` owns the router; `page` renders the HTML dashboard; `ws` pushes
// snapshots to connected clients.

pub mod page;
pub mod rest;
pub mod ws;
