// HTTP and WebSocket read surfaces

pub mod query;
pub mod websocket;

pub use query::{create_query_router, QueryAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};
