//! Test fixtures that provide `(SharedBuffer, StreamHandler)` pairs and a
//! local listener for the mock Bot API. The stream helpers wrap a shared
//! in-memory buffer so handlers can be exercised without touching stdout.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use rstest::fixture;
use telelog::{StreamHandler, TemplateFormatter};

use super::shared_buffer::SharedBuf;

/// Convenience alias for the byte buffer shared between handlers.
pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Return a handler that renders `LEVEL name: message` into a fresh buffer.
#[fixture]
pub fn handler_tuple() -> (SharedBuffer, StreamHandler) {
    let buffer: SharedBuffer = Arc::new(Mutex::new(Vec::new()));
    let handler = StreamHandler::new(
        SharedBuf::new(Arc::clone(&buffer)),
        TemplateFormatter::new("%(levelname)s %(name)s: %(message)s"),
    );
    (buffer, handler)
}

#[fixture]
pub fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}
