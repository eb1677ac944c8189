pub mod http_api;
pub mod push_transport;
pub mod sse;

pub fn module_name() -> &'static str {
    "server"
}
