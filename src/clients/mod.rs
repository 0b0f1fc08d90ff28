pub mod api;
pub mod ragrace_client;

pub use api::ArenaApi;
pub use ragrace_client::RagRaceClient;
