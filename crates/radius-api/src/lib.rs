//! The ARM request pipeline (component D): an axum router translating resource CRUD requests
//! into store reads/writes and queue hand-offs, plus the async-operation polling endpoint.

pub mod error;
pub mod routes;
pub mod state;

pub use error::Error;
pub use routes::build_router;
pub use state::ApiState;
