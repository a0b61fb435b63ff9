pub mod openapi;
pub mod routes;
pub mod state;
