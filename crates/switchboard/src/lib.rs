pub mod agents;
pub mod context;
pub mod errors;
pub mod message;
pub mod pipeline;
pub mod providers;
pub mod tools;
