pub mod config;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod sink;
pub mod union;
