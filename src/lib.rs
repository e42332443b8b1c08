pub mod codegen;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod layout;
pub mod output;
pub mod packer;
pub mod pipeline;
pub mod types;

pub use config::{ConvertConfig, ReportFormat};
pub use layout::{AttributeGroup, Layout, PresenceRule};
pub use pipeline::Pipeline;
