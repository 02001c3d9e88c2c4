mod extension;
mod tables;

pub use extension::TableExtension;
pub use tables::TableOps;
