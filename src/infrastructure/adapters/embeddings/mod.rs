//! Embedding Adapters - 风格向量的导入与导出（NumPy 格式）

mod npz_exporter;
mod npz_style_bank;

pub use npz_exporter::{NpzExporter, CATALOG_ARCHIVE_NAME};
pub use npz_style_bank::NpzStyleBank;
