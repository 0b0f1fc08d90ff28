pub mod settings_loader;

pub use settings_loader::{is_pdf, list_pdf_files, load_settings};
