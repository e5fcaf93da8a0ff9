pub mod fs;

pub use crate::fs::{append_csv, ensure_csv, read_csv, read_json, write_csv};
