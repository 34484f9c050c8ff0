//! CSV reading utilities.

mod reader;

pub use reader::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, frame_rows, read_csv_frame,
    read_csv_headers, validate_encoding,
};
