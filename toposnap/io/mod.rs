mod stdio;
mod wkt;

pub use stdio::{get_input_reader, get_output_writer};

pub use self::wkt::{read_wkt_geometries, write_wkt_geometries};
