use std::io::{BufRead, BufReader, Lines, Read, Write};
use std::str::FromStr;

use geo::Geometry;
use tracing::warn;
use wkt::{ToWkt, Wkt};

pub struct WktGeometries<R>
where
    R: Read,
{
    lines: Lines<BufReader<R>>,
}

impl<R> Iterator for WktGeometries<R>
where
    R: Read,
{
    type Item = Geometry<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next() {
            Some(Ok(line)) => match Wkt::<f64>::from_str(line.as_str()) {
                Ok(geometry) => match geometry.try_into() {
                    Ok(geometry) => Some(geometry),
                    Err(e) => {
                        warn!("Failed to convert '{}' to geo geometry: {:?}", line, e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Failed to parse '{}' as WKT: {:?}", line, e);
                    None
                }
            },
            Some(Err(e)) => {
                warn!("Failed to read line: {:?}", e);
                None
            }
            None => None,
        }
    }
}

/// Return an iterator to the WKT geometries passed in through the given BufReader
///
/// Expects one geometry per line (LF or CRLF). Parsing any given line ends after either the first
/// failure or the first geometry yielded, whichever comes first. That is, a line can have trailing
/// garbage, but not leading garbage.
pub fn read_wkt_geometries<R>(reader: R) -> WktGeometries<R>
where
    R: Read,
{
    WktGeometries {
        // TODO: Is there a nice way to implement whitespace-separated geometries?
        lines: BufReader::new(reader).lines(),
    }
}

/// Write the given geometries with the given Writer in WKT format
///
/// Each geometry will be written on its own line.
pub fn write_wkt_geometries<W, G>(mut writer: W, geometries: G)
where
    W: Write,
    G: IntoIterator<Item = Geometry<f64>>,
{
    for geometry in geometries {
        let wkt_geom = geometry.to_wkt();
        writeln!(writer, "{}", wkt_geom).expect("Writing failed");
    }
}
