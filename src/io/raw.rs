//! Float arrays as raw binary: little-endian `f32`, no header.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    Ok(())
}

type IORes<T> = std::io::Result<T>;

pub fn read(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>>> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut bytes = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut bytes) {
            Ok(()) => Some(Ok(f32::from_le_bytes(bytes))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}
