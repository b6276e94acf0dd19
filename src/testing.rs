use std::io::{BufWriter, Write};
use std::sync::Arc;

use gerber_types::DCode;

use crate::code::write_commands;
use crate::{Aperture, BoundingBox, GerberError, Layer, Primitive};

pub fn dump_layer_source(layer: &Layer) {
    let gerber_source = layer_to_source(layer);

    println!("Gerber source ({}):\n{}", layer.filename(), gerber_source);
}

pub fn layer_to_source(layer: &Layer) -> String {
    let mut buf = BufWriter::new(Vec::new());
    layer
        .write_gerber(&mut buf)
        .expect("Could not generate Gerber code");
    let bytes = buf.into_inner().unwrap();
    let gerber_source = String::from_utf8(bytes).unwrap();
    gerber_source
}

#[cfg(test)]
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .try_init();
}

/// An aperture which writes its key as the template, e.g. `%ADD12A*%`.
#[derive(Debug)]
pub struct FakeAperture {
    key: String,
}

impl FakeAperture {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl Aperture for FakeAperture {
    fn id(&self) -> String {
        self.key.clone()
    }

    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError> {
        writeln!(w, "%ADD{}{}*%", code, self.key)?;
        Ok(())
    }
}

/// A primitive with a fixed bounding box which only writes its aperture select.
#[derive(Debug)]
pub struct FakePrimitive {
    aperture: Option<Arc<FakeAperture>>,
    bounding_box: BoundingBox,
}

impl FakePrimitive {
    pub fn new(aperture_key: Option<&str>, bounding_box: BoundingBox) -> Self {
        Self {
            aperture: aperture_key.map(|key| Arc::new(FakeAperture::new(key))),
            bounding_box,
        }
    }
}

impl Primitive for FakePrimitive {
    fn aperture(&self) -> Option<Arc<dyn Aperture>> {
        self.aperture
            .clone()
            .map(|aperture| aperture as Arc<dyn Aperture>)
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounding_box.clone()
    }

    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError> {
        write_commands(w, &[DCode::SelectAperture(code).into()])
    }
}

/// Accepts `limit` bytes, then fails every write with `BrokenPipe`.
pub struct FailingWriter {
    limit: usize,
    written: Vec<u8>,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let remaining = self.limit - self.written.len();
        if remaining == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"));
        }
        let count = remaining.min(buf.len());
        self.written
            .extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
