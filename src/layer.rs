use std::io::Write;

use log::{debug, info, trace, warn};

use crate::aperture::{Aperture, DEFAULT_APERTURE_DEFINITION};
use crate::code::{end_of_file, header, write_commands};
use crate::design::LayerKind;
use crate::error::GerberError;
use crate::geometry::BoundingBox;
use crate::primitive::Primitive;
use crate::registry::{ApertureRegistry, ApertureSlot};

/// A single board layer, serialized to its own Gerber file.
///
/// Primitives are kept in insertion order, which is also the order they are drawn in.
#[derive(Debug)]
pub struct Layer {
    filename: String,
    kind: LayerKind,
    primitives: Vec<Box<dyn Primitive>>,
    apertures: ApertureRegistry,
    /// Computed on the first call to `mbb`, not invalidated by `add`, see `clear_cached_mbb`.
    bounding_box: Option<BoundingBox>,
}

impl Layer {
    pub(crate) fn new(filename: String, kind: LayerKind) -> Self {
        Self {
            filename,
            kind,
            primitives: Vec::new(),
            apertures: ApertureRegistry::new(),
            bounding_box: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    pub fn primitives(&self) -> &[Box<dyn Primitive>] {
        &self.primitives
    }

    pub fn apertures(&self) -> &ApertureRegistry {
        &self.apertures
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Adds primitives to the layer, registering any apertures not seen before.
    pub fn add<I>(&mut self, primitives: I)
    where
        I: IntoIterator<Item = Box<dyn Primitive>>,
    {
        for primitive in primitives {
            if let Some(aperture) = primitive.aperture() {
                let slot = self.apertures.register(aperture);
                trace!("added primitive. slot: {:?}", slot);
            }
            self.primitives.push(primitive);
        }
    }

    /// Adds a single primitive, see `add`.
    pub fn push<P: Primitive + 'static>(&mut self, primitive: P) {
        self.add([Box::new(primitive) as Box<dyn Primitive>]);
    }

    /// Writes the complete layer file.
    ///
    /// Sink errors are returned as-is, the output is not buffered so a failure leaves it truncated.
    #[profiling::function]
    pub fn write_gerber(&self, w: &mut dyn Write) -> Result<(), GerberError> {
        info!(
            "writing layer. filename: {}, apertures: {}, primitives: {}",
            self.filename,
            self.apertures.len(),
            self.primitives.len()
        );

        write_commands(w, &header())?;

        w.write_all(DEFAULT_APERTURE_DEFINITION.as_bytes())?;
        for (slot, aperture) in self.apertures.iter() {
            aperture.write_gerber(w, slot.select_code())?;
        }

        for primitive in &self.primitives {
            #[cfg(feature = "profile-layers")]
            profiling::scope!("primitive");

            let slot = self.resolve(primitive.as_ref())?;
            primitive.write_gerber(w, slot.select_code())?;
        }

        write_commands(w, &[end_of_file()])
    }

    fn resolve(&self, primitive: &dyn Primitive) -> Result<ApertureSlot, GerberError> {
        let aperture = primitive.aperture();
        let slot = self
            .apertures
            .resolve_aperture(aperture.as_deref());

        match slot {
            Some(slot) => Ok(slot),
            None => Err(GerberError::UnregisteredAperture(
                aperture
                    .map(|aperture| aperture.id())
                    .unwrap_or_default(),
            )),
        }
    }

    /// Minimum bounding box of all primitives, in millimeters.
    ///
    /// The result is cached on the first call; primitives added afterwards are not reflected until
    /// `clear_cached_mbb` is called. An empty layer yields a degenerate box at the origin.
    pub fn mbb(&mut self) -> BoundingBox {
        if let Some(bounding_box) = &self.bounding_box {
            return bounding_box.clone();
        }

        let mut primitives = self.primitives.iter();
        let bounding_box = match primitives.next() {
            Some(first) => {
                let mut bounding_box = first.bounding_box();
                for primitive in primitives {
                    bounding_box.join(&primitive.bounding_box());
                }
                bounding_box
            }
            None => {
                warn!("No primitives on layer {}", self.filename);
                BoundingBox::degenerate()
            }
        };
        debug!("layer bbox. filename: {}, bbox: {:?}", self.filename, bounding_box);

        self.bounding_box = Some(bounding_box.clone());
        bounding_box
    }

    /// The cached bounding box, if `mbb` has been called.
    pub fn cached_mbb(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Forget the cached bounding box so the next `mbb` call recomputes it.
    pub fn clear_cached_mbb(&mut self) {
        self.bounding_box = None;
    }
}
