use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::GerberError;
use crate::geometry::BoundingBox;
use crate::layer::Layer;

/// The layer types of a board, each maps to a fixed file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerKind {
    TopCopper,
    TopSolderMask,
    TopSilkscreen,
    BottomCopper,
    BottomSolderMask,
    BottomSilkscreen,
    /// Internal copper layer of a multi-layer board, numbered by the caller.
    InnerCopper(u32),
    Drill,
    Outline,
}

impl LayerKind {
    pub fn extension(&self) -> Cow<'static, str> {
        match self {
            LayerKind::TopCopper => Cow::Borrowed("gtl"),
            LayerKind::TopSolderMask => Cow::Borrowed("gts"),
            LayerKind::TopSilkscreen => Cow::Borrowed("gto"),
            LayerKind::BottomCopper => Cow::Borrowed("gbl"),
            LayerKind::BottomSolderMask => Cow::Borrowed("gbs"),
            LayerKind::BottomSilkscreen => Cow::Borrowed("gbo"),
            LayerKind::InnerCopper(number) => Cow::Owned(format!("gl{}", number)),
            LayerKind::Drill => Cow::Borrowed("drl"),
            LayerKind::Outline => Cow::Borrowed("gko"),
        }
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::TopCopper => write!(f, "Top copper"),
            LayerKind::TopSolderMask => write!(f, "Top solder mask"),
            LayerKind::TopSilkscreen => write!(f, "Top silkscreen"),
            LayerKind::BottomCopper => write!(f, "Bottom copper"),
            LayerKind::BottomSolderMask => write!(f, "Bottom solder mask"),
            LayerKind::BottomSilkscreen => write!(f, "Bottom silkscreen"),
            LayerKind::InnerCopper(number) => write!(f, "Inner copper {}", number),
            LayerKind::Drill => write!(f, "Drill"),
            LayerKind::Outline => write!(f, "Outline"),
        }
    }
}

/// A board design, the set of layers sharing one filename prefix.
///
/// Layers are kept in creation order. Creating the same kind twice is allowed and yields two layers with
/// the same filename.
#[derive(Debug)]
pub struct Design {
    filename_prefix: String,
    layers: Vec<Layer>,
}

impl Design {
    pub fn new(filename_prefix: impl Into<String>) -> Self {
        Self {
            filename_prefix: filename_prefix.into(),
            layers: Vec::new(),
        }
    }

    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Adds a layer of the given kind, named `<prefix>.<extension>`, and returns it.
    pub fn layer(&mut self, kind: LayerKind) -> &mut Layer {
        let filename = format!("{}.{}", self.filename_prefix, kind.extension());
        debug!("adding layer. kind: {}, filename: {}", kind, filename);

        self.layers
            .push(Layer::new(filename, kind));
        let index = self.layers.len() - 1;
        &mut self.layers[index]
    }

    pub fn top_copper(&mut self) -> &mut Layer {
        self.layer(LayerKind::TopCopper)
    }

    pub fn top_solder_mask(&mut self) -> &mut Layer {
        self.layer(LayerKind::TopSolderMask)
    }

    pub fn top_silkscreen(&mut self) -> &mut Layer {
        self.layer(LayerKind::TopSilkscreen)
    }

    pub fn bottom_copper(&mut self) -> &mut Layer {
        self.layer(LayerKind::BottomCopper)
    }

    pub fn bottom_solder_mask(&mut self) -> &mut Layer {
        self.layer(LayerKind::BottomSolderMask)
    }

    pub fn bottom_silkscreen(&mut self) -> &mut Layer {
        self.layer(LayerKind::BottomSilkscreen)
    }

    /// Internal copper layer `number` of a multi-layer board.
    pub fn inner_copper(&mut self, number: u32) -> &mut Layer {
        self.layer(LayerKind::InnerCopper(number))
    }

    pub fn drill(&mut self) -> &mut Layer {
        self.layer(LayerKind::Drill)
    }

    pub fn outline(&mut self) -> &mut Layer {
        self.layer(LayerKind::Outline)
    }

    /// Writes every layer to its own file in `directory`, in creation order.
    ///
    /// Returns the paths written. Stops at the first failure; files already written are left in place.
    pub fn write_layers(&self, directory: &Path) -> Result<Vec<PathBuf>, GerberError> {
        let mut paths = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            // only the file name is used, a prefix may contain a path of its own.
            let filename = Path::new(layer.filename())
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| layer.filename().into());
            let path = directory.join(filename);
            info!("writing gerber file. path: {}", path.display());

            let mut writer = BufWriter::new(File::create(&path)?);
            layer.write_gerber(&mut writer)?;
            writer.flush()?;

            paths.push(path);
        }

        Ok(paths)
    }

    /// Union of the bounding boxes of all layers with primitives, degenerate if there are none.
    pub fn mbb(&mut self) -> BoundingBox {
        let mut result: Option<BoundingBox> = None;

        for layer in self
            .layers
            .iter_mut()
            .filter(|layer| !layer.is_empty())
        {
            let bounding_box = layer.mbb();
            result = Some(match result.take() {
                Some(mut result) => {
                    result.join(&bounding_box);
                    result
                }
                None => bounding_box,
            });
        }

        result.unwrap_or_else(BoundingBox::degenerate)
    }
}
