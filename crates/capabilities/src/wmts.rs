//! WMTS 1.0.0 Capabilities parsing.
//!
//! Reads the Contents section (layers and tile matrix sets) and the KVP
//! GetTile endpoint from OperationsMetadata.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use viewer_common::{DocumentKind, GeoBox, ViewerError, ViewerResult};

use crate::xml::{attr, parse_corner, parse_f64, xml_error, ElementPath};

const KIND: DocumentKind = DocumentKind::WmtsCapabilities;

/// A parsed WMTS capabilities document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsCapabilities {
    pub service_title: Option<String>,
    /// KVP GetTile endpoint
    pub get_tile_url: Option<String>,
    pub layers: Vec<WmtsLayerCapabilities>,
    pub tile_matrix_sets: Vec<WmtsTileMatrixSet>,
}

/// One `<Layer>` from the Contents section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsLayerCapabilities {
    pub identifier: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub wgs84_bbox: Option<GeoBox>,
    pub styles: Vec<WmtsStyle>,
    pub formats: Vec<String>,
    pub tile_matrix_set_links: Vec<String>,
    pub resource_urls: Vec<WmtsResourceUrl>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsStyle {
    pub identifier: String,
    pub title: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsResourceUrl {
    pub format: String,
    pub resource_type: String,
    pub template: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsTileMatrixSet {
    pub identifier: String,
    pub supported_crs: String,
    pub tile_matrices: Vec<WmtsTileMatrix>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsTileMatrix {
    pub identifier: String,
    pub scale_denominator: f64,
    /// Top-left corner in CRS units (axis order as advertised)
    pub top_left_corner: (f64, f64),
    pub tile_width: u32,
    pub tile_height: u32,
    pub matrix_width: u32,
    pub matrix_height: u32,
}

impl WmtsLayerCapabilities {
    /// The style marked isDefault, or the first one listed.
    pub fn default_style(&self) -> Option<&WmtsStyle> {
        self.styles
            .iter()
            .find(|s| s.is_default)
            .or_else(|| self.styles.first())
    }

    /// RESTful tile template for the given format.
    pub fn tile_template(&self, format: &str) -> Option<&str> {
        self.resource_urls
            .iter()
            .find(|r| r.resource_type == "tile" && r.format == format)
            .map(|r| r.template.as_str())
    }
}

impl WmtsCapabilities {
    /// Parse a WMTS Capabilities document.
    pub fn parse(xml: &str) -> ViewerResult<Self> {
        let caps = WmtsParser::default().run(xml)?;
        debug!(
            layers = caps.layers.len(),
            tile_matrix_sets = caps.tile_matrix_sets.len(),
            "Parsed WMTS capabilities"
        );
        Ok(caps)
    }

    /// Find a layer by identifier.
    pub fn layer(&self, identifier: &str) -> Option<&WmtsLayerCapabilities> {
        self.layers.iter().find(|l| l.identifier == identifier)
    }

    pub fn tile_matrix_set(&self, identifier: &str) -> Option<&WmtsTileMatrixSet> {
        self.tile_matrix_sets
            .iter()
            .find(|t| t.identifier == identifier)
    }
}

#[derive(Debug, Default)]
struct WmtsParser {
    path: ElementPath,
    caps: WmtsCapabilities,
    seen_root: bool,
    layer: Option<WmtsLayerCapabilities>,
    style: Option<WmtsStyle>,
    matrix_set: Option<WmtsTileMatrixSet>,
    matrix: Option<WmtsTileMatrix>,
    operation: Option<String>,
}

impl WmtsParser {
    fn run(mut self, xml: &str) -> ViewerResult<WmtsCapabilities> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    self.open(&e)?;
                    self.path.push(&e);
                }
                Ok(Event::Empty(e)) => {
                    self.open(&e)?;
                    self.path.push(&e);
                    self.close();
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| xml_error(KIND, reader.buffer_position(), e))?;
                    self.text(text.trim())?;
                }
                Ok(Event::CData(t)) => {
                    let text = String::from_utf8_lossy(&t);
                    self.text(text.trim())?;
                }
                Ok(Event::End(_)) => self.close(),
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(KIND, reader.buffer_position(), e)),
                _ => {}
            }
            buf.clear();
        }

        if !self.seen_root {
            return Err(ViewerError::parse(KIND, "no Capabilities root element"));
        }
        Ok(self.caps)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> ViewerResult<()> {
        match e.local_name().as_ref() {
            b"Capabilities" if self.path.is_empty() => self.seen_root = true,
            b"ExceptionReport" if self.path.is_empty() => {
                return Err(ViewerError::parse(KIND, "server returned an ExceptionReport"));
            }
            b"Layer" if self.path.ends_with(&["Contents"]) => {
                self.layer = Some(WmtsLayerCapabilities::default());
            }
            b"Style" if self.layer.is_some() => {
                self.style = Some(WmtsStyle {
                    is_default: attr(e, "isDefault").as_deref() == Some("true"),
                    ..Default::default()
                });
            }
            b"ResourceURL" => {
                if let Some(layer) = self.layer.as_mut() {
                    layer.resource_urls.push(WmtsResourceUrl {
                        format: attr(e, "format").unwrap_or_default(),
                        resource_type: attr(e, "resourceType").unwrap_or_default(),
                        template: attr(e, "template").unwrap_or_default(),
                    });
                }
            }
            b"TileMatrixSet" if self.path.ends_with(&["Contents"]) => {
                self.matrix_set = Some(WmtsTileMatrixSet::default());
            }
            b"TileMatrix" if self.matrix_set.is_some() => {
                self.matrix = Some(WmtsTileMatrix::default());
            }
            b"Operation" => self.operation = attr(e, "name"),
            b"Get" if self.operation.as_deref() == Some("GetTile") => {
                // Prefer the KVP binding; RESTful access goes through ResourceURL.
                if self.caps.get_tile_url.is_none() {
                    self.caps.get_tile_url = attr(e, "href");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> ViewerResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let path = &self.path;

        if path.ends_with(&["ServiceIdentification", "Title"]) {
            self.caps.service_title = Some(text.to_string());
        } else if let Some(matrix) = self.matrix.as_mut() {
            if path.ends_with(&["TileMatrix", "Identifier"]) {
                matrix.identifier = text.to_string();
            } else if path.ends_with(&["ScaleDenominator"]) {
                matrix.scale_denominator = parse_f64(KIND, "ScaleDenominator", text)?;
            } else if path.ends_with(&["TopLeftCorner"]) {
                matrix.top_left_corner = parse_corner(KIND, text)?;
            } else if path.ends_with(&["TileWidth"]) {
                matrix.tile_width = parse_u32("TileWidth", text)?;
            } else if path.ends_with(&["TileHeight"]) {
                matrix.tile_height = parse_u32("TileHeight", text)?;
            } else if path.ends_with(&["MatrixWidth"]) {
                matrix.matrix_width = parse_u32("MatrixWidth", text)?;
            } else if path.ends_with(&["MatrixHeight"]) {
                matrix.matrix_height = parse_u32("MatrixHeight", text)?;
            }
        } else if let Some(set) = self.matrix_set.as_mut() {
            if path.ends_with(&["TileMatrixSet", "Identifier"]) {
                set.identifier = text.to_string();
            } else if path.ends_with(&["SupportedCRS"]) {
                set.supported_crs = text.to_string();
            }
        } else if let Some(style) = self.style.as_mut() {
            if path.ends_with(&["Style", "Identifier"]) {
                style.identifier = text.to_string();
            } else if path.ends_with(&["Style", "Title"]) {
                style.title = Some(text.to_string());
            }
        } else if let Some(layer) = self.layer.as_mut() {
            if path.ends_with(&["Layer", "Identifier"]) {
                layer.identifier = text.to_string();
            } else if path.ends_with(&["Layer", "Title"]) {
                layer.title = text.to_string();
            } else if path.ends_with(&["Layer", "Abstract"]) {
                layer.abstract_text = Some(text.to_string());
            } else if path.ends_with(&["Layer", "Format"]) {
                layer.formats.push(text.to_string());
            } else if path.ends_with(&["TileMatrixSetLink", "TileMatrixSet"]) {
                layer.tile_matrix_set_links.push(text.to_string());
            } else if path.ends_with(&["WGS84BoundingBox", "LowerCorner"]) {
                let (lon, lat) = parse_corner(KIND, text)?;
                let bbox = layer.wgs84_bbox.get_or_insert(GeoBox::GLOBE);
                bbox.min_lon = lon;
                bbox.min_lat = lat;
            } else if path.ends_with(&["WGS84BoundingBox", "UpperCorner"]) {
                let (lon, lat) = parse_corner(KIND, text)?;
                let bbox = layer.wgs84_bbox.get_or_insert(GeoBox::GLOBE);
                bbox.max_lon = lon;
                bbox.max_lat = lat;
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.path.ends_with(&["Contents", "Layer"]) {
            if let Some(layer) = self.layer.take() {
                self.caps.layers.push(layer);
            }
        } else if self.path.ends_with(&["Layer", "Style"]) {
            if let (Some(style), Some(layer)) = (self.style.take(), self.layer.as_mut()) {
                layer.styles.push(style);
            }
        } else if self.path.ends_with(&["Contents", "TileMatrixSet"]) {
            if let Some(set) = self.matrix_set.take() {
                self.caps.tile_matrix_sets.push(set);
            }
        } else if self.path.ends_with(&["TileMatrixSet", "TileMatrix"]) {
            if let (Some(matrix), Some(set)) = (self.matrix.take(), self.matrix_set.as_mut()) {
                set.tile_matrices.push(matrix);
            }
        } else if self.path.ends_with(&["Operation"]) {
            self.operation = None;
        }
        self.path.pop();
    }
}

fn parse_u32(field: &str, value: &str) -> ViewerResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| ViewerError::parse(KIND, format!("invalid integer for {}: '{}'", field, value)))
}
