//! WMS GetCapabilities parsing (WMS 1.1.1 and 1.3.0).
//!
//! Only the parts the viewer needs are kept: the layer tree with names,
//! titles, CRS lists, styles and geographic extents, plus the GetMap
//! endpoint and formats. Extents and CRS lists are inherited from parent
//! layers as WMS 1.1.1 and 1.3.0 require.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use viewer_common::{DocumentKind, GeoBox, ViewerError, ViewerResult};

use crate::xml::{attr, parse_f64, xml_error, ElementPath};

const KIND: DocumentKind = DocumentKind::WmsCapabilities;

/// A parsed WMS capabilities document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmsCapabilities {
    /// Protocol version advertised by the server ("1.3.0", "1.1.1")
    pub version: String,
    pub service_title: Option<String>,
    /// GetMap endpoint from the OperationsMetadata/Request section
    pub get_map_url: Option<String>,
    pub get_map_formats: Vec<String>,
    /// Top-level layers; named layers may be nested below them
    pub layers: Vec<WmsLayerCapabilities>,
}

/// One `<Layer>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmsLayerCapabilities {
    /// Absent for category-only layers that cannot be requested
    pub name: Option<String>,
    pub title: String,
    pub abstract_text: Option<String>,
    /// Geographic extent (own or inherited)
    pub geographic_bbox: Option<GeoBox>,
    /// Supported CRS/SRS codes (own and inherited)
    pub crs: Vec<String>,
    pub styles: Vec<String>,
    pub queryable: bool,
    pub children: Vec<WmsLayerCapabilities>,
}

impl WmsLayerCapabilities {
    /// Name shown to users: the title, falling back to the layer name.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            self.name.as_deref().unwrap_or_default()
        } else {
            &self.title
        }
    }
}

impl WmsCapabilities {
    /// Parse a GetCapabilities response body.
    pub fn parse(xml: &str) -> ViewerResult<Self> {
        let mut caps = WmsParser::default().run(xml)?;
        for layer in &mut caps.layers {
            inherit(layer, None, &[]);
        }
        debug!(
            version = %caps.version,
            named_layers = caps.named_layers().len(),
            "Parsed WMS capabilities"
        );
        Ok(caps)
    }

    /// Every layer that has a name, in document order (depth first).
    pub fn named_layers(&self) -> Vec<&WmsLayerCapabilities> {
        fn walk<'a>(layers: &'a [WmsLayerCapabilities], out: &mut Vec<&'a WmsLayerCapabilities>) {
            for layer in layers {
                if layer.name.is_some() {
                    out.push(layer);
                }
                walk(&layer.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.layers, &mut out);
        out
    }

    /// Find a named layer.
    pub fn named_layer(&self, name: &str) -> Option<&WmsLayerCapabilities> {
        self.named_layers()
            .into_iter()
            .find(|l| l.name.as_deref() == Some(name))
    }
}

fn inherit(layer: &mut WmsLayerCapabilities, parent_bbox: Option<GeoBox>, parent_crs: &[String]) {
    if layer.geographic_bbox.is_none() {
        layer.geographic_bbox = parent_bbox;
    }
    for crs in parent_crs {
        if !layer.crs.contains(crs) {
            layer.crs.push(crs.clone());
        }
    }
    let bbox = layer.geographic_bbox;
    let crs = layer.crs.clone();
    for child in &mut layer.children {
        inherit(child, bbox, &crs);
    }
}

#[derive(Debug, Default)]
struct Extent {
    west: Option<f64>,
    east: Option<f64>,
    south: Option<f64>,
    north: Option<f64>,
}

impl Extent {
    fn complete(&self) -> Option<GeoBox> {
        Some(GeoBox::from_corners(self.west?, self.south?, self.east?, self.north?))
    }
}

#[derive(Debug, Default)]
struct LayerBuilder {
    layer: WmsLayerCapabilities,
    extent: Extent,
}

#[derive(Debug, Default)]
struct WmsParser {
    path: ElementPath,
    caps: WmsCapabilities,
    open_layers: Vec<LayerBuilder>,
}

impl WmsParser {
    fn run(mut self, xml: &str) -> ViewerResult<WmsCapabilities> {
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
                    self.close()?;
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
                Ok(Event::End(_)) => self.close()?,
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(KIND, reader.buffer_position(), e)),
                _ => {}
            }
            buf.clear();
        }

        if self.caps.version.is_empty() {
            return Err(ViewerError::parse(KIND, "no WMS_Capabilities root element"));
        }
        Ok(self.caps)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> ViewerResult<()> {
        match e.local_name().as_ref() {
            b"WMS_Capabilities" | b"WMT_MS_Capabilities" if self.path.is_empty() => {
                self.caps.version = attr(e, "version").unwrap_or_else(|| "1.3.0".to_string());
            }
            b"ServiceExceptionReport" if self.path.is_empty() => {
                return Err(ViewerError::parse(KIND, "server returned a ServiceExceptionReport"));
            }
            b"Layer" => {
                let mut builder = LayerBuilder::default();
                builder.layer.queryable = attr(e, "queryable").as_deref() == Some("1");
                self.open_layers.push(builder);
            }
            b"LatLonBoundingBox" => {
                if let Some(builder) = self.open_layers.last_mut() {
                    let read = |name: &str| -> ViewerResult<f64> {
                        let value = attr(e, name).ok_or_else(|| {
                            ViewerError::parse(KIND, format!("LatLonBoundingBox missing {}", name))
                        })?;
                        parse_f64(KIND, name, &value)
                    };
                    builder.layer.geographic_bbox = Some(GeoBox::from_corners(
                        read("minx")?,
                        read("miny")?,
                        read("maxx")?,
                        read("maxy")?,
                    ));
                }
            }
            b"OnlineResource" if self.path.ends_with(&["GetMap", "DCPType", "HTTP", "Get"]) => {
                if let Some(href) = attr(e, "href") {
                    self.caps.get_map_url = Some(href);
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

        if path.ends_with(&["Service", "Title"]) {
            self.caps.service_title = Some(text.to_string());
            return Ok(());
        }
        if path.ends_with(&["GetMap", "Format"]) {
            self.caps.get_map_formats.push(text.to_string());
            return Ok(());
        }

        let Some(builder) = self.open_layers.last_mut() else {
            return Ok(());
        };
        if path.ends_with(&["Layer", "Name"]) {
            builder.layer.name = Some(text.to_string());
        } else if path.ends_with(&["Layer", "Title"]) {
            builder.layer.title = text.to_string();
        } else if path.ends_with(&["Layer", "Abstract"]) {
            builder.layer.abstract_text = Some(text.to_string());
        } else if path.ends_with(&["Layer", "CRS"]) || path.ends_with(&["Layer", "SRS"]) {
            // 1.1.1 servers sometimes pack several codes into one SRS element
            for code in text.split_whitespace() {
                builder.layer.crs.push(code.to_string());
            }
        } else if path.ends_with(&["Layer", "Style", "Name"]) {
            builder.layer.styles.push(text.to_string());
        } else if path.contains("EX_GeographicBoundingBox") {
            let value = |field| parse_f64(KIND, field, text);
            if path.ends_with(&["westBoundLongitude"]) {
                builder.extent.west = Some(value("westBoundLongitude")?);
            } else if path.ends_with(&["eastBoundLongitude"]) {
                builder.extent.east = Some(value("eastBoundLongitude")?);
            } else if path.ends_with(&["southBoundLatitude"]) {
                builder.extent.south = Some(value("southBoundLatitude")?);
            } else if path.ends_with(&["northBoundLatitude"]) {
                builder.extent.north = Some(value("northBoundLatitude")?);
            }
        }
        Ok(())
    }

    fn close(&mut self) -> ViewerResult<()> {
        if self.path.ends_with(&["Layer"]) {
            if let Some(builder) = self.open_layers.pop() {
                let mut layer = builder.layer;
                if let Some(bbox) = builder.extent.complete() {
                    layer.geographic_bbox = Some(bbox);
                }
                match self.open_layers.last_mut() {
                    Some(parent) => parent.layer.children.push(layer),
                    None => self.caps.layers.push(layer),
                }
            }
        }
        self.path.pop();
        Ok(())
    }
}
