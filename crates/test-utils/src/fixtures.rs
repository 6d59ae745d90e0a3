//! Common test fixtures for the globe viewer.
//!
//! Capability documents here are trimmed copies of what real servers return;
//! they keep the elements the parsers look at and little else.

/// Common bounding boxes as (min_lat, max_lat, min_lon, max_lon).
pub mod bbox {
    /// Whole globe
    pub const GLOBAL: (f64, f64, f64, f64) = (-90.0, 90.0, -180.0, 180.0);

    /// 20x20 degree box centered on the origin
    pub const ORIGIN_20: (f64, f64, f64, f64) = (-10.0, 10.0, -10.0, 10.0);

    /// Nearly global box whose diagonal exceeds a hemisphere
    pub const HEMISPHERE_PLUS: (f64, f64, f64, f64) = (-90.0, 89.0, -179.0, 179.0);

    /// Brian Head fire area, Utah
    pub const BRIAN_HEAD: (f64, f64, f64, f64) = (37.55, 37.80, -112.95, -112.60);

    /// Crosses the antimeridian (west > east)
    pub const PACIFIC: (f64, f64, f64, f64) = (-50.0, 50.0, 160.0, -140.0);
}

/// Endpoints used by the mock services.
pub mod urls {
    pub const ARCGIS_ROOT: &str = "http://recover.example.org/arcgis";
    pub const FOLDER: &str = "RECOVER3_BrianheadFire_UT";
    pub const FIRE_SERVICE: &str = "RECOVER3_BrianheadFire_UT/Burn_Severity";
    pub const EOX_WMS: &str = "https://tiles.maps.eox.at/wms";
    pub const USGS_TOPO_WMTS: &str =
        "https://basemap.nationalmap.gov/arcgis/rest/services/USGSTopo/MapServer/WMTS/1.0.0/WMTSCapabilities.xml";
}

/// ArcGIS REST folder listing with one map service and one feature service.
pub const ARCGIS_FOLDER_JSON: &str = r#"{
  "currentVersion": 10.51,
  "folders": [],
  "services": [
    {"name": "RECOVER3_BrianheadFire_UT/Burn_Severity", "type": "MapServer"},
    {"name": "RECOVER3_BrianheadFire_UT/Field_Notes", "type": "FeatureServer"}
  ]
}"#;

/// ArcGIS REST MapServer metadata advertising WMS.
pub const ARCGIS_SERVICE_WMS_JSON: &str = r#"{
  "currentVersion": 10.51,
  "mapName": "Burn Severity",
  "serviceDescription": "",
  "supportedExtensions": "KmlServer, WMSServer",
  "layers": [{"id": 0, "name": "A"}, {"id": 1, "name": "B"}],
  "fullExtent": {
    "xmin": -112.95, "ymin": 37.55, "xmax": -112.60, "ymax": 37.80,
    "spatialReference": {"wkid": 4326, "latestWkid": 4326}
  }
}"#;

/// ArcGIS REST MapServer metadata without WMS.
pub const ARCGIS_SERVICE_NO_WMS_JSON: &str = r#"{
  "currentVersion": 10.51,
  "supportedExtensions": "KmlServer"
}"#;

/// WMS 1.3.0 capabilities with two named layers, "A" and "B", under an
/// unnamed root layer. "A" carries its own extent; "B" inherits the root's.
pub const WMS_130_TWO_LAYERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service>
    <Name>WMS</Name>
    <Title>Burn_Severity</Title>
  </Service>
  <Capability>
    <Request>
      <GetCapabilities>
        <Format>application/vnd.ogc.wms_xml</Format>
      </GetCapabilities>
      <GetMap>
        <Format>image/png</Format>
        <Format>image/jpeg</Format>
        <DCPType><HTTP><Get>
          <OnlineResource xlink:type="simple" xlink:href="http://recover.example.org/arcgis/services/RECOVER3_BrianheadFire_UT/Burn_Severity/MapServer/WMSServer?"/>
        </Get></HTTP></DCPType>
      </GetMap>
    </Request>
    <Layer>
      <Title>Burn_Severity</Title>
      <CRS>CRS:84</CRS>
      <CRS>EPSG:4326</CRS>
      <EX_GeographicBoundingBox>
        <westBoundLongitude>-113.0</westBoundLongitude>
        <eastBoundLongitude>-112.5</eastBoundLongitude>
        <southBoundLatitude>37.5</southBoundLatitude>
        <northBoundLatitude>37.9</northBoundLatitude>
      </EX_GeographicBoundingBox>
      <Layer queryable="1">
        <Name>0</Name>
        <Title>A</Title>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>-112.95</westBoundLongitude>
          <eastBoundLongitude>-112.60</eastBoundLongitude>
          <southBoundLatitude>37.55</southBoundLatitude>
          <northBoundLatitude>37.80</northBoundLatitude>
        </EX_GeographicBoundingBox>
        <Style><Name>default</Name><Title>0</Title></Style>
      </Layer>
      <Layer queryable="1">
        <Name>1</Name>
        <Title>B</Title>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

/// WMS 1.1.1 capabilities using LatLonBoundingBox and SRS.
pub const WMS_111_EOX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE WMT_MS_Capabilities SYSTEM "http://schemas.opengis.net/wms/1.1.1/WMS_MS_Capabilities.dtd">
<WMT_MS_Capabilities version="1.1.1">
  <Service>
    <Name>OGC:WMS</Name>
    <Title>EOX Maps</Title>
  </Service>
  <Capability>
    <Request>
      <GetMap>
        <Format>image/jpeg</Format>
        <DCPType><HTTP><Get>
          <OnlineResource xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="https://tiles.maps.eox.at/wms?"/>
        </Get></HTTP></DCPType>
      </GetMap>
    </Request>
    <Layer>
      <Title>EOX Maps</Title>
      <SRS>EPSG:4326 EPSG:3857</SRS>
      <LatLonBoundingBox minx="-180" miny="-90" maxx="180" maxy="90"/>
      <Layer>
        <Name>osm</Name>
        <Title>OpenStreetMap background layer by EOX</Title>
      </Layer>
      <Layer>
        <Name>overlay</Name>
        <Title>Overlay by EOX</Title>
        <LatLonBoundingBox minx="-180" miny="-85" maxx="180" maxy="85"/>
      </Layer>
    </Layer>
  </Capability>
</WMT_MS_Capabilities>"#;

/// WMTS capabilities for the USGS topo base map.
pub const WMTS_USGS_TOPO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wmts/1.0" xmlns:ows="http://www.opengis.net/ows/1.1" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.0.0">
  <ows:ServiceIdentification>
    <ows:Title>USGSTopo</ows:Title>
    <ows:ServiceType>OGC WMTS</ows:ServiceType>
    <ows:ServiceTypeVersion>1.0.0</ows:ServiceTypeVersion>
  </ows:ServiceIdentification>
  <ows:OperationsMetadata>
    <ows:Operation name="GetCapabilities">
      <ows:DCP><ows:HTTP>
        <ows:Get xlink:href="https://basemap.nationalmap.gov/arcgis/rest/services/USGSTopo/MapServer/WMTS/1.0.0/WMTSCapabilities.xml"/>
      </ows:HTTP></ows:DCP>
    </ows:Operation>
    <ows:Operation name="GetTile">
      <ows:DCP><ows:HTTP>
        <ows:Get xlink:href="https://basemap.nationalmap.gov/arcgis/rest/services/USGSTopo/MapServer/WMTS?"/>
      </ows:HTTP></ows:DCP>
    </ows:Operation>
  </ows:OperationsMetadata>
  <Contents>
    <Layer>
      <ows:Title>USGSTopo</ows:Title>
      <ows:Identifier>USGSTopo</ows:Identifier>
      <ows:WGS84BoundingBox crs="urn:ogc:def:crs:OGC:2:84">
        <ows:LowerCorner>-179.99999999999997 -88.99999999999999</ows:LowerCorner>
        <ows:UpperCorner>179.99999999999997 88.99999999999999</ows:UpperCorner>
      </ows:WGS84BoundingBox>
      <Style isDefault="true">
        <ows:Title>Default Style</ows:Title>
        <ows:Identifier>default</ows:Identifier>
      </Style>
      <Format>image/jpgpng</Format>
      <TileMatrixSetLink><TileMatrixSet>default028mm</TileMatrixSet></TileMatrixSetLink>
      <TileMatrixSetLink><TileMatrixSet>GoogleMapsCompatible</TileMatrixSet></TileMatrixSetLink>
      <ResourceURL format="image/jpgpng" resourceType="tile" template="https://basemap.nationalmap.gov/arcgis/rest/services/USGSTopo/MapServer/WMTS/tile/1.0.0/USGSTopo/{Style}/{TileMatrixSet}/{TileMatrix}/{TileRow}/{TileCol}"/>
    </Layer>
    <TileMatrixSet>
      <ows:Title>GoogleMapsCompatible</ows:Title>
      <ows:Identifier>GoogleMapsCompatible</ows:Identifier>
      <ows:SupportedCRS>urn:ogc:def:crs:EPSG::3857</ows:SupportedCRS>
      <WellKnownScaleSet>urn:ogc:def:wkss:OGC:1.0:GoogleMapsCompatible</WellKnownScaleSet>
      <TileMatrix>
        <ows:Identifier>0</ows:Identifier>
        <ScaleDenominator>559082264.0287178</ScaleDenominator>
        <TopLeftCorner>-20037508.34278925 20037508.34278925</TopLeftCorner>
        <TileWidth>256</TileWidth>
        <TileHeight>256</TileHeight>
        <MatrixWidth>1</MatrixWidth>
        <MatrixHeight>1</MatrixHeight>
      </TileMatrix>
      <TileMatrix>
        <ows:Identifier>1</ows:Identifier>
        <ScaleDenominator>279541132.0143589</ScaleDenominator>
        <TopLeftCorner>-20037508.34278925 20037508.34278925</TopLeftCorner>
        <TileWidth>256</TileWidth>
        <TileHeight>256</TileHeight>
        <MatrixWidth>2</MatrixWidth>
        <MatrixHeight>2</MatrixHeight>
      </TileMatrix>
    </TileMatrixSet>
  </Contents>
</Capabilities>"#;
