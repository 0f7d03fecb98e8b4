//! Drainage basin polygons and the grid-to-basin spatial join
//!
//! Basin membership of a grid point never changes during a run, so the join is
//! an explicit, separate step: [`build_join`] is called once and the resulting
//! [`SpatialJoinIndex`] is then reused for every analysis date.
//!
//! Greenland and Antarctica label their basin layers differently and only
//! Antarctica groups basins into coarser regions. That difference is captured
//! in an [`IceSheetLayout`] rather than branching on ice-sheet names.

use crate::errors::{IceMassError, IceMassResult};
use crate::grid::GridPoints;
use crate::FloatValue;
use geo::{BoundingRect, Intersects, MultiPolygon, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Ice sheets with observational mass-balance series
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IceSheet {
    /// Greenland Ice Sheet (`GIS`)
    Greenland,
    /// Antarctic Ice Sheet (`AIS`)
    Antarctic,
}

impl IceSheet {
    pub fn code(&self) -> &'static str {
        match self {
            IceSheet::Greenland => "GIS",
            IceSheet::Antarctic => "AIS",
        }
    }

    /// Attribute columns used by the standard IMBIE basin layers
    pub fn layout(&self) -> IceSheetLayout {
        match self {
            IceSheet::Greenland => IceSheetLayout {
                basin_column: "SUBREGION1".to_string(),
                region_column: None,
            },
            IceSheet::Antarctic => IceSheetLayout {
                basin_column: "Subregion".to_string(),
                region_column: Some("Regions".to_string()),
            },
        }
    }
}

impl fmt::Display for IceSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IceSheet {
    type Err = IceMassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GIS" => Ok(IceSheet::Greenland),
            "AIS" => Ok(IceSheet::Antarctic),
            _ => Err(IceMassError::UnknownIceSheet(s.to_string())),
        }
    }
}

impl TryFrom<String> for IceSheet {
    type Error = IceMassError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IceSheet> for String {
    fn from(value: IceSheet) -> Self {
        value.code().to_string()
    }
}

/// Which polygon attributes carry basin and (optionally) region labels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceSheetLayout {
    pub basin_column: String,
    pub region_column: Option<String>,
}

impl IceSheetLayout {
    pub fn has_regions(&self) -> bool {
        self.region_column.is_some()
    }
}

/// A polygon feature as read from a vector layer
#[derive(Clone, Debug)]
pub struct BasinFeature {
    pub geometry: MultiPolygon<FloatValue>,
    pub attributes: HashMap<String, String>,
}

#[derive(Clone, Debug)]
struct BasinPolygon {
    geometry: MultiPolygon<FloatValue>,
    bounds: Option<Rect<FloatValue>>,
    basin: usize,
    region: Option<usize>,
}

/// Basin polygons with interned basin and region labels
#[derive(Clone, Debug)]
pub struct BasinLayer {
    polygons: Vec<BasinPolygon>,
    basin_labels: Vec<String>,
    region_labels: Option<Vec<String>>,
}

impl BasinLayer {
    /// Build a layer from raw features using the attribute columns in `layout`
    ///
    /// Every feature must carry the basin attribute, and the region attribute
    /// when the layout defines one.
    pub fn from_features(
        features: Vec<BasinFeature>,
        layout: &IceSheetLayout,
    ) -> IceMassResult<Self> {
        let mut basin_labels = Vec::new();
        let mut region_labels = layout.region_column.as_ref().map(|_| Vec::new());
        let mut polygons = Vec::with_capacity(features.len());

        for (index, feature) in features.into_iter().enumerate() {
            let basin = feature
                .attributes
                .get(&layout.basin_column)
                .ok_or_else(|| IceMassError::MissingAttribute {
                    index,
                    column: layout.basin_column.clone(),
                })?;
            let basin = intern(&mut basin_labels, basin);

            let region = match (&layout.region_column, region_labels.as_mut()) {
                (Some(column), Some(labels)) => {
                    let region = feature.attributes.get(column).ok_or_else(|| {
                        IceMassError::MissingAttribute {
                            index,
                            column: column.clone(),
                        }
                    })?;
                    Some(intern(labels, region))
                }
                _ => None,
            };

            polygons.push(BasinPolygon {
                bounds: feature.geometry.bounding_rect(),
                geometry: feature.geometry,
                basin,
                region,
            });
        }

        Ok(Self {
            polygons,
            basin_labels,
            region_labels,
        })
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn basin_labels(&self) -> &[String] {
        &self.basin_labels
    }

    pub fn region_labels(&self) -> Option<&[String]> {
        self.region_labels.as_deref()
    }
}

fn intern(labels: &mut Vec<String>, label: &str) -> usize {
    match labels.iter().position(|l| l == label) {
        Some(index) => index,
        None => {
            labels.push(label.to_string());
            labels.len() - 1
        }
    }
}

/// A grid point matched to one basin polygon
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct JoinEntry {
    pub point: usize,
    pub basin: usize,
    pub region: Option<usize>,
}

/// Static association of grid points with the basin polygons containing them
///
/// This is an inner join: points outside every polygon are absent, and a point
/// covered by several overlapping polygons appears once per polygon.
#[derive(Clone, Debug)]
pub struct SpatialJoinIndex {
    entries: Vec<JoinEntry>,
    n_points: usize,
    basin_labels: Vec<String>,
    region_labels: Option<Vec<String>>,
}

impl SpatialJoinIndex {
    /// Number of grid points the index was built for
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Number of (point, polygon) matches
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn basin_labels(&self) -> &[String] {
        &self.basin_labels
    }

    pub fn region_labels(&self) -> Option<&[String]> {
        self.region_labels.as_deref()
    }

    pub(crate) fn entries(&self) -> &[JoinEntry] {
        &self.entries
    }
}

/// Join grid points against basin polygons (point intersects polygon)
///
/// Points on a polygon boundary count as inside.
pub fn build_join(points: &GridPoints, layer: &BasinLayer) -> SpatialJoinIndex {
    let mut entries = Vec::new();
    for (index, point) in points.iter().enumerate() {
        for polygon in &layer.polygons {
            let candidate = polygon
                .bounds
                .map_or(false, |bounds| bounds.intersects(point));
            if candidate && polygon.geometry.intersects(point) {
                entries.push(JoinEntry {
                    point: index,
                    basin: polygon.basin,
                    region: polygon.region,
                });
            }
        }
    }

    debug!(
        points = points.len(),
        polygons = layer.len(),
        matches = entries.len(),
        "Built basin spatial join"
    );

    SpatialJoinIndex {
        entries,
        n_points: points.len(),
        basin_labels: layer.basin_labels.clone(),
        region_labels: layer.region_labels.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    pub(crate) fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]])
    }

    pub(crate) fn feature(geometry: MultiPolygon<f64>, attrs: &[(&str, &str)]) -> BasinFeature {
        BasinFeature {
            geometry,
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn icesheet_codes() {
        assert_eq!("GIS".parse::<IceSheet>().unwrap(), IceSheet::Greenland);
        assert_eq!("AIS".parse::<IceSheet>().unwrap(), IceSheet::Antarctic);
        assert!(matches!(
            "ASE".parse::<IceSheet>(),
            Err(IceMassError::UnknownIceSheet(_))
        ));
        assert!(!IceSheet::Greenland.layout().has_regions());
        assert_eq!(
            IceSheet::Antarctic.layout().region_column.as_deref(),
            Some("Regions")
        );
    }

    #[test]
    fn layer_requires_layout_columns() {
        let layout = IceSheet::Antarctic.layout();
        let features = vec![feature(square(0.0, 0.0, 1.0, 1.0), &[("Subregion", "A-Ap")])];
        let err = BasinLayer::from_features(features, &layout).unwrap_err();
        assert!(matches!(
            err,
            IceMassError::MissingAttribute { index: 0, ref column } if column == "Regions"
        ));
    }

    #[test]
    fn join_matches_points_inside_and_on_boundary() {
        let layout = IceSheet::Greenland.layout();
        let layer = BasinLayer::from_features(
            vec![
                feature(square(-0.5, -0.5, 1.0, 1.5), &[("SUBREGION1", "NW")]),
                feature(square(1.5, -0.5, 2.5, 1.5), &[("SUBREGION1", "SW")]),
            ],
            &layout,
        )
        .unwrap();
        // x = 0, 1, 2, 3; y = 0, 1
        let points = GridPoints::from_coordinates(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0]);
        let join = build_join(&points, &layer);

        assert_eq!(join.n_points(), 8);
        let matched: Vec<_> = join.entries().iter().map(|e| (e.point, e.basin)).collect();
        // x = 1 lies on the NW boundary, x = 3 lies outside both basins
        assert_eq!(matched, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 1), (5, 1)]);
        assert_eq!(join.basin_labels(), ["NW", "SW"]);
        assert!(join.region_labels().is_none());
    }

    #[test]
    fn overlapping_polygons_match_twice() {
        let layout = IceSheet::Greenland.layout();
        let layer = BasinLayer::from_features(
            vec![
                feature(square(-1.0, -1.0, 1.0, 1.0), &[("SUBREGION1", "A")]),
                feature(square(-0.5, -0.5, 2.0, 2.0), &[("SUBREGION1", "B")]),
            ],
            &layout,
        )
        .unwrap();
        let points = GridPoints::from_coordinates(&[0.0, 5.0], &[0.0, 5.0]);
        let join = build_join(&points, &layer);
        assert_eq!(join.len(), 2);
        assert!(join.entries().iter().all(|e| e.point == 0));
    }
}
