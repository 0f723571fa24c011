//! Conversions of parsed location references into [`geo`] primitives.

use ::geo::{Coord, LineString, Point, Polygon, Rect, coord};

use crate::{BoundingBox, CircleReference, Coordinate, PolygonReference, RectangleReference};

impl From<Coordinate> for Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        coord! { x: coordinate.lon, y: coordinate.lat }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Self::new(coordinate.lon, coordinate.lat)
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(Coord::from(bbox.lower_left), Coord::from(bbox.upper_right))
    }
}

impl From<&RectangleReference> for Rect<f64> {
    fn from(rectangle: &RectangleReference) -> Self {
        rectangle.bbox.into()
    }
}

impl From<&PolygonReference> for Polygon<f64> {
    fn from(polygon: &PolygonReference) -> Self {
        let exterior: LineString<f64> = polygon
            .corners
            .iter()
            .map(|&corner| Coord::from(corner))
            .collect();
        Self::new(exterior, vec![])
    }
}

impl CircleReference {
    /// Center of the circle as a [`geo`] point.
    pub fn center_point(&self) -> Point<f64> {
        self.center.into()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn geo_bounding_box_to_rect() {
        let bbox = BoundingBox {
            lower_left: Coordinate { lon: 5.1, lat: 52.1 },
            upper_right: Coordinate { lon: 5.2, lat: 52.2 },
        };

        let rect = Rect::from(bbox);
        assert_eq!(rect.min(), coord! { x: 5.1, y: 52.1 });
        assert_eq!(rect.max(), coord! { x: 5.2, y: 52.2 });
    }

    #[test]
    fn geo_polygon_reference_to_polygon() {
        let reference = PolygonReference {
            corners: vec![
                Coordinate { lon: 0.0, lat: 0.0 },
                Coordinate { lon: 1.0, lat: 0.0 },
                Coordinate { lon: 1.0, lat: 1.0 },
            ],
        };

        let polygon = Polygon::from(&reference);
        // geo closes the exterior ring automatically
        assert_eq!(polygon.exterior().coords().count(), 4);
    }
}
