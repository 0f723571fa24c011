use crate::{Length, Line};

/// Defines a location in a map, as produced by the decoding process.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<LineId> {
    Line(LineLocationPath<LineId>),
    Point(PointLocationPath<LineId>),
}

/// One edge of a decoded location path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<LineId> {
    pub line: LineId,
    /// True when the edge is traversed against the direction it carries in
    /// the location reference.
    pub reversed: bool,
    /// True when the edge is stored reversed in the map database.
    pub reversed_in_database: bool,
    pub len: Length,
}

impl<LineId> From<Line<LineId>> for Edge<LineId> {
    fn from(line: Line<LineId>) -> Self {
        Self {
            line: line.id,
            reversed: line.reversed,
            reversed_in_database: line.reversed_in_database,
            len: line.len,
        }
    }
}

/// Path in the map covering a line location reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLocationPath<LineId> {
    /// Ordered edges forming the location, whole edges only.
    pub edges: Vec<Edge<LineId>>,
    /// Total length of the edges.
    pub length: Length,
    /// Remaining distance from the start of the first edge to the beginning
    /// of the location.
    pub pos_offset: Length,
    /// Remaining distance from the end of the location to the end of the
    /// last edge.
    pub neg_offset: Length,
}

impl<LineId> LineLocationPath<LineId> {
    pub(crate) fn from_lines(
        lines: impl IntoIterator<Item = Line<LineId>>,
        pos_offset: Length,
        neg_offset: Length,
    ) -> Self {
        let edges: Vec<_> = lines.into_iter().map(Edge::from).collect();
        let length = edges.iter().map(|edge| edge.len).sum();
        Self {
            edges,
            length,
            pos_offset,
            neg_offset,
        }
    }
}

/// Path in the map covering a point location, pointing at a position on its
/// first edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLocationPath<LineId> {
    /// Ordered edges of the access path.
    pub edges: Vec<Edge<LineId>>,
    /// Total length of the edges.
    pub length: Length,
    /// Distance from the start of the first edge to the point.
    pub offset: Length,
}

impl<LineId> PointLocationPath<LineId> {
    pub(crate) fn from_lines(lines: impl IntoIterator<Item = Line<LineId>>, offset: Length) -> Self {
        let edges: Vec<_> = lines.into_iter().map(Edge::from).collect();
        let length = edges.iter().map(|edge| edge.len).sum();
        Self {
            edges,
            length,
            offset,
        }
    }
}
