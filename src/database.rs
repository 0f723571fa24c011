use std::fmt::Debug;
use std::hash::Hash;

use crate::{Bearing, Coordinate, Fow, Frc, Length, RouteError};

/// Direction of travel relative to the stored direction of a line.
/// Selects outbound arcs of a node (`WithLine`) or inbound arcs
/// (`AgainstLine`, used for the last location reference point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BearingDirection {
    WithLine,
    AgainstLine,
}

/// Network node returned by a close-by search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<NodeId> {
    pub id: NodeId,
    /// Straight line distance from the search coordinates.
    pub distance: Length,
}

/// Network line (directed edge) returned by the map database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<LineId> {
    pub id: LineId,
    /// True when the line is traversed against the direction it carries in
    /// the location reference.
    pub reversed: bool,
    /// True when the line is stored reversed in the map database.
    pub reversed_in_database: bool,
    /// Bearing sector measured at the end relevant to the search direction:
    /// at the start node for [`BearingDirection::WithLine`], at the end node
    /// for [`BearingDirection::AgainstLine`].
    pub bearing: Bearing,
    pub frc: Frc,
    pub fow: Fow,
    /// Total length of the line.
    pub len: Length,
    /// Distance from the start node to the projection of the search
    /// coordinates onto the line, when the line was found by projection
    /// rather than through a network node.
    pub projected_len: Option<Length>,
}

impl<LineId> Line<LineId> {
    pub const fn is_projected(&self) -> bool {
        self.projected_len.is_some()
    }
}

/// Abstract road network the decoder resolves location references against.
///
/// The decoder only needs a narrow capability set: spatial searches around a
/// coordinate, enumeration of the arcs of a node, and a shortest-path query
/// between two lines. Graph storage, spatial indexing and the routing engine
/// are entirely the implementor's concern, as is reprojecting coordinates
/// for metric distance computations.
pub trait MapDatabase {
    /// Uniquely identifies a node of the network.
    type NodeId: Debug + Copy;
    /// Uniquely identifies a directed line of the network.
    type LineId: Debug + Copy + Eq + Ord + Hash;

    /// Gets all nodes within `max_distance` of the coordinates, each carrying
    /// its straight line distance from them.
    fn find_closeby_nodes(
        &self,
        coords: Coordinate,
        max_distance: Length,
    ) -> impl Iterator<Item = Node<Self::NodeId>>;

    /// Gets all lines within `max_distance` of the coordinates together with
    /// their distance from them, restricted to lines of class `frc_max` or
    /// more important, oriented according to `direction`. The returned lines
    /// carry the projection of the coordinates in
    /// [`Line::projected_len`].
    fn find_closeby_lines(
        &self,
        coords: Coordinate,
        max_distance: Length,
        frc_max: Frc,
        direction: BearingDirection,
    ) -> impl Iterator<Item = (Line<Self::LineId>, Length)>;

    /// Gets the lines connected to the node: outgoing lines for
    /// [`BearingDirection::WithLine`], incoming lines for
    /// [`BearingDirection::AgainstLine`], restricted to lines of class
    /// `frc_max` or more important. The bearing of each returned line must
    /// correspond to the traversal direction implied by `direction`.
    fn connected_lines(
        &self,
        node: &Node<Self::NodeId>,
        frc_max: Frc,
        direction: BearingDirection,
    ) -> impl Iterator<Item = Line<Self::LineId>>;

    /// Calculates the shortest path from `from` to `to`, both included,
    /// using only lines of class `lowest_frc` or more important and never
    /// exceeding `max_distance` meters. Returns the ordered list of lines
    /// and the path length.
    ///
    /// `to_last_point` is true when the destination line belongs to the last
    /// location reference point of the location.
    fn calculate_route(
        &self,
        from: &Line<Self::LineId>,
        to: &Line<Self::LineId>,
        max_distance: Length,
        lowest_frc: Frc,
        to_last_point: bool,
    ) -> Result<(Vec<Line<Self::LineId>>, Length), RouteError>;
}
