use std::cmp::Reverse;
use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::decoder::rating::rate_candidate;
use crate::{
    BearingDirection, DecodeError, DecoderConfig, Line, LocationReferencePoint, MapDatabase,
    RatingScore,
};

/// Candidate line for a location reference point together with its rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateLine<LineId> {
    pub line: Line<LineId>,
    pub rating: RatingScore,
}

/// Rated candidate lines of a location reference point, ordered from the
/// best to the worst match.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLines<LineId> {
    pub lrp: LocationReferencePoint,
    pub lines: Vec<CandidateLine<LineId>>,
}

impl<LineId: Copy> CandidateLines<LineId> {
    /// Returns the candidate line with the highest rating.
    pub fn best_candidate(&self) -> Option<CandidateLine<LineId>> {
        self.lines.first().copied()
    }
}

/// Finds and rates the candidate lines of one location reference point.
///
/// Candidates are primarily the arcs of the nodes close to the LRP
/// coordinates: outgoing arcs when searching with the line direction,
/// incoming arcs for the last LRP which is searched against it. When direct
/// search is enabled the LRP coordinates are additionally projected onto
/// close-by lines; those candidates keep their full rating only if no node
/// was found, otherwise node-anchored candidates are preferred.
///
/// Candidates are grouped by line identity keeping the best rating, dropped
/// when rated below the acceptance minimum, and sorted best first with the
/// line identity as a deterministic tie break.
pub fn find_candidate_lines<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    lrp: &LocationReferencePoint,
    direction: BearingDirection,
) -> Result<CandidateLines<D::LineId>, DecodeError> {
    debug!("finding candidate lines for {lrp:?} {direction:?}");

    let frc_max = lrp.line.frc.with_variance(config.frc_variance);
    let nodes: Vec<_> = database
        .find_closeby_nodes(lrp.coords, config.max_node_distance)
        .collect();

    let mut best: FxHashMap<D::LineId, CandidateLine<D::LineId>> = FxHashMap::default();

    for node in &nodes {
        for line in database.connected_lines(node, frc_max, direction) {
            let rating = rate_candidate(config, lrp, &line, node.distance);
            trace!("rated {rating:?} connected line {line:?}");
            insert_best(&mut best, CandidateLine { line, rating });
        }
    }

    if config.find_lines_directly {
        for (line, distance) in
            database.find_closeby_lines(lrp.coords, config.max_node_distance, frc_max, direction)
        {
            let mut rating = rate_candidate(config, lrp, &line, distance);
            if !nodes.is_empty() {
                rating = (rating * config.projected_line_factor).round();
            }
            trace!("rated {rating:?} projected line {line:?}");
            insert_best(&mut best, CandidateLine { line, rating });
        }
    }

    let mut lines: Vec<_> = best
        .into_values()
        .filter(|candidate| candidate.rating >= config.min_acceptance_rating)
        .collect();
    lines.sort_unstable_by_key(|candidate| (Reverse(candidate.rating), candidate.line.id));

    if lines.is_empty() {
        return Err(DecodeError::CandidatesNotFound(*lrp));
    }

    debug!("accepted {} candidate lines", lines.len());
    Ok(CandidateLines { lrp: *lrp, lines })
}

fn insert_best<LineId: Copy + Eq + Ord + std::hash::Hash>(
    best: &mut FxHashMap<LineId, CandidateLine<LineId>>,
    candidate: CandidateLine<LineId>,
) {
    match best.entry(candidate.line.id) {
        Entry::Occupied(mut entry) => {
            if entry.get().rating < candidate.rating {
                entry.insert(candidate);
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{
        Bearing, Coordinate, Fow, Frc, Length, LineAttributes, Node, PathAttributes, RouteError,
    };

    /// Map stub with a fixed set of nodes and lines around one coordinate.
    struct FlatDatabase {
        nodes: Vec<Node<u32>>,
        /// Lines hanging off every node.
        connected: Vec<Line<&'static str>>,
        /// Lines found by projecting the search coordinates.
        projected: Vec<(Line<&'static str>, Length)>,
    }

    impl MapDatabase for FlatDatabase {
        type NodeId = u32;
        type LineId = &'static str;

        fn find_closeby_nodes(
            &self,
            _coords: Coordinate,
            max_distance: Length,
        ) -> impl Iterator<Item = Node<u32>> {
            self.nodes
                .iter()
                .filter(move |node| node.distance <= max_distance)
                .copied()
        }

        fn find_closeby_lines(
            &self,
            _coords: Coordinate,
            _max_distance: Length,
            frc_max: Frc,
            _direction: BearingDirection,
        ) -> impl Iterator<Item = (Line<&'static str>, Length)> {
            self.projected
                .iter()
                .filter(move |(line, _)| line.frc <= frc_max)
                .copied()
        }

        fn connected_lines(
            &self,
            _node: &Node<u32>,
            frc_max: Frc,
            _direction: BearingDirection,
        ) -> impl Iterator<Item = Line<&'static str>> {
            self.connected
                .iter()
                .filter(move |line| line.frc <= frc_max)
                .copied()
        }

        fn calculate_route(
            &self,
            _from: &Line<&'static str>,
            _to: &Line<&'static str>,
            _max_distance: Length,
            _lowest_frc: Frc,
            _to_last_point: bool,
        ) -> Result<(Vec<Line<&'static str>>, Length), RouteError> {
            Err(RouteError::NotFound)
        }
    }

    fn line(id: &'static str, frc: Frc, bearing: u8) -> Line<&'static str> {
        Line {
            id,
            reversed: false,
            reversed_in_database: false,
            bearing: Bearing::from_sector(bearing),
            frc,
            fow: Fow::SingleCarriageway,
            len: Length::from_meters(100.0),
            projected_len: None,
        }
    }

    fn lrp(frc: Frc, bearing: u8) -> LocationReferencePoint {
        LocationReferencePoint {
            line: LineAttributes {
                frc,
                fow: Fow::SingleCarriageway,
                bearing: Bearing::from_sector(bearing),
            },
            path: Some(PathAttributes::default()),
            ..Default::default()
        }
    }

    #[test]
    fn candidates_sorted_by_rating_descending() {
        let database = FlatDatabase {
            nodes: vec![Node {
                id: 1,
                distance: Length::ZERO,
            }],
            connected: vec![
                line("a", Frc::Frc5, 10),
                line("b", Frc::Frc3, 10),
                line("c", Frc::Frc4, 10),
            ],
            projected: vec![],
        };

        let candidates =
            find_candidate_lines(&DecoderConfig::default(), &database, &lrp(Frc::Frc3, 10), BearingDirection::WithLine)
                .unwrap();

        let ids: Vec<_> = candidates
            .lines
            .iter()
            .map(|candidate| candidate.line.id)
            .collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert!(candidates.lines.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn candidates_grouped_by_line_keeping_best_rating() {
        let mut projected = line("a", Frc::Frc3, 10);
        projected.projected_len = Some(Length::from_meters(40.0));

        let database = FlatDatabase {
            nodes: vec![Node {
                id: 1,
                distance: Length::from_meters(30.0),
            }],
            connected: vec![line("a", Frc::Frc3, 10)],
            projected: vec![(projected, Length::from_meters(5.0))],
        };

        let candidates = find_candidate_lines(
            &DecoderConfig::default(),
            &database,
            &lrp(Frc::Frc3, 10),
            BearingDirection::WithLine,
        )
        .unwrap();

        assert_eq!(candidates.lines.len(), 1);
        // node candidate: 3 * 70 + 3 * 300 = 1110
        // projected candidate: round(0.95 * (3 * 95 + 3 * 300)) = 1126
        assert_eq!(candidates.lines[0].rating, RatingScore::from(1126.0));
        assert!(candidates.lines[0].line.is_projected());
    }

    #[test]
    fn candidates_projected_rating_not_scaled_without_nodes() {
        let database = FlatDatabase {
            nodes: vec![],
            connected: vec![],
            projected: vec![(line("a", Frc::Frc3, 10), Length::ZERO)],
        };

        let candidates = find_candidate_lines(
            &DecoderConfig::default(),
            &database,
            &lrp(Frc::Frc3, 10),
            BearingDirection::WithLine,
        )
        .unwrap();

        assert_eq!(candidates.lines[0].rating, RatingScore::from(1200.0));
    }

    #[test]
    fn candidates_below_minimum_rating_are_dropped() {
        let database = FlatDatabase {
            nodes: vec![Node {
                id: 1,
                distance: Length::from_meters(99.0),
            }],
            // bearing is 8 sectors off and the FRC 2 classes off
            connected: vec![line("a", Frc::Frc5, 18)],
            projected: vec![],
        };

        assert!(matches!(
            find_candidate_lines(
                &DecoderConfig::default(),
                &database,
                &lrp(Frc::Frc3, 10),
                BearingDirection::WithLine
            ),
            Err(DecodeError::CandidatesNotFound(_))
        ));
    }

    #[test]
    fn candidates_growing_search_radius_is_monotonic() {
        let database = FlatDatabase {
            nodes: vec![
                Node {
                    id: 1,
                    distance: Length::from_meters(10.0),
                },
                Node {
                    id: 2,
                    distance: Length::from_meters(80.0),
                },
            ],
            connected: vec![line("a", Frc::Frc3, 10)],
            projected: vec![],
        };

        let mut previous = 0;
        for max_distance in [5.0, 50.0, 100.0] {
            let config = DecoderConfig {
                max_node_distance: Length::from_meters(max_distance),
                ..Default::default()
            };

            let count = find_candidate_lines(
                &config,
                &database,
                &lrp(Frc::Frc3, 10),
                BearingDirection::WithLine,
            )
            .map(|candidates| candidates.lines.len())
            .unwrap_or(0);

            assert!(count >= previous);
            previous = count;
        }
    }
}
