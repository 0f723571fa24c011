use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::decoder::candidates::CandidateLines;
use crate::decoder::route::{Route, Routes};
use crate::{
    DecodeError, DecoderConfig, Length, Line, LocationReferencePoint, MapDatabase, RatingScore,
    RouteError,
};

/// Resolves the routes between each subsequent pair of location reference
/// points.
///
/// For every pair the candidate line pairs are ordered by their combined
/// score and tried best first: a route search failure, a construction
/// failure or a route length outside the bounds given by the distance to the
/// next point all move on to the next pair, up to the configured number of
/// retries. Choosing a start line different from the end line accepted for
/// the previous pair triggers a recomputation of the previous route (a
/// one-step look-back, not a general backtrack).
///
/// Returns one route per pair of subsequent LRPs, skipping empty routes
/// produced by pairs that share the same line.
pub fn resolve_routes<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    candidates: &[CandidateLines<D::LineId>],
    is_line_location: bool,
) -> Result<Routes<D::LineId>, DecodeError> {
    if let Some(line) = single_line_coverage(candidates) {
        debug!("all location reference points are covered by {line:?}");
        return Ok(Routes::from(vec![Route {
            length: line.len,
            lines: vec![line],
        }]));
    }

    let mut routes: Vec<Route<D::LineId>> = Vec::with_capacity(candidates.len().saturating_sub(1));
    let mut last_line: Option<Line<D::LineId>> = None;
    let mut previous_lrp: Option<LocationReferencePoint> = None;

    for (index, pair) in candidates.windows(2).enumerate() {
        let [candidates_lrp1, candidates_lrp2] = [&pair[0], &pair[1]];
        let is_last_pair = index + 2 == candidates.len();

        let pairs = candidate_pairs(
            config,
            candidates_lrp1,
            candidates_lrp2,
            last_line.as_ref(),
            is_last_pair,
            is_line_location,
        );

        let mut accepted = None;

        for pair in pairs.into_iter().take(config.max_retries + 1) {
            let CandidatePair { first, second, .. } = pair;
            debug!("computing route ({:?}, {:?})", first.id, second.id);

            if first.id == second.id {
                // the pair needs no route search: the final pair resolves to
                // the line itself, any other pair to the empty route
                let route = if is_last_pair {
                    Route {
                        length: first.len,
                        lines: vec![first],
                    }
                } else {
                    Route::empty()
                };
                accepted = Some((route, second));
                break;
            }

            let route = match route_between(
                config,
                database,
                &first,
                &second,
                &candidates_lrp1.lrp,
                is_last_pair,
            ) {
                Ok(route) => route,
                Err(error) => {
                    trace!("route ({:?}, {:?}) failed: {error}", first.id, second.id);
                    continue;
                }
            };

            if let Some(last) = &last_line
                && last.id != first.id
                && let Err(error) =
                    repair_previous_route(config, database, &mut routes, &first, &previous_lrp)
            {
                trace!("repair of the previous route failed: {error}");
                continue;
            }

            accepted = Some((route, second));
            break;
        }

        let Some((route, end_line)) = accepted else {
            return Err(DecodeError::RouteNotFound);
        };

        if !route.lines.is_empty() {
            debug!("resolved route of length {:?}", route.length);
            routes.push(route);
        }

        previous_lrp = Some(candidates_lrp1.lrp);
        last_line = Some(end_line);
    }

    Ok(Routes::from(routes))
}

/// Candidate line pair for two subsequent location reference points.
#[derive(Debug, Clone, Copy)]
struct CandidatePair<LineId> {
    first: Line<LineId>,
    second: Line<LineId>,
    rating: RatingScore,
}

/// Builds all candidate line pairs of two subsequent LRPs ordered by their
/// combined score, best first.
///
/// A first line continuing the previously resolved route is rewarded; a pair
/// reusing the same line on both ends of a non-final section of a line
/// location is discouraged, as it would produce a zero-length route.
fn candidate_pairs<LineId: Copy + Eq + Ord>(
    config: &DecoderConfig,
    first: &CandidateLines<LineId>,
    second: &CandidateLines<LineId>,
    last_line: Option<&Line<LineId>>,
    is_last_pair: bool,
    is_line_location: bool,
) -> Vec<CandidatePair<LineId>> {
    let mut pairs = Vec::with_capacity(first.lines.len() * second.lines.len());

    for candidate1 in &first.lines {
        let mut rating1 = candidate1.rating;
        if let Some(last) = last_line
            && last.id == candidate1.line.id
        {
            rating1 = rating1 * (1.0 + config.connected_route_increase);
        }

        for candidate2 in &second.lines {
            let mut rating2 = candidate2.rating;
            if !is_last_pair && is_line_location && candidate2.line.id == candidate1.line.id {
                rating2 = rating2 * (1.0 - config.same_line_degradation);
            }

            pairs.push(CandidatePair {
                first: candidate1.line,
                second: candidate2.line,
                rating: rating1 * rating2,
            });
        }
    }

    // stable: pairs with equal scores keep the candidate rating order
    pairs.sort_by_key(|pair| Reverse(pair.rating));
    pairs
}

/// Returns the line covering the whole location when the top candidate of
/// every location reference point is the same line.
fn single_line_coverage<LineId: Copy + Eq>(
    candidates: &[CandidateLines<LineId>],
) -> Option<Line<LineId>> {
    let mut bests = candidates.iter().map(CandidateLines::best_candidate);
    let first = bests.next()??;

    for best in bests {
        if best?.line.id != first.line.id {
            return None;
        }
    }

    Some(first.line)
}

/// Calculates the route between two candidate lines and validates its length
/// against the distance to the next point encoded in the LRP.
fn route_between<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    from: &Line<D::LineId>,
    to: &Line<D::LineId>,
    lrp: &LocationReferencePoint,
    to_last_point: bool,
) -> Result<Route<D::LineId>, RouteError> {
    let path = lrp.path.unwrap_or_default();
    let lowest_frc = path.lfrcnp.with_variance(config.frc_variance);

    // The route search stops at network nodes, so when an endpoint was
    // obtained by projection the whole line length must widen the budget.
    let mut max_distance = path.dnp + config.dnp_variance;
    if from.is_projected() {
        max_distance += from.len;
    }
    if to.is_projected() {
        max_distance += to.len;
    }

    let (lines, mut length) =
        database.calculate_route(from, to, max_distance, lowest_frc, to_last_point)?;

    if let Some(projected) = to.projected_len {
        if to_last_point {
            length -= to.len;
        }
        length += projected;
    }

    let minimum = Length::from_meters((path.dnp - config.dnp_variance).meters().max(0.0));
    if minimum > length {
        return Err(RouteError::InvalidLength);
    }

    Ok(Route { lines, length })
}

/// Recomputes the previously accepted route so that it ends on the start
/// line chosen for the current pair.
fn repair_previous_route<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    routes: &mut [Route<D::LineId>],
    new_end: &Line<D::LineId>,
    previous_lrp: &Option<LocationReferencePoint>,
) -> Result<(), RouteError> {
    let Some(previous_route) = routes.last_mut() else {
        return Ok(());
    };
    let Some(lrp) = previous_lrp else {
        return Ok(());
    };
    let Some(start) = previous_route.lines.first().copied() else {
        return Ok(());
    };

    debug!(
        "recomputing the previous route between {:?} and {:?}",
        start.id, new_end.id
    );
    *previous_route = route_between(config, database, &start, new_end, lrp, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;
    use test_log::test;

    use super::*;
    use crate::decoder::candidates::CandidateLine;
    use crate::{
        Bearing, Coordinate, Fow, Frc, LineAttributes, Node, PathAttributes,
    };

    /// Map stub resolving routes from a scripted table of line id pairs.
    struct RouteTable {
        routes: FxHashMap<(&'static str, &'static str), (Vec<Line<&'static str>>, f64)>,
    }

    impl RouteTable {
        fn new(
            routes: impl IntoIterator<
                Item = ((&'static str, &'static str), (Vec<Line<&'static str>>, f64)),
            >,
        ) -> Self {
            Self {
                routes: routes.into_iter().collect(),
            }
        }
    }

    impl MapDatabase for RouteTable {
        type NodeId = u32;
        type LineId = &'static str;

        fn find_closeby_nodes(
            &self,
            _coords: Coordinate,
            _max_distance: Length,
        ) -> impl Iterator<Item = Node<u32>> {
            std::iter::empty()
        }

        fn find_closeby_lines(
            &self,
            _coords: Coordinate,
            _max_distance: Length,
            _frc_max: Frc,
            _direction: crate::BearingDirection,
        ) -> impl Iterator<Item = (Line<&'static str>, Length)> {
            std::iter::empty()
        }

        fn connected_lines(
            &self,
            _node: &Node<u32>,
            _frc_max: Frc,
            _direction: crate::BearingDirection,
        ) -> impl Iterator<Item = Line<&'static str>> {
            std::iter::empty()
        }

        fn calculate_route(
            &self,
            from: &Line<&'static str>,
            to: &Line<&'static str>,
            _max_distance: Length,
            _lowest_frc: Frc,
            _to_last_point: bool,
        ) -> Result<(Vec<Line<&'static str>>, Length), RouteError> {
            self.routes
                .get(&(from.id, to.id))
                .map(|(lines, length)| (lines.clone(), Length::from_meters(*length)))
                .ok_or(RouteError::NotFound)
        }
    }

    fn line(id: &'static str) -> Line<&'static str> {
        Line {
            id,
            reversed: false,
            reversed_in_database: false,
            bearing: Bearing::from_sector(0),
            frc: Frc::Frc3,
            fow: Fow::SingleCarriageway,
            len: Length::from_meters(100.0),
            projected_len: None,
        }
    }

    fn lrp(dnp: f64) -> LocationReferencePoint {
        LocationReferencePoint {
            line: LineAttributes::default(),
            path: Some(PathAttributes {
                lfrcnp: Frc::Frc3,
                dnp: Length::from_meters(dnp),
            }),
            ..Default::default()
        }
    }

    fn last_lrp() -> LocationReferencePoint {
        LocationReferencePoint::default()
    }

    fn candidates(
        lrp: LocationReferencePoint,
        lines: &[(Line<&'static str>, f64)],
    ) -> CandidateLines<&'static str> {
        CandidateLines {
            lrp,
            lines: lines
                .iter()
                .map(|(line, rating)| CandidateLine {
                    line: *line,
                    rating: RatingScore::from(*rating),
                })
                .collect(),
        }
    }

    #[test]
    fn resolver_single_line_fast_path() {
        let database = RouteTable::new([]);

        let candidates = [
            candidates(lrp(100.0), &[(line("a"), 900.0), (line("b"), 850.0)]),
            candidates(last_lrp(), &[(line("a"), 880.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].length, Length::from_meters(100.0));
        assert_eq!(routes[0].lines[0].id, "a");
    }

    #[test]
    fn resolver_routes_best_pair() {
        let database = RouteTable::new([(
            ("a", "b"),
            (vec![line("a"), line("x"), line("b")], 300.0),
        )]);

        let candidates = [
            candidates(lrp(250.0), &[(line("a"), 900.0)]),
            candidates(last_lrp(), &[(line("b"), 880.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].length, Length::from_meters(300.0));
        let ids: Vec<_> = routes[0].lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, ["a", "x", "b"]);
    }

    #[test]
    fn resolver_retries_next_pair_when_route_not_found() {
        // no route exists towards "b", the second best candidate works
        let database = RouteTable::new([(("a", "c"), (vec![line("a"), line("c")], 200.0))]);

        let candidates = [
            candidates(lrp(150.0), &[(line("a"), 900.0)]),
            candidates(last_lrp(), &[(line("b"), 880.0), (line("c"), 860.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        assert_eq!(routes.len(), 1);
        let ids: Vec<_> = routes[0].lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn resolver_fails_after_retries_exhausted() {
        let database = RouteTable::new([]);

        let candidates = [
            candidates(lrp(150.0), &[(line("a"), 900.0)]),
            candidates(last_lrp(), &[(line("b"), 880.0)]),
        ];

        assert_eq!(
            resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap_err(),
            DecodeError::RouteNotFound
        );
    }

    #[test]
    fn resolver_rejects_route_shorter_than_dnp_allows() {
        // the only route is 100m but the reference requires at least
        // 500 - 118 = 382m to the next point
        let database = RouteTable::new([(("a", "b"), (vec![line("a"), line("b")], 100.0))]);

        let candidates = [
            candidates(lrp(500.0), &[(line("a"), 900.0)]),
            candidates(last_lrp(), &[(line("b"), 880.0)]),
        ];

        assert_eq!(
            resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap_err(),
            DecodeError::RouteNotFound
        );
    }

    #[test]
    fn resolver_elides_empty_route_of_same_line_pair() {
        let database = RouteTable::new([(("a", "b"), (vec![line("a"), line("b")], 150.0))]);

        let candidates = [
            candidates(lrp(100.0), &[(line("a"), 900.0)]),
            candidates(lrp(150.0), &[(line("a"), 820.0), (line("z"), 800.0)]),
            candidates(last_lrp(), &[(line("b"), 880.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        // the first pair resolves to the empty route and is skipped
        assert_eq!(routes.len(), 1);
        let ids: Vec<_> = routes[0].lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn resolver_same_line_final_pair_is_the_line_itself() {
        let database = RouteTable::new([(("a", "b"), (vec![line("a"), line("b")], 150.0))]);

        let candidates = [
            candidates(lrp(100.0), &[(line("a"), 900.0)]),
            candidates(lrp(100.0), &[(line("b"), 900.0)]),
            candidates(last_lrp(), &[(line("b"), 820.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        assert_eq!(routes.len(), 2);
        let ids: Vec<_> = routes[1].lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, ["b"]);
        assert_eq!(routes[1].length, Length::from_meters(100.0));
    }

    #[test]
    fn resolver_repairs_previous_route_on_start_change() {
        // the best first-pair route ends on "b", but the second pair can
        // only continue from "c": the first route must be recomputed
        let database = RouteTable::new([
            (("a", "b"), (vec![line("a"), line("b")], 200.0)),
            (("a", "c"), (vec![line("a"), line("c")], 220.0)),
            (("c", "d"), (vec![line("c"), line("d")], 180.0)),
        ]);

        let candidates = [
            candidates(lrp(150.0), &[(line("a"), 900.0)]),
            candidates(lrp(150.0), &[(line("b"), 900.0), (line("c"), 890.0)]),
            candidates(last_lrp(), &[(line("d"), 880.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        assert_eq!(routes.len(), 2);
        let first: Vec<_> = routes[0].lines.iter().map(|l| l.id).collect();
        let second: Vec<_> = routes[1].lines.iter().map(|l| l.id).collect();
        assert_eq!(first, ["a", "c"]);
        assert_eq!(second, ["c", "d"]);
        assert_eq!(routes[0].length, Length::from_meters(220.0));
    }

    #[test]
    fn resolver_adjusts_length_of_projected_destination() {
        let mut to = line("b");
        to.projected_len = Some(Length::from_meters(40.0));

        let database = RouteTable::new([(("a", "b"), (vec![line("a"), to], 500.0))]);

        let candidates = [
            candidates(lrp(400.0), &[(line("a"), 900.0)]),
            candidates(last_lrp(), &[(to, 880.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        // the destination is the last point: its full length is replaced by
        // the projected part, 500 - 100 + 40
        assert_eq!(routes[0].length, Length::from_meters(440.0));
    }

    #[test]
    fn resolver_connected_pair_is_boosted() {
        // continuing from "b" must win over the higher rated "z" because of
        // the continuity boost of the second pair
        let database = RouteTable::new([
            (("a", "b"), (vec![line("a"), line("b")], 200.0)),
            (("b", "d"), (vec![line("b"), line("d")], 180.0)),
            (("z", "d"), (vec![line("z"), line("d")], 180.0)),
        ]);

        let candidates = [
            candidates(lrp(150.0), &[(line("a"), 900.0)]),
            candidates(lrp(150.0), &[(line("z"), 905.0), (line("b"), 900.0)]),
            candidates(last_lrp(), &[(line("d"), 880.0)]),
        ];

        let routes = resolve_routes(&DecoderConfig::default(), &database, &candidates, true).unwrap();

        assert_eq!(routes.len(), 2);
        let second: Vec<_> = routes[1].lines.iter().map(|l| l.id).collect();
        assert_eq!(second, ["b", "d"]);
    }
}
