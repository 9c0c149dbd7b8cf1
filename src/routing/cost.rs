///! Edge cost functions - bicycle semantics of edge attributes

use crate::formats::{Attribute, AttributeSet};
use crate::graph::Graph;
use Attribute::*;

/// Multiplicative penalty applied to an edge's length during route search.
///
/// Factors are `>= 1`; `f64::INFINITY` forbids the edge.
pub trait CostFunction {
    fn cost_factor(&self, node_id: u32, edge_id: u32) -> f64;
}

impl<F> CostFunction for F
where
    F: Fn(u32, u32) -> f64,
{
    fn cost_factor(&self, node_id: u32, edge_id: u32) -> f64 {
        self(node_id, edge_id)
    }
}

/// Every edge costs its length.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCost;

impl CostFunction for UniformCost {
    fn cost_factor(&self, _node_id: u32, _edge_id: u32) -> f64 {
        1.0
    }
}

const MOTOR_ROADS: AttributeSet = set(&[
    HighwayMotorway,
    HighwayMotorwayLink,
    HighwayTrunk,
    HighwayTrunkLink,
]);
const STEPS: AttributeSet = set(&[HighwaySteps]);
const BICYCLE_FORBIDDEN: AttributeSet = set(&[BicycleNo, BicyclePrivate]);
const BICYCLE_ALLOWED: AttributeSet = set(&[BicycleYes, BicycleDesignated, BicyclePermissive]);
const ACCESS_RESTRICTED: AttributeSet = set(&[AccessNo, AccessPrivate, VehicleNo, VehiclePrivate]);
const ONEWAY_FORWARD: AttributeSet = set(&[OnewayYes, OnewayBicycleYes]);
const ONEWAY_EXEMPT: AttributeSet = set(&[
    OnewayBicycleNo,
    CyclewayOpposite,
    CyclewayOppositeLane,
    CyclewayOppositeTrack,
]);
const ROUGH_SURFACES: AttributeSet = set(&[
    SurfaceUnpaved,
    SurfaceGround,
    SurfaceDirt,
    SurfaceGrass,
    SurfaceSand,
    SurfaceRock,
    SurfacePebblestone,
    SurfaceCobblestone,
    SurfaceSett,
    TracktypeGrade3,
    TracktypeGrade4,
    TracktypeGrade5,
]);
const LOOSE_SURFACES: AttributeSet = set(&[SurfaceGravel, SurfaceFineGravel, SurfaceCompacted]);

const fn set(attributes: &[Attribute]) -> AttributeSet {
    let mut bits = 0u64;
    let mut i = 0;
    while i < attributes.len() {
        bits |= 1 << attributes[i] as u64;
        i += 1;
    }
    AttributeSet::from_bits_unchecked(bits)
}

/// Everyday city bike: keeps off motor roads, respects access and one-way
/// tags, favours cycle infrastructure and smooth surfaces.
#[derive(Clone, Copy)]
pub struct CityBikeCost<'g> {
    graph: &'g Graph,
}

impl<'g> CityBikeCost<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Factor for an edge with `attributes`, traversed against the way's
    /// direction when `inverted`.
    pub fn factor_for(attributes: AttributeSet, inverted: bool) -> f64 {
        let allowed = attributes.intersects(BICYCLE_ALLOWED);
        if attributes.intersects(BICYCLE_FORBIDDEN)
            || (attributes.intersects(MOTOR_ROADS) && !allowed)
            || (attributes.intersects(ACCESS_RESTRICTED) && !allowed)
            || attributes.intersects(STEPS)
        {
            return f64::INFINITY;
        }

        if !attributes.intersects(ONEWAY_EXEMPT) {
            let against = if attributes.contains(OnewayMinus1) {
                !inverted
            } else {
                inverted && attributes.intersects(ONEWAY_FORWARD)
            };
            if against {
                return f64::INFINITY;
            }
        }

        let mut factor = match highway_factor(attributes) {
            Some(f) => f,
            None => 1.2,
        };
        if attributes.contains(BicycleDesignated) {
            factor = factor.min(1.0);
        }
        if attributes.contains(BicycleUseSidepath) {
            factor *= 2.0;
        }
        if attributes.contains(BicycleDismount) {
            factor *= 3.0;
        }

        if attributes.intersects(ROUGH_SURFACES) {
            factor *= 1.5;
        } else if attributes.intersects(LOOSE_SURFACES) {
            factor *= 1.2;
        }
        factor
    }
}

fn highway_factor(attributes: AttributeSet) -> Option<f64> {
    let factor = if attributes.contains(HighwayCycleway) {
        1.0
    } else if attributes.intersects(set(&[
        HighwayResidential,
        HighwayLivingStreet,
        HighwayUnclassified,
        HighwayService,
        HighwayTrack,
        HighwayPath,
    ])) {
        1.1
    } else if attributes.intersects(set(&[HighwayTertiary, HighwayTertiaryLink])) {
        1.3
    } else if attributes.intersects(set(&[HighwayFootway, HighwayPedestrian])) {
        1.5
    } else if attributes.intersects(set(&[HighwaySecondary, HighwaySecondaryLink])) {
        1.8
    } else if attributes.intersects(set(&[HighwayPrimary, HighwayPrimaryLink])) {
        2.5
    } else if attributes.intersects(MOTOR_ROADS) {
        // only reachable with explicit bicycle permission
        3.0
    } else {
        return None;
    };
    Some(factor)
}

impl CostFunction for CityBikeCost<'_> {
    fn cost_factor(&self, _node_id: u32, edge_id: u32) -> f64 {
        Self::factor_for(
            self.graph.edge_attributes(edge_id),
            self.graph.edge_is_inverted(edge_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_and_closures() {
        assert_eq!(UniformCost.cost_factor(3, 4), 1.0);

        let avoid_seven = |_node: u32, edge: u32| if edge == 7 { f64::INFINITY } else { 1.0 };
        assert_eq!(avoid_seven.cost_factor(0, 1), 1.0);
        assert!(avoid_seven.cost_factor(0, 7).is_infinite());
    }

    #[test]
    fn test_forbidden_ways() {
        for attributes in [
            AttributeSet::of(&[HighwayMotorway]),
            AttributeSet::of(&[HighwayTrunkLink]),
            AttributeSet::of(&[HighwaySteps]),
            AttributeSet::of(&[HighwayCycleway, BicycleNo]),
            AttributeSet::of(&[HighwayResidential, AccessPrivate]),
            AttributeSet::of(&[HighwayTrack, VehicleNo]),
        ] {
            assert!(
                CityBikeCost::factor_for(attributes, false).is_infinite(),
                "{attributes}"
            );
        }
    }

    #[test]
    fn test_bicycle_permission_overrides_restrictions() {
        let trunk = AttributeSet::of(&[HighwayTrunk, BicycleYes]);
        assert_eq!(CityBikeCost::factor_for(trunk, false), 3.0);

        let private = AttributeSet::of(&[HighwayService, AccessNo, BicycleDesignated]);
        assert_eq!(CityBikeCost::factor_for(private, false), 1.0);
    }

    #[test]
    fn test_oneway() {
        let oneway = AttributeSet::of(&[HighwayResidential, OnewayYes]);
        assert_eq!(CityBikeCost::factor_for(oneway, false), 1.1);
        assert!(CityBikeCost::factor_for(oneway, true).is_infinite());

        let reversed = AttributeSet::of(&[HighwayResidential, OnewayMinus1]);
        assert!(CityBikeCost::factor_for(reversed, false).is_infinite());
        assert_eq!(CityBikeCost::factor_for(reversed, true), 1.1);

        let contraflow = AttributeSet::of(&[HighwayResidential, OnewayYes, CyclewayOppositeLane]);
        assert_eq!(CityBikeCost::factor_for(contraflow, true), 1.1);

        let exempt = AttributeSet::of(&[HighwayResidential, OnewayYes, OnewayBicycleNo]);
        assert_eq!(CityBikeCost::factor_for(exempt, true), 1.1);

        let bike_only = AttributeSet::of(&[HighwayResidential, OnewayBicycleYes]);
        assert!(CityBikeCost::factor_for(bike_only, true).is_infinite());
    }

    #[test]
    fn test_preferences() {
        let factor = |a: &[Attribute]| CityBikeCost::factor_for(AttributeSet::of(a), false);

        assert_eq!(factor(&[HighwayCycleway]), 1.0);
        assert!(factor(&[HighwayCycleway]) < factor(&[HighwayResidential]));
        assert!(factor(&[HighwayResidential]) < factor(&[HighwaySecondary]));
        assert!(factor(&[HighwaySecondary]) < factor(&[HighwayPrimary]));
        assert_eq!(factor(&[HighwayPrimary, BicycleDesignated]), 1.0);
        assert!(factor(&[HighwayTrack, SurfaceGravel]) > factor(&[HighwayTrack]));
        assert!(factor(&[HighwayTrack, TracktypeGrade4]) > factor(&[HighwayTrack, SurfaceGravel]));
        assert_eq!(factor(&[]), 1.2);
        assert!(factor(&[]) >= 1.0);
    }
}
