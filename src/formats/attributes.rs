///! attributes.bin - OSM tag vocabulary and attribute sets

use std::fmt;

use super::read_u64;
use crate::core::{Error, Result};

pub const ATTRIBUTE_SET_SIZE: usize = 8;

/// One OSM `key=value` tag known to the graph. The discriminant is the bit
/// index of the attribute inside an [`AttributeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Attribute {
    HighwayService,
    HighwayTrack,
    HighwayResidential,
    HighwayFootway,
    HighwayPath,
    HighwayUnclassified,
    HighwayTertiary,
    HighwaySecondary,
    HighwaySteps,
    HighwayPrimary,
    HighwayCycleway,
    HighwayMotorway,
    HighwayTrunk,
    HighwayLivingStreet,
    HighwayMotorwayLink,
    HighwayPedestrian,
    HighwayPrimaryLink,
    HighwaySecondaryLink,
    HighwayTertiaryLink,
    HighwayTrunkLink,

    TracktypeGrade1,
    TracktypeGrade2,
    TracktypeGrade3,
    TracktypeGrade4,
    TracktypeGrade5,

    SurfaceAsphalt,
    SurfaceUnpaved,
    SurfaceGravel,
    SurfacePaved,
    SurfaceGround,
    SurfaceConcrete,
    SurfacePavingStones,
    SurfaceDirt,
    SurfaceFineGravel,
    SurfaceGrass,
    SurfaceCompacted,
    SurfaceSett,
    SurfaceSand,
    SurfaceWood,
    SurfaceCobblestone,
    SurfacePebblestone,
    SurfaceRock,

    OnewayYes,
    OnewayMinus1,
    OnewayBicycleYes,
    OnewayBicycleNo,

    VehicleNo,
    VehiclePrivate,

    AccessYes,
    AccessNo,
    AccessPrivate,
    AccessPermissive,

    BicycleYes,
    BicycleNo,
    BicycleDesignated,
    BicycleDismount,
    BicycleUseSidepath,
    BicyclePermissive,
    BicyclePrivate,

    CyclewayOpposite,
    CyclewayOppositeLane,
    CyclewayOppositeTrack,
}

const TAGS: [(&str, &str); Attribute::COUNT] = [
    ("highway", "service"),
    ("highway", "track"),
    ("highway", "residential"),
    ("highway", "footway"),
    ("highway", "path"),
    ("highway", "unclassified"),
    ("highway", "tertiary"),
    ("highway", "secondary"),
    ("highway", "steps"),
    ("highway", "primary"),
    ("highway", "cycleway"),
    ("highway", "motorway"),
    ("highway", "trunk"),
    ("highway", "living_street"),
    ("highway", "motorway_link"),
    ("highway", "pedestrian"),
    ("highway", "primary_link"),
    ("highway", "secondary_link"),
    ("highway", "tertiary_link"),
    ("highway", "trunk_link"),
    ("tracktype", "grade1"),
    ("tracktype", "grade2"),
    ("tracktype", "grade3"),
    ("tracktype", "grade4"),
    ("tracktype", "grade5"),
    ("surface", "asphalt"),
    ("surface", "unpaved"),
    ("surface", "gravel"),
    ("surface", "paved"),
    ("surface", "ground"),
    ("surface", "concrete"),
    ("surface", "paving_stones"),
    ("surface", "dirt"),
    ("surface", "fine_gravel"),
    ("surface", "grass"),
    ("surface", "compacted"),
    ("surface", "sett"),
    ("surface", "sand"),
    ("surface", "wood"),
    ("surface", "cobblestone"),
    ("surface", "pebblestone"),
    ("surface", "rock"),
    ("oneway", "yes"),
    ("oneway", "-1"),
    ("oneway:bicycle", "yes"),
    ("oneway:bicycle", "no"),
    ("vehicle", "no"),
    ("vehicle", "private"),
    ("access", "yes"),
    ("access", "no"),
    ("access", "private"),
    ("access", "permissive"),
    ("bicycle", "yes"),
    ("bicycle", "no"),
    ("bicycle", "designated"),
    ("bicycle", "dismount"),
    ("bicycle", "use_sidepath"),
    ("bicycle", "permissive"),
    ("bicycle", "private"),
    ("cycleway", "opposite"),
    ("cycleway", "opposite_lane"),
    ("cycleway", "opposite_track"),
];

impl Attribute {
    pub const COUNT: usize = 62;

    /// Every attribute, in bit order.
    pub const ALL: [Attribute; Attribute::COUNT] = {
        use Attribute::*;
        [
            HighwayService,
            HighwayTrack,
            HighwayResidential,
            HighwayFootway,
            HighwayPath,
            HighwayUnclassified,
            HighwayTertiary,
            HighwaySecondary,
            HighwaySteps,
            HighwayPrimary,
            HighwayCycleway,
            HighwayMotorway,
            HighwayTrunk,
            HighwayLivingStreet,
            HighwayMotorwayLink,
            HighwayPedestrian,
            HighwayPrimaryLink,
            HighwaySecondaryLink,
            HighwayTertiaryLink,
            HighwayTrunkLink,
            TracktypeGrade1,
            TracktypeGrade2,
            TracktypeGrade3,
            TracktypeGrade4,
            TracktypeGrade5,
            SurfaceAsphalt,
            SurfaceUnpaved,
            SurfaceGravel,
            SurfacePaved,
            SurfaceGround,
            SurfaceConcrete,
            SurfacePavingStones,
            SurfaceDirt,
            SurfaceFineGravel,
            SurfaceGrass,
            SurfaceCompacted,
            SurfaceSett,
            SurfaceSand,
            SurfaceWood,
            SurfaceCobblestone,
            SurfacePebblestone,
            SurfaceRock,
            OnewayYes,
            OnewayMinus1,
            OnewayBicycleYes,
            OnewayBicycleNo,
            VehicleNo,
            VehiclePrivate,
            AccessYes,
            AccessNo,
            AccessPrivate,
            AccessPermissive,
            BicycleYes,
            BicycleNo,
            BicycleDesignated,
            BicycleDismount,
            BicycleUseSidepath,
            BicyclePermissive,
            BicyclePrivate,
            CyclewayOpposite,
            CyclewayOppositeLane,
            CyclewayOppositeTrack,
        ]
    };

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        TAGS[self.ordinal()].0
    }

    pub fn value(self) -> &'static str {
        TAGS[self.ordinal()].1
    }

    /// Attribute of the tag `key=value`, if the vocabulary has one.
    pub fn from_tag(key: &str, value: &str) -> Option<Self> {
        TAGS.iter()
            .position(|&(k, v)| k == key && v == value)
            .map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key(), self.value())
    }
}

/// Set of [`Attribute`]s packed in the low 62 bits of a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributeSet(u64);

impl AttributeSet {
    pub const EMPTY: AttributeSet = AttributeSet(0);

    /// Set from a raw mask; fails if a bit beyond the vocabulary is set.
    pub fn new(bits: u64) -> Result<Self> {
        if bits >> Attribute::COUNT != 0 {
            return Err(Error::invalid(format!(
                "attribute mask {bits:#x} has bits beyond the {} known attributes",
                Attribute::COUNT
            )));
        }
        Ok(Self(bits))
    }

    /// Set from a mask known to fit the vocabulary.
    pub(crate) const fn from_bits_unchecked(bits: u64) -> Self {
        Self(bits)
    }

    pub fn of(attributes: &[Attribute]) -> Self {
        Self(attributes.iter().fold(0, |bits, a| bits | 1 << a.ordinal()))
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, attribute: Attribute) -> bool {
        self.0 & (1 << attribute.ordinal()) != 0
    }

    pub fn intersects(self, that: AttributeSet) -> bool {
        self.0 & that.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL.into_iter().filter(move |&a| self.contains(a))
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, attribute) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{attribute}")?;
        }
        f.write_str("}")
    }
}

/// Decode the attribute set table.
pub fn parse_attribute_sets(buffer: &[u8]) -> Result<Vec<AttributeSet>> {
    if buffer.len() % ATTRIBUTE_SET_SIZE != 0 {
        return Err(Error::corrupt(format!(
            "attribute table size {} is not a multiple of {ATTRIBUTE_SET_SIZE}",
            buffer.len()
        )));
    }
    (0..buffer.len() / ATTRIBUTE_SET_SIZE)
        .map(|i| {
            AttributeSet::new(read_u64(buffer, i * ATTRIBUTE_SET_SIZE))
                .map_err(|e| Error::corrupt(format!("attribute set {i}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_vocabulary() {
        for (i, a) in Attribute::ALL.iter().enumerate() {
            assert_eq!(a.ordinal(), i);
        }
        assert_eq!(Attribute::HighwayService.ordinal(), 0);
        assert_eq!(Attribute::TracktypeGrade1.ordinal(), 20);
        assert_eq!(Attribute::SurfaceAsphalt.ordinal(), 25);
        assert_eq!(Attribute::OnewayYes.ordinal(), 42);
        assert_eq!(Attribute::BicycleYes.ordinal(), 52);
        assert_eq!(Attribute::CyclewayOppositeTrack.ordinal(), 61);
    }

    #[test]
    fn test_tags() {
        assert_eq!(Attribute::OnewayMinus1.to_string(), "oneway=-1");
        assert_eq!(Attribute::OnewayBicycleNo.key(), "oneway:bicycle");
        assert_eq!(
            Attribute::from_tag("surface", "fine_gravel"),
            Some(Attribute::SurfaceFineGravel)
        );
        assert_eq!(Attribute::from_tag("surface", "lava"), None);
    }

    #[test]
    fn test_new_rejects_unknown_bits() {
        assert!(AttributeSet::new(0).is_ok());
        assert!(AttributeSet::new((1 << 62) - 1).is_ok());
        assert!(matches!(AttributeSet::new(1 << 62), Err(Error::InvalidArgument(_))));
        assert!(AttributeSet::new(u64::MAX).is_err());
    }

    #[test]
    fn test_set_operations() {
        let set = AttributeSet::of(&[Attribute::HighwayTrack, Attribute::TracktypeGrade1]);
        assert!(set.contains(Attribute::HighwayTrack));
        assert!(set.contains(Attribute::TracktypeGrade1));
        assert!(!set.contains(Attribute::HighwayService));

        let tracks = AttributeSet::of(&[Attribute::HighwayTrack]);
        let roads = AttributeSet::of(&[Attribute::HighwayPrimary, Attribute::HighwaySecondary]);
        assert!(set.intersects(tracks));
        assert!(!set.intersects(roads));
        assert!(!set.intersects(AttributeSet::EMPTY));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_display() {
        let set = AttributeSet::of(&[Attribute::TracktypeGrade1, Attribute::HighwayTrack]);
        assert_eq!(set.to_string(), "{highway=track,tracktype=grade1}");
        assert_eq!(AttributeSet::EMPTY.to_string(), "{}");
    }

    #[test]
    fn test_parse_table() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0b101u64.to_be_bytes());
        bytes.extend_from_slice(&(1u64 << 61).to_be_bytes());
        let sets = parse_attribute_sets(&bytes).unwrap();
        assert_eq!(sets.len(), 2);
        assert!(sets[0].contains(Attribute::HighwayService));
        assert!(sets[0].contains(Attribute::HighwayResidential));
        assert!(sets[1].contains(Attribute::CyclewayOppositeTrack));

        bytes.extend_from_slice(&(1u64 << 63).to_be_bytes());
        assert!(matches!(parse_attribute_sets(&bytes), Err(Error::Corrupt(_))));
        assert!(matches!(parse_attribute_sets(&[0; 7]), Err(Error::Corrupt(_))));
    }
}
