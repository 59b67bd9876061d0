//! Content types of Bedrock world database records.
//!
//! Every LevelDB key belongs to exactly one [`ContentType`]. Chunk records
//! use binary keys (`x`, `z`, optional dimension, tag byte, optional
//! sub-chunk index); everything else uses an ASCII key or key prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! content_types {
    ($($variant:ident),+ $(,)?) => {
        /// The closed set of record content types.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ContentType {
            $($variant),+
        }

        impl ContentType {
            /// All content types, in declaration order.
            pub const ALL: &'static [ContentType] = &[$(ContentType::$variant),+];

            /// Canonical name, as used by the `type:` filter.
            pub fn name(self) -> &'static str {
                match self {
                    $(ContentType::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

content_types! {
    Data3D,
    Version,
    Data2D,
    Data2DLegacy,
    SubChunkPrefix,
    LegacyTerrain,
    BlockEntity,
    Entity,
    PendingTicks,
    LegacyBlockExtraData,
    BiomeState,
    FinalizedState,
    ConversionData,
    BorderBlocks,
    HardcodedSpawners,
    RandomTicks,
    Checksums,
    MetaDataHash,
    GeneratedPreCavesAndCliffsBlending,
    BlendingBiomeHeight,
    BlendingData,
    ActorDigestVersion,
    LegacyVersion,
    AABBVolumes,
    Digest,
    Map,
    Portals,
    SchedulerWT,
    StructureTemplate,
    TickingArea,
    Scoreboard,
    WanderingTraderScheduler,
    BiomeData,
    MobEvents,
    LevelChunkMetaDataDictionary,
    RealmsStoriesData,
    LevelDat,
    Player,
    PlayerClient,
    ActorPrefix,
    Villages,
    VillageDwellers,
    VillageInfo,
    VillagePOI,
    VillagePlayers,
    VillageRaid,
    Dimension,
    ChunkLoadedRequest,
    PositionTrackingDB,
    PositionTrackingLastId,
    FlatWorldLayers,
    LevelSpawnWasFixed,
    DynamicProperties,
    AutonomousEntities,
    Unknown,
}

/// How a record's value bytes are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Little-endian NBT, one or more roots.
    Nbt,
    /// UTF-8 JSON text.
    Json,
    /// Anything else; never decoded into a tag tree.
    Binary,
}

impl ContentType {
    /// Look up a content type by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<ContentType> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|ct| ct.name().eq_ignore_ascii_case(name))
    }

    pub fn payload_format(self) -> PayloadFormat {
        use ContentType::*;
        match self {
            BlockEntity | Entity | PendingTicks | RandomTicks | ActorPrefix | Map | Portals
            | SchedulerWT | StructureTemplate | TickingArea | Scoreboard
            | WanderingTraderScheduler | BiomeData | MobEvents | LevelDat | Player
            | PlayerClient | Villages | VillageDwellers | VillageInfo | VillagePOI
            | VillagePlayers | VillageRaid | Dimension | PositionTrackingDB
            | PositionTrackingLastId | DynamicProperties | AutonomousEntities
            | ChunkLoadedRequest | RealmsStoriesData => PayloadFormat::Nbt,
            FlatWorldLayers => PayloadFormat::Json,
            _ => PayloadFormat::Binary,
        }
    }

    /// Content type stored under a chunk key tag byte.
    fn from_chunk_tag(tag: u8) -> Option<ContentType> {
        use ContentType::*;
        let ct = match tag {
            0x2b => Data3D,
            0x2c => Version,
            0x2d => Data2D,
            0x2e => Data2DLegacy,
            0x2f => SubChunkPrefix,
            0x30 => LegacyTerrain,
            0x31 => BlockEntity,
            0x32 => Entity,
            0x33 => PendingTicks,
            0x34 => LegacyBlockExtraData,
            0x35 => BiomeState,
            0x36 => FinalizedState,
            0x37 => ConversionData,
            0x38 => BorderBlocks,
            0x39 => HardcodedSpawners,
            0x3a => RandomTicks,
            0x3b => Checksums,
            0x3d => GeneratedPreCavesAndCliffsBlending,
            0x3e => BlendingBiomeHeight,
            0x3f => MetaDataHash,
            0x40 => BlendingData,
            0x41 => ActorDigestVersion,
            0x76 => LegacyVersion,
            0x77 => AABBVolumes,
            _ => return None,
        };
        Some(ct)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::from_name(s).ok_or_else(|| format!("unknown content type '{}'", s))
    }
}

/// Exact ASCII keys.
const EXACT_KEYS: &[(&str, ContentType)] = &[
    ("~local_player", ContentType::Player),
    ("portals", ContentType::Portals),
    ("schedulerWT", ContentType::SchedulerWT),
    ("scoreboard", ContentType::Scoreboard),
    ("WanderingTraderScheduler", ContentType::WanderingTraderScheduler),
    ("BiomeData", ContentType::BiomeData),
    ("mobevents", ContentType::MobEvents),
    ("LevelChunkMetaDataDictionary", ContentType::LevelChunkMetaDataDictionary),
    ("Overworld", ContentType::Dimension),
    ("Nether", ContentType::Dimension),
    ("TheEnd", ContentType::Dimension),
    ("AutonomousEntities", ContentType::AutonomousEntities),
    ("mVillages", ContentType::Villages),
    ("PositionTrackDB-LastId", ContentType::PositionTrackingLastId),
    ("game_flatworldlayers", ContentType::FlatWorldLayers),
    ("LevelSpawnWasFixed", ContentType::LevelSpawnWasFixed),
    ("DynamicProperties", ContentType::DynamicProperties),
];

/// ASCII key prefixes, longest first where they overlap.
const PREFIX_KEYS: &[(&str, ContentType)] = &[
    ("player_server_", ContentType::Player),
    ("player_", ContentType::PlayerClient),
    ("map_", ContentType::Map),
    ("actorprefix", ContentType::ActorPrefix),
    ("digp", ContentType::Digest),
    ("structuretemplate", ContentType::StructureTemplate),
    ("tickingarea", ContentType::TickingArea),
    ("RealmsStoriesData", ContentType::RealmsStoriesData),
    ("PosTrackDB-", ContentType::PositionTrackingDB),
    ("chunk_loaded_request", ContentType::ChunkLoadedRequest),
];

/// Suffixes of `VILLAGE_<uuid>_<kind>` keys.
const VILLAGE_SUFFIXES: &[(&str, ContentType)] = &[
    ("_DWELLERS", ContentType::VillageDwellers),
    ("_INFO", ContentType::VillageInfo),
    ("_POI", ContentType::VillagePOI),
    ("_PLAYERS", ContentType::VillagePlayers),
    ("_RAID", ContentType::VillageRaid),
];

/// A decoded chunk key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
    pub dimension: i32,
    pub content_type: ContentType,
    pub sub_chunk: Option<i8>,
}

impl ChunkKey {
    /// Parse a 9, 10, 13 or 14 byte chunk key.
    pub fn parse(key: &[u8]) -> Option<ChunkKey> {
        let (has_dimension, has_sub_chunk) = match key.len() {
            9 => (false, false),
            10 => (false, true),
            13 => (true, false),
            14 => (true, true),
            _ => return None,
        };
        let x = i32::from_le_bytes(key[0..4].try_into().ok()?);
        let z = i32::from_le_bytes(key[4..8].try_into().ok()?);
        let (dimension, tag_at) = if has_dimension {
            (i32::from_le_bytes(key[8..12].try_into().ok()?), 12)
        } else {
            (0, 8)
        };
        let content_type = ContentType::from_chunk_tag(key[tag_at])?;
        let sub_chunk = if has_sub_chunk {
            if content_type != ContentType::SubChunkPrefix {
                return None;
            }
            Some(key[tag_at + 1] as i8)
        } else {
            None
        };
        Some(ChunkKey {
            x,
            z,
            dimension,
            content_type,
            sub_chunk,
        })
    }

    fn dimension_name(&self) -> String {
        match self.dimension {
            0 => "overworld".to_string(),
            1 => "nether".to_string(),
            2 => "the_end".to_string(),
            other => format!("dimension{}", other),
        }
    }
}

/// Classify a raw database key.
pub fn classify_key(key: &[u8]) -> ContentType {
    if let Ok(text) = std::str::from_utf8(key) {
        if let Some(ct) = classify_text_key(text) {
            return ct;
        }
    }
    if let Some(ct) = classify_prefixed_binary(key) {
        return ct;
    }
    ChunkKey::parse(key)
        .map(|chunk| chunk.content_type)
        .unwrap_or(ContentType::Unknown)
}

fn classify_text_key(text: &str) -> Option<ContentType> {
    if let Some((_, ct)) = EXACT_KEYS.iter().find(|(k, _)| *k == text) {
        return Some(*ct);
    }
    if let Some(rest) = text.strip_prefix("VILLAGE_") {
        return VILLAGE_SUFFIXES
            .iter()
            .find(|(suffix, _)| rest.ends_with(suffix))
            .map(|(_, ct)| *ct);
    }
    PREFIX_KEYS
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, ct)| *ct)
}

/// Keys with an ASCII prefix followed by binary data.
fn classify_prefixed_binary(key: &[u8]) -> Option<ContentType> {
    if key.starts_with(b"actorprefix") {
        Some(ContentType::ActorPrefix)
    } else if key.starts_with(b"digp") {
        Some(ContentType::Digest)
    } else {
        None
    }
}

/// Human-readable rendering of a raw key.
pub fn display_key(key: &[u8]) -> String {
    if let Some(rest) = key.strip_prefix(b"actorprefix") {
        if let Ok(id) = <[u8; 8]>::try_from(rest) {
            return format!("actorprefix{}", i64::from_le_bytes(id));
        }
    }
    if let Some(rest) = key.strip_prefix(b"digp") {
        if rest.len() == 8 || rest.len() == 12 {
            let x = i32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
            let z = i32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]);
            let dimension = if rest.len() == 12 {
                i32::from_le_bytes([rest[8], rest[9], rest[10], rest[11]])
            } else {
                0
            };
            return format!("digp {}, {}, {}", x, z, dimension);
        }
    }
    let text = std::str::from_utf8(key).ok();
    if let Some(text) = text.filter(|t| classify_text_key(t).is_some()) {
        return text.to_string();
    }
    // Same precedence as classify_key: chunk bytes may also be printable text.
    if let Some(chunk) = ChunkKey::parse(key).filter(|_| classify_prefixed_binary(key).is_none()) {
        let mut out = format!(
            "{}, {}, {}, {}",
            chunk.x,
            chunk.z,
            chunk.dimension_name(),
            chunk.content_type
        );
        if let Some(y) = chunk.sub_chunk {
            out.push_str(&format!(", {}", y));
        }
        return out;
    }
    match text {
        Some(text) if text.chars().all(|c| !c.is_control()) => text.to_string(),
        _ => String::from_utf8_lossy(key).into_owned(),
    }
}
