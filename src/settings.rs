//! Settings file model and the compiled rule set derived from it.
//!
//! The settings file is JSON. Ordered sections (`tag_mappings`, `default_tags`)
//! keep the exact order they appear in the file: rule order changes output
//! when several words overlap in one span.

use anyhow::{Context, Result};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use crate::models::canonical_key;
use crate::normalize::whole_word_regex;

// ============================================================================
// Defaults
// ============================================================================

/// Words stripped from bracketed spans and filenames out of the box.
pub const DEFAULT_WORDS_TO_REMOVE: &[&str] = &[
    // General
    "Version",
    "Ver.",
    "Bonus Track",
    "Free Download",
    "Remaster",
    // Video types
    "Music Video",
    "Lyric Video",
    "Lyrics Video",
    "Dynamic Art Video",
    "Visualizer",
    "Art Track",
    "Officiell Video",
    "Official Visual",
    // Audio types
    "Official Audio",
    "Official Music",
    "Radio Edit",
    // Quality
    "HD",
    "HQ",
    "4K",
    // Catch-alls and typos
    "Official",
    "Offical",
    "Audio",
    "Video",
];

/// Keyword pattern → suffix tag, applied in this order.
pub const DEFAULT_TAG_MAPPINGS: &[(&str, &str)] = &[
    (r"\bacoustic\b", "[Acoustic]"),
    (r"\binstrumental\b", "[Instrumental]"),
    (r"\bpiano\b", "[Piano]"),
    (r"\blive\b", "[Live]"),
    (r"\bvocal cover\b", "[Vocal Cover]"),
    (r"\bdemo\b", "[Demo]"),
    (r"\balternative version\b", "[Alternative Remix]"),
    (r"\bradio version\b", "[Radio Remix]"),
    (r"\bradio edit\b", "[Radio Remix]"),
];

pub const DEFAULT_AUDIO_FORMATS: &[&str] = &[".mp3", ".flac", ".m4a", ".ogg", ".opus"];

/// Columns that are not tags and never count towards the keep-set.
const NON_TAG_COLUMNS: &[&str] = &["Original Name", "New Name", "[Suffixes]", "Title Raw"];

// ============================================================================
// Ordered map
// ============================================================================

/// A JSON object read as an ordered list of entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(OrderedMap(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub excluded_folders: Vec<String>,
    pub words_to_remove: Vec<String>,
    pub tag_mappings: OrderedMap<String>,
    pub supported_audio_formats: Vec<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            excluded_folders: Vec::new(),
            words_to_remove: DEFAULT_WORDS_TO_REMOVE.iter().map(|w| w.to_string()).collect(),
            tag_mappings: OrderedMap(
                DEFAULT_TAG_MAPPINGS
                    .iter()
                    .map(|(p, t)| (p.to_string(), t.to_string()))
                    .collect(),
            ),
            supported_audio_formats: DEFAULT_AUDIO_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSettings {
    /// Tag column name → visible.
    pub default_tags: OrderedMap<bool>,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            default_tags: OrderedMap(vec![
                ("Artist".to_string(), true),
                ("Album".to_string(), true),
                ("Title".to_string(), true),
            ]),
        }
    }
}

/// Application settings as stored in the settings JSON file.
/// Sections this crate does not interpret (e.g. `ui`) are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub tagging_and_columns: ColumnSettings,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

impl Settings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Settings> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON {}", path.display()))
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings {}", path.display()))?;
        Ok(())
    }

    /// Raw JSON view of one section, or `default` when the section is absent.
    /// Object keys come back in file order.
    pub fn get(&self, section: &str, default: Value) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut sections)) => sections.remove(section).unwrap_or(default),
            _ => default,
        }
    }

    /// Columns shown by a browser: fixed name columns, visible tags, then suffixes.
    pub fn visible_columns(&self) -> Vec<String> {
        let mut columns = vec!["Original Name".to_string(), "New Name".to_string()];
        for (tag, visible) in self.tagging_and_columns.default_tags.iter() {
            if *visible {
                columns.push(tag.to_string());
            }
        }
        columns.push("[Suffixes]".to_string());
        columns
    }

    /// Canonical tag keys of the visible tag columns, the keep-set for hidden tag clearing.
    pub fn tags_to_keep(&self) -> Vec<String> {
        self.visible_columns()
            .iter()
            .filter(|c| !NON_TAG_COLUMNS.contains(&c.as_str()))
            .map(|c| canonical_key(c))
            .collect()
    }

    /// True when any directory of `path` is an excluded folder (case-insensitive).
    pub fn is_excluded(&self, path: &Path) -> bool {
        let Some(dir) = path.parent() else {
            return false;
        };
        dir.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            self.general
                .excluded_folders
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(&name))
        })
    }

    /// True when a file extension (with or without dot) is a supported audio format.
    pub fn is_supported_format(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.general
            .supported_audio_formats
            .iter()
            .any(|f| f.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

// ============================================================================
// Compiled rules
// ============================================================================

/// One keyword mapping: every case-insensitive match of `pattern` yields `tag`.
#[derive(Debug, Clone)]
pub struct TagMappingRule {
    pub pattern: Regex,
    pub tag: String,
}

/// Denylist words and keyword mappings compiled once per settings snapshot.
#[derive(Debug, Clone)]
pub struct RuleSet {
    removal_words: Vec<Regex>,
    tag_mappings: Vec<TagMappingRule>,
}

impl RuleSet {
    /// Compile rules, preserving configuration order.
    /// Invalid mapping patterns are skipped, never fatal.
    pub fn new<W, P, T>(words_to_remove: &[W], tag_mappings: &[(P, T)]) -> Self
    where
        W: AsRef<str>,
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let removal_words = words_to_remove
            .iter()
            .filter_map(|w| whole_word_regex(w.as_ref()))
            .collect();

        let mut compiled = Vec::with_capacity(tag_mappings.len());
        for (pattern, tag) in tag_mappings {
            let (pattern, tag) = (pattern.as_ref(), tag.as_ref());
            if pattern.trim().is_empty() {
                continue;
            }
            match Regex::new(&format!("(?i){}", pattern)) {
                Ok(re) => compiled.push(TagMappingRule {
                    pattern: re,
                    tag: tag.to_string(),
                }),
                Err(e) => log::warn!("Skipping invalid tag mapping pattern '{}': {}", pattern, e),
            }
        }

        Self {
            removal_words,
            tag_mappings: compiled,
        }
    }

    /// No denylist words and no keyword mappings.
    pub fn empty() -> Self {
        Self {
            removal_words: Vec::new(),
            tag_mappings: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.general.words_to_remove.as_slice(),
            settings.general.tag_mappings.0.as_slice(),
        )
    }

    pub fn removal_words(&self) -> &[Regex] {
        &self.removal_words
    }

    pub fn tag_mappings(&self) -> &[TagMappingRule] {
        &self.tag_mappings
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
