//! Asset table: per-emotion frame sets.
//!
//! Image handles are opaque names. The surface knows how to turn a handle
//! into pixels; this module only knows which handle comes at which index.

use crate::{Emotion, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Opaque reference to one prepared image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageHandle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Ordered frames of one animation. An empty set is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSet(Vec<ImageHandle>);

impl FrameSet {
    pub fn new(frames: Vec<ImageHandle>) -> Self {
        Self(frames)
    }

    /// A set that renders nothing.
    pub fn blank() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageHandle> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ImageHandle] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for FrameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(ImageHandle::new).collect())
    }
}

/// Maps each emotion to its frame set.
///
/// Emotions without an explicit binding use the fallback set. Several
/// emotions may share one set.
#[derive(Debug, Clone)]
pub struct AssetTable {
    bindings: HashMap<Emotion, Arc<FrameSet>>,
    fallback: Arc<FrameSet>,
}

impl AssetTable {
    /// Creates a table where every emotion uses `fallback`.
    pub fn new(fallback: FrameSet) -> Self {
        Self {
            bindings: HashMap::new(),
            fallback: Arc::new(fallback),
        }
    }

    /// Binds one frame set to several emotions.
    pub fn bind(&mut self, emotions: &[Emotion], frames: FrameSet) -> &mut Self {
        let frames = Arc::new(frames);
        for emotion in emotions {
            self.bindings.insert(*emotion, Arc::clone(&frames));
        }
        self
    }

    /// Returns true if the emotion has its own binding.
    pub fn is_bound(&self, emotion: Emotion) -> bool {
        self.bindings.contains_key(&emotion)
    }

    /// Frame set for an emotion.
    pub fn frames(&self, emotion: Emotion) -> &FrameSet {
        self.bindings.get(&emotion).unwrap_or(&self.fallback)
    }

    /// Number of frames for an emotion; zero for a blank set.
    pub fn frame_count(&self, emotion: Emotion) -> usize {
        self.frames(emotion).len()
    }

    /// Image at `(emotion, index)`, if any.
    pub fn image(&self, emotion: Emotion, index: usize) -> Option<&ImageHandle> {
        self.frames(emotion).get(index)
    }

    /// Builds a table from configuration.
    pub fn from_config(config: &FrameTableConfig) -> Result<Self> {
        let group = |name: &str| -> Result<FrameSet> {
            config
                .groups
                .get(name)
                .map(|frames| frames.iter().map(String::as_str).collect())
                .ok_or_else(|| Error::UnknownFrameGroup(name.to_string()))
        };

        let mut table = AssetTable::new(group(&config.fallback)?);
        for (emotion, group_name) in &config.bindings {
            let emotion: Emotion = emotion.parse()?;
            table.bind(&[emotion], group(group_name)?);
        }
        Ok(table)
    }
}

/// Frame table as written in configuration.
///
/// ```toml
/// fallback = "neutral"
///
/// [groups]
/// neutral = ["neutral1", "neutral2"]
/// happy = ["happy1", "happy2", "happy3"]
/// blank = []
///
/// [bindings]
/// happy = "happy"
/// laughing = "happy"
/// crying = "blank"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameTableConfig {
    /// Named frame lists.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,

    /// Emotion name to group name.
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,

    /// Group used for unbound emotions.
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    "neutral".to_string()
}

impl Default for FrameTableConfig {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            bindings: BTreeMap::new(),
            fallback: default_fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(prefix: &str, n: usize) -> FrameSet {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_shared_binding_and_fallback() {
        let mut table = AssetTable::new(set("neutral", 8));
        table.bind(
            &[Emotion::Happy, Emotion::Laughing, Emotion::Funny],
            set("happy", 6),
        );

        assert_eq!(table.frame_count(Emotion::Happy), 6);
        assert_eq!(table.frame_count(Emotion::Funny), 6);
        assert_eq!(table.frame_count(Emotion::Cool), 8);
        assert!(table.is_bound(Emotion::Laughing));
        assert!(!table.is_bound(Emotion::Cool));
        assert_eq!(
            table.image(Emotion::Laughing, 2).map(ImageHandle::as_str),
            Some("happy3")
        );
        assert_eq!(table.image(Emotion::Happy, 6), None);
    }

    #[test]
    fn test_blank_binding() {
        let mut table = AssetTable::new(set("neutral", 3));
        table.bind(&[Emotion::Crying], FrameSet::blank());
        assert_eq!(table.frame_count(Emotion::Crying), 0);
        assert_eq!(table.image(Emotion::Crying, 0), None);
    }

    #[test]
    fn test_from_config() {
        let config: FrameTableConfig = toml::from_str(
            r#"
            fallback = "idle"

            [groups]
            idle = ["a", "b"]
            happy = ["h1", "h2", "h3"]
            blank = []

            [bindings]
            happy = "happy"
            crying = "blank"
            "#,
        )
        .unwrap();

        let table = AssetTable::from_config(&config).unwrap();
        assert_eq!(table.frame_count(Emotion::Happy), 3);
        assert_eq!(table.frame_count(Emotion::Crying), 0);
        assert_eq!(table.frame_count(Emotion::Sad), 2);
    }

    #[test]
    fn test_from_config_errors() {
        let mut config = FrameTableConfig::default();
        assert!(matches!(
            AssetTable::from_config(&config),
            Err(Error::UnknownFrameGroup(_))
        ));

        config.groups.insert("neutral".into(), vec!["n1".into()]);
        config.bindings.insert("grumpy".into(), "neutral".into());
        assert!(matches!(
            AssetTable::from_config(&config),
            Err(Error::UnknownEmotion(_))
        ));

        config.bindings.clear();
        config.bindings.insert("sad".into(), "missing".into());
        assert!(matches!(
            AssetTable::from_config(&config),
            Err(Error::UnknownFrameGroup(_))
        ));
    }
}
