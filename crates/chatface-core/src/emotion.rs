//! Emotion names and their resolution.
//!
//! The voice layer talks to the display in emotion names. The set is closed:
//! anything outside it resolves to the board's default emotion, silently.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Mood categories that select a face animation.
///
/// The discriminant is the emotion code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Emotion {
    #[default]
    Neutral = 0,
    Happy,
    Laughing,
    Funny,
    Sad,
    Angry,
    Crying,
    Loving,
    Embarrassed,
    Surprised,
    Shocked,
    Thinking,
    Winking,
    Cool,
    Relaxed,
    Delicious,
    Kissy,
    Confident,
    Sleepy,
    Silly,
    Confused,
}

impl Emotion {
    /// Every emotion, in code order.
    pub const ALL: [Emotion; 21] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Laughing,
        Emotion::Funny,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Crying,
        Emotion::Loving,
        Emotion::Embarrassed,
        Emotion::Surprised,
        Emotion::Shocked,
        Emotion::Thinking,
        Emotion::Winking,
        Emotion::Cool,
        Emotion::Relaxed,
        Emotion::Delicious,
        Emotion::Kissy,
        Emotion::Confident,
        Emotion::Sleepy,
        Emotion::Silly,
        Emotion::Confused,
    ];

    /// Returns the wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Laughing => "laughing",
            Emotion::Funny => "funny",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Crying => "crying",
            Emotion::Loving => "loving",
            Emotion::Embarrassed => "embarrassed",
            Emotion::Surprised => "surprised",
            Emotion::Shocked => "shocked",
            Emotion::Thinking => "thinking",
            Emotion::Winking => "winking",
            Emotion::Cool => "cool",
            Emotion::Relaxed => "relaxed",
            Emotion::Delicious => "delicious",
            Emotion::Kissy => "kissy",
            Emotion::Confident => "confident",
            Emotion::Sleepy => "sleepy",
            Emotion::Silly => "silly",
            Emotion::Confused => "confused",
        }
    }

    /// Returns the emotion code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Looks up an emotion by code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Looks up an emotion by exact wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }
}

impl FromStr for Emotion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Emotion::from_name(s).ok_or_else(|| Error::UnknownEmotion(s.to_string()))
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves emotion names, mapping unknown names to a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionResolver {
    default: Emotion,
}

impl EmotionResolver {
    /// Creates a resolver with the given default emotion.
    pub fn new(default: Emotion) -> Self {
        Self { default }
    }

    /// Returns the emotion unknown names resolve to.
    pub fn default_emotion(&self) -> Emotion {
        self.default
    }

    /// Resolves a name. Unknown names are not an error.
    pub fn resolve(&self, name: &str) -> Emotion {
        match Emotion::from_name(name) {
            Some(emotion) => {
                debug!("Resolved emotion '{}' to code {}", name, emotion.code());
                emotion
            }
            None => {
                debug!("Unknown emotion '{}', using {}", name, self.default);
                self.default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_distinct_and_stable() {
        let resolver = EmotionResolver::default();
        let codes: HashSet<u8> = Emotion::ALL
            .iter()
            .map(|e| resolver.resolve(e.name()).code())
            .collect();
        assert_eq!(codes.len(), 21);

        for emotion in Emotion::ALL {
            assert_eq!(resolver.resolve(emotion.name()), emotion);
            assert_eq!(resolver.resolve(emotion.name()), resolver.resolve(emotion.name()));
        }
    }

    #[test]
    fn test_code_order() {
        assert_eq!(Emotion::Neutral.code(), 0);
        assert_eq!(Emotion::Crying.code(), 6);
        assert_eq!(Emotion::Embarrassed.code(), 8);
        assert_eq!(Emotion::Confused.code(), 20);
        for (i, emotion) in Emotion::ALL.iter().enumerate() {
            assert_eq!(Emotion::from_code(i as u8), Some(*emotion));
        }
        assert_eq!(Emotion::from_code(21), None);
    }

    #[test]
    fn test_unknown_names_default() {
        let resolver = EmotionResolver::default();
        for name in ["bogus_name", "", "Happy", " happy", "happy ", "😀"] {
            assert_eq!(resolver.resolve(name), Emotion::Neutral);
        }

        let sleepy = EmotionResolver::new(Emotion::Sleepy);
        assert_eq!(sleepy.resolve("bogus_name"), Emotion::Sleepy);
        assert_eq!(sleepy.resolve("bogus_name"), Emotion::Sleepy);
        assert_eq!(sleepy.resolve("sad"), Emotion::Sad);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("loving".parse::<Emotion>().unwrap(), Emotion::Loving);
        assert!(matches!(
            "grumpy".parse::<Emotion>(),
            Err(Error::UnknownEmotion(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.to_string().parse::<Emotion>().unwrap(), emotion);
        }
    }
}
