//! Subsystem map
//!
//! Static table from engine area names to the source directories that
//! implement them, used to scope scans.

use crate::core::error::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Engine subsystems with a known source location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    Rendering,
    Physics,
    Audio,
    Networking,
    Input,
    AI,
    Animation,
    UI,
}

impl Subsystem {
    pub const ALL: [Subsystem; 8] = [
        Subsystem::Rendering,
        Subsystem::Physics,
        Subsystem::Audio,
        Subsystem::Networking,
        Subsystem::Input,
        Subsystem::AI,
        Subsystem::Animation,
        Subsystem::UI,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rendering => "Rendering",
            Self::Physics => "Physics",
            Self::Audio => "Audio",
            Self::Networking => "Networking",
            Self::Input => "Input",
            Self::AI => "AI",
            Self::Animation => "Animation",
            Self::UI => "UI",
        }
    }

    /// Source directory relative to the engine root
    pub fn relative_dir(&self) -> &'static Path {
        Path::new(match self {
            Self::Rendering => "Engine/Source/Runtime/Renderer",
            Self::Physics => "Engine/Source/Runtime/PhysicsCore",
            Self::Audio => "Engine/Source/Runtime/AudioMixer",
            Self::Networking => "Engine/Source/Runtime/Networking",
            Self::Input => "Engine/Source/Runtime/InputCore",
            Self::AI => "Engine/Source/Runtime/AIModule",
            Self::Animation => "Engine/Source/Runtime/AnimationCore",
            Self::UI => "Engine/Source/Runtime/UMG",
        })
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = Error;

    /// Names match exactly, as listed in [`Subsystem::ALL`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subsystem::ALL
            .into_iter()
            .find(|subsystem| subsystem.as_str() == s)
            .ok_or_else(|| Error::UnknownSubsystem {
                name: s.to_string(),
            })
    }
}

/// What a subsystem directory contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemInfo {
    pub name: String,
    pub main_classes: Vec<String>,
    /// Declared for callers; not derived from source
    pub key_features: Vec<String>,
    /// Declared for callers; not derived from source
    pub dependencies: Vec<String>,
    pub source_files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_subsystems() {
        for subsystem in Subsystem::ALL {
            assert_eq!(subsystem.as_str().parse::<Subsystem>().unwrap(), subsystem);
        }
    }

    #[test]
    fn test_unknown_subsystem() {
        let err = "Gameplay".parse::<Subsystem>().unwrap_err();
        assert!(matches!(err, Error::UnknownSubsystem { ref name } if name == "Gameplay"));
        assert!("rendering".parse::<Subsystem>().is_err());
    }

    #[test]
    fn test_relative_dirs() {
        assert_eq!(
            Subsystem::UI.relative_dir(),
            Path::new("Engine/Source/Runtime/UMG")
        );
        assert!(Subsystem::ALL
            .iter()
            .all(|s| s.relative_dir().starts_with("Engine/Source/Runtime")));
    }
}
