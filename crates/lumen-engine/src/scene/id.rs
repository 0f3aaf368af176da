use crate::error::Error;

use super::{QuadScene, QuadSceneConfig, Scene};

/// Closed set of scenes the runtime can switch between.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum SceneId {
    LevelEditor = 0,
    Level = 1,
}

impl SceneId {
    pub const ALL: [SceneId; 2] = [SceneId::LevelEditor, SceneId::Level];

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for SceneId {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(SceneId::LevelEditor),
            1 => Ok(SceneId::Level),
            other => Err(Error::UnknownScene(other)),
        }
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneId::LevelEditor => f.write_str("level-editor"),
            SceneId::Level => f.write_str("level"),
        }
    }
}

/// Builds the scene for `id`. No GPU work happens until `init`.
pub fn create(id: SceneId) -> Box<dyn Scene> {
    let config = match id {
        SceneId::LevelEditor => QuadSceneConfig::level_editor(),
        SceneId::Level => QuadSceneConfig::level(),
    };
    Box::new(QuadScene::new(id, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_integers() {
        for id in SceneId::ALL {
            assert_eq!(SceneId::try_from(id.as_u32()).unwrap(), id);
        }
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert!(matches!(SceneId::try_from(2), Err(Error::UnknownScene(2))));
        assert!(matches!(SceneId::try_from(u32::MAX), Err(Error::UnknownScene(u32::MAX))));
    }
}
