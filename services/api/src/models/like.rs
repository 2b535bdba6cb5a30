//! Like model with its tagged target reference

use serde::Serialize;
use uuid::Uuid;

/// The one target a like attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Comment(_) => "comment",
            Self::Tweet(_) => "tweet",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Video(id) | Self::Comment(id) | Self::Tweet(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parts() {
        let id = Uuid::new_v4();
        assert_eq!(LikeTarget::Video(id).kind(), "video");
        assert_eq!(LikeTarget::Comment(id).kind(), "comment");
        assert_eq!(LikeTarget::Tweet(id).kind(), "tweet");
        assert_eq!(LikeTarget::Tweet(id).id(), id);
    }
}
