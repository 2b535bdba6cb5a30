//! Ownership and visibility policy shared by every resource service
//!
//! The load-by-id / not-found / owner-mismatch sequence is identical for
//! comments, tweets, playlists, and videos, so it lives here once instead
//! of being restated in every handler.

use uuid::Uuid;

use crate::error::ApiError;

/// Entities with a recorded owner
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Owned entities with a public/private flag
pub trait Restricted: Owned {
    fn is_public(&self) -> bool;
}

/// Gate a mutating operation: `NotFound` if absent, `Forbidden` unless the
/// caller is the owner.
pub fn ensure_owner<T: Owned>(entity: Option<T>, caller: Uuid, kind: &str) -> Result<T, ApiError> {
    let entity = entity.ok_or_else(|| ApiError::NotFound(format!("No {kind} found with this id")))?;

    if entity.owner_id() != caller {
        return Err(ApiError::Forbidden(format!(
            "You are not allowed to modify this {kind}"
        )));
    }

    Ok(entity)
}

/// Gate a read of a possibly-private entity: private entities are visible to
/// their owner only.
pub fn ensure_visible<T: Restricted>(
    entity: Option<T>,
    caller: Uuid,
    kind: &str,
) -> Result<T, ApiError> {
    let entity = entity.ok_or_else(|| ApiError::NotFound(format!("No {kind} found with this id")))?;

    if !entity.is_public() && entity.owner_id() != caller {
        return Err(ApiError::Forbidden(format!(
            "You are not allowed to view this {kind}"
        )));
    }

    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        owner: Uuid,
        public: bool,
    }

    impl Owned for Note {
        fn owner_id(&self) -> Uuid {
            self.owner
        }
    }

    impl Restricted for Note {
        fn is_public(&self) -> bool {
            self.public
        }
    }

    #[test]
    fn test_ensure_owner_missing_is_not_found() {
        let result = ensure_owner::<Note>(None, Uuid::new_v4(), "note");
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_ensure_owner_mismatch_is_forbidden() {
        let note = Note {
            owner: Uuid::new_v4(),
            public: true,
        };
        let result = ensure_owner(Some(note), Uuid::new_v4(), "note");
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_ensure_owner_accepts_the_owner() {
        let owner = Uuid::new_v4();
        let note = Note {
            owner,
            public: false,
        };
        assert!(ensure_owner(Some(note), owner, "note").is_ok());
    }

    #[test]
    fn test_private_entity_hidden_from_non_owner() {
        let note = Note {
            owner: Uuid::new_v4(),
            public: false,
        };
        let result = ensure_visible(Some(note), Uuid::new_v4(), "note");
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_private_entity_visible_to_owner() {
        let owner = Uuid::new_v4();
        let note = Note {
            owner,
            public: false,
        };
        assert!(ensure_visible(Some(note), owner, "note").is_ok());
    }

    #[test]
    fn test_public_entity_visible_to_anyone() {
        let note = Note {
            owner: Uuid::new_v4(),
            public: true,
        };
        assert!(ensure_visible(Some(note), Uuid::new_v4(), "note").is_ok());
    }
}
