//! Data models for the API service

pub mod comment;
pub mod dashboard;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

pub use comment::{Comment, CommentWithAuthor, ParentRef};
pub use dashboard::ChannelStats;
pub use like::LikeTarget;
pub use playlist::{Playlist, PlaylistDetail};
pub use subscription::SubscribedChannel;
pub use tweet::Tweet;
pub use user::{User, UserResponse};
pub use video::Video;

/// Clamp raw pagination parameters into (page, limit, offset)
///
/// Pages are 1-based; limit is clamped to [1, 100].
pub fn page_window(page: Option<u32>, limit: Option<u32>) -> (u32, u32, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100);
    let offset = (page as i64 - 1) * limit as i64;
    (page, limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults() {
        assert_eq!(page_window(None, None), (1, 10, 0));
    }

    #[test]
    fn test_page_window_clamps() {
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(3), Some(500)), (3, 100, 200));
    }

    #[test]
    fn test_page_window_offset() {
        assert_eq!(page_window(Some(4), Some(25)), (4, 25, 75));
    }
}
