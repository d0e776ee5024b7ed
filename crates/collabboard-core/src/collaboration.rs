//! Collaborator presence consumed by the whiteboard.
//!
//! The whiteboard never talks to a realtime backend itself. A host wires in
//! a [`PresenceFeed`] and the board pulls cursor positions from it before
//! rendering.

use crate::shapes::SerializableColor;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A remote collaborator's cursor in scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorCursor {
    pub user_id: String,
    /// Display name shown next to the cursor.
    pub name: String,
    pub color: SerializableColor,
    pub position: Point,
}

impl CollaboratorCursor {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        color: SerializableColor,
        position: Point,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            color,
            position,
        }
    }
}

/// Source of collaborator cursor positions.
pub trait PresenceFeed {
    /// Current cursors of everyone connected, possibly including the local user.
    fn cursors(&self) -> Vec<CollaboratorCursor>;

    /// Number of users present.
    fn presence_count(&self) -> usize {
        self.cursors().len()
    }
}

/// A fixed set of cursors, for demos and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticPresence {
    cursors: Vec<CollaboratorCursor>,
}

impl StaticPresence {
    pub fn new(cursors: Vec<CollaboratorCursor>) -> Self {
        Self { cursors }
    }

    /// Two sample collaborators.
    pub fn demo() -> Self {
        Self::new(vec![
            CollaboratorCursor::new(
                "alice",
                "Alice",
                SerializableColor::new(59, 130, 246, 255),
                Point::new(320.0, 180.0),
            ),
            CollaboratorCursor::new(
                "bob",
                "Bob",
                SerializableColor::new(16, 185, 129, 255),
                Point::new(520.0, 340.0),
            ),
        ])
    }
}

impl PresenceFeed for StaticPresence {
    fn cursors(&self) -> Vec<CollaboratorCursor> {
        self.cursors.clone()
    }
}

/// Cursors that should be drawn for `local_user_id`: everyone else.
pub fn remote_cursors<'a>(
    cursors: &'a [CollaboratorCursor],
    local_user_id: &'a str,
) -> impl Iterator<Item = &'a CollaboratorCursor> + 'a {
    cursors.iter().filter(move |c| c.user_id != local_user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_presence() {
        let feed = StaticPresence::demo();
        assert_eq!(feed.presence_count(), 2);
        assert_eq!(feed.cursors()[0].name, "Alice");
    }

    #[test]
    fn test_remote_cursors_skip_local_user() {
        let cursors = StaticPresence::demo().cursors();
        let remote: Vec<_> = remote_cursors(&cursors, "alice").collect();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].user_id, "bob");
    }
}
