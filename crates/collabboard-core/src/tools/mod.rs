//! Tool system for the whiteboard.

use crate::shapes::{ElementKind, ElementStyle};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Eraser,
    Rectangle,
    Circle,
    Arrow,
    Line,
    Text,
    Sticky,
    Image,
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Arrow,
        ToolKind::Line,
        ToolKind::Text,
        ToolKind::Sticky,
        ToolKind::Image,
    ];

    /// Single-letter keyboard shortcut.
    pub fn shortcut(self) -> char {
        match self {
            ToolKind::Select => 'v',
            ToolKind::Pen => 'p',
            ToolKind::Eraser => 'e',
            ToolKind::Rectangle => 'r',
            ToolKind::Circle => 'c',
            ToolKind::Arrow => 'a',
            ToolKind::Line => 'l',
            ToolKind::Text => 't',
            ToolKind::Sticky => 's',
            ToolKind::Image => 'i',
        }
    }

    /// Look up a tool by its shortcut key, case-insensitively.
    pub fn from_shortcut(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let c = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ALL.into_iter().find(|tool| tool.shortcut() == c)
    }

    /// Tools whose press-drag gesture grows a box from the press point.
    pub fn creates_box(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle
                | ToolKind::Circle
                | ToolKind::Arrow
                | ToolKind::Line
                | ToolKind::Sticky
        )
    }

    /// Element kind produced by this tool, if it creates one directly.
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            ToolKind::Pen => Some(ElementKind::Pen),
            ToolKind::Rectangle => Some(ElementKind::Rectangle),
            ToolKind::Circle => Some(ElementKind::Circle),
            ToolKind::Arrow => Some(ElementKind::Arrow),
            ToolKind::Line => Some(ElementKind::Line),
            ToolKind::Text => Some(ElementKind::Text),
            ToolKind::Sticky => Some(ElementKind::Sticky),
            ToolKind::Image => Some(ElementKind::Image),
            ToolKind::Select | ToolKind::Eraser => None,
        }
    }

    /// Display name for UI.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Arrow => "Arrow",
            ToolKind::Line => "Line",
            ToolKind::Text => "Text",
            ToolKind::Sticky => "Sticky note",
            ToolKind::Image => "Image",
        }
    }
}

/// Everything new elements inherit from the current toolbar state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingContext {
    pub tool: ToolKind,
    pub style: ElementStyle,
    /// Layer assigned to new elements.
    pub layer: i32,
    /// Opacity assigned to new elements (0..=1).
    pub opacity: f64,
}

impl Default for DrawingContext {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            style: ElementStyle::default(),
            layer: 1,
            opacity: 1.0,
        }
    }
}

impl DrawingContext {
    pub fn with_tool(mut self, tool: ToolKind) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_roundtrip() {
        for tool in ToolKind::ALL {
            let key = tool.shortcut().to_string();
            assert_eq!(ToolKind::from_shortcut(&key), Some(tool));
            assert_eq!(ToolKind::from_shortcut(&key.to_uppercase()), Some(tool));
        }
    }

    #[test]
    fn test_from_shortcut_rejects_other_keys() {
        assert_eq!(ToolKind::from_shortcut("x"), None);
        assert_eq!(ToolKind::from_shortcut("Escape"), None);
        assert_eq!(ToolKind::from_shortcut(""), None);
    }

    #[test]
    fn test_creates_box() {
        let boxed: Vec<_> = ToolKind::ALL.into_iter().filter(|t| t.creates_box()).collect();
        assert_eq!(
            boxed,
            vec![
                ToolKind::Rectangle,
                ToolKind::Circle,
                ToolKind::Arrow,
                ToolKind::Line,
                ToolKind::Sticky
            ]
        );
    }

    #[test]
    fn test_default_context() {
        let ctx = DrawingContext::default();
        assert_eq!(ctx.tool, ToolKind::Select);
        assert_eq!(ctx.layer, 1);
        assert!((ctx.with_opacity(4.0).opacity - 1.0).abs() < f64::EPSILON);
    }
}
