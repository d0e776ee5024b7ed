//! Presentation deck: a read-only slide show over fixed element lists.

use crate::shapes::Element;
use serde::{Deserialize, Serialize};

/// One slide and the elements drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Thumbnail image URL, if the source provides one.
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Slide {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            thumbnail: None,
            elements: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }
}

/// Source of slides for presentation mode.
pub trait SlideSource {
    fn slides(&self) -> Vec<Slide>;
}

/// A fixed list of slides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticSlides {
    slides: Vec<Slide>,
}

impl StaticSlides {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }
}

impl SlideSource for StaticSlides {
    fn slides(&self) -> Vec<Slide> {
        self.slides.clone()
    }
}

/// Slides plus the presentation cursor.
///
/// `current` is always a valid index while `slides` is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    slides: Vec<Slide>,
    current: usize,
    active: bool,
}

impl Deck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides,
            current: 0,
            active: false,
        }
    }

    /// Replace the slides, resetting to the first one.
    pub fn load(&mut self, slides: Vec<Slide>) {
        self.slides = slides;
        self.current = 0;
        if self.slides.is_empty() {
            self.active = false;
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start presenting. Returns false when there are no slides.
    pub fn enter(&mut self) -> bool {
        if self.slides.is_empty() {
            return false;
        }
        self.active = true;
        true
    }

    pub fn exit(&mut self) {
        self.active = false;
    }

    /// Advance one slide. No-op at the last slide.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.slides.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one slide. No-op at the first slide.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }
}
