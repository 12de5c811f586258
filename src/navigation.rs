//! Page navigation: which section is active while scrolling, and the mobile menu.

use std::fmt;

/// Distance below the top edge at which a section counts as reached
pub const SCROLL_PROBE_OFFSET: f32 = 100.0;

/// Page sections in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    About,
    Skills,
    Projects,
    Contact,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::About,
        Section::Skills,
        Section::Projects,
        Section::Contact,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Contact => "contact",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::About => "About",
            Self::Skills => "Skills",
            Self::Projects => "Projects",
            Self::Contact => "Contact",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vertical extent of a laid-out section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionLayout {
    pub section: Section,
    pub offset_top: f32,
    pub height: f32,
}

impl SectionLayout {
    pub fn new(section: Section, offset_top: f32, height: f32) -> Self {
        Self {
            section,
            offset_top,
            height,
        }
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.offset_top && y < self.offset_top + self.height
    }

    /// Stack every section back to back, each `height` tall
    pub fn uniform(height: f32) -> Vec<SectionLayout> {
        Section::ALL
            .iter()
            .enumerate()
            .map(|(i, &section)| SectionLayout::new(section, i as f32 * height, height))
            .collect()
    }
}

/// Tracks the section nearest the top of the viewport
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    active: Section,
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self {
            active: Section::Home,
        }
    }
}

impl ScrollSpy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Section {
        self.active
    }

    /// Update from a scroll position; returns the new section if it changed
    ///
    /// Sections missing from `layouts` are skipped. When several contain the
    /// probe the last one in page order wins; when none do, the active
    /// section is kept.
    pub fn on_scroll(&mut self, scroll_y: f32, layouts: &[SectionLayout]) -> Option<Section> {
        let probe = scroll_y + SCROLL_PROBE_OFFSET;
        let hit = Section::ALL
            .iter()
            .filter_map(|section| layouts.iter().find(|l| l.section == *section))
            .filter(|layout| layout.contains(probe))
            .last()?;

        if hit.section == self.active {
            return None;
        }
        self.active = hit.section;
        Some(hit.section)
    }
}

/// Mobile navigation menu
#[derive(Debug, Clone, Default)]
pub struct NavMenu {
    open: bool,
}

impl NavMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the menu and return the scroll offset of `section`, if laid out
    pub fn scroll_to(&mut self, section: Section, layouts: &[SectionLayout]) -> Option<f32> {
        self.open = false;
        layouts
            .iter()
            .find(|l| l.section == section)
            .map(|l| l.offset_top)
    }
}
