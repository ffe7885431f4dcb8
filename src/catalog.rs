//! Announcement catalog types.
//!
//! The catalog is static for the lifetime of a session: a list of slides plus
//! the version constraints deciding which installs ever see them. A default
//! catalog is compiled into the build; deploys that manage announcements out
//! of band ship a JSON document and load it with
//! [`AnnouncementCatalog::load_from`].

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One element of an announcement slide, rendered top-to-bottom by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlideElement {
    /// Heading text.
    Title {
        /// The heading itself.
        text: String,
    },
    /// Body copy.
    Description {
        /// The paragraph itself.
        text: String,
    },
    /// Illustration, referenced by asset name so the host resolves the bytes.
    Image {
        /// Asset identifier known to the host.
        asset: String,
    },
    /// Call-to-action button routed back to the host by identifier.
    Action {
        /// Button label.
        label: String,
        /// Host-side action identifier invoked on press.
        action: String,
    },
}

/// An ordered, opaque block of announcement content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Elements in display order.
    pub elements: Vec<SlideElement>,
}

/// Static announcement configuration, immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementCatalog {
    /// Lowest running app version that may ever show the announcement.
    pub min_app_version: Version,

    /// Show only on version upgrades, never on the first run of a fresh
    /// install.
    #[serde(default)]
    pub only_updates: bool,

    /// With `only_updates`, the previous session's version must be strictly
    /// below this for the upgrade path to qualify.
    pub max_last_app_version: Version,

    /// Slides in display order; empty means there is nothing to show.
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl AnnouncementCatalog {
    /// Parse a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid catalog.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse announcement catalog")
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse catalog from {}", path.display()))
    }

    /// The catalog compiled into this build.
    ///
    /// Targets installs upgrading to the 8.x line from anything older.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            min_app_version: Version::new(8, 0, 0),
            only_updates: true,
            max_last_app_version: Version::new(8, 0, 0),
            slides: vec![
                Slide {
                    elements: vec![
                        SlideElement::Image {
                            asset: "whats_new_home".to_string(),
                        },
                        SlideElement::Title {
                            text: "A redesigned home screen".to_string(),
                        },
                        SlideElement::Description {
                            text: "Your balances, recent activity, and network selector now \
                                   live on one screen."
                                .to_string(),
                        },
                    ],
                },
                Slide {
                    elements: vec![
                        SlideElement::Image {
                            asset: "whats_new_buy".to_string(),
                        },
                        SlideElement::Title {
                            text: "Buy crypto without leaving the app".to_string(),
                        },
                        SlideElement::Description {
                            text: "Top up directly from the home screen with a card or bank \
                                   transfer."
                                .to_string(),
                        },
                        SlideElement::Action {
                            label: "Try it now".to_string(),
                            action: "open_buy_flow".to_string(),
                        },
                    ],
                },
            ],
        }
    }

    /// Number of slides in the catalog.
    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}
