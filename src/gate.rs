//! The announcement gate state machine.
//!
//! Decides once per session whether the what's-new carousel qualifies for
//! display, applies the home-route presentation rule as routes change, and
//! tracks the active slide while the carousel is shown. Dismissal records the
//! acknowledged version and is terminal for the session.

use crate::catalog::{AnnouncementCatalog, Slide};
use crate::events::SessionEvent;
use crate::markers::{
    CURRENT_APP_VERSION, MarkerSnapshot, MarkerStore, SEEN_ANNOUNCEMENT_VERSION, StoreError,
};
use tracing::debug;

/// In-memory, session-scoped display state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateState {
    /// Whether the carousel is currently presented.
    pub visible: bool,

    /// Index of the active slide. Valid whenever `visible` is set and the
    /// catalog has slides.
    pub active_slide: usize,
}

/// Decide whether the announcement qualifies for this session.
///
/// Evaluated in order, each check short-circuiting to "do not show":
/// the user already acknowledged at or after the qualifying version; an
/// updates-only catalog sees no upgrade, or an upgrade from too recent a
/// version; the running version is below the floor (or unknown, which can
/// never clear it); the catalog has no slides.
#[must_use]
pub fn should_show(catalog: &AnnouncementCatalog, markers: &MarkerSnapshot) -> bool {
    if markers
        .seen
        .as_ref()
        .is_some_and(|seen| *seen >= catalog.min_app_version)
    {
        return false;
    }

    if catalog.only_updates {
        let is_update = markers.last.is_some() && markers.current != markers.last;
        if !is_update {
            return false;
        }
        if markers
            .last
            .as_ref()
            .is_some_and(|last| *last >= catalog.max_last_app_version)
        {
            return false;
        }
    }

    let Some(current) = markers.current.as_ref() else {
        return false;
    };
    if *current < catalog.min_app_version {
        return false;
    }

    !catalog.slides.is_empty()
}

/// Session-scoped announcement gate.
///
/// Everything the gate consumes is injected at construction: the catalog, the
/// marker store, the designated home route, and the host's enable switch. It
/// never reaches into ambient state.
#[derive(Debug)]
pub struct AnnouncementGate<S> {
    catalog: AnnouncementCatalog,
    store: S,
    home_route: String,
    enabled: bool,
    qualifies: bool,
    active_route: Option<String>,
    state: GateState,
}

impl<S: MarkerStore> AnnouncementGate<S> {
    /// Create a gate over `catalog` and `store`.
    ///
    /// `home_route` names the only route at which the carousel may appear;
    /// `enabled` is the host's master switch for announcement display.
    #[must_use]
    pub fn new(
        catalog: AnnouncementCatalog,
        store: S,
        home_route: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            catalog,
            store,
            home_route: home_route.into(),
            enabled,
            qualifies: false,
            active_route: None,
            state: GateState::default(),
        }
    }

    /// Whether the carousel is currently presented.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// Index of the active slide.
    #[must_use]
    pub const fn active_slide(&self) -> usize {
        self.state.active_slide
    }

    /// Current display state.
    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// The slide currently presented, when the carousel is visible.
    #[must_use]
    pub fn current_slide(&self) -> Option<&Slide> {
        if !self.state.visible {
            return None;
        }
        self.catalog.slides.get(self.state.active_slide)
    }

    /// Evaluate qualification from a fresh marker snapshot.
    pub fn session_started(&mut self) {
        let snapshot = MarkerSnapshot::read(&self.store);
        self.qualifies = should_show(&self.catalog, &snapshot);
        debug!("Announcement qualifies this session: {}", self.qualifies);
        self.apply_presentation();
    }

    /// Record the active route reported by the navigation collaborator.
    pub fn route_changed(&mut self, route: &str) {
        self.active_route = Some(route.to_string());
        self.apply_presentation();
    }

    /// Flip the host's enable switch.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.apply_presentation();
    }

    /// Dismiss the carousel and record the acknowledged version.
    ///
    /// The transition to hidden is unconditional and terminal for the
    /// session; it happens even when the write fails. A failed write is
    /// returned for the host to log and merely risks re-showing the
    /// announcement next session. Repeated calls rewrite the same value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the acknowledged version cannot be read
    /// or written.
    pub fn acknowledge(&mut self) -> Result<(), StoreError> {
        self.qualifies = false;
        self.state.visible = false;

        let Some(current) = self.store.get(CURRENT_APP_VERSION)? else {
            // Nothing to record; the next session re-evaluates from scratch.
            return Ok(());
        };
        self.store.set(SEEN_ANNOUNCEMENT_VERSION, &current)
    }

    /// Settle a horizontal scroll at `offset`, activating the nearest slide.
    ///
    /// The nearest index is `offset / slide_width` rounded, clamped to the
    /// slide range. Jitter that does not change the index leaves the state
    /// untouched. Non-positive or non-finite slide widths are ignored.
    pub fn settle_scroll(&mut self, offset: f64, slide_width: f64) {
        if !slide_width.is_finite() || slide_width <= 0.0 {
            return;
        }
        let Some(max_index) = self.catalog.slides.len().checked_sub(1) else {
            return;
        };

        let index = nearest_index(offset, slide_width).min(max_index);
        if index == self.state.active_slide {
            return;
        }
        self.state.active_slide = index;
    }

    /// Apply one session event.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] only for [`SessionEvent::Acknowledged`], when
    /// the acknowledged version cannot be persisted.
    pub fn handle(&mut self, event: &SessionEvent) -> Result<(), StoreError> {
        match event {
            SessionEvent::SessionStarted => {
                self.session_started();
                Ok(())
            }
            SessionEvent::RouteChanged(route) => {
                self.route_changed(route);
                Ok(())
            }
            SessionEvent::ScrollSettled {
                offset,
                slide_width,
            } => {
                self.settle_scroll(*offset, *slide_width);
                Ok(())
            }
            SessionEvent::Acknowledged => self.acknowledge(),
        }
    }

    /// The carousel only appears on the home route, but once presented it
    /// stays up while the user navigates, until acknowledged or disabled.
    fn apply_presentation(&mut self) {
        if !(self.enabled && self.qualifies) {
            self.state.visible = false;
            return;
        }
        if self.active_route.as_deref() == Some(self.home_route.as_str()) {
            self.state.visible = true;
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "rounded value is clamped non-negative before the cast and to the slide range after"
)]
fn nearest_index(offset: f64, slide_width: f64) -> usize {
    (offset / slide_width).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Slide, SlideElement};
    use crate::markers::{LAST_APP_VERSION, MemoryStore};
    use proptest::prelude::*;
    use rstest::rstest;
    use semver::Version;

    fn ver(major: u64, minor: u64, patch: u64) -> Version {
        Version::new(major, minor, patch)
    }

    fn snap(
        current: Option<Version>,
        last: Option<Version>,
        seen: Option<Version>,
    ) -> MarkerSnapshot {
        MarkerSnapshot {
            current,
            last,
            seen,
        }
    }

    fn catalog(
        min: Version,
        only_updates: bool,
        max_last: Version,
        slide_count: usize,
    ) -> AnnouncementCatalog {
        let slides = (0..slide_count)
            .map(|index| Slide {
                elements: vec![SlideElement::Title {
                    text: format!("Slide {index}"),
                }],
            })
            .collect();

        AnnouncementCatalog {
            min_app_version: min,
            only_updates,
            max_last_app_version: max_last,
            slides,
        }
    }

    fn seeded_store(
        current: Option<&str>,
        last: Option<&str>,
    ) -> Result<MemoryStore, Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        if let Some(current) = current {
            store.set(CURRENT_APP_VERSION, current)?;
        }
        if let Some(last) = last {
            store.set(LAST_APP_VERSION, last)?;
        }
        Ok(store)
    }

    #[rstest]
    #[case::fresh_install_qualifies(
        snap(Some(ver(8, 0, 0)), None, None),
        catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
        true
    )]
    #[case::fresh_install_updates_only(
        snap(Some(ver(8, 0, 0)), None, None),
        catalog(ver(8, 0, 0), true, ver(8, 0, 0), 1),
        false
    )]
    #[case::upgrade_from_old_enough(
        snap(Some(ver(8, 1, 0)), Some(ver(7, 9, 0)), None),
        catalog(ver(8, 0, 0), true, ver(8, 0, 0), 1),
        true
    )]
    #[case::upgrade_from_too_recent(
        snap(Some(ver(8, 1, 0)), Some(ver(8, 0, 0)), None),
        catalog(ver(8, 0, 0), true, ver(8, 0, 0), 1),
        false
    )]
    #[case::seen_at_min_version_boundary(
        snap(Some(ver(8, 1, 0)), None, Some(ver(8, 0, 0))),
        catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
        false
    )]
    #[case::seen_below_min_version(
        snap(Some(ver(8, 1, 0)), None, Some(ver(7, 5, 0))),
        catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
        true
    )]
    #[case::current_below_floor(
        snap(Some(ver(7, 9, 0)), None, None),
        catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
        false
    )]
    #[case::current_unknown(
        snap(None, None, None),
        catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
        false
    )]
    #[case::no_slides(
        snap(Some(ver(8, 0, 0)), None, None),
        catalog(ver(8, 0, 0), false, ver(8, 0, 0), 0),
        false
    )]
    #[case::relaunch_same_version_updates_only(
        snap(Some(ver(8, 1, 0)), Some(ver(8, 1, 0)), None),
        catalog(ver(8, 0, 0), true, ver(8, 0, 0), 1),
        false
    )]
    fn test_visibility_scenarios(
        #[case] markers: MarkerSnapshot,
        #[case] catalog: AnnouncementCatalog,
        #[case] expected: bool,
    ) {
        assert_eq!(should_show(&catalog, &markers), expected);
    }

    #[test]
    fn test_gate_shows_only_on_home_route() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 2),
            store,
            "Home",
            true,
        );

        gate.session_started();
        assert!(!gate.is_visible());

        gate.route_changed("Settings");
        assert!(!gate.is_visible());

        gate.route_changed("Home");
        assert!(gate.is_visible());
        Ok(())
    }

    #[test]
    fn test_gate_stays_visible_after_leaving_home() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
            store,
            "Home",
            true,
        );

        gate.session_started();
        gate.route_changed("Home");
        gate.route_changed("Settings");
        assert!(gate.is_visible());
        Ok(())
    }

    #[test]
    fn test_gate_disabled_never_shows() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
            store,
            "Home",
            false,
        );

        gate.session_started();
        gate.route_changed("Home");
        assert!(!gate.is_visible());

        gate.set_enabled(true);
        assert!(gate.is_visible());
        Ok(())
    }

    #[test]
    fn test_acknowledge_is_terminal_for_session() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.1.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
            store,
            "Home",
            true,
        );

        gate.session_started();
        gate.route_changed("Home");
        assert!(gate.is_visible());

        gate.acknowledge()?;
        assert!(!gate.is_visible());

        // Returning home does not resurrect the carousel.
        gate.route_changed("Settings");
        gate.route_changed("Home");
        assert!(!gate.is_visible());
        Ok(())
    }

    #[test]
    fn test_acknowledge_records_current_version() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.1.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 1, 0), false, ver(8, 1, 0), 1),
            store,
            "Home",
            true,
        );

        gate.session_started();
        gate.acknowledge()?;
        gate.acknowledge()?;

        // A later session with the same floor stays hidden.
        gate.session_started();
        gate.route_changed("Home");
        assert!(!gate.is_visible());
        Ok(())
    }

    #[test]
    fn test_acknowledge_without_current_version() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(None, None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 1),
            store,
            "Home",
            true,
        );

        gate.session_started();
        gate.acknowledge()?;
        assert!(!gate.is_visible());
        Ok(())
    }

    #[test]
    fn test_settle_scroll_rounds_and_clamps() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 3),
            store,
            "Home",
            true,
        );

        gate.settle_scroll(340.0, 320.0);
        assert_eq!(gate.active_slide(), 1);

        // Minor jitter settles on the same index.
        gate.settle_scroll(335.0, 320.0);
        assert_eq!(gate.active_slide(), 1);

        // Overscroll past the end clamps to the last slide.
        gate.settle_scroll(5000.0, 320.0);
        assert_eq!(gate.active_slide(), 2);

        // Bounce-back past the start clamps to the first.
        gate.settle_scroll(-40.0, 320.0);
        assert_eq!(gate.active_slide(), 0);
        Ok(())
    }

    #[test]
    fn test_settle_scroll_ignores_bad_width() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 3),
            store,
            "Home",
            true,
        );

        gate.settle_scroll(640.0, 0.0);
        gate.settle_scroll(640.0, f64::NAN);
        gate.settle_scroll(640.0, -320.0);
        assert_eq!(gate.active_slide(), 0);
        Ok(())
    }

    #[test]
    fn test_current_slide_only_when_visible() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 2),
            store,
            "Home",
            true,
        );

        gate.session_started();
        assert!(gate.current_slide().is_none());

        gate.route_changed("Home");
        assert!(gate.current_slide().is_some());
        Ok(())
    }

    #[test]
    fn test_handle_dispatches_events() -> Result<(), Box<dyn std::error::Error>> {
        let store = seeded_store(Some("8.0.0"), None)?;
        let mut gate = AnnouncementGate::new(
            catalog(ver(8, 0, 0), false, ver(8, 0, 0), 2),
            store,
            "Home",
            true,
        );

        gate.handle(&SessionEvent::SessionStarted)?;
        gate.handle(&SessionEvent::RouteChanged("Home".to_string()))?;
        assert!(gate.is_visible());

        gate.handle(&SessionEvent::ScrollSettled {
            offset: 320.0,
            slide_width: 320.0,
        })?;
        assert_eq!(gate.active_slide(), 1);

        gate.handle(&SessionEvent::Acknowledged)?;
        assert!(!gate.is_visible());
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_settled_index_stays_in_range(
            offset in -10_000.0f64..10_000.0,
            slide_width in 1.0f64..1_000.0,
            slide_count in 1usize..8,
        ) {
            let store = MemoryStore::new();
            let mut gate = AnnouncementGate::new(
                catalog(ver(8, 0, 0), false, ver(8, 0, 0), slide_count),
                store,
                "Home",
                true,
            );

            gate.settle_scroll(offset, slide_width);
            prop_assert!(gate.active_slide() < slide_count);
        }

        #[test]
        fn prop_empty_catalog_never_shows(
            current in proptest::option::of(0u64..20),
            last in proptest::option::of(0u64..20),
            seen in proptest::option::of(0u64..20),
            only_updates: bool,
        ) {
            let markers = snap(
                current.map(|major| ver(major, 0, 0)),
                last.map(|major| ver(major, 0, 0)),
                seen.map(|major| ver(major, 0, 0)),
            );
            let empty = catalog(ver(1, 0, 0), only_updates, ver(1, 0, 0), 0);
            prop_assert!(!should_show(&empty, &markers));
        }

        #[test]
        fn prop_settle_scroll_is_idempotent(
            offset in -10_000.0f64..10_000.0,
            slide_width in 1.0f64..1_000.0,
        ) {
            let store = MemoryStore::new();
            let mut gate = AnnouncementGate::new(
                catalog(ver(8, 0, 0), false, ver(8, 0, 0), 4),
                store,
                "Home",
                true,
            );

            gate.settle_scroll(offset, slide_width);
            let settled = gate.active_slide();
            gate.settle_scroll(offset, slide_width);
            prop_assert_eq!(gate.active_slide(), settled);
        }
    }
}
