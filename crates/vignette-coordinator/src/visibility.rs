use vignette_config::VisibilityOptions;

/// One intersection report for the watched element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    /// Visible fraction of the element, `0.0..=1.0`.
    pub ratio: f64,
}

impl IntersectionEntry {
    pub fn visible() -> Self {
        Self {
            is_intersecting: true,
            ratio: 1.0,
        }
    }

    pub fn hidden() -> Self {
        Self {
            is_intersecting: false,
            ratio: 0.0,
        }
    }
}

/// Host-side intersection watcher for a single element.
pub trait VisibilityObserver {
    fn observe(&mut self, options: VisibilityOptions);
    fn unobserve(&mut self);
}

/// Turns raw intersection reports into visible/not-visible transitions.
///
/// Reports arrive from the host's event queue in no particular order
/// relative to animation completions.
pub struct VisibilityMonitor {
    options: VisibilityOptions,
    observer: Option<Box<dyn VisibilityObserver>>,
    observing: bool,
    last: Option<bool>,
}

impl VisibilityMonitor {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            observer: None,
            observing: false,
            last: None,
        }
    }

    pub fn options(&self) -> VisibilityOptions {
        self.options
    }

    /// Replace the intersection settings. A running watch is re-registered
    /// with the new settings; the last known visibility is kept, so the
    /// re-registration alone never reports a transition.
    pub fn set_options(&mut self, options: VisibilityOptions) {
        if options == self.options {
            return;
        }
        self.options = options;
        if !self.observing {
            return;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.unobserve();
            observer.observe(options);
        }
    }

    /// Install the host watcher. Observation starts with [`start`](Self::start).
    pub fn set_observer(&mut self, observer: Box<dyn VisibilityObserver>) {
        self.stop();
        self.observer = Some(observer);
    }

    /// Begin watching. The first report after starting always counts as a
    /// transition.
    pub fn start(&mut self) {
        if self.observing {
            return;
        }
        self.observing = true;
        self.last = None;
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(self.options);
        }
    }

    pub fn stop(&mut self) {
        if !self.observing {
            return;
        }
        self.observing = false;
        if let Some(observer) = self.observer.as_mut() {
            observer.unobserve();
        }
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Feed one report; returns the new visibility if it changed.
    pub fn report(&mut self, entry: IntersectionEntry) -> Option<bool> {
        if !self.observing {
            return None;
        }
        let visible = entry.is_intersecting && entry.ratio >= self.options.threshold;
        if self.last == Some(visible) {
            return None;
        }
        self.last = Some(visible);
        Some(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeObserver;

    fn entry(ratio: f64) -> IntersectionEntry {
        IntersectionEntry {
            is_intersecting: ratio > 0.0,
            ratio,
        }
    }

    fn started() -> VisibilityMonitor {
        let mut monitor = VisibilityMonitor::new(VisibilityOptions::default());
        monitor.start();
        monitor
    }

    #[test]
    fn reports_only_transitions() {
        let mut monitor = started();
        assert_eq!(monitor.report(entry(0.5)), Some(true));
        assert_eq!(monitor.report(entry(0.8)), None);
        assert_eq!(monitor.report(entry(0.0)), Some(false));
        assert_eq!(monitor.report(entry(0.0)), None);
    }

    #[test]
    fn first_report_always_counts() {
        let mut monitor = started();
        assert_eq!(monitor.report(IntersectionEntry::hidden()), Some(false));
    }

    #[test]
    fn below_threshold_is_not_visible() {
        let mut monitor = started();
        assert_eq!(monitor.report(entry(0.05)), Some(false));
        assert_eq!(monitor.report(entry(0.1)), Some(true));
    }

    #[test]
    fn zero_threshold_counts_any_intersection() {
        let mut monitor = VisibilityMonitor::new(VisibilityOptions {
            root_margin: 0.0,
            threshold: 0.0,
        });
        monitor.start();
        assert_eq!(monitor.report(IntersectionEntry::hidden()), Some(false));
        assert_eq!(
            monitor.report(IntersectionEntry {
                is_intersecting: true,
                ratio: 0.0
            }),
            Some(true)
        );
    }

    #[test]
    fn ignores_reports_while_stopped() {
        let mut monitor = VisibilityMonitor::new(VisibilityOptions::default());
        assert_eq!(monitor.report(IntersectionEntry::visible()), None);
    }

    #[test]
    fn restart_forgets_last_state() {
        let mut monitor = started();
        monitor.report(IntersectionEntry::visible());
        monitor.stop();
        monitor.start();
        assert_eq!(monitor.report(IntersectionEntry::visible()), Some(true));
    }

    #[test]
    fn drives_the_host_observer() {
        let observer = FakeObserver::default();
        let mut monitor = VisibilityMonitor::new(VisibilityOptions::default());
        monitor.set_observer(Box::new(observer.clone()));
        monitor.start();
        monitor.start();
        monitor.stop();
        monitor.stop();
        assert_eq!(observer.log(), vec!["observe threshold=0.1", "unobserve"]);
    }

    #[test]
    fn new_options_reobserve_and_keep_last_state() {
        let observer = FakeObserver::default();
        let mut monitor = VisibilityMonitor::new(VisibilityOptions::default());
        monitor.set_observer(Box::new(observer.clone()));
        monitor.start();
        assert_eq!(monitor.report(entry(0.3)), Some(true));

        let stricter = VisibilityOptions {
            threshold: 0.5,
            ..VisibilityOptions::default()
        };
        monitor.set_options(stricter);
        monitor.set_options(stricter);
        assert_eq!(
            observer.log(),
            vec!["observe threshold=0.1", "unobserve", "observe threshold=0.5"]
        );
        assert_eq!(monitor.report(entry(1.0)), None);
        assert_eq!(monitor.report(entry(0.3)), Some(false));
    }

    #[test]
    fn options_set_while_stopped_apply_on_start() {
        let observer = FakeObserver::default();
        let mut monitor = VisibilityMonitor::new(VisibilityOptions::default());
        monitor.set_observer(Box::new(observer.clone()));
        monitor.set_options(VisibilityOptions {
            threshold: 0.0,
            ..VisibilityOptions::default()
        });
        assert!(observer.log().is_empty());
        monitor.start();
        assert_eq!(observer.log(), vec!["observe threshold=0"]);
    }
}
