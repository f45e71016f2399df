use std::cell::RefCell;
use std::rc::Rc;

use vignette_config::VisibilityOptions;
use vignette_coordinator::{IntersectionEntry, VisibilityObserver};

#[derive(Default)]
struct Watch {
    options: Option<VisibilityOptions>,
    initial_report_due: bool,
}

/// The terminal stands in for the browser viewport: the widget is either
/// fully on screen or scrolled away, toggled from the keyboard.
pub struct Viewport {
    in_view: bool,
    watch: Rc<RefCell<Watch>>,
}

impl Viewport {
    pub fn new(in_view: bool) -> Self {
        Self {
            in_view,
            watch: Rc::default(),
        }
    }

    /// Observer handle to install on the coordinator.
    pub fn observer(&self) -> ViewportObserver {
        ViewportObserver {
            watch: Rc::clone(&self.watch),
        }
    }

    pub fn in_view(&self) -> bool {
        self.in_view
    }

    pub fn is_watched(&self) -> bool {
        self.watch.borrow().options.is_some()
    }

    /// Flip between on screen and off screen. Returns the report to deliver
    /// when someone is watching.
    pub fn toggle(&mut self) -> Option<IntersectionEntry> {
        self.in_view = !self.in_view;
        self.is_watched().then(|| self.entry())
    }

    /// Like a browser intersection observer, a fresh watch reports the
    /// current state once without any movement.
    pub fn take_initial_report(&mut self) -> Option<IntersectionEntry> {
        let mut watch = self.watch.borrow_mut();
        if watch.options.is_none() || !watch.initial_report_due {
            return None;
        }
        watch.initial_report_due = false;
        drop(watch);
        Some(self.entry())
    }

    fn entry(&self) -> IntersectionEntry {
        if self.in_view {
            IntersectionEntry::visible()
        } else {
            IntersectionEntry::hidden()
        }
    }
}

pub struct ViewportObserver {
    watch: Rc<RefCell<Watch>>,
}

impl VisibilityObserver for ViewportObserver {
    fn observe(&mut self, options: VisibilityOptions) {
        tracing::debug!(
            threshold = options.threshold,
            root_margin = options.root_margin,
            "viewport watch started"
        );
        let mut watch = self.watch.borrow_mut();
        watch.options = Some(options);
        watch.initial_report_due = true;
    }

    fn unobserve(&mut self) {
        tracing::debug!("viewport watch stopped");
        let mut watch = self.watch.borrow_mut();
        watch.options = None;
        watch.initial_report_due = false;
    }
}
