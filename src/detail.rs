use crate::ir::Instance;

/// Host-side panel that shows the full record of a clicked node. The scene
/// only decides when to show or hide it; content rendering is the
/// panel's business.
pub trait DetailPanel {
    fn show(&mut self, instance: &Instance);
    fn hide(&mut self);
}

/// Panel that discards every call. Used when no host panel is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPanel;

impl DetailPanel for NullPanel {
    fn show(&mut self, _instance: &Instance) {}

    fn hide(&mut self) {}
}

/// Remembers what it was asked to display. Handy for headless hosts and
/// tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingPanel {
    pub current: Option<String>,
    pub shown: Vec<String>,
    pub hidden: usize,
}

impl DetailPanel for RecordingPanel {
    fn show(&mut self, instance: &Instance) {
        self.current = Some(instance.id.clone());
        self.shown.push(instance.id.clone());
    }

    fn hide(&mut self) {
        self.current = None;
        self.hidden += 1;
    }
}
