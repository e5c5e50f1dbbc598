/// Consumer of the virtual controller events produced by the overlay.
///
/// Implemented by the native controller backend; the overlay never reads
/// anything back from it.
pub trait OutputSink {
    fn set_button(&mut self, id: i32, pressed: bool);
    fn set_axis(&mut self, id: i32, value: i16);
    /// `true` routes emulated touches to the rear touch panel.
    fn set_touch_region(&mut self, is_back: bool);
    fn attach_controller(&mut self);
    fn detach_controller(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Button { id: i32, pressed: bool },
    Axis { id: i32, value: i16 },
    TouchRegion { is_back: bool },
    Attach,
    Detach,
}

/// Sink that keeps every event in order of emission.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<OutputEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl OutputSink for RecordingSink {
    fn set_button(&mut self, id: i32, pressed: bool) {
        self.events.push(OutputEvent::Button { id, pressed });
    }

    fn set_axis(&mut self, id: i32, value: i16) {
        self.events.push(OutputEvent::Axis { id, value });
    }

    fn set_touch_region(&mut self, is_back: bool) {
        self.events.push(OutputEvent::TouchRegion { is_back });
    }

    fn attach_controller(&mut self) {
        self.events.push(OutputEvent::Attach);
    }

    fn detach_controller(&mut self) {
        self.events.push(OutputEvent::Detach);
    }
}

/// Sink for hosts without a controller backend: every event goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn set_button(&mut self, id: i32, pressed: bool) {
        log::debug!("button {id} -> {}", if pressed { "down" } else { "up" });
    }

    fn set_axis(&mut self, id: i32, value: i16) {
        log::trace!("axis {id} -> {value}");
    }

    fn set_touch_region(&mut self, is_back: bool) {
        log::info!(
            "touch region -> {}",
            if is_back { "back" } else { "front" }
        );
    }

    fn attach_controller(&mut self) {
        log::info!("virtual controller attached");
    }

    fn detach_controller(&mut self) {
        log::info!("virtual controller detached");
    }
}
