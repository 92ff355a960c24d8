use crate::messaging::{MavContent, MavResult, MavSeverity};

/// Acknowledgements and status texts produced while handling one command or one tick.
/// The control loop flushes it to the transport after every iteration.
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<MavContent>,
}

impl Outbox {
    pub fn ack(&mut self, command: u32, result: MavResult) {
        self.queued.push(MavContent::ack(command, result));
    }

    pub fn info(&mut self, text: &str) { self.status(MavSeverity::Info, text); }

    pub fn warning(&mut self, text: &str) { self.status(MavSeverity::Warning, text); }

    pub fn critical(&mut self, text: &str) { self.status(MavSeverity::Critical, text); }

    fn status(&mut self, severity: MavSeverity, text: &str) {
        self.queued.push(MavContent::status_text(severity, text));
    }

    /// Takes everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<MavContent> { std::mem::take(&mut self.queued) }
}
