//! Volume requests (not supported)

/// Fixed reply for any volume request
pub const VOLUME_UNSUPPORTED: &str = "I understand you want to control the volume. However, volume control requires system integration which is not available in this version.";

#[derive(Debug, Default, Clone, Copy)]
pub struct VolumeHandler;

impl VolumeHandler {
    /// The requested level is not parsed; the answer is always the same
    #[must_use]
    pub fn handle(&self, _command: &str) -> String {
        VOLUME_UNSUPPORTED.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_unsupported() {
        assert_eq!(VolumeHandler.handle("volume up"), VOLUME_UNSUPPORTED);
        assert_eq!(VolumeHandler.handle("set volume to 50"), VOLUME_UNSUPPORTED);
    }
}
