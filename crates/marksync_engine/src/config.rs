//! Configuration for the sync engine.

/// Configuration for sync invocations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Frontmatter key prefix for the watermark block.
    pub watermark_prefix: String,
    /// Service name used in anchor tokens (`^{service}-{id}`).
    pub anchor_service: String,
    /// Minimum merge-strategy confidence below which a proposed section
    /// merge is rejected and the document routes to conflict marking.
    pub min_confidence: f32,
    /// Heading under which capture entries are appended.
    pub capture_heading: String,
}

impl SyncConfig {
    /// Creates a configuration with the default prefixes.
    pub fn new() -> Self {
        Self {
            watermark_prefix: "gdoc".into(),
            anchor_service: "gtask".into(),
            min_confidence: 0.8,
            capture_heading: "## Captured".into(),
        }
    }

    /// Sets the watermark key prefix.
    pub fn with_watermark_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.watermark_prefix = prefix.into();
        self
    }

    /// Sets the anchor service name.
    pub fn with_anchor_service(mut self, service: impl Into<String>) -> Self {
        self.anchor_service = service.into();
        self
    }

    /// Sets the minimum merge confidence.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Sets the capture heading.
    pub fn with_capture_heading(mut self, heading: impl Into<String>) -> Self {
        self.capture_heading = heading.into();
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SyncConfig::new()
            .with_watermark_prefix("notion")
            .with_anchor_service("todoist")
            .with_min_confidence(0.5);

        assert_eq!(config.watermark_prefix, "notion");
        assert_eq!(config.anchor_service, "todoist");
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.capture_heading, "## Captured");
    }
}
