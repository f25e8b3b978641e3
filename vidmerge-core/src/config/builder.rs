// ============================================================================
// vidmerge-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for MergeConfig
//
// Provides a fluent API for creating MergeConfig instances. Every field starts
// from the MergeConfig defaults, so callers only set what they change.

use std::path::PathBuf;

use super::MergeConfig;
use crate::external::CodecPolicy;

/// Builder for creating MergeConfig instances.
#[derive(Debug, Clone, Default)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    /// Creates a new MergeConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory used for temporary manifests.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = Some(temp_dir);
        self
    }

    /// Sets an explicit ffmpeg binary.
    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.ffmpeg_path = Some(path);
        self
    }

    /// Replaces the discovered extension set.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().to_lowercase())
            .collect();
        self
    }

    /// Overrides the engine's default codec handling.
    pub fn codec_policy(mut self, policy: CodecPolicy) -> Self {
        self.config.codec_policy = Some(policy);
        self
    }

    /// Sets whether an existing output may be replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Sets whether input durations are probed for progress reporting.
    pub fn probe_durations(mut self, probe: bool) -> Self {
        self.config.probe_durations = probe;
        self
    }

    /// Sets how many trailing diagnostic lines are kept for error reports.
    pub fn diagnostic_tail_lines(mut self, lines: usize) -> Self {
        self.config.diagnostic_tail_lines = lines;
        self
    }

    /// Builds the MergeConfig.
    pub fn build(self) -> MergeConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = MergeConfigBuilder::new()
            .temp_dir(PathBuf::from("/tmp/vidmerge"))
            .ffmpeg_path(PathBuf::from("/usr/local/bin/ffmpeg"))
            .extensions(["MP4", "webm"])
            .codec_policy(CodecPolicy::StreamCopy)
            .overwrite(true)
            .probe_durations(false)
            .diagnostic_tail_lines(5)
            .build();

        assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/vidmerge")));
        assert_eq!(config.ffmpeg_path, Some(PathBuf::from("/usr/local/bin/ffmpeg")));
        assert_eq!(config.extensions, vec!["mp4".to_string(), "webm".to_string()]);
        assert_eq!(config.codec_policy, Some(CodecPolicy::StreamCopy));
        assert!(config.overwrite);
        assert!(!config.probe_durations);
        assert_eq!(config.diagnostic_tail_lines, 5);
    }

    #[test]
    fn builder_defaults_match_config_defaults() {
        let built = MergeConfigBuilder::new().build();
        let default = MergeConfig::default();
        assert_eq!(built.extensions, default.extensions);
        assert_eq!(built.probe_durations, default.probe_durations);
        assert_eq!(built.diagnostic_tail_lines, default.diagnostic_tail_lines);
    }
}
