//! Run-scoped settings
//!
//! Two switches may be turned off by the operator part-way through a run:
//! memory checking and prompting on unrecognised diagnostic reports. Once
//! off they stay off until the run ends.

use crate::common::config::Features;

#[derive(Debug, Clone)]
pub struct RunSettings {
    memcheck: bool,
    request_details: bool,
    ask_to_save: bool,
}

impl RunSettings {
    pub fn new(features: &Features) -> Self {
        Self {
            memcheck: features.memcheck,
            request_details: features.request_details,
            ask_to_save: features.ask_to_save,
        }
    }

    pub fn memcheck(&self) -> bool {
        self.memcheck
    }

    pub fn request_details(&self) -> bool {
        self.request_details
    }

    pub fn ask_to_save(&self) -> bool {
        self.ask_to_save
    }

    /// Stop running the memory checker for the rest of the run
    pub fn disable_memcheck(&mut self) {
        if self.memcheck {
            tracing::info!("Memory checking disabled for the rest of the run");
        }
        self.memcheck = false;
    }

    /// Stop prompting on unrecognised diagnostic reports
    pub fn disable_details(&mut self) {
        self.request_details = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downgrades_are_sticky() {
        let mut settings = RunSettings::new(&Features::default());
        assert!(settings.memcheck());
        assert!(settings.request_details());

        settings.disable_memcheck();
        settings.disable_details();
        settings.disable_memcheck();

        assert!(!settings.memcheck());
        assert!(!settings.request_details());
        assert!(settings.ask_to_save());
    }

    #[test]
    fn test_reflects_features() {
        let features = Features {
            memcheck: false,
            ask_to_save: false,
            request_details: true,
            strict: true,
        };
        let settings = RunSettings::new(&features);
        assert!(!settings.memcheck());
        assert!(!settings.ask_to_save());
        assert!(settings.request_details());
    }
}
