//! Browser session plus everything page objects need to drive it.

use crate::actions::Actions;
use crate::artifacts::{BugLog, CredentialStore};
use crate::config::Settings;
use crate::data::FixtureData;
use crate::driver::Driver;
use crate::locator::LocatorRegistry;
use crate::result::ProbeResult;
use std::sync::Arc;
use tracing::debug;

/// Shared, read-only inputs every session of a run is built from
#[derive(Debug, Clone)]
pub struct SuiteContext {
    registry: Arc<LocatorRegistry>,
    settings: Settings,
    data: FixtureData,
}

impl SuiteContext {
    /// Context from already loaded parts
    #[must_use]
    pub fn new(registry: Arc<LocatorRegistry>, settings: Settings, data: FixtureData) -> Self {
        Self {
            registry,
            settings,
            data,
        }
    }

    /// Validate settings and load the locator and fixture files they name,
    /// falling back to the bundled copies
    pub fn from_settings(settings: Settings) -> ProbeResult<Self> {
        settings.validate()?;
        let registry = match &settings.locators {
            Some(path) => LocatorRegistry::load(path)?,
            None => LocatorRegistry::bundled()?,
        };
        let data = FixtureData::load(settings.register_data.as_deref(), settings.static_data.as_deref())?;
        debug!(entries = registry.len(), base_url = %settings.base_url, "suite context ready");
        Ok(Self::new(Arc::new(registry), settings, data))
    }

    /// Locator registry
    #[must_use]
    pub fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Settings
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fixture data
    #[must_use]
    pub const fn data(&self) -> &FixtureData {
        &self.data
    }

    /// Session over `driver` sharing this context's registry
    #[must_use]
    pub fn session<D: Driver>(&self, driver: D) -> Session<D> {
        Session {
            driver,
            registry: Arc::clone(&self.registry),
            settings: self.settings.clone(),
            data: self.data.clone(),
        }
    }
}

/// One browser session. Page objects borrow it for their lifetime.
#[derive(Debug)]
pub struct Session<D: Driver> {
    driver: D,
    registry: Arc<LocatorRegistry>,
    settings: Settings,
    data: FixtureData,
}

impl<D: Driver> Session<D> {
    /// Session over `driver`
    #[must_use]
    pub const fn new(
        driver: D,
        registry: Arc<LocatorRegistry>,
        settings: Settings,
        data: FixtureData,
    ) -> Self {
        Self {
            driver,
            registry,
            settings,
            data,
        }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Locator registry
    #[must_use]
    pub fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Settings
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fixture data
    #[must_use]
    pub const fn data(&self) -> &FixtureData {
        &self.data
    }

    /// Action layer bound to this session's timeouts
    #[must_use]
    pub fn actions(&self) -> Actions<'_, D> {
        Actions::new(&self.driver, &self.registry, self.settings.timeouts())
    }

    /// Store of the last registered user
    #[must_use]
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.settings.credentials_path())
    }

    /// Bug log of the run
    #[must_use]
    pub fn bug_log(&self) -> BugLog {
        BugLog::new(self.settings.bug_log_path())
    }

    /// Give the driver back, e.g. to close the browser
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDriver, FakeSite};
    use std::path::PathBuf;

    #[test]
    fn test_context_from_default_settings() {
        let context = SuiteContext::from_settings(Settings::default()).unwrap();
        assert!(context.registry().resolve("login", "logout_link").is_ok());
        assert_eq!(context.data().statics.value("Products", "Build").unwrap(), "Build");
    }

    #[test]
    fn test_context_rejects_bad_settings() {
        let settings = Settings::default().with_base_url("not a url");
        assert!(SuiteContext::from_settings(settings).unwrap_err().is_config_error());
    }

    #[test]
    fn test_context_reports_missing_locator_file() {
        let mut settings = Settings::default();
        settings.locators = Some(PathBuf::from("/nonexistent/locators.json"));
        assert!(SuiteContext::from_settings(settings).is_err());
    }

    #[test]
    fn test_sessions_share_registry() {
        let context = SuiteContext::from_settings(Settings::default()).unwrap();
        let first = context.session(FakeDriver::new(FakeSite::new()));
        let second = context.session(FakeDriver::new(FakeSite::new()));
        assert!(std::ptr::eq(first.registry(), second.registry()));
        assert_eq!(first.actions().timeouts(), Settings::default().timeouts());
    }

    #[test]
    fn test_artifact_paths_follow_settings() {
        let context = SuiteContext::from_settings(Settings::default().with_output_dir("/tmp/x")).unwrap();
        let session = context.session(FakeDriver::new(FakeSite::new()));
        assert_eq!(session.credentials().path(), PathBuf::from("/tmp/x/last_registered_user.json"));
        assert_eq!(session.bug_log().path(), PathBuf::from("/tmp/x/bugs_detected.md"));
    }
}
