use tracing::{error, info};

use crate::{container::Container, errors::LoadErrorKind};

type RegistrationFn = Box<dyn Fn(&Container) -> anyhow::Result<()> + Send + Sync>;

struct RegistrationUnit {
    name: String,
    register: RegistrationFn,
}

/// Invokes named registration callbacks against a shared container.
///
/// Each unit is expected to call `Container::register` zero or more times;
/// how units are discovered is the caller's concern, the loader starts at
/// the named-callback boundary. Unit names can be filtered with
/// [`include_suffix`](Self::include_suffix) and
/// [`exclude_containing`](Self::exclude_containing); excludes win over
/// includes.
///
/// A failing unit aborts loading by default, since a silently skipped one
/// surfaces later as an unregistered-token error far from its cause.
/// [`skip_failed_units`](Self::skip_failed_units) switches to
/// log-and-continue, recording the failure in the [`LoadReport`].
#[derive(Default)]
pub struct Loader {
    units: Vec<RegistrationUnit>,
    include_suffixes: Vec<String>,
    exclude_fragments: Vec<String>,
    skip_failed: bool,
}

impl Loader {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unit<F>(mut self, name: impl Into<String>, register: F) -> Self
    where
        F: Fn(&Container) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.units.push(RegistrationUnit {
            name: name.into(),
            register: Box::new(register),
        });
        self
    }

    /// Restricts loading to unit names ending with the suffix. No registered
    /// suffix means every unit is eligible.
    #[must_use]
    pub fn include_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.include_suffixes.push(suffix.into());
        self
    }

    /// Skips unit names containing the fragment.
    #[must_use]
    pub fn exclude_containing(mut self, fragment: impl Into<String>) -> Self {
        self.exclude_fragments.push(fragment.into());
        self
    }

    /// Logs failing units and keeps loading instead of aborting.
    #[must_use]
    pub fn skip_failed_units(mut self) -> Self {
        self.skip_failed = true;
        self
    }

    fn selects(&self, name: &str) -> bool {
        let included = self.include_suffixes.is_empty() || self.include_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()));
        let excluded = self.exclude_fragments.iter().any(|fragment| name.contains(fragment.as_str()));
        included && !excluded
    }

    /// Runs every selected unit against the container.
    ///
    /// # Errors
    /// Returns [`LoadErrorKind::Unit`] for the first failing unit, unless
    /// [`skip_failed_units`](Self::skip_failed_units) was set.
    pub fn load(&self, container: &Container) -> Result<LoadReport, LoadErrorKind> {
        let mut report = LoadReport::default();

        for unit in &self.units {
            if !self.selects(&unit.name) {
                continue;
            }

            match (unit.register)(container) {
                Ok(()) => {
                    info!(unit = %unit.name, "Loaded registration unit");
                    report.loaded.push(unit.name.clone());
                }
                Err(source) if self.skip_failed => {
                    error!(unit = %unit.name, "Registration unit failed: {source}");
                    report.skipped.push(unit.name.clone());
                }
                Err(source) => {
                    return Err(LoadErrorKind::Unit {
                        name: unit.name.clone(),
                        source,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Names of the units a [`Loader::load`] call ran and, under the skip
/// policy, the ones that failed.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
}
