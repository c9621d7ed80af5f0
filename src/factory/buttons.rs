use indexmap::IndexMap;
use serde_json::Value;

use crate::button::ButtonDriver;
use crate::error::Result;
use crate::factory::addons::declared;
use crate::form::FormContext;
use crate::group::position_or_next;
use crate::manager::DriverRegistry;

/// Buttons of a form, sorted by position.
#[derive(Debug, Clone, Default)]
pub struct ButtonsFactory {
    drivers: IndexMap<String, ButtonDriver>,
    booted: bool,
}

impl ButtonsFactory {
    /// Resolves the buttons declared in the form `buttons` parameter.
    ///
    /// A `submit` button is added unless declared; `false` skips a button.
    pub fn boot(&mut self, ctx: &FormContext, registry: &DriverRegistry) -> Result<()> {
        if self.booted {
            return Ok(());
        }
        ctx.events().trigger("buttons.booting");

        let mut buttons = declared(ctx.params().get("buttons"));
        if !buttons.iter().any(|(alias, _)| alias == "submit") {
            buttons.push(("submit".to_string(), Value::Bool(true)));
        }

        for (alias, params) in buttons {
            if params == Value::Bool(false) {
                continue;
            }
            let mut driver = registry.button_driver(&alias)?;
            driver.boot(params);
            self.drivers.insert(alias, driver);
        }

        let max = self.drivers.values().map(ButtonDriver::position).max().unwrap_or(0);
        if max != 0 {
            let mut pad = 0;
            for driver in self.drivers.values_mut() {
                let position = position_or_next(driver.position(), &mut pad, max);
                driver.set_position(position.saturating_abs());
            }
        }
        self.drivers.sort_by(|_, a, _, b| a.position().cmp(&b.position()));

        self.booted = true;
        ctx.events().trigger("buttons.booted");
        Ok(())
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Button registered under `alias`.
    pub fn get(&self, alias: &str) -> Option<&ButtonDriver> {
        self.drivers.get(alias)
    }

    /// Every button, keyed by alias.
    pub fn all(&self) -> &IndexMap<String, ButtonDriver> {
        &self.drivers
    }

    /// Iterates over the buttons by position.
    pub fn iter(&self) -> impl Iterator<Item = &ButtonDriver> {
        self.drivers.values()
    }

    /// Number of buttons.
    pub fn count(&self) -> usize {
        self.drivers.len()
    }

    pub(crate) fn pre_render(&mut self, ctx: &FormContext) {
        for driver in self.drivers.values_mut() {
            driver.pre_render(ctx);
        }
    }
}
