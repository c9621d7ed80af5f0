use crate::factory::FormFieldsFactory;
use crate::form::FormContext;
use crate::group::{position_or_next, FieldGroupDriver};

/// Field groups of a form, sorted by position once booted.
#[derive(Debug, Clone, Default)]
pub struct FieldGroupsFactory {
    drivers: Vec<FieldGroupDriver>,
    increment: usize,
    booted: bool,
}

impl FieldGroupsFactory {
    /// Boots every group, then positions groups and their fields.
    ///
    /// Field positions are made unique across the page from the form
    /// index, the group index, the group position and the field position.
    pub fn boot(&mut self, ctx: &FormContext, fields: &mut FormFieldsFactory) {
        if self.booted {
            return;
        }
        ctx.events().trigger("groups.booting");

        for driver in &mut self.drivers {
            driver.boot(ctx);
        }

        let max = self.drivers.iter().map(FieldGroupDriver::position).max().unwrap_or(0);
        let form_index = ctx.index() as i64;
        let mut pad = 0;
        for group in &mut self.drivers {
            let position = position_or_next(group.position(), &mut pad, max);
            group.set_position(position);

            let slugs = group.field_slugs(fields);
            let field_max = slugs
                .iter()
                .filter_map(|slug| fields.get(slug))
                .map(|field| field.position())
                .max()
                .unwrap_or(0);
            let base = form_index
                .saturating_add(1)
                .saturating_mul(10_000)
                .saturating_add((group.index() as i64).saturating_add(1).saturating_mul(1_000))
                .saturating_add(position.saturating_add(1).saturating_mul(100));
            let mut field_pad = 0;
            for slug in &slugs {
                if let Some(field) = fields.get_mut(slug) {
                    let offset = position_or_next(field.position(), &mut field_pad, field_max);
                    field.set_position(base.saturating_add(offset).saturating_abs());
                }
            }
        }

        self.drivers.sort_by_key(FieldGroupDriver::position);

        self.booted = true;
        ctx.events().trigger("groups.booted");
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Registers the group `alias`, indexed in registration order.
    pub fn set_driver(&mut self, alias: &str) -> &mut FieldGroupDriver {
        let mut driver = FieldGroupDriver::new(alias);
        driver.set_index(self.increment);
        self.increment += 1;
        self.drivers.push(driver);
        let last = self.drivers.len() - 1;
        &mut self.drivers[last]
    }

    /// Group registered under `alias`.
    pub fn get(&self, alias: &str) -> Option<&FieldGroupDriver> {
        self.drivers.iter().find(|group| group.alias() == alias)
    }

    /// Every group, by position once booted.
    pub fn all(&self) -> &[FieldGroupDriver] {
        &self.drivers
    }

    /// Iterates over the groups.
    pub fn iter(&self) -> impl Iterator<Item = &FieldGroupDriver> {
        self.drivers.iter()
    }

    /// Number of groups.
    pub fn count(&self) -> usize {
        self.drivers.len()
    }
}
