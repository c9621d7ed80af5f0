use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::factory::{AddonsFactory, FieldGroupsFactory};
use crate::field::FormFieldDriver;
use crate::form::FormContext;
use crate::manager::DriverRegistry;

/// Fields of a form, keyed by slug in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FormFieldsFactory {
    drivers: IndexMap<String, FormFieldDriver>,
    booted: bool,
}

impl FormFieldsFactory {
    /// Resolves and boots every field declared in the form `fields`
    /// parameter.
    ///
    /// When any field declares a group, every group a field refers to is
    /// registered; ungrouped fields join the `""` group.
    pub fn boot(
        &mut self,
        ctx: &FormContext,
        registry: &DriverRegistry,
        addons: &AddonsFactory,
        groups: &mut FieldGroupsFactory,
    ) -> Result<()> {
        if self.booted {
            return Ok(());
        }
        ctx.events().trigger("fields.booting");

        let declared: Vec<(String, Value)> = match ctx.params().get("fields") {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            _ => Vec::new(),
        };
        let with_group = declared
            .iter()
            .any(|(_, params)| params.get("group").is_some_and(|g| !g.is_null()));

        for (slug, params) in declared {
            let field_type = params
                .get("type")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| Error::MissingFieldType { slug: slug.clone() })?
                .to_string();

            let mut driver = registry.form_field_driver(&field_type)?;
            driver.prepare(&slug, params);
            driver.boot(ctx, addons);

            if with_group && groups.get(&driver.group_alias()).is_none() {
                groups.set_driver(&driver.group_alias());
            }
            self.drivers.insert(slug, driver);
        }

        self.booted = true;
        ctx.events().trigger("fields.booted");
        ctx.log()
            .debug(format_args!("{} fields booted", self.drivers.len()));
        Ok(())
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Field declared under `slug`.
    pub fn get(&self, slug: &str) -> Option<&FormFieldDriver> {
        self.drivers.get(slug)
    }

    /// Mutable field declared under `slug`.
    pub fn get_mut(&mut self, slug: &str) -> Option<&mut FormFieldDriver> {
        self.drivers.get_mut(slug)
    }

    /// Every field, keyed by slug.
    pub fn all(&self) -> &IndexMap<String, FormFieldDriver> {
        &self.drivers
    }

    /// Iterates over the fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FormFieldDriver> {
        self.drivers.values()
    }

    /// Iterates mutably over the fields in declaration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FormFieldDriver> {
        self.drivers.values_mut()
    }

    /// Number of fields.
    pub fn count(&self) -> usize {
        self.drivers.len()
    }

    /// Returns true if a field accepts uploads.
    pub fn has_upload_field(&self) -> bool {
        self.drivers.values().any(|field| field.supports("upload"))
    }

    /// Fields of the group `alias`, in declaration order.
    pub fn for_group<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a FormFieldDriver> + 'a {
        self.drivers
            .values()
            .filter(move |field| field.group_alias() == alias)
    }

    /// Prepares every field for rendering.
    pub fn pre_render(&mut self, ctx: &FormContext) {
        for field in self.drivers.values_mut() {
            field.pre_render(ctx);
        }
    }
}
