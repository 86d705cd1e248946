use std::collections::HashMap;

use delve_defs::{BindMode, DefError, DefResult, Definitions, Element};
use log::{debug, trace};

use crate::component::{ComponentLibrary, create_component};
use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};

/// Type name of top-level entity definitions.
pub const ENTITY_DEFINITION: &str = "entity";

/// A named recipe for building entities.
///
/// Each child element names a component type and carries the property
/// values to bind onto it. A blueprint may inherit from a `base` class, whose
/// components are built and bound first.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBlueprint {
    /// Entity class name.
    pub name: String,
    /// Parent class, if any.
    pub base: Option<String>,
    /// Component elements in definition order.
    pub components: Vec<Element>,
}

impl EntityBlueprint {
    /// A blueprint with no base and no components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            components: Vec::new(),
        }
    }

    /// Set the parent class.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Append a component element.
    pub fn with_component(mut self, element: Element) -> Self {
        self.components.push(element);
        self
    }

    /// Read a blueprint from an `<entity name=".." base="..">` element.
    pub fn from_element(element: &Element) -> CoreResult<Self> {
        let name = element
            .attribute("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CoreError::InvalidBlueprint("missing \"name\" attribute".to_string()))?;
        Ok(Self {
            name: name.to_string(),
            base: element
                .attribute("base")
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from),
            components: element.children.clone(),
        })
    }
}

/// Builds entities from blueprints and registered component types.
#[derive(Debug, Default)]
pub struct EntityFactory {
    components: ComponentLibrary,
    blueprints: HashMap<String, EntityBlueprint>,
    bind_mode: BindMode,
}

impl EntityFactory {
    /// Create a factory over a set of component types.
    pub fn new(components: ComponentLibrary) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    /// Use `mode` when binding component properties.
    pub fn with_bind_mode(mut self, mode: BindMode) -> Self {
        self.bind_mode = mode;
        self
    }

    /// The bind mode in use.
    pub fn bind_mode(&self) -> BindMode {
        self.bind_mode
    }

    /// The component types this factory can build.
    pub fn components(&self) -> &ComponentLibrary {
        &self.components
    }

    /// Mutable access for registering more component types.
    pub fn components_mut(&mut self) -> &mut ComponentLibrary {
        &mut self.components
    }

    /// Register the `entity` definition handler on `defs`.
    ///
    /// Entity definitions loaded before this call are replayed into
    /// `factory` immediately. Returns the number replayed.
    pub fn install(defs: &mut Definitions<EntityFactory>, factory: &mut EntityFactory) -> DefResult<usize> {
        defs.register(factory, ENTITY_DEFINITION, |factory: &mut EntityFactory, element: &Element| {
            factory
                .define(element)
                .map_err(|e| DefError::handler(ENTITY_DEFINITION, e))
        })
    }

    /// Add a blueprint from an `entity` definition element.
    pub fn define(&mut self, element: &Element) -> CoreResult<()> {
        let blueprint = EntityBlueprint::from_element(element)?;
        self.add_blueprint(blueprint);
        Ok(())
    }

    /// Add a blueprint. A later blueprint with the same class name replaces
    /// the earlier one, which is returned.
    pub fn add_blueprint(&mut self, blueprint: EntityBlueprint) -> Option<EntityBlueprint> {
        trace!(
            "blueprint \"{}\" with {} component(s)",
            blueprint.name,
            blueprint.components.len()
        );
        let replaced = self.blueprints.insert(blueprint.name.clone(), blueprint);
        if let Some(old) = &replaced {
            debug!("blueprint \"{}\" redefined", old.name);
        }
        replaced
    }

    /// Look up a blueprint by class name.
    pub fn blueprint(&self, class: &str) -> Option<&EntityBlueprint> {
        self.blueprints.get(class)
    }

    /// Known entity classes, sorted.
    pub fn classes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blueprints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an entity of `class` with identifier `id`.
    ///
    /// Walks the class's base chain from the root down. Each component
    /// element creates its type on first sight and binds onto the existing
    /// instance after that, so derived classes override base values. The
    /// returned entity has not been initialized.
    pub fn create(&self, class: &str, id: EntityId) -> CoreResult<Entity> {
        let lineage = self.lineage(class)?;
        let mut entity = Entity::new(id, class);

        for blueprint in lineage.iter().rev() {
            for element in &blueprint.components {
                let type_name = element.local_name();
                if !entity.has_component(type_name) {
                    let ty = self
                        .components
                        .get(type_name)
                        .ok_or_else(|| CoreError::UnknownComponentType {
                            class: class.to_string(),
                            component: type_name.to_string(),
                        })?;
                    entity.attach(create_component(ty, id)?)?;
                }

                if let Some(component) = entity.component_named_mut(type_name) {
                    let report = component.bind(element, self.bind_mode);
                    if !report.skipped.is_empty() {
                        debug!("{class}/{type_name}: skipped {:?}", report.skipped);
                    }
                }
            }
        }

        Ok(entity)
    }

    /// Blueprints from `class` up to its root base.
    fn lineage(&self, class: &str) -> CoreResult<Vec<&EntityBlueprint>> {
        let mut chain: Vec<&EntityBlueprint> = Vec::new();
        let mut next = Some(class);
        while let Some(name) = next {
            if chain.iter().any(|b| b.name == name) {
                return Err(CoreError::BlueprintCycle(class.to_string()));
            }
            let blueprint = self
                .blueprints
                .get(name)
                .ok_or_else(|| CoreError::UnknownEntityClass(name.to_string()))?;
            chain.push(blueprint);
            next = blueprint.base.as_deref();
        }
        Ok(chain)
    }
}
