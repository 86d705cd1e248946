use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{BoundComponent, Component, ComponentContext};
use crate::error::{CoreError, CoreResult};
use crate::position::Position;
use crate::tile::TileRef;

/// Unique identifier of an entity within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// A game object: a class name plus the components that give it behavior.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    class: String,
    components: Vec<BoundComponent>,
    tile: Option<TileRef>,
    position: Option<Position>,
}

impl Entity {
    /// Create an entity with no components.
    pub fn new(id: EntityId, class: impl Into<String>) -> Self {
        Self {
            id,
            class: class.into(),
            components: Vec::new(),
            tile: None,
            position: None,
        }
    }

    /// This entity's identifier.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The blueprint class this entity was built from.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The tile the entity stands on, if placed.
    pub fn tile(&self) -> Option<TileRef> {
        self.tile
    }

    /// Level coordinates, if placed.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub(crate) fn set_location(&mut self, tile: Option<TileRef>, position: Option<Position>) {
        self.tile = tile;
        self.position = position;
    }

    /// What the entity's components see of it.
    pub fn context(&self) -> ComponentContext {
        ComponentContext {
            entity: self.id,
            tile: self.tile,
            position: self.position,
        }
    }

    /// All components in attachment order.
    pub fn components(&self) -> &[BoundComponent] {
        &self.components
    }

    /// The first component of concrete type `T`.
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(|c| c.get::<T>())
    }

    /// The first component of concrete type `T`, mutably.
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(|c| c.get_mut::<T>())
    }

    /// The component registered under `type_name`.
    pub fn component_named(&self, type_name: &str) -> Option<&BoundComponent> {
        self.components.iter().find(|c| c.type_name() == type_name)
    }

    pub(crate) fn component_named_mut(&mut self, type_name: &str) -> Option<&mut BoundComponent> {
        self.components.iter_mut().find(|c| c.type_name() == type_name)
    }

    /// Returns true if a component is registered under `type_name`.
    pub fn has_component(&self, type_name: &str) -> bool {
        self.component_named(type_name).is_some()
    }

    /// Attach a component created for this entity.
    ///
    /// Does not run hooks; call [`Entity::update_components`] once the set of
    /// components is final.
    pub fn attach(&mut self, component: BoundComponent) -> CoreResult<()> {
        if component.entity() != self.id {
            return Err(CoreError::ForeignComponent {
                component: component.type_name().to_string(),
                owner: component.entity(),
                entity: self.id,
            });
        }
        self.components.push(component);
        Ok(())
    }

    /// Detach the component registered under `type_name`, running its
    /// `on_remove` hook first and `on_update_components` on the rest after.
    pub fn detach(&mut self, type_name: &str) -> Option<BoundComponent> {
        let index = self.components.iter().position(|c| c.type_name() == type_name)?;
        let ctx = self.context();
        self.components[index].component_mut().on_remove(&ctx);
        let removed = self.components.remove(index);
        self.update_components();
        Some(removed)
    }

    /// Run every component's `on_initialize` hook.
    pub fn initialize(&mut self) {
        let ctx = self.context();
        for c in &mut self.components {
            c.component_mut().on_initialize(&ctx);
        }
    }

    /// Run every component's `on_update_components` hook.
    pub fn update_components(&mut self) {
        let ctx = self.context();
        for c in &mut self.components {
            c.component_mut().on_update_components(&ctx);
        }
    }

    /// Run every component's `on_think` hook.
    pub fn think(&mut self, tick: u64) {
        let ctx = self.context();
        for c in &mut self.components {
            c.component_mut().on_think(&ctx, tick);
        }
    }

    /// Run every component's `on_remove` hook.
    pub fn remove(&mut self) {
        let ctx = self.context();
        for c in &mut self.components {
            c.component_mut().on_remove(&ctx);
        }
    }
}
