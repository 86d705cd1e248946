use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use delve_defs::{BindMode, BindReport, Definable, Element, bind_properties};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};
use crate::position::Position;
use crate::tile::{RoomId, TileRef};

/// Read-only view of a component's owner, handed to every lifecycle hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentContext {
    /// The owning entity.
    pub entity: EntityId,
    /// The tile the owner stands on, if placed.
    pub tile: Option<TileRef>,
    /// The owner's position in level coordinates, if placed.
    pub position: Option<Position>,
}

impl ComponentContext {
    /// The room the owner is in, if placed.
    pub fn room(&self) -> Option<RoomId> {
        self.tile.map(|t| t.room)
    }

    /// The owner's position within its room, if placed.
    pub fn relative_position(&self) -> Option<Position> {
        self.tile.map(|t| t.local)
    }
}

/// A capability attached to an entity.
///
/// Every hook is a no-op by default. Hooks of sibling components run in the
/// same phase but in no particular order relative to each other.
pub trait Component: Any + fmt::Debug {
    /// Called once, after all of the entity's components exist.
    fn on_initialize(&mut self, _ctx: &ComponentContext) {}

    /// Called after the entity's set of components changes.
    fn on_update_components(&mut self, _ctx: &ComponentContext) {}

    /// Called once per simulation tick.
    fn on_think(&mut self, _ctx: &ComponentContext, _tick: u64) {}

    /// Called once, just before the component is detached.
    fn on_remove(&mut self, _ctx: &ComponentContext) {}

    /// Support downcasting to the concrete component type.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to the concrete component type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

type Constructor = fn() -> Box<dyn Component>;
type Binder = fn(&mut dyn Component, &Element, BindMode) -> BindReport;

fn construct<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

fn bind_erased<T: Component + Definable>(component: &mut dyn Component, element: &Element, mode: BindMode) -> BindReport {
    match component.as_any_mut().downcast_mut::<T>() {
        Some(target) => bind_properties(target, element, mode),
        None => BindReport::default(),
    }
}

/// Runtime descriptor of a component type, looked up by name.
#[derive(Clone)]
pub struct ComponentType {
    name: String,
    construct: Option<Constructor>,
    bind: Option<Binder>,
}

impl ComponentType {
    /// Descriptor for a concrete, default-constructible component.
    pub fn of<T: Component + Definable + Default>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            construct: Some(construct::<T>),
            bind: Some(bind_erased::<T>),
        }
    }

    /// Descriptor for a type that is known by name but cannot be
    /// instantiated on its own.
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            construct: None,
            bind: None,
        }
    }

    /// The name definitions use for this type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if [`create_component`] can build this type.
    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

/// A component instance together with the entity it belongs to.
#[derive(Debug)]
pub struct BoundComponent {
    entity: EntityId,
    type_name: String,
    bind: Option<Binder>,
    inner: Box<dyn Component>,
}

impl BoundComponent {
    /// The owning entity. Fixed for the component's lifetime.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The registered name of the component's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Downcast to the concrete component.
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Downcast to the concrete component, mutably.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.inner.as_any_mut().downcast_mut::<T>()
    }

    /// Bind properties from a definition element onto the component.
    pub fn bind(&mut self, element: &Element, mode: BindMode) -> BindReport {
        match self.bind {
            Some(bind) => bind(self.inner.as_mut(), element, mode),
            None => BindReport::default(),
        }
    }

    /// The component itself.
    pub fn component(&self) -> &dyn Component {
        self.inner.as_ref()
    }

    /// The component itself, mutably.
    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.inner.as_mut()
    }
}

/// Construct a component of type `ty` owned by `owner`.
///
/// The new component is in its default state; nothing is bound yet.
pub fn create_component(ty: &ComponentType, owner: EntityId) -> CoreResult<BoundComponent> {
    let construct = ty
        .construct
        .ok_or_else(|| CoreError::NotConstructible(ty.name.clone()))?;
    Ok(BoundComponent {
        entity: owner,
        type_name: ty.name.clone(),
        bind: ty.bind,
        inner: construct(),
    })
}

/// Component types known to the game, by name.
#[derive(Debug, Clone, Default)]
pub struct ComponentLibrary {
    types: HashMap<String, ComponentType>,
}

impl ComponentLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component type. Each name may be registered once.
    pub fn register(&mut self, ty: ComponentType) -> CoreResult<()> {
        if self.types.contains_key(ty.name()) {
            return Err(CoreError::DuplicateComponentType(ty.name));
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Shorthand for registering [`ComponentType::of`].
    pub fn register_type<T: Component + Definable + Default>(&mut self, name: impl Into<String>) -> CoreResult<()> {
        self.register(ComponentType::of::<T>(name))
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<&ComponentType> {
        self.types.get(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
