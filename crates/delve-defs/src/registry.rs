use std::collections::HashMap;
use std::fmt;

use log::{debug, trace, warn};

use crate::element::Element;
use crate::error::{DefError, DefResult};
use crate::namespace::DefinitionsNamespace;

/// A definition handler. Receives the caller's context, one top-level
/// element whose local name matches the handler's type name, and a queue
/// through which it may register further handlers.
pub type Handler<C> = Box<dyn FnMut(&mut C, &Element, &mut Registrations<C>) -> DefResult<()>>;

/// Handlers queued by a running handler.
///
/// The registry installs them as soon as the handler returns, in queue
/// order, replaying anything buffered for each new name before routing
/// continues.
pub struct Registrations<C> {
    queued: Vec<(String, Handler<C>)>,
}

impl<C> Registrations<C> {
    fn new() -> Self {
        Self { queued: Vec::new() }
    }

    /// Queue `handler` for `type_name`.
    pub fn register<F>(&mut self, type_name: impl Into<String>, mut handler: F)
    where
        F: FnMut(&mut C, &Element) -> DefResult<()> + 'static,
    {
        self.register_with(type_name, move |ctx: &mut C, elem: &Element, _: &mut Registrations<C>| {
            handler(ctx, elem)
        });
    }

    /// Queue a handler that can itself register handlers.
    pub fn register_with<F>(&mut self, type_name: impl Into<String>, handler: F)
    where
        F: FnMut(&mut C, &Element, &mut Registrations<C>) -> DefResult<()> + 'static,
    {
        self.queued.push((type_name.into(), Box::new(handler)));
    }
}

impl<C> fmt::Debug for Registrations<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.queued.iter().map(|(name, _)| name)).finish()
    }
}

/// Type-name dispatch table for top-level definition elements.
///
/// Elements whose type name has no handler yet are buffered in arrival order
/// and replayed, exactly once, when a handler for that name is registered.
/// Names that never get a handler keep their elements for the registry's
/// lifetime.
///
/// `C` is the context handlers operate on, typically the object the
/// definitions populate. It is passed explicitly to every call that may
/// run handlers.
pub struct Definitions<C> {
    handlers: HashMap<String, Handler<C>>,
    pending: HashMap<String, Vec<Element>>,
}

impl<C> Default for Definitions<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Definitions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().collect();
        handlers.sort();
        let mut pending: Vec<_> = self
            .pending
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        pending.sort();
        f.debug_struct("Definitions")
            .field("handlers", &handlers)
            .field("pending", &pending)
            .finish()
    }
}

impl<C> Definitions<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Install `handler` for `type_name`, then replay everything buffered
    /// under that name through it in arrival order.
    ///
    /// Returns the number of replayed elements. Fails with
    /// [`DefError::DuplicateRegistration`] if the name already has a handler,
    /// in which case nothing changes. If the handler rejects a replayed
    /// element, the remaining elements are still replayed and the first
    /// error is returned.
    pub fn register<F>(&mut self, ctx: &mut C, type_name: impl Into<String>, mut handler: F) -> DefResult<usize>
    where
        F: FnMut(&mut C, &Element) -> DefResult<()> + 'static,
    {
        self.register_with(ctx, type_name, move |ctx: &mut C, elem: &Element, _: &mut Registrations<C>| {
            handler(ctx, elem)
        })
    }

    /// Like [`Definitions::register`], for a handler that registers further
    /// handlers through the [`Registrations`] it is given. Those take effect
    /// after each element the handler processes, so elements they replay are
    /// handled before the next one of this handler's elements.
    pub fn register_with<F>(&mut self, ctx: &mut C, type_name: impl Into<String>, handler: F) -> DefResult<usize>
    where
        F: FnMut(&mut C, &Element, &mut Registrations<C>) -> DefResult<()> + 'static,
    {
        self.install(ctx, type_name.into(), Box::new(handler))
    }

    fn install(&mut self, ctx: &mut C, name: String, handler: Handler<C>) -> DefResult<usize> {
        if self.handlers.contains_key(&name) {
            return Err(DefError::DuplicateRegistration(name));
        }

        let buffered = self.pending.remove(&name).unwrap_or_default();
        self.handlers.insert(name.clone(), handler);

        if !buffered.is_empty() {
            debug!("replaying {} buffered \"{name}\" definition(s)", buffered.len());
        }

        let mut first_error = None;
        for elem in &buffered {
            if let Err(e) = self.dispatch(ctx, &name, elem) {
                warn!("replayed \"{name}\" definition rejected: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(buffered.len()),
        }
    }

    /// Run the `name` handler on `elem`, then install whatever it queued.
    fn dispatch(&mut self, ctx: &mut C, name: &str, elem: &Element) -> DefResult<()> {
        let mut queued = Registrations::new();
        let result = match self.handlers.get_mut(name) {
            Some(handler) => handler(ctx, elem, &mut queued),
            None => Ok(()),
        };

        let mut first_error = result.err();
        for (type_name, handler) in queued.queued {
            trace!("<{name}> handler registered \"{type_name}\"");
            if let Err(e) = self.install(ctx, type_name, handler) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns true if `type_name` has a handler.
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.handlers.contains_key(type_name)
    }

    /// Number of elements waiting for a `type_name` handler.
    pub fn pending_count(&self, type_name: &str) -> usize {
        self.pending.get(type_name).map_or(0, Vec::len)
    }

    /// Type names that currently have buffered elements, sorted.
    pub fn pending_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .pending
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Filter `root` by namespace and route each of its top-level children.
    ///
    /// Children whose type name has a handler are handled immediately, the
    /// rest are buffered. Every child is routed even if a handler fails; the
    /// first failure is returned.
    pub fn load_document(&mut self, ctx: &mut C, mut root: Element, filter: DefinitionsNamespace) -> DefResult<()> {
        let purged = filter.purge(&mut root);
        if purged > 0 {
            debug!("{filter:?} filter removed {purged} node(s) from <{}>", root.local_name());
        }

        let mut first_error = None;
        for elem in root.children {
            if let Err(e) = self.route(ctx, elem) {
                warn!("{e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn route(&mut self, ctx: &mut C, elem: Element) -> DefResult<()> {
        let name = elem.local_name().to_string();
        if self.handlers.contains_key(&name) {
            trace!("dispatching <{name}>");
            self.dispatch(ctx, &name, &elem)
        } else {
            trace!("buffering <{name}> until a handler is registered");
            self.pending.entry(name).or_default().push(elem);
            Ok(())
        }
    }
}
