//! Scoped symbol table.
//!
//! Frames live in an arena and refer to their lexical parent by
//! [`ScopeId`]. The global frame is id 0 and exists for the life of the
//! session. A procedure call pushes one frame whose parent is the
//! procedure's closure; lookups walk the parent chain, assignments write to
//! the innermost frame unless the name was declared `global` there.
//!
//! Every other frame counts its holds: one while it is active, one per
//! frame whose parent it is, and one per live [`Closure`]. A frame whose
//! holds reach zero is recycled and releases its parent in turn. A closure
//! stored in the frame it captures keeps that frame held forever, so such
//! frames are found by [`sweep`] once enough detached frames pile up.

mod sweep;

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use slate_ir::Name;
use tracing::debug;

use crate::value::Value;

/// Handle of a frame in the [`Environment`] arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global frame.
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// Frames whose closures were dropped, waiting to be released by the
/// environment that owns them.
type ReleaseQueue = Rc<RefCell<Vec<ScopeId>>>;

/// A procedure's hold on the frame it was defined in.
///
/// Dropping the handle queues the release; the owning [`Environment`]
/// applies it the next time it pushes, pops or binds.
pub struct Closure {
    id: ScopeId,
    released: ReleaseQueue,
}

impl Closure {
    /// A closure over the global frame of no session in particular.
    pub fn global() -> Self {
        Closure {
            id: ScopeId::GLOBAL,
            released: ReleaseQueue::default(),
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.id
    }
}

impl Drop for Closure {
    fn drop(&mut self) {
        if self.id != ScopeId::GLOBAL {
            if let Ok(mut queue) = self.released.try_borrow_mut() {
                queue.push(self.id);
            }
        }
    }
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Closure").field(&self.id).finish()
    }
}

/// A single frame of bindings.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    /// Names declared `global` while this frame was active.
    globals: FxHashSet<Name>,
    /// Lexical parent; `None` only for the global frame.
    parent: Option<ScopeId>,
    holds: usize,
}

impl Scope {
    fn with_parent(parent: ScopeId) -> Self {
        Scope {
            parent: Some(parent),
            holds: 1,
            ..Scope::default()
        }
    }

    pub fn get(&self, name: Name) -> Option<&Value> {
        self.bindings.get(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &Value)> {
        self.bindings.iter().map(|(&name, value)| (name, value))
    }
}

/// Detached frames tolerated before the first sweep.
const MIN_SWEEP_THRESHOLD: usize = 256;

/// Symbol table: the frame arena plus the stack of active frames.
pub struct Environment {
    global: Scope,
    /// Frame `ScopeId(n)` is `frames[n - 1]`.
    frames: Vec<Scope>,
    /// Recyclable slots in `frames`.
    free: Vec<ScopeId>,
    /// Active frames, innermost last. Empty while only the global frame
    /// is active.
    active: Vec<ScopeId>,
    released: ReleaseQueue,
    /// Detached frame count that triggers the next sweep.
    sweep_threshold: usize,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            global: Scope::default(),
            frames: Vec::new(),
            free: Vec::new(),
            active: Vec::new(),
            released: ReleaseQueue::default(),
            sweep_threshold: MIN_SWEEP_THRESHOLD,
        }
    }

    /// The innermost active frame.
    #[inline]
    pub fn current(&self) -> ScopeId {
        self.active.last().copied().unwrap_or(ScopeId::GLOBAL)
    }

    /// Number of frames above the global one.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Frames held by the arena, global included.
    pub fn live_frames(&self) -> usize {
        1 + self.frames.len() - self.free.len()
    }

    /// Live frames that are neither global nor active.
    fn detached_frames(&self) -> usize {
        self.live_frames() - 1 - self.active.len()
    }

    pub fn global_scope(&self) -> &Scope {
        &self.global
    }

    fn scope(&self, id: ScopeId) -> &Scope {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|slot| self.frames.get(slot))
            .unwrap_or(&self.global)
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        match (id.0 as usize)
            .checked_sub(1)
            .and_then(|slot| self.frames.get_mut(slot))
        {
            Some(scope) => scope,
            None => &mut self.global,
        }
    }

    /// Whether `closure` was captured from this environment's arena.
    pub fn owns(&self, closure: &Closure) -> bool {
        Rc::ptr_eq(&closure.released, &self.released)
    }

    /// Push a frame whose lexical parent is `parent`.
    pub fn push_frame(&mut self, parent: ScopeId) -> ScopeId {
        self.reclaim();
        if self.detached_frames() > self.sweep_threshold {
            self.sweep();
            self.sweep_threshold = (self.detached_frames() * 2).max(MIN_SWEEP_THRESHOLD);
        }
        self.retain(parent);
        let scope = Scope::with_parent(parent);
        let id = if let Some(id) = self.free.pop() {
            *self.scope_mut(id) = scope;
            id
        } else {
            self.frames.push(scope);
            ScopeId(u32::try_from(self.frames.len()).unwrap_or(u32::MAX))
        };
        self.active.push(id);
        id
    }

    /// Push a call frame under `closure`. A closure from another session's
    /// arena falls back to this session's global frame.
    pub fn push_call_frame(&mut self, closure: &Closure) -> ScopeId {
        let parent = if self.owns(closure) {
            closure.id
        } else {
            ScopeId::GLOBAL
        };
        self.push_frame(parent)
    }

    /// Pop the innermost frame, recycling it unless something still holds
    /// it.
    pub fn pop_frame(&mut self) {
        if let Some(id) = self.active.pop() {
            self.release(vec![id], &FxHashSet::default());
        }
    }

    /// Hold the current frame for a procedure being defined here.
    pub fn capture_current(&mut self) -> Closure {
        let id = self.current();
        self.retain(id);
        Closure {
            id,
            released: Rc::clone(&self.released),
        }
    }

    fn retain(&mut self, id: ScopeId) {
        if id != ScopeId::GLOBAL {
            self.scope_mut(id).holds += 1;
        }
    }

    /// Apply the releases of dropped closures.
    pub fn reclaim(&mut self) {
        let queued = mem::take(&mut *self.released.borrow_mut());
        if !queued.is_empty() {
            self.release(queued, &FxHashSet::default());
        }
    }

    /// Drop one hold on each of `pending`. Frames left unheld are
    /// recycled, which releases their parents and any closures bound in
    /// them. Frames in `dead` are being swept and are skipped.
    fn release(&mut self, mut pending: Vec<ScopeId>, dead: &FxHashSet<ScopeId>) {
        loop {
            while let Some(id) = pending.pop() {
                if id == ScopeId::GLOBAL || dead.contains(&id) {
                    continue;
                }
                let scope = self.scope_mut(id);
                scope.holds = scope.holds.saturating_sub(1);
                if scope.holds > 0 {
                    continue;
                }
                let scope = mem::take(scope);
                self.free.push(id);
                pending.extend(scope.parent);
                // Bindings drop here and may queue more releases.
                drop(scope);
            }
            pending = mem::take(&mut *self.released.borrow_mut());
            if pending.is_empty() {
                return;
            }
        }
    }

    /// Free the detached frames that are held only from inside other
    /// detached frames.
    fn sweep(&mut self) {
        let garbage = sweep::unreachable_frames(self);
        if garbage.is_empty() {
            return;
        }
        debug!(frames = garbage.len(), "sweeping unreachable frames");
        let dead: FxHashSet<ScopeId> = garbage.iter().copied().collect();
        let mut parents = Vec::new();
        let mut doomed = Vec::with_capacity(garbage.len());
        for &id in &garbage {
            let scope = mem::take(self.scope_mut(id));
            parents.extend(scope.parent.filter(|parent| !dead.contains(parent)));
            doomed.push(scope);
        }
        drop(doomed);
        parents.append(&mut self.released.borrow_mut());
        self.release(parents, &dead);
        self.free.extend(garbage);
    }

    /// Look up `name`, innermost frame first.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        let mut id = Some(self.current());
        while let Some(scope_id) = id {
            let scope = self.scope(scope_id);
            if let Some(value) = scope.bindings.get(&name) {
                return Some(value.clone());
            }
            id = scope.parent;
        }
        None
    }

    /// Frame an assignment to `name` writes to.
    fn target_of(&self, name: Name) -> ScopeId {
        let current = self.current();
        if self.scope(current).globals.contains(&name) {
            ScopeId::GLOBAL
        } else {
            current
        }
    }

    /// Whether an assignment to `name` lands in a procedure or
    /// comprehension frame rather than the global one.
    pub fn writes_locally(&self, name: Name) -> bool {
        self.target_of(name) != ScopeId::GLOBAL
    }

    /// `name` as bound in the innermost frame itself.
    pub fn local(&self, name: Name) -> Option<Value> {
        self.scope(self.current()).bindings.get(&name).cloned()
    }

    /// Bind `name` in the innermost frame, or the global frame if the name
    /// was declared `global` in the innermost frame.
    pub fn assign(&mut self, name: Name, value: Value) {
        let target = self.target_of(name);
        let old = self.scope_mut(target).bindings.insert(name, value);
        drop(old);
        self.reclaim();
    }

    /// Bind `name` directly in the innermost frame (parameters).
    pub fn define(&mut self, name: Name, value: Value) {
        let current = self.current();
        self.scope_mut(current).bindings.insert(name, value);
    }

    /// Remove `name` from the innermost frame that holds it. Returns the
    /// removed value, or `None` if no visible frame binds the name.
    pub fn delete(&mut self, name: Name) -> Option<Value> {
        let mut id = Some(self.target_of(name));
        while let Some(scope_id) = id {
            let scope = self.scope_mut(scope_id);
            if let Some(value) = scope.bindings.remove(&name) {
                return Some(value);
            }
            id = scope.parent;
        }
        None
    }

    /// Declare `name` global for the rest of the innermost frame's life.
    /// A no-op at top level.
    pub fn declare_global(&mut self, name: Name) {
        let current = self.current();
        if current != ScopeId::GLOBAL {
            self.scope_mut(current).globals.insert(name);
        }
    }

    /// Bind directly in the global frame (host writes).
    pub fn set_global(&mut self, name: Name, value: Value) {
        let old = self.global.bindings.insert(name, value);
        drop(old);
        self.reclaim();
    }

    /// Remove directly from the global frame (host writes).
    pub fn remove_global(&mut self, name: Name) -> Option<Value> {
        self.global.bindings.remove(&name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
