//! Synchronous publish/subscribe bus
//!
//! Messages published while another message is being handled are queued and
//! flushed afterwards, so the broadcast tree is walked level by level:
//!
//! ```text
//! A              queue after A: B, E
//! ├─B            queue after B: E, C, D
//! │ ├─C          queue after E: C, D, F
//! │ └─D          ...
//! └─E            dispatch order: A, B, E, C, D, F
//!   └─F
//! ```
//!
//! Listeners may also register deferred handlers that run once every listener
//! has seen the current message, which lets one listener mutate shared state
//! without changing what the remaining listeners observe.
//!
//! There is no cycle detection: a listener that republishes unconditionally
//! grows the queue forever.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Messages expose a name for filtered subscriptions
pub trait Named {
    fn name(&self) -> &'static str;
}

/// A context that owns a broadcaster and is handed to every listener
pub trait Bus: Sized + 'static {
    type Message: Named + Clone + 'static;

    fn broadcaster(&mut self) -> &mut Broadcaster<Self, Self::Message>;
}

type Listener<C, M> = Rc<RefCell<dyn FnMut(&mut C, &M, &mut Deferred<C, M>)>>;
type DeferredHandler<C, M> = Box<dyn FnOnce(&mut C, &M)>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Handlers to run after all listeners handled the current message
pub struct Deferred<C, M> {
    handlers: Vec<DeferredHandler<C, M>>,
}

impl<C, M> Deferred<C, M> {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Run `handler` once every listener has seen the current message
    pub fn defer(&mut self, handler: impl FnOnce(&mut C, &M) + 'static) {
        self.handlers.push(Box::new(handler));
    }
}

/// Listener registry plus the pending message queue
pub struct Broadcaster<C, M> {
    listeners: Vec<(ListenerId, Listener<C, M>)>,
    queue: VecDeque<M>,
    publishing: bool,
    next_id: u64,
}

impl<C, M> Default for Broadcaster<C, M> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            queue: VecDeque::new(),
            publishing: false,
            next_id: 1,
        }
    }
}

impl<C, M> std::fmt::Debug for Broadcaster<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("listeners", &self.listeners.len())
            .field("queued", &self.queue.len())
            .field("publishing", &self.publishing)
            .finish()
    }
}

impl<C: 'static, M: Named + 'static> Broadcaster<C, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get notified of every message
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&mut C, &M, &mut Deferred<C, M>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::new(RefCell::new(listener))));
        id
    }

    /// Get notified of messages with the given name only
    pub fn subscribe_on_message(
        &mut self,
        name: &'static str,
        mut listener: impl FnMut(&mut C, &M, &mut Deferred<C, M>) + 'static,
    ) -> ListenerId {
        self.subscribe(move |ctx, message, deferred| {
            if message.name() == name {
                listener(ctx, message, deferred);
            }
        })
    }

    /// Remove a listener. Returns false if it was already gone.
    ///
    /// A listener removed during a dispatch still receives the message being
    /// dispatched, since iteration runs over a snapshot.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(l, _)| *l == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_publishing(&self) -> bool {
        self.publishing
    }

    /// Messages waiting for the current dispatch to finish
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn snapshot(&self) -> Vec<Listener<C, M>> {
        self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
    }
}

/// Publish `message` to every listener of `ctx`'s broadcaster
///
/// Called from inside a listener (or deferred handler) the message is only
/// queued; the outermost call drains the queue before returning.
pub fn publish<C: Bus>(ctx: &mut C, message: C::Message) -> C::Message {
    let bus = ctx.broadcaster();
    if bus.publishing {
        bus.queue.push_back(message.clone());
        return message;
    }

    dispatch(ctx, &message);
    while let Some(next) = ctx.broadcaster().queue.pop_front() {
        dispatch(ctx, &next);
    }
    message
}

fn dispatch<C: Bus>(ctx: &mut C, message: &C::Message) {
    let bus = ctx.broadcaster();
    bus.publishing = true;
    let listeners = bus.snapshot();

    let mut deferred = Deferred::new();
    for listener in listeners {
        let mut listener = listener.borrow_mut();
        (&mut *listener)(ctx, message, &mut deferred);
    }
    for handler in deferred.handlers {
        handler(ctx, message);
    }

    ctx.broadcaster().publishing = false;
}

/// Listeners registered together by a system's `start`
#[derive(Debug, Default)]
#[must_use = "dropping a Subscription leaves its listeners registered"]
pub struct Subscription {
    ids: Vec<ListenerId>,
}

impl Subscription {
    pub fn new(ids: Vec<ListenerId>) -> Self {
        Self { ids }
    }

    pub fn single(id: ListenerId) -> Self {
        Self { ids: vec![id] }
    }

    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    /// Unsubscribe every listener of this subscription
    pub fn cancel<C: Bus>(self, ctx: &mut C) {
        let bus = ctx.broadcaster();
        for id in self.ids {
            bus.unsubscribe(id);
        }
    }
}
