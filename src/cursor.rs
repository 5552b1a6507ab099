//! Streaming result cursor.
//!
//! The connection layer appends decoded rows (or raw chunks) as protocol
//! frames arrive; the application drains them at its own pace. Appending
//! and reading are decoupled: neither side ever blocks on the other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_queue::SegQueue;

use crate::error::{Error, Result};

type ReadableFn = Box<dyn FnMut() + Send>;
type EndFn = Box<dyn FnOnce() + Send>;

/// FIFO cursor over streamed result items.
///
/// Cloning yields another handle to the same cursor, the way channel
/// endpoints clone; producer and consumer sides typically hold one each.
/// The supported threading pattern is one producer appending while one
/// consumer reads. `append` never applies backpressure: items accumulate
/// without bound if the consumer stops reading, and a consumer that simply
/// abandons its handle leaves the producer appending into a buffer nobody
/// drains. Bounding memory is the caller's responsibility.
pub struct ResultCursor<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    buffer: SegQueue<T>,
    ended: AtomicBool,
    end_fired: AtomicBool,
    observers: Mutex<Observers>,
}

#[derive(Default)]
struct Observers {
    readable: Vec<ReadableFn>,
    end: Vec<EndFn>,
}

impl<T> ResultCursor<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                buffer: SegQueue::new(),
                ended: AtomicBool::new(false),
                end_fired: AtomicBool::new(false),
                observers: Mutex::new(Observers::default()),
            }),
        }
    }

    /// Append one item at the tail.
    ///
    /// Fails with [`Error::ClosedCursor`] once [`append_end`] has been
    /// called: appending past the end marker is a producer bug and is
    /// reported loudly rather than silently dropped.
    ///
    /// [`append_end`]: Self::append_end
    pub fn append(&self, item: T) -> Result<()> {
        if self.shared.ended.load(Ordering::Acquire) {
            return Err(Error::ClosedCursor);
        }
        self.shared.buffer.push(item);
        self.notify_readable();
        Ok(())
    }

    /// Mark that no further items will arrive. Callable exactly once;
    /// the end observers run after the buffered items are drained.
    pub fn append_end(&self) -> Result<()> {
        if self.shared.ended.swap(true, Ordering::AcqRel) {
            return Err(Error::ClosedCursor);
        }
        tracing::trace!(buffered = self.shared.buffer.len(), "result cursor ended");
        if self.shared.buffer.is_empty() {
            self.fire_end();
        }
        Ok(())
    }

    /// Take the head item, or `None` when nothing is buffered.
    ///
    /// `None` is not an error; on a cursor that has not ended it means
    /// "try again later". A `None` read on an ended cursor completes the
    /// drain and triggers the end observers.
    pub fn read(&self) -> Option<T> {
        // ended must be observed before the pop: every append happens
        // before the end marker, so ended-then-empty means fully drained.
        // The reverse order could fire end while a late append is still
        // becoming visible.
        let ended = self.shared.ended.load(Ordering::Acquire);
        match self.shared.buffer.pop() {
            Some(item) => Some(item),
            None => {
                if ended {
                    self.fire_end();
                }
                None
            }
        }
    }

    /// True once the end marker has been appended. Items may still be
    /// buffered for reading.
    pub fn is_ended(&self) -> bool {
        self.shared.ended.load(Ordering::Acquire)
    }

    /// Number of items currently buffered.
    pub fn buffered(&self) -> usize {
        self.shared.buffer.len()
    }

    /// Observe readability, level-triggered: the callback runs now if
    /// items are already buffered, and again on every later append.
    pub fn on_readable(&self, callback: impl FnMut() + Send + 'static) {
        let mut callback: ReadableFn = Box::new(callback);
        if !self.shared.buffer.is_empty() {
            callback();
        }
        self.observers().readable.push(callback);
    }

    /// Observe completion: runs exactly once, after the end marker has
    /// arrived and every buffered item has been drained via [`read`]. A
    /// callback registered after that point runs immediately.
    ///
    /// [`read`]: Self::read
    pub fn on_end(&self, callback: impl FnOnce() + Send + 'static) {
        if self.shared.end_fired.load(Ordering::Acquire) {
            callback();
            return;
        }
        self.observers().end.push(Box::new(callback));
    }

    fn observers(&self) -> MutexGuard<'_, Observers> {
        self.shared
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the readable observers outside the lock so they can re-enter
    /// the cursor (the usual pattern is a drain loop calling `read`).
    fn notify_readable(&self) {
        let mut callbacks = std::mem::take(&mut self.observers().readable);
        if callbacks.is_empty() {
            return;
        }
        for callback in callbacks.iter_mut() {
            callback();
        }
        let mut observers = self.observers();
        callbacks.append(&mut observers.readable);
        observers.readable = callbacks;
    }

    fn fire_end(&self) {
        if self.shared.end_fired.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::trace!("result cursor drained");
        let callbacks = std::mem::take(&mut self.observers().end);
        for callback in callbacks {
            callback();
        }
    }
}

impl<T> Clone for ResultCursor<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T> Default for ResultCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ResultCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("buffered", &self.buffered())
            .field("ended", &self.is_ended())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    /// Readable observer that drains into a shared vec.
    fn drain_into(cursor: &ResultCursor<&'static str>, sink: &Arc<Mutex<Vec<&'static str>>>) {
        let reader = cursor.clone();
        let sink = Arc::clone(sink);
        cursor.on_readable(move || {
            while let Some(item) = reader.read() {
                sink.lock().unwrap().push(item);
            }
        });
    }

    #[test]
    fn readable_as_soon_as_data_arrives() {
        let cursor = ResultCursor::new();
        let sink = Arc::new(Mutex::new(Vec::new()));
        let ended = Arc::new(AtomicBool::new(false));

        drain_into(&cursor, &sink);
        let flag = Arc::clone(&ended);
        cursor.on_end(move || flag.store(true, Ordering::SeqCst));

        cursor.append("per").unwrap();
        cursor.append("aspera").unwrap();
        assert!(!ended.load(Ordering::SeqCst));
        cursor.append_end().unwrap();

        assert_eq!(*sink.lock().unwrap(), ["per", "aspera"]);
        assert!(ended.load(Ordering::SeqCst));
    }

    #[test]
    fn buffers_until_a_consumer_attaches() {
        let cursor = ResultCursor::new();
        cursor.append("first").unwrap();
        cursor.append("second").unwrap();
        cursor.append_end().unwrap();

        let sink = Arc::new(Mutex::new(Vec::new()));
        let ended = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ended);
        cursor.on_end(move || flag.store(true, Ordering::SeqCst));
        drain_into(&cursor, &sink);

        assert_eq!(*sink.lock().unwrap(), ["first", "second"]);
        assert!(ended.load(Ordering::SeqCst));
    }

    #[test]
    fn stays_readable_across_interleaved_appends() {
        let cursor = ResultCursor::new();
        cursor.append("one").unwrap();

        let sink = Arc::new(Mutex::new(Vec::new()));
        drain_into(&cursor, &sink);

        cursor.append("two").unwrap();
        cursor.append("three").unwrap();
        cursor.append_end().unwrap();

        assert_eq!(*sink.lock().unwrap(), ["one", "two", "three"]);
    }

    #[test]
    fn read_on_an_open_empty_cursor_is_not_an_error() {
        let cursor: ResultCursor<u8> = ResultCursor::new();
        assert_eq!(cursor.read(), None);
        assert!(!cursor.is_ended());
        cursor.append(1).unwrap();
        assert_eq!(cursor.read(), Some(1));
    }

    #[test]
    fn append_after_end_fails_fast() {
        let cursor = ResultCursor::new();
        cursor.append(1).unwrap();
        cursor.append_end().unwrap();

        assert!(matches!(cursor.append(2), Err(Error::ClosedCursor)));
        assert!(matches!(cursor.append_end(), Err(Error::ClosedCursor)));
        // the buffered item is still delivered
        assert_eq!(cursor.buffered(), 1);
        assert_eq!(cursor.read(), Some(1));
    }

    #[test]
    fn end_fires_once_and_only_after_drain() {
        let cursor = ResultCursor::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        cursor.on_end(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cursor.append(10).unwrap();
        cursor.append_end().unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0, "item still buffered");

        assert_eq!(cursor.read(), Some(10));
        assert_eq!(fired.load(Ordering::SeqCst), 0, "drain not yet observed");

        assert_eq!(cursor.read(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        assert_eq!(cursor.read(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1, "end is one-shot");
    }

    #[test]
    fn end_observer_registered_late_still_runs() {
        let cursor: ResultCursor<u8> = ResultCursor::new();
        cursor.append_end().unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        cursor.on_end(move || flag.store(true, Ordering::SeqCst));
        assert!(fired.load(Ordering::SeqCst));
    }
}
