//! This module contains the [DropJoinHandle] type, a thin wrapper type around
//! [JoinHandle] that joins the thread when the handle is dropped (RAII style).

use std::io;
use std::thread::{self, JoinHandle};

/// A thin wrapper around [JoinHandle] that joins the thread when the handle is
/// dropped (RAII style).
///
/// Use [Self::join] to get at the thread's return value. Any error in joining
/// the thread on drop will be ignored.
#[derive(Debug)]
pub struct DropJoinHandle<T>(Option<JoinHandle<T>>);

impl<T> DropJoinHandle<T> {
    /// Create from an existing join handle.
    pub fn new(handle: JoinHandle<T>) -> Self {
        Self(Some(handle))
    }

    /// Waits for the thread to finish, returning its result. This is the same
    /// as [JoinHandle::join].
    pub fn join(mut self) -> thread::Result<T> {
        self.0.take().expect(EXPECT_MSG).join()
    }

    /// Whether the thread has finished running. This is the same as
    /// [JoinHandle::is_finished].
    pub fn is_finished(&self) -> bool {
        self.0.as_ref().expect(EXPECT_MSG).is_finished()
    }

    /// The name of the thread, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.0.as_ref().expect(EXPECT_MSG).thread().name()
    }
}

impl<T> From<JoinHandle<T>> for DropJoinHandle<T> {
    fn from(handle: JoinHandle<T>) -> Self {
        Self::new(handle)
    }
}

impl<T> Drop for DropJoinHandle<T> {
    fn drop(&mut self) {
        // The handle is only missing if `join` already consumed it.
        if let Some(handle) = self.0.take() {
            _ = handle.join();
        }
    }
}

/// The same as [thread::spawn], but the thread is given a `name` (which shows
/// up in panic messages and debuggers) and a [DropJoinHandle] is returned
/// instead. Fails if the OS can't create the thread.
pub fn spawn_named<F, T>(name: impl Into<String>, f: F) -> io::Result<DropJoinHandle<T>>
where
    F: FnOnce() -> T,
    F: Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .map(DropJoinHandle::from)
}

const EXPECT_MSG: &str = "The handle should be present.";
