//! Helpers shared by the capture pipeline and the app. The main pieces are the
//! channels for handing data between threads and the thread handle that joins
//! on drop, plus debug logging and stop-signal polling.

pub mod channels;
pub mod debug_log;
pub mod drop_join_thread;
pub mod stop_signals;
pub mod version;

mod eprint_and_exit;
