//! The per-thread `World`: the shared root §6 describes, owning the default interner, the
//! default logger, and the monotonic blank-node generator a `Reader` draws fresh labels from.
//!
//! A `World` is confined to one thread (§5's single-thread-per-world discipline): it is plain
//! `Rc`/`RefCell` state, not `Send`/`Sync`. A process that wants one `World` per worker thread
//! simply constructs one per thread; two `World`s never share state.

use std::cell::{Cell, RefCell};

use rdf_core::NodeSet;

/// Severity of a [`LogRecord`], mirroring the eight syslog levels §7 calls for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LogLevel {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    /// Maps onto the five-level `log` crate facade used by the default logger.
    fn as_log_level(self) -> log::Level {
        match self {
            Self::Emerg | Self::Alert | Self::Crit | Self::Err => log::Level::Error,
            Self::Warning | Self::Notice => log::Level::Warn,
            Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
        }
    }
}

/// One entry delivered to a [`World`]'s logger: every warning, even one recovered in lax mode.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// The component that raised it (`"reader"`, `"writer"`, `"canonicalizer"`, ...).
    pub domain: &'static str,
    pub level: LogLevel,
    pub message: String,
}

type Logger = dyn FnMut(&LogRecord);

/// Construction-time limits a `World` hands to every `Reader` it creates.
#[derive(Clone, Copy, Debug)]
pub struct WorldLimits {
    /// The default parser stack budget, in bytes (see [`rdf_turtle::GrammarOptions::max_stack_depth`]).
    pub stack_bytes: usize,
    /// The deepest nested anonymous/list context the writer or a pretty-printing reader permits.
    pub max_anon_depth: usize,
}

impl Default for WorldLimits {
    fn default() -> Self {
        Self {
            stack_bytes: 8192,
            max_anon_depth: 256,
        }
    }
}

/// The process-wide-per-thread root: the default interner, the default logger, a monotonic blank
/// node counter, and the parse limits new `Reader`s inherit unless overridden.
pub struct World {
    interner: RefCell<NodeSet>,
    logger: RefCell<Option<Box<Logger>>>,
    blank_counter: Cell<u64>,
    limits: WorldLimits,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_limits(WorldLimits::default())
    }

    pub fn with_limits(limits: WorldLimits) -> Self {
        Self {
            interner: RefCell::new(NodeSet::new()),
            logger: RefCell::new(None),
            blank_counter: Cell::new(0),
            limits,
        }
    }

    #[inline]
    pub fn limits(&self) -> WorldLimits {
        self.limits
    }

    /// The default, shared node interner for everything parsed or built through this `World`.
    pub fn interner(&self) -> &RefCell<NodeSet> {
        &self.interner
    }

    /// Installs a caller-supplied logger, replacing the default `log`-crate-backed one.
    pub fn set_logger(&self, logger: impl FnMut(&LogRecord) + 'static) {
        *self.logger.borrow_mut() = Some(Box::new(logger));
    }

    /// Removes any caller-installed logger, reverting to the `log`-crate-backed default.
    pub fn clear_logger(&self) {
        *self.logger.borrow_mut() = None;
    }

    /// Delivers one log entry: to the caller-installed logger if one is set, otherwise to the
    /// `log` facade (a no-op until a consumer installs a logger of their own, so this is free
    /// when nobody is listening).
    pub fn log(&self, domain: &'static str, level: LogLevel, message: impl Into<String>) {
        let record = LogRecord {
            domain,
            level,
            message: message.into(),
        };
        if let Some(logger) = self.logger.borrow_mut().as_mut() {
            logger(&record);
            return;
        }
        log::log!(target: domain, record.level.as_log_level(), "{}", record.message);
    }

    /// A fresh, reader-generated blank node label (`b1`, `b2`, ...), monotonic for this `World`'s
    /// lifetime so labels minted by different readers sharing one `World` never collide.
    pub fn fresh_blank_label(&self) -> String {
        let next = self.blank_counter.get() + 1;
        self.blank_counter.set(next);
        format!("b{next}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc;

    #[test]
    fn blank_labels_are_monotonic_and_unique() {
        let world = World::new();
        let labels: Vec<_> = (0..3).map(|_| world.fresh_blank_label()).collect();
        assert_eq!(labels, vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn custom_logger_receives_records_instead_of_the_log_facade() {
        let world = World::new();
        let captured = Rc::new(StdRefCell::new(Vec::new()));
        let sink = Rc::clone(&captured);
        world.set_logger(move |record| sink.borrow_mut().push(record.message.clone()));
        world.log("reader", LogLevel::Warning, "undefined prefix eg:");
        assert_eq!(captured.borrow().as_slice(), ["undefined prefix eg:"]);
    }
}
