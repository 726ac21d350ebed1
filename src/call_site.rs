//! Call-site attribution for log records.
//!
//! Two capture paths produce a [`CallSite`]:
//!
//! * The logging macros capture `file!()`, `line!()` and the enclosing
//!   function path at compile time ([`call_site!`](crate::call_site!)).
//! * The method and free-function entry points are `#[track_caller]`, which
//!   yields the caller's file and line, and walk the stack for the caller's
//!   function name, skipping the logger's own entry frames. The frame found
//!   above them is only trusted when debug info places it in the caller's
//!   file; optimized builds without debug info record `???`.
//!
//! Function paths are reduced to their bare trailing identifier:
//! `my_app::handlers::Server::accept::{{closure}}` becomes `accept`.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::path::Path;

use crate::symbol_cache;

/// Placeholder used when a file or function cannot be determined.
pub const UNKNOWN: &str = "???";

/// Frames whose demangled name starts with one of these belong to the
/// logger's entry points and are skipped when looking for the caller.
const ENTRY_FRAMES: &[&str] = &[
    concat!(env!("CARGO_CRATE_NAME"), "::logger::Logger::"),
    concat!(env!("CARGO_CRATE_NAME"), "::global::"),
    concat!("<", env!("CARGO_CRATE_NAME"), "::logger::Logger as log::Log>::"),
    "log::__private_api::",
];

/// Source location and function a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    file: Cow<'static, str>,
    line: u32,
    function: Cow<'static, str>,
}

impl CallSite {
    /// Creates a call site from already known parts.
    ///
    /// `function` should be a bare identifier; see [`bare_function_name`].
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        line: u32,
        function: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// The sentinel call site: `???:0` in `???()`.
    pub const fn unknown() -> Self {
        Self {
            file: Cow::Borrowed(UNKNOWN),
            line: 0,
            function: Cow::Borrowed(UNKNOWN),
        }
    }

    /// Captures the call site of whoever called a logging entry point.
    ///
    /// `location` comes from `Location::caller()` inside a `#[track_caller]`
    /// entry point. The function name is found by walking the stack past the
    /// entry frames; it is `???` when the frame there cannot be matched to
    /// `location`.
    #[inline(never)]
    pub fn capture(location: &'static Location<'static>) -> Self {
        let function = caller_function(location.file())
            .map(Cow::Owned)
            .unwrap_or(Cow::Borrowed(UNKNOWN));
        Self::new(location.file(), location.line(), function)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// `file:line`, as rendered into the `file` field of a record.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    /// `name()`, as rendered into the `function` field of a record.
    pub fn function_label(&self) -> String {
        format!("{}()", self.function)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} in {}()", self.file, self.line, self.function)
    }
}

/// Reduces a qualified function path to its trailing identifier.
///
/// Closure markers (`{{closure}}`, `{closure#0}`), generic argument segments
/// and empty segments are skipped. A path with no usable segment yields
/// [`UNKNOWN`].
///
/// # Examples
///
/// ```
/// # use elastic_logger::call_site::bare_function_name;
/// assert_eq!(bare_function_name("app::db::connect"), "connect");
/// assert_eq!(bare_function_name("app::main::{{closure}}"), "main");
/// assert_eq!(bare_function_name("<app::Job as app::Task>::run"), "run");
/// assert_eq!(bare_function_name("standalone"), "standalone");
/// ```
pub fn bare_function_name(path: &str) -> &str {
    path.rsplit("::")
        .find(|segment| {
            !segment.is_empty() && !segment.starts_with('{') && !segment.starts_with('<')
        })
        .unwrap_or(UNKNOWN)
}

/// Walks the stack and returns the bare name of the first function above the
/// logger's entry frames.
///
/// Entry frames must be found before a caller is accepted, and the caller's
/// symbol must resolve to `caller_file`. Inlining can fold the caller into
/// another frame, leaving some unrelated function (often a `core` shim)
/// directly above the entry point; without a file match the result is `None`.
pub fn caller_function(caller_file: &str) -> Option<String> {
    let mut in_entry = false;
    let mut found = None;

    backtrace::trace(|frame| {
        let symbols = symbol_cache::resolve(frame.ip() as usize);
        if in_entry && symbols.is_empty() {
            return false;
        }
        for symbol in symbols.iter() {
            if is_entry_frame(symbol.name()) {
                in_entry = true;
            } else if in_entry {
                if symbol.file().is_some_and(|file| same_source_file(file, caller_file)) {
                    found = Some(bare_function_name(symbol.name()).to_string());
                }
                return false;
            }
        }
        true
    });

    found
}

/// Whether a debug-info path and a `file!()` path name the same file.
///
/// `file!()` is relative to the workspace root while debug info usually
/// carries an absolute path, so either may be a suffix of the other.
fn same_source_file(resolved: &Path, caller_file: &str) -> bool {
    let caller_file = Path::new(caller_file);
    resolved.ends_with(caller_file) || caller_file.ends_with(resolved)
}

fn is_entry_frame(name: &str) -> bool {
    ENTRY_FRAMES.iter().any(|prefix| name.starts_with(prefix))
}

/// Expands to the path of the enclosing function, e.g. `app::server::run`.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_path {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Captures the current source location and enclosing function at compile time.
///
/// # Examples
///
/// ```
/// # use elastic_logger::call_site;
/// fn handler() -> elastic_logger::CallSite {
///     call_site!()
/// }
/// let site = handler();
/// assert_eq!(site.function(), "handler");
/// assert!(site.line() > 0);
/// ```
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(
            ::core::file!(),
            ::core::line!(),
            $crate::call_site::bare_function_name($crate::__function_path!()),
        )
    };
}
