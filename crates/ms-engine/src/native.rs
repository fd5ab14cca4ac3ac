//! MediaInfoLib loaded at runtime.
//!
//! The shared library is opened with `libloading` so nothing links against
//! it at build time. Only the narrow-string (`MediaInfoA_*`) buffer API is
//! bound. The library returns its "go to" offset as a native 64-bit value
//! (all ones meaning "no seek"); [`NativeEngine`] splits it into the two
//! boundary words so every engine looks the same to the adapter.

use std::ffi::{c_char, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use libloading::Library;
use ms_core::{AnalyzeOptions, Error, Result, SeekWords};

use crate::engine::{Engine, EngineFactory, EngineSettings};

type NewFn = unsafe extern "C" fn() -> *mut c_void;
type DeleteFn = unsafe extern "C" fn(*mut c_void);
type OptionFn = unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char) -> *const c_char;
type BufferInitFn = unsafe extern "C" fn(*mut c_void, u64, u64) -> usize;
type BufferContinueFn = unsafe extern "C" fn(*mut c_void, *const u8, usize) -> usize;
type GotoGetFn = unsafe extern "C" fn(*mut c_void) -> u64;
type BufferFinalizeFn = unsafe extern "C" fn(*mut c_void) -> usize;
type InformFn = unsafe extern "C" fn(*mut c_void, usize) -> *const c_char;
type CloseFn = unsafe extern "C" fn(*mut c_void);

/// Directories searched by [`NativeFactory::load_default`] in addition to
/// the platform loader's own search path.
const SEARCH_DIRS: &[&str] = &[
    "/usr/lib",
    "/usr/local/lib",
    "/opt/homebrew/lib",
    "/usr/lib/x86_64-linux-gnu",
];

/// Resolved entry points. Keeps the library mapped for as long as any
/// engine created from it is alive.
struct NativeLibrary {
    new: NewFn,
    delete: DeleteFn,
    option: OptionFn,
    buffer_init: BufferInitFn,
    buffer_continue: BufferContinueFn,
    goto_get: GotoGetFn,
    buffer_finalize: BufferFinalizeFn,
    inform: InformFn,
    close: CloseFn,
    path: PathBuf,
    _lib: Library,
}

impl NativeLibrary {
    fn open(path: &Path) -> Result<Self> {
        // SAFETY: loading MediaInfoLib runs its static initialisers, which
        // have no preconditions beyond being loaded once per path.
        let lib = unsafe { Library::new(path) }
            .map_err(|e| Error::engine(format!("failed to load {}: {e}", path.display())))?;

        // SAFETY: every symbol is resolved with the signature declared in
        // MediaInfoDLL.h for the narrow-string API.
        unsafe {
            Ok(Self {
                new: symbol(&lib, b"MediaInfoA_New\0")?,
                delete: symbol(&lib, b"MediaInfoA_Delete\0")?,
                option: symbol(&lib, b"MediaInfoA_Option\0")?,
                buffer_init: symbol(&lib, b"MediaInfoA_Open_Buffer_Init\0")?,
                buffer_continue: symbol(&lib, b"MediaInfoA_Open_Buffer_Continue\0")?,
                goto_get: symbol(&lib, b"MediaInfoA_Open_Buffer_Continue_GoTo_Get\0")?,
                buffer_finalize: symbol(&lib, b"MediaInfoA_Open_Buffer_Finalize\0")?,
                inform: symbol(&lib, b"MediaInfoA_Inform\0")?,
                close: symbol(&lib, b"MediaInfoA_Close\0")?,
                path: path.to_path_buf(),
                _lib: lib,
            })
        }
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T> {
    lib.get::<T>(name).map(|s| *s).map_err(|e| {
        let printable = String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]);
        Error::engine(format!("missing symbol {printable}: {e}"))
    })
}

/// Creates [`NativeEngine`]s from a loaded MediaInfoLib.
#[derive(Clone)]
pub struct NativeFactory {
    lib: Arc<NativeLibrary>,
}

impl NativeFactory {
    /// Load MediaInfoLib from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let lib = NativeLibrary::open(path.as_ref())?;
        tracing::info!(path = %lib.path.display(), "loaded MediaInfoLib");
        Ok(Self { lib: Arc::new(lib) })
    }

    /// Load MediaInfoLib by its platform file name, trying the loader's
    /// search path first and then a few well-known directories.
    pub fn load_default() -> Result<Self> {
        let file_name = libloading::library_filename("mediainfo");
        let mut candidates = vec![PathBuf::from(&file_name)];
        candidates.extend(SEARCH_DIRS.iter().map(|dir| Path::new(dir).join(&file_name)));
        // Debian ships only the versioned soname without the dev package.
        candidates.extend(
            SEARCH_DIRS
                .iter()
                .map(|dir| Path::new(dir).join("libmediainfo.so.0")),
        );

        let mut last_err = None;
        for candidate in candidates {
            match Self::load(&candidate) {
                Ok(factory) => return Ok(factory),
                Err(e) => {
                    tracing::debug!(
                        path = %candidate.display(),
                        error = %e,
                        "MediaInfoLib candidate rejected"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::engine("no MediaInfoLib candidates")))
    }

    pub fn library_path(&self) -> &Path {
        &self.lib.path
    }

    /// The library's version banner, e.g. `MediaInfoLib - v24.06`.
    pub fn version(&self) -> Result<String> {
        let engine = self.create(EngineSettings::from(&AnalyzeOptions::default()))?;
        engine.set_option("Info_Version", "")
    }
}

impl std::fmt::Debug for NativeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFactory")
            .field("path", &self.lib.path)
            .finish()
    }
}

impl EngineFactory for NativeFactory {
    type Engine = NativeEngine;

    fn name(&self) -> &'static str {
        "mediainfo"
    }

    fn create(&self, settings: EngineSettings) -> Result<NativeEngine> {
        // SAFETY: MediaInfoA_New has no preconditions.
        let handle = unsafe { (self.lib.new)() };
        let handle = NonNull::new(handle)
            .ok_or_else(|| Error::engine("MediaInfoA_New returned null"))?;

        let engine = NativeEngine {
            lib: Arc::clone(&self.lib),
            handle,
        };
        engine.set_option("Inform", settings.output_kind.as_engine_str())?;
        engine.set_option("Complete", if settings.full { "1" } else { "" })?;
        engine.set_option("Cover_Data", if settings.cover_data { "base64" } else { "" })?;
        Ok(engine)
    }
}

/// One MediaInfoLib instance.
pub struct NativeEngine {
    lib: Arc<NativeLibrary>,
    handle: NonNull<c_void>,
}

// SAFETY: an instance is only ever driven by its single owner; MediaInfoLib
// keeps no thread-affine state per handle.
unsafe impl Send for NativeEngine {}

impl NativeEngine {
    fn set_option(&self, name: &str, value: &str) -> Result<String> {
        let name = CString::new(name).map_err(|e| Error::engine(e.to_string()))?;
        let value = CString::new(value).map_err(|e| Error::engine(e.to_string()))?;
        // SAFETY: handle is live and both strings are NUL-terminated for the
        // duration of the call. The returned string belongs to the instance
        // and is copied out before any other call.
        unsafe {
            let ptr = (self.lib.option)(self.handle.as_ptr(), name.as_ptr(), value.as_ptr());
            if ptr.is_null() {
                return Ok(String::new());
            }
            Ok(CStr::from_ptr(ptr).to_string_lossy().into_owned())
        }
    }

    fn goto_words(&self) -> SeekWords {
        // SAFETY: handle is live.
        let target = unsafe { (self.lib.goto_get)(self.handle.as_ptr()) };
        SeekWords::from_target(Some(target))
    }
}

impl Engine for NativeEngine {
    fn open_buffer_init(&mut self, size: u64, offset: u64) {
        // SAFETY: handle is live.
        unsafe { (self.lib.buffer_init)(self.handle.as_ptr(), size, offset) };
    }

    fn open_buffer_continue(&mut self, data: &[u8]) -> u32 {
        // SAFETY: handle is live; the engine copies what it needs from the
        // buffer before returning.
        let raw = unsafe {
            (self.lib.buffer_continue)(self.handle.as_ptr(), data.as_ptr(), data.len())
        };
        raw as u32
    }

    fn open_buffer_continue_goto_get_lower(&mut self) -> i32 {
        self.goto_words().low
    }

    fn open_buffer_continue_goto_get_upper(&mut self) -> i32 {
        self.goto_words().high
    }

    fn open_buffer_finalize(&mut self) {
        // SAFETY: handle is live.
        unsafe { (self.lib.buffer_finalize)(self.handle.as_ptr()) };
    }

    fn inform(&mut self) -> String {
        // SAFETY: handle is live. The returned string is owned by the
        // instance and valid until the next call on it, so it is copied out
        // immediately.
        unsafe {
            let ptr = (self.lib.inform)(self.handle.as_ptr(), 0);
            if ptr.is_null() {
                return String::new();
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }

    fn close(&mut self) {
        // SAFETY: handle is live; closing twice is harmless in MediaInfoLib.
        unsafe { (self.lib.close)(self.handle.as_ptr()) };
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        // SAFETY: handle came from MediaInfoA_New and is deleted only here.
        unsafe { (self.lib.delete)(self.handle.as_ptr()) };
    }
}
