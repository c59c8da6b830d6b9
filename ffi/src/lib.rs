//! C-ABI wrapper around `rest-core`.
//!
//! # Overview
//! Lets hosts without an async runtime issue REST requests: each client
//! owns a small tokio runtime, requests complete through a C function
//! pointer invoked from one of its worker threads, and a blocking variant is
//! available for simple call sites.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiRestResult` envelope conveys success JSON and errors
//!   uniformly for both the callback and the blocking entry points.
//! - Results passed to a callback are borrowed for the duration of the call;
//!   results returned by `rest_client_request_blocking` are owned by the
//!   caller and must be released with `rest_free_result`.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rest_core::{AppIdentity, ClientConfig, RequestClient};

use types::*;

/// Read a non-null C string. Returns `None` (and logs) on invalid UTF-8.
///
/// # Safety
/// `ptr` must be a valid NUL-terminated string.
unsafe fn read_str(ptr: *const c_char, arg: &str) -> Option<String> {
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            tracing::warn!("`{arg}` is not valid UTF-8: {e}");
            None
        }
    }
}

/// Read an optional JSON body; null means no body. Invalid UTF-8 is passed
/// on as empty text and fails as a serialization error.
unsafe fn read_body(ptr: *const c_char) -> Option<JsonText> {
    if ptr.is_null() {
        None
    } else {
        Some(JsonText(unsafe { read_str(ptr, "body_json") }.unwrap_or_default()))
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client identified by the given application details.
///
/// Returns null if any string is null or not UTF-8, if the runtime cannot be
/// started, or if an internal panic occurs. Free the result with `rest_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_new(
    app_name: *const c_char,
    app_version: *const c_char,
    app_build: *const c_char,
    platform: *const c_char,
    device: FfiDeviceClass,
) -> *mut FfiRestClient {
    catch_unwind(|| {
        if [app_name, app_version, app_build, platform].iter().any(|p| p.is_null()) {
            return std::ptr::null_mut();
        }
        let fields = unsafe {
            (
                read_str(app_name, "app_name"),
                read_str(app_version, "app_version"),
                read_str(app_build, "app_build"),
                read_str(platform, "platform"),
            )
        };
        let (Some(name), Some(version), Some(build), Some(platform)) = fields else {
            return std::ptr::null_mut();
        };
        let identity = AppIdentity::new(name, version, build, platform, device.into());
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("rest-ffi")
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("failed to start runtime: {e}");
                return std::ptr::null_mut();
            }
        };
        let inner = RequestClient::with_reqwest(ClientConfig::new(identity), runtime.handle().clone());
        Box::into_raw(Box::new(FfiRestClient { runtime, inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `rest_client_new`. Safe to call with null.
///
/// Requests still in flight are abandoned and their callbacks never fire.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_free(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let client = unsafe { Box::from_raw(client) };
            let FfiRestClient { runtime, inner } = *client;
            drop(inner);
            runtime.shutdown_background();
        }));
    }
}

// ---------------------------------------------------------------------------
// Default headers
// ---------------------------------------------------------------------------

/// Set a header sent with every request issued after this call.
///
/// Returns false, leaving the headers unchanged, if any argument is null or
/// not UTF-8, or if the name or value is not allowed in an HTTP header.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_set_default_header(
    client: *const FfiRestClient,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() || value.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let pair = unsafe { (read_str(name, "name"), read_str(value, "value")) };
        let (Some(name), Some(value)) = pair else {
            return false;
        };
        match client.inner.set_default_header(name, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    }))
    .unwrap_or(false)
}

/// Remove a default header. Returns true if one was removed.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_remove_default_header(
    client: *const FfiRestClient,
    name: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let Some(name) = (unsafe { read_str(name, "name") }) else {
            return false;
        };
        client.inner.remove_default_header(&name).is_some()
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Issue a request and report its outcome through `callback`.
///
/// `body_json` may be null for no body; otherwise it must be JSON text. An
/// address that is not UTF-8 is reported as an invalid address.
/// Returns immediately. `callback` is invoked exactly once, from a runtime
/// worker thread, with `user_data` passed through untouched. Returns false
/// (and never invokes `callback`) if `client`, `address` or `callback` is
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_request(
    client: *const FfiRestClient,
    address: *const c_char,
    method: FfiMethod,
    body_json: *const c_char,
    callback: Option<FfiCompletion>,
    user_data: *mut c_void,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return false;
        };
        if client.is_null() || address.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let (address, body) = unsafe {
            (read_str(address, "address").unwrap_or_default(), read_body(body_json))
        };
        let user_data = UserData(user_data);

        client
            .inner
            .request_with_callback(&address, method.into(), body, move |json, error| {
                let user_data = user_data;
                let outcome = match error {
                    Some(error) => Err(error),
                    None => Ok(json.unwrap_or_default()),
                };
                let result = FfiRestResult::from_outcome(outcome);
                callback(&result, user_data.0);
            });
        true
    }))
    .unwrap_or(false)
}

/// Issue a request and wait for it on the calling thread.
///
/// Must not be called from inside a completion callback. Always returns a
/// non-null result; free it with `rest_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_request_blocking(
    client: *const FfiRestClient,
    address: *const c_char,
    method: FfiMethod,
    body_json: *const c_char,
) -> *mut FfiRestResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiRestResult::null_arg("client").into_raw();
        }
        if address.is_null() {
            return FfiRestResult::null_arg("address").into_raw();
        }
        let client = unsafe { &*client };
        let (address, body) = unsafe {
            (read_str(address, "address").unwrap_or_default(), read_body(body_json))
        };
        let outcome = client
            .runtime
            .block_on(client.inner.request(&address, method.into(), body.as_ref()));
        FfiRestResult::from_outcome(outcome).into_raw()
    }))
    .unwrap_or_else(|_| FfiRestResult::panic("panic in rest_client_request_blocking").into_raw())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by `rest_client_request_blocking`. Safe to call
/// with null. Results passed to callbacks must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn rest_free_result(result: *mut FfiRestResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        drop(unsafe { Box::from_raw(result) });
    });
}
