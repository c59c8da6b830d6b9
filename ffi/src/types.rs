//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, tagged enums with explicit
//! discriminants. JSON values cross the boundary as serialized text so C
//! callers can hand them to whatever JSON library they already use.

use std::ffi::CString;
use std::os::raw::c_char;

use rest_core::{DeviceClass, ErrorKind, Method, ReqwestTransport, RequestClient, RestError};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value;

/// Opaque handle to a `RequestClient` and the runtime its requests run on.
/// C callers receive a pointer to this and pass it back into every function.
pub struct FfiRestClient {
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) inner: RequestClient<ReqwestTransport>,
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiMethod {
    Delete = 0,
    Get = 1,
    Patch = 2,
    Post = 3,
    Put = 4,
}

impl From<FfiMethod> for Method {
    fn from(m: FfiMethod) -> Self {
        match m {
            FfiMethod::Delete => Method::Delete,
            FfiMethod::Get => Method::Get,
            FfiMethod::Patch => Method::Patch,
            FfiMethod::Post => Method::Post,
            FfiMethod::Put => Method::Put,
        }
    }
}

/// Device form factor as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiDeviceClass {
    Phone = 0,
    Tablet = 1,
    Desktop = 2,
}

impl From<FfiDeviceClass> for DeviceClass {
    fn from(d: FfiDeviceClass) -> Self {
        match d {
            FfiDeviceClass::Phone => DeviceClass::Phone,
            FfiDeviceClass::Tablet => DeviceClass::Tablet,
            FfiDeviceClass::Desktop => DeviceClass::Desktop,
        }
    }
}

/// Error codes returned in `FfiRestResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidAddress = 1,
    Serialization = 2,
    Transport = 3,
    HttpStatus = 4,
    EmptyResponse = 5,
    Panic = 6,
    NullArg = 7,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidAddress => FfiErrorCode::InvalidAddress,
            ErrorKind::Serialization => FfiErrorCode::Serialization,
            ErrorKind::Transport => FfiErrorCode::Transport,
            ErrorKind::HttpStatus => FfiErrorCode::HttpStatus,
            ErrorKind::EmptyResponse => FfiErrorCode::EmptyResponse,
        }
    }
}

/// Outcome of one request.
///
/// On success `error_code` is `Ok` and `json` holds the response as JSON
/// text. On failure `json` is null, `error_message` is a human-readable C
/// string, and for `HttpStatus` errors `http_status` and `error_detail`
/// (JSON object text) are set as well.
#[repr(C)]
pub struct FfiRestResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub error_detail: *mut c_char,
    pub json: *mut c_char,
}

/// Completion callback for `rest_client_request`. `result` is only valid for
/// the duration of the call.
pub type FfiCompletion = extern "C" fn(result: *const FfiRestResult, user_data: *mut std::ffi::c_void);

/// Caller-owned context pointer handed back to the completion callback.
pub(crate) struct UserData(pub(crate) *mut std::ffi::c_void);

// The pointer is opaque to us; thread-safety of what it points to is the
// C caller's contract.
unsafe impl Send for UserData {}

/// JSON text supplied by a C caller. Parsing is deferred to serialization so
/// malformed input surfaces as a serialization error on the normal
/// error channel.
pub(crate) struct JsonText(pub(crate) String);

impl Serialize for JsonText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value: Value = serde_json::from_str(&self.0).map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}

pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    CString::new(s.replace('\0', "")).unwrap_or_default().into_raw()
}

impl FfiRestResult {
    fn error(code: FfiErrorCode, message: impl Into<String>) -> Self {
        FfiRestResult {
            error_code: code,
            error_message: c_string(message),
            http_status: 0,
            error_detail: std::ptr::null_mut(),
            json: std::ptr::null_mut(),
        }
    }

    pub(crate) fn from_outcome(outcome: Result<Value, RestError>) -> Self {
        match outcome {
            Ok(json) => FfiRestResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                http_status: 0,
                error_detail: std::ptr::null_mut(),
                json: c_string(json.to_string()),
            },
            Err(err) => {
                let mut result = Self::error(err.kind().into(), err.to_string());
                if let Some(status) = err.status() {
                    result.http_status = status;
                }
                if let Some(detail) = err.detail() {
                    result.error_detail = c_string(Value::Object(detail.clone()).to_string());
                }
                result
            }
        }
    }

    pub(crate) fn null_arg(name: &str) -> Self {
        Self::error(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> Self {
        Self::error(FfiErrorCode::Panic, msg)
    }

    pub(crate) fn into_raw(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }
}

impl Drop for FfiRestResult {
    fn drop(&mut self) {
        for ptr in [self.error_message, self.error_detail, self.json] {
            if !ptr.is_null() {
                drop(unsafe { CString::from_raw(ptr) });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn text(ptr: *mut c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn success_carries_json_text() {
        let result = FfiRestResult::from_outcome(Ok(serde_json::json!({"a": 1})));
        assert_eq!(result.error_code, FfiErrorCode::Ok);
        assert!(result.error_message.is_null());
        assert_eq!(text(result.json), r#"{"a":1}"#);
    }

    #[test]
    fn http_status_carries_code_and_detail() {
        let mut detail = serde_json::Map::new();
        detail.insert("message".to_string(), Value::from("not found"));
        let result = FfiRestResult::from_outcome(Err(RestError::HttpStatus {
            status: 404,
            phrase: "Not Found".to_string(),
            detail,
        }));
        assert_eq!(result.error_code, FfiErrorCode::HttpStatus);
        assert_eq!(result.http_status, 404);
        assert!(result.json.is_null());
        assert_eq!(text(result.error_detail), r#"{"message":"not found"}"#);
        assert_eq!(text(result.error_message), "HTTP 404: Not Found");
    }

    #[test]
    fn malformed_json_text_fails_to_serialize() {
        assert!(serde_json::to_vec(&JsonText("{not json".to_string())).is_err());
        let bytes = serde_json::to_vec(&JsonText(r#"{"a": [1, 2]}"#.to_string())).unwrap();
        assert_eq!(bytes, br#"{"a":[1,2]}"#);
    }

    #[test]
    fn c_string_strips_interior_nul() {
        let ptr = c_string("a\0b");
        assert_eq!(text(ptr), "ab");
        drop(unsafe { CString::from_raw(ptr) });
    }
}
