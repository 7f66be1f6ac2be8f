//! Object-shaped type vocabulary: platform objects, buffer sources and a few intrinsic names.
//!
//! ## Notes
//! - Platform objects are recognized by suffix (`...Element`, `...Event`) or by the fixed allow-list below.
//! - Buffer-source names map to handles of the generic object type; their runtime check is per name.

/// Interface names that are always platform objects.
pub const PLATFORM_OBJECTS: &[&str] = &[
    "AbortSignal",
    "Attr",
    "Blob",
    "CanvasGradient",
    "CanvasPattern",
    "CanvasRenderingContext2D",
    "Document",
    "DocumentType",
    "EventTarget",
    "FileList",
    "FormData",
    "ImageData",
    "MutationRecord",
    "NamedNodeMap",
    "Node",
    "Path2D",
    "Range",
    "ReadableStream",
    "Request",
    "Selection",
    "Text",
    "TextMetrics",
    "URLSearchParams",
    "WebGLRenderingContext",
    "Window",
];

/// Name suffixes that mark an interface as a platform object.
pub const PLATFORM_OBJECT_SUFFIXES: &[&str] = &["Element", "Event"];

pub const WINDOW_PROXY: &str = "WindowProxy";
pub const PROMISE: &str = "Promise";
pub const OBJECT: &str = "object";
pub const SYMBOL: &str = "symbol";

/// Check whether an interface name denotes a platform object.
///
/// ## Parameters
/// - `name`: Interface name as written in IDL.
///
/// ## Returns
/// - `true` for names ending in one of [`PLATFORM_OBJECT_SUFFIXES`] or listed in [`PLATFORM_OBJECTS`].
pub fn is_platform_object(name: &str) -> bool {
    PLATFORM_OBJECT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || PLATFORM_OBJECTS.contains(&name)
}

/// Stable identifier for buffer-source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSourceId {
    BufferSource,
    ArrayBuffer,
    ArrayBufferView,
    DataView,
    TypedArray,
}

/// Metadata for a buffer-source type name.
#[derive(Debug, Clone, Copy)]
pub struct BufferSourceInfo {
    pub canonical: &'static str,
    pub id: BufferSourceId,
}

/// Registry of buffer-source type names. Typed arrays share [`BufferSourceId::TypedArray`].
pub const BUFFER_SOURCES: &[BufferSourceInfo] = &[
    buffer("BufferSource", BufferSourceId::BufferSource),
    buffer("ArrayBuffer", BufferSourceId::ArrayBuffer),
    buffer("ArrayBufferView", BufferSourceId::ArrayBufferView),
    buffer("DataView", BufferSourceId::DataView),
    buffer("Int8Array", BufferSourceId::TypedArray),
    buffer("Uint8Array", BufferSourceId::TypedArray),
    buffer("Uint8ClampedArray", BufferSourceId::TypedArray),
    buffer("Int16Array", BufferSourceId::TypedArray),
    buffer("Uint16Array", BufferSourceId::TypedArray),
    buffer("Int32Array", BufferSourceId::TypedArray),
    buffer("Uint32Array", BufferSourceId::TypedArray),
    buffer("BigInt64Array", BufferSourceId::TypedArray),
    buffer("BigUint64Array", BufferSourceId::TypedArray),
    buffer("Float32Array", BufferSourceId::TypedArray),
    buffer("Float64Array", BufferSourceId::TypedArray),
];

/// Resolve a type name to a [`BufferSourceId`].
pub fn buffer_source_from_str(name: &str) -> Option<BufferSourceId> {
    BUFFER_SOURCES.iter().find(|b| b.canonical == name).map(|b| b.id)
}

const fn buffer(canonical: &'static str, id: BufferSourceId) -> BufferSourceInfo {
    BufferSourceInfo { canonical, id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_rule_and_allow_list() {
        assert!(is_platform_object("HTMLDivElement"));
        assert!(is_platform_object("KeyboardEvent"));
        assert!(is_platform_object("Node"));
        assert!(!is_platform_object("Nodes"));
        assert!(!is_platform_object("ElementCreationOptions"));
    }

    #[test]
    fn typed_arrays_share_one_id() {
        assert_eq!(buffer_source_from_str("Uint8Array"), Some(BufferSourceId::TypedArray));
        assert_eq!(buffer_source_from_str("ArrayBuffer"), Some(BufferSourceId::ArrayBuffer));
        assert_eq!(buffer_source_from_str("Blob"), None);
    }
}
