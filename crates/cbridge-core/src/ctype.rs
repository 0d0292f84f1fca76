//! Scalar C type descriptors and the fixed-vocabulary type table.
//!
//! Every type that can cross the boundary is one of the [`CTypeKind`]
//! scalars. Declared type names recovered from source text are translated
//! through [`CTypeKind::resolve`], which understands the standard integer
//! family, the float family, `bool`, the `stdint.h`/`stddef.h` aliases and
//! the two supported pointer shapes (`void*` and `char*`). Anything outside
//! that vocabulary resolves to `None`.

use std::fmt;

/// Scalar kind of a value crossing the native boundary.
///
/// A kind is fixed at construction and never mutates; bindings store these
/// by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CTypeKind {
    /// No value (`void` in return position).
    Void,
    /// `bool` / `_Bool`, one byte.
    Bool,
    /// Plain `char`, one byte (platform signedness is irrelevant at this width).
    Char,
    /// `unsigned char`.
    UChar,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Native `long`, 32 or 64 bits depending on the data model.
    Long,
    /// Native `unsigned long`.
    ULong,
    /// Native `long long`, always 64 bits on supported targets.
    LongLong,
    /// Native `unsigned long long`.
    ULongLong,
    /// Signed pointer-sized integer (`ptrdiff_t`, `intptr_t`).
    ISize,
    /// Unsigned pointer-sized integer (`size_t`, `uintptr_t`).
    USize,
    /// `float`.
    Float,
    /// `double`.
    Double,
    /// `long double`. Marshaled at double precision; Rust has no native
    /// extended-float type.
    LongDouble,
    /// Raw `void*`.
    Pointer,
    /// Null-terminated `char*`. The one kind with ownership semantics; see
    /// [`OwnedCStr`](crate::OwnedCStr).
    CString,
}

impl CTypeKind {
    /// Translate a declared type name into its descriptor.
    ///
    /// The lookup is pure and total over a fixed vocabulary: the same name
    /// always yields the same descriptor, and names outside the vocabulary
    /// always yield `None`. Names are normalized first (whitespace collapsed,
    /// `const` qualifiers dropped, a free-standing `*` attached to the
    /// preceding word), so `const char *` and `char*` resolve identically.
    pub fn resolve(name: &str) -> Option<CTypeKind> {
        use CTypeKind::*;

        let normalized = normalize(name);
        Some(match normalized.as_str() {
            "void" => Void,
            "bool" | "_Bool" => Bool,
            "char" => Char,
            "signed char" => Int8,
            "unsigned char" => UChar,
            "short" | "short int" | "signed short" | "signed short int" => Int16,
            "unsigned short" | "unsigned short int" => UInt16,
            "int" | "signed" | "signed int" => Int32,
            "unsigned" | "unsigned int" => UInt32,
            "long" | "long int" | "signed long" | "signed long int" => Long,
            "unsigned long" | "unsigned long int" => ULong,
            "long long" | "long long int" | "signed long long" | "signed long long int" => {
                LongLong
            }
            "unsigned long long" | "unsigned long long int" => ULongLong,
            "float" => Float,
            "double" => Double,
            "long double" => LongDouble,
            "int8_t" => Int8,
            "int16_t" => Int16,
            "int32_t" => Int32,
            "int64_t" => Int64,
            "uint8_t" => UInt8,
            "uint16_t" => UInt16,
            "uint32_t" => UInt32,
            "uint64_t" => UInt64,
            "size_t" | "uintptr_t" => USize,
            "ptrdiff_t" | "ssize_t" | "intptr_t" => ISize,
            "void*" => Pointer,
            "char*" => CString,
            _ => return None,
        })
    }

    /// Canonical display name for this kind.
    pub const fn name(self) -> &'static str {
        use CTypeKind::*;
        match self {
            Void => "void",
            Bool => "bool",
            Char => "char",
            UChar => "unsigned char",
            Int8 => "int8_t",
            Int16 => "int16_t",
            Int32 => "int32_t",
            Int64 => "int64_t",
            UInt8 => "uint8_t",
            UInt16 => "uint16_t",
            UInt32 => "uint32_t",
            UInt64 => "uint64_t",
            Long => "long",
            ULong => "unsigned long",
            LongLong => "long long",
            ULongLong => "unsigned long long",
            ISize => "ptrdiff_t",
            USize => "size_t",
            Float => "float",
            Double => "double",
            LongDouble => "long double",
            Pointer => "void*",
            CString => "char*",
        }
    }

    /// Whether this kind is an integer (of any width or signedness).
    pub const fn is_integer(self) -> bool {
        use CTypeKind::*;
        matches!(
            self,
            Char | UChar
                | Int8
                | Int16
                | Int32
                | Int64
                | UInt8
                | UInt16
                | UInt32
                | UInt64
                | Long
                | ULong
                | LongLong
                | ULongLong
                | ISize
                | USize
        )
    }

    /// Whether this kind is an unsigned integer.
    pub const fn is_unsigned(self) -> bool {
        use CTypeKind::*;
        matches!(
            self,
            UChar | UInt8 | UInt16 | UInt32 | UInt64 | ULong | ULongLong | USize
        )
    }

    /// Whether this kind is a floating-point type.
    pub const fn is_float(self) -> bool {
        use CTypeKind::*;
        matches!(self, Float | Double | LongDouble)
    }

    /// Storage width in bytes, as seen by the foreign ABI.
    pub fn byte_width(self) -> usize {
        use CTypeKind::*;
        match self {
            Void => 0,
            Bool | Char | UChar | Int8 | UInt8 => 1,
            Int16 | UInt16 => 2,
            Int32 | UInt32 | Float => 4,
            Int64 | UInt64 | LongLong | ULongLong | Double | LongDouble => 8,
            Long | ULong => size_of::<core::ffi::c_long>(),
            ISize | USize | Pointer | CString => size_of::<usize>(),
        }
    }
}

impl fmt::Display for CTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Collapse whitespace, drop `const` qualifiers and attach `*` to the
/// preceding word so that lookup sees one spelling per type.
fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for token in name.split_whitespace() {
        if token == "const" {
            continue;
        }
        if token.starts_with('*') {
            out.push_str(token);
        } else {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        }
    }
    out
}
