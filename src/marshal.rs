//! Argument and return-value marshaling around the foreign call.
//!
//! Each supplied [`CValue`] is converted into the exact native
//! representation its parameter descriptor declares, held in a storage enum
//! that stays alive until the call returns. The `char*` kind is the one
//! special case: a host string is wrapped into a null-terminated buffer
//! owned for the duration of the call, and a returned `char*` comes back as
//! an [`OwnedCStr`] the caller must release.

use std::ffi::CString;

use libc::{c_char, c_long, c_ulong, c_void};
use libffi::middle::{Arg, Cif, CodePtr, Type};

use cbridge_core::{CTypeKind, CValue, CallError, FromValue, OwnedCStr};

/// One marshaled argument in its exact native representation.
#[derive(Debug)]
pub(crate) enum FfiValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Long(c_long),
    ULong(c_ulong),
    ISize(isize),
    USize(usize),
    F32(f32),
    F64(f64),
    Ptr(*mut c_void),
    /// Owns the null-terminated buffer for the duration of the call.
    CStr(CString),
}

fn conversion_error(index: usize, declared: CTypeKind, value: &CValue) -> CallError {
    CallError::ArgumentConversion {
        index,
        declared: declared.name(),
        actual: value.type_name(),
    }
}

fn int_arg(value: &CValue) -> Option<i64> {
    match value {
        CValue::Int(v) => Some(*v),
        _ => None,
    }
}

/// Convert one argument into the representation its descriptor declares.
pub(crate) fn marshal_arg(
    kind: CTypeKind,
    value: &CValue,
    index: usize,
) -> Result<FfiValue, CallError> {
    use CTypeKind::*;

    let err = || conversion_error(index, kind, value);

    Ok(match kind {
        // Bindings never carry void parameters.
        Void => return Err(err()),

        Bool => match value {
            CValue::Bool(b) => FfiValue::U8(*b as u8),
            CValue::Int(v) => FfiValue::U8((*v != 0) as u8),
            _ => return Err(err()),
        },

        Char => match value {
            CValue::Int(_) => FfiValue::I8(i8::from_value(value).map_err(|_| err())?),
            CValue::Str(s) if s.len() == 1 => FfiValue::I8(s.as_bytes()[0] as i8),
            _ => return Err(err()),
        },

        Int8 => FfiValue::I8(i8::from_value(value).map_err(|_| err())?),
        Int16 => FfiValue::I16(i16::from_value(value).map_err(|_| err())?),
        Int32 => FfiValue::I32(i32::from_value(value).map_err(|_| err())?),
        Int64 | LongLong => FfiValue::I64(i64::from_value(value).map_err(|_| err())?),
        UChar | UInt8 => FfiValue::U8(u8::from_value(value).map_err(|_| err())?),
        UInt16 => FfiValue::U16(u16::from_value(value).map_err(|_| err())?),
        UInt32 => FfiValue::U32(u32::from_value(value).map_err(|_| err())?),
        // Full-range unsigned 64-bit round trip via bit reinterpretation.
        UInt64 | ULongLong => FfiValue::U64(u64::from_value(value).map_err(|_| err())?),

        Long => {
            let v = int_arg(value).ok_or_else(err)?;
            FfiValue::Long(c_long::try_from(v).map_err(|_| err())?)
        }
        ULong => {
            let v = int_arg(value).ok_or_else(err)?;
            if size_of::<c_ulong>() == 8 {
                FfiValue::ULong(v as c_ulong)
            } else {
                FfiValue::ULong(c_ulong::try_from(v).map_err(|_| err())?)
            }
        }

        ISize => FfiValue::ISize(isize::from_value(value).map_err(|_| err())?),
        USize => FfiValue::USize(usize::from_value(value).map_err(|_| err())?),

        Float => FfiValue::F32(f32::from_value(value).map_err(|_| err())?),
        // Extended precision is marshaled at double precision.
        Double | LongDouble => FfiValue::F64(f64::from_value(value).map_err(|_| err())?),

        Pointer => match value {
            CValue::Ptr(p) => FfiValue::Ptr(*p as *mut c_void),
            CValue::Int(v) => FfiValue::Ptr(*v as usize as *mut c_void),
            CValue::CStr(s) => FfiValue::Ptr(s.as_ptr() as *mut c_void),
            CValue::Null => FfiValue::Ptr(std::ptr::null_mut()),
            _ => return Err(err()),
        },

        CString => match value {
            CValue::Str(s) => {
                FfiValue::CStr(std::ffi::CString::new(s.as_str()).map_err(|_| err())?)
            }
            CValue::CStr(s) => FfiValue::Ptr(s.as_ptr() as *mut c_void),
            CValue::Ptr(p) => FfiValue::Ptr(*p as *mut c_void),
            CValue::Null => FfiValue::Ptr(std::ptr::null_mut()),
            _ => return Err(err()),
        },
    })
}

/// The libffi type describing a descriptor's ABI representation.
pub(crate) fn ffi_type(kind: CTypeKind) -> Type {
    use CTypeKind::*;
    match kind {
        Void => Type::void(),
        Bool | UChar | UInt8 => Type::u8(),
        Char | Int8 => Type::i8(),
        Int16 => Type::i16(),
        UInt16 => Type::u16(),
        Int32 => Type::i32(),
        UInt32 => Type::u32(),
        Int64 | LongLong => Type::i64(),
        UInt64 | ULongLong => Type::u64(),
        Long => {
            if size_of::<c_long>() == 8 {
                Type::i64()
            } else {
                Type::i32()
            }
        }
        ULong => {
            if size_of::<c_ulong>() == 8 {
                Type::u64()
            } else {
                Type::u32()
            }
        }
        ISize => Type::isize(),
        USize => Type::usize(),
        Float => Type::f32(),
        Double | LongDouble => Type::f64(),
        Pointer | CString => Type::pointer(),
    }
}

/// Marshal `args`, perform the foreign call and box the result.
///
/// The arity precondition is checked before any conversion or foreign call
/// takes place. The call itself is synchronous and blocking; no timeout or
/// cancellation applies.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn call(
    symbol: *const c_void,
    params: &[CTypeKind],
    ret: CTypeKind,
    args: &[CValue],
) -> Result<CValue, CallError> {
    use CTypeKind::*;

    if args.len() != params.len() {
        return Err(CallError::ArityMismatch {
            expected: params.len(),
            supplied: args.len(),
        });
    }

    let mut storage = Vec::with_capacity(args.len());
    for (index, (kind, value)) in params.iter().zip(args).enumerate() {
        storage.push(marshal_arg(*kind, value, index)?);
    }

    // String buffers need a stable slot holding the pointer that libffi's
    // argument vector references; reserved up front so pushes never move it.
    let mut cstr_ptrs: Vec<*const c_char> = Vec::with_capacity(storage.len());
    let mut ffi_args: Vec<Arg> = Vec::with_capacity(storage.len());
    for stored in &storage {
        let arg = match stored {
            FfiValue::I8(v) => Arg::new(v),
            FfiValue::U8(v) => Arg::new(v),
            FfiValue::I16(v) => Arg::new(v),
            FfiValue::U16(v) => Arg::new(v),
            FfiValue::I32(v) => Arg::new(v),
            FfiValue::U32(v) => Arg::new(v),
            FfiValue::I64(v) => Arg::new(v),
            FfiValue::U64(v) => Arg::new(v),
            FfiValue::Long(v) => Arg::new(v),
            FfiValue::ULong(v) => Arg::new(v),
            FfiValue::ISize(v) => Arg::new(v),
            FfiValue::USize(v) => Arg::new(v),
            FfiValue::F32(v) => Arg::new(v),
            FfiValue::F64(v) => Arg::new(v),
            FfiValue::Ptr(v) => Arg::new(v),
            FfiValue::CStr(buf) => {
                cstr_ptrs.push(buf.as_ptr());
                Arg::new(&cstr_ptrs[cstr_ptrs.len() - 1])
            }
        };
        ffi_args.push(arg);
    }

    let cif = Cif::new(params.iter().map(|k| ffi_type(*k)), ffi_type(ret));
    let code = CodePtr(symbol as *mut c_void);

    let result = match ret {
        Void => {
            unsafe { cif.call::<()>(code, &ffi_args) };
            CValue::Void
        }
        Bool => CValue::Bool(unsafe { cif.call::<u8>(code, &ffi_args) } != 0),
        Char | Int8 => CValue::Int(unsafe { cif.call::<i8>(code, &ffi_args) } as i64),
        UChar | UInt8 => CValue::Int(unsafe { cif.call::<u8>(code, &ffi_args) } as i64),
        Int16 => CValue::Int(unsafe { cif.call::<i16>(code, &ffi_args) } as i64),
        UInt16 => CValue::Int(unsafe { cif.call::<u16>(code, &ffi_args) } as i64),
        Int32 => CValue::Int(unsafe { cif.call::<i32>(code, &ffi_args) } as i64),
        UInt32 => CValue::Int(unsafe { cif.call::<u32>(code, &ffi_args) } as i64),
        Int64 | LongLong => CValue::Int(unsafe { cif.call::<i64>(code, &ffi_args) }),
        UInt64 | ULongLong => CValue::Int(unsafe { cif.call::<u64>(code, &ffi_args) } as i64),
        Long => CValue::Int(unsafe { cif.call::<c_long>(code, &ffi_args) } as i64),
        ULong => CValue::Int(unsafe { cif.call::<c_ulong>(code, &ffi_args) } as i64),
        ISize => CValue::Int(unsafe { cif.call::<isize>(code, &ffi_args) } as i64),
        USize => CValue::Int(unsafe { cif.call::<usize>(code, &ffi_args) } as i64),
        Float => CValue::Float(unsafe { cif.call::<f32>(code, &ffi_args) } as f64),
        Double | LongDouble => CValue::Float(unsafe { cif.call::<f64>(code, &ffi_args) }),
        Pointer => {
            let ptr = unsafe { cif.call::<*mut c_void>(code, &ffi_args) };
            if ptr.is_null() {
                CValue::Null
            } else {
                CValue::Ptr(ptr as usize)
            }
        }
        CString => {
            let ptr = unsafe { cif.call::<*mut c_char>(code, &ffi_args) };
            match unsafe { OwnedCStr::from_raw(ptr) } {
                Some(owned) => CValue::CStr(owned),
                None => CValue::Null,
            }
        }
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshal_int_widths() {
        assert!(matches!(
            marshal_arg(CTypeKind::Int32, &CValue::Int(42), 0),
            Ok(FfiValue::I32(42))
        ));
        assert!(matches!(
            marshal_arg(CTypeKind::Int8, &CValue::Int(-128), 0),
            Ok(FfiValue::I8(-128))
        ));
        assert!(matches!(
            marshal_arg(CTypeKind::UInt16, &CValue::Int(65535), 0),
            Ok(FfiValue::U16(65535))
        ));
    }

    #[test]
    fn marshal_overflow_names_index_and_types() {
        let err = marshal_arg(CTypeKind::Int8, &CValue::Int(1000), 2).unwrap_err();
        assert_eq!(
            err,
            CallError::ArgumentConversion {
                index: 2,
                declared: "int8_t",
                actual: "int",
            }
        );
    }

    #[test]
    fn marshal_floats_accept_int() {
        assert!(matches!(
            marshal_arg(CTypeKind::Double, &CValue::Int(4), 0),
            Ok(FfiValue::F64(v)) if v == 4.0
        ));
        assert!(matches!(
            marshal_arg(CTypeKind::Float, &CValue::Float(1.5), 0),
            Ok(FfiValue::F32(v)) if v == 1.5
        ));
    }

    #[test]
    fn marshal_bool_accepts_int() {
        assert!(matches!(
            marshal_arg(CTypeKind::Bool, &CValue::Bool(true), 0),
            Ok(FfiValue::U8(1))
        ));
        assert!(matches!(
            marshal_arg(CTypeKind::Bool, &CValue::Int(7), 0),
            Ok(FfiValue::U8(1))
        ));
        assert!(matches!(
            marshal_arg(CTypeKind::Bool, &CValue::Int(0), 0),
            Ok(FfiValue::U8(0))
        ));
    }

    #[test]
    fn marshal_char_accepts_single_byte_string() {
        assert!(matches!(
            marshal_arg(CTypeKind::Char, &CValue::Str("A".into()), 0),
            Ok(FfiValue::I8(65))
        ));
        assert!(marshal_arg(CTypeKind::Char, &CValue::Str("AB".into()), 0).is_err());
    }

    #[test]
    fn marshal_string_wraps_buffer() {
        let v = marshal_arg(CTypeKind::CString, &CValue::Str("hi".into()), 0).unwrap();
        match v {
            FfiValue::CStr(buf) => assert_eq!(buf.to_bytes(), b"hi"),
            _ => panic!("expected a wrapped buffer"),
        }
        // Interior NUL cannot be represented in a C string.
        assert!(marshal_arg(CTypeKind::CString, &CValue::Str("a\0b".into()), 0).is_err());
    }

    #[test]
    fn marshal_pointer_accepts_address_and_null() {
        assert!(matches!(
            marshal_arg(CTypeKind::Pointer, &CValue::Ptr(0x1000), 0),
            Ok(FfiValue::Ptr(p)) if p as usize == 0x1000
        ));
        assert!(matches!(
            marshal_arg(CTypeKind::Pointer, &CValue::Null, 0),
            Ok(FfiValue::Ptr(p)) if p.is_null()
        ));
    }

    #[test]
    fn marshal_rejects_mismatched_values() {
        assert!(marshal_arg(CTypeKind::Int32, &CValue::Str("4".into()), 0).is_err());
        assert!(marshal_arg(CTypeKind::CString, &CValue::Int(4), 0).is_err());
        assert!(marshal_arg(CTypeKind::Void, &CValue::Int(0), 0).is_err());
    }

    #[test]
    fn call_checks_arity_before_anything_else() {
        // A dangling symbol is never reached: the arity gate fires first.
        let err = call(
            std::ptr::null(),
            &[CTypeKind::Int32, CTypeKind::Int32],
            CTypeKind::Int32,
            &[CValue::Int(1), CValue::Int(2), CValue::Int(3)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CallError::ArityMismatch {
                expected: 2,
                supplied: 3,
            }
        );
    }
}
