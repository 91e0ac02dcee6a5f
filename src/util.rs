//! Length encoding shared by signature subpackets and user attribute subpackets.

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;

use crate::errors::Result;
use crate::parsing::BufParsing;

/// Reads a subpacket length.
///
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-5.2.3.1>
pub fn packet_length<B: Buf>(i: &mut B) -> Result<usize> {
    let olen = i.read_u8()?;
    let len = match olen {
        // One-Octet Lengths
        0..=191 => usize::from(olen),
        // Two-Octet Lengths
        192..=254 => {
            let a = i.read_u8()?;
            ((usize::from(olen) - 192) << 8) + 192 + usize::from(a)
        }
        // Five-Octet Lengths
        255 => i.read_be_u32()?.try_into()?,
    };

    Ok(len)
}

pub fn write_packet_length(len: usize, writer: &mut impl io::Write) -> Result<()> {
    if len < 192 {
        writer.write_u8(len.try_into()?)?;
    } else if len < 16320 {
        writer.write_u8((((len - 192) >> 8) + 192) as u8)?;
        writer.write_u8(((len - 192) & 0xFF) as u8)?;
    } else {
        writer.write_u8(255)?;
        writer.write_u32::<BigEndian>(len.try_into()?)?;
    }

    Ok(())
}

/// Number of octets [`write_packet_length`] uses for `len`.
pub fn packet_length_len(len: usize) -> usize {
    if len < 192 {
        1
    } else if len < 16320 {
        2
    } else {
        5
    }
}

/// Implements `From<Variant>` for an enum and `TryFrom<Enum>` for each variant type.
macro_rules! impl_try_from_into {
    ($enum_name:ident, $( $name:ident => $variant_type:ty ),*) => {
       $(
           impl ::std::convert::TryFrom<$enum_name> for $variant_type {
               type Error = $crate::errors::Error;

               fn try_from(other: $enum_name) -> ::std::result::Result<$variant_type, Self::Error> {
                   if let $enum_name::$name(value) = other {
                       Ok(value)
                   } else {
                      Err($crate::errors::format_err!("invalid packet type: {:?}", other.tag()))
                   }
               }
           }

           impl From<$variant_type> for $enum_name {
               fn from(other: $variant_type) -> $enum_name {
                   $enum_name::$name(other)
               }
           }
       )*
    }
}

pub(crate) use impl_try_from_into;
