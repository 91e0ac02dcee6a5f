//! # Serialize trait module

use std::io;

use chrono::{DateTime, TimeZone, Utc};

use crate::errors::Result;

pub trait Serialize {
    fn to_writer<W: io::Write>(&self, _: &mut W) -> Result<()>;
    fn write_len(&self) -> usize;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.write_len());
        self.to_writer(&mut buf)?;

        Ok(buf)
    }
}

impl<T: Serialize> Serialize for &T {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        (*self).to_writer(writer)
    }
    fn write_len(&self) -> usize {
        (*self).write_len()
    }
}

impl<T: Serialize> Serialize for &[T] {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        for x in self.iter() {
            (*x).to_writer(writer)?;
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.iter().map(|w| w.write_len()).sum()
    }
}

impl<T: Serialize> Serialize for Vec<T> {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        for x in self.iter() {
            (*x).to_writer(writer)?;
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.iter().map(|w| w.write_len()).sum()
    }
}

impl<T: Serialize> Serialize for Option<T> {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Some(x) => x.to_writer(writer),
            None => Ok(()),
        }
    }

    fn write_len(&self) -> usize {
        self.as_ref().map(|x| x.write_len()).unwrap_or_default()
    }
}

/// Convert a timestamp to the OpenPGP u32 format.
/// Times before the epoch clamp to 0, times after 2106 to `u32::MAX`.
pub(crate) fn time_to_u32(t: &DateTime<Utc>) -> u32 {
    u32::try_from(t.timestamp().max(0)).unwrap_or(u32::MAX)
}

/// Inverse of [`time_to_u32`].
pub(crate) fn u32_to_time(t: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(i64::from(t), 0)
        .single()
        .unwrap_or_default()
}
