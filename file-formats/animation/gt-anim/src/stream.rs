//! Sequential little-endian reader over an in-memory asset buffer
//!
//! Reads never fail on a short buffer. A read that would run past the end
//! copies only the bytes that remain and leaves the rest of the destination
//! untouched, so a value read with [`ByteStream::read_u32_into`] keeps its
//! previous high bytes when the buffer ends early. Importers that need a
//! guarantee check [`ByteStream::remaining`] first (see
//! [`ByteStream::ensure_remaining`]); a truncated primitive read is tolerated
//! and logged, which also means a truncated file can slip through as zeros.

use glam::{Mat4, Quat, Vec3};
use log::warn;

use crate::error::{Result, RigError};

/// A cursor for reading binary data from a byte slice
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    data: &'a [u8],
    position: usize,
}

macro_rules! le_read {
    ($(#[$doc:meta])* $read:ident, $read_into:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $read(&mut self) -> $ty {
            let mut value = <$ty>::default();
            self.$read_into(&mut value);
            value
        }

        /// Read into an existing value, keeping its bytes where the buffer ends early.
        ///
        /// Returns the number of bytes actually consumed.
        pub fn $read_into(&mut self, dest: &mut $ty) -> usize {
            let mut bytes = dest.to_le_bytes();
            let read = self.read_bytes_into(&mut bytes);
            *dest = <$ty>::from_le_bytes(bytes);
            read
        }
    };
}

impl<'a> ByteStream<'a> {
    /// Create a new stream at the beginning of the data
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// True when every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Copy up to `dest.len()` bytes, clamped to what is left.
    ///
    /// Returns the number of bytes copied; the tail of `dest` beyond that is not written.
    pub fn read_bytes_into(&mut self, dest: &mut [u8]) -> usize {
        let count = dest.len().min(self.remaining());
        if count < dest.len() {
            warn!(
                "short read at offset {}: wanted {} bytes, {} available",
                self.position,
                dest.len(),
                count
            );
        }
        dest[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        count
    }

    /// Advance by up to `count` bytes, returning how far the cursor moved
    pub fn skip(&mut self, count: usize) -> usize {
        let count = count.min(self.remaining());
        self.position += count;
        count
    }

    le_read!(
        /// Read an unsigned 8-bit integer
        read_u8, read_u8_into, u8
    );
    le_read!(
        /// Read an unsigned 16-bit integer
        read_u16, read_u16_into, u16
    );
    le_read!(
        /// Read an unsigned 32-bit integer
        read_u32, read_u32_into, u32
    );
    le_read!(
        /// Read a signed 32-bit integer
        read_i32, read_i32_into, i32
    );
    le_read!(
        /// Read a 32-bit float
        read_f32, read_f32_into, f32
    );

    /// Read three floats as a vector
    pub fn read_vec3(&mut self) -> Vec3 {
        let x = self.read_f32();
        let y = self.read_f32();
        let z = self.read_f32();
        Vec3::new(x, y, z)
    }

    /// Read four floats as an `x, y, z, w` quaternion
    pub fn read_quat(&mut self) -> Quat {
        let x = self.read_f32();
        let y = self.read_f32();
        let z = self.read_f32();
        let w = self.read_f32();
        Quat::from_xyzw(x, y, z, w)
    }

    /// Read sixteen floats as a column-major matrix
    pub fn read_mat4(&mut self) -> Mat4 {
        let mut cols = [0.0f32; 16];
        for value in &mut cols {
            *value = self.read_f32();
        }
        Mat4::from_cols_array(&cols)
    }

    /// Fail with `CorruptData` unless `bytes` more bytes are available
    pub fn ensure_remaining(&self, bytes: usize, what: &str) -> Result<()> {
        if bytes > self.remaining() {
            return Err(RigError::CorruptData(format!(
                "{what} needs {bytes} bytes at offset {} but only {} remain",
                self.position,
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Read a string of `len` raw bytes (not null terminated)
    ///
    /// The length comes from the asset, so it is checked against the buffer
    /// instead of being clamped. Invalid UTF-8 is replaced, not rejected.
    pub fn read_string(&mut self, len: usize, what: &str) -> Result<String> {
        self.ensure_remaining(len, what)?;
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a string prefixed with a `u16` length
    pub fn read_string_u16(&mut self, what: &str) -> Result<String> {
        let len = self.read_u16() as usize;
        self.read_string(len, what)
    }

    /// Read a string prefixed with a `u32` length
    pub fn read_string_u32(&mut self, what: &str) -> Result<String> {
        let len = self.read_u32() as usize;
        self.read_string(len, what)
    }
}
