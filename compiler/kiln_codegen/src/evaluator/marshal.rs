//! Conversion between `Val`s and the bytes the runtime sees.

use kiln_types::{Idx, Tag};

use super::{mismatch, EvalError, EvalResult, Evaluator, Pointer, Val};

impl Evaluator<'_> {
    /// Lay `value` out as `size_of(ty)` bytes. Undefined parts are zero.
    pub(super) fn to_bytes(&mut self, ty: Idx, value: &Val) -> EvalResult<Vec<u8>> {
        let size = self.layout.size_of(self.pool, ty) as usize;
        let mut out = vec![0; size];
        self.write_bytes(ty, value, &mut out)?;
        Ok(out)
    }

    fn write_bytes(&mut self, ty: Idx, value: &Val, out: &mut [u8]) -> EvalResult<()> {
        let pool = self.pool;
        let layout = self.layout;
        if let Some(parts) = self.parts(ty) {
            let fields = match value {
                Val::Agg(fields) if fields.len() == parts.len() => fields,
                Val::Undef => return Ok(()),
                other => return Err(mismatch("aggregate", other.clone())),
            };
            for ((part_ty, offset), field) in parts.into_iter().zip(fields) {
                let size = layout.size_of(pool, part_ty) as usize;
                let Some(dest) = out.get_mut(offset..offset + size) else {
                    return Err(mismatch("field inside its aggregate", field.clone()));
                };
                self.write_bytes(part_ty, field, dest)?;
            }
            return Ok(());
        }

        match value {
            Val::Undef | Val::Null => out.fill(0),
            Val::Int(bits) => write_le(out, *bits),
            Val::Ptr(pointer) => {
                let id = self.pointer_id(pointer);
                write_le(out, id);
            }
            Val::Agg(_) => return Err(mismatch("scalar", value.clone())),
        }
        Ok(())
    }

    /// Read a `ty` back from bytes produced by the runtime.
    pub(super) fn from_bytes(&self, ty: Idx, bytes: &[u8]) -> EvalResult<Val> {
        if let Some(parts) = self.parts(ty) {
            let mut fields = Vec::with_capacity(parts.len());
            for (part_ty, offset) in parts {
                let size = self.layout.size_of(self.pool, part_ty) as usize;
                let Some(src) = bytes.get(offset..offset + size) else {
                    return Err(mismatch("field inside its aggregate", Val::Undef));
                };
                fields.push(self.from_bytes(part_ty, src)?);
            }
            return Ok(Val::Agg(fields));
        }

        let bits = read_le(bytes);
        match self.pool.tag(self.pool.underlying(ty)) {
            Tag::Pointer | Tag::UnsafePointer | Tag::Map | Tag::Func => match bits {
                0 => Ok(Val::Null),
                id => self
                    .pointers
                    .get(id as usize - 1)
                    .cloned()
                    .map(Val::Ptr)
                    .ok_or(EvalError::DanglingPointer(id)),
            },
            _ => Ok(Val::Int(bits)),
        }
    }

    /// Types and byte offsets of the parts of an aggregate or array.
    fn parts(&self, ty: Idx) -> Option<Vec<(Idx, usize)>> {
        let pool = self.pool;
        if let Some(fields) = pool.aggregate_fields(ty) {
            return Some(
                fields
                    .into_iter()
                    .enumerate()
                    .map(|(i, f)| (f, self.layout.element_offset(pool, ty, i) as usize))
                    .collect(),
            );
        }
        let (elem, len) = pool.array_elem(ty)?;
        let stride = self.layout.size_of(pool, elem) as usize;
        Some((0..len as usize).map(|i| (elem, i * stride)).collect())
    }

    /// Stable non-zero number for `pointer`.
    fn pointer_id(&mut self, pointer: &Pointer) -> u64 {
        let index = match self.pointers.iter().position(|p| p == pointer) {
            Some(index) => index,
            None => {
                self.pointers.push(pointer.clone());
                self.pointers.len() - 1
            }
        };
        index as u64 + 1
    }
}

fn write_le(out: &mut [u8], bits: u64) {
    let bytes = bits.to_le_bytes();
    let n = out.len().min(bytes.len());
    out[..n].copy_from_slice(&bytes[..n]);
}

fn read_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let n = bytes.len().min(buf.len());
    buf[..n].copy_from_slice(&bytes[..n]);
    u64::from_le_bytes(buf)
}
